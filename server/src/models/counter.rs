use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::error::{AppError, AppResult};

const TIME_OF_DAY_FORMAT: &str = "%H:%M:%S";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Counter {
    pub counter_id: i64,
    pub venue_id: Option<i64>,
    pub service_id: Option<i64>,
    pub counter_name: String,
    pub operator_name: String,
    pub operator_nik: String,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
    pub is_vip: bool,
    pub user_id: i64,
}

/// Request body for creating or replacing a counter.
#[derive(Debug, Clone, Deserialize)]
pub struct CounterInput {
    pub venue_id: Option<i64>,
    pub service_id: Option<i64>,
    #[serde(default)]
    pub counter_name: String,
    #[serde(default)]
    pub operator_name: String,
    #[serde(default)]
    pub operator_nik: String,
    #[serde(default)]
    pub open_time: String,
    #[serde(default)]
    pub close_time: String,
    #[serde(default)]
    pub is_vip: bool,
}

/// Validated counter columns, owner excluded.
#[derive(Debug, Clone)]
pub struct CounterFields {
    pub venue_id: Option<i64>,
    pub service_id: Option<i64>,
    pub counter_name: String,
    pub operator_name: String,
    pub operator_nik: String,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
    pub is_vip: bool,
}

impl CounterInput {
    pub fn validate(self) -> AppResult<CounterFields> {
        let counter_name = self.counter_name.trim().to_string();
        if counter_name.is_empty() {
            return Err(AppError::ValidationError(
                "counter name is required".to_string(),
            ));
        }
        let open_time = parse_time_of_day("open_time", &self.open_time)?;
        let close_time = parse_time_of_day("close_time", &self.close_time)?;

        Ok(CounterFields {
            venue_id: self.venue_id,
            service_id: self.service_id,
            counter_name,
            operator_name: self.operator_name,
            operator_nik: self.operator_nik,
            open_time,
            close_time,
            is_vip: self.is_vip,
        })
    }
}

impl Counter {
    pub fn apply(&mut self, fields: CounterFields) {
        self.venue_id = fields.venue_id;
        self.service_id = fields.service_id;
        self.counter_name = fields.counter_name;
        self.operator_name = fields.operator_name;
        self.operator_nik = fields.operator_nik;
        self.open_time = fields.open_time;
        self.close_time = fields.close_time;
        self.is_vip = fields.is_vip;
    }
}

/// Parses a strict `HH:MM:SS` time of day.
pub fn parse_time_of_day(field: &str, value: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), TIME_OF_DAY_FORMAT).map_err(|_| {
        AppError::ValidationError(format!("Invalid {field} format, expected HH:mm:ss"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> CounterInput {
        CounterInput {
            venue_id: Some(1),
            service_id: Some(2),
            counter_name: "Counter A".into(),
            operator_name: "Dewi".into(),
            operator_nik: "3201".into(),
            open_time: "08:00:00".into(),
            close_time: "17:30:00".into(),
            is_vip: false,
        }
    }

    #[test]
    fn test_valid_counter_input() {
        let fields = input().validate().unwrap();
        assert_eq!(fields.counter_name, "Counter A");
        assert_eq!(fields.close_time, NaiveTime::from_hms_opt(17, 30, 0).unwrap());
    }

    #[test]
    fn test_rejects_bad_time_format() {
        let mut bad = input();
        bad.open_time = "8am".into();
        let err = bad.validate().unwrap_err();
        assert!(matches!(err, AppError::ValidationError(msg) if msg.contains("open_time")));

        let mut no_seconds = input();
        no_seconds.close_time = "17:30".into();
        assert!(no_seconds.validate().is_err());
    }

    #[test]
    fn test_requires_counter_name() {
        let mut bad = input();
        bad.counter_name = "   ".into();
        assert!(matches!(
            bad.validate(),
            Err(AppError::ValidationError(_))
        ));
    }
}
