use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::counter::parse_time_of_day;
use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Venue {
    pub venue_id: i64,
    pub user_id: i64,
    pub venue_name: String,
    pub address: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub phone: String,
    pub email: String,
    pub open_time: Option<NaiveTime>,
    pub close_time: Option<NaiveTime>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VenueInput {
    #[serde(default)]
    pub venue_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
}

#[derive(Debug, Clone)]
pub struct VenueFields {
    pub venue_name: String,
    pub address: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub phone: String,
    pub email: String,
    pub open_time: Option<NaiveTime>,
    pub close_time: Option<NaiveTime>,
}

impl VenueInput {
    pub fn validate(self) -> AppResult<VenueFields> {
        let venue_name = self.venue_name.trim().to_string();
        if venue_name.is_empty() {
            return Err(AppError::ValidationError("venue name is required".to_string()));
        }
        let open_time = self
            .open_time
            .as_deref()
            .map(|t| parse_time_of_day("open_time", t))
            .transpose()?;
        let close_time = self
            .close_time
            .as_deref()
            .map(|t| parse_time_of_day("close_time", t))
            .transpose()?;

        Ok(VenueFields {
            venue_name,
            address: self.address,
            city: self.city,
            province: self.province,
            postal_code: self.postal_code,
            phone: self.phone,
            email: self.email,
            open_time,
            close_time,
        })
    }
}

impl Venue {
    pub fn apply(&mut self, fields: VenueFields) {
        self.venue_name = fields.venue_name;
        self.address = fields.address;
        self.city = fields.city;
        self.province = fields.province;
        self.postal_code = fields.postal_code;
        self.phone = fields.phone;
        self.email = fields.email;
        self.open_time = fields.open_time;
        self.close_time = fields.close_time;
    }
}
