use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::error::{AppError, AppResult};

/// A service offered at a venue, e.g. "Customer Care" or "Teller".
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Service {
    pub service_id: i64,
    pub user_id: Option<i64>,
    pub venue_id: Option<i64>,
    pub service_name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceInput {
    pub venue_id: Option<i64>,
    #[serde(default)]
    pub service_name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ServiceFields {
    pub venue_id: i64,
    pub service_name: String,
    pub description: Option<String>,
}

impl ServiceInput {
    pub fn validate(self) -> AppResult<ServiceFields> {
        let venue_id = self
            .venue_id
            .ok_or_else(|| AppError::ValidationError("venue_id is required".to_string()))?;
        let service_name = self.service_name.trim().to_string();
        if service_name.is_empty() {
            return Err(AppError::ValidationError(
                "service name is required".to_string(),
            ));
        }
        Ok(ServiceFields {
            venue_id,
            service_name,
            description: self.description.filter(|d| !d.trim().is_empty()),
        })
    }
}

impl Service {
    pub fn is_owned_by(&self, owner_id: i64) -> bool {
        self.user_id == Some(owner_id)
    }

    pub fn apply(&mut self, fields: ServiceFields) {
        self.venue_id = Some(fields.venue_id);
        self.service_name = fields.service_name;
        self.description = fields.description;
    }
}
