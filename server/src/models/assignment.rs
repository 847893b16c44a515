use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Assignment of a user to a counter, managed by the admin in `owner_id`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserCounterMap {
    pub user_counter_map_id: i64,
    pub user_id: i64,
    pub counter_id: i64,
    pub assigned_at: DateTime<Utc>,
    pub owner_id: i64,
}

#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub user_id: i64,
    pub counter_id: i64,
    pub owner_id: i64,
}
