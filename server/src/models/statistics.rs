use serde::{Deserialize, Serialize};

/// Body of the statistics endpoints. Zero means "no filter".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct StatisticsFilter {
    #[serde(default)]
    pub counter_id: i64,
    #[serde(default)]
    pub service_id: i64,
    #[serde(default)]
    pub venue_id: i64,
}

impl StatisticsFilter {
    pub fn counter(&self) -> Option<i64> {
        non_zero(self.counter_id)
    }

    pub fn service(&self) -> Option<i64> {
        non_zero(self.service_id)
    }

    pub fn venue(&self) -> Option<i64> {
        non_zero(self.venue_id)
    }
}

fn non_zero(id: i64) -> Option<i64> {
    (id != 0).then_some(id)
}

/// Grouping key shared by all aggregations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct QueueGroup {
    pub venue_id: Option<i64>,
    pub service_id: Option<i64>,
    pub counter_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveQueues {
    #[serde(flatten)]
    pub group: QueueGroup,
    pub active_queues: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageWaitTime {
    #[serde(flatten)]
    pub group: QueueGroup,
    /// Mean whole minutes between creation and call.
    pub wait_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalServed {
    #[serde(flatten)]
    pub group: QueueGroup,
    pub total_served: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisplayAnalytics {
    pub total_called: i64,
    pub total_in_queue: i64,
    pub top_counter: Option<i64>,
}
