//! Aggregations over ticket history.
//!
//! The free functions are pure and operate on already-scoped ticket sets;
//! [`StatisticsService`] loads those sets for a caller.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Duration;

use crate::auth::Principal;
use crate::models::{
    ActiveQueues, AverageWaitTime, DisplayAnalytics, QueueGroup, StatisticsFilter, Ticket,
    TicketQuery, TicketStatus, TotalServed,
};
use crate::store::Store;
use crate::utils::error::{AppError, AppResult};

fn group_of(ticket: &Ticket) -> QueueGroup {
    QueueGroup {
        venue_id: ticket.venue_id,
        service_id: ticket.service_id,
        counter_id: ticket.counter_id,
    }
}

fn count_by_group<'a>(tickets: impl Iterator<Item = &'a Ticket>) -> BTreeMap<QueueGroup, i64> {
    let mut counts = BTreeMap::new();
    for ticket in tickets {
        *counts.entry(group_of(ticket)).or_insert(0) += 1;
    }
    counts
}

pub fn active_queues(tickets: &[Ticket]) -> Vec<ActiveQueues> {
    count_by_group(
        tickets
            .iter()
            .filter(|t| t.status == TicketStatus::Waiting),
    )
    .into_iter()
    .map(|(group, active_queues)| ActiveQueues {
        group,
        active_queues,
    })
    .collect()
}

pub fn total_served(tickets: &[Ticket]) -> Vec<TotalServed> {
    count_by_group(
        tickets
            .iter()
            .filter(|t| t.status == TicketStatus::Completed && t.completed_at.is_some()),
    )
    .into_iter()
    .map(|(group, total_served)| TotalServed {
        group,
        total_served,
    })
    .collect()
}

/// Mean of the whole minutes each called or completed ticket waited
/// between creation and being called.
pub fn average_wait_time(tickets: &[Ticket]) -> Vec<AverageWaitTime> {
    let mut sums: BTreeMap<QueueGroup, (i64, i64)> = BTreeMap::new();
    for ticket in tickets {
        if !matches!(ticket.status, TicketStatus::Called | TicketStatus::Completed) {
            continue;
        }
        let Some(called_at) = ticket.called_at else {
            continue;
        };
        let minutes = (called_at - ticket.created_at).num_minutes();
        let entry = sums.entry(group_of(ticket)).or_insert((0, 0));
        entry.0 += minutes;
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(group, (total, count))| AverageWaitTime {
            group,
            wait_time: total as f64 / count as f64,
        })
        .collect()
}

/// Mean time from creation to completion, truncated to whole minutes.
pub fn average_queuing_time(tickets: &[Ticket]) -> AppResult<Duration> {
    let durations: Vec<Duration> = tickets
        .iter()
        .filter(|t| t.status == TicketStatus::Completed)
        .filter_map(|t| t.completed_at.map(|done| done - t.created_at))
        .collect();

    if durations.is_empty() {
        return Err(AppError::NoCompletedTickets);
    }

    let total_ms: i64 = durations.iter().map(Duration::num_milliseconds).sum();
    let mean = Duration::milliseconds(total_ms / durations.len() as i64);
    Ok(Duration::minutes(mean.num_minutes()))
}

/// Daily counters shown on the display board.
pub fn display_analytics(tickets: &[Ticket]) -> DisplayAnalytics {
    let count = |status: TicketStatus| tickets.iter().filter(|t| t.status == status).count() as i64;

    DisplayAnalytics {
        total_called: count(TicketStatus::Completed),
        total_in_queue: count(TicketStatus::Waiting),
        top_counter: tickets.iter().filter_map(|t| t.counter_id).max(),
    }
}

#[derive(Clone)]
pub struct StatisticsService {
    store: Arc<dyn Store>,
}

impl StatisticsService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn scoped_tickets(
        &self,
        principal: &Principal,
        filter: StatisticsFilter,
        statuses: Vec<TicketStatus>,
    ) -> AppResult<Vec<Ticket>> {
        let scope = principal.scope()?;
        let query = TicketQuery {
            owner_id: Some(scope.owner_id),
            statuses,
            venue_id: filter.venue(),
            service_id: filter.service(),
            counter_id: filter.counter(),
            created_on: None,
        };
        self.store.list_tickets(&query).await
    }

    pub async fn active_queues(
        &self,
        principal: &Principal,
        filter: StatisticsFilter,
    ) -> AppResult<Vec<ActiveQueues>> {
        let tickets = self
            .scoped_tickets(principal, filter, vec![TicketStatus::Waiting])
            .await?;
        Ok(active_queues(&tickets))
    }

    pub async fn average_wait_time(
        &self,
        principal: &Principal,
        filter: StatisticsFilter,
    ) -> AppResult<Vec<AverageWaitTime>> {
        let tickets = self
            .scoped_tickets(
                principal,
                filter,
                vec![TicketStatus::Called, TicketStatus::Completed],
            )
            .await?;
        Ok(average_wait_time(&tickets))
    }

    pub async fn total_served(
        &self,
        principal: &Principal,
        filter: StatisticsFilter,
    ) -> AppResult<Vec<TotalServed>> {
        let tickets = self
            .scoped_tickets(principal, filter, vec![TicketStatus::Completed])
            .await?;
        Ok(total_served(&tickets))
    }

    /// Unscoped; backs the public ticket lookup.
    pub async fn average_queuing_time(
        &self,
        venue_id: i64,
        service_id: i64,
    ) -> AppResult<Duration> {
        let query = TicketQuery {
            statuses: vec![TicketStatus::Completed],
            venue_id: Some(venue_id),
            service_id: Some(service_id),
            ..TicketQuery::default()
        };
        let tickets = self.store.list_tickets(&query).await?;
        average_queuing_time(&tickets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ticket(status: TicketStatus, venue: i64, service: i64, counter: Option<i64>) -> Ticket {
        Ticket {
            ticket_id: 1,
            user_id: 1,
            service_id: Some(service),
            counter_id: counter,
            venue_id: Some(venue),
            customer_name: "Budi".into(),
            customer_email: "budi@example.com".into(),
            customer_phone: "0811".into(),
            photo_url: String::new(),
            queue_number: "1".into(),
            token: "AbCd1234".into(),
            status,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
            called_at: None,
            completed_at: None,
            skipped_at: None,
            operator_id: None,
        }
    }

    #[test]
    fn test_active_queues_empty_input_yields_no_rows() {
        assert!(active_queues(&[]).is_empty());
    }

    #[test]
    fn test_active_queues_single_waiting_ticket() {
        let rows = active_queues(&[ticket(TicketStatus::Waiting, 1, 2, Some(3))]);
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].group,
            QueueGroup {
                venue_id: Some(1),
                service_id: Some(2),
                counter_id: Some(3),
            }
        );
        assert_eq!(rows[0].active_queues, 1);
    }

    #[test]
    fn test_active_queues_ignores_other_statuses_and_groups() {
        let tickets = vec![
            ticket(TicketStatus::Waiting, 1, 2, None),
            ticket(TicketStatus::Waiting, 1, 2, None),
            ticket(TicketStatus::Waiting, 1, 3, None),
            ticket(TicketStatus::Called, 1, 2, None),
        ];
        let rows = active_queues(&tickets);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].active_queues, 2);
        assert_eq!(rows[1].active_queues, 1);
    }

    #[test]
    fn test_average_queuing_time_truncates_to_whole_minutes() {
        let mut t = ticket(TicketStatus::Completed, 1, 2, Some(3));
        t.completed_at = Some(t.created_at + Duration::seconds(90));
        let avg = average_queuing_time(&[t]).unwrap();
        assert_eq!(avg.num_minutes(), 1);
        assert_eq!(avg, Duration::minutes(1));
    }

    #[test]
    fn test_average_queuing_time_without_completed_tickets() {
        let waiting = ticket(TicketStatus::Waiting, 1, 2, None);
        assert!(matches!(
            average_queuing_time(&[waiting]),
            Err(AppError::NoCompletedTickets)
        ));
        assert!(matches!(
            average_queuing_time(&[]),
            Err(AppError::NoCompletedTickets)
        ));
    }

    #[test]
    fn test_average_wait_time_uses_whole_minutes_per_ticket() {
        let mut a = ticket(TicketStatus::Called, 1, 2, Some(3));
        a.called_at = Some(a.created_at + Duration::seconds(150));
        let mut b = ticket(TicketStatus::Completed, 1, 2, Some(3));
        b.called_at = Some(b.created_at + Duration::minutes(5));
        let mut skipped = ticket(TicketStatus::Skipped, 1, 2, Some(3));
        skipped.called_at = Some(skipped.created_at + Duration::minutes(60));

        let rows = average_wait_time(&[a, b, skipped]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].wait_time, 3.5);
    }

    #[test]
    fn test_total_served_requires_completion_time() {
        let mut done = ticket(TicketStatus::Completed, 1, 2, Some(3));
        done.completed_at = Some(done.created_at + Duration::minutes(2));
        let no_stamp = ticket(TicketStatus::Completed, 1, 2, Some(3));
        let rows = total_served(&[done, no_stamp]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_served, 1);
    }

    #[test]
    fn test_display_analytics() {
        let tickets = vec![
            ticket(TicketStatus::Completed, 1, 2, Some(3)),
            ticket(TicketStatus::Completed, 1, 2, Some(7)),
            ticket(TicketStatus::Waiting, 1, 2, None),
            ticket(TicketStatus::Skipped, 1, 2, Some(4)),
        ];
        let analytics = display_analytics(&tickets);
        assert_eq!(analytics.total_called, 2);
        assert_eq!(analytics.total_in_queue, 1);
        assert_eq!(analytics.top_counter, Some(7));
        assert_eq!(display_analytics(&[]), DisplayAnalytics::default());
    }
}
