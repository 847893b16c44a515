use std::sync::Arc;

use crate::auth::TokenService;
use crate::engine::{
    AccessGate, AssignmentDesk, Catalog, DisplayBoard, StatisticsService, TicketIssuer,
    TicketLifecycle, UserDirectory,
};
use crate::store::Store;

/// Shared by every handler. Cloning is cheap: components hold `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub tokens: TokenService,
    pub issuer: TicketIssuer,
    pub tickets: TicketLifecycle,
    pub displays: DisplayBoard,
    pub statistics: StatisticsService,
    pub catalog: Catalog,
    pub users: UserDirectory,
    pub assignments: AssignmentDesk,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService) -> Self {
        let gate = AccessGate::new(store.clone());
        let statistics = StatisticsService::new(store.clone());

        Self {
            issuer: TicketIssuer::new(store.clone(), gate.clone()),
            tickets: TicketLifecycle::new(store.clone(), gate.clone(), statistics.clone()),
            displays: DisplayBoard::new(store.clone(), gate.clone()),
            catalog: Catalog::new(store.clone(), gate.clone()),
            users: UserDirectory::new(store.clone(), gate.clone(), tokens.clone()),
            assignments: AssignmentDesk::new(store, gate),
            statistics,
            tokens,
        }
    }
}
