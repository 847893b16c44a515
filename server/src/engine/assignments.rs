use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{Principal, Scope};
use crate::engine::AccessGate;
use crate::models::{NewAssignment, UserCounterMap};
use crate::store::Store;
use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentRequest {
    pub user_id: Option<i64>,
    pub counter_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct AssignedUser {
    pub user_id: i64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct AssignedCounter {
    pub counter_id: i64,
}

/// User-to-counter assignments managed by an admin.
#[derive(Clone)]
pub struct AssignmentDesk {
    store: Arc<dyn Store>,
    gate: AccessGate,
}

impl AssignmentDesk {
    pub fn new(store: Arc<dyn Store>, gate: AccessGate) -> Self {
        Self { store, gate }
    }

    /// Both ends of a mapping must sit inside the managing admin's scope.
    async fn validate(&self, scope: Scope, req: &AssignmentRequest) -> AppResult<(i64, i64)> {
        let user_id = req
            .user_id
            .ok_or_else(|| AppError::ValidationError("user_id is required".to_string()))?;
        let counter_id = req
            .counter_id
            .ok_or_else(|| AppError::ValidationError("counter_id is required".to_string()))?;
        self.gate.counter(scope, counter_id).await?;
        self.gate.member(scope, user_id).await?;
        Ok((user_id, counter_id))
    }

    pub async fn list(&self, principal: &Principal) -> AppResult<Vec<UserCounterMap>> {
        self.store.list_assignments(principal.scope()?.owner_id).await
    }

    pub async fn get(&self, principal: &Principal, id: i64) -> AppResult<UserCounterMap> {
        self.gate.assignment(principal.scope()?, id).await
    }

    pub async fn create(
        &self,
        principal: &Principal,
        req: AssignmentRequest,
    ) -> AppResult<UserCounterMap> {
        principal.require_admin()?;
        let scope = principal.scope()?;
        let (user_id, counter_id) = self.validate(scope, &req).await?;
        let mapping = self
            .store
            .insert_assignment(NewAssignment {
                user_id,
                counter_id,
                owner_id: scope.owner_id,
            })
            .await?;
        info!(user_id, counter_id, "User assigned to counter");
        Ok(mapping)
    }

    pub async fn update(
        &self,
        principal: &Principal,
        id: i64,
        req: AssignmentRequest,
    ) -> AppResult<UserCounterMap> {
        principal.require_admin()?;
        let scope = principal.scope()?;
        let mut mapping = self.gate.assignment(scope, id).await?;
        let (user_id, counter_id) = self.validate(scope, &req).await?;
        mapping.user_id = user_id;
        mapping.counter_id = counter_id;
        self.store.update_assignment(&mapping).await?;
        Ok(mapping)
    }

    pub async fn delete(&self, principal: &Principal, id: i64) -> AppResult<()> {
        principal.require_admin()?;
        self.gate.assignment(principal.scope()?, id).await?;
        if !self.store.delete_assignment(id).await? {
            return Err(AppError::NotFound(format!("Mapping {id} not found")));
        }
        Ok(())
    }

    pub async fn user_for_counter(
        &self,
        principal: &Principal,
        counter_id: i64,
    ) -> AppResult<AssignedUser> {
        let scope = principal.scope()?;
        self.gate.counter(scope, counter_id).await?;
        self.store
            .first_assignment_for_counter(counter_id)
            .await?
            .filter(|m| scope.owns(m.owner_id))
            .map(|m| AssignedUser { user_id: m.user_id })
            .ok_or_else(|| AppError::NotFound("No user assigned to this counter".to_string()))
    }

    pub async fn counter_for_user(
        &self,
        principal: &Principal,
        user_id: i64,
    ) -> AppResult<AssignedCounter> {
        let scope = principal.scope()?;
        self.gate.member(scope, user_id).await?;
        self.store
            .first_assignment_for_user(user_id)
            .await?
            .filter(|m| scope.owns(m.owner_id))
            .map(|m| AssignedCounter {
                counter_id: m.counter_id,
            })
            .ok_or_else(|| AppError::NotFound("No counter assigned to this user".to_string()))
    }
}
