use crate::auth::Claims;
use crate::models::Role;
use crate::utils::error::{AppError, AppResult};

/// The authenticated caller, decoded once per request from the bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub role: Role,
    pub owner_id: Option<i64>,
    pub company_name: String,
}

/// Owner id whose venues, services, counters, tickets and displays the
/// caller may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scope {
    pub owner_id: i64,
}

impl Scope {
    pub fn owns(&self, owner_id: i64) -> bool {
        self.owner_id == owner_id
    }
}

impl Principal {
    /// Admins act on their own records; operators act on their admin's.
    pub fn scope(&self) -> AppResult<Scope> {
        match self.role {
            Role::SuperAdmin | Role::Admin => Ok(Scope {
                owner_id: self.user_id,
            }),
            Role::Operator => self
                .owner_id
                .map(|owner_id| Scope { owner_id })
                .ok_or_else(|| AppError::Forbidden("operator has no owning admin".to_string())),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Only admins can perform this action".to_string(),
            ))
        }
    }
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            role: claims.role,
            owner_id: claims.owner_id,
            company_name: claims.company_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role, owner_id: Option<i64>) -> Principal {
        Principal {
            user_id: 10,
            role,
            owner_id,
            company_name: "Acme".into(),
        }
    }

    #[test]
    fn test_admin_scope_is_self() {
        assert_eq!(principal(Role::Admin, None).scope().unwrap().owner_id, 10);
        assert_eq!(
            principal(Role::SuperAdmin, Some(4)).scope().unwrap().owner_id,
            10
        );
    }

    #[test]
    fn test_operator_scope_delegates_to_owner() {
        assert_eq!(
            principal(Role::Operator, Some(4)).scope().unwrap().owner_id,
            4
        );
        assert!(matches!(
            principal(Role::Operator, None).scope(),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_require_admin() {
        assert!(principal(Role::Admin, None).require_admin().is_ok());
        assert!(principal(Role::Operator, Some(4)).require_admin().is_err());
    }
}
