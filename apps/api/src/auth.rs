use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::AppError;

/// Role assigned to a user. Immutable for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Curator,
    ThreatAnalyst,
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "curator" => Ok(Role::Curator),
            "threat_analyst" => Ok(Role::ThreatAnalyst),
            _ => Err(()),
        }
    }
}

/// Request-scoped actor identity, resolved by the upstream identity layer and
/// passed down via headers. This core trusts the pair without re-verifying
/// credentials; it only enforces what the role may touch.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Watchlist access is role-gated, not block-scoped.
    pub fn can_access_watchlist(&self) -> bool {
        matches!(self.role, Role::Admin | Role::ThreatAnalyst)
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v).ok())
            .ok_or(AppError::Unauthorized)?;

        let role = parts
            .headers
            .get("x-user-role")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Role::from_str(v).ok())
            .ok_or(AppError::Unauthorized)?;

        Ok(Actor { user_id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parses_known_values() {
        assert_eq!(Role::from_str("admin"), Ok(Role::Admin));
        assert_eq!(Role::from_str("curator"), Ok(Role::Curator));
        assert_eq!(Role::from_str("threat_analyst"), Ok(Role::ThreatAnalyst));
    }

    #[test]
    fn test_role_rejects_unknown_values() {
        assert!(Role::from_str("superadmin").is_err());
        assert!(Role::from_str("Admin").is_err());
        assert!(Role::from_str("").is_err());
    }

    #[test]
    fn test_watchlist_gate_by_role() {
        let analyst = Actor {
            user_id: Uuid::new_v4(),
            role: Role::ThreatAnalyst,
        };
        let curator = Actor {
            user_id: Uuid::new_v4(),
            role: Role::Curator,
        };
        assert!(analyst.can_access_watchlist());
        assert!(!curator.can_access_watchlist());
        assert!(!analyst.is_admin());
    }
}
