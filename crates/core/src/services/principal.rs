//! Acting principal supplied by the identity provider.

use farol_common::{AppError, AppResult};
use serde::{Deserialize, Serialize};

pub use farol_db::entities::staff::Role;

/// The authenticated caller of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Student or staff id issued by the identity provider.
    pub id: String,
    /// Role claimed by the identity provider.
    pub role: Role,
}

impl Principal {
    /// Principal with an explicit role.
    #[must_use]
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    /// A student principal.
    #[must_use]
    pub fn student(id: impl Into<String>) -> Self {
        Self::new(id, Role::Student)
    }

    /// A staff principal.
    #[must_use]
    pub fn staff(id: impl Into<String>) -> Self {
        Self::new(id, Role::Staff)
    }

    /// An admin principal.
    #[must_use]
    pub fn admin(id: impl Into<String>) -> Self {
        Self::new(id, Role::Admin)
    }

    /// Role rank, higher is more privileged.
    #[must_use]
    pub const fn rank(&self) -> i32 {
        self.role.rank()
    }

    /// Staff or admin.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    /// Reject callers below staff rank.
    pub fn require_staff(&self) -> AppResult<()> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "This action requires a staff or admin account".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_staff() {
        assert!(Principal::staff("s1").require_staff().is_ok());
        assert!(Principal::admin("a1").require_staff().is_ok());
        assert!(matches!(
            Principal::student("u1").require_staff(),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_rank_order() {
        assert!(Principal::admin("a").rank() > Principal::staff("s").rank());
        assert!(Principal::staff("s").rank() > Principal::student("u").rank());
    }
}
