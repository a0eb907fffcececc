//! Per-request identities established by the auth middleware.
//!
//! A context is built once after the token and session are verified and is then
//! handed explicitly to every service call. Tenant-scoped services take a
//! `&TenantContext` and filter every query by its `tenant_id`.

use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use policy::{authorize, Role};

/// Authenticated tenant user
#[derive(Clone, Debug)]
pub struct TenantContext {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl TenantContext {
    /// Fail with Forbidden unless the caller holds one of `roles`.
    pub fn require(&self, roles: &[Role]) -> AppResult<()> {
        if authorize(self.role, roles) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

/// Authenticated platform operator. Admin services are the only callers
/// allowed to read across tenants.
#[derive(Clone, Debug)]
pub struct AdminContext {
    pub admin_id: Uuid,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use policy::MANAGERS;

    fn ctx(role: Role) -> TenantContext {
        TenantContext {
            tenant_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            email: "staff@acme.test".into(),
            role,
        }
    }

    #[test]
    fn test_require_managers() {
        assert!(ctx(Role::Owner).require(MANAGERS).is_ok());
        assert!(matches!(ctx(Role::Staff).require(MANAGERS), Err(AppError::Forbidden)));
    }
}
