//! Principal resolution by (id, role)
//!
//! The role tag selects exactly one identity store, so users and
//! administrators sharing a numeric id never shadow one another.

use super::deadline::bounded;
use nearby_core::{IdentityStore, Principal, Role, StoreError};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct PrincipalResolver {
    identities: Arc<dyn IdentityStore>,
    timeout: Duration,
}

impl PrincipalResolver {
    pub fn new(identities: Arc<dyn IdentityStore>, timeout: Duration) -> Self {
        Self {
            identities,
            timeout,
        }
    }

    /// Load the principal for `id` from the store selected by `role`
    pub async fn resolve(&self, id: i64, role: Role) -> Result<Principal, StoreError> {
        match role {
            Role::User => bounded(self.timeout, self.identities.find_user_by_id(id))
                .await
                .map(Principal::User),
            Role::Admin => bounded(self.timeout, self.identities.find_admin_by_id(id))
                .await
                .map(Principal::Admin),
        }
    }
}
