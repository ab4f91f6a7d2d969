//! Permission grant resolution.
//!
//! A grant is a pure append to the graph. The external synthesis engine
//! translates it into a real access-control change and must apply it
//! before the compute resource can be invoked; the composer guarantees
//! grants are recorded before any route binding references the same actor.

use crate::core::error::{ComposeError, Result};
use crate::core::types::{AccessLevel, ComputeResource, PermissionGrant, TableReference};

/// Resolve a grant against the set of already-constructed compute
/// resources. Fails with `DependencyOrder` if the actor is unknown.
pub fn resolve_grant(
    computes: &[ComputeResource],
    actor_id: &str,
    table: &TableReference,
    level: AccessLevel,
) -> Result<PermissionGrant> {
    if !computes.iter().any(|c| c.id == actor_id) {
        return Err(ComposeError::DependencyOrder {
            actor: actor_id.to_string(),
        });
    }
    Ok(PermissionGrant {
        actor_id: actor_id.to_string(),
        table: table.name.clone(),
        level,
    })
}

/// Append a grant, idempotently: applying the same grant twice yields the
/// same effective permission set.
pub fn append_grant(grants: &mut Vec<PermissionGrant>, grant: PermissionGrant) {
    if !grants.contains(&grant) {
        grants.push(grant);
    }
}
