//! Stack graph composition — the root of the declaration core.
//!
//! A pure, deterministic function of its declared inputs: builds the graph
//! in dependency order (artifact → compute → grants → routes → entry point
//! → graph) and fails fast on the first validation error with its kind and
//! context intact. No I/O, no partial graph.

use crate::core::error::{ComposeError, Result};
use crate::core::grants::{append_grant, resolve_grant};
use crate::core::routes::{compose_entry_point, RouteDecl};
use crate::core::types::{
    AccessLevel, ArtifactReference, ComputeResource, CorsPolicy, DeployContext, HttpMethod,
    Stage, StackGraph, TableReference,
};
use std::collections::BTreeMap;
use std::time::Duration;

/// One route request: path pattern plus method set. The composer wires
/// every route to the stack's compute resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    pub path: String,
    pub methods: Vec<HttpMethod>,
}

/// Declarative parameters for one stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackParams {
    pub name: String,
    pub context: DeployContext,
    pub compute_id: String,
    pub artifact: ArtifactReference,
    pub handler_entry: String,
    pub env: BTreeMap<String, String>,
    pub timeout: Duration,
    pub grant_level: AccessLevel,
    pub cors: CorsPolicy,
    pub stage: Stage,
    pub routes: Vec<RouteRequest>,
}

/// Compose one fully wired stack graph, or fail on the first error.
///
/// The table reference is supplied externally and held as a non-owning
/// back reference; grants against it are recorded before any route
/// binding references the compute resource, so by the time a route can
/// receive traffic its data-access permissions are already declared.
pub fn compose(params: &StackParams, table: &TableReference) -> Result<StackGraph> {
    if params.name.is_empty() {
        return Err(ComposeError::config("name", "must not be empty"));
    }
    if params.context.region.is_empty() {
        return Err(ComposeError::config("context.region", "must not be empty"));
    }
    if params.context.account.is_empty() {
        return Err(ComposeError::config("context.account", "must not be empty"));
    }
    if table.name.is_empty() {
        return Err(ComposeError::config("table", "must not be empty"));
    }

    let compute = ComputeResource::new(
        params.compute_id.clone(),
        params.artifact.clone(),
        params.handler_entry.clone(),
        params.env.clone(),
        params.timeout,
    )?;
    let computes = vec![compute];

    // Grants before routes.
    let mut grants = Vec::new();
    let grant = resolve_grant(&computes, &params.compute_id, table, params.grant_level)?;
    append_grant(&mut grants, grant);

    let decls: Vec<RouteDecl> = params
        .routes
        .iter()
        .map(|r| RouteDecl {
            path: r.path.clone(),
            methods: r.methods.clone(),
            target_id: params.compute_id.clone(),
        })
        .collect();

    let entry_point = compose_entry_point(
        params.cors.clone(),
        params.stage.clone(),
        &decls,
        &computes,
    )?;

    Ok(StackGraph {
        name: params.name.clone(),
        context: params.context.clone(),
        table: table.clone(),
        compute: computes,
        grants,
        entry_point,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{CorsMethod, TargetEnv, Throttle};
    use std::path::PathBuf;

    pub(crate) fn sample_params() -> StackParams {
        let mut env = BTreeMap::new();
        env.insert("TABLE_NAME".to_string(), "Orders".to_string());
        StackParams {
            name: "users-api".to_string(),
            context: DeployContext {
                region: "us-east-1".to_string(),
                account: "123456789012".to_string(),
            },
            compute_id: "handler".to_string(),
            artifact: ArtifactReference {
                source_path: PathBuf::from("./svc"),
                build_command: vec![
                    "/bin/sh".to_string(),
                    "-c".to_string(),
                    "make artifact".to_string(),
                ],
                target_env: TargetEnv::LinuxX86_64,
            },
            handler_entry: "bootstrap".to_string(),
            env,
            timeout: Duration::from_secs(7),
            grant_level: AccessLevel::ReadWrite,
            cors: CorsPolicy {
                allow_headers: vec!["Authorization".to_string()],
                allow_methods: vec![CorsMethod::Any],
                allow_origins: vec!["*".to_string()],
                max_age: Duration::from_secs(10 * 86400),
            },
            stage: Stage {
                name: "$default".to_string(),
                auto_deploy: true,
                throttle: Throttle {
                    burst_limit: 2,
                    rate_limit: 1,
                },
            },
            routes: vec![
                RouteRequest {
                    path: "/users".to_string(),
                    methods: vec![HttpMethod::Get, HttpMethod::Post],
                },
                RouteRequest {
                    path: "/users/{id}".to_string(),
                    methods: vec![HttpMethod::Get, HttpMethod::Put, HttpMethod::Delete],
                },
            ],
        }
    }

    #[test]
    fn test_compose_full_graph() {
        let table = TableReference::new("Orders");
        let graph = compose(&sample_params(), &table).unwrap();

        assert_eq!(graph.name, "users-api");
        assert_eq!(graph.compute.len(), 1);
        assert_eq!(graph.compute[0].id, "handler");
        assert_eq!(graph.compute[0].timeout, Duration::from_secs(7));

        // Grant recorded before routes, not downgraded
        assert_eq!(graph.grants.len(), 1);
        assert_eq!(graph.grants[0].level, AccessLevel::ReadWrite);
        assert_eq!(graph.grants[0].table, "Orders");

        // Both routes, in order, targeting the same compute id
        assert_eq!(graph.entry_point.routes.len(), 2);
        assert_eq!(graph.entry_point.routes[0].path, "/users");
        assert_eq!(graph.entry_point.routes[1].path, "/users/{id}");
        assert!(graph
            .entry_point
            .routes
            .iter()
            .all(|r| r.target_id == "handler"));
    }

    #[test]
    fn test_compose_is_deterministic() {
        let table = TableReference::new("Orders");
        let params = sample_params();
        let g1 = compose(&params, &table).unwrap();
        let g2 = compose(&params, &table).unwrap();
        assert_eq!(g1, g2);
    }

    #[test]
    fn test_duplicate_route_fails_with_no_graph() {
        let table = TableReference::new("Orders");
        let mut params = sample_params();
        params.routes = vec![
            RouteRequest {
                path: "/users".to_string(),
                methods: vec![HttpMethod::Get],
            },
            RouteRequest {
                path: "/users".to_string(),
                methods: vec![HttpMethod::Get],
            },
        ];
        let err = compose(&params, &table).unwrap_err();
        assert_eq!(
            err,
            ComposeError::RouteConflict {
                path: "/users".to_string(),
                method: HttpMethod::Get,
            }
        );
    }

    #[test]
    fn test_zero_timeout_fails_fast() {
        let table = TableReference::new("Orders");
        let mut params = sample_params();
        params.timeout = Duration::ZERO;
        let err = compose(&params, &table).unwrap_err();
        assert!(matches!(
            err,
            ComposeError::Configuration {
                field: "compute.timeout",
                ..
            }
        ));
    }

    #[test]
    fn test_empty_region_rejected() {
        let table = TableReference::new("Orders");
        let mut params = sample_params();
        params.context.region.clear();
        let err = compose(&params, &table).unwrap_err();
        assert!(matches!(
            err,
            ComposeError::Configuration {
                field: "context.region",
                ..
            }
        ));
    }

    #[test]
    fn test_unnamed_table_rejected() {
        let table = TableReference::new("");
        let err = compose(&sample_params(), &table).unwrap_err();
        assert!(matches!(
            err,
            ComposeError::Configuration { field: "table", .. }
        ));
    }

    #[test]
    fn test_grant_level_read_only_preserved() {
        let table = TableReference::new("Orders");
        let mut params = sample_params();
        params.grant_level = AccessLevel::Read;
        let graph = compose(&params, &table).unwrap();
        assert_eq!(graph.grants[0].level, AccessLevel::Read);
    }
}
