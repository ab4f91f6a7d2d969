//! Route binding and entry point composition.
//!
//! Accepts (path, methods, target) triples in declaration order, normalizes
//! paths, validates method sets, and rejects any duplicate (path, method)
//! pair. Declaration order is preserved in the output because it determines
//! match priority when patterns overlap (a literal `/users` vs. the
//! parametrized `/users/{id}`).

use crate::core::error::{ComposeError, Result};
use crate::core::types::{
    ComputeResource, CorsPolicy, EntryPoint, HttpMethod, RouteBinding, Stage,
};
use std::collections::{HashMap, HashSet};

/// One route declaration as it arrives from the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDecl {
    pub path: String,
    pub methods: Vec<HttpMethod>,
    pub target_id: String,
}

/// Normalize a path pattern: require a leading slash and collapse trailing
/// slashes. The bare root `/` survives unchanged.
pub fn normalize_path(path: &str) -> Result<String> {
    if path.is_empty() || !path.starts_with('/') {
        return Err(ComposeError::config(
            "route.path",
            format!("'{}' must start with '/'", path),
        ));
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        Ok("/".to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

/// Compose an entry point from route declarations.
///
/// Validates each declaration against the already-constructed compute
/// resources and the seen (path, method) set, then appends bindings in
/// input order under a single CORS policy and stage.
pub fn compose_entry_point(
    cors: CorsPolicy,
    stage: Stage,
    decls: &[RouteDecl],
    computes: &[ComputeResource],
) -> Result<EntryPoint> {
    if stage.name.is_empty() {
        return Err(ComposeError::config("stage.name", "must not be empty"));
    }

    let mut seen: HashMap<String, HashSet<HttpMethod>> = HashMap::new();
    let mut routes = Vec::with_capacity(decls.len());

    for decl in decls {
        let path = normalize_path(&decl.path)?;

        if decl.methods.is_empty() {
            return Err(ComposeError::config(
                "route.methods",
                format!("route {} declares no methods", path),
            ));
        }

        if !computes.iter().any(|c| c.id == decl.target_id) {
            return Err(ComposeError::DependencyOrder {
                actor: decl.target_id.clone(),
            });
        }

        // Duplicates within one declaration collapse silently; order kept.
        let mut methods: Vec<HttpMethod> = Vec::with_capacity(decl.methods.len());
        for &method in &decl.methods {
            if !methods.contains(&method) {
                methods.push(method);
            }
        }

        let bound = seen.entry(path.clone()).or_default();
        for &method in &methods {
            // ANY conflicts with everything already bound on this path,
            // and anything conflicts with an already-bound ANY.
            let collides = bound.contains(&method)
                || method == HttpMethod::Any && !bound.is_empty()
                || bound.contains(&HttpMethod::Any);
            if collides {
                return Err(ComposeError::RouteConflict { path, method });
            }
            bound.insert(method);
        }

        routes.push(RouteBinding {
            path,
            methods,
            target_id: decl.target_id.clone(),
        });
    }

    Ok(EntryPoint {
        cors,
        stage,
        routes,
    })
}
