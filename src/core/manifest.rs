//! stack.yaml parsing and validation.
//!
//! Parses the declaration manifest and validates structural constraints:
//! - Version must be "1.0"
//! - Name, table, handler, and build command must be non-empty
//! - Timeout must be strictly positive
//! - Method tokens must be recognized
//! Validation returns the full list of problems for human consumption;
//! composition itself re-checks and fails fast on the first error.

use crate::core::compose::{RouteRequest, StackParams};
use crate::core::error::{ComposeError, Result};
use crate::core::types::{
    AccessLevel, ArtifactReference, CorsMethod, CorsPolicy, DeployContext, HttpMethod, Stage,
    TableReference, TargetEnv, Throttle,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const SECONDS_PER_DAY: u64 = 86_400;

/// Top-level stack.yaml document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackManifest {
    /// Schema version (must be "1.0")
    pub version: String,

    /// Stack name
    pub name: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,

    /// Explicit deployment target
    pub context: DeployContext,

    /// Name of the externally owned table
    pub table: String,

    /// Artifact declaration
    pub artifact: ArtifactManifest,

    /// Compute declaration
    pub compute: ComputeManifest,

    /// Access level granted on the table
    #[serde(default = "default_grant")]
    pub grant: AccessLevel,

    /// Cross-origin policy
    #[serde(default)]
    pub cors: CorsManifest,

    /// Deployment stage
    #[serde(default)]
    pub stage: StageManifest,

    /// Route declarations (order-preserving)
    pub routes: Vec<RouteManifest>,
}

fn default_grant() -> AccessLevel {
    AccessLevel::ReadWrite
}

/// Artifact section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactManifest {
    /// Source directory
    pub source: PathBuf,

    /// Build command (argv)
    pub build: Vec<String>,

    /// Target OS/arch tag
    #[serde(default = "default_target_env")]
    pub target_env: TargetEnv,
}

fn default_target_env() -> TargetEnv {
    TargetEnv::LinuxX86_64
}

/// Compute section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeManifest {
    /// Compute resource id
    #[serde(default = "default_compute_id")]
    pub id: String,

    /// Handler entry point name
    pub handler: String,

    /// Invocation timeout in seconds
    pub timeout_seconds: u64,

    /// Environment variables (manifest order preserved for roundtripping;
    /// sorted into the graph's canonical map at composition)
    #[serde(default)]
    pub env: IndexMap<String, String>,
}

fn default_compute_id() -> String {
    "handler".to_string()
}

/// CORS section. Method tokens are strings here so unknown tokens surface
/// as validation errors rather than parse failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsManifest {
    #[serde(default)]
    pub allow_headers: Vec<String>,

    #[serde(default = "default_wildcard")]
    pub allow_methods: Vec<String>,

    #[serde(default = "default_wildcard")]
    pub allow_origins: Vec<String>,

    #[serde(default)]
    pub max_age_days: u64,
}

fn default_wildcard() -> Vec<String> {
    vec!["*".to_string()]
}

impl Default for CorsManifest {
    fn default() -> Self {
        Self {
            allow_headers: Vec::new(),
            allow_methods: default_wildcard(),
            allow_origins: default_wildcard(),
            max_age_days: 0,
        }
    }
}

/// Stage section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageManifest {
    #[serde(default = "default_stage_name")]
    pub name: String,

    #[serde(default = "default_true")]
    pub auto_deploy: bool,

    #[serde(default)]
    pub throttle: ThrottleManifest,
}

fn default_stage_name() -> String {
    "$default".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for StageManifest {
    fn default() -> Self {
        Self {
            name: default_stage_name(),
            auto_deploy: true,
            throttle: ThrottleManifest::default(),
        }
    }
}

/// Throttle limits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThrottleManifest {
    #[serde(default)]
    pub burst: u32,

    #[serde(default)]
    pub rate: u32,
}

/// One route declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteManifest {
    pub path: String,
    pub methods: Vec<String>,
}

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Parse a stack.yaml file from disk.
pub fn parse_manifest_file(path: &Path) -> std::result::Result<StackManifest, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    parse_manifest(&content)
}

/// Parse a stack.yaml from a string.
pub fn parse_manifest(yaml: &str) -> std::result::Result<StackManifest, String> {
    serde_yaml_ng::from_str(yaml).map_err(|e| format!("YAML parse error: {}", e))
}

/// Validate a parsed manifest. Returns a list of errors (empty = valid).
pub fn validate_manifest(manifest: &StackManifest) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut push = |message: String| errors.push(ValidationError { message });

    if manifest.version != "1.0" {
        push(format!(
            "version must be \"1.0\", got \"{}\"",
            manifest.version
        ));
    }
    if manifest.name.is_empty() {
        push("name must not be empty".to_string());
    }
    if manifest.table.is_empty() {
        push("table must not be empty".to_string());
    }
    if manifest.context.region.is_empty() {
        push("context.region must not be empty".to_string());
    }
    if manifest.context.account.is_empty() {
        push("context.account must not be empty".to_string());
    }
    if manifest.artifact.build.is_empty() {
        push("artifact.build must not be empty".to_string());
    }
    if manifest.compute.handler.is_empty() {
        push("compute.handler must not be empty".to_string());
    }
    if manifest.compute.timeout_seconds == 0 {
        push("compute.timeout_seconds must be greater than zero".to_string());
    }
    if manifest.routes.is_empty() {
        push("routes must not be empty".to_string());
    }

    for route in &manifest.routes {
        if route.methods.is_empty() {
            push(format!("route {} declares no methods", route.path));
        }
        for token in &route.methods {
            if token.parse::<HttpMethod>().is_err() {
                push(format!(
                    "route {} declares unknown method '{}'",
                    route.path, token
                ));
            }
        }
    }

    for token in &manifest.cors.allow_methods {
        if CorsMethod::from_token(token).is_err() {
            push(format!("cors.allow_methods contains unknown token '{}'", token));
        }
    }

    errors
}

impl StackManifest {
    /// Convert into composition inputs. Method tokens parse here; an
    /// unknown token is a `Configuration` error naming the field.
    pub fn to_params(&self) -> Result<(StackParams, TableReference)> {
        let mut routes = Vec::with_capacity(self.routes.len());
        for route in &self.routes {
            let mut methods = Vec::with_capacity(route.methods.len());
            for token in &route.methods {
                let method = token
                    .parse::<HttpMethod>()
                    .map_err(|e| ComposeError::config("route.methods", e))?;
                methods.push(method);
            }
            routes.push(RouteRequest {
                path: route.path.clone(),
                methods,
            });
        }

        let mut allow_methods = Vec::with_capacity(self.cors.allow_methods.len());
        for token in &self.cors.allow_methods {
            let m = CorsMethod::from_token(token)
                .map_err(|e| ComposeError::config("cors.allow_methods", e))?;
            allow_methods.push(m);
        }

        let params = StackParams {
            name: self.name.clone(),
            context: self.context.clone(),
            compute_id: self.compute.id.clone(),
            artifact: ArtifactReference {
                source_path: self.artifact.source.clone(),
                build_command: self.artifact.build.clone(),
                target_env: self.artifact.target_env,
            },
            handler_entry: self.compute.handler.clone(),
            env: self
                .compute
                .env
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            timeout: Duration::from_secs(self.compute.timeout_seconds),
            grant_level: self.grant,
            cors: CorsPolicy {
                allow_headers: self.cors.allow_headers.clone(),
                allow_methods,
                allow_origins: self.cors.allow_origins.clone(),
                max_age: Duration::from_secs(self.cors.max_age_days * SECONDS_PER_DAY),
            },
            stage: Stage {
                name: self.stage.name.clone(),
                auto_deploy: self.stage.auto_deploy,
                throttle: Throttle {
                    burst_limit: self.stage.throttle.burst,
                    rate_limit: self.stage.throttle.rate,
                },
            },
            routes,
        };

        Ok((params, TableReference::new(self.table.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::compose::compose;

    const SAMPLE: &str = r#"
version: "1.0"
name: users-api
context:
  region: us-east-1
  account: "123456789012"
table: Orders
artifact:
  source: ./svc
  build: ["/bin/sh", "-c", "make artifact"]
  target_env: linux_x86_64
compute:
  handler: bootstrap
  timeout_seconds: 7
  env:
    TABLE_NAME: Orders
grant: read-write
cors:
  allow_headers: [Authorization]
  allow_methods: ["*"]
  allow_origins: ["*"]
  max_age_days: 10
stage:
  name: "$default"
  auto_deploy: true
  throttle:
    burst: 2
    rate: 1
routes:
  - path: /users
    methods: [GET, POST]
  - path: /users/{id}
    methods: [GET, PUT, DELETE]
"#;

    #[test]
    fn test_parse_sample() {
        let m = parse_manifest(SAMPLE).unwrap();
        assert_eq!(m.version, "1.0");
        assert_eq!(m.name, "users-api");
        assert_eq!(m.table, "Orders");
        assert_eq!(m.compute.id, "handler");
        assert_eq!(m.compute.timeout_seconds, 7);
        assert_eq!(m.grant, AccessLevel::ReadWrite);
        assert_eq!(m.stage.throttle.burst, 2);
        assert_eq!(m.routes.len(), 2);
        assert!(validate_manifest(&m).is_empty());
    }

    #[test]
    fn test_defaults() {
        let yaml = r#"
version: "1.0"
name: minimal
context:
  region: eu-west-1
  account: "42"
table: Things
artifact:
  source: ./svc
  build: [make]
compute:
  handler: bootstrap
  timeout_seconds: 3
routes:
  - path: /things
    methods: [GET]
"#;
        let m = parse_manifest(yaml).unwrap();
        assert_eq!(m.grant, AccessLevel::ReadWrite);
        assert_eq!(m.artifact.target_env, TargetEnv::LinuxX86_64);
        assert_eq!(m.stage.name, "$default");
        assert!(m.stage.auto_deploy);
        assert_eq!(m.stage.throttle.burst, 0);
        assert_eq!(m.cors.allow_methods, vec!["*"]);
        assert!(m.compute.env.is_empty());
        assert!(validate_manifest(&m).is_empty());
    }

    #[test]
    fn test_validate_flags_problems() {
        let mut m = parse_manifest(SAMPLE).unwrap();
        m.version = "2.0".to_string();
        m.compute.timeout_seconds = 0;
        m.routes[0].methods = vec!["TELEPORT".to_string()];
        let errors = validate_manifest(&m);
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        assert!(messages.iter().any(|m| m.contains("version")));
        assert!(messages.iter().any(|m| m.contains("timeout_seconds")));
        assert!(messages.iter().any(|m| m.contains("TELEPORT")));
    }

    #[test]
    fn test_validate_empty_routes() {
        let mut m = parse_manifest(SAMPLE).unwrap();
        m.routes.clear();
        let errors = validate_manifest(&m);
        assert!(errors.iter().any(|e| e.to_string().contains("routes")));
    }

    #[test]
    fn test_to_params_and_compose() {
        let m = parse_manifest(SAMPLE).unwrap();
        let (params, table) = m.to_params().unwrap();
        assert_eq!(table.name, "Orders");
        assert_eq!(params.timeout, Duration::from_secs(7));
        assert_eq!(
            params.cors.max_age,
            Duration::from_secs(10 * SECONDS_PER_DAY)
        );

        let graph = compose(&params, &table).unwrap();
        assert_eq!(graph.entry_point.routes.len(), 2);
        assert_eq!(graph.compute[0].env["TABLE_NAME"], "Orders");
    }

    #[test]
    fn test_to_params_rejects_unknown_method() {
        let mut m = parse_manifest(SAMPLE).unwrap();
        m.routes[0].methods = vec!["TELEPORT".to_string()];
        let err = m.to_params().unwrap_err();
        assert!(matches!(
            err,
            ComposeError::Configuration {
                field: "route.methods",
                ..
            }
        ));
    }

    #[test]
    fn test_env_order_irrelevant_after_conversion() {
        let a = parse_manifest(
            &SAMPLE.replace(
                "  env:\n    TABLE_NAME: Orders",
                "  env:\n    TABLE_NAME: Orders\n    A_FLAG: \"1\"",
            ),
        )
        .unwrap();
        let b = parse_manifest(
            &SAMPLE.replace(
                "  env:\n    TABLE_NAME: Orders",
                "  env:\n    A_FLAG: \"1\"\n    TABLE_NAME: Orders",
            ),
        )
        .unwrap();
        let (pa, _) = a.to_params().unwrap();
        let (pb, _) = b.to_params().unwrap();
        assert_eq!(pa.env, pb.env);
    }

    #[test]
    fn test_manifest_roundtrip_preserves_env_order() {
        let m = parse_manifest(SAMPLE).unwrap();
        let yaml = serde_yaml_ng::to_string(&m).unwrap();
        let back: StackManifest = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(back.name, "users-api");
        assert_eq!(back.routes.len(), 2);
    }
}
