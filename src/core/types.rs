//! All types of the declared stack graph.
//!
//! A stack is a small closed set of plain value types wired by data
//! relationships: an artifact built from source, the compute resource that
//! runs it, access grants against an external table, and an HTTP entry
//! point with route bindings. All graph types derive Serialize/Deserialize
//! so the composed graph roundtrips through the JSON handed to the
//! synthesis engine.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// Deployment context
// ============================================================================

/// Explicit deployment target. Passed into composition, never read from
/// the ambient environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployContext {
    /// Provider region (e.g. "us-east-1")
    pub region: String,

    /// Provider account identifier
    pub account: String,
}

// ============================================================================
// Artifact
// ============================================================================

/// Target execution environment for a built artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetEnv {
    #[serde(rename = "linux_x86_64")]
    LinuxX86_64,
    #[serde(rename = "linux_arm64")]
    LinuxArm64,
}

impl fmt::Display for TargetEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LinuxX86_64 => write!(f, "linux_x86_64"),
            Self::LinuxArm64 => write!(f, "linux_arm64"),
        }
    }
}

/// A buildable source location plus the command that packages it.
///
/// The build itself is executed by an external collaborator; this type
/// only records the specification of that build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactReference {
    /// Local source directory handed to the build collaborator
    pub source_path: PathBuf,

    /// Build command (argv). Must produce exactly one artifact at
    /// [`ArtifactReference::output_path`].
    pub build_command: Vec<String>,

    /// Target OS/arch tag
    pub target_env: TargetEnv,
}

impl ArtifactReference {
    /// Well-known output location the build command must populate.
    pub fn output_path(&self) -> PathBuf {
        self.source_path.join("dist").join("bootstrap")
    }
}

// ============================================================================
// Compute
// ============================================================================

/// A compute resource wrapping one artifact. Immutable after construction;
/// built via `ComputeResource::new`, which enforces the field invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeResource {
    /// Unique id within the stack
    pub id: String,

    /// Exclusively owned artifact specification
    pub artifact: ArtifactReference,

    /// Entry point name inside the artifact
    pub handler_entry: String,

    /// Environment variables. Sorted map: insertion order is irrelevant
    /// and sorted keys keep the canonical JSON deterministic.
    pub env: BTreeMap<String, String>,

    /// Invocation timeout, strictly positive
    #[serde(rename = "timeout_seconds", with = "duration_secs")]
    pub timeout: Duration,
}

// ============================================================================
// Table reference
// ============================================================================

/// Opaque handle to a pre-existing table owned by another stack.
/// A back reference: relation only, never ownership. This core never
/// creates, destroys, or mutates the table it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableReference {
    /// Resolvable table name
    pub name: String,
}

impl TableReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

// ============================================================================
// Permission grants
// ============================================================================

/// Access level of a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessLevel {
    Read,
    Write,
    ReadWrite,
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
            Self::ReadWrite => write!(f, "read-write"),
        }
    }
}

impl FromStr for AccessLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "read-write" | "read_write" => Ok(Self::ReadWrite),
            other => Err(format!("unknown access level: {}", other)),
        }
    }
}

/// A directed access edge from a compute resource to a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// Id of the compute resource receiving access
    pub actor_id: String,

    /// Name of the target table
    pub table: String,

    /// Granted access level
    pub level: AccessLevel,
}

// ============================================================================
// Routes
// ============================================================================

/// Recognized HTTP method tokens. `Any` is the front door's wildcard and
/// conflicts with every concrete method on the same path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Any,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
            Self::Patch => write!(f, "PATCH"),
            Self::Options => write!(f, "OPTIONS"),
            Self::Any => write!(f, "ANY"),
        }
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("GET") {
            Ok(Self::Get)
        } else if s.eq_ignore_ascii_case("POST") {
            Ok(Self::Post)
        } else if s.eq_ignore_ascii_case("PUT") {
            Ok(Self::Put)
        } else if s.eq_ignore_ascii_case("DELETE") {
            Ok(Self::Delete)
        } else if s.eq_ignore_ascii_case("PATCH") {
            Ok(Self::Patch)
        } else if s.eq_ignore_ascii_case("OPTIONS") {
            Ok(Self::Options)
        } else if s.eq_ignore_ascii_case("ANY") {
            Ok(Self::Any)
        } else {
            Err(format!("unknown HTTP method: {}", s))
        }
    }
}

/// One route: a normalized path pattern, its method set (deduplicated,
/// declaration order preserved), and the compute resource it targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteBinding {
    /// Normalized path pattern, may contain one `{param}` segment
    pub path: String,

    /// Non-empty, duplicate-free method set
    pub methods: Vec<HttpMethod>,

    /// Id of the target compute resource
    pub target_id: String,
}

// ============================================================================
// Entry point
// ============================================================================

/// A CORS allow-list entry: a concrete method or the `*` wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorsMethod {
    Any,
    Method(HttpMethod),
}

impl CorsMethod {
    /// Parse a manifest token (`"*"` or a method name).
    pub fn from_token(token: &str) -> Result<Self, String> {
        if token == "*" {
            Ok(Self::Any)
        } else {
            token.parse::<HttpMethod>().map(Self::Method)
        }
    }
}

impl fmt::Display for CorsMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "*"),
            Self::Method(m) => write!(f, "{}", m),
        }
    }
}

impl Serialize for CorsMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CorsMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Self::from_token(&token).map_err(serde::de::Error::custom)
    }
}

/// Cross-origin policy applied uniformly to every route of an entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorsPolicy {
    pub allow_headers: Vec<String>,
    pub allow_methods: Vec<CorsMethod>,
    pub allow_origins: Vec<String>,
    #[serde(rename = "max_age_seconds", with = "duration_secs")]
    pub max_age: Duration,
}

/// Stage throttle limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Throttle {
    pub burst_limit: u32,
    pub rate_limit: u32,
}

/// A named, deployable configuration of an entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    pub auto_deploy: bool,
    pub throttle: Throttle,
}

/// Externally reachable HTTP surface. One CORS policy and one stage per
/// entry point; per-route CORS or throttling is out of scope by design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub cors: CorsPolicy,
    pub stage: Stage,

    /// Route bindings in declaration order (order is match priority)
    pub routes: Vec<RouteBinding>,
}

// ============================================================================
// Stack graph
// ============================================================================

/// The root of the composed graph — one deployable unit handed to the
/// external synthesis engine. Owns its compute resources and entry point;
/// the table is a non-owning back reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackGraph {
    /// Stack name
    pub name: String,

    /// Explicit deployment target
    pub context: DeployContext,

    /// External table the grants point at
    pub table: TableReference,

    /// Owned compute resources
    pub compute: Vec<ComputeResource>,

    /// Access grants, recorded before any route references their actor
    pub grants: Vec<PermissionGrant>,

    /// Owned entry point
    pub entry_point: EntryPoint,
}

// ============================================================================
// Duration (de)serialization as whole seconds
// ============================================================================

pub(crate) mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

// ============================================================================
// Tests
// ============================================================================
