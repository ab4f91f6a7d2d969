//! CLI subcommands — init, validate, synth, fingerprint.

use crate::core::{compose, manifest, types};
use crate::synth::{emit, fingerprint};
use clap::Subcommand;
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new stack declaration
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Validate stack.yaml and dry-compose the graph
    Validate {
        /// Path to stack.yaml
        #[arg(short, long, default_value = "stack.yaml")]
        file: PathBuf,
    },

    /// Compose the graph and emit canonical JSON for the deployment engine
    Synth {
        /// Path to stack.yaml
        #[arg(short, long, default_value = "stack.yaml")]
        file: PathBuf,

        /// Output directory
        #[arg(long, default_value = "synth")]
        out_dir: PathBuf,
    },

    /// Print the BLAKE3 fingerprint of the composed graph
    Fingerprint {
        /// Path to stack.yaml
        #[arg(short, long, default_value = "stack.yaml")]
        file: PathBuf,
    },
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), String> {
    match cmd {
        Commands::Init { path } => cmd_init(&path),
        Commands::Validate { file } => cmd_validate(&file),
        Commands::Synth { file, out_dir } => cmd_synth(&file, &out_dir),
        Commands::Fingerprint { file } => cmd_fingerprint(&file),
    }
}

fn cmd_init(path: &Path) -> Result<(), String> {
    let manifest_path = path.join("stack.yaml");
    if manifest_path.exists() {
        return Err(format!("{} already exists", manifest_path.display()));
    }
    std::fs::create_dir_all(path).map_err(|e| format!("cannot create dir: {}", e))?;

    let template = r#"version: "1.0"
name: my-stack
description: "Managed by trazar"

context:
  region: us-east-1
  account: "000000000000"

table: MyTable

artifact:
  source: ./service
  build: ["/bin/sh", "-c", "make artifact"]
  target_env: linux_x86_64

compute:
  handler: bootstrap
  timeout_seconds: 7
  env: {}

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
  - path: /items
    methods: [GET, POST]
  - path: /items/{id}
    methods: [GET, PUT, DELETE]
"#;
    std::fs::write(&manifest_path, template)
        .map_err(|e| format!("cannot write {}: {}", manifest_path.display(), e))?;

    println!("Initialized trazar stack at {}", path.display());
    println!("  Created: {}", manifest_path.display());
    Ok(())
}

fn cmd_validate(file: &Path) -> Result<(), String> {
    let graph = parse_and_compose(file)?;
    println!(
        "OK: {} ({} compute, {} grants, {} routes)",
        graph.name,
        graph.compute.len(),
        graph.grants.len(),
        graph.entry_point.routes.len()
    );
    Ok(())
}

fn cmd_synth(file: &Path, out_dir: &Path) -> Result<(), String> {
    let graph = parse_and_compose(file)?;
    let result =
        emit::synthesize(&graph, &emit::NoopBuilder, out_dir).map_err(|e| e.to_string())?;
    println!("Synthesized: {}", graph.name);
    println!("  Graph:       {}", result.json_path.display());
    println!("  Artifact:    {}", result.artifact_path.display());
    println!("  Fingerprint: {}", result.fingerprint);
    Ok(())
}

fn cmd_fingerprint(file: &Path) -> Result<(), String> {
    let graph = parse_and_compose(file)?;
    let fp = fingerprint::fingerprint_graph(&graph).map_err(|e| e.to_string())?;
    println!("{}", fp);
    Ok(())
}

/// Parse stack.yaml, report every validation error, then compose.
fn parse_and_compose(file: &Path) -> Result<types::StackGraph, String> {
    let m = manifest::parse_manifest_file(file)?;
    let errors = manifest::validate_manifest(&m);
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("  ERROR: {}", e);
        }
        return Err(format!("{} validation error(s)", errors.len()));
    }
    let (params, table) = m.to_params().map_err(|e| e.to_string())?;
    compose::compose(&params, &table).map_err(|e| e.to_string())
}
