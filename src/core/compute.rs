//! Compute resource builder.
//!
//! Pure value construction: the recorded build command is executed later by
//! the external build collaborator, never here.

use crate::core::error::{ComposeError, Result};
use crate::core::types::{ArtifactReference, ComputeResource};
use std::collections::BTreeMap;
use std::time::Duration;

impl ComputeResource {
    /// Construct a validated compute resource.
    ///
    /// Fails with a `Configuration` error if the id or handler entry is
    /// empty, the artifact's build command is empty, or the timeout is not
    /// strictly positive.
    pub fn new(
        id: impl Into<String>,
        artifact: ArtifactReference,
        handler_entry: impl Into<String>,
        env: BTreeMap<String, String>,
        timeout: Duration,
    ) -> Result<Self> {
        let id = id.into();
        let handler_entry = handler_entry.into();

        if id.is_empty() {
            return Err(ComposeError::config("compute.id", "must not be empty"));
        }
        if handler_entry.is_empty() {
            return Err(ComposeError::config(
                "compute.handler",
                "must not be empty",
            ));
        }
        if artifact.build_command.is_empty() {
            return Err(ComposeError::config(
                "artifact.build",
                "build command must not be empty",
            ));
        }
        if timeout.is_zero() {
            return Err(ComposeError::config(
                "compute.timeout",
                "must be greater than zero",
            ));
        }

        Ok(Self {
            id,
            artifact,
            handler_entry,
            env,
            timeout,
        })
    }
}
