//! Error taxonomy for sfpack.

/// Errors produced while creating a package version.
#[derive(Debug, thiserror::Error)]
pub enum PackagingError {
    /// Bad or missing input, detected before any external call.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Project configuration cannot support the requested operation.
    #[error("configuration error: {0}")]
    Config(String),

    /// Manifest or credential file operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest or CLI payload could not be (de)serialized.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The CLI binary could not be launched at all.
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The CLI ran but reported failure or unparseable output.
    /// `payload` carries the raw provider output verbatim.
    #[error("{operation} failed: {payload}")]
    Upstream { operation: String, payload: String },

    /// The remote build job itself reported Error status.
    #[error("package version creation failed: {detail}")]
    UpstreamJob { job_id: String, detail: String },

    /// The retry budget ran out while the job was still pending.
    /// The remote job may still be running; this process gave up waiting.
    #[error("package version creation timed out after {attempts} status checks")]
    Timeout { attempts: u32 },
}

/// Result type for packaging operations.
pub type Result<T> = std::result::Result<T, PackagingError>;
