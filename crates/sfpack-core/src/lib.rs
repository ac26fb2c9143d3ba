//! sfpack-core - Salesforce 2GP package version automation
//!
//! Drives the Salesforce CLI to:
//! - Authenticate a Dev Hub org from an sfdx auth URL
//! - Create the package container when it does not exist yet
//! - Submit an asynchronous package-version build job
//! - Poll the job to a terminal state within a bounded attempt budget
//! - Record the resulting aliases in `sfdx-project.json`

pub mod auth;
pub mod devhub;
pub mod error;
pub mod exec;
pub mod manifest;
pub mod package;
pub mod poll;
pub mod run;

// Re-export key types
pub use auth::{authorize_org, AuthFile, AUTH_FILE_NAME};
pub use devhub::{
    DevHubCli, PackageCreateRequest, PackageCreateResult, PackageListing, SfCli, VersionCreateJob,
    VersionCreateRequest, VersionReportEntry,
};
pub use error::{PackagingError, Result};
pub use exec::{CliCommand, CliOutcome};
pub use manifest::{AliasKey, PackageDirectory, SfdxProject, MANIFEST_FILE_NAME};
pub use package::{create_package, package_exists, submit_version, ContainerParams, JobId};
pub use poll::{poll_version_status, PackageReport, PollConfig};
pub use run::{run, RunOutputs, RunParams};
