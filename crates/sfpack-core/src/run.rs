//! End-to-end orchestration of one package-version run.
//!
//! Sequence: authenticate → ensure the container exists → submit the
//! version-create job → poll to a terminal state → fold the result into
//! the manifest. The manifest is loaded once, owned by this function
//! for the run's duration, and written back exactly once at the end —
//! a run that fails anywhere leaves the on-disk manifest untouched.

use std::path::PathBuf;
use tracing::{info, warn};

use crate::auth;
use crate::devhub::{DevHubCli, VersionCreateRequest};
use crate::error::Result;
use crate::manifest::{self, AliasKey};
use crate::package::{self, ContainerParams};
use crate::poll::{self, PackageReport, PollConfig};

/// Everything one run needs, validated upstream.
#[derive(Debug, Clone)]
pub struct RunParams {
    /// Directory containing `sfdx-project.json`. The transient
    /// credential file is written here too.
    pub project_dir: PathBuf,

    /// Sfdx auth URL for the Dev Hub.
    pub auth_url: String,

    /// Dev Hub alias to authenticate and operate against.
    pub target_dev_hub: String,

    /// Package id, name, or alias.
    pub package: String,

    /// Bypass the installation key requirement. Exactly one of this
    /// and `installation_key` is set (validated in the input layer).
    pub installation_key_bypass: bool,

    /// Installation key protecting the version.
    pub installation_key: Option<String>,

    /// Skip validation during creation.
    pub skip_validation: bool,

    /// Calculate code coverage during creation.
    pub code_coverage: bool,

    /// Return before validations complete.
    pub async_validation: bool,

    /// Package directory path override.
    pub path: Option<String>,

    /// Version name override.
    pub version_name: Option<String>,

    /// Version description override.
    pub version_description: Option<String>,

    /// Version number override.
    pub version_number: Option<String>,

    /// Container metadata, used only when the package does not exist.
    pub container: ContainerParams,

    /// Polling configuration.
    pub poll: PollConfig,
}

/// Process outputs of a successful run.
#[derive(Debug, Clone)]
pub struct RunOutputs {
    /// Human-readable outcome.
    pub message: String,

    /// Version-create request id.
    pub package_version_id: String,

    /// Semantic version number of the new version.
    pub package_version_number: Option<String>,

    /// Full terminal snapshot.
    pub report: PackageReport,
}

/// Execute one run against the given Dev Hub CLI.
pub async fn run(cli: &dyn DevHubCli, params: &RunParams) -> Result<RunOutputs> {
    let mut project = manifest::load(&params.project_dir)?;

    info!(target_dev_hub = %params.target_dev_hub, "Authenticating Dev Hub org");
    auth::authorize_org(
        cli,
        &params.project_dir,
        &params.auth_url,
        &params.target_dev_hub,
    )
    .await?;

    if !package::package_exists(cli, &params.package, &params.target_dev_hub).await? {
        info!(package = %params.package, "Package not found on Dev Hub, creating container");
        package::create_package(
            cli,
            &mut project,
            &params.package,
            &params.target_dev_hub,
            &params.container,
        )
        .await?;
    }

    info!(package = %params.package, target_dev_hub = %params.target_dev_hub,
        "Creating package version");
    let request = VersionCreateRequest {
        package: params.package.clone(),
        target_dev_hub: params.target_dev_hub.clone(),
        installation_key_bypass: params.installation_key_bypass,
        installation_key: params.installation_key.clone(),
        skip_validation: params.skip_validation,
        code_coverage: params.code_coverage,
        async_validation: params.async_validation,
        path: params.path.clone(),
        version_name: params.version_name.clone(),
        version_description: params.version_description.clone(),
        version_number: params.version_number.clone(),
    };
    let job = package::submit_version(cli, &request).await?;

    info!(
        job_id = %job,
        interval_secs = params.poll.interval.as_secs(),
        max_attempts = params.poll.max_attempts,
        "Polling package version status"
    );
    let report = poll::poll_version_status(cli, &job, &params.poll).await?;

    let package_name = report
        .package2_name
        .clone()
        .unwrap_or_else(|| params.package.clone());
    match (&report.version_number, &report.subscriber_package_version_id) {
        (Some(version), Some(subscriber_id)) => {
            project.record_alias(
                &AliasKey::Version {
                    name: package_name,
                    version: version.clone(),
                },
                subscriber_id,
            );
        }
        _ => {
            warn!("Report lacks version number or subscriber id; packageAliases not updated");
        }
    }
    manifest::save(&params.project_dir, &project)?;

    Ok(RunOutputs {
        message: "Package version created successfully".to_string(),
        package_version_id: report.id.clone(),
        package_version_number: report.version_number.clone(),
        report,
    })
}
