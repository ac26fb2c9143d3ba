//! Bounded status polling for version-create jobs.
//!
//! The remote build's duration is provider-controlled and unpredictable,
//! so the wait is bounded by attempt count rather than a wall-clock
//! deadline: effective deadline = `max_attempts × interval`, with each
//! check cheap and the loop cancellable between attempts.

use chrono::Local;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

use crate::devhub::{DevHubCli, VersionReportEntry};
use crate::error::{PackagingError, Result};
use crate::package::JobId;

/// Installation URL template; the subscriber package version id is
/// appended.
const INSTALL_URL_PREFIX: &str =
    "https://login.salesforce.com/packaging/installPackage.apexp?p0=";

/// Polling loop configuration, supplied once at invocation start.
/// Both fields must be positive; the caller validates before the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Suspension between consecutive status checks.
    pub interval: Duration,

    /// Status-check budget before giving up.
    pub max_attempts: u32,
}

/// The three semantically distinguished status classes. The provider's
/// label set is open-ended; anything that is not terminal counts as
/// still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobState {
    InProgress,
    Success,
    Error,
}

impl JobState {
    fn classify(label: &str) -> Self {
        match label {
            "Success" => JobState::Success,
            "Error" => JobState::Error,
            _ => JobState::InProgress,
        }
    }
}

/// Terminal snapshot of a successful version-create job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PackageReport {
    /// Job id.
    pub id: String,

    /// Terminal status label ("Success").
    pub status: String,

    /// Package container id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package2_id: Option<String>,

    /// Package container name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package2_name: Option<String>,

    /// Package version id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package2_version_id: Option<String>,

    /// Subscriber package version id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscriber_package_version_id: Option<String>,

    /// Semantic version number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_number: Option<String>,

    /// Install URL for the new version.
    pub installation_link: String,
}

impl PackageReport {
    fn from_entry(entry: VersionReportEntry) -> Self {
        let installation_link = format!(
            "{}{}",
            INSTALL_URL_PREFIX,
            entry.subscriber_package_version_id.as_deref().unwrap_or("")
        );
        Self {
            id: entry.id,
            status: entry.status,
            package2_id: entry.package2_id,
            package2_name: entry.package2_name,
            package2_version_id: entry.package2_version_id,
            subscriber_package_version_id: entry.subscriber_package_version_id,
            version_number: entry.version_number,
            installation_link,
        }
    }
}

/// Poll the job until it reaches a terminal state or the attempt budget
/// runs out.
///
/// One status query per iteration; the reported status lives in the
/// first element of the result collection. A failed query propagates
/// immediately — it is not "still in progress" and does not consume a
/// wait. Timing out does not mean the remote job stopped; only that
/// this process gave up waiting.
pub async fn poll_version_status(
    cli: &dyn DevHubCli,
    job_id: &JobId,
    config: &PollConfig,
) -> Result<PackageReport> {
    let mut attempt: u32 = 0;
    loop {
        if attempt >= config.max_attempts {
            return Err(PackagingError::Timeout { attempts: attempt });
        }

        let entries = cli.package_version_report(&job_id.0).await?;
        let entry = entries
            .into_iter()
            .next()
            .ok_or_else(|| PackagingError::Upstream {
                operation: "package version create report".to_string(),
                payload: "empty result collection".to_string(),
            })?;

        match JobState::classify(&entry.status) {
            JobState::Success => {
                info!(job_id = %job_id, "Package version created");
                return Ok(PackageReport::from_entry(entry));
            }
            JobState::Error => {
                let detail = match entry.error {
                    Some(serde_json::Value::String(text)) => text,
                    Some(other) => other.to_string(),
                    None => "no error detail reported".to_string(),
                };
                return Err(PackagingError::UpstreamJob {
                    job_id: job_id.0.clone(),
                    detail,
                });
            }
            JobState::InProgress => {
                info!(
                    "[{}] Still in progress... Status: {}",
                    Local::now().format("%H:%M:%S"),
                    entry.status
                );
                tokio::time::sleep(config.interval).await;
                attempt += 1;
            }
        }
    }
}
