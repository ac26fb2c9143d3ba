//! Dev Hub CLI boundary.
//!
//! Defines the `DevHubCli` async trait, one method per packaging
//! operation, plus `SfCli` — the real implementation that shells out to
//! the Salesforce CLI (`sf … --json`) through the command executor.
//! The trait is the testing seam: the poller and orchestrator run
//! against scripted fakes without spawning processes.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{PackagingError, Result};
use crate::exec::{self, CliCommand};

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Parameters for creating a package container.
#[derive(Debug, Clone)]
pub struct PackageCreateRequest {
    /// Dev Hub alias or username.
    pub target_dev_hub: String,

    /// Package name.
    pub name: String,

    /// Package directory path (resolved from the project manifest).
    pub path: String,

    /// Package type: "Unlocked" or "Managed".
    pub package_type: String,

    /// Create without a namespace (unlocked packages only).
    pub no_namespace: bool,

    /// Depends on unpackaged metadata in the installation org.
    pub org_dependent: bool,

    /// Dev Hub user to notify about package errors.
    pub error_notification_username: Option<String>,

    /// API version override.
    pub api_version: Option<String>,
}

/// Parameters for submitting an asynchronous version-create job.
#[derive(Debug, Clone, Default)]
pub struct VersionCreateRequest {
    /// Package id, name, or alias.
    pub package: String,

    /// Dev Hub alias or username.
    pub target_dev_hub: String,

    /// Bypass the installation key requirement.
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

    /// Version number override (major.minor.patch.build).
    pub version_number: Option<String>,
}

// ---------------------------------------------------------------------------
// Response types (sf --json schemas)
// ---------------------------------------------------------------------------

/// Top-level envelope of every `sf … --json` response.
#[derive(Debug, Clone, Deserialize)]
struct SfEnvelope<T> {
    status: i64,
    result: T,
}

/// One entry from `sf package list --verbose --json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PackageListing {
    /// Package id (0Ho format).
    pub id: String,

    /// Package name.
    pub name: String,

    /// Local alias, if any.
    #[serde(default)]
    pub alias: Option<String>,

    /// Container options, e.g. "Unlocked".
    #[serde(default)]
    pub container_options: Option<String>,

    /// Namespace prefix, if any.
    #[serde(default)]
    pub namespace_prefix: Option<String>,
}

/// Result of `sf package create --json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PackageCreateResult {
    /// New package id (0Ho format).
    pub id: String,
}

/// Result of `sf package version create --json`: the in-flight job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersionCreateJob {
    /// Job id (08c format) for status reporting.
    pub id: String,

    /// Initial status label.
    #[serde(default)]
    pub status: Option<String>,
}

/// One entry from `sf package version create report --json`.
///
/// Result fields beyond `Id` and `Status` are populated by the provider
/// only as the job progresses; all are optional here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersionReportEntry {
    /// Job id.
    pub id: String,

    /// Provider status label. Only "Success" and "Error" are terminal;
    /// every other label means the job is still running.
    pub status: String,

    /// Package container id (0Ho format).
    #[serde(default)]
    pub package2_id: Option<String>,

    /// Package container name.
    #[serde(default)]
    pub package2_name: Option<String>,

    /// Package version id (05i format).
    #[serde(default)]
    pub package2_version_id: Option<String>,

    /// Subscriber package version id (04t format).
    #[serde(default)]
    pub subscriber_package_version_id: Option<String>,

    /// Semantic version number (major.minor.patch.build).
    #[serde(default)]
    pub version_number: Option<String>,

    /// Error detail, present when `Status` is "Error".
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Trait boundary
// ---------------------------------------------------------------------------

/// Packaging operations against a Dev Hub, one method per CLI command.
#[async_trait]
pub trait DevHubCli: Send + Sync {
    /// Authorize an org from a credential-URL file and alias it.
    async fn org_login(&self, auth_file: &Path, alias: &str) -> Result<()>;

    /// List all packages known to the Dev Hub.
    async fn package_list(&self, target_dev_hub: &str) -> Result<Vec<PackageListing>>;

    /// Create a package container.
    async fn package_create(&self, req: &PackageCreateRequest) -> Result<PackageCreateResult>;

    /// Submit an asynchronous version-create job.
    async fn package_version_create(&self, req: &VersionCreateRequest) -> Result<VersionCreateJob>;

    /// Fetch the current status report for a version-create job.
    async fn package_version_report(&self, job_id: &str) -> Result<Vec<VersionReportEntry>>;
}

// ---------------------------------------------------------------------------
// Real implementation
// ---------------------------------------------------------------------------

/// `DevHubCli` backed by the Salesforce CLI binary.
#[derive(Debug, Clone)]
pub struct SfCli {
    /// Path to the `sf` binary.
    pub binary_path: String,
}

impl Default for SfCli {
    fn default() -> Self {
        Self {
            binary_path: "sf".to_string(),
        }
    }
}

impl SfCli {
    /// Use a specific `sf` binary path.
    pub fn with_binary(binary_path: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Run one command and unwrap the `{status, result}` envelope.
    async fn invoke<T: DeserializeOwned>(&self, operation: &str, args: Vec<String>) -> Result<T> {
        let cmd = CliCommand::new(&self.binary_path, args);
        let outcome = exec::execute(&cmd).await?;

        if !outcome.ok {
            return Err(PackagingError::Upstream {
                operation: operation.to_string(),
                payload: outcome.error.unwrap_or_default(),
            });
        }

        let payload = outcome.payload.unwrap_or(serde_json::Value::Null);
        let envelope: SfEnvelope<T> = serde_json::from_value(payload.clone())?;
        if envelope.status != 0 {
            return Err(PackagingError::Upstream {
                operation: operation.to_string(),
                payload: payload.to_string(),
            });
        }
        Ok(envelope.result)
    }
}

#[async_trait]
impl DevHubCli for SfCli {
    async fn org_login(&self, auth_file: &Path, alias: &str) -> Result<()> {
        let args = vec![
            "org".to_string(),
            "login".to_string(),
            "sfdx-url".to_string(),
            "--sfdx-url-file".to_string(),
            auth_file.to_string_lossy().to_string(),
            "--alias".to_string(),
            alias.to_string(),
            "--set-default-dev-hub".to_string(),
            "--json".to_string(),
        ];
        self.invoke::<serde_json::Value>("org login", args).await?;
        Ok(())
    }

    async fn package_list(&self, target_dev_hub: &str) -> Result<Vec<PackageListing>> {
        let args = vec![
            "package".to_string(),
            "list".to_string(),
            "--target-dev-hub".to_string(),
            target_dev_hub.to_string(),
            "--verbose".to_string(),
            "--json".to_string(),
        ];
        self.invoke("package list", args).await
    }

    async fn package_create(&self, req: &PackageCreateRequest) -> Result<PackageCreateResult> {
        let mut args = vec![
            "package".to_string(),
            "create".to_string(),
            "--target-dev-hub".to_string(),
            req.target_dev_hub.clone(),
            "--name".to_string(),
            req.name.clone(),
            "--path".to_string(),
            req.path.clone(),
            "--package-type".to_string(),
            req.package_type.clone(),
        ];
        if req.no_namespace {
            args.push("--no-namespace".to_string());
        }
        if req.org_dependent {
            args.push("--org-dependent".to_string());
        }
        if let Some(user) = &req.error_notification_username {
            args.push("--error-notification-username".to_string());
            args.push(user.clone());
        }
        if let Some(version) = &req.api_version {
            args.push("--api-version".to_string());
            args.push(version.clone());
        }
        args.push("--json".to_string());
        self.invoke("package create", args).await
    }

    async fn package_version_create(&self, req: &VersionCreateRequest) -> Result<VersionCreateJob> {
        let mut args = vec![
            "package".to_string(),
            "version".to_string(),
            "create".to_string(),
            "--package".to_string(),
            req.package.clone(),
            "--target-dev-hub".to_string(),
            req.target_dev_hub.clone(),
        ];
        if req.installation_key_bypass {
            args.push("--installation-key-bypass".to_string());
        }
        if let Some(key) = &req.installation_key {
            args.push("--installation-key".to_string());
            args.push(key.clone());
        }
        if req.skip_validation {
            args.push("--skip-validation".to_string());
        }
        if req.code_coverage {
            args.push("--code-coverage".to_string());
        }
        if req.async_validation {
            args.push("--async-validation".to_string());
        }
        if let Some(path) = &req.path {
            args.push("--path".to_string());
            args.push(path.clone());
        }
        if let Some(name) = &req.version_name {
            args.push("--version-name".to_string());
            args.push(name.clone());
        }
        if let Some(description) = &req.version_description {
            args.push("--version-description".to_string());
            args.push(description.clone());
        }
        if let Some(number) = &req.version_number {
            args.push("--version-number".to_string());
            args.push(number.clone());
        }
        args.push("--json".to_string());
        self.invoke("package version create", args).await
    }

    async fn package_version_report(&self, job_id: &str) -> Result<Vec<VersionReportEntry>> {
        let args = vec![
            "package".to_string(),
            "version".to_string(),
            "create".to_string(),
            "report".to_string(),
            "--package-create-request-id".to_string(),
            job_id.to_string(),
            "--json".to_string(),
        ];
        self.invoke("package version create report", args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_listing_deserializes_pascal_case() {
        let listing: PackageListing = serde_json::from_value(json!({
            "Id": "0Ho000000000001",
            "Name": "MyPkg",
            "Alias": "mypkg",
            "ContainerOptions": "Unlocked"
        }))
        .unwrap();
        assert_eq!(listing.id, "0Ho000000000001");
        assert_eq!(listing.name, "MyPkg");
        assert_eq!(listing.alias.as_deref(), Some("mypkg"));
    }

    #[test]
    fn test_report_entry_tolerates_missing_result_fields() {
        let entry: VersionReportEntry = serde_json::from_value(json!({
            "Id": "08cJOB1",
            "Status": "InProgress"
        }))
        .unwrap();
        assert_eq!(entry.status, "InProgress");
        assert!(entry.subscriber_package_version_id.is_none());
        assert!(entry.error.is_none());
    }

    #[test]
    fn test_report_entry_full_success_shape() {
        let entry: VersionReportEntry = serde_json::from_value(json!({
            "Id": "08cJOB1",
            "Status": "Success",
            "Package2Id": "0HoPKG1",
            "Package2Name": "MyPkg",
            "Package2VersionId": "05iVER1",
            "SubscriberPackageVersionId": "04tSUB1",
            "VersionNumber": "1.0.0.1"
        }))
        .unwrap();
        assert_eq!(entry.version_number.as_deref(), Some("1.0.0.1"));
        assert_eq!(
            entry.subscriber_package_version_id.as_deref(),
            Some("04tSUB1")
        );
    }

    #[test]
    fn test_envelope_unwraps_result() {
        let envelope: SfEnvelope<PackageCreateResult> = serde_json::from_value(json!({
            "status": 0,
            "result": { "Id": "0HoNEW1" },
            "warnings": []
        }))
        .unwrap();
        assert_eq!(envelope.status, 0);
        assert_eq!(envelope.result.id, "0HoNEW1");
    }
}
