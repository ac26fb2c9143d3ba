//! Package container and version operations.

use tracing::info;

use crate::devhub::{DevHubCli, PackageCreateRequest, VersionCreateRequest};
use crate::error::{PackagingError, Result};
use crate::manifest::{AliasKey, SfdxProject};

/// Handle for an in-flight, server-side version-create job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobId(pub String);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether the Dev Hub already knows a package under this id, name, or
/// alias. Matching is verbatim and case-sensitive.
///
/// A failed list call propagates — existence cannot be determined, so
/// it is never reported as "does not exist".
pub async fn package_exists(
    cli: &dyn DevHubCli,
    package: &str,
    target_dev_hub: &str,
) -> Result<bool> {
    let listings = cli.package_list(target_dev_hub).await?;
    Ok(listings.iter().any(|pkg| {
        pkg.id == package || pkg.name == package || pkg.alias.as_deref() == Some(package)
    }))
}

/// Metadata for creating a package container.
#[derive(Debug, Clone)]
pub struct ContainerParams {
    /// Package type: "Unlocked" or "Managed".
    pub package_type: String,

    /// Create without a namespace.
    pub no_namespace: bool,

    /// Depends on unpackaged metadata in the installation org.
    pub org_dependent: bool,

    /// Dev Hub user to notify about package errors.
    pub error_notification_username: Option<String>,

    /// API version override.
    pub api_version: Option<String>,
}

impl Default for ContainerParams {
    fn default() -> Self {
        Self {
            package_type: "Unlocked".to_string(),
            no_namespace: false,
            org_dependent: false,
            error_notification_username: None,
            api_version: None,
        }
    }
}

/// Create the package container and record its id under the bare
/// package name in the in-memory manifest.
///
/// The destination path comes from the manifest's package directories;
/// creation cannot proceed without one.
pub async fn create_package(
    cli: &dyn DevHubCli,
    project: &mut SfdxProject,
    name: &str,
    target_dev_hub: &str,
    params: &ContainerParams,
) -> Result<String> {
    let path = project.package_path(name).ok_or_else(|| {
        PackagingError::Config(format!(
            "no package directory path found for '{}'; declare it in sfdx-project.json",
            name
        ))
    })?;

    let request = PackageCreateRequest {
        target_dev_hub: target_dev_hub.to_string(),
        name: name.to_string(),
        path: path.to_string(),
        package_type: params.package_type.clone(),
        no_namespace: params.no_namespace,
        org_dependent: params.org_dependent,
        error_notification_username: params.error_notification_username.clone(),
        api_version: params.api_version.clone(),
    };

    let created = cli.package_create(&request).await?;
    info!(package = name, id = %created.id, "Created package container");

    project.record_alias(
        &AliasKey::Container {
            name: name.to_string(),
        },
        &created.id,
    );
    Ok(created.id)
}

/// Submit the asynchronous version-create job. Returns the job handle;
/// polling is the caller's business.
pub async fn submit_version(cli: &dyn DevHubCli, request: &VersionCreateRequest) -> Result<JobId> {
    let job = cli.package_version_create(request).await?;
    info!(job_id = %job.id, "Submitted package version create request");
    Ok(JobId(job.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;

    use crate::devhub::{
        PackageCreateResult, PackageListing, VersionCreateJob, VersionReportEntry,
    };

    struct ListingFake {
        listings: Vec<PackageListing>,
        fail_list: bool,
        created: Mutex<Vec<PackageCreateRequest>>,
    }

    impl ListingFake {
        fn with_listings(listings: Vec<PackageListing>) -> Self {
            Self {
                listings,
                fail_list: false,
                created: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                listings: Vec::new(),
                fail_list: true,
                created: Mutex::new(Vec::new()),
            }
        }
    }

    fn listing(id: &str, name: &str, alias: Option<&str>) -> PackageListing {
        PackageListing {
            id: id.to_string(),
            name: name.to_string(),
            alias: alias.map(|a| a.to_string()),
            container_options: Some("Unlocked".to_string()),
            namespace_prefix: None,
        }
    }

    #[async_trait]
    impl DevHubCli for ListingFake {
        async fn org_login(&self, _auth_file: &Path, _alias: &str) -> Result<()> {
            Ok(())
        }

        async fn package_list(&self, _target_dev_hub: &str) -> Result<Vec<PackageListing>> {
            if self.fail_list {
                return Err(PackagingError::Upstream {
                    operation: "package list".to_string(),
                    payload: "expired access token".to_string(),
                });
            }
            Ok(self.listings.clone())
        }

        async fn package_create(&self, req: &PackageCreateRequest) -> Result<PackageCreateResult> {
            self.created.lock().unwrap().push(req.clone());
            Ok(PackageCreateResult {
                id: "0HoNEW1".to_string(),
            })
        }

        async fn package_version_create(
            &self,
            _req: &VersionCreateRequest,
        ) -> Result<VersionCreateJob> {
            Ok(VersionCreateJob {
                id: "08cJOB1".to_string(),
                status: Some("Queued".to_string()),
            })
        }

        async fn package_version_report(&self, _job_id: &str) -> Result<Vec<VersionReportEntry>> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn test_exists_matches_id_name_or_alias() {
        let fake = ListingFake::with_listings(vec![listing("0HoPKG1", "MyPkg", Some("mypkg"))]);

        assert!(package_exists(&fake, "0HoPKG1", "Hub").await.unwrap());
        assert!(package_exists(&fake, "MyPkg", "Hub").await.unwrap());
        assert!(package_exists(&fake, "mypkg", "Hub").await.unwrap());
        assert!(!package_exists(&fake, "Other", "Hub").await.unwrap());
        // Exact match only.
        assert!(!package_exists(&fake, "MYPKG", "Hub").await.unwrap());
        assert!(!package_exists(&fake, "MyPk", "Hub").await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_propagates_list_failure() {
        let fake = ListingFake::failing();
        let err = package_exists(&fake, "MyPkg", "Hub").await.unwrap_err();
        assert!(matches!(err, PackagingError::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_create_package_records_container_alias() {
        let fake = ListingFake::with_listings(vec![]);
        let mut project: SfdxProject = serde_json::from_value(serde_json::json!({
            "packageDirectories": [ { "path": "force-app", "package": "MyPkg" } ]
        }))
        .unwrap();

        let id = create_package(&fake, &mut project, "MyPkg", "Hub", &ContainerParams::default())
            .await
            .unwrap();

        assert_eq!(id, "0HoNEW1");
        assert_eq!(project.package_aliases.get("MyPkg").unwrap(), "0HoNEW1");

        let created = fake.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].path, "force-app");
        assert_eq!(created[0].package_type, "Unlocked");
    }

    #[tokio::test]
    async fn test_create_package_without_directory_is_config_error() {
        let fake = ListingFake::with_listings(vec![]);
        let mut project = SfdxProject::default();

        let err = create_package(&fake, &mut project, "MyPkg", "Hub", &ContainerParams::default())
            .await
            .unwrap_err();

        assert!(matches!(err, PackagingError::Config(_)));
        assert!(err.to_string().contains("no package directory path found"));
        assert!(fake.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_version_returns_job_handle() {
        let fake = ListingFake::with_listings(vec![]);
        let request = VersionCreateRequest {
            package: "MyPkg".to_string(),
            target_dev_hub: "Hub".to_string(),
            installation_key_bypass: true,
            ..Default::default()
        };

        let job = submit_version(&fake, &request).await.unwrap();
        assert_eq!(job, JobId("08cJOB1".to_string()));
    }
}
