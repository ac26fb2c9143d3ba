//! Org authentication via a transient credential-URL file.
//!
//! The Salesforce login flow reads the sfdx auth URL from a file on
//! disk. That URL is a bearer-equivalent secret, so the file is written
//! immediately before the login call and removed on every exit path —
//! the `AuthFile` guard also removes it on drop if a panic unwinds past
//! the explicit removal.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::devhub::DevHubCli;
use crate::error::Result;

/// Name of the transient credential file.
pub const AUTH_FILE_NAME: &str = ".sfpack-auth-url";

/// A transient credential file, removed when the auth step ends.
#[derive(Debug)]
pub struct AuthFile {
    path: PathBuf,
    removed: bool,
}

impl AuthFile {
    /// Write `auth_url` to the transient file inside `dir`.
    pub fn create(dir: &Path, auth_url: &str) -> Result<Self> {
        let path = dir.join(AUTH_FILE_NAME);
        std::fs::write(&path, auth_url)?;
        debug!(path = %path.display(), "Wrote credential file");
        Ok(Self {
            path,
            removed: false,
        })
    }

    /// Path of the credential file, for the login invocation.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the credential file, consuming the guard.
    pub fn remove(mut self) -> Result<()> {
        std::fs::remove_file(&self.path)?;
        self.removed = true;
        debug!(path = %self.path.display(), "Removed credential file");
        Ok(())
    }
}

impl Drop for AuthFile {
    fn drop(&mut self) {
        if !self.removed {
            if let Err(err) = std::fs::remove_file(&self.path) {
                warn!(path = %self.path.display(), error = %err,
                    "Could not remove credential file");
            }
        }
    }
}

/// Authorize the Dev Hub org: write the credential file, log in, remove
/// the file. Removal happens before the login result is propagated, so
/// the secret never survives a failed login.
pub async fn authorize_org(
    cli: &dyn DevHubCli,
    dir: &Path,
    auth_url: &str,
    target_dev_hub: &str,
) -> Result<()> {
    let auth_file = AuthFile::create(dir, auth_url)?;
    let login = cli.org_login(auth_file.path(), target_dev_hub).await;
    let removal = auth_file.remove();
    login.and(removal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;

    use crate::devhub::{
        PackageCreateRequest, PackageCreateResult, PackageListing, VersionCreateJob,
        VersionCreateRequest, VersionReportEntry,
    };
    use crate::error::PackagingError;

    /// Login stub that records the file contents it saw and either
    /// succeeds or fails.
    struct LoginStub {
        fail: bool,
        seen_url: std::sync::Mutex<Option<String>>,
    }

    #[async_trait]
    impl DevHubCli for LoginStub {
        async fn org_login(&self, auth_file: &Path, _alias: &str) -> crate::error::Result<()> {
            let contents = std::fs::read_to_string(auth_file).unwrap();
            *self.seen_url.lock().unwrap() = Some(contents);
            if self.fail {
                Err(PackagingError::Upstream {
                    operation: "org login".to_string(),
                    payload: "invalid auth url".to_string(),
                })
            } else {
                Ok(())
            }
        }

        async fn package_list(
            &self,
            _target_dev_hub: &str,
        ) -> crate::error::Result<Vec<PackageListing>> {
            unimplemented!()
        }

        async fn package_create(
            &self,
            _req: &PackageCreateRequest,
        ) -> crate::error::Result<PackageCreateResult> {
            unimplemented!()
        }

        async fn package_version_create(
            &self,
            _req: &VersionCreateRequest,
        ) -> crate::error::Result<VersionCreateJob> {
            unimplemented!()
        }

        async fn package_version_report(
            &self,
            _job_id: &str,
        ) -> crate::error::Result<Vec<VersionReportEntry>> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn test_authorize_org_removes_file_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let stub = LoginStub {
            fail: false,
            seen_url: std::sync::Mutex::new(None),
        };

        authorize_org(&stub, dir.path(), "force://secret@example.com", "Hub")
            .await
            .unwrap();

        assert_eq!(
            stub.seen_url.lock().unwrap().as_deref(),
            Some("force://secret@example.com")
        );
        assert!(!dir.path().join(AUTH_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn test_authorize_org_removes_file_on_login_failure() {
        let dir = tempfile::tempdir().unwrap();
        let stub = LoginStub {
            fail: true,
            seen_url: std::sync::Mutex::new(None),
        };

        let err = authorize_org(&stub, dir.path(), "force://bad", "Hub")
            .await
            .unwrap_err();

        assert!(matches!(err, PackagingError::Upstream { .. }));
        assert!(!dir.path().join(AUTH_FILE_NAME).exists());
    }

    #[test]
    fn test_auth_file_drop_is_backstop() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let file = AuthFile::create(dir.path(), "force://secret").unwrap();
            file.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_create_fails_on_unwritable_dir() {
        let err = AuthFile::create(Path::new("/nonexistent-sfpack-dir"), "url").unwrap_err();
        assert!(matches!(err, PackagingError::Io(_)));
    }
}
