use std::fmt::Display;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use directories::ProjectDirs;
use serde::Deserialize;
use serde::Serialize;

const JWT_SECRET_FILE_NAME: &str = "jwt.secret";
const ADMIN_TOKEN_FILE_NAME: &str = "token";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataDirectory {
    data_dir: PathBuf,
}

impl DataDirectory {
    ///////////////////////////////////////////////////////////////////////////
    ///
    /// The data directory that holds the token signing secret and the admin
    /// token file.
    ///
    /// The default varies by operating system, e.g.
    ///
    /// - Linux:   /home/alice/.local/share/wallet-common
    /// - Windows: C:\Users\Alice\AppData\Roaming\wallet-common\data
    /// - macOS:   /Users/Alice/Library/Application Support/wallet-common
    pub fn get(root_dir: Option<PathBuf>) -> Result<Self> {
        if let Some(data_dir) = root_dir {
            return Ok(Self { data_dir });
        }

        let project_dirs = ProjectDirs::from("", "", "wallet-common")
            .context("Could not determine data directory")?;

        Ok(Self {
            data_dir: project_dirs.data_dir().to_path_buf(),
        })
    }

    /// Create directory if it does not exist
    pub async fn create_dir_if_not_exists(dir: &Path) -> Result<()> {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create data directory {}", dir.to_string_lossy()))
    }

    ///////////////////////////////////////////////////////////////////////////
    ///
    /// The root data directory path
    pub fn root_dir_path(&self) -> PathBuf {
        self.data_dir.clone()
    }

    /// The file holding the HS256 secret used to sign and verify tokens.
    pub fn jwt_secret_file_path(&self) -> PathBuf {
        self.data_dir.join(Path::new(JWT_SECRET_FILE_NAME))
    }

    /// The file an admin token is written to at startup.
    ///
    /// Local clients with read access to this file can authenticate without
    /// further setup.
    pub fn admin_token_file_path(&self) -> PathBuf {
        self.data_dir.join(Path::new(ADMIN_TOKEN_FILE_NAME))
    }
}

impl Display for DataDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.data_dir.display())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn explicit_root_is_used_verbatim() {
        let root = PathBuf::from("/tmp/wallet-common-explicit");
        let data_dir = DataDirectory::get(Some(root.clone())).unwrap();

        assert_eq!(root, data_dir.root_dir_path());
        assert_eq!(root.join("jwt.secret"), data_dir.jwt_secret_file_path());
        assert_eq!(root.join("token"), data_dir.admin_token_file_path());
    }
}
