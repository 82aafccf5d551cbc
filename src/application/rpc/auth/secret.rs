use std::path::Path;
use std::path::PathBuf;

use rand::distr::Alphanumeric;
use rand::distr::SampleString;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tracing::info;

use super::error::KeyFileError;
use crate::application::config::data_directory::DataDirectory;

/// defines size of the secret byte array
type SecretBytes = [u8; 32];

/// the HS256 secret tokens are signed and verified with
///
/// a secret file is created the first time the service starts and is reused
/// afterwards, so tokens stay valid across restarts.
// a signing secret is never implicitly copied
#[allow(missing_copy_implementations)]
#[derive(Clone, PartialEq, Eq)]
pub struct JwtSecret(SecretBytes);

impl std::fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("JwtSecret(..)")
    }
}

impl From<SecretBytes> for JwtSecret {
    fn from(bytes: SecretBytes) -> Self {
        Self(bytes)
    }
}

impl JwtSecret {
    /// load the secret file, or create it if it does not exist yet
    pub async fn load_or_create(data_dir: &DataDirectory) -> Result<Self, KeyFileError> {
        let path = Self::secret_file_path(data_dir);
        let exists = tokio::fs::try_exists(&path)
            .await
            .map_err(|e| KeyFileError {
                path: path.clone(),
                source_file: file!(),
                source_line: line!(),
                error: e,
            })?;

        if exists {
            Self::try_load(data_dir).await
        } else {
            info!("Creating token secret {}", path.display());
            Self::try_new(data_dir).await
        }
    }

    /// try loading secret from a file
    pub async fn try_load(data_dir: &DataDirectory) -> Result<Self, KeyFileError> {
        let mut secret: SecretBytes = [0; 32];
        let path = Self::secret_file_path(data_dir);
        let mut f = tokio::fs::File::open(&path)
            .await
            .map_err(|e| KeyFileError {
                path: path.clone(),
                source_file: file!(),
                source_line: line!(),
                error: e,
            })?;

        f.read_exact(&mut secret)
            .await
            .map_err(|e| KeyFileError {
                path,
                source_file: file!(),
                source_line: line!(),
                error: e,
            })?;

        Ok(Self(secret))
    }

    /// try creating a new secret file
    ///
    /// This will overwrite any existing secret file, invalidating every token
    /// signed with the old secret.
    pub async fn try_new(data_dir: &DataDirectory) -> Result<Self, KeyFileError> {
        let secret = Self::gen_secret();
        write_file_atomic(&Self::secret_file_path(data_dir), &secret).await?;
        Ok(Self(secret))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    fn gen_secret() -> SecretBytes {
        rand::random()
    }

    /// get secret file path
    pub fn secret_file_path(data_dir: &DataDirectory) -> PathBuf {
        data_dir.jwt_secret_file_path()
    }

    // creates a secret that exists in mem only, no file written to disk.
    pub fn new_in_mem() -> Self {
        Self(Self::gen_secret())
    }
}

/// writes `contents` to `path` via a temp file and a rename.
///
/// The rename is atomic on most filesystems, so concurrent readers see
/// either the old or the new contents. Missing parent directories are
/// created. On unix the file is readable and writable by its owner only.
pub(crate) async fn write_file_atomic(path: &Path, contents: &[u8]) -> Result<(), KeyFileError> {
    let mut path_tmp = path.to_path_buf();

    let extension = Alphanumeric.sample_string(&mut rand::rng(), 16);
    path_tmp.set_extension(extension);

    if let Some(parent_dir) = path.parent() {
        tokio::fs::create_dir_all(&parent_dir)
            .await
            .map_err(|e| KeyFileError {
                path: path.to_path_buf(),
                source_file: file!(),
                source_line: line!(),
                error: e,
            })?;
    }

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options
        .open(&path_tmp)
        .await
        .map_err(|e| KeyFileError {
            path: path_tmp.clone(),
            source_file: file!(),
            source_line: line!(),
            error: e,
        })?;

    file.write_all(contents)
        .await
        .map_err(|e| KeyFileError {
            path: path_tmp.clone(),
            source_file: file!(),
            source_line: line!(),
            error: e,
        })?;

    file.sync_all().await.map_err(|e| KeyFileError {
        path: path_tmp.clone(),
        source_file: file!(),
        source_line: line!(),
        error: e,
    })?;

    drop(file);

    tokio::fs::rename(&path_tmp, path)
        .await
        .map_err(|e| KeyFileError {
            path: path.to_path_buf(),
            source_file: file!(),
            source_line: line!(),
            error: e,
        })?;

    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use macro_rules_attr::apply;

    use super::*;
    use crate::tests::shared::unit_test_data_directory;
    use crate::tests::shared_tokio_runtime;

    /// tests:
    ///  1. load_or_create() creates a secret file on first use
    ///  2. load_or_create() returns the stored secret afterwards
    ///  3. try_new() replaces the stored secret
    #[apply(shared_tokio_runtime)]
    async fn load_or_create_reuses_stored_secret() -> anyhow::Result<()> {
        let data_dir = unit_test_data_directory()?;

        let created = JwtSecret::load_or_create(&data_dir).await?;
        assert!(JwtSecret::secret_file_path(&data_dir).exists());

        let loaded = JwtSecret::load_or_create(&data_dir).await?;
        assert_eq!(created, loaded);

        let replaced = JwtSecret::try_new(&data_dir).await?;
        assert_ne!(created, replaced);
        assert_eq!(replaced, JwtSecret::try_load(&data_dir).await?);

        Ok(())
    }

    #[apply(shared_tokio_runtime)]
    async fn try_load_fails_without_file() -> anyhow::Result<()> {
        let data_dir = unit_test_data_directory()?;

        let err = JwtSecret::try_load(&data_dir).await.unwrap_err();
        assert_eq!(JwtSecret::secret_file_path(&data_dir), err.path);

        Ok(())
    }

    #[cfg(unix)]
    #[apply(shared_tokio_runtime)]
    async fn written_files_are_private_to_owner() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let data_dir = unit_test_data_directory()?;
        JwtSecret::try_new(&data_dir).await?;
        let token_file = data_dir.admin_token_file_path();
        write_file_atomic(&token_file, b"a.b.c").await?;

        for path in [JwtSecret::secret_file_path(&data_dir), token_file] {
            let mode = tokio::fs::metadata(&path).await?.permissions().mode();
            assert_eq!(0o600, mode & 0o777, "{}", path.display());
        }

        Ok(())
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let secret = JwtSecret::from([7u8; 32]);
        assert_eq!("JwtSecret(..)", format!("{:?}", secret));
    }
}
