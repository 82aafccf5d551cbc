use std::env;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Result;
use rand::distr::Alphanumeric;
use rand::distr::SampleString;

use crate::application::config::data_directory::DataDirectory;

/// Create a randomly named `DataDirectory` so filesystem-bound tests can run
/// in parallel without sharing a token secret.
pub(crate) fn unit_test_data_directory() -> Result<DataDirectory> {
    let mut rng = rand::rng();
    let user = env::var("USER").unwrap_or_else(|_| "default".to_string());
    let tmp_root: PathBuf = env::temp_dir()
        .join(format!("wallet-common-unit-tests-{}", user))
        .join(Path::new(&Alphanumeric.sample_string(&mut rng, 16)));

    DataDirectory::get(Some(tmp_root))
}
