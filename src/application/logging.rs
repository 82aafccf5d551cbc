//! Runtime control over log verbosity.
//!
//! Log categories are short names for the crate's tracing targets. Setting a
//! category's level rewrites that target's directive and reloads the global
//! filter, so the change takes effect without a restart.
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Mutex;
use std::sync::PoisonError;

use serde::Deserialize;
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::reload;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

/// Directives used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_DIRECTIVES: &str = "info";

/// category name and the tracing target it controls
const CATEGORIES: &[(&str, &str)] = &[
    ("auth", "wallet_common::application::rpc::auth"),
    ("config", "wallet_common::application::config"),
    ("dispatch", "wallet_common::application::rpc::core"),
    ("logging", "wallet_common::application::logging"),
    ("records", "wallet_common::application::records"),
    ("rpc", "wallet_common::application::rpc::server"),
    ("service", "wallet_common"),
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[non_exhaustive]
pub enum LogError {
    #[error("unknown log category: {0}")]
    UnknownCategory(String),

    #[error("invalid log level: {0}")]
    InvalidLevel(String),

    #[error("log filter update failed: {0}")]
    Reload(String),
}

/// Log level control as seen by the RPC service.
pub trait LogService: Send + Sync + std::fmt::Debug {
    /// names of all categories, sorted
    fn list(&self) -> Vec<String>;

    /// sets the level of `category`.
    ///
    /// `level` is one of `off`, `error`, `warn`, `info`, `debug` or `trace`.
    fn set_level(&self, category: &str, level: &str) -> Result<(), LogError>;
}

/// [LogService] backed by a reloadable [EnvFilter].
pub struct LogLevels {
    handle: Option<reload::Handle<EnvFilter, Registry>>,
    base_directives: String,
    overrides: Mutex<BTreeMap<&'static str, LevelFilter>>,
}

impl std::fmt::Debug for LogLevels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogLevels")
            .field("reloadable", &self.handle.is_some())
            .field("base_directives", &self.base_directives)
            .finish_non_exhaustive()
    }
}

impl LogLevels {
    fn new(handle: Option<reload::Handle<EnvFilter, Registry>>, base_directives: String) -> Self {
        Self {
            handle,
            base_directives,
            overrides: Mutex::new(BTreeMap::new()),
        }
    }

    /// level control that records levels without a subscriber to reload,
    /// eg when traces go to tokio-console.
    pub fn detached() -> Self {
        Self::new(None, DEFAULT_DIRECTIVES.to_string())
    }

    /// Installs the global subscriber and returns its level control.
    ///
    /// Log lines carry an ISO-8601 (rfc3339) UTC timestamp and the thread id.
    /// The initial filter comes from `RUST_LOG`, falling back to
    /// [DEFAULT_DIRECTIVES].
    pub fn init_global() -> anyhow::Result<Self> {
        let base_directives = std::env::var(EnvFilter::DEFAULT_ENV)
            .ok()
            .filter(|d| EnvFilter::try_new(d).is_ok())
            .unwrap_or_else(|| DEFAULT_DIRECTIVES.to_string());

        let (filter, handle) = reload::Layer::new(EnvFilter::new(&base_directives));

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
                    .with_thread_ids(true),
            )
            .try_init()?;

        Ok(Self::new(Some(handle), base_directives))
    }

    /// the level set for `category`, if any
    pub fn level(&self, category: &str) -> Option<LevelFilter> {
        self.overrides
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(category)
            .copied()
    }

    fn target(category: &str) -> Option<(&'static str, &'static str)> {
        CATEGORIES.iter().copied().find(|(name, _)| *name == category)
    }

    fn directives(&self, overrides: &BTreeMap<&'static str, LevelFilter>) -> String {
        // later directives for the same target win, so overrides go last.
        std::iter::once(self.base_directives.clone())
            .chain(overrides.iter().filter_map(|(category, level)| {
                Self::target(category).map(|(_, target)| format!("{target}={level}"))
            }))
            .filter(|d| !d.is_empty())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl LogService for LogLevels {
    fn list(&self) -> Vec<String> {
        CATEGORIES
            .iter()
            .map(|(name, _)| name.to_string())
            .collect()
    }

    fn set_level(&self, category: &str, level: &str) -> Result<(), LogError> {
        let (name, _) =
            Self::target(category).ok_or_else(|| LogError::UnknownCategory(category.to_string()))?;
        let level_filter =
            LevelFilter::from_str(level).map_err(|_| LogError::InvalidLevel(level.to_string()))?;

        let mut overrides = self.overrides.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = overrides.insert(name, level_filter);

        if let Some(handle) = &self.handle {
            let reloaded = EnvFilter::try_new(self.directives(&overrides))
                .map_err(|e| LogError::Reload(e.to_string()))
                .and_then(|filter| {
                    handle
                        .reload(filter)
                        .map_err(|e| LogError::Reload(e.to_string()))
                });

            if let Err(e) = reloaded {
                match previous {
                    Some(p) => overrides.insert(name, p),
                    None => overrides.remove(name),
                };
                return Err(e);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn categories_are_sorted_and_unique() {
        let names = LogLevels::detached().list();
        let mut sorted = names.clone();
        sorted.sort();
        sorted.dedup();

        assert_eq!(sorted, names);
    }

    #[test]
    fn set_level_records_override() {
        let levels = LogLevels::detached();

        levels.set_level("auth", "debug").unwrap();
        levels.set_level("rpc", "off").unwrap();

        assert_eq!(Some(LevelFilter::DEBUG), levels.level("auth"));
        assert_eq!(Some(LevelFilter::OFF), levels.level("rpc"));
        assert_eq!(None, levels.level("records"));
    }

    #[test]
    fn set_level_rejects_unknown_category_and_level() {
        let levels = LogLevels::detached();

        assert_eq!(
            Err(LogError::UnknownCategory("miner".to_string())),
            levels.set_level("miner", "debug")
        );
        assert_eq!(
            Err(LogError::InvalidLevel("loud".to_string())),
            levels.set_level("auth", "loud")
        );
        assert_eq!(None, levels.level("auth"));
    }

    #[test]
    fn directives_append_overrides_to_base() {
        let levels = LogLevels::detached();
        levels.set_level("auth", "trace").unwrap();
        levels.set_level("records", "warn").unwrap();

        let overrides = levels.overrides.lock().unwrap();
        assert_eq!(
            "info,wallet_common::application::rpc::auth=trace,wallet_common::application::records=warn",
            levels.directives(&overrides)
        );
    }
}
