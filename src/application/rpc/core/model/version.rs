use serde::Deserialize;
use serde::Serialize;

/// Version report of a running service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// build version of the service binary
    #[serde(rename = "Version")]
    pub version: String,

    /// version of the RPC interface the service speaks
    #[serde(rename = "APIVersion")]
    pub api_version: semver::Version,
}

impl std::fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (api {})", self.version, self.api_version)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn wire_names() {
        let info = VersionInfo {
            version: "0.1.0".to_string(),
            api_version: semver::Version::new(1, 0, 0),
        };

        assert_eq!(
            serde_json::json!({"Version": "0.1.0", "APIVersion": "1.0.0"}),
            serde_json::to_value(&info).unwrap()
        );
        assert_eq!("0.1.0 (api 1.0.0)", info.to_string());
    }
}
