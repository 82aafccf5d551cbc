use serde::Deserialize;
use serde::Serialize;
use serde_tuple::Deserialize_tuple;
use serde_tuple::Serialize_tuple;

use crate::application::rpc::auth::Permissions;
use crate::application::rpc::auth::Token;
use crate::application::rpc::core::model::record::QuerySignRecordParams;
use crate::application::rpc::core::model::record::SignRecord;
use crate::application::rpc::core::model::version::VersionInfo;

#[derive(Clone, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct AuthVerifyRequest {
    pub token: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthVerifyResponse {
    pub permissions: Permissions,
}

/// permission names stay strings until the handler decodes them, so an
/// unknown name fails as `UnsupportedPermission` rather than as bad params.
#[derive(Clone, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct AuthNewRequest {
    pub permissions: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthNewResponse {
    pub token: Token,
}

#[derive(Clone, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct AuthRevokeRequest {
    pub token: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRevokeResponse;

#[derive(Clone, Copy, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct LogListRequest {}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogListResponse {
    pub categories: Vec<String>,
}

#[derive(Clone, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct LogSetLevelRequest {
    pub category: String,
    pub level: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSetLevelResponse;

/// a `null` filter lists every record, same as `{}`.
#[derive(Clone, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct ListSignedRecordRequest {
    pub params: Option<QuerySignRecordParams>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListSignedRecordResponse {
    pub records: Vec<SignRecord>,
}

#[derive(Clone, Copy, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct VersionRequest {}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionResponse {
    pub info: VersionInfo,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::application::rpc::auth::Permission;

    #[test]
    fn requests_are_positional() {
        let req = LogSetLevelRequest {
            category: "auth".to_string(),
            level: "debug".to_string(),
        };
        assert_eq!(json!(["auth", "debug"]), serde_json::to_value(&req).unwrap());
        assert_eq!(json!([]), serde_json::to_value(VersionRequest {}).unwrap());

        let req: AuthNewRequest = serde_json::from_value(json!([["read", "write"]])).unwrap();
        assert_eq!(vec!["read", "write"], req.permissions);
    }

    #[test]
    fn responses_are_bare_values() {
        let resp = AuthVerifyResponse {
            permissions: Permissions::from([Permission::Write, Permission::Read]),
        };
        assert_eq!(json!(["read", "write"]), serde_json::to_value(&resp).unwrap());
        assert_eq!(
            serde_json::Value::Null,
            serde_json::to_value(LogSetLevelResponse).unwrap()
        );
        assert_eq!(
            AuthRevokeResponse,
            serde_json::from_value(serde_json::Value::Null).unwrap()
        );
    }

    #[test]
    fn empty_filter_object_is_accepted() {
        let req: ListSignedRecordRequest = serde_json::from_value(json!([{}])).unwrap();
        assert_eq!(Some(QuerySignRecordParams::default()), req.params);
    }

    #[test]
    fn null_filter_is_accepted() {
        let req: ListSignedRecordRequest = serde_json::from_value(json!([null])).unwrap();
        assert_eq!(None, req.params);
    }
}
