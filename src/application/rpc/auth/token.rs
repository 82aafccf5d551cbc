use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

use super::permission::Permission;
use super::permission::Permissions;

/// an opaque credential presented by a caller.
///
/// the service never inspects or mutates a token other than by handing it
/// to a verifier. On the wire a token is a byte array, which JSON carries as
/// base64.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Token(Vec<u8>);

impl Token {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// the token as text, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token({} bytes)", self.0.len())
    }
}

impl From<Vec<u8>> for Token {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl Serialize for Token {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = STANDARD.decode(s).map_err(serde::de::Error::custom)?;
        Ok(Self(bytes))
    }
}

/// the verified contents of a [Token].
///
/// Created for the call that presented the token and dropped afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token_id: String,
    pub permissions: Permissions,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    pub fn allows(&self, required: Permission) -> bool {
        self.permissions.allows(required)
    }
}

/// JWT claims.
///
/// `Allow` is the permission claim name used by the tokens of the wider
/// wallet service family, so tokens interoperate with their tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Claims {
    #[serde(rename = "Allow")]
    pub(crate) allow: Vec<String>,
    pub(crate) iat: i64,
    pub(crate) exp: i64,
    pub(crate) jti: String,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn token_json_is_base64() {
        let token = Token::from("abc.def.ghi");
        let json = serde_json::to_string(&token).unwrap();

        assert_eq!("\"YWJjLmRlZi5naGk=\"", json);
        assert_eq!(token, serde_json::from_str::<Token>(&json).unwrap());
    }

    #[test]
    fn debug_hides_token_contents() {
        let token = Token::from("secret-token");
        assert_eq!("Token(12 bytes)", format!("{:?}", token));
    }

    #[test]
    fn claims_use_allow_field() {
        let claims = Claims {
            allow: vec!["read".to_string()],
            iat: 1,
            exp: 2,
            jti: "id".to_string(),
        };
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(serde_json::json!(["read"]), json["Allow"]);
    }
}
