//! Signed record types as they travel over the wire.
//!
//! Field names follow the PascalCase convention of the wider wallet service
//! family, so records produced by other members of the family decode as-is.
use std::fmt::Display;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::DateTime;
use chrono::Datelike;
use chrono::Utc;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use strum::AsRefStr;
use strum::Display as StrumDisplay;
use strum::EnumIter;
use strum::EnumString;

/// Kind of payload a signing request carried.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    StrumDisplay,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MsgType {
    #[default]
    Unknown,
    #[serde(rename = "message")]
    #[strum(serialize = "message")]
    ChainMsg,
    Block,
    DealProposal,
    DrawRandomParam,
    SignedVoucher,
    StorageAsk,
    AskResponse,
    NetworkResponse,
    ProviderDealState,
    ClientDeal,
    VerifyAddress,
}

/// A signature together with the scheme that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Signature {
    #[serde(rename = "Type")]
    pub sig_type: u8,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

/// One past signing operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignRecord {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Type")]
    pub msg_type: MsgType,
    pub signer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
    #[serde(with = "base64_bytes")]
    pub raw_msg: Vec<u8>,
    #[serde(default)]
    pub signature: Option<Signature>,
    pub create_at: DateTime<Utc>,
}

impl SignRecord {
    /// true if the signing operation failed
    pub fn is_error(&self) -> bool {
        self.err.is_some()
    }
}

/// Filter for signed record queries.
///
/// Unset fields do not constrain the result. `after` and `before` are
/// exclusive bounds on `create_at`. Matching records are returned newest
/// first; `skip` records are dropped and then at most `limit` records are
/// returned, where a `limit` of zero means no limit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct QuerySignRecordParams {
    #[serde(
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub signer: Option<String>,

    #[serde(
        rename = "ID",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,

    #[serde(
        rename = "Type",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub msg_type: Option<MsgType>,

    #[serde(
        deserialize_with = "zero_time_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub after: Option<DateTime<Utc>>,

    #[serde(
        deserialize_with = "zero_time_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub before: Option<DateTime<Utc>>,

    pub limit: usize,
    pub skip: usize,

    /// only failed signing operations
    pub is_error: bool,
}

impl QuerySignRecordParams {
    /// true if `record` passes every set field of the filter.
    ///
    /// `limit` and `skip` apply to the result set and are ignored here.
    pub fn matches(&self, record: &SignRecord) -> bool {
        self.id.as_ref().is_none_or(|id| *id == record.id)
            && self.signer.as_ref().is_none_or(|s| *s == record.signer)
            && self.msg_type.is_none_or(|t| t == record.msg_type)
            && self.after.is_none_or(|after| record.create_at > after)
            && self.before.is_none_or(|before| record.create_at < before)
            && (!self.is_error || record.is_error())
    }
}

/// empty strings are how other service family members say "unset".
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// year one (`0001-01-01T00:00:00Z`) is the zero time of other service
/// family members.
fn zero_time_as_none<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let time: Option<DateTime<Utc>> = empty_as_none(deserializer)?;
    Ok(time.filter(|t| t.year() > 1))
}

pub(crate) mod base64_bytes {
    use super::*;

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: Option<String> = Option::deserialize(deserializer)?;
        match s {
            None => Ok(vec![]),
            Some(s) => STANDARD.decode(s).map_err(serde::de::Error::custom),
        }
    }
}
