//! Storage of past signing operations.
//!
//! The signing subsystem appends a [SignRecord] per signing request; the RPC
//! service only queries them.
pub mod memory;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

pub use self::memory::MemoryRecordStore;
use crate::application::rpc::core::model::record::QuerySignRecordParams;
use crate::application::rpc::core::model::record::SignRecord;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[non_exhaustive]
pub enum RecordError {
    #[error("record {0} already exists")]
    DuplicateId(String),
}

#[async_trait]
pub trait RecordStore: Send + Sync + std::fmt::Debug {
    /// stores `record`; ids are unique.
    async fn record(&self, record: SignRecord) -> Result<(), RecordError>;

    /// records matching `params`, newest first, after `skip` and `limit`
    /// are applied. No match is an empty result, not an error.
    async fn query(&self, params: &QuerySignRecordParams) -> Result<Vec<SignRecord>, RecordError>;
}
