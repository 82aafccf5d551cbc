use std::collections::HashSet;

use async_trait::async_trait;
use itertools::Itertools;
use tokio::sync::RwLock;
use tracing::debug;

use super::RecordError;
use super::RecordStore;
use crate::application::rpc::core::model::record::QuerySignRecordParams;
use crate::application::rpc::core::model::record::SignRecord;

#[derive(Debug, Default)]
struct Records {
    /// insertion order
    records: Vec<SignRecord>,
    ids: HashSet<String>,
}

/// [RecordStore] that keeps records in memory for the lifetime of the
/// process.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    inner: RwLock<Records>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn record(&self, record: SignRecord) -> Result<(), RecordError> {
        let mut inner = self.inner.write().await;

        if !inner.ids.insert(record.id.clone()) {
            return Err(RecordError::DuplicateId(record.id));
        }

        debug!("stored sign record {} ({})", record.id, record.msg_type);
        inner.records.push(record);

        Ok(())
    }

    async fn query(&self, params: &QuerySignRecordParams) -> Result<Vec<SignRecord>, RecordError> {
        let inner = self.inner.read().await;

        // newest insert first among records created at the same instant.
        let matching = inner
            .records
            .iter()
            .rev()
            .filter(|r| params.matches(r))
            .sorted_by(|a, b| b.create_at.cmp(&a.create_at))
            .skip(params.skip);

        let records: Vec<SignRecord> = match params.limit {
            0 => matching.cloned().collect(),
            limit => matching.take(limit).cloned().collect(),
        };

        Ok(records)
    }
}
