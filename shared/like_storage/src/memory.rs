//! In-memory implementation of [`LikeTable`] for tests

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{ImageLike, LikeStorageError, LikeStorageResult, LikeTable};

const TABLE_NAME: &str = "imagelikes";

/// Like table held in a process-local map
///
/// Failure switches let tests simulate a degraded backend.
#[derive(Default)]
pub struct InMemoryLikeTable {
    // (partition_key, row_key) -> like_count
    records: Mutex<BTreeMap<(String, String), u64>>,
    fail_requests: AtomicBool,
    deleting_for_attempts: AtomicU32,
    ensure_calls: AtomicU32,
}

impl InMemoryLikeTable {
    /// Creates an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every record operation fail until switched back off
    pub fn set_failing(&self, failing: bool) {
        self.fail_requests.store(failing, Ordering::SeqCst);
    }

    /// Reports the table as being deleted for the next `attempts` calls to `ensure_table`
    pub fn set_deleting_for(&self, attempts: u32) {
        self.deleting_for_attempts.store(attempts, Ordering::SeqCst);
    }

    /// Number of times `ensure_table` has been called
    pub fn ensure_calls(&self) -> u32 {
        self.ensure_calls.load(Ordering::SeqCst)
    }

    /// Number of stored records across all partitions
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Whether the table holds no records
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> LikeStorageResult<()> {
        if self.fail_requests.load(Ordering::SeqCst) {
            return Err(LikeStorageError::Backend(
                "in-memory table is unavailable".to_string(),
            ));
        }
        Ok(())
    }

    fn lock(
        &self,
    ) -> LikeStorageResult<std::sync::MutexGuard<'_, BTreeMap<(String, String), u64>>> {
        self.records
            .lock()
            .map_err(|e| LikeStorageError::Backend(e.to_string()))
    }
}

#[async_trait]
impl LikeTable for InMemoryLikeTable {
    async fn ensure_table(&self) -> LikeStorageResult<()> {
        self.ensure_calls.fetch_add(1, Ordering::SeqCst);

        let still_deleting = self
            .deleting_for_attempts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| {
                remaining.checked_sub(1)
            })
            .is_ok();
        if still_deleting {
            return Err(LikeStorageError::TableBeingDeleted(TABLE_NAME.to_string()));
        }

        self.check_available()
    }

    async fn get(
        &self,
        partition_key: &str,
        row_key: &str,
    ) -> LikeStorageResult<Option<ImageLike>> {
        self.check_available()?;
        let records = self.lock()?;

        Ok(records
            .get(&(partition_key.to_string(), row_key.to_string()))
            .map(|&like_count| ImageLike {
                partition_key: partition_key.to_string(),
                row_key: row_key.to_string(),
                like_count,
            }))
    }

    async fn query_partition(&self, partition_key: &str) -> LikeStorageResult<Vec<ImageLike>> {
        self.check_available()?;
        let records = self.lock()?;

        Ok(records
            .iter()
            .filter(|((partition, _), _)| partition == partition_key)
            .map(|((partition, row), &like_count)| ImageLike {
                partition_key: partition.clone(),
                row_key: row.clone(),
                like_count,
            })
            .collect())
    }

    async fn increment(&self, partition_key: &str, row_key: &str) -> LikeStorageResult<ImageLike> {
        self.check_available()?;
        let mut records = self.lock()?;

        let like_count = records
            .entry((partition_key.to_string(), row_key.to_string()))
            .or_insert(0);
        *like_count += 1;

        Ok(ImageLike {
            partition_key: partition_key.to_string(),
            row_key: row_key.to_string(),
            like_count: *like_count,
        })
    }

    async fn delete(&self, partition_key: &str, row_key: &str) -> LikeStorageResult<()> {
        self.check_available()?;
        self.lock()?
            .remove(&(partition_key.to_string(), row_key.to_string()));
        Ok(())
    }

    async fn delete_partition(&self, partition_key: &str) -> LikeStorageResult<usize> {
        self.check_available()?;
        let mut records = self.lock()?;

        let before = records.len();
        records.retain(|(partition, _), _| partition != partition_key);
        Ok(before - records.len())
    }
}
