//! Service record repository for JSON storage
//!
//! Manages loading and saving service records to services.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::CashflowError;
use crate::models::{ServiceId, ServiceRecord};

use super::file_io::{read_json, write_json_atomic};

/// On-disk layout of services.json
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct RecordData {
    services: Vec<ServiceRecord>,
}

/// Repository for service record persistence
pub struct RecordRepository {
    path: PathBuf,
    data: RwLock<HashMap<ServiceId, ServiceRecord>>,
}

fn lock_error(e: impl std::fmt::Display) -> CashflowError {
    CashflowError::Storage(format!("Failed to acquire lock: {}", e))
}

impl RecordRepository {
    /// Create a new repository backed by `path`
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load records from disk, replacing anything in memory
    pub fn load(&self) -> Result<(), CashflowError> {
        let file_data: RecordData = read_json(&self.path)?;
        let mut data = self.data.write().map_err(lock_error)?;

        data.clear();
        for record in file_data.services {
            data.insert(record.id, record);
        }

        tracing::debug!(count = data.len(), "loaded service records");
        Ok(())
    }

    /// Save records to disk
    pub fn save(&self) -> Result<(), CashflowError> {
        let file_data = RecordData {
            services: self.get_all()?,
        };
        write_json_atomic(&self.path, &file_data)
    }

    /// Get a record by ID
    pub fn get(&self, id: ServiceId) -> Result<Option<ServiceRecord>, CashflowError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.get(&id).cloned())
    }

    /// All records, oldest first
    pub fn get_all(&self) -> Result<Vec<ServiceRecord>, CashflowError> {
        let data = self.data.read().map_err(lock_error)?;
        let mut records: Vec<_> = data.values().cloned().collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(records)
    }

    /// Records whose ID matches `query` (full UUID or short prefix)
    pub fn find_by_prefix(&self, query: &str) -> Result<Vec<ServiceRecord>, CashflowError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|r| r.id.matches(query))
            .collect())
    }

    /// Insert or update a record
    pub fn upsert(&self, record: ServiceRecord) -> Result<(), CashflowError> {
        let mut data = self.data.write().map_err(lock_error)?;
        data.insert(record.id, record);
        Ok(())
    }

    /// Delete a record, returning it if it existed
    pub fn delete(&self, id: ServiceId) -> Result<Option<ServiceRecord>, CashflowError> {
        let mut data = self.data.write().map_err(lock_error)?;
        Ok(data.remove(&id))
    }

    /// Count records
    pub fn count(&self) -> Result<usize, CashflowError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.len())
    }
}
