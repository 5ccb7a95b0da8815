//! Storage layer for cashflow-cli
//!
//! Provides JSON file storage with atomic writes and automatic directory
//! creation, plus the [`RecordStore`] seam the report layer reads through.

pub mod file_io;
pub mod records;

pub use file_io::{read_json, write_json_atomic};
pub use records::RecordRepository;

use crate::config::paths::CashflowPaths;
use crate::error::CashflowError;
use crate::models::ServiceRecord;

/// Source of service records for aggregation and reporting
pub trait RecordStore {
    /// Snapshot of every record
    fn load_all(&self) -> Result<Vec<ServiceRecord>, CashflowError>;
}

impl RecordStore for Vec<ServiceRecord> {
    fn load_all(&self) -> Result<Vec<ServiceRecord>, CashflowError> {
        Ok(self.clone())
    }
}

/// Main storage coordinator
pub struct Storage {
    paths: CashflowPaths,
    pub services: RecordRepository,
}

impl Storage {
    /// Create a new Storage instance, creating directories as needed
    pub fn new(paths: CashflowPaths) -> Result<Self, CashflowError> {
        paths.ensure_directories()?;

        Ok(Self {
            services: RecordRepository::new(paths.services_file()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &CashflowPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load(&mut self) -> Result<(), CashflowError> {
        self.services.load()
    }

    /// Save all data to disk
    pub fn save(&self) -> Result<(), CashflowError> {
        self.services.save()
    }
}

impl RecordStore for Storage {
    fn load_all(&self) -> Result<Vec<ServiceRecord>, CashflowError> {
        self.services.get_all()
    }
}
