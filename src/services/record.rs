//! Service record management
//!
//! Provides business logic for creating, editing and clearing service
//! records. Every successful mutation is saved and announced on the
//! [`ChangeBus`].

use chrono::NaiveDate;

use crate::error::{CashflowError, CashflowResult};
use crate::events::{ChangeBus, ChangeEvent};
use crate::models::{LegKind, ServiceId, ServiceRecord};
use crate::services::dues::DueKind;
use crate::storage::Storage;

/// Field values for create and edit; `None` leaves a field unchanged
///
/// An empty amount string clears that amount.
#[derive(Debug, Clone, Default)]
pub struct ServiceFields {
    pub client_first_name: Option<String>,
    pub client_last_name: Option<String>,
    pub service_type: Option<String>,
    pub notes: Option<String>,
    pub agent: Option<String>,
    pub gross_sales_price_receivable: Option<String>,
    pub gross_sales_commissionable: Option<String>,
    pub commission_percent: Option<String>,
    pub cost_of_sales_payable: Option<String>,
    pub gspr_due_date: Option<NaiveDate>,
    pub comm_due_date: Option<NaiveDate>,
    pub cosp_due_date: Option<NaiveDate>,
    pub revenue_share_payable: Option<String>,
    pub rev_share_due_date: Option<NaiveDate>,
    pub rev_share_counterparty: Option<String>,
    /// Legs whose amounts and due date are removed before the rest applies
    pub clear_legs: Vec<LegKind>,
    /// Remove the revenue share before the rest applies
    pub clear_rev_share: bool,
}

impl ServiceFields {
    fn is_empty(&self) -> bool {
        self.client_first_name.is_none()
            && self.client_last_name.is_none()
            && self.service_type.is_none()
            && self.notes.is_none()
            && self.agent.is_none()
            && self.gross_sales_price_receivable.is_none()
            && self.gross_sales_commissionable.is_none()
            && self.commission_percent.is_none()
            && self.cost_of_sales_payable.is_none()
            && self.gspr_due_date.is_none()
            && self.comm_due_date.is_none()
            && self.cosp_due_date.is_none()
            && self.revenue_share_payable.is_none()
            && self.rev_share_due_date.is_none()
            && self.rev_share_counterparty.is_none()
            && self.clear_legs.is_empty()
            && !self.clear_rev_share
    }

    fn apply_to(self, record: &mut ServiceRecord) {
        for kind in &self.clear_legs {
            match kind {
                LegKind::Gspr => {
                    record.gross_sales_price_receivable = None;
                    record.gspr_due_date = None;
                }
                LegKind::Commission => {
                    record.gross_sales_commissionable = None;
                    record.commission_percent = None;
                    record.comm_due_date = None;
                }
                LegKind::Cosp => {
                    record.cost_of_sales_payable = None;
                    record.cosp_due_date = None;
                }
            }
        }
        if self.clear_rev_share {
            record.revenue_share_payable = None;
            record.rev_share_due_date = None;
            record.rev_share_counterparty.clear();
            record.rev_share_paid = false;
        }

        let text = |value: String| value.trim().to_string();
        let amount = |value: String| {
            let value = value.trim().to_string();
            (!value.is_empty()).then_some(value)
        };

        if let Some(v) = self.client_first_name {
            record.client_first_name = text(v);
        }
        if let Some(v) = self.client_last_name {
            record.client_last_name = text(v);
        }
        if let Some(v) = self.service_type {
            record.service_type = text(v);
        }
        if let Some(v) = self.notes {
            record.notes = text(v);
        }
        if let Some(v) = self.agent {
            record.agent = text(v);
        }
        if let Some(v) = self.rev_share_counterparty {
            record.rev_share_counterparty = text(v);
        }
        if let Some(v) = self.gross_sales_price_receivable {
            record.gross_sales_price_receivable = amount(v);
        }
        if let Some(v) = self.gross_sales_commissionable {
            record.gross_sales_commissionable = amount(v);
        }
        if let Some(v) = self.commission_percent {
            record.commission_percent = amount(v);
        }
        if let Some(v) = self.cost_of_sales_payable {
            record.cost_of_sales_payable = amount(v);
        }
        if let Some(v) = self.revenue_share_payable {
            record.revenue_share_payable = amount(v);
        }
        if self.gspr_due_date.is_some() {
            record.gspr_due_date = self.gspr_due_date;
        }
        if self.comm_due_date.is_some() {
            record.comm_due_date = self.comm_due_date;
        }
        if self.cosp_due_date.is_some() {
            record.cosp_due_date = self.cosp_due_date;
        }
        if self.rev_share_due_date.is_some() {
            record.rev_share_due_date = self.rev_share_due_date;
        }
    }
}

/// Service for record management
pub struct RecordService<'a> {
    storage: &'a Storage,
    bus: &'a ChangeBus,
}

impl<'a> RecordService<'a> {
    /// Create a new record service
    pub fn new(storage: &'a Storage, bus: &'a ChangeBus) -> Self {
        Self { storage, bus }
    }

    /// Create a new record
    pub fn create(&self, fields: ServiceFields) -> CashflowResult<ServiceRecord> {
        let mut record = ServiceRecord::new();
        fields.apply_to(&mut record);

        record
            .validate()
            .map_err(|e| CashflowError::Validation(e.to_string()))?;

        self.persist(&record)?;
        tracing::info!(id = %record.id, client = %record.client_name(), "created service");
        self.bus
            .publish(ChangeEvent::ServicesUpdated { id: record.id });

        Ok(record)
    }

    /// List all records, oldest first
    pub fn list(&self) -> CashflowResult<Vec<ServiceRecord>> {
        self.storage.services.get_all()
    }

    /// Get a record by ID
    pub fn get(&self, id: ServiceId) -> CashflowResult<ServiceRecord> {
        self.storage
            .services
            .get(id)?
            .ok_or_else(|| CashflowError::service_not_found(id.to_string()))
    }

    /// Find a record by full UUID or short ID prefix
    ///
    /// A prefix that matches more than one record is rejected.
    pub fn find(&self, query: &str) -> CashflowResult<ServiceRecord> {
        let mut matches = self.storage.services.find_by_prefix(query)?;
        match matches.len() {
            0 => Err(CashflowError::service_not_found(query)),
            1 => Ok(matches.remove(0)),
            n => Err(CashflowError::Validation(format!(
                "'{}' matches {} services; use a longer ID",
                query, n
            ))),
        }
    }

    /// Apply field changes to an existing record
    pub fn update(&self, id: ServiceId, fields: ServiceFields) -> CashflowResult<ServiceRecord> {
        let mut record = self.get(id)?;
        if fields.is_empty() {
            return Ok(record);
        }

        fields.apply_to(&mut record);
        record
            .validate()
            .map_err(|e| CashflowError::Validation(e.to_string()))?;
        record.touch();

        self.persist(&record)?;
        tracing::info!(id = %record.id, "updated service");
        self.bus.publish(ChangeEvent::ServicesUpdated { id });

        Ok(record)
    }

    /// Mark a leg as collected/paid (or undo that)
    pub fn set_cleared(
        &self,
        id: ServiceId,
        kind: LegKind,
        cleared: bool,
    ) -> CashflowResult<ServiceRecord> {
        let mut record = self.get(id)?;
        if record.due_date(kind).is_none() {
            return Err(CashflowError::Validation(format!(
                "Service {} has no {} due date",
                id, kind
            )));
        }
        if record.is_leg_cleared(kind) == cleared {
            return Ok(record);
        }

        record.set_leg_cleared(kind, cleared);
        self.persist(&record)?;
        tracing::info!(id = %id, leg = %kind, cleared, "changed leg status");
        self.bus.publish(ChangeEvent::ServicesUpdated { id });

        Ok(record)
    }

    /// Mark any outstanding item as cleared (or undo that)
    ///
    /// Legs go through [`set_cleared`](Self::set_cleared); the revenue share
    /// toggles its paid flag and likewise needs a due date.
    pub fn set_due_cleared(
        &self,
        id: ServiceId,
        kind: DueKind,
        cleared: bool,
    ) -> CashflowResult<ServiceRecord> {
        if let Some(leg) = kind.leg() {
            return self.set_cleared(id, leg, cleared);
        }

        let mut record = self.get(id)?;
        if record.rev_share_due_date.is_none() {
            return Err(CashflowError::Validation(format!(
                "Service {} has no revenue share due date",
                id
            )));
        }
        if record.rev_share_paid == cleared {
            return Ok(record);
        }

        record.rev_share_paid = cleared;
        record.touch();
        self.persist(&record)?;
        tracing::info!(id = %id, cleared, "changed revenue share status");
        self.bus.publish(ChangeEvent::ServicesUpdated { id });

        Ok(record)
    }

    /// Delete a record
    pub fn delete(&self, id: ServiceId) -> CashflowResult<ServiceRecord> {
        let removed = self
            .storage
            .services
            .delete(id)?
            .ok_or_else(|| CashflowError::service_not_found(id.to_string()))?;
        self.storage.services.save()?;

        tracing::info!(id = %id, "deleted service");
        self.bus.publish(ChangeEvent::ServiceRemoved { id });

        Ok(removed)
    }

    fn persist(&self, record: &ServiceRecord) -> CashflowResult<()> {
        self.storage.services.upsert(record.clone())?;
        self.storage.services.save()
    }
}
