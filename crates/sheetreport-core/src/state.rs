//! UI-agnostic application state
//!
//! `AppState` is owned by whichever front end drives the session and is the
//! only way records, the report, and the generation status change together.
//! Every record mutation drops the report and resets the status, so a report
//! that is present always describes the current data sheet.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::ReportError;
use crate::record::{NewSalesRecord, SalesRecord};
use crate::report::{AiReport, GenerationStatus};
use crate::store::RecordStore;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartError {
    #[error("Please add data before generating a report.")]
    EmptyDataset,

    #[error("A report is already being generated.")]
    AlreadyGenerating,
}

/// Issued when generation starts; hands the result back to the state that issued it
#[derive(Debug, Clone)]
pub struct GenerationTicket {
    generation: u64,
    records: Vec<SalesRecord>,
}

impl GenerationTicket {
    /// Records as they were when the request was issued
    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }
}

/// What `complete_generation` did with a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied(GenerationStatus),
    Stale,
}

#[derive(Debug, Default)]
pub struct AppState {
    store: RecordStore,
    report: Option<AiReport>,
    status: GenerationStatus,
    last_error: Option<ReportError>,
    generation: u64,
}

impl AppState {
    pub fn new(records: Vec<SalesRecord>) -> Self {
        Self {
            store: RecordStore::with_records(records),
            ..Self::default()
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn records(&self) -> &[SalesRecord] {
        self.store.records()
    }

    pub fn report(&self) -> Option<&AiReport> {
        self.report.as_ref()
    }

    pub fn status(&self) -> GenerationStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&ReportError> {
        self.last_error.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_generating(&self) -> bool {
        self.status == GenerationStatus::Generating
    }

    pub fn add_record(&mut self, record: NewSalesRecord) -> &SalesRecord {
        self.invalidate_report();
        let added = self.store.add(record);
        info!(id = %added.id, product = %added.product, "record added");
        added
    }

    pub fn remove_record(&mut self, id: &str) -> Option<SalesRecord> {
        self.invalidate_report();
        let removed = self.store.remove(id);
        match &removed {
            Some(record) => info!(id = %record.id, product = %record.product, "record removed"),
            None => debug!(id, "remove requested for unknown record"),
        }
        removed
    }

    pub fn begin_generation(&mut self) -> Result<GenerationTicket, StartError> {
        if self.store.is_empty() {
            warn!("report requested with an empty data sheet");
            return Err(StartError::EmptyDataset);
        }
        if self.is_generating() {
            return Err(StartError::AlreadyGenerating);
        }

        self.report = None;
        self.last_error = None;
        self.status = GenerationStatus::Generating;
        info!(generation = self.generation, records = self.store.len(), "report generation started");

        Ok(GenerationTicket {
            generation: self.generation,
            records: self.store.records().to_vec(),
        })
    }

    pub fn complete_generation(
        &mut self,
        ticket: GenerationTicket,
        result: Result<AiReport, ReportError>,
    ) -> Completion {
        if ticket.generation != self.generation || !self.is_generating() {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding superseded report result"
            );
            return Completion::Stale;
        }

        match result {
            Ok(report) => {
                info!(insights = report.key_insights.len(), "report generated");
                self.report = Some(report);
                self.last_error = None;
                self.status = GenerationStatus::Success;
            }
            Err(err) => {
                warn!(error = %err, "report generation failed");
                self.report = None;
                self.last_error = Some(err);
                self.status = GenerationStatus::Error;
            }
        }
        Completion::Applied(self.status)
    }

    fn invalidate_report(&mut self) {
        self.report = None;
        self.last_error = None;
        self.status = GenerationStatus::Idle;
        self.generation += 1;
    }
}
