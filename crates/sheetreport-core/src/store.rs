use rust_decimal::Decimal;
use uuid::Uuid;

use crate::record::{NewSalesRecord, SalesRecord};

/// Ordered, in-memory data sheet. Identifiers are unique.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<SalesRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store; later duplicates of an id are dropped
    pub fn with_records(records: Vec<SalesRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            if store.get(&record.id).is_none() {
                store.records.push(record);
            }
        }
        store
    }

    pub fn add(&mut self, record: NewSalesRecord) -> &SalesRecord {
        let id = self.fresh_id();
        self.records.push(record.with_id(id));
        let last = self.records.len() - 1;
        &self.records[last]
    }

    pub fn remove(&mut self, id: &str) -> Option<SalesRecord> {
        let idx = self.records.iter().position(|r| r.id == id)?;
        Some(self.records.remove(idx))
    }

    pub fn get(&self, id: &str) -> Option<&SalesRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_revenue(&self) -> Decimal {
        self.records.iter().map(|r| r.revenue).sum()
    }

    pub fn total_units(&self) -> u64 {
        self.records.iter().map(|r| u64::from(r.units)).sum()
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().simple().to_string();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}
