//! Scan results collection
//! Every accepted advertisement produces a fresh immutable record which
//! replaces the previous record for the same peripheral.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::core::bluetooth::device::DiscoveredDevice;
use crate::core::bluetooth::peripheral::{PeripheralHandle, PeripheralRecord};

/// Outcome of storing an observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observed {
    /// First record for this peripheral in the current scan
    New,
    /// A previous record for this peripheral was replaced
    Replaced,
}

struct Entry<H> {
    record: PeripheralRecord<H>,
    seen_at: DateTime<Utc>,
}

/// Latest record per peripheral identifier
pub struct ScanResults<H> {
    entries: HashMap<String, Entry<H>>,
}

impl<H: PeripheralHandle> ScanResults<H> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Stores the record, returning whether the peripheral was already known
    pub fn observe(&mut self, record: PeripheralRecord<H>) -> Observed {
        self.observe_at(record, Utc::now())
    }

    pub fn observe_at(&mut self, record: PeripheralRecord<H>, seen_at: DateTime<Utc>) -> Observed {
        let entry = Entry { record, seen_at };
        match self.entries.insert(entry.record.id(), entry) {
            Some(_) => Observed::Replaced,
            None => Observed::New,
        }
    }

    /// Returns the latest record for the given peripheral id
    pub fn get(&self, id: &str) -> Option<PeripheralRecord<H>> {
        self.entries.get(id).map(|entry| entry.record.clone())
    }

    /// Returns the summary of the latest record for the given peripheral id
    pub fn device(&self, id: &str) -> Option<DiscoveredDevice> {
        self.entries
            .get(id)
            .map(|entry| DiscoveredDevice::from_record(&entry.record, entry.seen_at))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// All records, strongest signal first
    pub fn snapshot(&self) -> Vec<PeripheralRecord<H>> {
        self.sorted_entries()
            .into_iter()
            .map(|entry| entry.record.clone())
            .collect()
    }

    /// Summaries of all records, strongest signal first
    pub fn devices(&self) -> Vec<DiscoveredDevice> {
        self.sorted_entries()
            .into_iter()
            .map(|entry| DiscoveredDevice::from_record(&entry.record, entry.seen_at))
            .collect()
    }

    fn sorted_entries(&self) -> Vec<&Entry<H>> {
        let mut entries: Vec<(&String, &Entry<H>)> = self.entries.iter().collect();
        entries.sort_by(|(a_id, a), (b_id, b)| {
            b.record
                .rssi()
                .cmp(&a.record.rssi())
                .then_with(|| a_id.cmp(b_id))
        });
        entries.into_iter().map(|(_, entry)| entry).collect()
    }
}

impl<H: PeripheralHandle> Default for ScanResults<H> {
    fn default() -> Self {
        Self::new()
    }
}
