//! Bounded storage for trace records.

use std::collections::{HashMap, VecDeque};

use hyperwatch_foundation::Cycle;

use super::record::{TraceEvent, TraceRecord};

/// A ring buffer of trace records.
///
/// When full, the oldest record is dropped. Records are appended in
/// cycle order, so cycle queries stop scanning once they pass their range.
#[derive(Clone, Debug)]
pub struct TraceBuffer {
    records: VecDeque<TraceRecord>,
    max_size: usize,
    next_id: u64,
}

impl TraceBuffer {
    /// Creates a buffer holding at most `max_size` records.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(max_size.min(1024)),
            max_size,
            next_id: 0,
        }
    }

    /// Appends an event and returns its record id.
    pub fn push(&mut self, cycle: Cycle, timestamp_ns: u64, event: TraceEvent) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        if self.max_size == 0 {
            return id;
        }
        if self.records.len() == self.max_size {
            self.records.pop_front();
        }
        self.records
            .push_back(TraceRecord::new(id, cycle, timestamp_ns, event));
        id
    }

    /// Returns the number of records held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no records are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the capacity.
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Drops all records. Ids keep counting up.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Iterates over records, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TraceRecord> {
        self.records.iter()
    }

    /// Returns the records of one cycle.
    pub fn records_for_cycle(&self, cycle: Cycle) -> impl Iterator<Item = &TraceRecord> {
        self.records_in_range(cycle, cycle)
    }

    /// Returns the records whose cycle lies in `start..=end`.
    pub fn records_in_range(
        &self,
        start: Cycle,
        end: Cycle,
    ) -> impl Iterator<Item = &TraceRecord> {
        self.records
            .iter()
            .skip_while(move |r| r.cycle < start)
            .take_while(move |r| r.cycle <= end)
    }

    /// Returns up to `n` of the newest records, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &TraceRecord> {
        self.records.iter().skip(self.records.len().saturating_sub(n))
    }

    /// Returns the records matching `predicate`.
    pub fn filter<F>(&self, predicate: F) -> impl Iterator<Item = &TraceRecord>
    where
        F: Fn(&TraceRecord) -> bool,
    {
        self.records.iter().filter(move |r| predicate(r))
    }

    /// Returns the records whose event has the given type name.
    pub fn by_event_type<'a>(
        &'a self,
        event_type: &'a str,
    ) -> impl Iterator<Item = &'a TraceRecord> {
        self.records
            .iter()
            .filter(move |r| r.event.event_type() == event_type)
    }

    /// Returns the records about `property`.
    pub fn for_property<'a>(&'a self, property: &'a str) -> impl Iterator<Item = &'a TraceRecord> {
        self.records
            .iter()
            .filter(move |r| r.event.property() == Some(property))
    }

    /// Returns the cycle of the oldest record.
    #[must_use]
    pub fn oldest_cycle(&self) -> Option<Cycle> {
        self.records.front().map(|r| r.cycle)
    }

    /// Returns the cycle of the newest record.
    #[must_use]
    pub fn newest_cycle(&self) -> Option<Cycle> {
        self.records.back().map(|r| r.cycle)
    }

    /// Returns the distinct cycles with records, ascending.
    #[must_use]
    pub fn cycles(&self) -> Vec<Cycle> {
        let mut cycles: Vec<Cycle> = self.records.iter().map(|r| r.cycle).collect();
        cycles.dedup();
        cycles
    }

    /// Summarizes the buffer.
    #[must_use]
    pub fn stats(&self) -> TraceBufferStats {
        let mut event_counts: HashMap<&'static str, usize> = HashMap::new();
        for record in &self.records {
            *event_counts.entry(record.event.event_type()).or_default() += 1;
        }
        TraceBufferStats {
            record_count: self.records.len(),
            max_size: self.max_size,
            oldest_cycle: self.oldest_cycle(),
            newest_cycle: self.newest_cycle(),
            cycle_count: self.cycles().len(),
            event_counts,
        }
    }
}

impl Default for TraceBuffer {
    fn default() -> Self {
        Self::new(10_000)
    }
}

/// A summary of a [`TraceBuffer`].
#[derive(Clone, Debug)]
pub struct TraceBufferStats {
    /// Records held.
    pub record_count: usize,
    /// Capacity.
    pub max_size: usize,
    /// Cycle of the oldest record.
    pub oldest_cycle: Option<Cycle>,
    /// Cycle of the newest record.
    pub newest_cycle: Option<Cycle>,
    /// Distinct cycles with records.
    pub cycle_count: usize,
    /// Records per event type.
    pub event_counts: HashMap<&'static str, usize>,
}
