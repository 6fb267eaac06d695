//! Step machines for the two animated search procedures
//!
//! Both procedures follow the same protocol: [`Procedure::start`] emits the
//! first highlight, and every [`Procedure::resume`] (called after the step
//! delay) evaluates the pending probe and either finishes or emits the next
//! highlight. Neither machine sleeps; timing belongs to the scheduler.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::table::HashTable;

/// Which search procedure to animate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum SearchMode {
    /// Scan the table slot by slot
    #[default]
    Linear,
    /// Bisect the sorted occupied values
    Binary,
}

impl SearchMode {
    /// Lowercase name used in result messages
    pub fn label(self) -> &'static str {
        match self {
            SearchMode::Linear => "linear",
            SearchMode::Binary => "binary",
        }
    }

    /// The other mode
    pub fn toggle(self) -> Self {
        match self {
            SearchMode::Linear => SearchMode::Binary,
            SearchMode::Binary => SearchMode::Linear,
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SearchMode {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(SearchMode::Linear),
            "binary" => Ok(SearchMode::Binary),
            _ => Err(Error::InvalidMode(s.to_string())),
        }
    }
}

/// Terminal outcome of a search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum SearchResult {
    /// Target found. For binary search the index is into the sorted view.
    Found {
        /// Procedure that ran
        mode: SearchMode,
        /// Slot index (linear) or sorted-view index (binary)
        index: usize,
    },
    /// Target absent
    NotFound {
        /// Procedure that ran
        mode: SearchMode,
    },
}

impl SearchResult {
    /// Whether the target was found
    pub fn is_found(&self) -> bool {
        matches!(self, SearchResult::Found { .. })
    }

    /// Mode that produced this result
    pub fn mode(&self) -> SearchMode {
        match *self {
            SearchResult::Found { mode, .. } | SearchResult::NotFound { mode } => mode,
        }
    }

    /// Status line text shown to the user
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchResult::Found { mode, index } => {
                write!(f, "Found at index {} ({} search)", index, mode)
            }
            SearchResult::NotFound { mode } => write!(f, "Not found ({} search)", mode),
        }
    }
}

/// Cells to emphasise while a probe is pending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Probe {
    /// Highlighted slot in the hash table
    pub table_index: Option<usize>,
    /// Highlighted position in the sorted view (binary search only)
    pub sorted_index: Option<usize>,
}

/// Output of one machine transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Highlight these cells, then wait for the next resumption
    Probe(Probe),
    /// The search has terminated
    Done(SearchResult),
}

/// Linear scan over a snapshot of the table slots
#[derive(Debug, Clone)]
pub struct LinearSearch {
    slots: Vec<Option<i64>>,
    target: i64,
    index: usize,
    outcome: Option<SearchResult>,
}

impl LinearSearch {
    /// Scan a copy of `table` for `target`
    pub fn new(table: &HashTable, target: i64) -> Self {
        Self {
            slots: table.slots().to_vec(),
            target,
            index: 0,
            outcome: None,
        }
    }

    /// Highlight slot 0
    pub fn start(&mut self) -> Step {
        if self.slots.is_empty() {
            return self.finish(SearchResult::NotFound { mode: SearchMode::Linear });
        }
        self.index = 0;
        Step::Probe(self.probe())
    }

    /// Test the highlighted slot, then advance or finish
    pub fn resume(&mut self) -> Step {
        if let Some(outcome) = self.outcome {
            return Step::Done(outcome);
        }

        if self.slots[self.index] == Some(self.target) {
            return self.finish(SearchResult::Found {
                mode: SearchMode::Linear,
                index: self.index,
            });
        }

        if self.index + 1 < self.slots.len() {
            self.index += 1;
            Step::Probe(self.probe())
        } else {
            self.finish(SearchResult::NotFound { mode: SearchMode::Linear })
        }
    }

    fn probe(&self) -> Probe {
        Probe {
            table_index: Some(self.index),
            sorted_index: None,
        }
    }

    fn finish(&mut self, outcome: SearchResult) -> Step {
        self.outcome = Some(outcome);
        Step::Done(outcome)
    }
}

/// Classic binary search over the sorted occupied values.
///
/// Each probe also highlights the lowest table slot holding the probed value.
#[derive(Debug, Clone)]
pub struct BinarySearch {
    sorted: Vec<i64>,
    table: HashTable,
    target: i64,
    low: isize,
    high: isize,
    /// Midpoint awaiting comparison, `None` before the first probe
    pending: Option<usize>,
    outcome: Option<SearchResult>,
}

impl BinarySearch {
    /// Bisect the sorted occupied values of `table` for `target`
    pub fn new(table: &HashTable, target: i64) -> Self {
        let sorted = table.sorted_view();
        let high = sorted.len() as isize - 1;
        Self {
            sorted,
            table: table.clone(),
            target,
            low: 0,
            high,
            pending: None,
            outcome: None,
        }
    }

    /// Sorted view the search runs over
    pub fn sorted(&self) -> &[i64] {
        &self.sorted
    }

    /// Emit the first probe, or finish at once over an empty view
    pub fn start(&mut self) -> Step {
        self.next_probe()
    }

    /// Compare the pending midpoint and narrow the range.
    ///
    /// Called before [`BinarySearch::start`], this behaves like `start`.
    pub fn resume(&mut self) -> Step {
        if let Some(outcome) = self.outcome {
            return Step::Done(outcome);
        }
        let Some(mid) = self.pending else {
            return self.next_probe();
        };

        match self.sorted[mid].cmp(&self.target) {
            Ordering::Equal => {
                return self.finish(SearchResult::Found {
                    mode: SearchMode::Binary,
                    index: mid,
                });
            }
            Ordering::Less => self.low = mid as isize + 1,
            Ordering::Greater => self.high = mid as isize - 1,
        }

        self.next_probe()
    }

    fn next_probe(&mut self) -> Step {
        if self.low > self.high {
            self.pending = None;
            return self.finish(SearchResult::NotFound { mode: SearchMode::Binary });
        }

        let mid = ((self.low + self.high) / 2) as usize;
        self.pending = Some(mid);
        Step::Probe(Probe {
            table_index: self.table.position_of(self.sorted[mid]),
            sorted_index: Some(mid),
        })
    }

    fn finish(&mut self, outcome: SearchResult) -> Step {
        self.outcome = Some(outcome);
        Step::Done(outcome)
    }
}

/// Either search machine, dispatched by mode
#[derive(Debug, Clone)]
pub enum Procedure {
    /// Slot-by-slot scan
    Linear(LinearSearch),
    /// Bisection over the sorted view
    Binary(BinarySearch),
}

impl Procedure {
    /// Build the machine for `mode` over the current table contents
    pub fn new(mode: SearchMode, table: &HashTable, target: i64) -> Self {
        match mode {
            SearchMode::Linear => Procedure::Linear(LinearSearch::new(table, target)),
            SearchMode::Binary => Procedure::Binary(BinarySearch::new(table, target)),
        }
    }

    /// Mode this machine animates
    pub fn mode(&self) -> SearchMode {
        match self {
            Procedure::Linear(_) => SearchMode::Linear,
            Procedure::Binary(_) => SearchMode::Binary,
        }
    }

    /// First transition: emit the initial highlight, or finish immediately
    pub fn start(&mut self) -> Step {
        match self {
            Procedure::Linear(search) => search.start(),
            Procedure::Binary(search) => search.start(),
        }
    }

    /// Evaluate the pending probe and move on
    pub fn resume(&mut self) -> Step {
        match self {
            Procedure::Linear(search) => search.resume(),
            Procedure::Binary(search) => search.resume(),
        }
    }

    /// Drive the machine to completion without any delay.
    ///
    /// Returns every highlight in order together with the final result.
    pub fn run_to_end(mut self) -> (Vec<Probe>, SearchResult) {
        let mut probes = Vec::new();
        let mut step = self.start();
        loop {
            match step {
                Step::Probe(probe) => {
                    probes.push(probe);
                    step = self.resume();
                }
                Step::Done(result) => return (probes, result),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TABLE_SIZE;

    fn table_of(values: &[i64]) -> HashTable {
        let mut table = HashTable::new();
        for &value in values {
            table.insert(value);
        }
        table
    }

    #[test]
    fn test_linear_found_at_first_slot() {
        let table = table_of(&[30]);
        let mut search = LinearSearch::new(&table, 30);

        assert_eq!(
            search.start(),
            Step::Probe(Probe { table_index: Some(0), sorted_index: None })
        );
        assert_eq!(
            search.resume(),
            Step::Done(SearchResult::Found { mode: SearchMode::Linear, index: 0 })
        );
    }

    #[test]
    fn test_linear_visits_every_slot_when_absent() {
        let table = table_of(&[1, 2, 3]);
        let (probes, result) = Procedure::new(SearchMode::Linear, &table, 999).run_to_end();

        let visited: Vec<usize> = probes.iter().filter_map(|p| p.table_index).collect();
        assert_eq!(visited, (0..TABLE_SIZE).collect::<Vec<_>>());
        assert_eq!(result, SearchResult::NotFound { mode: SearchMode::Linear });
        assert_eq!(result.message(), "Not found (linear search)");
    }

    #[test]
    fn test_linear_stops_at_match() {
        let table = table_of(&[47]);
        let (probes, result) = Procedure::new(SearchMode::Linear, &table, 47).run_to_end();

        assert_eq!(probes.len(), 18);
        assert_eq!(result.message(), "Found at index 17 (linear search)");
    }

    #[test]
    fn test_binary_empty_table_finishes_immediately() {
        let mut search = BinarySearch::new(&HashTable::new(), 5);

        assert_eq!(
            search.start(),
            Step::Done(SearchResult::NotFound { mode: SearchMode::Binary })
        );
        assert_eq!(
            search.resume(),
            Step::Done(SearchResult::NotFound { mode: SearchMode::Binary })
        );
    }

    #[test]
    fn test_binary_resume_before_start() {
        let mut empty = BinarySearch::new(&HashTable::new(), 5);
        assert_eq!(
            empty.resume(),
            Step::Done(SearchResult::NotFound { mode: SearchMode::Binary })
        );

        // With values present, an early resume emits the first probe
        let mut search = BinarySearch::new(&table_of(&[10, 20, 45]), 45);
        assert_eq!(
            search.resume(),
            Step::Probe(Probe { table_index: Some(20), sorted_index: Some(1) })
        );
        assert_eq!(
            search.resume(),
            Step::Probe(Probe { table_index: Some(15), sorted_index: Some(2) })
        );
        assert_eq!(
            search.resume(),
            Step::Done(SearchResult::Found { mode: SearchMode::Binary, index: 2 })
        );
    }

    #[test]
    fn test_binary_reports_sorted_index_and_table_slot() {
        // sorted view: [4, 31, 95, 600]
        let table = table_of(&[95, 4, 31, 600]);
        let mut search = BinarySearch::new(&table, 600);

        // mid = 1 -> 31, stored in slot 1
        assert_eq!(
            search.start(),
            Step::Probe(Probe { table_index: Some(1), sorted_index: Some(1) })
        );
        // low = 2, mid = 2 -> 95, slot 5
        assert_eq!(
            search.resume(),
            Step::Probe(Probe { table_index: Some(5), sorted_index: Some(2) })
        );
        // low = 3, mid = 3 -> 600, slot 0
        assert_eq!(
            search.resume(),
            Step::Probe(Probe { table_index: Some(0), sorted_index: Some(3) })
        );
        let done = search.resume();
        assert_eq!(
            done,
            Step::Done(SearchResult::Found { mode: SearchMode::Binary, index: 3 })
        );
        if let Step::Done(result) = done {
            assert_eq!(result.message(), "Found at index 3 (binary search)");
        }
    }

    #[test]
    fn test_binary_not_found_between_values() {
        let table = table_of(&[10, 20, 40]);
        let (probes, result) = Procedure::new(SearchMode::Binary, &table, 25).run_to_end();

        assert_eq!(probes.len(), 2);
        assert_eq!(result.message(), "Not found (binary search)");
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Linear".parse::<SearchMode>().unwrap(), SearchMode::Linear);
        assert_eq!(" binary ".parse::<SearchMode>().unwrap(), SearchMode::Binary);
        assert!("hash".parse::<SearchMode>().is_err());
        assert_eq!(SearchMode::Linear.toggle(), SearchMode::Binary);
    }
}
