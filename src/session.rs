//! Search sessions and their generation ids
//!
//! A session is one run of a search procedure. Every session is stamped with
//! the generation that was current when it started; resumptions carrying any
//! other generation are rejected by the owner.

use chrono::{DateTime, Utc};
use tracing::{info, trace};

use crate::search::{Probe, Procedure, SearchMode, SearchResult, Step};
use crate::table::HashTable;

/// Monotonic id distinguishing successive sessions
pub type Generation = u64;

/// A single run of a search procedure
#[derive(Debug, Clone)]
pub struct SearchSession {
    generation: Generation,
    target: i64,
    procedure: Procedure,
    highlight: Probe,
    result: Option<SearchResult>,
    steps: usize,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl SearchSession {
    /// Start a session and apply its first transition
    pub fn start(generation: Generation, mode: SearchMode, target: i64, table: &HashTable) -> Self {
        let mut session = Self {
            generation,
            target,
            procedure: Procedure::new(mode, table, target),
            highlight: Probe::default(),
            result: None,
            steps: 0,
            started_at: Utc::now(),
            finished_at: None,
        };

        info!(generation, target, mode = %mode, "search started");
        let step = session.procedure.start();
        session.apply(step);
        session
    }

    /// Resume after the step delay. Returns `true` while more steps remain.
    pub fn advance(&mut self) -> bool {
        if self.result.is_some() {
            return false;
        }
        let step = self.procedure.resume();
        self.apply(step);
        self.result.is_none()
    }

    fn apply(&mut self, step: Step) {
        match step {
            Step::Probe(probe) => {
                self.steps += 1;
                self.highlight = probe;
                trace!(
                    generation = self.generation,
                    table_index = ?probe.table_index,
                    sorted_index = ?probe.sorted_index,
                    "probe"
                );
            }
            Step::Done(result) => {
                // The sorted row stops glowing once bisection ends; the last
                // table cell stays lit.
                self.highlight.sorted_index = None;
                self.result = Some(result);
                self.finished_at = Some(Utc::now());
                info!(
                    generation = self.generation,
                    steps = self.steps,
                    result = %result,
                    "search finished"
                );
            }
        }
    }

    /// Generation id stamped on every resumption of this session
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Procedure being animated
    pub fn mode(&self) -> SearchMode {
        self.procedure.mode()
    }

    /// Value searched for
    pub fn target(&self) -> i64 {
        self.target
    }

    /// Cells currently emphasised
    pub fn highlight(&self) -> Probe {
        self.highlight
    }

    /// Terminal result, `None` while running
    pub fn result(&self) -> Option<SearchResult> {
        self.result
    }

    /// Whether the session has yet to terminate
    pub fn is_running(&self) -> bool {
        self.result.is_none()
    }

    /// Number of highlight steps emitted so far
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Wall-clock start
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Wall-clock time since start, frozen once the session finishes
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at.unwrap_or_else(Utc::now) - self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_step_applied_on_start() {
        let mut table = HashTable::new();
        table.insert(30);
        let session = SearchSession::start(3, SearchMode::Linear, 30, &table);

        assert_eq!(session.generation(), 3);
        assert_eq!(session.highlight().table_index, Some(0));
        assert_eq!(session.steps(), 1);
        assert!(session.is_running());
    }

    #[test]
    fn test_advance_until_finished() {
        let mut table = HashTable::new();
        table.insert(2);
        let mut session = SearchSession::start(1, SearchMode::Linear, 2, &table);

        assert!(session.advance());
        assert!(session.advance());
        assert!(!session.advance());
        assert_eq!(session.result().map(|r| r.message()).as_deref(), Some("Found at index 2 (linear search)"));
        assert_eq!(session.highlight().table_index, Some(2));

        // Further resumptions are no-ops
        assert!(!session.advance());
        assert_eq!(session.steps(), 3);
    }

    #[test]
    fn test_binary_finish_clears_sorted_highlight() {
        let mut table = HashTable::new();
        table.insert(12);
        let mut session = SearchSession::start(1, SearchMode::Binary, 12, &table);

        assert_eq!(session.highlight().sorted_index, Some(0));
        assert!(!session.advance());
        assert_eq!(session.highlight().sorted_index, None);
        assert_eq!(session.highlight().table_index, Some(12));
        assert!(session.result().is_some_and(|r| r.is_found()));
    }

    #[test]
    fn test_empty_binary_session_is_born_finished() {
        let session = SearchSession::start(1, SearchMode::Binary, 5, &HashTable::new());

        assert!(!session.is_running());
        assert_eq!(session.steps(), 0);
        assert_eq!(session.result().map(|r| r.message()).as_deref(), Some("Not found (binary search)"));
        assert!(session.elapsed() >= chrono::Duration::zero());
    }
}
