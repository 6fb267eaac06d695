//! Visualizer state machine
//!
//! [`Visualizer`] owns the table and the single active search session. All
//! mutation goes through insert, random fill, and search; the presentation
//! layer only ever sees [`VisualizerSnapshot`]s.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use crate::config::VisualizerConfig;
use crate::error::Error;
use crate::search::{Probe, SearchMode, SearchResult};
use crate::session::{Generation, SearchSession};
use crate::table::HashTable;

/// Parse user-entered text as an integer.
///
/// Surrounding whitespace is ignored. Anything else that is not a plain
/// decimal integer is rejected.
pub fn parse_value(raw: &str) -> std::result::Result<i64, Error> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| Error::InvalidNumericInput(raw.to_string()))
}

/// Outcome of delivering a scheduled resumption
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resumption {
    /// The resumption belongs to a superseded session and was ignored
    Stale,
    /// A new highlight was applied; schedule another resumption
    Pending,
    /// The session reached its terminal state
    Finished(SearchResult),
}

/// Read-only view handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct VisualizerSnapshot {
    /// Table slots in index order
    pub slots: Vec<Option<i64>>,
    /// Occupied values sorted ascending
    pub sorted: Vec<i64>,
    /// Selected search mode
    pub mode: SearchMode,
    /// Cells to emphasise
    pub highlight: Probe,
    /// Terminal result of the current session
    pub result: Option<SearchResult>,
    /// Whether a search is still stepping
    pub searching: bool,
    /// Current generation id
    pub generation: Generation,
    /// Target of the current session
    pub target: Option<i64>,
    /// Highlight steps taken by the current session
    pub steps: usize,
    /// Milliseconds since the current session started
    pub elapsed_ms: Option<i64>,
}

impl VisualizerSnapshot {
    /// Status line text, if any
    pub fn result_message(&self) -> Option<String> {
        self.result.map(|result| result.message())
    }
}

/// Owner of the table and the active search session
pub struct Visualizer {
    table: HashTable,
    mode: SearchMode,
    session: Option<SearchSession>,
    generation: Generation,
    config: VisualizerConfig,
    rng: StdRng,
}

impl Visualizer {
    /// Create a visualizer with an empty table
    pub fn new(config: VisualizerConfig) -> std::result::Result<Self, Error> {
        Self::with_table(config, HashTable::new())
    }

    /// Create a visualizer over an existing table
    pub fn with_table(config: VisualizerConfig, table: HashTable) -> std::result::Result<Self, Error> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            table,
            mode: SearchMode::default(),
            session: None,
            generation: 0,
            config,
            rng,
        })
    }

    /// Configuration this visualizer was built with
    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    /// Current table contents
    pub fn table(&self) -> &HashTable {
        &self.table
    }

    /// Mode selected for the next search
    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    /// Select the mode shown by the presentation layer
    pub fn set_mode(&mut self, mode: SearchMode) {
        self.mode = mode;
    }

    /// Generation of the most recent session or mutation
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Whether a search session is still stepping
    pub fn is_searching(&self) -> bool {
        self.session.as_ref().is_some_and(SearchSession::is_running)
    }

    /// Result of the current session, if it has terminated
    pub fn result(&self) -> Option<SearchResult> {
        self.session.as_ref().and_then(SearchSession::result)
    }

    /// Cells currently emphasised
    pub fn highlight(&self) -> Probe {
        self.session
            .as_ref()
            .map(SearchSession::highlight)
            .unwrap_or_default()
    }

    /// Current or last finished session
    pub fn session(&self) -> Option<&SearchSession> {
        self.session.as_ref()
    }

    /// Drop the current session and invalidate its pending resumptions
    fn supersede(&mut self) -> Generation {
        self.session = None;
        self.generation += 1;
        self.generation
    }

    /// Abandon the current session, if any
    pub fn cancel(&mut self) {
        if self.session.is_some() {
            let generation = self.supersede();
            debug!(generation, "session cancelled");
        }
    }

    /// Insert a value, clearing any search session. Returns the slot written.
    pub fn insert(&mut self, value: i64) -> usize {
        self.supersede();
        let index = self.table.insert(value);
        debug!(value, index, "inserted");
        index
    }

    /// Parse and insert. Malformed input leaves all state untouched.
    pub fn insert_text(&mut self, raw: &str) -> std::result::Result<usize, Error> {
        let value = parse_value(raw)?;
        Ok(self.insert(value))
    }

    /// Insert a batch of random values, clearing any search session
    pub fn random_fill(&mut self) -> Vec<i64> {
        self.supersede();
        let values = self.table.random_fill(
            &mut self.rng,
            self.config.random_fill_count,
            self.config.random_max,
        );
        info!(count = values.len(), occupied = self.table.occupied(), "random fill");
        values
    }

    /// Start a new search session, superseding any previous one.
    ///
    /// Returns the generation stamped on the new session. The first highlight
    /// is already applied; if the session needs no steps (binary search over
    /// an empty table) it is finished on return.
    pub fn search(&mut self, target: i64, mode: SearchMode) -> Generation {
        let generation = self.supersede();
        self.mode = mode;
        self.session = Some(SearchSession::start(generation, mode, target, &self.table));
        generation
    }

    /// Parse and search. Malformed input leaves all state untouched.
    pub fn search_text(&mut self, raw: &str, mode: SearchMode) -> std::result::Result<Generation, Error> {
        let target = parse_value(raw)?;
        Ok(self.search(target, mode))
    }

    /// Deliver a scheduled resumption for `generation`
    pub fn resume(&mut self, generation: Generation) -> Resumption {
        let Some(session) = self.session.as_mut() else {
            debug!(generation, "resumption without a session");
            return Resumption::Stale;
        };
        if session.generation() != generation || generation != self.generation {
            debug!(generation, current = self.generation, "stale resumption ignored");
            return Resumption::Stale;
        }

        if session.advance() {
            Resumption::Pending
        } else {
            match session.result() {
                Some(result) => Resumption::Finished(result),
                None => Resumption::Pending,
            }
        }
    }

    /// Read-only copy of everything the presentation layer renders
    pub fn snapshot(&self) -> VisualizerSnapshot {
        let session = self.session.as_ref();
        VisualizerSnapshot {
            slots: self.table.slots().to_vec(),
            sorted: self.table.sorted_view(),
            mode: self.mode,
            highlight: self.highlight(),
            result: self.result(),
            searching: self.is_searching(),
            generation: self.generation,
            target: session.map(SearchSession::target),
            steps: session.map_or(0, SearchSession::steps),
            elapsed_ms: session.map(|s| s.elapsed().num_milliseconds()),
        }
    }
}
