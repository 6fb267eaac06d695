//! Timed resumption of search sessions
//!
//! [`Scheduler`] shares the visualizer with one timer thread per search
//! session. Each thread sleeps the step delay, then delivers a resumption
//! tagged with its session's generation. Once the visualizer reports the
//! resumption as stale or finished, the thread exits.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::Error;
use crate::search::{SearchMode, SearchResult};
use crate::session::Generation;
use crate::visualizer::{Resumption, Visualizer, VisualizerSnapshot};

/// Owns the visualizer and drives its searches in the background
pub struct Scheduler {
    state: Arc<Mutex<Visualizer>>,
    delay: Duration,
    timers: Mutex<Vec<JoinHandle<()>>>,
}

impl Scheduler {
    /// Wrap a visualizer, using its configured step delay
    pub fn new(visualizer: Visualizer) -> Self {
        let delay = visualizer.config().step_delay;
        Self {
            state: Arc::new(Mutex::new(visualizer)),
            delay,
            timers: Mutex::new(Vec::new()),
        }
    }

    /// Pause between resumptions
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Read-only view of the shared state
    pub fn snapshot(&self) -> VisualizerSnapshot {
        self.state.lock().snapshot()
    }

    /// Whether a session is still stepping
    pub fn is_searching(&self) -> bool {
        self.state.lock().is_searching()
    }

    /// Select the mode for the next search
    pub fn set_mode(&self, mode: SearchMode) {
        self.state.lock().set_mode(mode);
    }

    /// Parse and insert, superseding any running session
    pub fn insert_text(&self, raw: &str) -> std::result::Result<usize, Error> {
        self.state.lock().insert_text(raw)
    }

    /// Insert a random batch, superseding any running session
    pub fn random_fill(&self) -> Vec<i64> {
        self.state.lock().random_fill()
    }

    /// Parse the target, start a session, and schedule its resumptions
    pub fn search_text(&self, raw: &str, mode: SearchMode) -> std::result::Result<Generation, Error> {
        let (generation, running) = {
            let mut visualizer = self.state.lock();
            let generation = visualizer.search_text(raw, mode)?;
            (generation, visualizer.is_searching())
        };
        if running {
            self.spawn_timer(generation)?;
        }
        Ok(generation)
    }

    /// Run `f` with exclusive access to the visualizer
    pub fn with_visualizer<R>(&self, f: impl FnOnce(&mut Visualizer) -> R) -> R {
        f(&mut self.state.lock())
    }

    fn spawn_timer(&self, generation: Generation) -> std::result::Result<(), Error> {
        let state = Arc::clone(&self.state);
        let delay = self.delay;
        let handle = thread::Builder::new()
            .name(format!("hashviz-step-{}", generation))
            .spawn(move || {
                loop {
                    thread::sleep(delay);
                    match state.lock().resume(generation) {
                        Resumption::Pending => continue,
                        Resumption::Finished(_) | Resumption::Stale => break,
                    }
                }
                debug!(generation, "timer exited");
            })?;

        let mut timers = self.timers.lock();
        timers.retain(|timer| !timer.is_finished());
        timers.push(handle);
        Ok(())
    }

    /// Block until every scheduled timer has exited.
    ///
    /// A panic on a timer thread is re-raised here once the remaining
    /// timers have been joined.
    pub fn wait(&self) {
        let timers: Vec<_> = self.timers.lock().drain(..).collect();
        let mut panicked = None;
        for timer in timers {
            let name = timer.thread().name().unwrap_or("timer").to_string();
            if let Err(payload) = timer.join() {
                warn!(thread = %name, "timer thread panicked");
                panicked.get_or_insert(payload);
            }
        }
        if let Some(payload) = panicked {
            std::panic::resume_unwind(payload);
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.state.lock().cancel();
    }
}

/// Drive the current session on the calling thread.
///
/// `on_step` sees the state after the first highlight and after every
/// resumption. Returns the terminal result, or `None` if the session was
/// superseded.
pub fn run_blocking<F>(
    visualizer: &mut Visualizer,
    generation: Generation,
    delay: Duration,
    mut on_step: F,
) -> Option<SearchResult>
where
    F: FnMut(&VisualizerSnapshot),
{
    on_step(&visualizer.snapshot());
    while visualizer.is_searching() {
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        match visualizer.resume(generation) {
            Resumption::Pending => on_step(&visualizer.snapshot()),
            Resumption::Finished(result) => {
                on_step(&visualizer.snapshot());
                return Some(result);
            }
            Resumption::Stale => return None,
        }
    }
    visualizer.result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VisualizerConfig;

    fn scheduler(delay_ms: u64) -> Scheduler {
        let config = VisualizerConfig {
            step_delay: Duration::from_millis(delay_ms),
            seed: Some(1),
            ..VisualizerConfig::default()
        };
        Scheduler::new(Visualizer::new(config).unwrap())
    }

    #[test]
    #[should_panic(expected = "step failed")]
    fn test_wait_reraises_timer_panic() {
        let scheduler = scheduler(0);
        let failing: JoinHandle<()> = thread::spawn(|| panic!("step failed"));
        scheduler.timers.lock().push(failing);
        scheduler.wait();
    }

    #[test]
    fn test_background_search_completes() {
        let scheduler = scheduler(1);
        scheduler.insert_text("44").unwrap();
        scheduler.search_text("44", SearchMode::Linear).unwrap();
        scheduler.wait();

        let snapshot = scheduler.snapshot();
        assert!(!snapshot.searching);
        assert_eq!(snapshot.result_message().as_deref(), Some("Found at index 14 (linear search)"));
        assert_eq!(snapshot.steps, 15);
    }

    #[test]
    fn test_superseded_timer_does_not_touch_new_session() {
        let scheduler = scheduler(2);
        scheduler.insert_text("5").unwrap();
        scheduler.search_text("999", SearchMode::Linear).unwrap();
        scheduler.search_text("5", SearchMode::Binary).unwrap();
        scheduler.wait();

        let snapshot = scheduler.snapshot();
        assert_eq!(snapshot.mode, SearchMode::Binary);
        assert_eq!(snapshot.steps, 1);
        assert_eq!(snapshot.result_message().as_deref(), Some("Found at index 0 (binary search)"));
    }

    #[test]
    fn test_insert_cancels_running_search() {
        let scheduler = scheduler(5);
        scheduler.search_text("1", SearchMode::Linear).unwrap();
        scheduler.insert_text("1").unwrap();
        scheduler.wait();

        let snapshot = scheduler.snapshot();
        assert!(!snapshot.searching);
        assert!(snapshot.result.is_none());
        assert_eq!(snapshot.steps, 0);
    }

    #[test]
    fn test_invalid_search_schedules_nothing() {
        let scheduler = scheduler(1);
        assert!(scheduler.search_text("x1", SearchMode::Linear).is_err());
        assert!(scheduler.timers.lock().is_empty());
    }

    #[test]
    fn test_run_blocking_reports_every_step() {
        let mut visualizer = Visualizer::new(VisualizerConfig::default()).unwrap();
        visualizer.insert(3);
        let generation = visualizer.search(3, SearchMode::Linear);

        let mut highlighted = Vec::new();
        let result = run_blocking(&mut visualizer, generation, Duration::ZERO, |snapshot| {
            highlighted.push(snapshot.highlight.table_index);
        });

        assert_eq!(highlighted, vec![Some(0), Some(1), Some(2), Some(3), Some(3)]);
        assert!(result.is_some_and(|r| r.is_found()));
    }
}
