//! hashviz: step-by-step search visualizer over an overwrite hash table
//!
//! This crate models a 30-slot hash table that stores each value at
//! `value mod 30` and animates linear and binary search over it as a
//! sequence of delayed highlight steps.

#![warn(missing_docs)]

/// Fixed-size overwrite hash table
pub mod table;

/// Linear and binary search step machines
pub mod search;

/// Generation-stamped search sessions
pub mod session;

/// State owner and search dispatcher
pub mod visualizer;

/// Delayed, generation-checked resumption
pub mod scheduler;


// Re-exports
pub use config::VisualizerConfig;
pub use error::Error;
pub use scheduler::{Scheduler, run_blocking};
pub use search::{Probe, Procedure, SearchMode, SearchResult, Step};
pub use session::{Generation, SearchSession};
pub use table::{HashTable, TABLE_SIZE};
pub use visualizer::{Resumption, Visualizer, VisualizerSnapshot, parse_value};

/// Error types for hashviz operations
pub mod error {
    use std::error::Error as StdError;
    use std::fmt;
    use std::io;

    /// Error types that can occur in hashviz operations
    #[derive(Debug)]
    pub enum Error {
        /// An I/O error occurred
        Io(io::Error),
        /// Text that does not parse as an integer
        InvalidNumericInput(String),
        /// Unknown search mode name
        InvalidMode(String),
        /// Configuration error
        ConfigError(String),
    }

    impl fmt::Display for Error {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Error::Io(err) => write!(f, "I/O error: {}", err),
                Error::InvalidNumericInput(raw) => write!(f, "Not an integer: {:?}", raw),
                Error::InvalidMode(raw) => {
                    write!(f, "Unknown search mode {:?} (expected linear or binary)", raw)
                }
                Error::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            }
        }
    }

    impl StdError for Error {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            match self {
                Error::Io(err) => Some(err),
                _ => None,
            }
        }
    }

    impl From<io::Error> for Error {
        fn from(err: io::Error) -> Self {
            Error::Io(err)
        }
    }
}

/// Configuration options for the visualizer
pub mod config {
    use std::time::Duration;

    use crate::error::Error;
    use crate::table::TABLE_SIZE;

    /// Configuration for a visualizer instance
    #[derive(Debug, Clone)]
    pub struct VisualizerConfig {
        /// Number of table slots; fixed at [`TABLE_SIZE`]
        pub table_size: usize,
        /// Pause between highlight steps
        pub step_delay: Duration,
        /// Values inserted by one random fill
        pub random_fill_count: usize,
        /// Largest value a random fill may generate
        pub random_max: i64,
        /// Seed for random fill, entropy when `None`
        pub seed: Option<u64>,
    }

    impl Default for VisualizerConfig {
        fn default() -> Self {
            Self {
                table_size: TABLE_SIZE,
                step_delay: Duration::from_millis(600),
                random_fill_count: 10,
                random_max: 999,
                seed: None,
            }
        }
    }

    impl VisualizerConfig {
        /// Check that the configuration is usable
        pub fn validate(&self) -> std::result::Result<(), Error> {
            if self.table_size != TABLE_SIZE {
                return Err(Error::ConfigError(format!(
                    "table size must be {}, got {}",
                    TABLE_SIZE, self.table_size
                )));
            }
            if self.random_fill_count == 0 {
                return Err(Error::ConfigError("random fill count must be positive".to_string()));
            }
            if self.random_max < 0 {
                return Err(Error::ConfigError(format!(
                    "random max must be non-negative, got {}",
                    self.random_max
                )));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn test_default_config() {
        let config = VisualizerConfig::default();

        assert_eq!(config.table_size, 30);
        assert_eq!(config.step_delay.as_millis(), 600);
        assert_eq!(config.random_fill_count, 10);
        assert_eq!(config.random_max, 999);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = VisualizerConfig {
            random_fill_count: 0,
            ..VisualizerConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));

        let config = VisualizerConfig {
            table_size: 64,
            ..VisualizerConfig::default()
        };
        assert!(Visualizer::new(config).is_err());
    }

    #[test]
    fn test_error_display_and_source() {
        let err = Error::InvalidNumericInput("abc".to_string());
        assert_eq!(err.to_string(), "Not an integer: \"abc\"");
        assert!(err.source().is_none());

        let io_err: Error = std::io::Error::other("tty gone").into();
        assert!(io_err.source().is_some());
    }
}
