// crates/knave-core/src/error.rs

//! Typed error taxonomy for the configuration and data boundary.
//!
//! The numeric core is total and never raises; these kinds cover everything
//! that can go wrong before a verification run starts. Operational (I/O)
//! failures are carried by `anyhow` with path context at the call sites.

use thiserror::Error;

/// Configuration problems: missing or out-of-range settings.
///
/// Messages name the offending key so a bad config fails with one
/// actionable line.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting was absent.
    #[error("missing required setting `{0}`")]
    Missing(&'static str),
    /// A setting was present but invalid.
    #[error("invalid value for `{key}`: {reason}")]
    Invalid {
        /// The offending configuration key.
        key: &'static str,
        /// Human-readable explanation.
        reason: String,
    },
}

impl ConfigError {
    /// Shorthand for [`ConfigError::Invalid`].
    #[must_use]
    pub fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Data problems: malformed or inconsistent dataset contents.
#[derive(Debug, Error)]
pub enum DataError {
    /// A dataset contained no points.
    #[error("empty {0} set")]
    Empty(&'static str),
    /// Training and test sets disagree on the number of feature columns.
    #[error("feature count mismatch: training has {train}, test has {test}")]
    FeatureMismatch {
        /// Columns in the training set.
        train: usize,
        /// Columns in the test set.
        test: usize,
    },
    /// A test record used a categorical level never seen at fit time.
    #[error("unknown categorical level `{level}` in column {column}")]
    UnknownLevel {
        /// The unseen level.
        level: String,
        /// Zero-based raw column index.
        column: usize,
    },
    /// A test record used a class label never seen at fit time.
    #[error("unknown class label `{0}`")]
    UnknownLabel(String),
    /// A record could not be parsed.
    #[error("malformed record at line {line}: {reason}")]
    Malformed {
        /// One-based line number.
        line: usize,
        /// Human-readable explanation.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let e = ConfigError::invalid("epsilon", "must lie in [0, 1]");
        assert_eq!(e.to_string(), "invalid value for `epsilon`: must lie in [0, 1]");

        let e = DataError::UnknownLevel {
            level: "maybe".into(),
            column: 3,
        };
        assert!(e.to_string().contains("maybe"));
        assert!(e.to_string().contains('3'));
    }
}
