// crates/knave-core/src/types.rs

//! Small shared value types: labels, metrics, domains, tri-state answers.

use knave_domains::Interval;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An abstract adversarial region: one interval per encoded feature column.
pub type Region = Vec<Interval>;

/// Class label, an index into the fitted dataset's sorted class list.
///
/// The display names stay on the dataset; everything past the loaders copies
/// only this small tag.
pub type Label = u32;

/// Distance metric lifted over abstract regions and used by the concrete
/// reference classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Squared Euclidean distance (the square root is monotone and never
    /// taken).
    Euclidean,
    /// Manhattan (L1) distance.
    Manhattan,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Euclidean => write!(f, "euclidean"),
            Self::Manhattan => write!(f, "manhattan"),
        }
    }
}

/// Which abstract domain the classifier runs in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainKind {
    /// Closed real intervals.
    Interval,
    /// Reduced affine forms.
    Raf,
}

impl fmt::Display for DomainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interval => write!(f, "interval"),
            Self::Raf => write!(f, "raf"),
        }
    }
}

/// Tri-state verification answer.
///
/// Sound over-approximation can prove a property or leave it open; `DontKnow`
/// is an honest answer, not a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    /// The property holds for every concretization.
    Yes,
    /// The property fails (established via the concrete reference).
    No,
    /// The abstraction is too coarse to decide.
    DontKnow,
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => write!(f, "Yes"),
            Self::No => write!(f, "No"),
            Self::DontKnow => write!(f, "Do not know"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_display_matches_report_vocabulary() {
        assert_eq!(Answer::Yes.to_string(), "Yes");
        assert_eq!(Answer::No.to_string(), "No");
        assert_eq!(Answer::DontKnow.to_string(), "Do not know");
    }

    #[test]
    fn metric_serde_uses_snake_case() {
        let m: Metric = serde_json::from_str("\"euclidean\"").unwrap();
        assert_eq!(m, Metric::Euclidean);
        assert_eq!(serde_json::to_string(&Metric::Manhattan).unwrap(), "\"manhattan\"");
    }
}
