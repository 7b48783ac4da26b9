//! Explicit no-data signalling for data-producing operations.
//!
//! Aggregation, normalization, and summarization can legitimately find
//! nothing to compute. That is not an error (callers skip the unit and
//! continue), and it is never a zero: a condition with no runs must not look
//! like a condition whose metric happens to be 0. [`Outcome`] keeps the two
//! cases apart and [`Absence`] says which kind of nothing happened.

use std::fmt;

/// Result of an operation that can legitimately produce no data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The computation ran and produced a value.
    Ready(T),
    /// There was nothing to compute.
    Absent(Absence),
}

/// Why an operation produced no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Absence {
    /// No step-like or value-like column could be identified.
    ColumnsNotFound,
    /// Every row was dropped during cleaning.
    NoRows,
    /// No runs were available to aggregate.
    NoRuns,
    /// Fewer contributing runs than the caller required.
    BelowMinRuns { required: usize, found: usize },
    /// No scalars were available to reduce.
    NoScalars,
}

impl<T> Outcome<T> {
    /// The value, if one was computed.
    pub fn ready(self) -> Option<T> {
        match self {
            Outcome::Ready(v) => Some(v),
            Outcome::Absent(_) => None,
        }
    }

    /// The absence reason, if there was nothing to compute.
    pub fn absence(&self) -> Option<Absence> {
        match self {
            Outcome::Ready(_) => None,
            Outcome::Absent(a) => Some(*a),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Outcome::Ready(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Outcome::Absent(_))
    }

    /// Map the ready value, carrying absence through.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Ready(v) => Outcome::Ready(f(v)),
            Outcome::Absent(a) => Outcome::Absent(a),
        }
    }

    pub fn as_ref(&self) -> Outcome<&T> {
        match self {
            Outcome::Ready(v) => Outcome::Ready(v),
            Outcome::Absent(a) => Outcome::Absent(*a),
        }
    }
}

impl fmt::Display for Absence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Absence::ColumnsNotFound => write!(f, "no step/value column identified"),
            Absence::NoRows => write!(f, "no rows survived cleaning"),
            Absence::NoRuns => write!(f, "no runs to aggregate"),
            Absence::BelowMinRuns { required, found } => {
                write!(f, "{found} contributing runs, {required} required")
            }
            Absence::NoScalars => write!(f, "no scalars to reduce"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_extracts_value() {
        assert_eq!(Outcome::Ready(5).ready(), Some(5));
        assert_eq!(Outcome::<i32>::Absent(Absence::NoRows).ready(), None);
    }

    #[test]
    fn map_carries_absence_through() {
        let absent: Outcome<i32> = Outcome::Absent(Absence::NoRuns);
        assert_eq!(absent.map(|v| v * 2), Outcome::Absent(Absence::NoRuns));
        assert_eq!(Outcome::Ready(3).map(|v| v * 2), Outcome::Ready(6));
    }

    #[test]
    fn absence_reports_reason() {
        let outcome: Outcome<()> = Outcome::Absent(Absence::BelowMinRuns {
            required: 3,
            found: 1,
        });
        assert_eq!(
            outcome.absence().unwrap().to_string(),
            "1 contributing runs, 3 required"
        );
    }
}
