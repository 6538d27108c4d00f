//! Static priority classes.

use core::fmt;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Static priority class of a task.
///
/// The discriminants match the classic flight-controller numbering, which
/// leaves a gap between `Low` and `Medium`. Aging weights are applied per
/// numeric step, so that gap makes `Medium` two steps above `Low`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum TaskPriority {
    Idle = 0,
    Low = 1,
    Medium = 3,
    MediumHigh = 4,
    High = 5,
    /// Reserved for the single guaranteed task.
    Realtime = 6,
}

impl TaskPriority {
    /// Get the raw priority value
    pub const fn raw(self) -> u8 {
        self as u8
    }

    pub const fn is_realtime(self) -> bool {
        matches!(self, Self::Realtime)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::MediumHigh => "MEDIUM_HIGH",
            Self::High => "HIGH",
            Self::Realtime => "REALTIME",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TaskPriority {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=str}", self.name());
    }
}

#[cfg(test)]
mod tests {
    use super::TaskPriority;

    #[test]
    fn ordering_follows_raw_value() {
        assert!(TaskPriority::Realtime > TaskPriority::High);
        assert!(TaskPriority::High > TaskPriority::MediumHigh);
        assert!(TaskPriority::MediumHigh > TaskPriority::Medium);
        assert!(TaskPriority::Medium > TaskPriority::Low);
        assert!(TaskPriority::Low > TaskPriority::Idle);
        assert_eq!(TaskPriority::Medium.raw(), 3);
    }
}
