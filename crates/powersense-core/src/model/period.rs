use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::error::CoreError;

/// Averaging window for the period-average loop.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum AvgPeriod {
    #[strum(to_string = "1 Minute")]
    One,
    #[default]
    #[strum(to_string = "5 Minutes")]
    Five,
    #[strum(to_string = "10 Minutes")]
    Ten,
    #[strum(to_string = "30 Minutes")]
    Thirty,
}

impl AvgPeriod {
    /// Length of the window in minutes, as sent on the wire.
    pub fn minutes(self) -> u32 {
        match self {
            Self::One => 1,
            Self::Five => 5,
            Self::Ten => 10,
            Self::Thirty => 30,
        }
    }

    /// The next longer period, wrapping to the shortest.
    pub fn next(self) -> Self {
        match self {
            Self::One => Self::Five,
            Self::Five => Self::Ten,
            Self::Ten => Self::Thirty,
            Self::Thirty => Self::One,
        }
    }

    /// The next shorter period, wrapping to the longest.
    pub fn prev(self) -> Self {
        match self {
            Self::One => Self::Thirty,
            Self::Five => Self::One,
            Self::Ten => Self::Five,
            Self::Thirty => Self::Ten,
        }
    }

    /// Position of this period in selector order.
    pub fn index(self) -> usize {
        Self::iter().position(|p| p == self).unwrap_or_default()
    }
}

impl TryFrom<u32> for AvgPeriod {
    type Error = CoreError;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        Self::iter()
            .find(|p| p.minutes() == minutes)
            .ok_or_else(|| CoreError::Config {
                message: format!("unsupported averaging period: {minutes} minutes (expected 1, 5, 10 or 30)"),
            })
    }
}

/// Average power over the selected period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodAverage {
    pub watts: f64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn minutes_round_trip_through_try_from() {
        for period in AvgPeriod::iter() {
            assert_eq!(AvgPeriod::try_from(period.minutes()).unwrap(), period);
        }
    }

    #[test]
    fn unsupported_minutes_are_rejected() {
        assert!(AvgPeriod::try_from(0).is_err());
        assert!(AvgPeriod::try_from(15).is_err());
    }

    #[test]
    fn next_and_prev_cycle() {
        assert_eq!(AvgPeriod::Thirty.next(), AvgPeriod::One);
        assert_eq!(AvgPeriod::One.prev(), AvgPeriod::Thirty);
        assert_eq!(AvgPeriod::Five.next().prev(), AvgPeriod::Five);
    }

    #[test]
    fn labels_and_indices() {
        assert_eq!(AvgPeriod::One.to_string(), "1 Minute");
        assert_eq!(AvgPeriod::Thirty.to_string(), "30 Minutes");
        assert_eq!(AvgPeriod::default(), AvgPeriod::Five);
        assert_eq!(AvgPeriod::Ten.index(), 2);
    }
}
