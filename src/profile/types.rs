//! Profile resolution and calendar helpers shared by solar and load profiles.

use serde::{Deserialize, Serialize};

/// Hours in a non-leap year.
pub const HOURS_PER_YEAR: usize = 8760;

/// Representative-period length: 12 months × 24 hours.
pub const REPRESENTATIVE_STEPS: usize = 288;

/// Days in each calendar month of a non-leap year.
pub const DAYS_IN_MONTH: [usize; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Day-of-year (1-based) of the 15th of each month, used for representative days.
pub const MID_MONTH_DAY_OF_YEAR: [u32; 12] = [15, 46, 74, 105, 135, 166, 196, 227, 258, 288, 319, 349];

/// Timestep layout of a profile.
///
/// Both layouts are hourly; they differ in how many days are modelled.
///
/// ```
/// use hybrid_sizer::profile::Resolution;
///
/// assert_eq!(Resolution::FullYear.steps(), 8760);
/// assert_eq!(Resolution::Representative.steps(), 288);
/// assert_eq!(Resolution::Representative.annualization_factor(), 365.0 / 12.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resolution {
    /// 8760 hourly steps covering every day of the year.
    FullYear,
    /// 288 steps: one mid-month day per calendar month.
    #[default]
    Representative,
}

impl Resolution {
    /// Number of hourly timesteps in a profile of this resolution.
    pub fn steps(self) -> usize {
        match self {
            Self::FullYear => HOURS_PER_YEAR,
            Self::Representative => REPRESENTATIVE_STEPS,
        }
    }

    /// Factor converting period energy into annual energy.
    ///
    /// Each representative hour stands in for `365 / 12` real hours.
    pub fn annualization_factor(self) -> f64 {
        match self {
            Self::FullYear => 1.0,
            Self::Representative => 365.0 / 12.0,
        }
    }

    /// Number of modelled days (each 24 steps long).
    pub fn days(self) -> usize {
        self.steps() / 24
    }

    /// Returns `(day_of_year, month)` for the `day`-th modelled day.
    ///
    /// `day_of_year` is 1-based, `month` is 1..=12.
    pub fn day_calendar(self, day: usize) -> (u32, u32) {
        match self {
            Self::Representative => {
                let m = day % 12;
                (MID_MONTH_DAY_OF_YEAR[m], m as u32 + 1)
            }
            Self::FullYear => {
                let day = day % 365;
                let mut remaining = day;
                for (m, &len) in DAYS_IN_MONTH.iter().enumerate() {
                    if remaining < len {
                        return (day as u32 + 1, m as u32 + 1);
                    }
                    remaining -= len;
                }
                (365, 12)
            }
        }
    }

    /// Label used in logs and CSV output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullYear => "full-year",
            Self::Representative => "representative",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_match_steps() {
        assert_eq!(Resolution::FullYear.days(), 365);
        assert_eq!(Resolution::Representative.days(), 12);
        assert_eq!(DAYS_IN_MONTH.iter().sum::<usize>(), 365);
    }

    #[test]
    fn full_year_calendar_boundaries() {
        assert_eq!(Resolution::FullYear.day_calendar(0), (1, 1));
        assert_eq!(Resolution::FullYear.day_calendar(30), (31, 1));
        assert_eq!(Resolution::FullYear.day_calendar(31), (32, 2));
        assert_eq!(Resolution::FullYear.day_calendar(364), (365, 12));
    }

    #[test]
    fn representative_calendar_uses_mid_month() {
        assert_eq!(Resolution::Representative.day_calendar(0), (15, 1));
        assert_eq!(Resolution::Representative.day_calendar(5), (166, 6));
        assert_eq!(Resolution::Representative.day_calendar(11), (349, 12));
    }

    #[test]
    fn annualized_steps_cover_a_year() {
        for r in [Resolution::FullYear, Resolution::Representative] {
            let hours = r.steps() as f64 * r.annualization_factor();
            assert!((hours - HOURS_PER_YEAR as f64).abs() < 1e-9);
        }
    }
}
