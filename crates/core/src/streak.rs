//! Streak computation and milestone lookup.
//!
//! This module lives in `core` (zero internal deps) so it can be used by both
//! the delivery pipeline (milestone email copy) and the API layer (streak
//! displays). All functions are pure: the reference day is an explicit
//! parameter, never read from the wall clock.

use std::collections::HashSet;

use chrono::{Days, NaiveDate};
use serde::Serialize;

// ---------------------------------------------------------------------------
// StreakStats
// ---------------------------------------------------------------------------

/// Current and longest consecutive-day streaks for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreakStats {
    /// Consecutive days ending today or yesterday. 0 if the most recent
    /// activity is older than yesterday.
    pub current_streak: u32,
    /// Longest run of consecutive days anywhere in the history.
    pub longest_streak: u32,
}

/// Compute streak statistics from the set of days with at least one entry.
///
/// The result is order-independent (the input is a set) and deterministic
/// for a given `(dates, today)` pair.
pub fn compute_streaks(dates: &HashSet<NaiveDate>, today: NaiveDate) -> StreakStats {
    StreakStats {
        current_streak: current_streak(dates, today),
        longest_streak: longest_streak(dates),
    }
}

/// Longest run of consecutive days in the set. Empty set yields 0.
fn longest_streak(dates: &HashSet<NaiveDate>) -> u32 {
    let mut sorted: Vec<NaiveDate> = dates.iter().copied().collect();
    sorted.sort_unstable();

    let mut longest: u32 = 0;
    let mut run: u32 = 0;
    let mut prev: Option<NaiveDate> = None;

    for day in sorted {
        run = match prev {
            Some(p) if day == p + Days::new(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(day);
    }

    longest
}

/// Consecutive days counted backward from the most recent entry day.
///
/// Returns 0 unless the most recent day is `today` or `today - 1`; a streak
/// older than yesterday is considered broken.
fn current_streak(dates: &HashSet<NaiveDate>, today: NaiveDate) -> u32 {
    let Some(&latest) = dates.iter().max() else {
        return 0;
    };

    let yesterday = today - Days::new(1);
    if latest != today && latest != yesterday {
        return 0;
    }

    let mut count: u32 = 0;
    let mut day = latest;
    while dates.contains(&day) {
        count += 1;
        day = day - Days::new(1);
    }

    count
}

// ---------------------------------------------------------------------------
// Milestones
// ---------------------------------------------------------------------------

/// A streak length with dedicated celebratory copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Milestone {
    /// The exact streak length this milestone celebrates.
    pub days: u32,
    /// Celebration title used as the email headline.
    pub title: &'static str,
    /// Longer celebration message shown in the email body.
    pub message: &'static str,
}

/// Milestone table, ascending by streak length.
pub const MILESTONES: [Milestone; 6] = [
    Milestone {
        days: 7,
        title: "One Week Strong!",
        message: "Seven days of journaling in a row. You've built the foundation of a real habit.",
    },
    Milestone {
        days: 14,
        title: "Two Week Champion!",
        message: "Fourteen consecutive days. Your journal is becoming part of who you are.",
    },
    Milestone {
        days: 30,
        title: "30-Day Habit Master!",
        message: "A full month of daily writing. Researchers say this is where habits stick.",
    },
    Milestone {
        days: 60,
        title: "60-Day Dedication!",
        message: "Two months without missing a day. That's dedication few people can claim.",
    },
    Milestone {
        days: 90,
        title: "90-Day Legend!",
        message: "A quarter of a year, every single day. Your future self thanks you.",
    },
    Milestone {
        days: 365,
        title: "One Year Anniversary!",
        message: "365 days of journaling. An entire year of your life, captured in your own words.",
    },
];

/// Look up the milestone for an exact streak length.
///
/// Returns `None` for lengths without dedicated copy; callers fall back to
/// the generic [`fallback_title`].
pub fn milestone_for(days: u32) -> Option<&'static Milestone> {
    MILESTONES.iter().find(|m| m.days == days)
}

/// Generic celebration title for streak lengths not in the milestone table.
pub fn fallback_title(days: u32) -> String {
    format!("{days}-Day Streak!")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
