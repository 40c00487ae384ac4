//! Spaced repetition interval scheduler.
//!
//! A review is graded with a knowledge level between 0 and the policy's
//! `max_level` (5 by default):
//! - Levels below `pass_threshold`: the streak resets and the item comes back tomorrow
//! - Passing levels: the streak grows by one and the interval is multiplied
//!
//! The multiplier is kept in tenths so every result is exact:
//!
//! ```text
//! growth = 1.5 + 0.5 * (level - pass_threshold) + 0.1 * min(streak, 10)
//! next   = max(current + 1, ceil(current * growth))
//! ```
//!
//! so a first pass at the default policy gives 2 days for levels 3 and 4 and
//! 3 days for level 5. Growth never decreases with a higher level or a longer
//! streak, and a passing review always lengthens the interval until it reaches
//! [`MAX_INTERVAL_DAYS`], where it stays. The cap keeps `from + interval`
//! representable for any review made before the year 14000, so the due date
//! is always exactly the review time plus the interval.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::StudyItem;
use crate::error::{Result, StudyError};

/// Base multiplier for a review exactly at the pass threshold, in tenths.
const BASE_GROWTH_TENTHS: u64 = 15;
/// Extra multiplier per level above the pass threshold, in tenths.
const LEVEL_GROWTH_TENTHS: u64 = 5;
/// Extra multiplier per prior consecutive success, in tenths.
const STREAK_GROWTH_TENTHS: u64 = 1;
/// Streak length after which the streak bonus stops growing.
const STREAK_BONUS_CAP: u32 = 10;
/// Longest interval the scheduler hands out, roughly 246 000 years.
pub const MAX_INTERVAL_DAYS: u32 = 90_000_000;

/// Bounds on knowledge levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerPolicy {
    /// Lowest level that counts as a successful recall
    pub pass_threshold: u8,
    /// Highest valid level
    pub max_level: u8,
}

impl Default for SchedulerPolicy {
    fn default() -> Self {
        Self {
            pass_threshold: 3,
            max_level: 5,
        }
    }
}

impl SchedulerPolicy {
    pub fn new(pass_threshold: u8, max_level: u8) -> Result<Self> {
        if pass_threshold == 0 || pass_threshold > max_level {
            return Err(StudyError::Config(format!(
                "pass threshold {pass_threshold} must be between 1 and max level {max_level}"
            )));
        }
        Ok(Self {
            pass_threshold,
            max_level,
        })
    }

    pub fn check_level(&self, knowledge_level: u8) -> Result<()> {
        if knowledge_level > self.max_level {
            return Err(StudyError::InvalidArgument(format!(
                "knowledge level {knowledge_level} is outside 0..={}",
                self.max_level
            )));
        }
        Ok(())
    }

    pub fn is_pass(&self, knowledge_level: u8) -> bool {
        knowledge_level >= self.pass_threshold
    }
}

/// Outcome of scheduling one review.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReviewSchedule {
    pub next_interval_days: u32,
    pub new_consecutive_correct: u32,
}

/// Computes the next interval and streak after one review.
///
/// Fails with [`StudyError::InvalidArgument`] when the level is above the
/// policy's maximum or the current interval is zero. Levels are never clamped.
pub fn compute_next_review(
    policy: &SchedulerPolicy,
    knowledge_level: u8,
    current_interval_days: u32,
    consecutive_correct: u32,
) -> Result<ReviewSchedule> {
    policy.check_level(knowledge_level)?;
    if current_interval_days == 0 {
        return Err(StudyError::InvalidArgument(
            "current interval must be at least one day".to_string(),
        ));
    }

    if !policy.is_pass(knowledge_level) {
        return Ok(ReviewSchedule {
            next_interval_days: 1,
            new_consecutive_correct: 0,
        });
    }

    let growth = growth_tenths(policy, knowledge_level, consecutive_correct);
    let grown = (u64::from(current_interval_days) * growth).div_ceil(10);
    let grown = u32::try_from(grown).unwrap_or(u32::MAX);
    let next_interval_days = grown
        .max(current_interval_days.saturating_add(1))
        .min(MAX_INTERVAL_DAYS);

    Ok(ReviewSchedule {
        next_interval_days,
        new_consecutive_correct: consecutive_correct.saturating_add(1),
    })
}

fn growth_tenths(policy: &SchedulerPolicy, knowledge_level: u8, consecutive_correct: u32) -> u64 {
    let above_threshold = u64::from(knowledge_level - policy.pass_threshold);
    let streak = u64::from(consecutive_correct.min(STREAK_BONUS_CAP));
    BASE_GROWTH_TENTHS + LEVEL_GROWTH_TENTHS * above_threshold + STREAK_GROWTH_TENTHS * streak
}

/// Adds `interval_days` whole days to `from`, saturating at the latest
/// representable instant.
pub fn compute_next_review_date(interval_days: u32, from: DateTime<Utc>) -> DateTime<Utc> {
    from.checked_add_signed(TimeDelta::days(i64::from(interval_days)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

pub fn next_review_date_from_now(interval_days: u32) -> DateTime<Utc> {
    compute_next_review_date(interval_days, Utc::now())
}

/// Interval each valid knowledge level would give the item, lowest level first.
pub fn preview_intervals(policy: &SchedulerPolicy, item: &StudyItem) -> Result<Vec<(u8, u32)>> {
    (0..=policy.max_level)
        .map(|level| {
            compute_next_review(policy, level, item.interval_days, item.consecutive_correct)
                .map(|schedule| (level, schedule.next_interval_days))
        })
        .collect()
}

/// Formats an interval in days as a compact label
pub fn format_interval(days: u32) -> String {
    match days {
        0 => "now".to_string(),
        1..=6 => format!("{days}d"),
        7..=29 => format!("{}w", days / 7),
        30..=364 => format!("{}mo", days / 30),
        _ => format!("{}y", days / 365),
    }
}
