//! Diary entry validation and mood constants.

use chrono::{Days, NaiveDate};

use crate::error::CoreError;

/// Lowest mood score a diary entry may carry.
pub const MIN_MOOD_SCORE: i16 = 1;
/// Highest mood score a diary entry may carry.
pub const MAX_MOOD_SCORE: i16 = 5;

/// Maximum entry title length (characters).
pub const MAX_TITLE_LENGTH: usize = 200;
/// Maximum entry content length (characters).
pub const MAX_CONTENT_LENGTH: usize = 20_000;

/// Mood labels an entry may be tagged with, ordered from worst to best.
pub const MOOD_LABELS: &[&str] = &[
    "awful", "sad", "anxious", "tired", "calm", "okay", "content", "happy", "grateful",
];

/// Validate a mood score against the 1..=5 scale.
pub fn validate_mood_score(score: i16) -> Result<(), CoreError> {
    if (MIN_MOOD_SCORE..=MAX_MOOD_SCORE).contains(&score) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Mood score must be between {MIN_MOOD_SCORE} and {MAX_MOOD_SCORE}, got {score}"
        )))
    }
}

/// Validate a mood label against [`MOOD_LABELS`].
pub fn validate_mood_label(label: &str) -> Result<(), CoreError> {
    if MOOD_LABELS.contains(&label) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unknown mood '{label}'. Must be one of: {MOOD_LABELS:?}"
        )))
    }
}

/// Validate the optional fields of a diary entry.
///
/// At least one of `title` or `content` must carry non-whitespace text when
/// `require_body` is set (creation); updates may touch only the mood.
pub fn validate_entry(
    title: Option<&str>,
    content: Option<&str>,
    mood_score: Option<i16>,
    mood_label: Option<&str>,
    require_body: bool,
) -> Result<(), CoreError> {
    if let Some(t) = title {
        if t.chars().count() > MAX_TITLE_LENGTH {
            return Err(CoreError::Validation(format!(
                "Title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
            )));
        }
    }
    if let Some(c) = content {
        if c.chars().count() > MAX_CONTENT_LENGTH {
            return Err(CoreError::Validation(format!(
                "Content exceeds maximum length of {MAX_CONTENT_LENGTH} characters"
            )));
        }
    }
    if require_body {
        let has_text = |s: Option<&str>| s.is_some_and(|v| !v.trim().is_empty());
        if !has_text(title) && !has_text(content) {
            return Err(CoreError::Validation(
                "An entry needs a title or some content".into(),
            ));
        }
    }
    if let Some(score) = mood_score {
        validate_mood_score(score)?;
    }
    if let Some(label) = mood_label {
        validate_mood_label(label)?;
    }
    Ok(())
}

/// Reject page dates more than one day ahead of `today`.
///
/// One day of slack absorbs clients in time zones ahead of UTC.
pub fn validate_page_date(page_date: NaiveDate, today: NaiveDate) -> Result<(), CoreError> {
    let latest = today.checked_add_days(Days::new(1)).unwrap_or(today);
    if page_date > latest {
        return Err(CoreError::Validation(format!(
            "Diary page date {page_date} is in the future"
        )));
    }
    Ok(())
}

/// Longest range accepted by the mood summary, in days.
pub const MAX_MOOD_RANGE_DAYS: i64 = 366;

/// Validate a mood summary date range (inclusive on both ends).
pub fn validate_mood_range(from: NaiveDate, to: NaiveDate) -> Result<(), CoreError> {
    if from > to {
        return Err(CoreError::Validation(
            "'from' must not be after 'to'".into(),
        ));
    }
    if (to - from).num_days() > MAX_MOOD_RANGE_DAYS {
        return Err(CoreError::Validation(format!(
            "Mood range may span at most {MAX_MOOD_RANGE_DAYS} days"
        )));
    }
    Ok(())
}
