//! Journal entries from past sessions and their prompt rendering.
//!
//! Entries are read-only input here; writing them belongs to the layer that
//! closes out a session. The formatter renders the most recent entries into
//! a continuity block for the system prompt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A past session's mood and summary record. Moods are on a 1-5 scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub start_mood: u8,
    pub end_mood: u8,
    pub mood_change: i8,
    pub summary: String,
    pub key_points: Vec<String>,
    pub developments: Vec<String>,
    pub timestamp: DateTime<Utc>,
    /// The user's explanation when their mood dropped.
    pub user_feedback: Option<String>,
    /// Interpretation of that feedback, rendered as an improvement note.
    pub ai_interpretation: Option<String>,
}

impl JournalEntry {
    pub fn new(start_mood: u8, end_mood: u8, summary: impl Into<String>) -> Self {
        Self {
            start_mood,
            end_mood,
            mood_change: end_mood as i8 - start_mood as i8,
            summary: summary.into(),
            key_points: Vec::new(),
            developments: Vec::new(),
            timestamp: Utc::now(),
            user_feedback: None,
            ai_interpretation: None,
        }
    }
}

/// Label for a 1-5 mood rating. Out-of-range input clamps.
pub fn mood_label(mood: u8) -> &'static str {
    const LABELS: [&str; 5] = ["Very Difficult", "Challenging", "Okay", "Good", "Great"];
    let index = (mood.clamp(1, 5) - 1) as usize;
    LABELS[index]
}

/// Aggregate mood statistics over journal entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JournalStats {
    pub total_entries: usize,
    pub average_start_mood: f32,
    pub average_end_mood: f32,
    pub average_improvement: f32,
    pub improvement_percentage: f32,
}

pub fn stats(entries: &[JournalEntry]) -> JournalStats {
    if entries.is_empty() {
        return JournalStats::default();
    }

    let count = entries.len() as f32;
    let total_start: f32 = entries.iter().map(|e| e.start_mood as f32).sum();
    let total_end: f32 = entries.iter().map(|e| e.end_mood as f32).sum();
    let total_improvement: f32 = entries.iter().map(|e| e.mood_change as f32).sum();

    let average_improvement = total_improvement / count;

    JournalStats {
        total_entries: entries.len(),
        average_start_mood: total_start / count,
        average_end_mood: total_end / count,
        average_improvement,
        improvement_percentage: (average_improvement / 5.0) * 100.0,
    }
}

fn relative_day_label(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days_ago = (now - timestamp).num_days().max(0);
    match days_ago {
        0 => "earlier today".to_string(),
        1 => "yesterday".to_string(),
        n => format!("{n} days ago"),
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}

/// Render the `max_entries` most recent journal entries (input assumed
/// newest-first) as a continuity block. Returns an empty string for empty
/// input; callers treat that as "no block".
pub fn format_journal_for_prompt(entries: &[JournalEntry], max_entries: usize) -> String {
    format_journal_at(entries, max_entries, Utc::now())
}

/// Same as [`format_journal_for_prompt`] with an explicit clock, so the
/// relative-day labels are testable.
pub fn format_journal_at(
    entries: &[JournalEntry],
    max_entries: usize,
    now: DateTime<Utc>,
) -> String {
    if entries.is_empty() || max_entries == 0 {
        return String::new();
    }

    let shown = &entries[..entries.len().min(max_entries)];
    let omitted = entries.len() - shown.len();

    let mut parts = Vec::with_capacity(shown.len());
    for entry in shown {
        let mut text = format!(
            "{}: mood {} → {}. {}",
            relative_day_label(entry.timestamp, now),
            entry.start_mood,
            entry.end_mood,
            truncate_chars(&entry.summary, 150),
        );

        if !entry.key_points.is_empty() {
            text.push_str(&format!("\n  Key points: {}", entry.key_points.join("; ")));
        }
        if !entry.developments.is_empty() {
            text.push_str(&format!(
                "\n  Developments: {}",
                entry.developments.join("; ")
            ));
        }
        if let Some(note) = &entry.ai_interpretation {
            text.push_str(&format!("\n  Improvement note: {note}"));
        }

        parts.push(text);
    }

    let mut out = format!("Recent journal entries:\n{}", parts.join("\n\n"));
    if omitted > 0 {
        out.push_str(&format!("\n\n({omitted} earlier entries not shown)"));
    }
    out
}
