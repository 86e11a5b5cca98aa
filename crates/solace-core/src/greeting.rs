//! Opening lines for a new conversation.
//!
//! `default_greeting` is the always-available local fallback; the
//! model-generated greeting built from `greeting_instruction` is preferred
//! when the model call succeeds.

use crate::prompt::{Persona, Tone, compose_system_prompt};

const LATE_NIGHT: [&str; 5] = [
    "What has you up so late at this hour?",
    "Burning the midnight oil? What's on your mind?",
    "It's pretty late... everything okay?",
    "Can't sleep? I'm here to listen.",
    "What's keeping you awake tonight?",
];

const EARLY_MORNING: [&str; 5] = [
    "You're up early! How are you feeling this morning?",
    "Good morning! What's on your mind to start the day?",
    "Early bird today? How did you sleep?",
    "Morning! How are you starting your day?",
    "Up with the sun? What's going through your mind?",
];

const MORNING: [&str; 5] = [
    "Good morning! How's your day going so far?",
    "Morning! What's happening in your world today?",
    "Hey there! How are you feeling this morning?",
    "Good to see you! How's your day starting?",
    "Morning! What would you like to talk about?",
];

const AFTERNOON: [&str; 5] = [
    "Good afternoon! How's your day treating you?",
    "Hey! How are things going today?",
    "Afternoon check-in - how are you feeling?",
    "Hi there! What's on your mind this afternoon?",
    "How's your day been so far?",
];

const EVENING: [&str; 5] = [
    "Good evening! How was your day?",
    "Evening! Want to talk about your day?",
    "Hey! How are you doing this evening?",
    "Hi there! How did things go today?",
    "Evening - ready to unwind and chat?",
];

const NIGHT: [&str; 5] = [
    "Good evening! How are you feeling tonight?",
    "Hey! How was your day today?",
    "Evening! What's on your mind as the day winds down?",
    "Hi there! Want to talk about how today went?",
    "How are you doing tonight?",
];

/// Human-readable bucket for an hour of day (0-23).
pub fn time_of_day(hour: u32) -> &'static str {
    match hour % 24 {
        0..=3 => "late at night",
        4..=7 => "early morning",
        8..=11 => "morning",
        12..=16 => "afternoon",
        17..=20 => "evening",
        _ => "night",
    }
}

/// Canned greeting for an hour of day. Pure: the variant within a bucket is
/// a fixed function of the hour, no randomness.
pub fn default_greeting(hour: u32) -> &'static str {
    let hour = hour % 24;
    let bucket: &[&'static str; 5] = match hour {
        0..=3 => &LATE_NIGHT,
        4..=7 => &EARLY_MORNING,
        8..=11 => &MORNING,
        12..=16 => &AFTERNOON,
        17..=20 => &EVENING,
        _ => &NIGHT,
    };
    bucket[hour as usize % bucket.len()]
}

/// One-shot instruction payload asking the model to open the conversation.
/// Reuses the standard persona/tone/context composition, then layers the
/// greeting-specific task on top.
pub fn greeting_instruction(
    persona: Option<&Persona>,
    tone: Tone,
    context_blocks: &str,
    hour: u32,
) -> String {
    let base = compose_system_prompt(persona, tone, context_blocks);
    format!(
        "{base}\n\nIt is {} for the user right now. Open the conversation yourself with a \
         single short, warm greeting (one or two sentences). If the remembered context \
         mentions a recent important event or mood, you may check in on it naturally. Do \
         not mention that you are an AI or explain these instructions.",
        time_of_day(hour)
    )
}
