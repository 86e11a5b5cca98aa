//! System-prompt composition.
//!
//! Everything here is pure: same persona, tone, and context blocks always
//! yield the same text.

use serde::{Deserialize, Serialize};

use crate::memory::Turn;
use solace_llm::Role;

/// Selectable response style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tone {
    #[default]
    Empathetic,
    Humorous,
    Blunt,
    TherapistLike,
}

impl Tone {
    /// Parse a user-supplied tone name. Unknown names fall back to
    /// [`Tone::Empathetic`]; this never fails.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "humorous" => Tone::Humorous,
            "blunt" => Tone::Blunt,
            "therapist-like" | "therapist_like" | "therapist" => Tone::TherapistLike,
            _ => Tone::Empathetic,
        }
    }
}

/// A named personality overlay applied to the system prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    pub name: String,
    pub personality: String,
}

impl Persona {
    pub fn new(name: impl Into<String>, personality: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            personality: personality.into(),
        }
    }
}

fn tone_intro(tone: Tone) -> &'static str {
    match tone {
        Tone::Empathetic => {
            "You are a compassionate, deeply empathetic listener providing emotional \
             support. You prioritize warmth, understanding, and emotional validation."
        }
        Tone::Humorous => {
            "You are a supportive listener with a light-hearted, humorous touch. While \
             you take their feelings seriously, you use gentle humor to lighten the mood \
             when appropriate. Be playful but never dismissive."
        }
        Tone::Blunt => {
            "You are a direct, honest listener who provides straightforward emotional \
             support. You say things as they are without sugar-coating, but always \
             remain respectful and supportive."
        }
        Tone::TherapistLike => {
            "You are a thoughtful, professional listener who uses therapeutic \
             techniques. You ask probing questions, identify patterns, and help them \
             develop insight into their emotions and behaviors."
        }
    }
}

const ROLE_SENTENCE: &str = "Your role is to be \"someone to talk to\" for people who need \
to vent, process feelings, or work through difficult emotions.";

const CONTEXT_INSTRUCTION: &str = "Use this context to show continuity and remember past \
conversations. Reference previous topics naturally when relevant.";

/// Invariant behavioral rules appended to every system prompt regardless of
/// tone or persona.
const CORE_RULES: &str = "Core principles:
- You are NOT a therapist, counselor, or medical professional. Never present yourself as one.
- You provide emotional support through active listening and reflective dialogue.
- Be warm, non-judgmental, and validating of feelings.
- Use reflective listening: mirror emotions, validate experiences, ask open-ended questions.
- Encourage self-expression without offering direct advice or solutions unless specifically asked.
- If someone is in crisis or mentions self-harm/suicide, respond with care:
  * Acknowledge their pain: \"I hear that you're going through something really difficult.\"
  * Gently suggest professional help: \"It sounds like talking to a counselor or therapist could be really helpful. Have you considered reaching out to a crisis line?\"
  * Provide perspective: \"Many people have found that professional support makes a real difference.\"
  * Never be directive or alarming. Stay calm and supportive.

Your conversational style:
- Be conversational and natural, not clinical
- Match the user's emotional tone when appropriate
- Ask thoughtful follow-up questions to help them explore their feelings
- Validate emotions without minimizing struggles
- Celebrate small wins and progress
- Remember and reference things from earlier in the conversation

Remember: You're here to listen, validate, and provide a safe space for expression. \
You're not here to diagnose, treat, or provide clinical interventions.";

/// Per-call directive appended when the crisis classifier fires. Never
/// persisted into memory.
pub const CRISIS_DIRECTIVE: &str = "Note: The user's message contains concerning language. \
Respond with extra care, validation, and gently suggest professional resources without \
being directive or alarming. Remember you are not a therapist - be supportive and caring.";

/// Reply used when the model returns a successful but empty completion.
pub const FALLBACK_REPLY: &str =
    "I'm here to listen. Could you tell me more about what's on your mind?";

/// System message for summarization calls.
pub const SUMMARIZER_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that creates concise, contextual summaries of conversations.";

/// Build the system message prepended to every completion call.
pub fn compose_system_prompt(
    persona: Option<&Persona>,
    tone: Tone,
    context_blocks: &str,
) -> String {
    let mut sections = Vec::new();

    if let Some(persona) = persona {
        sections.push(format!("You are {}. {}", persona.name, persona.personality));
    }

    sections.push(format!("{} {}", tone_intro(tone), ROLE_SENTENCE));

    if !context_blocks.is_empty() {
        sections.push(format!("{context_blocks}\n\n{CONTEXT_INSTRUCTION}"));
    }

    sections.push(CORE_RULES.to_string());

    sections.join("\n\n")
}

/// Build the user prompt asking the model to compress older turns.
pub fn summarization_prompt(turns: &[Turn]) -> String {
    let conversation = turns
        .iter()
        .map(|turn| {
            let speaker = match turn.role {
                Role::User => "User",
                _ => "Assistant",
            };
            format!("{speaker}: {}", turn.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Please create a concise summary of this conversation segment, focusing on:
1. Key topics and concerns discussed
2. Important emotions and feelings expressed
3. Any significant progress or insights
4. Context needed for continuity

Keep the summary brief but preserve emotional context and important details.

Conversation:
{conversation}

Summary:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composition_is_deterministic() {
        let persona = Persona::new("Luna", "You are gentle and curious.");
        let a = compose_system_prompt(Some(&persona), Tone::Humorous, "context");
        let b = compose_system_prompt(Some(&persona), Tone::Humorous, "context");
        assert_eq!(a, b);
    }

    #[test]
    fn persona_prefixes_the_prompt() {
        let persona = Persona::new("Luna", "You are gentle and curious.");
        let prompt = compose_system_prompt(Some(&persona), Tone::Empathetic, "");
        assert!(prompt.starts_with("You are Luna. You are gentle and curious."));
    }

    #[test]
    fn empty_context_block_is_omitted() {
        let prompt = compose_system_prompt(None, Tone::Empathetic, "");
        assert!(!prompt.contains(CONTEXT_INSTRUCTION));

        let with_context = compose_system_prompt(None, Tone::Empathetic, "Remembered: cat Milo");
        assert!(with_context.contains("Remembered: cat Milo"));
        assert!(with_context.contains(CONTEXT_INSTRUCTION));
    }

    #[test]
    fn every_tone_keeps_the_invariant_rules() {
        for tone in [Tone::Empathetic, Tone::Humorous, Tone::Blunt, Tone::TherapistLike] {
            let prompt = compose_system_prompt(None, tone, "");
            assert!(prompt.contains("Core principles:"));
            assert!(prompt.contains(ROLE_SENTENCE));
        }
    }

    #[test]
    fn unknown_tone_name_falls_back_to_empathetic() {
        assert_eq!(Tone::from_name("sarcastic"), Tone::Empathetic);
        assert_eq!(Tone::from_name(""), Tone::Empathetic);
        assert_eq!(Tone::from_name("Blunt"), Tone::Blunt);
        assert_eq!(Tone::from_name("therapist-like"), Tone::TherapistLike);
    }

    #[test]
    fn tone_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&Tone::TherapistLike).unwrap(),
            "\"therapist-like\""
        );
    }

    #[test]
    fn summarization_prompt_labels_speakers() {
        let turns = vec![
            Turn::new(Role::User, "I had a rough day"),
            Turn::new(Role::Assistant, "Tell me about it"),
        ];

        let prompt = summarization_prompt(&turns);

        assert!(prompt.contains("User: I had a rough day"));
        assert!(prompt.contains("Assistant: Tell me about it"));
        assert!(prompt.ends_with("Summary:"));
    }
}
