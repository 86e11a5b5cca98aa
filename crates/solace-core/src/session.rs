//! Per-turn orchestration: memory lookup, summarization, context assembly,
//! and the completion call.

use std::sync::Arc;

use chrono::Timelike;
use dashmap::DashMap;
use tokio::sync::Mutex;

use solace_llm::{CompletionRequest, LlmClient, Message, Role};

use crate::config::{GenerationConfig, MemoryConfig};
use crate::crisis::CrisisSignal;
use crate::error::{CoreError, Result};
use crate::facts::{UserFact, format_facts_for_prompt, rank_facts};
use crate::greeting::{default_greeting, greeting_instruction};
use crate::journal::{JournalEntry, format_journal_for_prompt};
use crate::memory::{ConversationMemory, MemorySnapshot};
use crate::prompt::{
    FALLBACK_REPLY, CRISIS_DIRECTIVE, Persona, SUMMARIZER_SYSTEM_PROMPT, Tone,
    compose_system_prompt, summarization_prompt,
};

/// Journal entries rendered into a chat turn's context block.
const JOURNAL_ENTRIES_PER_TURN: usize = 3;
/// Facts rendered into a context block.
const FACTS_PER_TURN: usize = 15;

/// Session-keyed table of conversation memories.
///
/// Injected into [`Companion`] rather than living in a process-wide global,
/// so tests and embedders control its lifecycle. Sessions are created on
/// first use and removed only by explicit reset. Each memory sits behind its
/// own async mutex; turns for one session serialize in arrival order while
/// distinct sessions proceed in parallel.
pub struct SessionStore {
    sessions: DashMap<String, Arc<Mutex<ConversationMemory>>>,
    config: MemoryConfig,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(MemoryConfig::default())
    }
}

impl SessionStore {
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    pub fn get(&self, session_id: &str) -> Option<Arc<Mutex<ConversationMemory>>> {
        self.sessions
            .get(session_id)
            .map(|entry| entry.value().clone())
    }

    pub fn get_or_create(&self, session_id: &str) -> Arc<Mutex<ConversationMemory>> {
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(ConversationMemory::new(self.config.clone()))))
            .value()
            .clone()
    }

    /// Drop a session's memory entirely. Returns false when the id was
    /// unknown.
    pub fn remove(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// One incoming user utterance plus the context the surrounding service
/// already has on hand.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub session_id: String,
    pub text: String,
    pub tone: Tone,
    pub persona: Option<Persona>,
    pub facts: Vec<UserFact>,
    pub journal: Vec<JournalEntry>,
    /// Advisory classifier verdict for `text`; see [`crate::crisis`].
    pub crisis: CrisisSignal,
}

impl TurnRequest {
    pub fn new(session_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            text: text.into(),
            tone: Tone::default(),
            persona: None,
            facts: Vec::new(),
            journal: Vec::new(),
            crisis: CrisisSignal::clear(),
        }
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = Some(persona);
        self
    }

    /// Facts to consider for the context block; the most relevant are
    /// selected by importance and recency.
    pub fn with_facts(mut self, facts: Vec<UserFact>) -> Self {
        self.facts = facts;
        self
    }

    /// Journal entries sorted newest first.
    pub fn with_journal(mut self, journal: Vec<JournalEntry>) -> Self {
        self.journal = journal;
        self
    }

    pub fn with_crisis(mut self, crisis: CrisisSignal) -> Self {
        self.crisis = crisis;
        self
    }
}

/// Result of a processed turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub reply: String,
    /// The crisis verdict passed through for UI display.
    pub crisis: CrisisSignal,
}

/// Request to open a conversation without a user utterance.
#[derive(Debug, Clone)]
pub struct GreetingRequest {
    pub session_id: String,
    pub tone: Tone,
    pub persona: Option<Persona>,
    pub facts: Vec<UserFact>,
    pub journal: Vec<JournalEntry>,
    /// The user's local hour (0-23); the server clock is used when absent.
    pub local_hour: Option<u32>,
}

impl GreetingRequest {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            tone: Tone::default(),
            persona: None,
            facts: Vec::new(),
            journal: Vec::new(),
            local_hour: None,
        }
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = Some(persona);
        self
    }

    pub fn with_facts(mut self, facts: Vec<UserFact>) -> Self {
        self.facts = facts;
        self
    }

    pub fn with_journal(mut self, journal: Vec<JournalEntry>) -> Self {
        self.journal = journal;
        self
    }

    pub fn with_local_hour(mut self, hour: u32) -> Self {
        self.local_hour = Some(hour);
        self
    }
}

/// The conversation orchestrator.
///
/// Owns no global state: the model client and session store are injected.
pub struct Companion {
    llm: Arc<dyn LlmClient>,
    sessions: Arc<SessionStore>,
    generation: GenerationConfig,
}

impl Companion {
    pub fn new(llm: Arc<dyn LlmClient>, sessions: Arc<SessionStore>) -> Self {
        Self {
            llm,
            sessions,
            generation: GenerationConfig::default(),
        }
    }

    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Process one user utterance and return the assistant's reply.
    ///
    /// The user turn is committed before the completion call, so a failed
    /// call loses nothing the user said; no assistant turn is recorded in
    /// that case. Summarization failures are logged and suppressed; they
    /// retry on the next qualifying turn.
    pub async fn handle_turn(&self, request: TurnRequest) -> Result<TurnOutcome> {
        if request.session_id.trim().is_empty() {
            return Err(CoreError::InvalidInput("session id is required".to_string()));
        }
        if request.text.trim().is_empty() {
            return Err(CoreError::InvalidInput("message is required".to_string()));
        }

        let memory = self.sessions.get_or_create(&request.session_id);
        let mut memory = memory.lock().await;

        memory.add_turn(Role::User, &request.text);

        if memory.should_summarize() {
            self.try_summarize(&mut memory).await;
        }

        let context = render_context_blocks(&request.facts, &request.journal);
        let system_prompt = compose_system_prompt(request.persona.as_ref(), request.tone, &context);

        let mut messages = self.assemble(&memory, system_prompt);
        if request.crisis.detected {
            messages.push(Message::system(CRISIS_DIRECTIVE));
        }

        let completion = self
            .llm
            .complete(
                CompletionRequest::new(messages)
                    .with_temperature(self.generation.chat_temperature)
                    .with_max_tokens(self.generation.max_tokens),
            )
            .await?;

        let reply = match completion.content {
            Some(content) if !content.trim().is_empty() => content,
            _ => {
                tracing::debug!(
                    session_id = %request.session_id,
                    "model returned empty text, using fallback reply"
                );
                FALLBACK_REPLY.to_string()
            }
        };

        memory.add_turn(Role::Assistant, &reply);

        tracing::debug!(
            session_id = %request.session_id,
            turns = memory.len(),
            summaries = memory.summaries().len(),
            "turn completed"
        );

        Ok(TurnOutcome {
            reply,
            crisis: request.crisis,
        })
    }

    /// Generate an opening line for a session with no user utterance yet.
    ///
    /// Greetings are best-effort: any model failure, and any empty reply,
    /// degrades to the canned time-of-day greeting. The chosen greeting is
    /// recorded as an assistant turn either way.
    pub async fn handle_greeting(&self, request: GreetingRequest) -> Result<String> {
        if request.session_id.trim().is_empty() {
            return Err(CoreError::InvalidInput("session id is required".to_string()));
        }

        let hour = request
            .local_hour
            .map(|h| h % 24)
            .unwrap_or_else(|| chrono::Local::now().hour());

        let memory = self.sessions.get_or_create(&request.session_id);
        let mut memory = memory.lock().await;

        let context = render_context_blocks(&request.facts, &request.journal);
        let instruction =
            greeting_instruction(request.persona.as_ref(), request.tone, &context, hour);

        let completion = self
            .llm
            .complete(
                CompletionRequest::new(vec![Message::system(instruction)])
                    .with_temperature(self.generation.chat_temperature)
                    .with_max_tokens(self.generation.max_tokens),
            )
            .await;

        let greeting = match completion {
            Ok(response) => match response.content {
                Some(content) if !content.trim().is_empty() => content,
                _ => {
                    tracing::warn!("greeting came back empty, using canned greeting");
                    default_greeting(hour).to_string()
                }
            },
            Err(error) => {
                tracing::warn!(error = %error, "greeting generation failed, using canned greeting");
                default_greeting(hour).to_string()
            }
        };

        memory.add_turn(Role::Assistant, &greeting);

        Ok(greeting)
    }

    /// Discard the memory for a session. Returns false for unknown ids.
    pub fn reset_session(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id)
    }

    /// Read-only copy of a session's memory for persistence.
    pub async fn snapshot(&self, session_id: &str) -> Option<MemorySnapshot> {
        let memory = self.sessions.get(session_id)?;
        let memory = memory.lock().await;
        Some(memory.snapshot())
    }

    /// Resume a session from persisted state, creating it if needed.
    pub async fn restore(&self, session_id: &str, state: MemorySnapshot) {
        let memory = self.sessions.get_or_create(session_id);
        let mut memory = memory.lock().await;
        memory.restore(state);
    }

    /// Two-phase summarization: preview the slice, ask the model to
    /// compress it, and commit only on success.
    async fn try_summarize(&self, memory: &mut ConversationMemory) {
        let prompt = summarization_prompt(memory.turns_to_summarize());
        let request = CompletionRequest::new(vec![
            Message::system(SUMMARIZER_SYSTEM_PROMPT),
            Message::user(prompt),
        ])
        .with_temperature(self.generation.summary_temperature)
        .with_max_tokens(self.generation.summary_max_tokens);

        match self.llm.complete(request).await {
            Ok(response) => match response.content {
                Some(summary) if !summary.trim().is_empty() => {
                    tracing::debug!(
                        compacted = memory.turns_to_summarize().len(),
                        "committing conversation summary"
                    );
                    memory.commit_summary(summary);
                }
                _ => {
                    tracing::warn!("summarizer returned empty text, keeping full history");
                }
            },
            Err(error) => {
                tracing::warn!(error = %error, "summarization failed, keeping full history");
            }
        }
    }

    /// Final ordered message list: system prompt, then the joined rolling
    /// summaries when any exist, then the recent turns in chronological
    /// order (bounded by `max_recent_messages`).
    fn assemble(&self, memory: &ConversationMemory, system_prompt: String) -> Vec<Message> {
        let mut messages = vec![Message::system(system_prompt)];

        if !memory.summaries().is_empty() {
            messages.push(Message::system(format!(
                "Previous conversation summary:\n{}",
                memory.summaries().join("\n\n")
            )));
        }

        for turn in memory.last_turns(self.sessions.config().max_recent_messages) {
            messages.push(Message::new(turn.role, turn.content.clone()));
        }

        messages
    }
}

fn render_context_blocks(facts: &[UserFact], journal: &[JournalEntry]) -> String {
    let fact_block = format_facts_for_prompt(&rank_facts(facts, FACTS_PER_TURN));
    let journal_block = format_journal_for_prompt(journal, JOURNAL_ENTRIES_PER_TURN);

    match (fact_block.is_empty(), journal_block.is_empty()) {
        (true, true) => String::new(),
        (false, true) => fact_block,
        (true, false) => journal_block,
        (false, false) => format!("{fact_block}\n\n{journal_block}"),
    }
}
