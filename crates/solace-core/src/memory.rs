//! Conversation memory with rolling summarization
//!
//! Holds a session's turn history and rolling summaries, and exposes the
//! summarization-trigger decision and the eviction policy. Summarization
//! itself is two-phase: `turns_to_summarize` previews the slice without
//! mutating anything, and only `commit_summary` compacts the history, so a
//! failed external summarization call leaves memory untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use solace_llm::Role;

use crate::config::MemoryConfig;

/// One conversational message. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Serializable memory state for persistence and session restoration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub recent_turns: Vec<Turn>,
    pub summaries: Vec<String>,
    pub session_start: DateTime<Utc>,
}

/// Per-session conversation memory.
///
/// `recent_turns` grows past `summarize_threshold` only transiently: the
/// orchestrator compacts it on the next successful summarization. Older
/// turns survive only inside summary text after that; the compaction is
/// lossy and one-way.
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    recent_turns: Vec<Turn>,
    summaries: Vec<String>,
    session_start: DateTime<Utc>,
    config: MemoryConfig,
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(MemoryConfig::default())
    }
}

impl ConversationMemory {
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            recent_turns: Vec::new(),
            summaries: Vec::new(),
            session_start: Utc::now(),
            config,
        }
    }

    /// Append a turn with the current timestamp. Never fails.
    pub fn add_turn(&mut self, role: Role, content: impl Into<String>) {
        self.recent_turns.push(Turn::new(role, content));
    }

    /// True once the turn count strictly exceeds the summarize threshold.
    pub fn should_summarize(&self) -> bool {
        self.recent_turns.len() > self.config.summarize_threshold
    }

    /// The turns a summary would compress: all but the last
    /// `keep_on_summarize`, oldest first. Non-mutating preview; committing
    /// is a separate step.
    pub fn turns_to_summarize(&self) -> &[Turn] {
        let cut = self
            .recent_turns
            .len()
            .saturating_sub(self.config.keep_on_summarize);
        &self.recent_turns[..cut]
    }

    /// Compact the history: retain the last `keep_on_summarize` turns,
    /// store the summary, and evict the oldest summary past the cap.
    pub fn commit_summary(&mut self, summary: impl Into<String>) {
        let cut = self
            .recent_turns
            .len()
            .saturating_sub(self.config.keep_on_summarize);
        self.recent_turns.drain(..cut);

        self.summaries.push(summary.into());
        while self.summaries.len() > self.config.max_summaries {
            self.summaries.remove(0);
        }
    }

    pub fn recent_turns(&self) -> &[Turn] {
        &self.recent_turns
    }

    /// The last `n` turns, oldest first.
    pub fn last_turns(&self, n: usize) -> &[Turn] {
        let start = self.recent_turns.len().saturating_sub(n);
        &self.recent_turns[start..]
    }

    pub fn summaries(&self) -> &[String] {
        &self.summaries
    }

    pub fn session_start(&self) -> DateTime<Utc> {
        self.session_start
    }

    pub fn len(&self) -> usize {
        self.recent_turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recent_turns.is_empty()
    }

    /// Read-only copy of the current state for persistence.
    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot {
            recent_turns: self.recent_turns.clone(),
            summaries: self.summaries.clone(),
            session_start: self.session_start,
        }
    }

    /// Replace the state wholesale, e.g. when resuming a persisted session.
    pub fn restore(&mut self, state: MemorySnapshot) {
        self.recent_turns = state.recent_turns;
        self.summaries = state.summaries;
        self.session_start = state.session_start;
    }

    /// Reset to an empty state with a fresh session start.
    pub fn clear(&mut self) {
        self.recent_turns.clear();
        self.summaries.clear();
        self.session_start = Utc::now();
    }
}
