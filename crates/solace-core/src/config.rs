//! Tunables for memory compaction and model generation.
//!
//! Everything here has a `Default` matching production behavior; callers
//! override individual fields with struct update syntax.

/// Conversation memory thresholds.
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    /// Upper bound on recent turns included in an outgoing request. Guards
    /// the context window while summarization keeps failing.
    pub max_recent_messages: usize,
    /// Summarize once the turn count exceeds this (strictly greater-than).
    pub summarize_threshold: usize,
    /// Turns retained verbatim after a summary is committed.
    pub keep_on_summarize: usize,
    /// Rolling summaries retained; oldest is evicted beyond this.
    pub max_summaries: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_recent_messages: 10,
            summarize_threshold: 8,
            keep_on_summarize: 4,
            max_summaries: 3,
        }
    }
}

/// Generation parameters for the two kinds of model calls the core makes.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub chat_temperature: f32,
    pub max_tokens: u32,
    pub summary_temperature: f32,
    pub summary_max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            chat_temperature: 0.8,
            max_tokens: 1000,
            summary_temperature: 0.3,
            summary_max_tokens: 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_production_values() {
        let memory = MemoryConfig::default();
        assert_eq!(memory.max_recent_messages, 10);
        assert_eq!(memory.summarize_threshold, 8);
        assert_eq!(memory.keep_on_summarize, 4);
        assert_eq!(memory.max_summaries, 3);

        let generation = GenerationConfig::default();
        assert_eq!(generation.chat_temperature, 0.8);
        assert_eq!(generation.max_tokens, 1000);
        assert_eq!(generation.summary_temperature, 0.3);
        assert_eq!(generation.summary_max_tokens, 500);
    }
}
