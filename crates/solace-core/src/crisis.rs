//! Crisis-language classification.
//!
//! Purely advisory input to the orchestrator: a positive signal adds a
//! per-call guidance directive, nothing more. The trait seam exists so a
//! deployment can swap in a model-backed classifier.

use serde::{Deserialize, Serialize};

/// Assessed severity of concerning language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrisisSeverity {
    #[default]
    None,
    Low,
    Moderate,
    High,
}

/// Classifier verdict for one user message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrisisSignal {
    pub detected: bool,
    pub severity: CrisisSeverity,
    /// Keywords that triggered the verdict, for logging/UI.
    pub matched: Vec<String>,
}

impl CrisisSignal {
    /// A negative verdict.
    pub fn clear() -> Self {
        Self::default()
    }
}

/// Classifier seam consumed by callers before invoking the orchestrator.
pub trait CrisisDetector: Send + Sync {
    fn detect(&self, text: &str) -> CrisisSignal;
}

const DEFAULT_KEYWORDS: [&str; 11] = [
    "suicide",
    "kill myself",
    "end my life",
    "want to die",
    "self harm",
    "hurt myself",
    "no reason to live",
    "better off dead",
    "can't go on",
    "ending it all",
    "take my own life",
];

/// Keyword-matching classifier. Severity scales with the number of distinct
/// phrases found: one is low, two moderate, three or more high.
#[derive(Debug, Clone)]
pub struct KeywordCrisisDetector {
    keywords: Vec<String>,
}

impl Default for KeywordCrisisDetector {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl KeywordCrisisDetector {
    pub fn new(keywords: Vec<String>) -> Self {
        Self { keywords }
    }
}

impl CrisisDetector for KeywordCrisisDetector {
    fn detect(&self, text: &str) -> CrisisSignal {
        let lowered = text.to_lowercase();
        let matched: Vec<String> = self
            .keywords
            .iter()
            .filter(|keyword| lowered.contains(keyword.as_str()))
            .cloned()
            .collect();

        if matched.is_empty() {
            return CrisisSignal::clear();
        }

        let severity = match matched.len() {
            1 => CrisisSeverity::Low,
            2 => CrisisSeverity::Moderate,
            _ => CrisisSeverity::High,
        };

        CrisisSignal {
            detected: true,
            severity,
            matched,
        }
    }
}
