//! Remembered facts about the user and their prompt rendering.
//!
//! Facts arrive from an extraction pipeline outside this crate; the store
//! enforces the dedup invariant and the formatter turns a ranked selection
//! into the context block injected into the system prompt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of thing a fact describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactKind {
    Person,
    Place,
    Thing,
    Event,
    Mood,
    Action,
    Date,
}

/// How much weight a fact carries when selecting context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    Medium,
    High,
}

impl Importance {
    fn weight(self) -> u8 {
        match self {
            Importance::High => 3,
            Importance::Medium => 2,
            Importance::Low => 1,
        }
    }
}

/// An atomic remembered datum about the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserFact {
    pub id: Uuid,
    pub kind: FactKind,
    pub content: String,
    pub context: Option<String>,
    pub importance: Importance,
    pub timestamp: DateTime<Utc>,
    pub last_referenced: DateTime<Utc>,
}

impl UserFact {
    pub fn new(kind: FactKind, content: impl Into<String>, importance: Importance) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            kind,
            content: content.into(),
            context: None,
            importance,
            timestamp: now,
            last_referenced: now,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    fn dedup_key(&self) -> (FactKind, String) {
        (self.kind, self.content.trim().to_lowercase())
    }
}

/// Default cap on stored facts; oldest insertions fall off past it.
pub const MAX_STORED_FACTS: usize = 50;

/// In-memory fact store, newest first.
///
/// Uniqueness is per `(kind, content)` case-insensitively: saving a
/// duplicate refreshes `last_referenced` on the existing record instead of
/// inserting a second copy. Near-duplicates with different wording are
/// distinct records.
#[derive(Debug, Clone)]
pub struct FactStore {
    facts: Vec<UserFact>,
    capacity: usize,
}

impl Default for FactStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FactStore {
    pub fn new() -> Self {
        Self::with_capacity(MAX_STORED_FACTS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            facts: Vec::new(),
            capacity,
        }
    }

    /// Save a fact, deduplicating per the store invariant. Returns the id
    /// of the stored (or refreshed) record.
    pub fn save(&mut self, fact: UserFact) -> Uuid {
        let key = fact.dedup_key();
        if let Some(existing) = self.facts.iter_mut().find(|f| f.dedup_key() == key) {
            existing.last_referenced = Utc::now();
            return existing.id;
        }

        let id = fact.id;
        self.facts.insert(0, fact);
        self.facts.truncate(self.capacity);
        id
    }

    pub fn all(&self) -> &[UserFact] {
        &self.facts
    }

    /// The `limit` most relevant facts, importance first, recency second.
    pub fn relevant(&self, limit: usize) -> Vec<UserFact> {
        rank_facts(&self.facts, limit)
    }

    pub fn by_kind(&self, kind: FactKind) -> Vec<&UserFact> {
        self.facts.iter().filter(|f| f.kind == kind).collect()
    }

    pub fn mark_referenced(&mut self, id: Uuid) -> bool {
        match self.facts.iter_mut().find(|f| f.id == id) {
            Some(fact) => {
                fact.last_referenced = Utc::now();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.facts.len();
        self.facts.retain(|f| f.id != id);
        self.facts.len() < before
    }

    pub fn clear(&mut self) {
        self.facts.clear();
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

/// Stable-sort facts by importance descending, ties broken by most recent
/// timestamp, then truncate to `limit`.
pub fn rank_facts(facts: &[UserFact], limit: usize) -> Vec<UserFact> {
    let mut ranked: Vec<UserFact> = facts.to_vec();
    ranked.sort_by(|a, b| {
        b.importance
            .weight()
            .cmp(&a.importance.weight())
            .then(b.timestamp.cmp(&a.timestamp))
    });
    ranked.truncate(limit);
    ranked
}

fn section(
    out: &mut String,
    label: &str,
    facts: &[&UserFact],
    separator: &str,
    render: impl Fn(&UserFact) -> String,
) {
    if facts.is_empty() {
        return;
    }
    let items: Vec<String> = facts.iter().map(|&f| render(f)).collect();
    out.push('\n');
    out.push_str(label);
    out.push_str(": ");
    out.push_str(&items.join(separator));
}

fn content_only(fact: &UserFact) -> String {
    fact.content.clone()
}

fn with_context(fact: &UserFact) -> String {
    match &fact.context {
        Some(context) => format!("{} ({})", fact.content, context),
        None => fact.content.clone(),
    }
}

fn importance_label(importance: Importance) -> &'static str {
    match importance {
        Importance::High => "high",
        Importance::Medium => "medium",
        Importance::Low => "low",
    }
}

/// Render facts as the "remembered information" context block.
///
/// Sections appear in a fixed order and empty sections are omitted
/// entirely. Returns an empty string for empty input; callers treat that as
/// "no block", never as an error.
pub fn format_facts_for_prompt(facts: &[UserFact]) -> String {
    if facts.is_empty() {
        return String::new();
    }

    let of_kind = |kind: FactKind| -> Vec<&UserFact> {
        facts.iter().filter(|f| f.kind == kind).collect()
    };

    let mut out = String::from("Remembered information about the user:");

    section(&mut out, "People", &of_kind(FactKind::Person), ", ", content_only);
    section(&mut out, "Places", &of_kind(FactKind::Place), ", ", content_only);
    section(&mut out, "Events", &of_kind(FactKind::Event), "; ", |f| {
        format!(
            "{} [Importance: {}]",
            with_context(f),
            importance_label(f.importance)
        )
    });
    section(&mut out, "Recent moods", &of_kind(FactKind::Mood), ", ", content_only);
    section(&mut out, "Actions/Goals", &of_kind(FactKind::Action), "; ", content_only);
    section(&mut out, "Important things", &of_kind(FactKind::Thing), ", ", content_only);
    section(&mut out, "Important dates", &of_kind(FactKind::Date), "; ", with_context);

    out.push_str(
        "\n\nNaturally reference these facts in conversation when relevant. \
         Ask follow-up questions about past events, moods, or goals.",
    );

    out
}
