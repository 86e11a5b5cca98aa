//! End-to-end orchestrator scenarios against the scripted mock client.

use std::sync::Arc;

use solace_core::{
    CRISIS_DIRECTIVE, Companion, CoreError, CrisisDetector, FALLBACK_REPLY, FactKind,
    GreetingRequest, Importance, JournalEntry, KeywordCrisisDetector, MemoryConfig, Persona,
    SessionStore, Tone, TurnRequest, UserFact, default_greeting,
};
use solace_llm::{MockLlmClient, MockStep, Role};

fn companion_with(
    config: MemoryConfig,
    steps: Vec<MockStep>,
) -> (Companion, MockLlmClient, Arc<SessionStore>) {
    let mock = MockLlmClient::from_steps("mock-model", steps);
    let sessions = Arc::new(SessionStore::new(config));
    let companion = Companion::new(Arc::new(mock.clone()), sessions.clone());
    (companion, mock, sessions)
}

fn companion(steps: Vec<MockStep>) -> (Companion, MockLlmClient, Arc<SessionStore>) {
    companion_with(MemoryConfig::default(), steps)
}

#[tokio::test]
async fn basic_exchange_records_both_turns() {
    let (companion, _, _) = companion(vec![MockStep::text("That sounds hard. Want to talk?")]);

    let outcome = companion
        .handle_turn(TurnRequest::new("s1", "I had a rough day"))
        .await
        .expect("turn should succeed");

    assert_eq!(outcome.reply, "That sounds hard. Want to talk?");
    assert!(!outcome.crisis.detected);

    let snapshot = companion.snapshot("s1").await.expect("session exists");
    assert_eq!(snapshot.recent_turns.len(), 2);
    assert_eq!(snapshot.recent_turns[0].role, Role::User);
    assert_eq!(snapshot.recent_turns[0].content, "I had a rough day");
    assert_eq!(snapshot.recent_turns[1].role, Role::Assistant);
}

#[tokio::test]
async fn long_conversation_compacts_into_summaries() {
    // Script left empty: the mock echoes, which serves both chat replies
    // and summaries.
    let (companion, _, _) = companion(Vec::new());

    for i in 0..9 {
        companion
            .handle_turn(TurnRequest::new("s1", format!("message {i}")))
            .await
            .expect("turn should succeed");
    }

    let snapshot = companion.snapshot("s1").await.expect("session exists");

    // With defaults (threshold 8, keep 4), compaction fires on the 5th and
    // 8th exchanges, leaving 7 turns and 2 summaries after the 9th.
    assert_eq!(snapshot.recent_turns.len(), 7);
    assert_eq!(snapshot.summaries.len(), 2);
    assert!(snapshot.recent_turns.len() <= MemoryConfig::default().summarize_threshold + 1);
}

#[tokio::test]
async fn committed_summaries_ride_along_as_one_system_message() {
    let (companion, mock, _) = companion(Vec::new());

    for i in 0..6 {
        companion
            .handle_turn(TurnRequest::new("s1", format!("message {i}")))
            .await
            .unwrap();
    }

    let requests = mock.requests().await;
    let last = requests.last().expect("requests were recorded");

    assert_eq!(last.messages[0].role, Role::System);
    assert!(
        last.messages[1]
            .content
            .starts_with("Previous conversation summary:"),
        "expected the summary block right after the system prompt"
    );
}

#[tokio::test]
async fn crisis_directive_reaches_the_model_but_not_memory() {
    let (companion, mock, _) = companion(vec![MockStep::text("I'm really glad you told me.")]);

    let detector = KeywordCrisisDetector::default();
    let text = "Lately I feel like there's no reason to live";
    let signal = detector.detect(text);
    assert!(signal.detected);

    let outcome = companion
        .handle_turn(TurnRequest::new("s1", text).with_crisis(signal))
        .await
        .expect("turn should succeed");
    assert!(outcome.crisis.detected);

    let requests = mock.requests().await;
    let sent = requests.last().unwrap();
    let directive = sent.messages.last().unwrap();
    assert_eq!(directive.role, Role::System);
    assert_eq!(directive.content, CRISIS_DIRECTIVE);

    let snapshot = companion.snapshot("s1").await.expect("session exists");
    assert_eq!(snapshot.recent_turns.len(), 2);
    assert!(
        snapshot
            .recent_turns
            .iter()
            .all(|turn| turn.content != CRISIS_DIRECTIVE && turn.role != Role::System),
        "the per-call directive must never be persisted"
    );
}

#[tokio::test]
async fn empty_completion_falls_back_and_is_committed() {
    let (companion, _, _) = companion(vec![MockStep::empty()]);

    let outcome = companion
        .handle_turn(TurnRequest::new("s1", "hello?"))
        .await
        .expect("empty completion is not an error");

    assert_eq!(outcome.reply, FALLBACK_REPLY);

    let snapshot = companion.snapshot("s1").await.expect("session exists");
    assert_eq!(snapshot.recent_turns[1].content, FALLBACK_REPLY);
}

#[tokio::test]
async fn failed_completion_keeps_user_turn_only() {
    let (companion, _, _) = companion(vec![MockStep::error("provider down")]);

    let error = companion
        .handle_turn(TurnRequest::new("s1", "are you there?"))
        .await
        .expect_err("transport failure should surface");
    assert!(matches!(error, CoreError::ModelUnavailable(_)));

    let snapshot = companion.snapshot("s1").await.expect("session exists");
    assert_eq!(snapshot.recent_turns.len(), 1);
    assert_eq!(snapshot.recent_turns[0].role, Role::User);
}

#[tokio::test]
async fn failed_summarization_leaves_memory_untouched_and_retries() {
    let config = MemoryConfig {
        summarize_threshold: 2,
        keep_on_summarize: 1,
        ..MemoryConfig::default()
    };
    let (companion, mock, sessions) = companion_with(
        config,
        vec![
            MockStep::text("ok1"),
            MockStep::error("summarizer down"),
            MockStep::text("ok2"),
        ],
    );

    companion
        .handle_turn(TurnRequest::new("s1", "first"))
        .await
        .unwrap();
    companion
        .handle_turn(TurnRequest::new("s1", "second"))
        .await
        .unwrap();

    // The summarization attempt failed; the turn itself still succeeded and
    // nothing was compacted.
    let memory = sessions.get("s1").expect("session exists");
    {
        let memory = memory.lock().await;
        assert!(memory.summaries().is_empty());
        assert_eq!(memory.len(), 4);
        assert!(memory.should_summarize());
    }

    // Next qualifying turn retries and succeeds.
    mock.push_step(MockStep::text("a tidy summary")).await;
    mock.push_step(MockStep::text("ok3")).await;

    companion
        .handle_turn(TurnRequest::new("s1", "third"))
        .await
        .unwrap();

    let memory = memory.lock().await;
    assert_eq!(memory.summaries(), ["a tidy summary"]);
    assert_eq!(memory.len(), 2);
}

#[tokio::test]
async fn context_and_persona_shape_the_system_prompt() {
    let (companion, mock, _) = companion(vec![MockStep::text("hi")]);

    let facts = vec![
        UserFact::new(FactKind::Person, "Sarah", Importance::High),
        UserFact::new(FactKind::Mood, "anxious", Importance::Medium),
    ];
    let journal = vec![JournalEntry::new(2, 4, "Worked through interview nerves.")];

    companion
        .handle_turn(
            TurnRequest::new("s1", "hey")
                .with_tone(Tone::TherapistLike)
                .with_persona(Persona::new("Luna", "You are gentle and curious."))
                .with_facts(facts)
                .with_journal(journal),
        )
        .await
        .unwrap();

    let requests = mock.requests().await;
    let system = &requests[0].messages[0];
    assert_eq!(system.role, Role::System);
    assert!(system.content.starts_with("You are Luna."));
    assert!(system.content.contains("therapeutic"));
    assert!(system.content.contains("People: Sarah"));
    assert!(system.content.contains("Recent journal entries:"));

    // Generation parameters come from the chat config.
    assert_eq!(requests[0].temperature, Some(0.8));
    assert_eq!(requests[0].max_tokens, Some(1000));
}

#[tokio::test]
async fn greeting_uses_the_model_when_available() {
    let (companion, mock, _) = companion(vec![MockStep::text("Good to see you again!")]);

    let greeting = companion
        .handle_greeting(GreetingRequest::new("s1").with_local_hour(9))
        .await
        .expect("greeting should succeed");

    assert_eq!(greeting, "Good to see you again!");

    let requests = mock.requests().await;
    assert_eq!(requests[0].messages.len(), 1);
    assert_eq!(requests[0].messages[0].role, Role::System);
    assert!(requests[0].messages[0].content.contains("Open the conversation"));

    // The greeting becomes the first assistant turn; no user turn exists.
    let snapshot = companion.snapshot("s1").await.expect("session exists");
    assert_eq!(snapshot.recent_turns.len(), 1);
    assert_eq!(snapshot.recent_turns[0].role, Role::Assistant);
}

#[tokio::test]
async fn greeting_degrades_to_canned_text_on_failure() {
    let (companion, _, _) = companion(vec![MockStep::error("provider down")]);

    let greeting = companion
        .handle_greeting(GreetingRequest::new("s1").with_local_hour(22))
        .await
        .expect("greetings never fail on model errors");

    assert_eq!(greeting, default_greeting(22));

    let snapshot = companion.snapshot("s1").await.expect("session exists");
    assert_eq!(snapshot.recent_turns[0].content, default_greeting(22));
}

#[tokio::test]
async fn invalid_input_is_rejected_before_any_mutation() {
    let (companion, _, sessions) = companion(Vec::new());

    let error = companion
        .handle_turn(TurnRequest::new("s1", "   "))
        .await
        .expect_err("blank message is invalid");
    assert!(matches!(error, CoreError::InvalidInput(_)));

    let error = companion
        .handle_turn(TurnRequest::new("", "hello"))
        .await
        .expect_err("missing session id is invalid");
    assert!(matches!(error, CoreError::InvalidInput(_)));

    assert!(sessions.is_empty(), "no session may be created on rejection");
}

#[tokio::test]
async fn reset_discards_the_session() {
    let (companion, _, sessions) = companion(Vec::new());

    companion
        .handle_turn(TurnRequest::new("s1", "hello"))
        .await
        .unwrap();
    assert!(sessions.contains("s1"));

    assert!(companion.reset_session("s1"));
    assert!(!sessions.contains("s1"));
    assert!(companion.snapshot("s1").await.is_none());
}

#[tokio::test]
async fn snapshot_restores_into_a_fresh_store() {
    let (original, _, _) = companion(Vec::new());

    original
        .handle_turn(TurnRequest::new("s1", "remember this"))
        .await
        .unwrap();
    let snapshot = original.snapshot("s1").await.expect("session exists");

    let (resumed, _, _) = companion(Vec::new());
    resumed.restore("s1", snapshot).await;

    let restored = resumed.snapshot("s1").await.expect("restored session");
    assert_eq!(restored.recent_turns.len(), 2);
    assert_eq!(restored.recent_turns[0].content, "remember this");
}
