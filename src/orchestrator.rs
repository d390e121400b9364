use crate::classifier::{Classification, TopicClassifier};
use crate::core::error::AgentError;
use crate::providers::{GenerateOptions, Message, ModelProvider};
use crate::store::ConversationStore;

/// System-role instruction seeding every session's history.
pub const POLICY_PREAMBLE: &str = "You are Health Buddy, a strictly focused health and wellness virtual assistant.
CRITICAL RULES:
1. Only answer human health, wellness, nutrition, exercise, mental health, and sleep.
2. Refuse any unrelated topics with the exact message:
\"I specialize only in health and wellness topics. I can help with nutrition, exercise, mental health, sleep, or other health-related questions!\"
3. Do not provide medical diagnoses; always advise consulting a professional for concerning symptoms.
";

/// Assistant turn seeding every session's history, right after the preamble.
pub const SEED_GREETING: &str =
    "Hello! I'm Health Buddy, your dedicated health and wellness assistant. How can I help you today?";

/// Reply for empty input and plain greetings. Never costs a model call.
pub const GREETING_TEXT: &str = "Hello! I'm Health Buddy, your dedicated health and wellness assistant! 😊 I'm here to help with nutrition, exercise, mental health, sleep, and all health-related questions. How can I support your wellness journey today?";

pub const REFUSAL_TEXT: &str = "I specialize only in health and wellness topics. I can help with nutrition, exercise, mental health, sleep, or other health-related questions!";

pub const CLARIFY_TEXT: &str = "Could you tell me a bit more? I can help with nutrition, exercise, sleep, stress, or any other health and wellness question.";

pub const UNAVAILABLE_TEXT: &str = "I'm currently unavailable. Please try again later.";

const GREETING_PHRASES: &[&str] = &["hi", "hello", "how are you", "hey", "whats up", "what's up"];

/// Ambiguous input at or under this many tokens gets a clarifying question
/// instead of the refusal. A policy knob, not a discovered invariant.
const CLARIFY_MAX_TOKENS: usize = 4;

/// Composes the topic gate, the session store, and a model backend into the
/// `chat(message, session_id) -> reply` contract. `chat` never fails: every
/// internal error degrades to one of the fixed policy strings.
pub struct ChatOrchestrator {
    classifier: TopicClassifier,
    store: ConversationStore,
    provider: Box<dyn ModelProvider>,
    options: GenerateOptions,
}

impl ChatOrchestrator {
    pub fn new(provider: Box<dyn ModelProvider>) -> Self {
        Self {
            classifier: TopicClassifier::new(),
            store: ConversationStore::new(POLICY_PREAMBLE, SEED_GREETING),
            provider,
            options: GenerateOptions::default(),
        }
    }

    pub fn backend_available(&self) -> bool {
        self.provider.is_configured()
    }

    pub async fn chat(&self, user_message: &str, session_id: &str) -> String {
        let text = user_message.trim();

        // Empty input and plain greetings bypass both the classifier and the
        // model; history is untouched.
        if text.is_empty() {
            return GREETING_TEXT.to_string();
        }
        if GREETING_PHRASES.contains(&text.to_lowercase().as_str()) {
            return GREETING_TEXT.to_string();
        }

        match self.classifier.classify(text) {
            Classification::OffTopic => {
                tracing::info!(session_id, "refusing off-topic message");
                REFUSAL_TEXT.to_string()
            }
            Classification::Ambiguous => {
                if text.split_whitespace().count() <= CLARIFY_MAX_TOKENS {
                    CLARIFY_TEXT.to_string()
                } else {
                    tracing::info!(session_id, "refusing long ambiguous message");
                    REFUSAL_TEXT.to_string()
                }
            }
            Classification::OnTopic => match self.exchange(text, session_id).await {
                Ok(reply) => reply,
                Err(AgentError::BackendUnavailable) => {
                    tracing::warn!(session_id, "model backend not configured");
                    UNAVAILABLE_TEXT.to_string()
                }
                Err(AgentError::PolicyViolation) => REFUSAL_TEXT.to_string(),
                Err(err) => {
                    // Conservative default: a failed generation reads as a
                    // scope refusal, never as internal error detail.
                    tracing::warn!(session_id, error = %err, "generation failed");
                    REFUSAL_TEXT.to_string()
                }
            },
        }
    }

    /// One on-topic exchange. The per-session guard is held across the whole
    /// read-modify-write, including the backend call, so concurrent calls for
    /// the same session cannot drop or interleave turn pairs. Store-internal
    /// locks are never held across the await.
    async fn exchange(&self, user_message: &str, session_id: &str) -> Result<String, AgentError> {
        let guard = self.store.session_guard(session_id);
        let _serialized = guard.lock().await;

        let mut history = self.store.get_or_create(session_id);
        history.push(Message::user(user_message));

        let reply = self.provider.generate(&history, &self.options).await?;
        tracing::debug!(session_id, raw = %reply.raw, "model reply");

        let text = reply.text.trim().to_string();
        if self.classifier.contains_off_topic(&text) {
            // Discard the whole session so the drifted topic cannot leak into
            // future turns via retained context. The exchange is not persisted.
            tracing::info!(session_id, "off-topic model reply, resetting session");
            self.store.reset(session_id);
            return Err(AgentError::PolicyViolation);
        }

        self.store.append(
            session_id,
            vec![Message::user(user_message), Message::assistant(text.clone())],
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ModelReply;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum StubBehavior {
        Reply(&'static str),
        Timeout,
        Unavailable,
    }

    struct StubProvider {
        behavior: StubBehavior,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ModelProvider for StubProvider {
        async fn generate(
            &self,
            _history: &[Message],
            _options: &GenerateOptions,
        ) -> Result<ModelReply, AgentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                StubBehavior::Reply(text) => Ok(ModelReply {
                    text: text.to_string(),
                    raw: serde_json::json!({"stub": true}),
                }),
                StubBehavior::Timeout => {
                    Err(AgentError::Generation("Request timed out".to_string()))
                }
                StubBehavior::Unavailable => Err(AgentError::BackendUnavailable),
            }
        }

        fn is_configured(&self) -> bool {
            !matches!(self.behavior, StubBehavior::Unavailable)
        }
    }

    fn orchestrator(behavior: StubBehavior) -> (ChatOrchestrator, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let orch = ChatOrchestrator::new(Box::new(StubProvider {
            behavior,
            calls: calls.clone(),
        }));
        (orch, calls)
    }

    #[tokio::test]
    async fn greetings_bypass_classifier_and_model() {
        let (orch, calls) = orchestrator(StubBehavior::Reply("unused"));

        assert_eq!(orch.chat("Hello", "s1").await, GREETING_TEXT);
        assert_eq!(orch.chat("HEY", "s1").await, GREETING_TEXT);
        assert_eq!(orch.chat("what's up", "s1").await, GREETING_TEXT);

        // no model call, no session created
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(orch.store.history_len("s1"), 0);
    }

    #[tokio::test]
    async fn empty_input_gets_greeting_without_touching_history() {
        let (orch, calls) = orchestrator(StubBehavior::Reply("unused"));
        assert_eq!(orch.chat("", "s1").await, GREETING_TEXT);
        assert_eq!(orch.chat("   \t ", "s1").await, GREETING_TEXT);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(orch.store.history_len("s1"), 0);
    }

    #[tokio::test]
    async fn off_topic_input_is_refused_without_model_call() {
        let (orch, calls) = orchestrator(StubBehavior::Reply("unused"));
        assert_eq!(
            orch.chat("What's the best crypto to buy?", "s1").await,
            REFUSAL_TEXT
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(orch.store.history_len("s1"), 0);
    }

    #[tokio::test]
    async fn short_ambiguous_input_gets_clarifying_question() {
        let (orch, calls) = orchestrator(StubBehavior::Reply("unused"));
        assert_eq!(orch.chat("ok", "s1").await, CLARIFY_TEXT);
        assert_eq!(orch.chat("hmm not sure really", "s1").await, CLARIFY_TEXT);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn long_ambiguous_input_is_refused() {
        let (orch, calls) = orchestrator(StubBehavior::Reply("unused"));
        assert_eq!(
            orch.chat("please tell me something interesting about anything", "s1")
                .await,
            REFUSAL_TEXT
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(orch.store.history_len("s1"), 0);
    }

    #[tokio::test]
    async fn on_topic_input_reaches_model_and_persists_one_exchange() {
        let (orch, calls) = orchestrator(StubBehavior::Reply("  Try gentle stretching.  "));

        let reply = orch.chat("yoga", "s1").await;
        assert_eq!(reply, "Try gentle stretching.");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // seed (2) + user + assistant
        assert_eq!(orch.store.history_len("s1"), 4);
    }

    #[tokio::test]
    async fn repeated_refusals_never_mutate_history() {
        let (orch, _) = orchestrator(StubBehavior::Reply("Stay hydrated."));
        orch.chat("any tips for better sleep habits", "s1").await;
        let before = orch.store.history_len("s1");

        orch.chat("best bitcoin to buy", "s1").await;
        orch.chat("best bitcoin to buy", "s1").await;
        assert_eq!(orch.store.history_len("s1"), before);
    }

    #[tokio::test]
    async fn off_topic_model_reply_resets_session() {
        let (orch, _) = orchestrator(StubBehavior::Reply(
            "You should watch a movie about marathon training!",
        ));

        assert_eq!(orch.chat("marathon training health tips", "s1").await, REFUSAL_TEXT);
        // reset occurred: nothing of the exchange persisted, only fresh seeds
        assert_eq!(orch.store.history_len("s1"), 0);
        assert_eq!(orch.store.get_or_create("s1").len(), 2);
    }

    #[tokio::test]
    async fn generation_timeout_degrades_to_refusal_and_keeps_history() {
        let (orch, calls) = orchestrator(StubBehavior::Timeout);
        orch.store
            .append("s1", vec![Message::user("q"), Message::assistant("a")]);
        let before = orch.store.history_len("s1");

        assert_eq!(
            orch.chat("how much sleep is healthy", "s1").await,
            REFUSAL_TEXT
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(orch.store.history_len("s1"), before);
    }

    #[tokio::test]
    async fn unconfigured_backend_reports_unavailable() {
        let (orch, _) = orchestrator(StubBehavior::Unavailable);
        assert!(!orch.backend_available());
        assert_eq!(
            orch.chat("is my diet healthy enough", "s1").await,
            UNAVAILABLE_TEXT
        );
    }

    #[tokio::test]
    async fn successful_exchange_grows_history_by_exactly_two() {
        let (orch, _) = orchestrator(StubBehavior::Reply("Aim for 7-9 hours."));
        let before = orch.store.get_or_create("s1").len();
        orch.chat("how much sleep do I need", "s1").await;
        assert_eq!(orch.store.history_len("s1"), before + 2);
    }
}
