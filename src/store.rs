use crate::providers::Message;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Histories are truncated past this many turns.
const MAX_TURNS: usize = 12;
/// The system preamble and the seed assistant greeting. Never evicted.
const SEED_TURNS: usize = 2;
/// Most recent turns kept alongside the seed when truncating.
const KEEP_RECENT: usize = MAX_TURNS - SEED_TURNS;

/// Process-wide map from session id to ordered conversation history.
///
/// The map itself is sharded (DashMap), so sessions never contend with each
/// other. Ordering of a single session's read-modify-write is the caller's
/// job: take `session_guard(id)` for the whole exchange. Map shard locks are
/// held only inside individual method calls, never across awaits.
pub struct ConversationStore {
    sessions: DashMap<String, Vec<Message>>,
    guards: DashMap<String, Arc<Mutex<()>>>,
    preamble: String,
    seed_greeting: String,
}

impl ConversationStore {
    pub fn new(preamble: impl Into<String>, seed_greeting: impl Into<String>) -> Self {
        Self {
            sessions: DashMap::new(),
            guards: DashMap::new(),
            preamble: preamble.into(),
            seed_greeting: seed_greeting.into(),
        }
    }

    /// Per-session mutex serializing get_or_create → append for one session.
    /// Cloned out as an Arc so the lock outlives the shard access.
    pub fn session_guard(&self, session_id: &str) -> Arc<Mutex<()>> {
        self.guards
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Returns the session's history, seeding a new one with the policy
    /// preamble and the assistant greeting on first sight of the id.
    pub fn get_or_create(&self, session_id: &str) -> Vec<Message> {
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                vec![
                    Message::system(self.preamble.clone()),
                    Message::assistant(self.seed_greeting.clone()),
                ]
            })
            .clone()
    }

    /// Appends turns to the end of the session's history, then bounds growth:
    /// past MAX_TURNS the history becomes seed turns + the most recent
    /// KEEP_RECENT, so the preamble and greeting survive every truncation.
    pub fn append(&self, session_id: &str, turns: Vec<Message>) {
        let mut entry = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                vec![
                    Message::system(self.preamble.clone()),
                    Message::assistant(self.seed_greeting.clone()),
                ]
            });

        entry.extend(turns);

        if entry.len() > MAX_TURNS {
            let recent: Vec<Message> = entry[entry.len() - KEEP_RECENT..].to_vec();
            entry.truncate(SEED_TURNS);
            entry.extend(recent);
        }
    }

    /// Drops the session's history entirely. Used after a policy violation so
    /// a disallowed topic cannot leak into future turns via retained context.
    pub fn reset(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    pub fn history_len(&self, session_id: &str) -> usize {
        self.sessions
            .get(session_id)
            .map(|h| h.len())
            .unwrap_or(0)
    }
}
