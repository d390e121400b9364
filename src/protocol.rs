use crate::orchestrator::ChatOrchestrator;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use uuid::Uuid;

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;

const UNKNOWN_METHOD_TEXT: &str = "Unknown method. Use 'message/send' or 'execute'.";

// Outbound task envelope. Typed so a response can never ship with a missing
// required field.

#[derive(Serialize)]
struct Part {
    kind: &'static str,
    text: String,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text",
            text: text.into(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AgentMessage {
    kind: &'static str,
    role: &'static str,
    parts: Vec<Part>,
    message_id: String,
    task_id: Option<String>,
    metadata: Option<Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Artifact {
    artifact_id: String,
    name: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct TaskStatus {
    state: &'static str,
    timestamp: String,
    message: AgentMessage,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskResult {
    id: String,
    context_id: String,
    status: TaskStatus,
    artifacts: Vec<Artifact>,
    history: Vec<AgentMessage>,
    kind: &'static str,
}

fn agent_message(text: &str, task_id: &str) -> AgentMessage {
    AgentMessage {
        kind: "message",
        role: "agent",
        parts: vec![Part::text(text)],
        message_id: Uuid::new_v4().to_string(),
        task_id: Some(task_id.to_string()),
        metadata: None,
    }
}

fn success_envelope(request_id: Value, reply: &str, session_id: &str, task_id: &str) -> Value {
    let result = TaskResult {
        id: task_id.to_string(),
        context_id: session_id.to_string(),
        status: TaskStatus {
            state: "completed",
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            message: agent_message(reply, task_id),
        },
        artifacts: vec![Artifact {
            artifact_id: Uuid::new_v4().to_string(),
            name: "assistantResponse",
            parts: vec![Part::text(reply)],
        }],
        history: vec![agent_message(reply, task_id)],
        kind: "task",
    };

    json!({
        "jsonrpc": "2.0",
        "id": request_id,
        "result": result,
    })
}

fn error_envelope(request_id: Value, code: i64, message: &str, data: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": request_id,
        "error": {
            "code": code,
            "message": message,
            "data": data,
        }
    })
}

/// Pulls the first `{"kind": "text"}` part out of a message object.
fn first_text_part(message: &Value) -> Option<String> {
    message
        .get("parts")
        .and_then(|p| p.as_array())?
        .iter()
        .find(|part| part.get("kind").and_then(|k| k.as_str()) == Some("text"))
        .and_then(|part| part.get("text").and_then(|t| t.as_str()))
        .map(|t| t.trim().to_string())
}

fn id_or_fresh(value: Option<&Value>) -> String {
    value
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Translates inbound JSON-RPC-shaped task requests into orchestrator calls
/// and wraps replies back into the outbound envelope. `handle` never fails
/// and never panics; every outcome is a well-formed envelope.
pub struct ProtocolAdapter {
    orchestrator: ChatOrchestrator,
}

impl ProtocolAdapter {
    pub fn new(orchestrator: ChatOrchestrator) -> Self {
        Self { orchestrator }
    }

    pub fn backend_available(&self) -> bool {
        self.orchestrator.backend_available()
    }

    pub async fn handle(&self, body: &str) -> Value {
        let envelope: Value = match serde_json::from_str(body) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "rejecting unparseable request body");
                return error_envelope(
                    Value::Null,
                    PARSE_ERROR,
                    "Invalid JSON format",
                    json!({}),
                );
            }
        };

        let request_id = envelope.get("id").cloned().unwrap_or(Value::Null);
        let params = envelope.get("params").cloned().unwrap_or_else(|| json!({}));

        match envelope.get("method").and_then(|m| m.as_str()) {
            Some("message/send") => self.handle_message_send(request_id, &params).await,
            Some("execute") => self.handle_execute(request_id, &params).await,
            Some(other) => {
                tracing::info!(method = other, "rejecting unknown method");
                error_envelope(
                    request_id,
                    METHOD_NOT_FOUND,
                    UNKNOWN_METHOD_TEXT,
                    json!({ "method": other }),
                )
            }
            None => error_envelope(request_id, INVALID_REQUEST, UNKNOWN_METHOD_TEXT, json!({})),
        }
    }

    async fn handle_message_send(&self, request_id: Value, params: &Value) -> Value {
        let message = params.get("message").cloned().unwrap_or_else(|| json!({}));

        // The caller's taskId correlates the conversation; its messageId
        // names this task. Both fall back to fresh identifiers.
        let session_id = id_or_fresh(message.get("taskId"));
        let task_id = id_or_fresh(message.get("messageId"));

        let user_message = first_text_part(&message).unwrap_or_default();
        let reply = self.orchestrator.chat(&user_message, &session_id).await;

        success_envelope(request_id, &reply, &session_id, &task_id)
    }

    async fn handle_execute(&self, request_id: Value, params: &Value) -> Value {
        let session_id = id_or_fresh(params.get("contextId"));
        let task_id = id_or_fresh(params.get("taskId"));

        let user_message = params
            .get("messages")
            .and_then(|m| m.as_array())
            .map(|messages| {
                messages
                    .iter()
                    .find_map(first_text_part)
                    .unwrap_or_default()
            })
            .unwrap_or_default();

        let reply = self.orchestrator.chat(&user_message, &session_id).await;

        success_envelope(request_id, &reply, &session_id, &task_id)
    }
}
