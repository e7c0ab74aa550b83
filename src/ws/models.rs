use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

/// Events pushed from the server to WebSocket clients. On the wire each
/// event is a JSON text frame of the form `{"event": <name>, "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    Connected {
        status: String,
    },
    QuestionCreated {
        id: i32,
    },
    QuestionUpdated {
        id: i32,
    },
    QuestionDeleted {
        id: i32,
    },
    ActivityCreated {
        id: i32,
    },
    ActivityUpdated {
        activity_id: i32,
        updates: Value,
    },
    UserJoined {
        activity_id: i32,
        user_id: i32,
    },
    AnswerSubmitted {
        activity_id: i32,
        question_id: i32,
    },
    JoinedActivity {
        activity_id: i32,
    },
    DisplayJoined {
        status: String,
    },
    DisplayUpdate {
        activity_id: i32,
        display_mode: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        answer: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        stats_limit: Option<i64>,
    },
    TimerUpdate {
        activity_id: i32,
        time_remaining: i64,
    },
    AnswerDisplay {
        activity_id: i32,
        answer: Value,
    },
}

/// Events clients may send to the server, same frame format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinActivity { activity_id: i32 },
    JoinDisplay,
    BroadcastTimer { activity_id: i32, time_remaining: i64 },
    ProjectAnswer { activity_id: i32, answer: Value },
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::JoinActivity { .. } => "join_activity",
            ClientEvent::JoinDisplay => "join_display",
            ClientEvent::BroadcastTimer { .. } => "broadcast_timer",
            ClientEvent::ProjectAnswer { .. } => "project_answer",
        }
    }
}

/// A broadcast fan-out message. `origin` carries the connection id of the
/// client that triggered the event so it can be excluded from delivery
/// (timer and projection relays are not echoed back to their sender).
#[derive(Debug, Clone)]
pub struct Broadcast {
    pub origin: Option<u64>,
    pub event: ServerEvent,
}

pub type EventSender = broadcast::Sender<Broadcast>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn server_events_use_snake_case_wire_names() {
        let event = ServerEvent::AnswerSubmitted {
            activity_id: 1,
            question_id: 7,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({"event": "answer_submitted", "data": {"activity_id": 1, "question_id": 7}})
        );
    }

    #[test]
    fn display_update_omits_absent_fields() {
        let event = ServerEvent::DisplayUpdate {
            activity_id: 3,
            display_mode: "stats".to_string(),
            answer: None,
            stats_limit: None,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({"event": "display_update", "data": {"activity_id": 3, "display_mode": "stats"}})
        );
    }

    #[test]
    fn display_update_keeps_projection_payload() {
        let event = ServerEvent::DisplayUpdate {
            activity_id: 3,
            display_mode: "answer".to_string(),
            answer: Some(json!({"text": "42"})),
            stats_limit: Some(10),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["data"]["answer"], json!({"text": "42"}));
        assert_eq!(value["data"]["stats_limit"], json!(10));
    }

    #[test]
    fn join_display_parses_without_data() {
        let event: ClientEvent = serde_json::from_str(r#"{"event": "join_display"}"#).unwrap();
        assert_eq!(event, ClientEvent::JoinDisplay);
    }

    #[test]
    fn join_activity_parses_activity_id() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"event": "join_activity", "data": {"activity_id": 5}}"#)
                .unwrap();
        assert_eq!(event, ClientEvent::JoinActivity { activity_id: 5 });
    }

    #[test]
    fn client_event_names_match_wire_format() {
        let event = ClientEvent::BroadcastTimer {
            activity_id: 1,
            time_remaining: 30,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], json!(event.name()));
    }
}
