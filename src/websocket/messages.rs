use crate::metrics::ScheduleMetrics;
use crate::solver::GenerationReport;
use serde::{Deserialize, Serialize};

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Connected {
        connection_id: String,
    },
    /// One finished solver generation
    Progress {
        trimester: u8,
        generation: usize,
        best_penalty: f64,
        best_score: f64,
        conflicts: usize,
    },
    Completed {
        trimester: u8,
        metrics: ScheduleMetrics,
    },
    Failed {
        trimester: u8,
        message: String,
    },
    Pong,
    Error {
        message: String,
    },
}

impl ServerMessage {
    pub fn progress(trimester: u8, report: &GenerationReport) -> Self {
        ServerMessage::Progress {
            trimester,
            generation: report.generation,
            best_penalty: report.best_penalty,
            best_score: report.best_score,
            conflicts: report.conflicts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ping() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type": "ping"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));
    }

    #[test]
    fn test_unknown_client_message_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type": "subscribe"}"#).is_err());
    }

    #[test]
    fn test_serialize_connected() {
        let msg = ServerMessage::Connected {
            connection_id: "abc-123".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"connected""#));
        assert!(json.contains(r#""connection_id":"abc-123""#));
    }

    #[test]
    fn test_serialize_progress() {
        let report = GenerationReport {
            generation: 4,
            best_penalty: 16.0,
            mean_penalty: 120.5,
            best_score: 96.0,
            conflicts: 0,
        };
        let json = serde_json::to_value(ServerMessage::progress(2, &report)).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["trimester"], 2);
        assert_eq!(json["generation"], 4);
        assert_eq!(json["best_penalty"], 16.0);
        assert!(json.get("mean_penalty").is_none());
    }

    #[test]
    fn test_serialize_pong() {
        let json = serde_json::to_string(&ServerMessage::Pong).unwrap();
        assert_eq!(json, r#"{"type":"pong"}"#);
    }
}
