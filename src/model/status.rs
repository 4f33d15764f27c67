use serde::{Deserialize, Serialize};

use super::board::TaskId;

/// Body of the status-update call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub task_id: TaskId,
    pub status: String,
}

impl StatusUpdate {
    pub fn new(task_id: TaskId, status: impl Into<String>) -> Self {
        StatusUpdate {
            task_id,
            status: status.into(),
        }
    }
}

/// Reply to the status-update call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

impl StatusResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        StatusResponse {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        StatusResponse {
            success: false,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_wire_shape() {
        let json = serde_json::to_value(StatusUpdate::new(7, "done")).unwrap();
        assert_eq!(json, serde_json::json!({"task_id": 7, "status": "done"}));
    }

    #[test]
    fn response_message_is_optional() {
        let r: StatusResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(r.success);
        assert!(r.message.is_empty());
    }

    #[test]
    fn response_with_non_bool_success_is_rejected() {
        assert!(serde_json::from_str::<StatusResponse>(r#"{"success":"yes"}"#).is_err());
        assert!(serde_json::from_str::<StatusResponse>(r#"{"message":"hi"}"#).is_err());
    }
}
