use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::settings::{Settings, SettingsPatch};

pub const ACTION_GET_SETTINGS: &str = "getSettings";
pub const ACTION_TOGGLE_ENABLED: &str = "toggleEnabled";
pub const ACTION_UPDATE_SETTINGS: &str = "updateSettings";
pub const ACTION_GET_DETECTION_STATUS: &str = "getDetectionStatus";
pub const ACTION_TOGGLE_MANUAL_MODE: &str = "toggleManualMode";

const KNOWN_ACTIONS: &[&str] = &[
    ACTION_GET_SETTINGS,
    ACTION_TOGGLE_ENABLED,
    ACTION_UPDATE_SETTINGS,
    ACTION_GET_DETECTION_STATUS,
    ACTION_TOGGLE_MANUAL_MODE,
];

/// Messages exchanged between the background coordinator, the settings UI and page
/// instances. `UpdateSettings` doubles as the push notification fanned out to instances.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    GetSettings,
    ToggleEnabled,
    UpdateSettings { settings: SettingsPatch },
    GetDetectionStatus,
    ToggleManualMode,
}

impl Request {
    pub fn action(&self) -> &'static str {
        match self {
            Request::GetSettings => ACTION_GET_SETTINGS,
            Request::ToggleEnabled => ACTION_TOGGLE_ENABLED,
            Request::UpdateSettings { .. } => ACTION_UPDATE_SETTINGS,
            Request::GetDetectionStatus => ACTION_GET_DETECTION_STATUS,
            Request::ToggleManualMode => ACTION_TOGGLE_MANUAL_MODE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Settings {
        settings: Settings,
    },
    Enabled {
        enabled: bool,
    },
    Success {
        success: bool,
    },
    DetectionStatus {
        #[serde(rename = "poolGameDetected")]
        pool_game_detected: bool,
        #[serde(rename = "manualMode")]
        manual_mode: bool,
    },
    ManualMode {
        #[serde(rename = "manualMode")]
        manual_mode: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("message has no action")]
    MissingAction,
    #[error("unknown action `{0}`")]
    UnknownAction(String),
    #[error("malformed `{action}` message: {reason}")]
    Malformed { action: String, reason: String },
}

pub fn decode_request(value: &Value) -> Result<Request, ProtocolError> {
    let action = value
        .get("action")
        .and_then(Value::as_str)
        .ok_or(ProtocolError::MissingAction)?;
    if !KNOWN_ACTIONS.contains(&action) {
        return Err(ProtocolError::UnknownAction(action.to_string()));
    }
    serde_json::from_value(value.clone()).map_err(|err| ProtocolError::Malformed {
        action: action.to_string(),
        reason: err.to_string(),
    })
}

pub fn encode_request(request: &Request) -> Value {
    serde_json::to_value(request).unwrap_or(Value::Null)
}

pub fn encode_response(response: &Response) -> Value {
    serde_json::to_value(response).unwrap_or(Value::Null)
}
