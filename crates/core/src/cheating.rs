//! Anti-cheating signals reported by the candidate's client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::session::normalize_label;

/// Free-form details attached to a cheating event
pub type EventMetadata = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheatingEventType {
    TabSwitch,
    WindowBlur,
    VisibilityHidden,
    CameraOff,
    MicOff,
    FullscreenExit,
    CopyPaste,
    MultipleFaces,
    NoFace,
}

impl CheatingEventType {
    pub const ALL: [CheatingEventType; 9] = [
        CheatingEventType::TabSwitch,
        CheatingEventType::WindowBlur,
        CheatingEventType::VisibilityHidden,
        CheatingEventType::CameraOff,
        CheatingEventType::MicOff,
        CheatingEventType::FullscreenExit,
        CheatingEventType::CopyPaste,
        CheatingEventType::MultipleFaces,
        CheatingEventType::NoFace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheatingEventType::TabSwitch => "TAB_SWITCH",
            CheatingEventType::WindowBlur => "WINDOW_BLUR",
            CheatingEventType::VisibilityHidden => "VISIBILITY_HIDDEN",
            CheatingEventType::CameraOff => "CAMERA_OFF",
            CheatingEventType::MicOff => "MIC_OFF",
            CheatingEventType::FullscreenExit => "FULLSCREEN_EXIT",
            CheatingEventType::CopyPaste => "COPY_PASTE",
            CheatingEventType::MultipleFaces => "MULTIPLE_FACES",
            CheatingEventType::NoFace => "NO_FACE",
        }
    }
}

impl fmt::Display for CheatingEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheatingEventType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = normalize_label(s).to_uppercase();
        CheatingEventType::ALL
            .into_iter()
            .find(|t| t.as_str() == label)
            .ok_or_else(|| CoreError::validation(format!("unknown cheating event type: {}", s.trim())))
    }
}

/// One recorded anti-cheating signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheatingEvent {
    pub id: String,
    pub event_type: CheatingEventType,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: EventMetadata,
}

impl CheatingEvent {
    pub fn new(event_type: CheatingEventType, metadata: EventMetadata) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event_type,
            timestamp: Utc::now(),
            metadata,
        }
    }
}
