//! Request and response bodies for the backend HTTP interface.

use serde::{Deserialize, Serialize};

/// Transcript sent in place of an empty one when only a screenshot is attached.
pub const SCREENSHOT_PROMPT: &str = "Analyze this screenshot";

/// Body of `POST /ai/stream`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiRequest {
    /// The interviewer's question, as transcribed.
    pub transcript: String,
    /// Persona the answer is written as.
    pub role: String,
    /// Whether the backend should keep this exchange in its conversation memory.
    pub save_to_context: bool,
    /// Model to answer with.
    pub text_model: String,
    /// Optional screenshot as a data URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
}

impl AiRequest {
    /// Build a request, or `None` when there is nothing to ask.
    ///
    /// A blank transcript is allowed only with a screenshot, in which case
    /// [`SCREENSHOT_PROMPT`] is sent as the transcript.
    pub fn new(
        transcript: &str,
        screenshot: Option<String>,
        text_model: impl Into<String>,
        role: impl Into<String>,
        save_to_context: bool,
    ) -> Option<Self> {
        let transcript = transcript.trim();
        let screenshot = screenshot.filter(|s| !s.is_empty());
        if transcript.is_empty() && screenshot.is_none() {
            return None;
        }
        let transcript = if transcript.is_empty() {
            SCREENSHOT_PROMPT.to_string()
        } else {
            transcript.to_string()
        };
        Some(Self {
            transcript,
            role: role.into(),
            save_to_context,
            text_model: text_model.into(),
            screenshot,
        })
    }

    /// Whether the request carries something to answer.
    pub fn has_prompt(&self) -> bool {
        !self.transcript.trim().is_empty() || self.screenshot.is_some()
    }
}

/// Outcome of `POST /validate-license`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    /// The key unlocks full sessions.
    Valid,
    /// The key was checked and refused.
    Invalid,
    /// No key given, or it could not be checked. Runs in demo mode.
    Empty,
}

impl LicenseStatus {
    /// Map the backend's `status` string. Anything unknown counts as `Empty`.
    pub fn from_wire(status: &str) -> Self {
        match status.trim() {
            "valid" => LicenseStatus::Valid,
            "invalid" => LicenseStatus::Invalid,
            _ => LicenseStatus::Empty,
        }
    }
}

/// Body returned by `POST /validate-api-key`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyCheck {
    /// Whether the key works.
    #[serde(default)]
    pub valid: bool,
    /// Why the key was refused.
    #[serde(default)]
    pub error: Option<String>,
}

/// A model offered by `GET /models`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Identifier sent back as `text_model`.
    pub id: String,
    /// Human-readable label, when the backend provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ModelInfo {
    /// Label to show in a picker.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_requires_transcript_or_screenshot() {
        assert!(AiRequest::new("   ", None, "gpt-4o", "data engineer", true).is_none());
        assert!(AiRequest::new("", Some(String::new()), "gpt-4o", "x", true).is_none());
    }

    #[test]
    fn screenshot_only_request_uses_default_prompt() {
        let req = AiRequest::new("", Some("data:image/png;base64,AAA".into()), "gpt-4o", "x", true)
            .unwrap();
        assert_eq!(req.transcript, SCREENSHOT_PROMPT);
        assert!(req.has_prompt());
    }

    #[test]
    fn request_serializes_without_absent_screenshot() {
        let req = AiRequest::new(" What is a CTE? ", None, "gpt-3.5-turbo", "data engineer", true)
            .unwrap();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["transcript"], "What is a CTE?");
        assert_eq!(json["role"], "data engineer");
        assert_eq!(json["save_to_context"], true);
        assert_eq!(json["text_model"], "gpt-3.5-turbo");
        assert!(json.get("screenshot").is_none());
    }

    #[test]
    fn license_status_from_wire() {
        assert_eq!(LicenseStatus::from_wire("valid"), LicenseStatus::Valid);
        assert_eq!(LicenseStatus::from_wire("invalid"), LicenseStatus::Invalid);
        assert_eq!(LicenseStatus::from_wire("empty"), LicenseStatus::Empty);
        assert_eq!(LicenseStatus::from_wire("expired"), LicenseStatus::Empty);
    }

    #[test]
    fn api_key_check_defaults_missing_fields() {
        let check: ApiKeyCheck = serde_json::from_str("{}").unwrap();
        assert!(!check.valid);
        assert!(check.error.is_none());
    }

    #[test]
    fn model_label_prefers_name() {
        let m = ModelInfo {
            id: "gpt-4o-mini".into(),
            name: Some("GPT-4o mini".into()),
        };
        assert_eq!(m.label(), "GPT-4o mini");
        let bare = ModelInfo {
            id: "gpt-4o".into(),
            name: None,
        };
        assert_eq!(bare.label(), "gpt-4o");
    }
}
