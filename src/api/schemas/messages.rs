use crate::domain::message::MessageInput;
use crate::error::{AppError, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /messages` and `PUT /messages/{id}`.
///
/// Absent and `null` fields decode as empty strings so they are reported by
/// validation; `id` and `created_at` are ignored if a client sends them.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MessageRequest {
    #[serde(deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub body: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl MessageRequest {
    /// Decodes a JSON request body.
    ///
    /// # Errors
    /// Returns `AppError::InvalidRequest` if the body is not a JSON object with string fields.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| {
            tracing::debug!(error = %e, "Failed to decode message body");
            AppError::InvalidRequest("invalid json body".into())
        })
    }
}

impl From<MessageRequest> for MessageInput {
    fn from(req: MessageRequest) -> Self {
        Self { title: req.title, body: req.body }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub status: String,
}

impl DeletedResponse {
    #[must_use]
    pub fn deleted() -> Self {
        Self { status: "deleted".to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid_body() {
        let req = MessageRequest::from_json(br#"{"title":"the title","body":"the body"}"#).unwrap();
        assert_eq!(req.title, "the title");
        assert_eq!(req.body, "the body");
    }

    #[test]
    fn test_decode_ignores_server_owned_fields() {
        let req =
            MessageRequest::from_json(br#"{"id":9,"title":"t","body":"b","created_at":"2020-01-01T00:00:00Z"}"#)
                .unwrap();
        assert_eq!(req.title, "t");
        assert_eq!(req.body, "b");
    }

    #[test]
    fn test_decode_missing_fields_are_empty() {
        let req = MessageRequest::from_json(br#"{"body":"only body"}"#).unwrap();
        assert_eq!(req.title, "");
        assert_eq!(req.body, "only body");
    }

    #[test]
    fn test_decode_null_fields_are_empty() {
        let req = MessageRequest::from_json(br#"{"title":null,"body":"x"}"#).unwrap();
        assert_eq!(req.title, "");
        assert_eq!(req.body, "x");

        let mut input = MessageInput::from(req);
        let err = input.validate().unwrap_err();
        assert_eq!(err, AppError::InvalidRequest("Please enter a valid title".into()));
    }

    #[test]
    fn test_decode_type_mismatch() {
        let err = MessageRequest::from_json(br#"{"title":12345,"body":"the body"}"#).unwrap_err();
        assert_eq!(err, AppError::InvalidRequest("invalid json body".into()));
    }

    #[test]
    fn test_decode_malformed_json() {
        let err = MessageRequest::from_json(b"{not json").unwrap_err();
        assert_eq!(err.message(), "invalid json body");
        assert_eq!(err.status().as_u16(), 422);
    }

    #[test]
    fn test_decode_empty_body() {
        assert!(MessageRequest::from_json(b"").is_err());
    }
}
