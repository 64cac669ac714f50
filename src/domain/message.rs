use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

/// A persisted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub title: String,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The client-editable part of a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageInput {
    pub title: String,
    pub body: String,
}

impl MessageInput {
    #[must_use]
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self { title: title.into(), body: body.into() }
    }

    /// Trims both fields in place, then checks them. The title is checked first.
    ///
    /// # Errors
    /// Returns `AppError::InvalidRequest` if the title or body is blank.
    pub fn validate(&mut self) -> Result<()> {
        self.title = self.title.trim().to_string();
        self.body = self.body.trim().to_string();

        if self.title.is_empty() {
            return Err(AppError::InvalidRequest("Please enter a valid title".into()));
        }
        if self.body.is_empty() {
            return Err(AppError::InvalidRequest("Please enter a valid body".into()));
        }
        Ok(())
    }
}

/// A validated, timestamped message that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub title: String,
    pub body: String,
    pub created_at: OffsetDateTime,
}

impl NewMessage {
    /// `created_at` is cut to microseconds, the precision PostgreSQL stores.
    #[must_use]
    pub fn stamped(input: MessageInput, created_at: OffsetDateTime) -> Self {
        let created_at = created_at - Duration::nanoseconds(i64::from(created_at.nanosecond() % 1_000));
        Self { title: input.title, body: input.body, created_at }
    }

    #[must_use]
    pub fn with_id(self, id: i64) -> Message {
        Message { id, title: self.title, body: self.body, created_at: self.created_at }
    }
}
