use crate::domain::message::{Message, NewMessage};
use crate::error::Result;
use async_trait::async_trait;

/// Message persistence contract.
///
/// Implementations translate their own failures into `AppError` before returning.
#[async_trait]
pub trait MessageRepository: Send + Sync + std::fmt::Debug {
    /// Loads a single message.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if no message has the given id.
    async fn get(&self, id: i64) -> Result<Message>;

    /// Loads every message.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` ("no records found") when the store is empty.
    async fn get_all(&self) -> Result<Vec<Message>>;

    /// Stores a message and returns it with its generated id.
    ///
    /// # Errors
    /// Returns `AppError::ServerError` ("title already taken") on a duplicate title.
    async fn create(&self, message: NewMessage) -> Result<Message>;

    /// Writes the title and body of an existing message. The row is not re-read.
    ///
    /// # Errors
    /// Returns `AppError::ServerError` if the write fails.
    async fn update(&self, message: Message) -> Result<Message>;

    /// Removes a message. Does not check that it existed.
    ///
    /// # Errors
    /// Returns `AppError::ServerError` if the delete fails.
    async fn delete(&self, id: i64) -> Result<()>;
}
