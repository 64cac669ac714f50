//! In-memory message store with the same error surface as the PostgreSQL repository.

use crate::domain::message::{Message, NewMessage};
use crate::domain::repository::MessageRepository;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageRepository {
    state: Arc<RwLock<InMemoryState>>,
}

#[derive(Debug, Default)]
struct InMemoryState {
    messages: BTreeMap<i64, Message>,
    last_id: i64,
}

impl InMemoryState {
    fn title_taken(&self, title: &str, except: Option<i64>) -> bool {
        self.messages.values().any(|m| m.title == title && Some(m.id) != except)
    }
}

impl InMemoryMessageRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, InMemoryState>> {
        self.state.read().map_err(|_| lock_poisoned())
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, InMemoryState>> {
        self.state.write().map_err(|_| lock_poisoned())
    }
}

fn lock_poisoned() -> AppError {
    AppError::ServerError("error when processing request: message store lock poisoned".into())
}

fn title_taken() -> AppError {
    AppError::ServerError("title already taken".into())
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn get(&self, id: i64) -> Result<Message> {
        self.read()?
            .messages
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("no record matching given id".into()))
    }

    async fn get_all(&self) -> Result<Vec<Message>> {
        let state = self.read()?;
        if state.messages.is_empty() {
            return Err(AppError::NotFound("no records found".into()));
        }
        Ok(state.messages.values().cloned().collect())
    }

    async fn create(&self, message: NewMessage) -> Result<Message> {
        let mut state = self.write()?;
        if state.title_taken(&message.title, None) {
            return Err(title_taken());
        }

        state.last_id += 1;
        let stored = message.with_id(state.last_id);
        state.messages.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, message: Message) -> Result<Message> {
        let mut state = self.write()?;
        if state.title_taken(&message.title, Some(message.id)) {
            return Err(title_taken());
        }

        // Like an UPDATE matching zero rows, an unknown id is silently ignored.
        if let Some(existing) = state.messages.get_mut(&message.id) {
            existing.title.clone_from(&message.title);
            existing.body.clone_from(&message.body);
        }
        Ok(message)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.write()?.messages.remove(&id);
        Ok(())
    }
}
