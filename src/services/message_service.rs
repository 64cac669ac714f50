use crate::domain::message::{Message, MessageInput, NewMessage};
use crate::domain::repository::MessageRepository;
use crate::error::Result;
use async_trait::async_trait;
use opentelemetry::{KeyValue, global, metrics::Counter};
use std::sync::Arc;
use time::OffsetDateTime;

/// Business operations on messages, as seen by the HTTP handlers.
#[async_trait]
pub trait MessageService: Send + Sync + std::fmt::Debug {
    /// # Errors
    /// Returns `AppError::NotFound` if the message does not exist.
    async fn get_message(&self, id: i64) -> Result<Message>;

    /// # Errors
    /// Returns `AppError::NotFound` if there are no messages at all.
    async fn get_all_messages(&self) -> Result<Vec<Message>>;

    /// # Errors
    /// Returns `AppError::InvalidRequest` if the input fails validation.
    async fn create_message(&self, input: MessageInput) -> Result<Message>;

    /// # Errors
    /// Returns `AppError::InvalidRequest` if the input fails validation, or
    /// `AppError::NotFound` if the message does not exist.
    async fn update_message(&self, id: i64, input: MessageInput) -> Result<Message>;

    /// # Errors
    /// Returns `AppError::NotFound` if the message does not exist.
    async fn delete_message(&self, id: i64) -> Result<()>;
}

#[derive(Clone, Debug)]
pub(crate) struct Metrics {
    pub(crate) created_total: Counter<u64>,
    pub(crate) deleted_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("messages-api");
        Self {
            created_total: meter
                .u64_counter("messages_created_total")
                .with_description("Total create attempts, labelled by outcome")
                .build(),
            deleted_total: meter
                .u64_counter("messages_deleted_total")
                .with_description("Total messages successfully deleted")
                .build(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DefaultMessageService {
    repo: Arc<dyn MessageRepository>,
    metrics: Metrics,
}

impl DefaultMessageService {
    #[must_use]
    pub fn new(repo: Arc<dyn MessageRepository>) -> Self {
        Self { repo, metrics: Metrics::new() }
    }
}

#[async_trait]
impl MessageService for DefaultMessageService {
    #[tracing::instrument(err(level = "warn"), skip(self))]
    async fn get_message(&self, id: i64) -> Result<Message> {
        self.repo.get(id).await
    }

    #[tracing::instrument(err(level = "warn"), skip(self))]
    async fn get_all_messages(&self) -> Result<Vec<Message>> {
        self.repo.get_all().await
    }

    #[tracing::instrument(err(level = "warn"), skip(self, input))]
    async fn create_message(&self, mut input: MessageInput) -> Result<Message> {
        input.validate()?;

        let new_message = NewMessage::stamped(input, OffsetDateTime::now_utc());
        match self.repo.create(new_message).await {
            Ok(message) => {
                tracing::debug!(id = message.id, "Message created");
                self.metrics.created_total.add(1, &[KeyValue::new("status", "success")]);
                Ok(message)
            }
            Err(e) => {
                self.metrics.created_total.add(1, &[KeyValue::new("status", "failure")]);
                Err(e)
            }
        }
    }

    #[tracing::instrument(err(level = "warn"), skip(self, input))]
    async fn update_message(&self, id: i64, mut input: MessageInput) -> Result<Message> {
        input.validate()?;

        let mut current = self.repo.get(id).await?;
        current.title = input.title;
        current.body = input.body;

        self.repo.update(current).await
    }

    #[tracing::instrument(err(level = "warn"), skip(self))]
    async fn delete_message(&self, id: i64) -> Result<()> {
        self.repo.get(id).await?;
        self.repo.delete(id).await?;

        self.metrics.deleted_total.add(1, &[]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryMessageRepository;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Wraps the in-memory store and counts how often each write path is hit.
    #[derive(Debug, Default)]
    struct CountingRepository {
        inner: InMemoryMessageRepository,
        gets: AtomicUsize,
        creates: AtomicUsize,
        updates: AtomicUsize,
        deletes: AtomicUsize,
    }

    #[async_trait]
    impl MessageRepository for CountingRepository {
        async fn get(&self, id: i64) -> Result<Message> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            self.inner.get(id).await
        }

        async fn get_all(&self) -> Result<Vec<Message>> {
            self.inner.get_all().await
        }

        async fn create(&self, message: NewMessage) -> Result<Message> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            self.inner.create(message).await
        }

        async fn update(&self, message: Message) -> Result<Message> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            self.inner.update(message).await
        }

        async fn delete(&self, id: i64) -> Result<()> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            self.inner.delete(id).await
        }
    }

    fn setup_service() -> (DefaultMessageService, Arc<CountingRepository>) {
        let repo = Arc::new(CountingRepository::default());
        let service = DefaultMessageService::new(Arc::clone(&repo) as Arc<dyn MessageRepository>);
        (service, repo)
    }

    #[tokio::test]
    async fn test_create_then_get_roundtrip() {
        let (service, _) = setup_service();
        let before = OffsetDateTime::now_utc();

        let created = service.create_message(MessageInput::new("t", "b")).await.unwrap();
        let fetched = service.get_message(created.id).await.unwrap();

        assert!(created.id > 0);
        assert_eq!(fetched.title, "t");
        assert_eq!(fetched.body, "b");
        assert!(fetched.created_at >= before - time::Duration::microseconds(1));
        assert_eq!(fetched.created_at, created.created_at);
        assert_eq!(created.created_at.nanosecond() % 1_000, 0);
    }

    #[tokio::test]
    async fn test_create_trims_input() {
        let (service, _) = setup_service();
        let created = service.create_message(MessageInput::new("  spaced  ", " out ")).await.unwrap();

        assert_eq!(created.title, "spaced");
        assert_eq!(created.body, "out");
    }

    #[tokio::test]
    async fn test_create_invalid_never_reaches_repository() {
        let (service, repo) = setup_service();

        let err = service.create_message(MessageInput::new("", "")).await.unwrap_err();

        assert_eq!(err, AppError::InvalidRequest("Please enter a valid title".into()));
        assert_eq!(repo.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_create_duplicate_title() {
        let (service, _) = setup_service();
        service.create_message(MessageInput::new("dup", "one")).await.unwrap();

        let err = service.create_message(MessageInput::new("dup", "two")).await.unwrap_err();
        assert_eq!(err, AppError::ServerError("title already taken".into()));
    }

    #[tokio::test]
    async fn test_update_preserves_created_at() {
        let (service, _) = setup_service();
        let created = service.create_message(MessageInput::new("old title", "old body")).await.unwrap();

        let updated = service.update_message(created.id, MessageInput::new("new title", "new body")).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "new title");
        assert_eq!(updated.body, "new body");
        assert_eq!(updated.created_at, created.created_at);

        let stored = service.get_message(created.id).await.unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_update_validates_before_fetching() {
        let (service, repo) = setup_service();
        let created = service.create_message(MessageInput::new("title", "body")).await.unwrap();

        let err = service.update_message(created.id, MessageInput::new("title", "  ")).await.unwrap_err();

        assert_eq!(err, AppError::InvalidRequest("Please enter a valid body".into()));
        assert_eq!(repo.gets.load(Ordering::SeqCst), 0);
        assert_eq!(repo.updates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let (service, repo) = setup_service();

        let err = service.update_message(99, MessageInput::new("title", "body")).await.unwrap_err();

        assert_eq!(err, AppError::NotFound("no record matching given id".into()));
        assert_eq!(repo.updates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_delete_existing() {
        let (service, repo) = setup_service();
        let created = service.create_message(MessageInput::new("title", "body")).await.unwrap();

        service.delete_message(created.id).await.unwrap();

        assert_eq!(repo.deletes.load(Ordering::SeqCst), 1);
        assert_eq!(service.get_message(created.id).await.unwrap_err().kind(), crate::error::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_never_deletes() {
        let (service, repo) = setup_service();

        let err = service.delete_message(5).await.unwrap_err();

        assert_eq!(err, AppError::NotFound("no record matching given id".into()));
        assert_eq!(repo.deletes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_get_all_empty_is_not_found() {
        let (service, _) = setup_service();
        let err = service.get_all_messages().await.unwrap_err();
        assert_eq!(err, AppError::NotFound("no records found".into()));
    }

    #[tokio::test]
    async fn test_get_all_lists_in_id_order() {
        let (service, _) = setup_service();
        service.create_message(MessageInput::new("first title", "first body")).await.unwrap();
        service.create_message(MessageInput::new("second title", "second body")).await.unwrap();

        let all = service.get_all_messages().await.unwrap();
        let titles: Vec<_> = all.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, ["first title", "second title"]);
    }
}
