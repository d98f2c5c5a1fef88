//! Dispatch callback contract for flushed batches.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

/// Failure reported by a dispatch callback.
///
/// The buffer never propagates this; it is logged against the session key
/// and the session is released for the next round.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct DispatchError {
    message: String,
}

impl DispatchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Receives the combined message of a flushed session.
#[async_trait]
pub trait FlushHandler: Send + Sync {
    /// Called once per flush with the session key and the joined messages.
    async fn dispatch(&self, session_key: &str, combined: String) -> Result<(), DispatchError>;
}

/// Adapts an async closure `(session_key, combined)` into a [`FlushHandler`].
pub struct FnFlushHandler<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> FlushHandler for FnFlushHandler<F>
where
    F: Fn(String, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), DispatchError>> + Send + 'static,
{
    async fn dispatch(&self, session_key: &str, combined: String) -> Result<(), DispatchError> {
        (self.f)(session_key.to_string(), combined).await
    }
}

/// Wraps a closure as a shareable flush handler.
///
/// ```ignore
/// let handler = flush_fn(|session_key, combined| async move {
///     tasks.submit(session_key, combined).await;
///     Ok(())
/// });
/// buffer.enqueue("user_42", "hello", handler, None).await;
/// ```
pub fn flush_fn<F, Fut>(f: F) -> Arc<dyn FlushHandler>
where
    F: Fn(String, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), DispatchError>> + Send + 'static,
{
    Arc::new(FnFlushHandler { f })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_error_displays_message() {
        let err = DispatchError::new("agent unavailable");
        assert_eq!(err.to_string(), "agent unavailable");
        assert_eq!(err.message(), "agent unavailable");
    }

    #[tokio::test]
    async fn closure_handler_receives_key_and_message() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let handler = flush_fn(move |key, combined| {
            let tx = tx.clone();
            async move {
                tx.send((key, combined)).map_err(|e| DispatchError::new(e.to_string()))
            }
        });

        handler.dispatch("user_1", "hi".to_string()).await.unwrap();

        assert_eq!(rx.recv().await, Some(("user_1".to_string(), "hi".to_string())));
    }
}
