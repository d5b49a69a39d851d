//! Optimistic local mutation with rollback.
//!
//! The UI policy for any locally-mutated, remotely-confirmed value (saved
//! flags, bookmarks, titles): apply the new value immediately, then confirm
//! with the store; if the remote call fails, the previous value is restored.

use std::future::Future;

/// A value mutated optimistically against a remote collaborator.
#[derive(Debug, Clone)]
pub struct Optimistic<T: Clone> {
    value: T,
    /// The last confirmed value, kept while a mutation is unconfirmed.
    rollback: Option<T>,
}

impl<T: Clone> Optimistic<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            rollback: None,
        }
    }

    /// The current (possibly unconfirmed) value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Whether a local mutation is awaiting remote confirmation.
    pub fn is_pending(&self) -> bool {
        self.rollback.is_some()
    }

    /// Phase one: apply a new value locally. The last confirmed value is
    /// retained for rollback; stacked applies keep the original anchor.
    pub fn apply(&mut self, next: T) {
        if self.rollback.is_none() {
            self.rollback = Some(self.value.clone());
        }
        self.value = next;
    }

    /// Phase two: confirm the pending value with the remote. On failure the
    /// value rolls back to the last confirmed one and the error is returned.
    pub async fn confirm<F, Fut, E>(&mut self, remote: F) -> Result<(), E>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<(), E>>,
    {
        match remote(self.value.clone()).await {
            Ok(()) => {
                self.rollback = None;
                Ok(())
            }
            Err(e) => {
                if let Some(previous) = self.rollback.take() {
                    self.value = previous;
                }
                Err(e)
            }
        }
    }

    /// Apply and confirm in one step.
    pub async fn update<F, Fut, E>(&mut self, next: T, remote: F) -> Result<(), E>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<(), E>>,
    {
        self.apply(next);
        self.confirm(remote).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edukit_core::error::StoreError;

    #[tokio::test]
    async fn confirm_keeps_value_on_success() {
        let mut saved = Optimistic::new(false);
        saved
            .update(true, |_| async { Ok::<(), StoreError>(()) })
            .await
            .unwrap();
        assert!(*saved.get());
        assert!(!saved.is_pending());
    }

    #[tokio::test]
    async fn failure_rolls_back_to_previous_value() {
        let mut saved = Optimistic::new(false);
        let err = saved
            .update(true, |_| async {
                Err::<(), _>(StoreError::Network("connection reset".into()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Network(_)));
        assert!(!*saved.get());
        assert!(!saved.is_pending());
    }

    #[tokio::test]
    async fn stacked_applies_roll_back_to_last_confirmed() {
        let mut title = Optimistic::new("original".to_string());
        title.apply("draft one".into());
        title.apply("draft two".into());
        assert_eq!(title.get(), "draft two");
        assert!(title.is_pending());

        title
            .confirm(|_| async { Err::<(), _>(StoreError::Timeout(30)) })
            .await
            .unwrap_err();
        // Both unconfirmed drafts are discarded.
        assert_eq!(title.get(), "original");
    }

    #[tokio::test]
    async fn remote_sees_pending_value() {
        let mut saved = Optimistic::new(0u32);
        saved
            .update(7, |value| async move {
                assert_eq!(value, 7);
                Ok::<(), StoreError>(())
            })
            .await
            .unwrap();
        assert_eq!(*saved.get(), 7);
    }
}
