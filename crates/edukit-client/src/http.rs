//! HTTP implementation of the quiz and attempt stores.
//!
//! Speaks the record-oriented API of the persistence service: quizzes and
//! attempts as JSON, camelCase on write, either naming convention tolerated
//! on read (the model's serde aliases handle that).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use edukit_core::error::StoreError;
use edukit_core::model::{Attempt, Quiz};
use edukit_core::traits::{AttemptStore, NewAttempt, QuizPatch, QuizStore};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Remote persistence client.
pub struct HttpStore {
    base_url: String,
    api_token: Option<String>,
    client: reqwest::Client,
    timeout_secs: u64,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl HttpStore {
    pub fn new(base_url: &str, api_token: Option<String>) -> Self {
        Self::with_timeout(base_url, api_token, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(base_url: &str, api_token: Option<String>, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
            client,
            timeout_secs,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{path}", self.base_url));
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, StoreError> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                StoreError::Timeout(self.timeout_secs)
            } else {
                StoreError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                * 1000;
            return Err(StoreError::RateLimited {
                retry_after_ms: retry_after,
            });
        }
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::AuthenticationFailed(body));
        }
        if status == 404 {
            let url = response.url().path().to_string();
            return Err(StoreError::NotFound(url));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(StoreError::Api { status, message });
        }

        Ok(response)
    }

    async fn json<T: serde::de::DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, StoreError> {
        let response = self.send(builder).await?;
        response.json().await.map_err(|e| StoreError::Api {
            status: 0,
            message: format!("failed to parse response: {e}"),
        })
    }
}

#[async_trait]
impl QuizStore for HttpStore {
    #[instrument(skip(self), fields(quiz = %id))]
    async fn fetch_quiz(&self, id: Uuid) -> Result<Quiz, StoreError> {
        self.json(self.request(reqwest::Method::GET, &format!("/quizzes/{id}")))
            .await
    }

    #[instrument(skip(self))]
    async fn list_quizzes(&self) -> Result<Vec<Quiz>, StoreError> {
        self.json(self.request(reqwest::Method::GET, "/quizzes"))
            .await
    }

    #[instrument(skip(self, quiz), fields(quiz = %quiz.id))]
    async fn create_quiz(&self, quiz: &Quiz) -> Result<Quiz, StoreError> {
        self.json(self.request(reqwest::Method::POST, "/quizzes").json(quiz))
            .await
    }

    #[instrument(skip(self, patch), fields(quiz = %id))]
    async fn update_quiz(&self, id: Uuid, patch: &QuizPatch) -> Result<Quiz, StoreError> {
        self.json(
            self.request(reqwest::Method::PATCH, &format!("/quizzes/{id}"))
                .json(patch),
        )
        .await
    }

    #[instrument(skip(self), fields(quiz = %id))]
    async fn delete_quiz(&self, id: Uuid) -> Result<(), StoreError> {
        self.send(self.request(reqwest::Method::DELETE, &format!("/quizzes/{id}")))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl AttemptStore for HttpStore {
    #[instrument(skip(self, attempt), fields(quiz = %attempt.quiz_ref))]
    async fn submit_attempt(&self, attempt: &NewAttempt) -> Result<Attempt, StoreError> {
        self.json(
            self.request(reqwest::Method::POST, "/attempts")
                .json(attempt),
        )
        .await
    }

    #[instrument(skip(self), fields(quiz = %quiz_ref))]
    async fn attempts_for_quiz(&self, quiz_ref: Uuid) -> Result<Vec<Attempt>, StoreError> {
        self.json(self.request(
            reqwest::Method::GET,
            &format!("/quizzes/{quiz_ref}/attempts"),
        ))
        .await
    }

    #[instrument(skip(self), fields(user = %user_ref))]
    async fn attempts_for_user(&self, user_ref: Uuid) -> Result<Vec<Attempt>, StoreError> {
        self.json(self.request(
            reqwest::Method::GET,
            &format!("/users/{user_ref}/attempts"),
        ))
        .await
    }
}
