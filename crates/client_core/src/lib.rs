use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::Client;
use shared::{error::ApiError, protocol::{CreatePostRequest, PostPayload}};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::warn;
use url::Url;

/// Failure taxonomy observable at the view-state core. Both kinds are
/// handled identically by the controller: logged, never surfaced to the
/// rendered view, always resolved into `loading = false`.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The remote call itself could not complete.
    #[error("transport failure: {0}")]
    Transport(#[from] anyhow::Error),
    /// The remote call completed but the service reported a
    /// business-level failure.
    #[error("service rejected request: {0}")]
    Rejected(ApiError),
}

/// The remote post service, reduced to the two operations the view
/// depends on. The service assigns post ids and timestamps.
#[async_trait]
pub trait PostService: Send + Sync {
    async fn list_posts(&self) -> Result<Vec<PostPayload>, ServiceError>;
    async fn create_post(&self, title: &str, body: &str, author: &str)
        -> Result<(), ServiceError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub body: String,
    pub author: String,
}

impl Draft {
    /// Required-field presence, checked by the surrounding form before it
    /// allows submission. The controller itself performs no validation.
    pub fn is_complete(&self) -> bool {
        !self.title.is_empty() && !self.body.is_empty() && !self.author.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Title,
    Body,
    Author,
}

/// All client-local mutable state. Posts carry server-defined ordering;
/// the client never re-sorts or patches them in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub posts: Vec<PostPayload>,
    pub loading: bool,
    pub form_visible: bool,
    pub draft: Draft,
}

impl ViewState {
    fn new() -> Self {
        Self {
            posts: Vec::new(),
            loading: true,
            form_visible: false,
            draft: Draft::default(),
        }
    }
}

/// The view-state controller. Owns `ViewState` exclusively and mediates
/// every interaction with the post service; rendering is a pure function
/// of the `state()` snapshot and lives outside this crate.
pub struct BlogClient {
    service: Arc<dyn PostService>,
    inner: Mutex<ViewState>,
}

impl BlogClient {
    /// A fresh controller starts with `loading = true`; callers are
    /// expected to invoke `load_posts` once at mount.
    pub fn new(service: Arc<dyn PostService>) -> Arc<Self> {
        Arc::new(Self {
            service,
            inner: Mutex::new(ViewState::new()),
        })
    }

    pub async fn state(&self) -> ViewState {
        self.inner.lock().await.clone()
    }

    /// Fetches the post list and replaces `posts` wholesale on success.
    /// On failure the list is left untouched and the error is logged;
    /// `loading` is cleared after the call settles on every path. The
    /// lock is not held across the remote await, so overlapping loads
    /// resolve last-writer-wins.
    pub async fn load_posts(&self) {
        {
            self.inner.lock().await.loading = true;
        }

        let result = self.service.list_posts().await;

        let mut state = self.inner.lock().await;
        match result {
            Ok(posts) => state.posts = posts,
            Err(error) => warn!(%error, "failed to fetch posts"),
        }
        state.loading = false;
    }

    pub async fn toggle_form(&self) {
        let mut state = self.inner.lock().await;
        state.form_visible = !state.form_visible;
    }

    pub async fn update_draft_field(&self, field: DraftField, value: impl Into<String>) {
        let value = value.into();
        let mut state = self.inner.lock().await;
        match field {
            DraftField::Title => state.draft.title = value,
            DraftField::Body => state.draft.body = value,
            DraftField::Author => state.draft.author = value,
        }
    }

    /// Submits the current draft. On success the form is hidden, the
    /// draft cleared, and the list re-fetched via `load_posts`, which
    /// owns `loading` for that refresh cycle. On failure the draft and
    /// form are left untouched and `loading` is cleared directly. The
    /// two branches stay separate: the success path goes through a
    /// second loading cycle, the failure path does not.
    pub async fn submit_draft(&self) {
        let draft = {
            let mut state = self.inner.lock().await;
            state.loading = true;
            state.draft.clone()
        };

        match self
            .service
            .create_post(&draft.title, &draft.body, &draft.author)
            .await
        {
            Ok(()) => {
                {
                    let mut state = self.inner.lock().await;
                    state.form_visible = false;
                    state.draft = Draft::default();
                }
                self.load_posts().await;
            }
            Err(error) => {
                warn!(%error, "failed to create post");
                self.inner.lock().await.loading = false;
            }
        }
    }
}

/// `PostService` over HTTP against the post service's REST routes.
pub struct HttpPostService {
    http: Client,
    server_url: String,
}

impl HttpPostService {
    pub fn new(server_url: impl Into<String>) -> anyhow::Result<Self> {
        let server_url = server_url.into();
        let _ = Url::parse(&server_url)?;
        Ok(Self {
            http: Client::new(),
            server_url: server_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PostService for HttpPostService {
    async fn list_posts(&self) -> Result<Vec<PostPayload>, ServiceError> {
        let response = self
            .http
            .get(format!("{}/posts", self.server_url))
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(rejection_from_response(response).await);
        }
        response.json().await.map_err(transport)
    }

    async fn create_post(
        &self,
        title: &str,
        body: &str,
        author: &str,
    ) -> Result<(), ServiceError> {
        let response = self
            .http
            .post(format!("{}/posts", self.server_url))
            .json(&CreatePostRequest {
                title: title.to_string(),
                body: body.to_string(),
                author: author.to_string(),
            })
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(rejection_from_response(response).await);
        }
        Ok(())
    }
}

fn transport(err: reqwest::Error) -> ServiceError {
    ServiceError::Transport(err.into())
}

async fn rejection_from_response(response: reqwest::Response) -> ServiceError {
    let status = response.status();
    match response.json::<ApiError>().await {
        Ok(err) => ServiceError::Rejected(err),
        Err(_) => ServiceError::Transport(anyhow!("unexpected status {status}")),
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
