use crate::config::{Config, normalize_base_url};
use crate::errors::ClientError;
use crate::models::{ApiErrorBody, ServerStats, Task, TaskDraft, TaskId, TaskPatch, TaskStats};
use crate::ordering::sort_for_display;
use crate::state::{ListView, TaskCache};
use crate::validation::validate_draft;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

pub const DELETE_PROMPT: &str = "Delete this task?";
pub const CLEAR_PROMPT: &str = "Delete ALL tasks? This cannot be undone.";

/// Asked before any destructive request is sent.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The backend no longer had the task. The desired end state holds.
    AlreadyGone,
    Cancelled,
}

#[derive(Serialize)]
struct UpdateBody<'a> {
    title: &'a str,
    description: &'a str,
    completed: bool,
}

/// Client for the task backend.
///
/// Toggling uses the dedicated `POST /tasks/{id}/toggle` endpoint, so no
/// read-before-write is needed. Every mutation is followed by a full fetch;
/// the cache is never patched in place.
#[derive(Clone)]
pub struct TaskListClient {
    http: reqwest::Client,
    base_url: String,
    cache: Arc<Mutex<TaskCache>>,
}

impl TaskListClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_http(builder.build()?, &config.api_url))
    }

    pub fn with_http(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: normalize_base_url(base_url),
            cache: Arc::new(Mutex::new(TaskCache::new())),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn fetch_all(&self) -> Result<Vec<Task>, ClientError> {
        let ticket = self.cache.lock().await.issue();
        debug!(ticket = ticket.sequence(), "fetching task list");

        let result = self.read_list(self.http.get(self.url("/tasks"))).await;

        let mut cache = self.cache.lock().await;
        match result {
            Ok(tasks) => {
                let sorted = sort_for_display(&tasks);
                if !cache.apply_snapshot(ticket, tasks) {
                    warn!(ticket = ticket.sequence(), "discarded stale task list response");
                }
                Ok(sorted)
            }
            Err(err) => {
                error!("failed to load tasks: {err}");
                cache.apply_failure(ticket, err.to_string());
                Err(err)
            }
        }
    }

    /// A blank keyword is a plain `fetch_all`. Results narrow the displayed list
    /// only; stats keep reflecting the full collection.
    pub async fn search(&self, keyword: &str) -> Result<Vec<Task>, ClientError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return self.fetch_all().await;
        }

        let ticket = self.cache.lock().await.issue();
        debug!(ticket = ticket.sequence(), keyword, "searching tasks");

        let request = self
            .http
            .get(self.url("/tasks/search"))
            .query(&[("q", keyword)]);
        let result = self.read_list(request).await;

        let mut cache = self.cache.lock().await;
        match result {
            Ok(tasks) => {
                let sorted = sort_for_display(&tasks);
                if !cache.apply_search(ticket, keyword, tasks) {
                    warn!(ticket = ticket.sequence(), "discarded stale search response");
                }
                Ok(sorted)
            }
            Err(err) => {
                error!("search for {keyword:?} failed: {err}");
                cache.apply_failure(ticket, err.to_string());
                Err(err)
            }
        }
    }

    pub async fn clear_search(&self) -> Result<Vec<Task>, ClientError> {
        self.search("").await
    }

    pub async fn get(&self, id: TaskId) -> Result<Task, ClientError> {
        let response = self.send(self.http.get(self.url(&format!("/tasks/{id}")))).await?;
        Ok(check(response, Some(id)).await?.json().await?)
    }

    pub async fn create(&self, draft: &TaskDraft) -> Result<Task, ClientError> {
        let draft = TaskDraft::new(draft.title.as_str(), draft.description.clone());
        validate_draft(&draft.title, draft.description.as_deref())
            .map_err(ClientError::validation)?;

        let response = self
            .send(self.http.post(self.url("/tasks")).json(&draft))
            .await?;
        let created: Task = check(response, None).await?.json().await?;
        info!(id = created.id, "task created");

        self.refresh().await;
        Ok(created)
    }

    pub async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, ClientError> {
        let patch = TaskPatch::new(
            patch.title.as_str(),
            patch.description.clone(),
            patch.completed,
        );
        validate_draft(&patch.title, patch.description.as_deref())
            .map_err(ClientError::validation)?;

        // An empty description clears the stored one.
        let body = UpdateBody {
            title: &patch.title,
            description: patch.description.as_deref().unwrap_or_default(),
            completed: patch.completed,
        };
        let response = self
            .send(self.http.put(self.url(&format!("/tasks/{id}"))).json(&body))
            .await?;

        match check(response, Some(id)).await {
            Ok(response) => {
                let updated: Task = response.json().await?;
                info!(id, "task updated");
                self.refresh().await;
                Ok(updated)
            }
            Err(err) => {
                if err.is_not_found() {
                    self.refresh().await;
                }
                Err(err)
            }
        }
    }

    /// Fails with `NotFound` when the id is unknown locally or to the backend;
    /// callers may treat that as a no-op.
    pub async fn toggle(&self, id: TaskId) -> Result<Task, ClientError> {
        if self.cache.lock().await.find(id).is_none() {
            warn!(id, "toggle requested for a task missing from the cache");
            self.refresh().await;
            return Err(ClientError::NotFound { id });
        }

        let response = self
            .send(self.http.post(self.url(&format!("/tasks/{id}/toggle"))))
            .await?;
        let result = match check(response, Some(id)).await {
            Ok(response) => response.json::<Task>().await.map_err(ClientError::from),
            Err(err) => Err(err),
        };

        let refresh_needed = match &result {
            Ok(task) => {
                info!(id, completed = task.completed, "task toggled");
                true
            }
            Err(err) => err.is_not_found(),
        };
        if refresh_needed {
            self.refresh().await;
        }
        result
    }

    pub async fn delete(
        &self,
        id: TaskId,
        confirm: impl Confirm,
    ) -> Result<DeleteOutcome, ClientError> {
        if !confirm.confirm(DELETE_PROMPT) {
            return Ok(DeleteOutcome::Cancelled);
        }

        let response = self
            .send(self.http.delete(self.url(&format!("/tasks/{id}"))))
            .await?;
        let outcome = match check(response, Some(id)).await {
            Ok(_) => {
                info!(id, "task deleted");
                DeleteOutcome::Deleted
            }
            Err(err) if err.is_not_found() => {
                info!(id, "task was already deleted");
                DeleteOutcome::AlreadyGone
            }
            Err(err) => return Err(err),
        };

        self.refresh().await;
        Ok(outcome)
    }

    pub async fn clear_all(&self, confirm: impl Confirm) -> Result<DeleteOutcome, ClientError> {
        if !confirm.confirm(CLEAR_PROMPT) {
            return Ok(DeleteOutcome::Cancelled);
        }

        let response = self.send(self.http.delete(self.url("/tasks"))).await?;
        check(response, None).await?;
        info!("all tasks deleted");

        self.refresh().await;
        Ok(DeleteOutcome::Deleted)
    }

    pub async fn fetch_server_stats(&self) -> Result<ServerStats, ClientError> {
        let response = self.send(self.http.get(self.url("/stats"))).await?;
        Ok(check(response, None).await?.json().await?)
    }

    /// Stats over the authoritative snapshot, never the search results.
    pub async fn stats(&self) -> TaskStats {
        self.cache.lock().await.stats()
    }

    pub async fn view(&self) -> ListView {
        self.cache.lock().await.view()
    }

    pub async fn tasks(&self) -> Vec<Task> {
        self.cache.lock().await.tasks().to_vec()
    }

    // A failed refresh is already recorded in the view phase.
    async fn refresh(&self) {
        if let Err(err) = self.fetch_all().await {
            warn!("refresh after mutation failed: {err}");
        }
    }

    async fn read_list(&self, request: RequestBuilder) -> Result<Vec<Task>, ClientError> {
        let response = self.send(request).await?;
        Ok(check(response, None).await?.json().await?)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        request.send().await.map_err(|err| {
            error!("request to {} failed: {err}", self.base_url);
            ClientError::from(err)
        })
    }
}

/// Maps non-success statuses onto the error taxonomy. A 404 is `NotFound` only
/// when the request addressed a single task.
async fn check(response: Response, id: Option<TaskId>) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body: ApiErrorBody = response.json().await.unwrap_or_default();

    if let Some(id) = id.filter(|_| status == StatusCode::NOT_FOUND) {
        return Err(ClientError::NotFound { id });
    }

    if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
        let fields: Vec<_> = body
            .details
            .unwrap_or_default()
            .into_iter()
            .map(|error| error.normalized())
            .collect();
        if !fields.is_empty() {
            warn!(status = status.as_u16(), "backend rejected the task: {fields:?}");
            return Err(ClientError::validation(fields));
        }
    }

    warn!(status = status.as_u16(), "backend returned an error: {:?}", body.error);
    Err(ClientError::server(status.as_u16(), body.error))
}
