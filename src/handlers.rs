use crate::errors::AppError;
use crate::models::{ServerStats, TaskDraft, TaskId, TaskPatch};
use crate::state::{AppState, ListView};
use crate::view::{Action, Notices, render_index};
use axum::{
    Form, Json,
    extract::{Path, Query, State},
    response::{Html, Redirect},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DraftForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct EditForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: Option<String>,
}

impl EditForm {
    fn is_completed(&self) -> bool {
        matches!(self.completed.as_deref(), Some("true" | "on" | "1"))
    }
}

/// Filled in by the browser's confirm dialog.
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmForm {
    #[serde(default)]
    pub confirm: Option<String>,
}

impl ConfirmForm {
    fn confirmed(&self) -> bool {
        self.confirm.as_deref() == Some("yes")
    }
}

#[derive(Debug, Serialize)]
pub struct PageState {
    pub view: ListView,
    pub notices: Notices,
}

/// Page load. Failures land in the view phase and render in the list area.
pub async fn index(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> Html<String> {
    let _ = match query.q.as_deref() {
        Some(keyword) => state.client.search(keyword).await,
        None => state.client.fetch_all().await,
    };

    let view = state.client.view().await;
    let notices = state.notices.lock().await.take();
    Html(render_index(&view, &notices, &state.actions))
}

pub async fn get_view(State(state): State<AppState>) -> Json<PageState> {
    let view = state.client.view().await;
    let notices = state.notices.lock().await.clone();
    Json(PageState { view, notices })
}

/// Backend-computed statistics, passed through.
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<ServerStats>, AppError> {
    Ok(Json(state.client.fetch_server_stats().await?))
}

pub async fn create_task(State(state): State<AppState>, Form(form): Form<DraftForm>) -> Redirect {
    let draft = TaskDraft::new(form.title, Some(form.description));
    if let Err(err) = state.client.create(&draft).await {
        let mut notices = state.notices.lock().await;
        notices.report(&err);
        notices.keep_draft(draft);
    }
    Redirect::to("/")
}

pub async fn toggle_task(State(state): State<AppState>, Path(id): Path<TaskId>) -> Redirect {
    match state.client.toggle(id).await {
        Ok(task) => debug!("task {id} is now completed={}", task.completed),
        Err(err) if err.is_not_found() => info!("ignoring toggle of missing task {id}"),
        Err(err) => state.notices.lock().await.report(&err),
    }
    Redirect::to("/")
}

pub async fn edit_task(
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
    Form(form): Form<EditForm>,
) -> Redirect {
    let completed = form.is_completed();
    let patch = TaskPatch::new(form.title, Some(form.description), completed);
    if let Err(err) = state.client.update(id, &patch).await {
        state.notices.lock().await.report(&err);
    }
    Redirect::to("/")
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
    Form(form): Form<ConfirmForm>,
) -> Redirect {
    let confirmed = form.confirmed();
    match state.client.delete(id, move |_: &str| confirmed).await {
        Ok(outcome) => debug!("delete of task {id}: {outcome:?}"),
        Err(err) => state.notices.lock().await.report(&err),
    }
    Redirect::to("/")
}

pub async fn clear_tasks(State(state): State<AppState>, Form(form): Form<ConfirmForm>) -> Redirect {
    let confirmed = form.confirmed();
    match state.client.clear_all(move |_: &str| confirmed).await {
        Ok(outcome) => debug!("clear all: {outcome:?}"),
        Err(err) => state.notices.lock().await.report(&err),
    }
    Redirect::to("/")
}

/// The page load behind the redirect performs the full fetch.
pub async fn clear_search(State(state): State<AppState>) -> Redirect {
    Redirect::to(state.actions.route(Action::Search))
}
