#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::time::sleep;

#[derive(Debug, Clone)]
struct StoredTask {
    id: i64,
    title: String,
    description: String,
    completed: bool,
    created_at: String,
}

impl StoredTask {
    // Same row shape a SQLite-backed server returns.
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "title": self.title,
            "description": self.description,
            "completed": if self.completed { 1 } else { 0 },
            "created_at": self.created_at,
            "updated_at": self.created_at,
        })
    }
}

#[derive(Default)]
struct Backend {
    next_id: i64,
    tasks: Vec<StoredTask>,
    list_delays: VecDeque<Duration>,
    list_overrides: VecDeque<(StatusCode, String)>,
    requests: HashMap<&'static str, usize>,
}

impl Backend {
    fn find(&mut self, id: i64) -> Option<&mut StoredTask> {
        self.tasks.iter_mut().find(|task| task.id == id)
    }

    fn record(&mut self, route: &'static str) {
        *self.requests.entry(route).or_default() += 1;
    }
}

#[derive(Clone)]
struct Shared {
    backend: Arc<Mutex<Backend>>,
    delayed_list_started: Arc<Notify>,
}

/// In-process stand-in for the task backend.
#[derive(Clone)]
pub struct FakeBackend {
    pub base_url: String,
    shared: Shared,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let shared = Shared {
            backend: Arc::new(Mutex::new(Backend::default())),
            delayed_list_started: Arc::new(Notify::new()),
        };

        let app = Router::new()
            .route("/tasks", get(list).post(create).delete(clear))
            .route("/tasks/search", get(search))
            .route("/tasks/:id", get(fetch_one).put(update).delete(remove))
            .route("/tasks/:id/toggle", post(toggle))
            .route("/stats", get(stats))
            .with_state(shared.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake backend");
        let addr = listener.local_addr().expect("fake backend addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake backend stopped");
        });

        Self {
            base_url: format!("http://{addr}"),
            shared,
        }
    }

    /// The next `GET /tasks` captures its snapshot, then waits before answering.
    pub async fn delay_next_list(&self, delay: Duration) {
        self.shared.backend.lock().await.list_delays.push_back(delay);
    }

    /// The next `GET /tasks` answers with this status and raw body instead of the list.
    pub async fn answer_next_list(&self, status: StatusCode, body: impl Into<String>) {
        let mut backend = self.shared.backend.lock().await;
        backend.list_overrides.push_back((status, body.into()));
    }

    pub async fn wait_for_delayed_list(&self) {
        self.shared.delayed_list_started.notified().await;
    }

    /// Writes behind the client's back, as another user would.
    pub async fn insert(&self, title: &str, completed: bool) -> i64 {
        let mut backend = self.shared.backend.lock().await;
        insert_task(&mut backend, title, "", completed)
    }

    pub async fn remove(&self, id: i64) {
        self.shared
            .backend
            .lock()
            .await
            .tasks
            .retain(|task| task.id != id);
    }

    pub async fn titles(&self) -> Vec<String> {
        let backend = self.shared.backend.lock().await;
        backend.tasks.iter().map(|task| task.title.clone()).collect()
    }

    pub async fn requests(&self, route: &str) -> usize {
        let backend = self.shared.backend.lock().await;
        backend.requests.get(route).copied().unwrap_or(0)
    }
}

fn insert_task(backend: &mut Backend, title: &str, description: &str, completed: bool) -> i64 {
    backend.next_id += 1;
    let id = backend.next_id;
    backend.tasks.push(StoredTask {
        id,
        title: title.to_string(),
        description: description.to_string(),
        completed,
        created_at: format!("2026-01-05 10:{:02}:{:02}", id / 60, id % 60),
    });
    id
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn validation_error(field: &str, message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "validation failed",
            "details": [{ "field": field, "message": message, "type": "value_error" }]
        })),
    )
        .into_response()
}

fn check_fields(backend: &Backend, title: &str, description: &str, own_id: Option<i64>) -> Option<Response> {
    let length = title.chars().count();
    if length == 0 || length > 100 {
        return Some(validation_error("body.title", "title must be 1-100 characters"));
    }
    if description.chars().count() > 500 {
        return Some(validation_error("body.description", "description too long"));
    }
    // A rule the client does not know about.
    if backend
        .tasks
        .iter()
        .any(|task| task.title == title && Some(task.id) != own_id)
    {
        return Some(validation_error("body.title", "a task with this title already exists"));
    }
    None
}

async fn list(State(shared): State<Shared>) -> Response {
    let (body, delay) = {
        let mut backend = shared.backend.lock().await;
        backend.record("list");
        if let Some(canned) = backend.list_overrides.pop_front() {
            return canned.into_response();
        }
        let body: Vec<Value> = backend.tasks.iter().map(StoredTask::to_json).collect();
        (body, backend.list_delays.pop_front())
    };

    if let Some(delay) = delay {
        shared.delayed_list_started.notify_one();
        sleep(delay).await;
    }
    Json(body).into_response()
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

async fn search(State(shared): State<Shared>, Query(params): Query<SearchParams>) -> Response {
    let mut backend = shared.backend.lock().await;
    backend.record("search");
    let keyword = params.q.trim().to_lowercase();
    if keyword.is_empty() {
        return error(StatusCode::BAD_REQUEST, "search query required");
    }
    let body: Vec<Value> = backend
        .tasks
        .iter()
        .filter(|task| {
            task.title.to_lowercase().contains(&keyword)
                || task.description.to_lowercase().contains(&keyword)
        })
        .map(StoredTask::to_json)
        .collect();
    Json(body).into_response()
}

async fn fetch_one(State(shared): State<Shared>, Path(id): Path<i64>) -> Response {
    let mut backend = shared.backend.lock().await;
    match backend.find(id) {
        Some(task) => Json(task.to_json()).into_response(),
        None => error(StatusCode::NOT_FOUND, "task not found"),
    }
}

#[derive(Deserialize)]
struct CreateBody {
    title: String,
    #[serde(default)]
    description: Option<String>,
}

async fn create(State(shared): State<Shared>, Json(body): Json<CreateBody>) -> Response {
    let mut backend = shared.backend.lock().await;
    backend.record("create");
    let description = body.description.unwrap_or_default();
    if let Some(rejection) = check_fields(&backend, &body.title, &description, None) {
        return rejection;
    }
    let id = insert_task(&mut backend, &body.title, &description, false);
    let task = backend.find(id).map(|task| task.to_json());
    (StatusCode::CREATED, Json(task)).into_response()
}

#[derive(Deserialize)]
struct UpdateBody {
    title: String,
    #[serde(default)]
    description: Option<String>,
    completed: bool,
}

async fn update(
    State(shared): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateBody>,
) -> Response {
    let mut backend = shared.backend.lock().await;
    backend.record("update");
    let description = body.description.unwrap_or_default();
    if backend.find(id).is_none() {
        return error(StatusCode::NOT_FOUND, "task not found");
    }
    if let Some(rejection) = check_fields(&backend, &body.title, &description, Some(id)) {
        return rejection;
    }
    match backend.find(id) {
        Some(task) => {
            task.title = body.title;
            task.description = description;
            task.completed = body.completed;
            Json(task.to_json()).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "task not found"),
    }
}

async fn toggle(State(shared): State<Shared>, Path(id): Path<i64>) -> Response {
    let mut backend = shared.backend.lock().await;
    backend.record("toggle");
    match backend.find(id) {
        Some(task) => {
            task.completed = !task.completed;
            Json(task.to_json()).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "task not found"),
    }
}

async fn remove(State(shared): State<Shared>, Path(id): Path<i64>) -> Response {
    let mut backend = shared.backend.lock().await;
    backend.record("delete");
    let before = backend.tasks.len();
    backend.tasks.retain(|task| task.id != id);
    if backend.tasks.len() == before {
        return error(StatusCode::NOT_FOUND, "task not found");
    }
    Json(json!({ "success": true })).into_response()
}

async fn clear(State(shared): State<Shared>) -> Response {
    let mut backend = shared.backend.lock().await;
    backend.record("clear");
    let count = backend.tasks.len();
    backend.tasks.clear();
    Json(json!({ "result": "all tasks deleted", "count": count })).into_response()
}

async fn stats(State(shared): State<Shared>) -> Response {
    let backend = shared.backend.lock().await;
    let total = backend.tasks.len();
    let completed = backend.tasks.iter().filter(|task| task.completed).count();
    let completion_rate = if total > 0 {
        completed as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    Json(json!({
        "total": total,
        "active": total - completed,
        "completed": completed,
        "completion_rate": completion_rate,
    }))
    .into_response()
}
