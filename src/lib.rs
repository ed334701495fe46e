pub mod app;
pub mod client;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod ordering;
pub mod state;
pub mod stats;
pub mod validation;
pub mod view;

pub use app::router;
pub use client::{Confirm, DeleteOutcome, TaskListClient};
pub use config::Config;
pub use errors::{AppError, ClientError};
pub use models::{FieldError, Task, TaskDraft, TaskPatch, TaskStats};
pub use ordering::sort_for_display;
pub use state::{AppState, ListView, TaskCache};
pub use stats::compute_stats;
pub use validation::validate_draft;
