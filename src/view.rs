use crate::client::{CLEAR_PROMPT, DELETE_PROMPT};
use crate::errors::ClientError;
use crate::models::{Task, TaskDraft, TaskId};
use crate::state::{ListView, Listing, ViewPhase};
use crate::stats::rate_label;
use crate::validation::{DESCRIPTION_FIELD, DESCRIPTION_MAX_CHARS, TITLE_FIELD, TITLE_MAX_CHARS};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Toggle,
    Edit,
    Delete,
    ClearAll,
    Search,
    ClearSearch,
}

/// Route for every page action. The router registers handlers from this table
/// and the renderer builds form targets from it.
#[derive(Debug, Clone)]
pub struct ActionTable {
    routes: BTreeMap<Action, &'static str>,
}

impl Default for ActionTable {
    fn default() -> Self {
        let routes = BTreeMap::from([
            (Action::Create, "/tasks/new"),
            (Action::Toggle, "/tasks/:id/toggle"),
            (Action::Edit, "/tasks/:id/edit"),
            (Action::Delete, "/tasks/:id/delete"),
            (Action::ClearAll, "/tasks/clear"),
            (Action::Search, "/"),
            (Action::ClearSearch, "/search/clear"),
        ]);
        Self { routes }
    }
}

impl ActionTable {
    pub fn route(&self, action: Action) -> &'static str {
        self.routes.get(&action).copied().unwrap_or("/")
    }

    pub fn href(&self, action: Action, id: TaskId) -> String {
        self.route(action).replace(":id", &id.to_string())
    }
}

/// Messages shown on the next render, then dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Notices {
    pub banner: Option<String>,
    pub field_errors: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<TaskDraft>,
}

impl Notices {
    pub fn show_banner(&mut self, message: impl Into<String>) {
        self.banner = Some(message.into());
    }

    pub fn set_field_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.field_errors.insert(field.into(), message.into());
    }

    pub fn keep_draft(&mut self, draft: TaskDraft) {
        self.draft = Some(draft);
    }

    /// Field errors for known inputs go inline; anything else becomes the banner.
    pub fn report(&mut self, err: &ClientError) {
        match err {
            ClientError::Validation { fields } => {
                let mut unmatched = Vec::new();
                for error in fields {
                    if error.field == TITLE_FIELD || error.field == DESCRIPTION_FIELD {
                        self.set_field_error(error.field.as_str(), error.message.as_str());
                    } else {
                        unmatched.push(format!("{}: {}", error.field, error.message));
                    }
                }
                if !unmatched.is_empty() {
                    self.show_banner(unmatched.join("; "));
                }
            }
            other => self.show_banner(other.to_string()),
        }
    }

    pub fn take(&mut self) -> Notices {
        std::mem::take(self)
    }
}

pub fn render_index(view: &ListView, notices: &Notices, actions: &ActionTable) -> String {
    let draft = notices.draft.clone().unwrap_or_default();
    let draft_description = draft.description.unwrap_or_default();
    let keyword = match &view.listing {
        Listing::Search { keyword } => keyword.as_str(),
        Listing::All => "",
    };

    INDEX_HTML
        .replace("{{TOTAL}}", &view.stats.total.to_string())
        .replace("{{ACTIVE}}", &view.stats.active.to_string())
        .replace("{{COMPLETED}}", &view.stats.completed.to_string())
        .replace("{{RATE}}", &rate_label(&view.stats))
        .replace("{{TITLE_MAX}}", &TITLE_MAX_CHARS.to_string())
        .replace("{{DESC_MAX}}", &DESCRIPTION_MAX_CHARS.to_string())
        .replace("{{TITLE_COUNT}}", &draft.title.chars().count().to_string())
        .replace("{{DESC_COUNT}}", &draft_description.chars().count().to_string())
        .replace("{{CREATE_ACTION}}", actions.route(Action::Create))
        .replace("{{SEARCH_ACTION}}", actions.route(Action::Search))
        .replace("{{CLEAR_SEARCH_ACTION}}", actions.route(Action::ClearSearch))
        .replace("{{CLEAR_ALL_ACTION}}", actions.route(Action::ClearAll))
        .replace("{{CLEAR_PROMPT}}", &escape_html(CLEAR_PROMPT))
        .replace("{{BANNER}}", &render_banner(notices.banner.as_deref()))
        .replace("{{TITLE_ERROR}}", &render_field_error(notices, TITLE_FIELD))
        .replace("{{DESC_ERROR}}", &render_field_error(notices, DESCRIPTION_FIELD))
        .replace("{{DRAFT_TITLE}}", &escape_html(&draft.title))
        .replace("{{DRAFT_DESC}}", &escape_html(&draft_description))
        .replace("{{KEYWORD}}", &escape_html(keyword))
        .replace("{{TASKS}}", &render_list(view, keyword, actions))
}

fn render_banner(message: Option<&str>) -> String {
    match message {
        Some(message) => format!(
            r#"<div class="banner" role="alert">{}</div>"#,
            escape_html(message)
        ),
        None => String::new(),
    }
}

fn render_field_error(notices: &Notices, field: &str) -> String {
    match notices.field_errors.get(field) {
        Some(message) => format!(
            r#"<p class="field-error" id="{field}-error">{}</p>"#,
            escape_html(message)
        ),
        None => String::new(),
    }
}

fn render_list(view: &ListView, keyword: &str, actions: &ActionTable) -> String {
    match &view.phase {
        ViewPhase::Error(message) => {
            return format!(
                r#"<div class="error">Could not load tasks: {}</div>"#,
                escape_html(message)
            );
        }
        ViewPhase::Idle | ViewPhase::Loading if view.tasks.is_empty() => {
            return r#"<div class="loading">Loading...</div>"#.to_string();
        }
        _ => {}
    }

    if view.tasks.is_empty() {
        return if keyword.is_empty() {
            r#"<div class="empty-state"><h3>No tasks</h3><p>Add your first task!</p></div>"#
                .to_string()
        } else {
            format!(
                r#"<div class="empty-state"><h3>Nothing matches "{}"</h3></div>"#,
                escape_html(keyword)
            )
        };
    }

    let rows: String = view
        .tasks
        .iter()
        .map(|task| render_task(task, actions))
        .collect();
    format!(r#"<ul class="tasks">{rows}</ul>"#)
}

fn render_task(task: &Task, actions: &ActionTable) -> String {
    let title = escape_html(&task.title);
    let description = task.description.as_deref().map(escape_html);
    let created = task
        .created_time()
        .map(|time| time.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    let (state_class, status, toggle_label) = if task.completed {
        ("completed", "Done", "Restore")
    } else {
        ("", "In progress", "Complete")
    };
    let description_block = description
        .as_deref()
        .map(|text| format!(r#"<div class="task-description">{text}</div>"#))
        .unwrap_or_default();

    format!(
        r#"
      <li class="task {state_class}" id="task-{id}">
        <div class="task-header">
          <span class="task-title">{title}</span>
          <span class="task-id">#{id}</span>
        </div>
        {description_block}
        <div class="task-meta"><span>{created}</span><span>{status}</span></div>
        <div class="task-actions">
          <form method="post" action="{toggle}">
            <button class="btn btn-small">{toggle_label}</button>
          </form>
          <form method="post" action="{delete}" onsubmit="return confirm('{delete_prompt}')">
            <input type="hidden" name="confirm" value="yes" />
            <button class="btn btn-small btn-danger">Delete</button>
          </form>
          <details>
            <summary>Edit</summary>
            <form method="post" action="{edit}" class="edit-form">
              <input name="title" maxlength="{title_max}" value="{title}" />
              <textarea name="description" maxlength="{desc_max}">{description_text}</textarea>
              <input type="hidden" name="completed" value="{completed}" />
              <button class="btn btn-small">Save</button>
            </form>
          </details>
        </div>
      </li>"#,
        id = task.id,
        toggle = actions.href(Action::Toggle, task.id),
        delete = actions.href(Action::Delete, task.id),
        edit = actions.href(Action::Edit, task.id),
        delete_prompt = escape_html(DELETE_PROMPT),
        title_max = TITLE_MAX_CHARS,
        desc_max = DESCRIPTION_MAX_CHARS,
        description_text = description.as_deref().unwrap_or_default(),
        completed = task.completed,
    )
}

/// Also escapes braces so rendered user text can never look like a placeholder.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '{' => escaped.push_str("&#123;"),
            '}' => escaped.push_str("&#125;"),
            other => escaped.push(other),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Task List</title>
  <style>
    :root {
      --bg: #f4f1ea;
      --ink: #2b2a28;
      --accent: #2f6f4e;
      --danger: #c0392b;
      --card: #ffffff;
      --muted: #8b857d;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      display: grid;
      gap: 24px;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(150px, 1fr));
      gap: 12px;
    }

    .stat,
    .card,
    .task {
      background: var(--card);
      border-radius: 14px;
      padding: 16px;
      border: 1px solid rgba(0, 0, 0, 0.06);
    }

    .stat .label {
      display: block;
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: var(--muted);
    }

    .stat .value {
      font-size: 1.6rem;
      font-weight: 600;
    }

    .banner,
    .error {
      background: #fdecea;
      color: var(--danger);
      border-radius: 12px;
      padding: 12px 16px;
    }

    .field-error {
      color: var(--danger);
      margin: 4px 0 0;
      font-size: 0.9rem;
    }

    .counter {
      color: var(--muted);
      font-size: 0.8rem;
    }

    .tasks {
      list-style: none;
      padding: 0;
      margin: 0;
      display: grid;
      gap: 12px;
    }

    .task.completed .task-title {
      text-decoration: line-through;
      color: var(--muted);
    }

    .task-header,
    .task-meta,
    .task-actions {
      display: flex;
      gap: 12px;
      justify-content: space-between;
      align-items: center;
    }

    .task-meta {
      color: var(--muted);
      font-size: 0.85rem;
    }

    .btn {
      border: none;
      border-radius: 999px;
      padding: 8px 16px;
      background: var(--accent);
      color: white;
      cursor: pointer;
    }

    .btn-danger {
      background: var(--danger);
    }

    input,
    textarea {
      width: 100%;
      padding: 8px 10px;
      border-radius: 8px;
      border: 1px solid rgba(0, 0, 0, 0.15);
      font: inherit;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Task List</h1>
    </header>

    {{BANNER}}

    <section class="panel">
      <div class="stat"><span class="label">Total</span><span id="total-tasks" class="value">{{TOTAL}}</span></div>
      <div class="stat"><span class="label">Active</span><span id="active-tasks" class="value">{{ACTIVE}}</span></div>
      <div class="stat"><span class="label">Completed</span><span id="completed-tasks" class="value">{{COMPLETED}}</span></div>
      <div class="stat"><span class="label">Done</span><span id="completion-rate" class="value">{{RATE}}</span></div>
    </section>

    <section class="card">
      <form id="create-form" method="post" action="{{CREATE_ACTION}}">
        <label for="taskTitle">Title <span class="counter"><span id="title-chars">{{TITLE_COUNT}}</span>/{{TITLE_MAX}}</span></label>
        <input id="taskTitle" name="title" maxlength="{{TITLE_MAX}}" value="{{DRAFT_TITLE}}" />
        {{TITLE_ERROR}}
        <label for="taskDescription">Description <span class="counter"><span id="desc-chars">{{DESC_COUNT}}</span>/{{DESC_MAX}}</span></label>
        <textarea id="taskDescription" name="description" maxlength="{{DESC_MAX}}">{{DRAFT_DESC}}</textarea>
        {{DESC_ERROR}}
        <button class="btn" type="submit">Add task</button>
      </form>
    </section>

    <section class="card">
      <form id="search-form" method="get" action="{{SEARCH_ACTION}}">
        <input id="search-input" name="q" value="{{KEYWORD}}" placeholder="Search tasks" />
        <button class="btn" type="submit">Search</button>
        <a href="{{CLEAR_SEARCH_ACTION}}">Show all</a>
      </form>
      <form method="post" action="{{CLEAR_ALL_ACTION}}" onsubmit="return confirm('{{CLEAR_PROMPT}}')">
        <input type="hidden" name="confirm" value="yes" />
        <button class="btn btn-danger" type="submit">Delete all</button>
      </form>
    </section>

    <section id="tasks-container">
      {{TASKS}}
    </section>
  </main>

  <script>
    const counters = [
      ['taskTitle', 'title-chars'],
      ['taskDescription', 'desc-chars']
    ];
    counters.forEach(([inputId, counterId]) => {
      const input = document.getElementById(inputId);
      const counter = document.getElementById(counterId);
      input.addEventListener('input', () => {
        counter.textContent = input.value.length;
      });
    });
  </script>
</body>
</html>
"#;
