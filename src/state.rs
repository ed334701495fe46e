use crate::client::TaskListClient;
use crate::models::{Task, TaskId, TaskStats};
use crate::ordering::sort_for_display;
use crate::stats::compute_stats;
use crate::view::{ActionTable, Notices};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Issued when a read is sent; responses carrying an older ticket than the
/// last applied one are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", content = "message", rename_all = "snake_case")]
pub enum ViewPhase {
    Idle,
    Loading,
    Displayed,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Listing {
    All,
    Search { keyword: String },
}

/// What the page shows right now.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListView {
    pub listing: Listing,
    pub tasks: Vec<Task>,
    pub stats: TaskStats,
    pub phase: ViewPhase,
}

/// Single-writer client state.
///
/// `snapshot` is the authoritative collection and only a full fetch replaces
/// it. `displayed` is what the list shows, which a search may narrow. Each slot
/// remembers the ticket it was last written with.
#[derive(Debug)]
pub struct TaskCache {
    issued: u64,
    snapshot: Vec<Task>,
    snapshot_ticket: u64,
    displayed: Vec<Task>,
    displayed_ticket: u64,
    listing: Listing,
    phase: ViewPhase,
}

impl Default for TaskCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskCache {
    pub fn new() -> Self {
        Self {
            issued: 0,
            snapshot: Vec::new(),
            snapshot_ticket: 0,
            displayed: Vec::new(),
            displayed_ticket: 0,
            listing: Listing::All,
            phase: ViewPhase::Idle,
        }
    }

    pub fn issue(&mut self) -> FetchTicket {
        self.issued += 1;
        self.phase = ViewPhase::Loading;
        FetchTicket(self.issued)
    }

    /// Applies a full collection. Returns `false` when both slots already hold
    /// newer data.
    pub fn apply_snapshot(&mut self, ticket: FetchTicket, tasks: Vec<Task>) -> bool {
        let mut applied = false;
        if ticket.0 > self.displayed_ticket {
            self.displayed = sort_for_display(&tasks);
            self.displayed_ticket = ticket.0;
            self.listing = Listing::All;
            self.settle(ticket);
            applied = true;
        }
        if ticket.0 > self.snapshot_ticket {
            self.snapshot = tasks;
            self.snapshot_ticket = ticket.0;
            applied = true;
        }
        applied
    }

    /// Applies search results to the displayed list only.
    pub fn apply_search(&mut self, ticket: FetchTicket, keyword: &str, tasks: Vec<Task>) -> bool {
        if ticket.0 <= self.displayed_ticket {
            return false;
        }
        self.displayed = sort_for_display(&tasks);
        self.displayed_ticket = ticket.0;
        self.listing = Listing::Search {
            keyword: keyword.to_string(),
        };
        self.settle(ticket);
        true
    }

    /// Records a failed read. Older responses still in flight are dropped afterwards.
    pub fn apply_failure(&mut self, ticket: FetchTicket, message: impl Into<String>) -> bool {
        if ticket.0 <= self.displayed_ticket {
            return false;
        }
        self.displayed_ticket = ticket.0;
        self.phase = ViewPhase::Error(message.into());
        true
    }

    fn settle(&mut self, ticket: FetchTicket) {
        self.phase = if ticket.0 == self.issued {
            ViewPhase::Displayed
        } else {
            ViewPhase::Loading
        };
    }

    pub fn tasks(&self) -> &[Task] {
        &self.snapshot
    }

    pub fn displayed(&self) -> &[Task] {
        &self.displayed
    }

    pub fn find(&self, id: TaskId) -> Option<&Task> {
        self.snapshot.iter().find(|task| task.id == id)
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    pub fn phase(&self) -> &ViewPhase {
        &self.phase
    }

    pub fn stats(&self) -> TaskStats {
        compute_stats(&self.snapshot)
    }

    pub fn view(&self) -> ListView {
        ListView {
            listing: self.listing.clone(),
            tasks: self.displayed.clone(),
            stats: self.stats(),
            phase: self.phase.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub client: TaskListClient,
    pub notices: Arc<Mutex<Notices>>,
    pub actions: Arc<ActionTable>,
}

impl AppState {
    pub fn new(client: TaskListClient) -> Self {
        Self {
            client,
            notices: Arc::new(Mutex::new(Notices::default())),
            actions: Arc::new(ActionTable::default()),
        }
    }
}
