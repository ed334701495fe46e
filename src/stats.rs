use crate::models::{Task, TaskStats};

pub fn compute_stats(tasks: &[Task]) -> TaskStats {
    let total = tasks.len() as u64;
    let completed = tasks.iter().filter(|task| task.completed).count() as u64;
    let completion_rate = if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64 * 100.0
    };

    TaskStats {
        total,
        active: total - completed,
        completed,
        completion_rate,
    }
}

/// Whole-percent label, e.g. `67%`.
pub fn rate_label(stats: &TaskStats) -> String {
    format!("{}%", stats.completion_rate.round() as u64)
}
