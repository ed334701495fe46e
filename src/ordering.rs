use crate::models::Task;
use std::cmp::{Ordering, Reverse};

/// Display order: open tasks first, then newest first, then highest id.
///
/// Tasks without a usable creation time sort after every dated task of the same
/// group. The id tie-break makes this a total order for any snapshot.
pub fn sort_for_display(tasks: &[Task]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(display_order);
    sorted
}

pub fn display_order(a: &Task, b: &Task) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| Reverse(a.created_time()).cmp(&Reverse(b.created_time())))
        .then_with(|| Reverse(a.id).cmp(&Reverse(b.id)))
}
