//! Dense ordering
//!
//! Helpers shared by categories and links. A collection is dense when its
//! `sort` values are exactly `0..n-1`. Both helpers work on a list already
//! sorted ascending and return only the records whose `sort` changed, so
//! callers can persist them in one batch.

use crate::database::{Category, Link};
use crate::error::{AppError, Result};

/// Anything ranked by a `sort` field
pub trait Ranked {
    fn sort(&self) -> usize;
    fn set_sort(&mut self, sort: usize);
}

impl Ranked for Category {
    fn sort(&self) -> usize {
        self.sort
    }

    fn set_sort(&mut self, sort: usize) {
        self.sort = sort;
    }
}

impl Ranked for Link {
    fn sort(&self) -> usize {
        self.sort
    }

    fn set_sort(&mut self, sort: usize) {
        self.sort = sort;
    }
}

/// Move the item at `drag_index` to `hover_index` (remove, then insert).
///
/// Returns the items whose rank changed, with their new rank applied.
/// Equal indices yield no changes.
pub fn reorder<T: Ranked + Clone>(
    items: &[T],
    drag_index: usize,
    hover_index: usize,
) -> Result<Vec<T>> {
    if drag_index >= items.len() || hover_index >= items.len() {
        return Err(AppError::Validation(format!(
            "Reorder index out of range: {} -> {} (len {})",
            drag_index,
            hover_index,
            items.len()
        )));
    }

    if drag_index == hover_index {
        return Ok(Vec::new());
    }

    let mut reordered = items.to_vec();
    let dragged = reordered.remove(drag_index);
    reordered.insert(hover_index, dragged);

    Ok(compact(reordered))
}

/// Re-rank items to their position.
///
/// Idempotent: running it on its own output changes nothing, and any gaps
/// or duplicates left by an interrupted write sequence are closed.
pub fn compact<T: Ranked>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(position, mut item)| {
            if item.sort() == position {
                None
            } else {
                item.set_sort(position);
                Some(item)
            }
        })
        .collect()
}
