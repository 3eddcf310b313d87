//! Incremental list updates.
//!
//! [`diff`] turns a previously rendered sequence into a new one with a short
//! script of edits. Operations are emitted in the order removes, moves,
//! inserts, changes and must be applied one after another; every index refers
//! to the list as it stands after the preceding operations.

use std::{
    collections::{HashMap, HashSet},
    hash::Hash,
};

use shared::domain::{Story, StoryId};

/// Items with a stable identity independent of their payload.
pub trait Identified {
    type Key: Eq + Hash + Clone;

    fn key(&self) -> Self::Key;
}

impl Identified for Story {
    type Key = StoryId;

    fn key(&self) -> StoryId {
        self.id.clone()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListOp<T> {
    Remove { index: usize },
    Move { from: usize, to: usize },
    Insert { index: usize, item: T },
    Change { index: usize, item: T },
}

pub fn diff<T>(previous: &[T], next: &[T]) -> Vec<ListOp<T>>
where
    T: Identified + PartialEq + Clone,
{
    // First occurrence wins; repeated keys are treated as distinct items.
    let mut next_index: HashMap<T::Key, usize> = HashMap::new();
    for (index, item) in next.iter().enumerate() {
        next_index.entry(item.key()).or_insert(index);
    }

    let mut ops = Vec::new();

    // Pair every previous item with its slot in `next`, or drop it.
    let mut paired: Vec<Option<usize>> = Vec::with_capacity(previous.len());
    let mut claimed = HashSet::new();
    for item in previous {
        let slot = next_index
            .get(&item.key())
            .copied()
            .filter(|slot| claimed.insert(*slot));
        paired.push(slot);
    }
    for (index, slot) in paired.iter().enumerate().rev() {
        if slot.is_none() {
            ops.push(ListOp::Remove { index });
        }
    }

    // Survivors, in their current order, identified by target slot.
    let mut working: Vec<usize> = paired.iter().flatten().copied().collect();
    let stable = longest_increasing(&working);

    let mut targets = working.clone();
    targets.sort_unstable();
    for (rank, &slot) in targets.iter().enumerate() {
        if stable.contains(&slot) {
            continue;
        }
        let from = working
            .iter()
            .position(|&s| s == slot)
            .unwrap_or_default();
        working.remove(from);
        let to = match rank.checked_sub(1).map(|prev| targets[prev]) {
            Some(prev_slot) => {
                working
                    .iter()
                    .position(|&s| s == prev_slot)
                    .map_or(0, |p| p + 1)
            }
            None => 0,
        };
        working.insert(to, slot);
        if from != to {
            ops.push(ListOp::Move { from, to });
        }
    }

    for (index, item) in next.iter().enumerate() {
        if !claimed.contains(&index) {
            ops.push(ListOp::Insert {
                index,
                item: item.clone(),
            });
        }
    }

    for (old, slot) in previous.iter().zip(&paired) {
        if let Some(slot) = *slot {
            if *old != next[slot] {
                ops.push(ListOp::Change {
                    index: slot,
                    item: next[slot].clone(),
                });
            }
        }
    }

    ops
}

/// Applies `ops` in order. Out-of-range indices are ignored.
pub fn apply<T: Clone>(list: &mut Vec<T>, ops: &[ListOp<T>]) {
    for op in ops {
        match op {
            ListOp::Remove { index } if *index < list.len() => {
                list.remove(*index);
            }
            ListOp::Move { from, to } if *from < list.len() && *to < list.len() => {
                let item = list.remove(*from);
                list.insert(*to, item);
            }
            ListOp::Insert { index, item } if *index <= list.len() => {
                list.insert(*index, item.clone());
            }
            ListOp::Change { index, item } if *index < list.len() => {
                list[*index] = item.clone();
            }
            _ => {}
        }
    }
}

/// Slots of the longest strictly increasing subsequence of `values`.
fn longest_increasing(values: &[usize]) -> HashSet<usize> {
    // tails[k] = index into `values` of the smallest tail of a run of length k + 1
    let mut tails: Vec<usize> = Vec::new();
    let mut parent: Vec<Option<usize>> = vec![None; values.len()];
    for (i, &value) in values.iter().enumerate() {
        let pos = tails.partition_point(|&t| values[t] < value);
        parent[i] = pos.checked_sub(1).map(|p| tails[p]);
        if pos == tails.len() {
            tails.push(i);
        } else {
            tails[pos] = i;
        }
    }

    let mut stable = HashSet::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        stable.insert(values[i]);
        cursor = parent[i];
    }
    stable
}

/// The list currently on screen; hands back the edits for each refresh.
#[derive(Debug, Default, Clone)]
pub struct StoryFeed {
    items: Vec<Story>,
}

impl StoryFeed {
    pub fn items(&self) -> &[Story] {
        &self.items
    }

    pub fn set_data(&mut self, next: Vec<Story>) -> Vec<ListOp<Story>> {
        let ops = diff(&self.items, &next);
        self.items = next;
        ops
    }
}

#[cfg(test)]
#[path = "tests/reconcile_tests.rs"]
mod tests;
