// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nearest-neighbour selection shared by all stores.
//!
//! Stores feed `(id, distance)` candidates in scan order; the selectors decide
//! which ids survive. Keeping the rules here means every store breaks ties the
//! same way.

use alloc::vec::Vec;

use crate::store::Id;
use crate::types::Scalar;

/// Collects every id tied for the minimum distance.
///
/// The running minimum starts at `max_distance`. A strictly smaller distance
/// clears the set and lowers the minimum; a distance equal to the minimum joins it.
#[derive(Debug)]
pub(crate) struct NearestSet<T> {
    nearest: T,
    ids: Vec<Id>,
}

impl<T: Scalar> NearestSet<T> {
    pub(crate) fn new(max_distance: T) -> Self {
        Self {
            nearest: max_distance,
            ids: Vec::new(),
        }
    }

    pub(crate) fn offer(&mut self, id: Id, distance: T) {
        if distance < self.nearest {
            self.nearest = distance;
            self.ids.clear();
        }
        if distance <= self.nearest {
            self.ids.push(id);
        }
    }

    pub(crate) fn into_ids(self) -> Vec<Id> {
        self.ids
    }
}

/// Keeps the `n` nearest candidates, sorted by ascending distance.
///
/// Insertion is stable: equal distances keep the order they were offered in.
/// When the list grows past `n`, the cohort sharing the greatest distance is
/// dropped only if at least `n` entries remain afterwards. A tied cohort at the
/// cut-off is therefore never split.
#[derive(Debug)]
pub(crate) struct NearestN<T> {
    n: usize,
    max_distance: T,
    sorted: Vec<(T, Id)>,
}

impl<T: Scalar> NearestN<T> {
    pub(crate) fn new(n: usize, max_distance: T) -> Self {
        Self {
            n,
            max_distance,
            sorted: Vec::new(),
        }
    }

    pub(crate) fn offer(&mut self, id: Id, distance: T) {
        if distance <= self.max_distance {
            let at = self.sorted.partition_point(|&(d, _)| d <= distance);
            self.sorted.insert(at, (distance, id));

            if self.sorted.len() > self.n {
                let Some(&(furthest, _)) = self.sorted.last() else {
                    return;
                };
                let cohort_start = self.sorted.partition_point(|&(d, _)| d < furthest);
                if cohort_start >= self.n {
                    self.sorted.truncate(cohort_start);
                }
            }
        }
    }

    pub(crate) fn into_ids(self) -> Vec<Id> {
        self.sorted.into_iter().map(|(_, id)| id).collect()
    }
}
