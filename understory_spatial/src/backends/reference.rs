// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Brute-force reference store: every query is a linear scan.
//!
//! This is the ground truth the other stores are checked against. `add` and
//! `delete` are cheap; queries are `O(n)` and get slow past a few thousand entries.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::ops::ControlFlow;

use crate::select::{NearestN, NearestSet};
use crate::store::{Id, Store};
use crate::types::{Point, Rect, Scalar};

/// Linear-scan store keyed by id.
///
/// Entries are scanned in ascending id order, so results (including the order
/// of equidistant nearest-N entries) are deterministic.
#[derive(Clone)]
pub struct Reference<T: Scalar> {
    entries: BTreeMap<Id, Rect<T>>,
}

impl<T: Scalar> Default for Reference<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T: Scalar> Debug for Reference<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Reference")
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl<T: Scalar> Reference<T> {
    /// Create an empty reference store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored rectangle for `id`, if any.
    pub fn get(&self, id: Id) -> Option<Rect<T>> {
        self.entries.get(&id).copied()
    }

    fn nearest_ids(&self, point: Point<T>, max_distance: T) -> Vec<Id> {
        let mut sel = NearestSet::new(max_distance);
        for (&id, rect) in &self.entries {
            sel.offer(id, rect.distance(point));
        }
        sel.into_ids()
    }

    fn nearest_n_ids(&self, point: Point<T>, n: usize, max_distance: T) -> Vec<Id> {
        let mut sel = NearestN::new(n, max_distance);
        for (&id, rect) in &self.entries {
            sel.offer(id, rect.distance(point));
        }
        sel.into_ids()
    }

    fn visit_matching<F, M>(&self, mut matches: M, mut f: F)
    where
        F: FnMut(Id) -> ControlFlow<()>,
        M: FnMut(&Rect<T>) -> bool,
    {
        for (&id, rect) in &self.entries {
            if matches(rect) && f(id).is_break() {
                return;
            }
        }
    }
}

impl<T: Scalar> Store<T> for Reference<T> {
    fn add(&mut self, rect: Rect<T>, id: Id) {
        self.entries.insert(id, rect);
    }

    fn delete(&mut self, rect: Rect<T>, id: Id) -> bool {
        match self.entries.get(&id) {
            Some(stored) if *stored == rect => {
                self.entries.remove(&id);
                true
            }
            _ => false,
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn bounds(&self) -> Option<Rect<T>> {
        self.entries
            .values()
            .copied()
            .reduce(|acc, r| acc.union(&r))
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn visit_contains<F: FnMut(Id) -> ControlFlow<()>>(&self, rect: Rect<T>, f: F) {
        self.visit_matching(|r| rect.contains(r), f);
    }

    fn visit_intersects<F: FnMut(Id) -> ControlFlow<()>>(&self, rect: Rect<T>, f: F) {
        self.visit_matching(|r| rect.intersects(r), f);
    }

    fn visit_nearest<F: FnMut(Id) -> ControlFlow<()>>(
        &self,
        point: Point<T>,
        max_distance: T,
        f: F,
    ) {
        let _ = self.nearest_ids(point, max_distance).into_iter().try_for_each(f);
    }

    fn visit_nearest_n<F: FnMut(Id) -> ControlFlow<()>>(
        &self,
        point: Point<T>,
        n: usize,
        max_distance: T,
        f: F,
    ) {
        let _ = self
            .nearest_n_ids(point, n, max_distance)
            .into_iter()
            .try_for_each(f);
    }
}

/// Reference store over `f32` coordinates.
pub type ReferenceF32 = Reference<f32>;
/// Reference store over `f64` coordinates.
pub type ReferenceF64 = Reference<f64>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn collect<F>(visit: F) -> Vec<Id>
    where
        F: FnOnce(&mut dyn FnMut(Id) -> ControlFlow<()>),
    {
        let mut out = Vec::new();
        visit(&mut |id| {
            out.push(id);
            ControlFlow::Continue(())
        });
        out
    }

    fn points_at_distances(distances: &[f32]) -> ReferenceF32 {
        // Unit-free points along the x axis; distance from the origin is x.
        let mut store = ReferenceF32::new();
        for (id, &d) in distances.iter().enumerate() {
            store.add(Rect::from_point(Point::new(d, 0.0)), id as Id);
        }
        store
    }

    #[test]
    fn add_copies_and_delete_requires_exact_rect() {
        let mut store = ReferenceF32::new();
        let mut r = Rect::new(0.0, 0.0, 1.0, 1.0);
        store.add(r, 3);
        r.max_x = 5.0;
        assert_eq!(store.get(3), Some(Rect::new(0.0, 0.0, 1.0, 1.0)));

        assert!(!store.delete(r, 3));
        assert_eq!(store.len(), 1);
        assert!(!store.delete(Rect::new(0.0, 0.0, 1.0, 1.0), 4));
        assert_eq!(store.len(), 1);

        assert!(store.delete(Rect::new(0.0, 0.0, 1.0, 1.0), 3));
        assert!(store.is_empty());
        assert!(!store.delete(Rect::new(0.0, 0.0, 1.0, 1.0), 3));
    }

    #[test]
    fn add_overwrites_existing_id() {
        let mut store = ReferenceF32::new();
        store.add(Rect::new(0.0, 0.0, 1.0, 1.0), 0);
        store.add(Rect::new(2.0, 2.0, 3.0, 3.0), 0);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(0), Some(Rect::new(2.0, 2.0, 3.0, 3.0)));
    }

    #[test]
    fn nearest_returns_all_ties() {
        let store = points_at_distances(&[2.0, 2.0, 5.0]);
        let ids = collect(|f| store.visit_nearest(Point::new(0.0, 0.0), 10.0, f));
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn nearest_honours_max_distance() {
        let store = points_at_distances(&[2.0, 2.0, 5.0]);
        let ids = collect(|f| store.visit_nearest(Point::new(0.0, 0.0), 1.5, f));
        assert!(ids.is_empty());
    }

    #[test]
    fn nearest_n_keeps_tie_cohort() {
        let store = points_at_distances(&[1.0, 2.0, 2.0, 2.0, 5.0]);
        let ids = collect(|f| store.visit_nearest_n(Point::new(0.0, 0.0), 3, 10.0, f));
        assert_eq!(ids, vec![0, 1, 2, 3]);

        let unsorted =
            collect(|f| store.visit_nearest_n_unsorted(Point::new(0.0, 0.0), 3, 10.0, f));
        assert_eq!(unsorted, ids);
    }

    #[test]
    fn nearest_n_sorted_by_distance() {
        let store = points_at_distances(&[4.0, 1.0, 3.0, 2.0]);
        let ids = collect(|f| store.visit_nearest_n(Point::new(0.0, 0.0), 3, f32::INFINITY, f));
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn intersects_and_contains_boundary() {
        let mut store = ReferenceF32::new();
        store.add(Rect::new(10.0, 0.0, 12.0, 2.0), 0); // touches right edge
        store.add(Rect::new(2.0, 2.0, 4.0, 4.0), 1); // inside
        store.add(Rect::new(0.0, 0.0, 10.0, 10.0), 2); // equal to query
        store.add(Rect::new(20.0, 20.0, 21.0, 21.0), 3); // far away

        let query = Rect::new(0.0, 0.0, 10.0, 10.0);
        let hits = collect(|f| store.visit_intersects(query, f));
        assert_eq!(hits, vec![0, 1, 2]);
        let inside = collect(|f| store.visit_contains(query, f));
        assert_eq!(inside, vec![1, 2]);

        assert_eq!(store.query_intersects(query).count(), 3);
        assert_eq!(store.query_contains(query).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn visitor_break_stops_traversal() {
        let store = points_at_distances(&[1.0, 1.0, 1.0, 1.0]);
        let everything = Rect::new(-10.0, -10.0, 10.0, 10.0);

        let mut seen = 0;
        store.visit_intersects(everything, |_| {
            seen += 1;
            if seen == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(seen, 2);

        let mut seen = 0;
        store.visit_nearest(Point::new(0.0, 0.0), f32::INFINITY, |_| {
            seen += 1;
            ControlFlow::Break(())
        });
        assert_eq!(seen, 1);

        let mut seen = 0;
        store.visit_nearest_n(Point::new(0.0, 0.0), 4, f32::INFINITY, |_| {
            seen += 1;
            ControlFlow::Break(())
        });
        assert_eq!(seen, 1);
    }

    #[test]
    fn bounds_cover_all_entries() {
        let mut store = ReferenceF64::new();
        assert_eq!(store.bounds(), None);
        store.add(Rect::new(0.0, 1.0, 2.0, 3.0), 0);
        store.add(Rect::new(-1.0, 2.0, 1.0, 7.0), 1);
        assert_eq!(store.bounds(), Some(Rect::new(-1.0, 1.0, 2.0, 7.0)));
        store.clear();
        assert_eq!(store.bounds(), None);
        assert_eq!(store.len(), 0);
    }
}
