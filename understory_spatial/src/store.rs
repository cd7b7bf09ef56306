// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Store trait for rectangle-indexed integer stores.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::ops::ControlFlow;

use crate::types::{Point, Rect, Scalar};

/// Dense, non-negative integer id of a stored rectangle.
pub type Id = u32;

/// A rectangle-indexed store of integer ids, used by [`GenericIndex`][crate::GenericIndex].
///
/// Visitors return [`ControlFlow::Break`] to stop a traversal; no further ids are
/// visited after a break.
///
/// Every store must produce the same results as
/// [`Reference`][crate::backends::Reference] (compared as sets; only the order of
/// equidistant entries may differ).
pub trait Store<T: Scalar> {
    /// Insert `id` with a copy of `rect`, replacing any previous rectangle for `id`.
    fn add(&mut self, rect: Rect<T>, id: Id);

    /// Remove `id` if its stored rectangle is exactly `rect`.
    ///
    /// Returns `false` without mutating anything if `id` is absent or stored with
    /// a different rectangle.
    fn delete(&mut self, rect: Rect<T>, id: Id) -> bool;

    /// Number of stored entries.
    fn len(&self) -> usize;

    /// Whether the store is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Smallest rectangle enclosing every stored rectangle, or `None` when empty.
    fn bounds(&self) -> Option<Rect<T>>;

    /// Remove all entries.
    fn clear(&mut self);

    /// Visit ids whose rectangle lies entirely within `rect`.
    fn visit_contains<F: FnMut(Id) -> ControlFlow<()>>(&self, rect: Rect<T>, f: F);

    /// Visit ids whose rectangle intersects `rect` (touching edges count).
    fn visit_intersects<F: FnMut(Id) -> ControlFlow<()>>(&self, rect: Rect<T>, f: F);

    /// Visit every id tied for the smallest distance to `point`, ignoring entries
    /// further away than `max_distance`.
    fn visit_nearest<F: FnMut(Id) -> ControlFlow<()>>(&self, point: Point<T>, max_distance: T, f: F);

    /// Visit the `n` nearest ids within `max_distance`, in ascending distance.
    ///
    /// If the `n`-th and following entries are tied, the whole tied cohort is
    /// visited, so more than `n` ids may be reported.
    fn visit_nearest_n<F: FnMut(Id) -> ControlFlow<()>>(
        &self,
        point: Point<T>,
        n: usize,
        max_distance: T,
        f: F,
    );

    /// Like [`visit_nearest_n`][Store::visit_nearest_n] without an ordering guarantee.
    ///
    /// The default implementation forwards to the sorted variant.
    fn visit_nearest_n_unsorted<F: FnMut(Id) -> ControlFlow<()>>(
        &self,
        point: Point<T>,
        n: usize,
        max_distance: T,
        f: F,
    ) {
        self.visit_nearest_n(point, n, max_distance, f);
    }

    /// Query ids whose rectangle lies entirely within `rect`.
    ///
    /// The default implementation collects [`visit_contains`][Store::visit_contains].
    fn query_contains<'a>(&'a self, rect: Rect<T>) -> Box<dyn Iterator<Item = Id> + 'a> {
        let mut out = Vec::new();
        self.visit_contains(rect, |id| {
            out.push(id);
            ControlFlow::Continue(())
        });
        Box::new(out.into_iter())
    }

    /// Query ids whose rectangle intersects `rect`.
    ///
    /// The default implementation collects [`visit_intersects`][Store::visit_intersects].
    fn query_intersects<'a>(&'a self, rect: Rect<T>) -> Box<dyn Iterator<Item = Id> + 'a> {
        let mut out = Vec::new();
        self.visit_intersects(rect, |id| {
            out.push(id);
            ControlFlow::Continue(())
        });
        Box::new(out.into_iter())
    }
}
