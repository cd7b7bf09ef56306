// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public `GenericIndex` API: object identity over a pluggable integer-keyed store.

use core::fmt::Debug;
use core::hash::Hash;
use core::ops::ControlFlow;

use alloc::vec::Vec;
use hashbrown::{HashMap, HashSet};

use crate::backends::Reference;
use crate::store::{Id, Store};
use crate::types::{Point, Rect, Scalar};

/// Upper limit of the id counter.
///
/// Ids stay within a non-negative `i32` so the persisted stream can hold any
/// counter an index reaches.
pub(crate) const MAX_NEXT_ID: Id = i32::MAX as Id;

#[derive(Copy, Clone, Debug, PartialEq)]
struct Slot<T> {
    id: Id,
    rect: Rect<T>,
}

/// Spatial index of application objects, parameterized by a rectangle store.
///
/// Every object added gets a fresh [`Id`] (0, 1, 2, ...) which is never reused
/// while the index lives, even after deletes. The store only ever sees ids;
/// query results are translated back to objects before they reach the caller.
///
/// Objects are compared by `Eq`/`Hash`. Each live object has exactly one id and
/// one rectangle.
pub struct GenericIndex<T: Scalar, O, S: Store<T>> {
    objects: HashMap<Id, O>,
    slots: HashMap<O, Slot<T>>,
    next_id: Id,
    store: S,
}

impl<T: Scalar, O, S: Store<T> + Debug> Debug for GenericIndex<T, O, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GenericIndex")
            .field("len", &self.objects.len())
            .field("next_id", &self.next_id)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl<T, O, S> GenericIndex<T, O, S>
where
    T: Scalar,
    O: Clone + Eq + Hash,
    S: Store<T> + Default,
{
    /// Create an empty index using the store's default constructor.
    pub fn new() -> Self {
        Self::with_store(S::default())
    }
}

impl<T, O, S> Default for GenericIndex<T, O, S>
where
    T: Scalar,
    O: Clone + Eq + Hash,
    S: Store<T> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, O, S> GenericIndex<T, O, S>
where
    T: Scalar,
    O: Clone + Eq + Hash,
    S: Store<T>,
{
    /// Create an empty index over an explicit store instance.
    ///
    /// The store should be empty; the index assumes it owns every entry.
    pub fn with_store(store: S) -> Self {
        debug_assert!(store.is_empty(), "GenericIndex requires an empty store");
        Self {
            objects: HashMap::new(),
            slots: HashMap::new(),
            next_id: 0,
            store,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Add `object` with its rectangle and return the id it was given.
    ///
    /// Ids are issued from a counter that only grows. If `object` is already in
    /// the index, its previous entry is removed first and it moves to the new id
    /// and rectangle.
    ///
    /// # Panics
    ///
    /// Panics once `i32::MAX` ids have been issued.
    pub fn add(&mut self, rect: Rect<T>, object: O) -> Id {
        let id = self.next_id;
        assert!(id < MAX_NEXT_ID, "GenericIndex id counter exhausted");
        self.next_id = id + 1;

        if let Some(old) = self.slots.remove(&object) {
            let removed = self.store.delete(old.rect, old.id);
            debug_assert!(removed, "store lost the rectangle for id {}", old.id);
            self.objects.remove(&old.id);
            log::trace!("re-added object moved from id {} to id {id}", old.id);
        }

        self.insert_with_id(rect, object, id);
        id
    }

    /// Insert under a caller-chosen id, bypassing the counter.
    pub(crate) fn insert_with_id(&mut self, rect: Rect<T>, object: O, id: Id) {
        self.store.add(rect, id);
        self.objects.insert(id, object.clone());
        self.slots.insert(object, Slot { id, rect });
        log::trace!("added id {id}");
        self.debug_check();
    }

    /// Delete `object` if it is stored with exactly `rect`.
    ///
    /// Returns `false` and changes nothing if the object is unknown or `rect`
    /// differs from its stored rectangle.
    pub fn delete(&mut self, rect: Rect<T>, object: &O) -> bool {
        let Some(slot) = self.slots.get(object).copied() else {
            log::debug!("delete rejected: object not in index");
            return false;
        };
        if !self.store.delete(rect, slot.id) {
            log::debug!("delete rejected: rectangle mismatch for id {}", slot.id);
            return false;
        }
        self.slots.remove(object);
        self.objects.remove(&slot.id);
        self.debug_check();
        true
    }

    /// Remove every object. The id counter keeps its value.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.slots.clear();
        self.store.clear();
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.debug_check();
        self.store.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Smallest rectangle enclosing every stored rectangle, or `None` when empty.
    pub fn bounds(&self) -> Option<Rect<T>> {
        self.store.bounds()
    }

    /// The id the next [`add`][Self::add] will issue.
    pub fn next_id(&self) -> Id {
        self.next_id
    }

    pub(crate) fn set_next_id(&mut self, next_id: Id) {
        debug_assert!(next_id <= MAX_NEXT_ID, "id counter beyond {MAX_NEXT_ID}");
        self.next_id = next_id;
    }

    /// The rectangle `object` is stored with.
    pub fn rect_of(&self, object: &O) -> Option<Rect<T>> {
        self.slots.get(object).map(|s| s.rect)
    }

    /// The id `object` is stored under.
    pub fn id_of(&self, object: &O) -> Option<Id> {
        self.slots.get(object).map(|s| s.id)
    }

    /// The object stored under `id`.
    pub fn get(&self, id: Id) -> Option<&O> {
        self.objects.get(&id)
    }

    /// Whether `object` is in the index.
    pub fn contains_object(&self, object: &O) -> bool {
        self.slots.contains_key(object)
    }

    /// Iterate over `(id, object, rect)` for every live object, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (Id, &O, Rect<T>)> + '_ {
        self.slots.iter().map(|(o, s)| (s.id, o, s.rect))
    }

    /// Visit objects whose rectangle lies entirely within `rect`.
    ///
    /// Return [`ControlFlow::Break`] from `f` to stop early.
    pub fn visit_contains<F: FnMut(&O) -> ControlFlow<()>>(&self, rect: Rect<T>, mut f: F) {
        self.store
            .visit_contains(rect, |id| self.translate(id, &mut f));
    }

    /// Objects whose rectangle lies entirely within `rect`.
    pub fn contains(&self, rect: Rect<T>) -> HashSet<&O> {
        self.resolve(|f| self.store.visit_contains(rect, f))
    }

    /// Visit objects whose rectangle intersects `rect` (touching edges count).
    ///
    /// Return [`ControlFlow::Break`] from `f` to stop early.
    pub fn visit_intersects<F: FnMut(&O) -> ControlFlow<()>>(&self, rect: Rect<T>, mut f: F) {
        self.store
            .visit_intersects(rect, |id| self.translate(id, &mut f));
    }

    /// Objects whose rectangle intersects `rect`.
    pub fn intersects(&self, rect: Rect<T>) -> HashSet<&O> {
        self.resolve(|f| self.store.visit_intersects(rect, f))
    }

    /// Objects whose rectangle intersects `rect`, in the order the store visits them.
    pub fn intersects_list(&self, rect: Rect<T>) -> Vec<&O> {
        self.resolve(|f| self.store.visit_intersects(rect, f))
    }

    /// Visit every object tied for the smallest distance to `point`, ignoring
    /// objects further away than `max_distance`.
    ///
    /// Return [`ControlFlow::Break`] from `f` to stop early.
    pub fn visit_nearest<F: FnMut(&O) -> ControlFlow<()>>(
        &self,
        point: Point<T>,
        max_distance: T,
        mut f: F,
    ) {
        self.store
            .visit_nearest(point, max_distance, |id| self.translate(id, &mut f));
    }

    /// Objects tied for the smallest distance to `point` within `max_distance`.
    pub fn nearest(&self, point: Point<T>, max_distance: T) -> HashSet<&O> {
        self.resolve(|f| self.store.visit_nearest(point, max_distance, f))
    }

    /// Visit the `n` nearest objects within `max_distance`, closest first.
    ///
    /// Objects tied with the `n`-th are all visited.
    pub fn visit_nearest_n<F: FnMut(&O) -> ControlFlow<()>>(
        &self,
        point: Point<T>,
        n: usize,
        max_distance: T,
        mut f: F,
    ) {
        self.store
            .visit_nearest_n(point, n, max_distance, |id| self.translate(id, &mut f));
    }

    /// The `n` nearest objects within `max_distance`, closest first, including
    /// every object tied with the `n`-th.
    pub fn nearest_n(&self, point: Point<T>, n: usize, max_distance: T) -> Vec<&O> {
        self.resolve(|f| self.store.visit_nearest_n(point, n, max_distance, f))
    }

    fn translate<F: FnMut(&O) -> ControlFlow<()>>(&self, id: Id, f: &mut F) -> ControlFlow<()> {
        // Ids without an object cannot occur while the maps are in sync.
        match self.objects.get(&id) {
            Some(object) => f(object),
            None => ControlFlow::Continue(()),
        }
    }

    fn resolve<'a, C, V>(&'a self, visit: V) -> C
    where
        C: Default + Extend<&'a O>,
        V: FnOnce(&mut dyn FnMut(Id) -> ControlFlow<()>),
    {
        let objects = &self.objects;
        let mut out = C::default();
        visit(&mut |id| {
            out.extend(objects.get(&id));
            ControlFlow::Continue(())
        });
        out
    }

    #[inline]
    fn debug_check(&self) {
        debug_assert_eq!(
            self.store.len(),
            self.objects.len(),
            "store and id map out of sync"
        );
        debug_assert_eq!(
            self.objects.len(),
            self.slots.len(),
            "id map and object map out of sync"
        );
    }
}

/// Default index using the linear-scan reference store.
pub type Index<T, O> = GenericIndex<T, O, Reference<T>>;

#[cfg(feature = "backend_grid")]
impl<T, O> GenericIndex<T, O, crate::backends::Grid<T>>
where
    T: crate::backends::GridScalar,
    O: Clone + Eq + Hash,
{
    /// Create an index over a uniform grid store with the given cell size.
    pub fn with_grid(cell_size: T) -> Self {
        Self::with_store(crate::backends::Grid::new(cell_size))
    }
}
