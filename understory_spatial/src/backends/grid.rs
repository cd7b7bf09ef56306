// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Uniform grid store for 2D rectangles.
//!
//! This store buckets rectangles into fixed-size grid cells and answers queries
//! by touching only the cells overlapping the query window. It is intended
//! for workloads with:
//! - moderately uniform spatial density,
//! - dynamic adds and deletes, and
//! - query rectangles (or nearest-neighbour radii) that are small compared to
//!   the full world extent.
//!
//! Entries covering more than a fixed number of cells are kept in a separate
//! oversized list that every query scans, so a single huge rectangle never
//! allocates one bucket per covered cell.
//!
//! Results match [`Reference`][crate::backends::Reference] as sets. Cells are
//! visited in hash order, so the order of equidistant nearest-N entries may
//! differ from the reference store.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::ops::ControlFlow;

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

use crate::select::{NearestN, NearestSet};
use crate::store::{Id, Store};
use crate::types::{Point, Rect, Scalar};

/// Scalar types supported by the grid store.
///
/// This is kept separate from [`Scalar`] so that the grid implementation can
/// use type-specific cell arithmetic.
pub trait GridScalar: Scalar {
    /// Map a scalar coordinate to a grid coordinate along one axis.
    ///
    /// The mapping is based on an origin and uniform cell size. Implementations
    /// are expected to be monotonic in `value` for fixed `origin` and
    /// `cell_size`.
    fn cell_coord(value: Self, origin: Self, cell_size: Self) -> i32;
}

impl GridScalar for f32 {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Grid cell indices are intentionally i32; out-of-range values are saturated."
    )]
    #[inline]
    fn cell_coord(value: Self, origin: Self, cell_size: Self) -> i32 {
        debug_assert!(
            cell_size > 0.0,
            "grid cell_size must be strictly positive (f32)"
        );
        let t = (value - origin) / cell_size;
        let coord = t as i32;

        // Round towards -∞ (the cast above has already truncated).
        if t < 0.0 && (coord as Self) > t {
            coord.saturating_sub(1)
        } else {
            coord
        }
    }
}

impl GridScalar for f64 {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Grid cell indices are intentionally i32; out-of-range values are saturated."
    )]
    #[inline]
    fn cell_coord(value: Self, origin: Self, cell_size: Self) -> i32 {
        debug_assert!(
            cell_size > 0.0,
            "grid cell_size must be strictly positive (f64)"
        );
        let t = (value - origin) / cell_size;
        let coord = t as i32;

        if t < 0.0 && Self::from(coord) > t {
            coord.saturating_sub(1)
        } else {
            coord
        }
    }
}

type CellKey = (i32, i32);

/// Entries covering more cells than this go to the oversized list.
const MAX_CELLS_PER_ENTRY: u64 = 64;

fn cell_count(ix0: i32, ix1: i32, iy0: i32, iy1: i32) -> u64 {
    (u64::from(ix1.abs_diff(ix0)) + 1).saturating_mul(u64::from(iy1.abs_diff(iy0)) + 1)
}

/// Uniform grid store with fixed cell size.
pub struct Grid<T: GridScalar> {
    cell_size: T,
    origin_x: T,
    origin_y: T,
    cells: HashMap<CellKey, Cell>,
    entries: HashMap<Id, GridEntry<T>>,
    oversized: Vec<Id>,
}

#[derive(Clone, Debug)]
struct GridEntry<T: GridScalar> {
    rect: Rect<T>,
    // Cells currently listing this id. Empty for oversized entries.
    cells: SmallVec<[CellKey; 4]>,
}

#[derive(Default)]
struct Cell {
    ids: SmallVec<[Id; 8]>,
}

impl<T: GridScalar> Debug for Grid<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Grid")
            .field("cell_size", &self.cell_size)
            .field("origin_x", &self.origin_x)
            .field("origin_y", &self.origin_y)
            .field("entries", &self.entries.len())
            .field("cells", &self.cells.len())
            .field("oversized", &self.oversized.len())
            .finish_non_exhaustive()
    }
}

impl<T: GridScalar> Grid<T> {
    /// Create a new grid store with the given cell size and origin at (0, 0).
    pub fn new(cell_size: T) -> Self {
        Self::with_origin(cell_size, T::zero(), T::zero())
    }

    /// Create a new grid store with the given cell size and origin.
    pub fn with_origin(cell_size: T, origin_x: T, origin_y: T) -> Self {
        debug_assert!(cell_size > T::zero(), "cell_size must be strictly positive");
        Self {
            cell_size,
            origin_x,
            origin_y,
            cells: HashMap::new(),
            entries: HashMap::new(),
            oversized: Vec::new(),
        }
    }

    fn entry(&self, id: Id) -> &GridEntry<T> {
        self.entries
            .get(&id)
            .expect("grid invariant violated: cell references unknown id")
    }

    fn insert_into_cells(&mut self, id: Id, cells: &[CellKey]) {
        for &key in cells {
            self.cells.entry(key).or_default().ids.push(id);
        }
    }

    fn remove_from_cells(&mut self, id: Id, cells: &[CellKey]) {
        for key in cells {
            let cell = self
                .cells
                .get_mut(key)
                .expect("grid invariant violated: missing cell while removing id");

            let pos = cell
                .ids
                .iter()
                .position(|&s| s == id)
                .expect("grid invariant violated: id not found in expected cell");
            cell.ids.swap_remove(pos);

            if cell.ids.is_empty() {
                // Dropping empty cells keeps the map compact for sparse grids.
                self.cells.remove(key);
            }
        }
    }

    fn detach(&mut self, id: Id, entry: &GridEntry<T>) {
        if entry.cells.is_empty() {
            let pos = self
                .oversized
                .iter()
                .position(|&s| s == id)
                .expect("grid invariant violated: oversized id not listed");
            self.oversized.swap_remove(pos);
        } else {
            self.remove_from_cells(id, &entry.cells);
        }
    }

    fn cell_range(&self, min: T, max: T, origin: T) -> (i32, i32) {
        let c0 = T::cell_coord(min, origin, self.cell_size);
        let c1 = T::cell_coord(max, origin, self.cell_size);
        if c0 <= c1 { (c0, c1) } else { (c1, c0) }
    }

    /// Cells covered by `rect`, or `None` if it covers too many to bucket.
    fn covered_cells(&self, rect: &Rect<T>) -> Option<SmallVec<[CellKey; 4]>> {
        let (ix0, ix1) = self.cell_range(rect.min_x, rect.max_x, self.origin_x);
        let (iy0, iy1) = self.cell_range(rect.min_y, rect.max_y, self.origin_y);
        if cell_count(ix0, ix1, iy0, iy1) > MAX_CELLS_PER_ENTRY {
            return None;
        }
        let mut out: SmallVec<[CellKey; 4]> = SmallVec::new();
        for ix in ix0..=ix1 {
            for iy in iy0..=iy1 {
                out.push((ix, iy));
            }
        }
        Some(out)
    }

    /// Visit each oversized id, then each id listed in a cell overlapping
    /// `window`, once.
    ///
    /// Large windows walk the occupied cells instead of every cell in range.
    fn for_each_candidate<F>(&self, window: Rect<T>, mut f: F) -> ControlFlow<()>
    where
        F: FnMut(Id, &Rect<T>) -> ControlFlow<()>,
    {
        let (ix0, ix1) = self.cell_range(window.min_x, window.max_x, self.origin_x);
        let (iy0, iy1) = self.cell_range(window.min_y, window.max_y, self.origin_y);
        let span = cell_count(ix0, ix1, iy0, iy1);

        for &id in &self.oversized {
            f(id, &self.entry(id).rect)?;
        }

        let mut seen: HashSet<Id> = HashSet::new();
        let mut visit_cell = |cell: &Cell| -> ControlFlow<()> {
            for &id in &cell.ids {
                if seen.insert(id) {
                    f(id, &self.entry(id).rect)?;
                }
            }
            ControlFlow::Continue(())
        };

        if span > self.cells.len() as u64 {
            for (&(ix, iy), cell) in &self.cells {
                if (ix0..=ix1).contains(&ix) && (iy0..=iy1).contains(&iy) {
                    visit_cell(cell)?;
                }
            }
        } else {
            for ix in ix0..=ix1 {
                for iy in iy0..=iy1 {
                    if let Some(cell) = self.cells.get(&(ix, iy)) {
                        visit_cell(cell)?;
                    }
                }
            }
        }
        ControlFlow::Continue(())
    }

    /// The square of half-width `max_distance` around `point`.
    ///
    /// Any rectangle within `max_distance` of `point` intersects this window.
    fn nearest_window(point: Point<T>, max_distance: T) -> Rect<T> {
        Rect::new(
            T::sub(point.x, max_distance),
            T::sub(point.y, max_distance),
            T::add(point.x, max_distance),
            T::add(point.y, max_distance),
        )
    }

    fn nearest_ids(&self, point: Point<T>, max_distance: T) -> Vec<Id> {
        let mut sel = NearestSet::new(max_distance);
        let window = Self::nearest_window(point, max_distance);
        let _ = self.for_each_candidate(window, |id, rect| {
            sel.offer(id, rect.distance(point));
            ControlFlow::Continue(())
        });
        sel.into_ids()
    }

    fn nearest_n_ids(&self, point: Point<T>, n: usize, max_distance: T) -> Vec<Id> {
        let mut sel = NearestN::new(n, max_distance);
        if n > 0 {
            let window = Self::nearest_window(point, max_distance);
            let _ = self.for_each_candidate(window, |id, rect| {
                sel.offer(id, rect.distance(point));
                ControlFlow::Continue(())
            });
        }
        sel.into_ids()
    }
}

impl<T: GridScalar> Store<T> for Grid<T> {
    fn add(&mut self, rect: Rect<T>, id: Id) {
        // Re-adding an id replaces its previous cell memberships.
        if let Some(old) = self.entries.remove(&id) {
            self.detach(id, &old);
        }

        let cells = match self.covered_cells(&rect) {
            Some(cells) => {
                self.insert_into_cells(id, &cells);
                cells
            }
            None => {
                self.oversized.push(id);
                SmallVec::new()
            }
        };
        self.entries.insert(id, GridEntry { rect, cells });
    }

    fn delete(&mut self, rect: Rect<T>, id: Id) -> bool {
        match self.entries.get(&id) {
            Some(entry) if entry.rect == rect => {}
            _ => return false,
        }
        if let Some(entry) = self.entries.remove(&id) {
            self.detach(id, &entry);
        }
        true
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn bounds(&self) -> Option<Rect<T>> {
        self.entries
            .values()
            .map(|e| e.rect)
            .reduce(|acc, r| acc.union(&r))
    }

    fn clear(&mut self) {
        self.cells.clear();
        self.entries.clear();
        self.oversized.clear();
    }

    fn visit_contains<F: FnMut(Id) -> ControlFlow<()>>(&self, rect: Rect<T>, mut f: F) {
        let _ = self.for_each_candidate(rect, |id, r| {
            if rect.contains(r) {
                f(id)
            } else {
                ControlFlow::Continue(())
            }
        });
    }

    fn visit_intersects<F: FnMut(Id) -> ControlFlow<()>>(&self, rect: Rect<T>, mut f: F) {
        let _ = self.for_each_candidate(rect, |id, r| {
            if rect.intersects(r) {
                f(id)
            } else {
                ControlFlow::Continue(())
            }
        });
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

/// Grid store over `f32` coordinates.
pub type GridF32 = Grid<f32>;
/// Grid store over `f64` coordinates.
pub type GridF64 = Grid<f64>;
