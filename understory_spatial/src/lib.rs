// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Spatial: object identity over an integer-keyed rectangle store.
//!
//! A [`GenericIndex`] maps application objects to axis-aligned rectangles.
//!
//! - Every object added gets a fresh [`Id`] from a counter that never goes back,
//!   so ids are not reused even after deletes.
//! - The rectangles live in a [`Store`] that only knows ids. Query results are
//!   translated back to objects before they reach the caller.
//! - Deletes must name the exact rectangle an object was stored with.
//!
//! Queries cover containment, intersection (touching edges count), nearest, and
//! nearest-N. Nearest returns every object tied at the smallest distance;
//! nearest-N returns the `n` closest plus every object tied with the `n`-th.
//!
//! It is generic over the scalar type `T` (`f32` or `f64`) and does not depend on
//! any geometry crate.
//!
//! ## Features
//!
//! - `std` *(default)*: binary persistence through `std::io` and `sqrt` from `std`.
//! - `libm`: `sqrt` from `libm` for `no_std` builds. One of `std` or `libm` is required.
//! - `backend_grid` *(default)*: a uniform grid store backed by `smallvec`.
//!
//! # Example
//!
//! ```rust
//! use understory_spatial::{Index, Point, Rect};
//!
//! let mut idx: Index<f32, &str> = Index::new();
//! assert_eq!(idx.add(Rect::new(0.0, 0.0, 10.0, 10.0), "panel"), 0);
//! assert_eq!(idx.add(Rect::new(20.0, 0.0, 25.0, 5.0), "button"), 1);
//!
//! // Query results borrow the index, so keep them in their own scope.
//! {
//!     // Boundary contact counts as intersection.
//!     let hits = idx.intersects(Rect::new(10.0, 0.0, 20.0, 10.0));
//!     assert_eq!(hits.len(), 2);
//!
//!     let closest = idx.nearest_n(Point::new(30.0, 0.0), 1, f32::INFINITY);
//!     assert_eq!(closest, vec![&"button"]);
//! }
//!
//! // Deleting needs the rectangle the object was stored with.
//! assert!(!idx.delete(Rect::new(0.0, 0.0, 1.0, 1.0), &"panel"));
//! assert!(idx.delete(Rect::new(0.0, 0.0, 10.0, 10.0), &"panel"));
//!
//! // Ids are never handed out twice.
//! assert_eq!(idx.add(Rect::new(0.0, 0.0, 1.0, 1.0), "panel"), 2);
//! ```
//!
//! With the `backend_grid` feature enabled (default), the same API runs over a
//! uniform grid:
//!
//! ```rust
//! # #[cfg(feature = "backend_grid")]
//! # {
//! use understory_spatial::backends::GridF32;
//! use understory_spatial::{GenericIndex, Point, Rect};
//!
//! let mut idx = GenericIndex::<f32, u32, GridF32>::with_grid(64.0);
//! idx.add(Rect::new(0.0, 0.0, 10.0, 10.0), 7);
//! let nearest = idx.nearest(Point::new(5.0, 5.0), 1.0);
//! assert!(nearest.contains(&7));
//! # }
//! ```
//!
//! ## Choosing a store
//!
//! - `Reference` (default): linear scans in ascending id order. It defines the
//!   query semantics and is the one to compare other stores against.
//! - `GridF32`/`GridF64` *(feature `backend_grid`)*: uniform grid with configurable
//!   cell size. A good fit when rectangles are roughly uniform in size and queries
//!   are small compared to the world extent.
//!
//! Stores differ only in the order they visit results; the sets they return match.
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for coordinates. Distances are Euclidean, measured
//! from a point to the closest point of a rectangle, and are zero inside it.

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("understory_spatial requires either the `std` or `libm` feature");

pub mod backends;
mod index;
#[cfg(feature = "std")]
mod persist;
mod select;
mod store;
mod types;


pub use index::{GenericIndex, Index};
#[cfg(feature = "std")]
pub use persist::{ObjectCodec, PersistError};
pub use store::{Id, Store};
pub use types::{Point, Rect, Scalar};
