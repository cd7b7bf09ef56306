// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Store implementations for different spatial strategies.
//!
//! - `reference`: linear scans over an id-ordered map. Defines the query semantics
//!   every other store must reproduce.
//! - `grid` (feature `backend_grid`): uniform grid with configurable cell size.
//!
//! Tie-breaking for nearest queries is shared by all stores: candidates are fed
//! to the same selectors, so only the scan order of equidistant entries can differ.

#[cfg(feature = "backend_grid")]
pub(crate) mod grid;
pub(crate) mod reference;

#[cfg(feature = "backend_grid")]
pub use grid::{Grid, GridF32, GridF64, GridScalar};
pub use reference::{Reference, ReferenceF32, ReferenceF64};
