// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use core::cmp::Ordering;
use core::fmt::Debug;

/// Axis-aligned rectangle in 2D.
///
/// Callers are expected to keep `min_x <= max_x` and `min_y <= max_y`; this is
/// not validated. Equality is exact per-field equality, which is what stores use
/// to match a rectangle on delete.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rect<T> {
    /// Minimum x (left)
    pub min_x: T,
    /// Minimum y (top)
    pub min_y: T,
    /// Maximum x (right)
    pub max_x: T,
    /// Maximum y (bottom)
    pub max_y: T,
}

/// A point in 2D.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Point<T> {
    /// x coordinate
    pub x: T,
    /// y coordinate
    pub y: T,
}

impl<T> Point<T> {
    /// Create a new point.
    #[inline(always)]
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T> Rect<T> {
    /// Create a new rectangle from min/max corners.
    #[inline(always)]
    pub const fn new(min_x: T, min_y: T, max_x: T, max_y: T) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

impl<T: Copy> Rect<T> {
    /// The degenerate rectangle covering exactly one point.
    #[inline]
    pub const fn from_point(p: Point<T>) -> Self {
        Self::new(p.x, p.y, p.x, p.y)
    }
}

impl<T: Copy + PartialOrd> Rect<T> {
    /// Whether this rectangle contains the point (edges included).
    #[inline]
    pub fn contains_point(&self, x: T, y: T) -> bool {
        self.min_x <= x && self.min_y <= y && x <= self.max_x && y <= self.max_y
    }

    /// Whether `other` lies entirely within this rectangle.
    ///
    /// Edges are inclusive, so a rectangle contains itself.
    #[inline]
    pub fn contains(&self, other: &Self) -> bool {
        self.max_x >= other.max_x
            && self.min_x <= other.min_x
            && self.max_y >= other.max_y
            && self.min_y <= other.min_y
    }

    /// Determines whether this rectangle overlaps with another in any way.
    ///
    /// Note that the edge of the rectangle is considered to be part of itself, meaning
    /// that two rectangles that share an edge (or a single corner) intersect.
    ///
    /// # Examples
    ///
    /// ```
    /// use understory_spatial::Rect;
    ///
    /// let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    /// assert!(a.intersects(&Rect::new(5.0, 5.0, 15.0, 15.0)));
    /// assert!(a.intersects(&Rect::new(10.0, 0.0, 20.0, 10.0)));
    /// assert!(!a.intersects(&Rect::new(11.0, 0.0, 20.0, 10.0)));
    /// ```
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        self.max_x >= other.min_x
            && self.min_x <= other.max_x
            && self.max_y >= other.min_y
            && self.min_y <= other.max_y
    }

    /// The intersection of two rectangles, or `None` if they do not intersect.
    #[inline]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.intersects(other) {
            return None;
        }
        Some(Self {
            min_x: max_t(self.min_x, other.min_x),
            min_y: max_t(self.min_y, other.min_y),
            max_x: min_t(self.max_x, other.max_x),
            max_y: min_t(self.max_y, other.max_y),
        })
    }

    /// The smallest rectangle enclosing both rectangles.
    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: min_t(self.min_x, other.min_x),
            min_y: min_t(self.min_y, other.min_y),
            max_x: max_t(self.max_x, other.max_x),
            max_y: max_t(self.max_y, other.max_y),
        }
    }

    /// Grow this rectangle in place so that it also encloses `other`.
    #[inline]
    pub fn add(&mut self, other: &Self) {
        *self = self.union(other);
    }
}

impl<T: Scalar> Rect<T> {
    /// Create a rectangle from origin and size.
    #[inline]
    pub fn from_xywh(x: T, y: T, w: T, h: T) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: T::add(x, w),
            max_y: T::add(y, h),
        }
    }

    /// Squared distance from the point to the closest point of this rectangle.
    ///
    /// Zero when the point lies inside or on the edge.
    #[inline]
    pub fn distance_sq(&self, p: Point<T>) -> T {
        let dx = axis_gap(self.min_x, self.max_x, p.x);
        let dy = axis_gap(self.min_y, self.max_y, p.y);
        T::add(T::mul(dx, dx), T::mul(dy, dy))
    }

    /// Euclidean distance from the point to the closest point of this rectangle.
    ///
    /// ```
    /// use understory_spatial::{Point, Rect};
    ///
    /// let r = Rect::new(0.0_f32, 0.0, 2.0, 2.0);
    /// assert_eq!(r.distance(Point::new(1.0, 1.0)), 0.0);
    /// assert_eq!(r.distance(Point::new(5.0, 6.0)), 5.0);
    /// ```
    #[inline]
    pub fn distance(&self, p: Point<T>) -> T {
        T::sqrt(self.distance_sq(p))
    }
}

#[inline]
fn axis_gap<T: Scalar>(min: T, max: T, v: T) -> T {
    if v < min {
        T::sub(min, v)
    } else if v > max {
        T::sub(v, max)
    } else {
        T::zero()
    }
}

/// Numeric scalar abstraction for rectangles and distances.
///
/// Implemented for `f32` and `f64`. Square roots come from `std` or, in
/// `no_std` builds, from `libm`.
pub trait Scalar: Copy + PartialOrd + Debug {
    /// Zero value for the scalar type.
    fn zero() -> Self;

    /// Positive infinity; the "unbounded" distance for nearest queries.
    fn infinity() -> Self;

    /// Add two scalar values.
    fn add(a: Self, b: Self) -> Self;

    /// Subtract two scalar values: a - b.
    fn sub(a: Self, b: Self) -> Self;

    /// Multiply two scalar values.
    fn mul(a: Self, b: Self) -> Self;

    /// Max of the two scalar values.
    fn max(a: Self, b: Self) -> Self;

    /// Min of the two scalar values.
    fn min(a: Self, b: Self) -> Self;

    /// Square root.
    fn sqrt(v: Self) -> Self;
}

impl Scalar for f32 {
    #[inline(always)]
    fn zero() -> Self {
        0.0
    }

    #[inline(always)]
    fn infinity() -> Self {
        Self::INFINITY
    }

    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a + b
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline]
    fn mul(a: Self, b: Self) -> Self {
        a * b
    }

    #[inline]
    fn max(a: Self, b: Self) -> Self {
        Self::max(a, b)
    }

    #[inline]
    fn min(a: Self, b: Self) -> Self {
        Self::min(a, b)
    }

    #[inline]
    fn sqrt(v: Self) -> Self {
        #[cfg(feature = "std")]
        {
            v.sqrt()
        }
        #[cfg(all(not(feature = "std"), feature = "libm"))]
        {
            libm::sqrtf(v)
        }
    }
}

impl Scalar for f64 {
    #[inline(always)]
    fn zero() -> Self {
        0.0
    }

    #[inline(always)]
    fn infinity() -> Self {
        Self::INFINITY
    }

    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a + b
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline]
    fn mul(a: Self, b: Self) -> Self {
        a * b
    }

    #[inline]
    fn max(a: Self, b: Self) -> Self {
        Self::max(a, b)
    }

    #[inline]
    fn min(a: Self, b: Self) -> Self {
        Self::min(a, b)
    }

    #[inline]
    fn sqrt(v: Self) -> Self {
        #[cfg(feature = "std")]
        {
            v.sqrt()
        }
        #[cfg(all(not(feature = "std"), feature = "libm"))]
        {
            libm::sqrt(v)
        }
    }
}

pub(crate) fn min_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Greater) => b,
        _ => a,
    }
}

pub(crate) fn max_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Less) => b,
        _ => a,
    }
}
