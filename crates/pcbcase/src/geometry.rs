//! Vector and bounding-box helpers shared by every enclosure component.
//!
//! All positions are millimeters. [`BoundingBox`] is the workhorse: slots,
//! restriction volumes, half-space cutters and the board itself are all
//! expressed as boxes before being turned into CSG primitives.

use nalgebra::{SVector, Vector3};

/// Overlap added to cutters and unions so that faces never coincide.
///
/// Coplanar faces in a boolean make mesh engines emit zero-thickness skins,
/// so every cutter is pushed this far past the surface it cuts.
pub const EPSILON: f64 = 0.01;

/// A coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// X axis (left to right).
    X,
    /// Y axis (front to rear).
    Y,
    /// Z axis (bottom to top).
    Z,
}

impl Axis {
    /// All three axes in order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index of this axis.
    pub const fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Axis-aligned box given by its minimum corner and non-negative size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Component-wise minimum.
    pub origin: Vector3<f64>,
    /// Extent along each axis.
    pub size: Vector3<f64>,
}

impl BoundingBox {
    /// Box from an origin and a size; negative size components are clamped to zero.
    pub fn new(origin: Vector3<f64>, size: Vector3<f64>) -> Self {
        Self {
            origin,
            size: size.map(|s| s.max(0.0)),
        }
    }

    /// Box spanned by two opposite corners, in any order.
    pub fn from_corners(a: Vector3<f64>, b: Vector3<f64>) -> Self {
        let min = a.inf(&b);
        let max = a.sup(&b);
        Self::new(min, max - min)
    }

    /// Component-wise maximum.
    pub fn max(&self) -> Vector3<f64> {
        self.origin + self.size
    }

    /// Center point.
    pub fn center(&self) -> Vector3<f64> {
        self.origin + self.size / 2.0
    }

    /// Lower bound along `axis`.
    pub fn low(&self, axis: Axis) -> f64 {
        self.origin[axis.index()]
    }

    /// Upper bound along `axis`.
    pub fn high(&self, axis: Axis) -> f64 {
        self.origin[axis.index()] + self.size[axis.index()]
    }

    /// True if any extent is zero.
    pub fn is_degenerate(&self) -> bool {
        self.size.iter().any(|&s| s <= 0.0)
    }

    /// The same box shifted by `offset`.
    pub fn translated(&self, offset: Vector3<f64>) -> Self {
        Self::new(self.origin + offset, self.size)
    }

    /// True if `other` lies inside this box, allowing `eps` slack on every face.
    pub fn contains_box(&self, other: &BoundingBox, eps: f64) -> bool {
        Axis::ALL.iter().all(|&a| {
            other.low(a) >= self.low(a) - eps && other.high(a) <= self.high(a) + eps
        })
    }

    /// Overlapping region, or `None` when the boxes are disjoint.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        let min = self.origin.sup(&other.origin);
        let max = self.max().inf(&other.max());
        if (0..3).any(|i| max[i] < min[i]) {
            return None;
        }
        Some(BoundingBox::new(min, max - min))
    }

    /// The eight corners.
    pub fn corners(&self) -> [Vector3<f64>; 8] {
        let (lo, hi) = (self.origin, self.max());
        let mut out = [lo; 8];
        for (i, c) in out.iter_mut().enumerate() {
            *c = Vector3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            );
        }
        out
    }
}

/// Smallest box containing every point.
///
/// An empty list yields the degenerate box at the origin.
pub fn bounding_box_of(points: &[Vector3<f64>]) -> BoundingBox {
    let Some(first) = points.first() else {
        return BoundingBox::new(Vector3::zeros(), Vector3::zeros());
    };
    let (min, max) = points
        .iter()
        .skip(1)
        .fold((*first, *first), |(lo, hi), p| (lo.inf(p), hi.sup(p)));
    BoundingBox::new(min, max - min)
}

/// Union bounding box: min of origins, max of far corners.
///
/// An empty list yields the degenerate box at the origin.
pub fn merge_boxes(boxes: &[BoundingBox]) -> BoundingBox {
    let points: Vec<Vector3<f64>> = boxes.iter().flat_map(|b| [b.origin, b.max()]).collect();
    bounding_box_of(&points)
}

/// Copy of `v` with the listed `(index, value)` components replaced.
///
/// Out-of-range indices are ignored.
pub fn replace_components<const D: usize>(
    v: &SVector<f64, D>,
    overrides: &[(usize, f64)],
) -> SVector<f64, D> {
    let mut out = *v;
    for &(i, value) in overrides {
        if i < D {
            out[i] = value;
        }
    }
    out
}

/// Builds a box axis by axis from reference boxes, explicit overrides and deltas.
///
/// For each axis named in [`BoxBuilder::from_axes`] the bounds default to the
/// reference boxes' min/max; any other axis defaults to zero and is expected
/// to be overridden. Deltas are added after the override/fallback choice.
/// This is how a 2D rectangle on a wall becomes a 3D box: the two in-plane
/// axes come from the rectangle, the through-wall axis is overridden.
///
/// ```
/// use nalgebra::Vector3;
/// use pcbcase::geometry::{Axis, BoundingBox, BoxBuilder};
///
/// let rect = BoundingBox::from_corners(Vector3::new(0.0, 5.0, 0.0), Vector3::new(0.0, 10.0, 2.0));
/// let slot = BoxBuilder::from_axes(&[rect], &[Axis::Y, Axis::Z])
///     .override_low(Axis::X, -3.0)
///     .override_high(Axis::X, -1.0)
///     .grow(Axis::X, 0.5)
///     .build();
/// assert_eq!(slot.low(Axis::Y), 5.0);
/// assert_eq!(slot.high(Axis::X), -0.5);
/// ```
#[derive(Debug, Clone)]
pub struct BoxBuilder {
    reference: Option<BoundingBox>,
    masked: [bool; 3],
    low: [Option<f64>; 3],
    high: [Option<f64>; 3],
    delta_low: [f64; 3],
    delta_high: [f64; 3],
}

impl BoxBuilder {
    /// Start from the merged reference boxes, taking bounds only along `axes`.
    #[must_use]
    pub fn from_axes(reference: &[BoundingBox], axes: &[Axis]) -> Self {
        let mut masked = [false; 3];
        for a in axes {
            masked[a.index()] = true;
        }
        Self {
            reference: (!reference.is_empty()).then(|| merge_boxes(reference)),
            masked,
            low: [None; 3],
            high: [None; 3],
            delta_low: [0.0; 3],
            delta_high: [0.0; 3],
        }
    }

    /// Start from `reference` on all three axes.
    #[must_use]
    pub fn from_box(reference: &BoundingBox) -> Self {
        Self::from_axes(std::slice::from_ref(reference), &Axis::ALL)
    }

    /// Force the lower bound along `axis`.
    #[must_use]
    pub fn override_low(mut self, axis: Axis, value: f64) -> Self {
        self.low[axis.index()] = Some(value);
        self
    }

    /// Force the upper bound along `axis`.
    #[must_use]
    pub fn override_high(mut self, axis: Axis, value: f64) -> Self {
        self.high[axis.index()] = Some(value);
        self
    }

    /// Add `delta` to the lower bound along `axis`.
    #[must_use]
    pub fn delta_low(mut self, axis: Axis, delta: f64) -> Self {
        self.delta_low[axis.index()] += delta;
        self
    }

    /// Add `delta` to the upper bound along `axis`.
    #[must_use]
    pub fn delta_high(mut self, axis: Axis, delta: f64) -> Self {
        self.delta_high[axis.index()] += delta;
        self
    }

    /// Push both bounds along `axis` outward by `amount` (inward if negative).
    #[must_use]
    pub fn grow(self, axis: Axis, amount: f64) -> Self {
        self.delta_low(axis, -amount).delta_high(axis, amount)
    }

    /// Resolve into a box.
    pub fn build(&self) -> BoundingBox {
        let mut min = Vector3::zeros();
        let mut max = Vector3::zeros();
        for i in 0..3 {
            let (ref_lo, ref_hi) = match (&self.reference, self.masked[i]) {
                (Some(r), true) => (r.origin[i], r.origin[i] + r.size[i]),
                _ => (0.0, 0.0),
            };
            min[i] = self.low[i].unwrap_or(ref_lo) + self.delta_low[i];
            max[i] = self.high[i].unwrap_or(ref_hi) + self.delta_high[i];
        }
        BoundingBox::new(min, max - min)
    }
}
