//! Geometry capture and the invert-then-play delta.
//!
//! A filter change is animated by capturing on-screen rectangles before the
//! mutation (First), capturing them again after relayout (Last), computing the
//! inverse offset (Invert) and animating it away (Play). The capture and the
//! delta are pure data transformations; only the director is stateful.

use std::collections::HashMap;

use crate::catalog::ItemId;
use crate::feed::RenderSurface;

/// On-screen rectangle in the shared feed coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

/// Rectangles of a set of items at a single instant.
///
/// Ephemeral: captured synchronously, consumed by the planner, discarded. Ids
/// that were not laid out at capture time are simply absent.
#[derive(Debug, Clone, Default)]
pub struct GeometrySnapshot {
    rects: HashMap<ItemId, Rect>,
}

impl GeometrySnapshot {
    /// Captures the current rectangles of the given ids from a surface.
    pub fn capture<'a>(
        surface: &impl RenderSurface,
        ids: impl IntoIterator<Item = &'a ItemId>,
    ) -> Self {
        ids.into_iter()
            .filter_map(|id| surface.rect_of(id).map(|rect| (id.clone(), rect)))
            .collect()
    }

    pub fn get(&self, id: &ItemId) -> Option<Rect> {
        self.rects.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

impl FromIterator<(ItemId, Rect)> for GeometrySnapshot {
    fn from_iter<T: IntoIterator<Item = (ItemId, Rect)>>(iter: T) -> Self {
        Self {
            rects: iter.into_iter().collect(),
        }
    }
}

/// Offset from an item's old on-screen rectangle to its new layout position.
///
/// Applying the delta to the new rectangle reproduces the old one: translation
/// is the difference of the top-left corners, scale is the ratio of the sizes.
/// All transforms here anchor at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Delta {
    pub dx: f64,
    pub dy: f64,
    pub sx: f64,
    pub sy: f64,
}

impl Delta {
    /// Computes `before − after` componentwise.
    ///
    /// Degenerate sizes fall back to a scale of 1 so that one zero-sized rect
    /// cannot poison a batch with non-finite values.
    pub fn between(before: Rect, after: Rect) -> Self {
        fn ratio(before: f64, after: f64) -> f64 {
            let r = before / after;
            if r.is_finite() && r > 0. {
                r
            } else {
                1.
            }
        }

        Self {
            dx: before.x - after.x,
            dy: before.y - after.y,
            sx: ratio(before.w, after.w),
            sy: ratio(before.h, after.h),
        }
    }

    pub fn is_identity(self) -> bool {
        const EPSILON: f64 = 1e-6;
        self.dx.abs() < EPSILON
            && self.dy.abs() < EPSILON
            && (self.sx - 1.).abs() < EPSILON
            && (self.sy - 1.).abs() < EPSILON
    }
}
