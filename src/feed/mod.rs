//! The animated item feed.
//!
//! A filter change must not snap: cards that stay visible glide between grid
//! slots, new cards fade in, removed cards fade out in place. This works by
//! the FLIP technique — capture geometry before the mutation, capture it after,
//! compute per-item inverse deltas and animate them away — orchestrated by a
//! small state machine:
//!
//! ```text
//! Idle → PreCapture → Mutated → PostCapture → Animating → Idle
//! ```
//!
//! All of it runs on one thread; "concurrency" is overlapping animation
//! timelines, driven by [`advance_animations`](Feed::advance_animations) from
//! the frame loop. A filter change arriving mid-animation restarts the
//! pipeline from whatever is currently on screen and supersedes the running
//! batch, never queues behind it.

use std::collections::HashSet;
use std::fmt;
use std::mem;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::animation::Clock;
use crate::catalog::{ItemCatalog, ItemId};
use crate::filter::{compute_visible, Filter};

pub mod director;
pub mod geometry;
pub mod grid;
pub mod plan;


use self::director::{AnimationDirector, BatchId, Transform};
use self::geometry::{GeometrySnapshot, Rect};

/// The rendering layer, as seen by the feed.
///
/// The feed never renders anything itself; it only needs item geometry to be
/// queryable synchronously at its two capture checkpoints, and a way to ask
/// for a relayout when the visible set changes.
pub trait RenderSurface {
    /// Returns the current laid-out rectangle of an item.
    ///
    /// Must reflect the surface's layout at the instant of the call; items not
    /// currently laid out return `None`.
    fn rect_of(&self, id: &ItemId) -> Option<Rect>;

    /// Re-lays out the surface for a new visible set.
    ///
    /// Called in the middle of a filter change, after the new visible set has
    /// been computed and before the "after" snapshot is taken. Items absent
    /// from `visible` leave the layout flow; the feed keeps rendering exiting
    /// items itself at their captured rects.
    fn relayout(&mut self, visible: &[ItemId]);
}

/// Configurable properties of the feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    pub feed: lostfound_config::Feed,
    pub animations: lostfound_config::Animations,
}

impl Options {
    pub fn from_config(config: &lostfound_config::Config) -> Self {
        Self {
            feed: config.feed,
            animations: config.animations.clone(),
        }
    }
}

/// Top-level controller of the feed.
///
/// Owns the authoritative filter state and visible set, sequences the
/// capture → mutate → capture → plan → animate pipeline, and defers unmounting
/// of exiting items until their batch settles.
pub struct Feed {
    catalog: ItemCatalog,
    filter: Filter,
    /// The visible set for the current filter, in catalog order.
    visible: Vec<ItemId>,
    /// Items animating out, with the rect they were last laid out at. Still
    /// mounted until the current batch settles.
    exiting: Vec<(ItemId, Rect)>,
    director: AnimationDirector,
    clock: Clock,
    settled_cb: Option<Box<dyn FnMut(BatchId)>>,
}

impl Feed {
    pub fn new(catalog: ItemCatalog, clock: Clock, options: Rc<Options>) -> Self {
        let visible = compute_visible(&catalog, Filter::default());
        Self {
            catalog,
            filter: Filter::default(),
            visible,
            exiting: Vec::new(),
            director: AnimationDirector::new(clock.clone(), options),
            clock,
            settled_cb: None,
        }
    }

    /// Lays out the initial visible set, without animating.
    pub fn mount(&mut self, surface: &mut impl RenderSurface) {
        surface.relayout(&self.visible);
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    /// Ids the presentation layer should currently keep mounted: the visible
    /// set plus any items still animating out.
    pub fn visible_items(&self) -> impl Iterator<Item = &ItemId> {
        self.visible
            .iter()
            .chain(self.exiting.iter().map(|(id, _)| id))
    }

    /// Whether the current filter matched nothing.
    ///
    /// The caller renders an explicit empty state for this; it is not an
    /// error.
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// Changes the active filter, animating the feed to its new layout.
    ///
    /// Safe to call while a previous change is still animating: the pipeline
    /// restarts from the current on-screen geometry and the running batch is
    /// superseded.
    pub fn set_filter(&mut self, filter: Filter, surface: &mut impl RenderSurface) -> BatchId {
        debug!("filter change: {} -> {filter}", self.filter);

        // PreCapture: snapshot everything currently on screen, including
        // mid-flight interpolated positions of a still-running batch.
        let old_ids: Vec<ItemId> = self.visible_items().cloned().collect();
        let before: GeometrySnapshot = old_ids
            .iter()
            .filter_map(|id| {
                self.visual_rect(&*surface, id)
                    .map(|rect| (id.clone(), rect))
            })
            .collect();

        // Mutated: new filter, new visible set, relayout.
        self.filter = filter;
        let new_visible = compute_visible(&self.catalog, filter);
        surface.relayout(&new_visible);

        // Items leaving the visible set stay mounted at their captured rect
        // until the batch settles. An item already mid-exit keeps the rect it
        // was mounted at rather than its transform-adjusted visual rect; the
        // director seeds the new exit tween from the frozen scale, which must
        // keep applying to the same base. An item that never had a rect has
        // nothing to fade out.
        let new_set: HashSet<&ItemId> = new_visible.iter().collect();
        let prev_exiting = mem::take(&mut self.exiting);
        self.exiting = old_ids
            .iter()
            .filter(|id| !new_set.contains(id))
            .filter_map(|id| {
                prev_exiting
                    .iter()
                    .find_map(|(eid, rect)| (eid == id).then_some(*rect))
                    .or_else(|| before.get(id))
                    .map(|rect| (id.clone(), rect))
            })
            .collect();
        drop(new_set);
        self.visible = new_visible;

        // PostCapture: the freshly laid-out rects are the animation targets.
        let after = GeometrySnapshot::capture(&*surface, &self.visible);

        // Animate.
        let plan = plan::plan(&before, &after, &old_ids, &self.visible);
        trace!(
            "planned {} transitions ({} exiting)",
            plan.len(),
            self.exiting.len()
        );
        self.director.run(&plan)
    }

    /// Drives the animation batch; to be called once per frame.
    ///
    /// When the batch settles this unmounts exited items and fires the
    /// batch-settled callback.
    pub fn advance_animations(&mut self) {
        if let Some(batch) = self.director.advance_animations() {
            if !self.exiting.is_empty() {
                trace!("unmounting {} exited items", self.exiting.len());
                self.exiting.clear();
            }
            if let Some(cb) = &mut self.settled_cb {
                cb(batch);
            }
        }
    }

    pub fn are_animations_ongoing(&self) -> bool {
        self.director.are_animations_ongoing()
    }

    /// Registers a callback invoked whenever an animation batch settles.
    pub fn on_batch_settled(&mut self, cb: impl FnMut(BatchId) + 'static) {
        self.settled_cb = Some(Box::new(cb));
    }

    /// Current visual transform of an item, for the renderer.
    pub fn transform_of(&self, id: &ItemId) -> Transform {
        self.director.transform_of(id)
    }

    /// The rect an item is actually drawn at right now: its layout rect (or
    /// its captured rect while exiting) with the director's live transform
    /// applied.
    pub fn visual_rect(&self, surface: &impl RenderSurface, id: &ItemId) -> Option<Rect> {
        let rect = match self.exiting.iter().find(|(eid, _)| eid == id) {
            Some((_, rect)) => Some(*rect),
            None => surface.rect_of(id),
        }?;
        Some(self.director.transform_of(id).apply_to(rect))
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }
}

impl fmt::Debug for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feed")
            .field("filter", &self.filter)
            .field("visible", &self.visible)
            .field("exiting", &self.exiting)
            .field("director", &self.director)
            .finish_non_exhaustive()
    }
}
