//! The animation director.
//!
//! Runs a [`TransitionPlan`] as a batch of per-item tweens. Only one batch is
//! ever live: starting a new one replaces the old wholesale, which is what
//! makes supersession atomic with respect to a frame — no frame can observe
//! two batches writing the same item's transform. The superseded batch is
//! frozen at its current interpolated values first, and the new batch's
//! opacity and scale timelines continue from those values rather than
//! resetting, so rapid filter toggling never pops.

use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use tracing::trace;

use crate::animation::{Animation, Clock};
use crate::catalog::ItemId;
use crate::feed::geometry::{Delta, Rect};
use crate::feed::plan::{Transition, TransitionPlan};
use crate::feed::Options;

/// Scale that entering items grow from and exiting items shrink to.
const HIDDEN_SCALE: f64 = 0.8;

/// Identifier of an animation batch; monotonically increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BatchId(u64);

/// Transient visual state applied on top of an item's layout rect.
///
/// The director only ever writes these; the authoritative visible set and the
/// layout itself belong to the feed controller and the render surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub dx: f64,
    pub dy: f64,
    pub sx: f64,
    pub sy: f64,
    pub alpha: f64,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        dx: 0.,
        dy: 0.,
        sx: 1.,
        sy: 1.,
        alpha: 1.,
    };

    /// Applies the transform to a layout rect, anchored at the top-left.
    pub fn apply_to(self, rect: Rect) -> Rect {
        Rect {
            x: rect.x + self.dx,
            y: rect.y + self.dy,
            w: rect.w * self.sx,
            h: rect.h * self.sy,
        }
    }
}

#[derive(Debug)]
pub struct AnimationDirector {
    clock: Clock,
    options: Rc<Options>,
    batch: Option<Batch>,
    next_batch_id: u64,
}

#[derive(Debug)]
struct Batch {
    id: BatchId,
    tweens: Vec<ItemTween>,
}

#[derive(Debug)]
struct ItemTween {
    id: ItemId,
    kind: TweenKind,
    /// Opacity timeline; `None` means fully opaque throughout.
    alpha: Option<Animation>,
}

#[derive(Debug)]
enum TweenKind {
    /// Invert-then-play: `progress` runs 1 → 0 against the stored delta, so
    /// the item starts at its old on-screen rect and glides into the layout
    /// position it has already been given.
    Move { delta: Delta, progress: Animation },
    /// Scale timeline toward fully shown.
    Enter { scale: Animation },
    /// Scale timeline toward hidden. The item must stay mounted until the
    /// batch settles; its transform holds the final value until then.
    Exit { scale: Animation },
}

impl ItemTween {
    fn transform(&self) -> Transform {
        match &self.kind {
            TweenKind::Move { delta, progress } => {
                let v = progress.value();
                Transform {
                    dx: delta.dx * v,
                    dy: delta.dy * v,
                    sx: 1. + (delta.sx - 1.) * v,
                    sy: 1. + (delta.sy - 1.) * v,
                    alpha: self.alpha.as_ref().map_or(1., Animation::clamped_value),
                }
            }
            TweenKind::Enter { scale } | TweenKind::Exit { scale } => {
                let s = scale.value();
                Transform {
                    dx: 0.,
                    dy: 0.,
                    sx: s,
                    sy: s,
                    alpha: self.alpha.as_ref().map_or(1., Animation::clamped_value),
                }
            }
        }
    }

    fn is_done(&self) -> bool {
        let kind_done = match &self.kind {
            TweenKind::Move { progress, .. } => progress.is_done(),
            TweenKind::Enter { scale } | TweenKind::Exit { scale } => scale.is_done(),
        };
        kind_done && self.alpha.as_ref().map_or(true, Animation::is_done)
    }
}

impl AnimationDirector {
    pub fn new(clock: Clock, options: Rc<Options>) -> Self {
        Self {
            clock,
            options,
            batch: None,
            next_batch_id: 1,
        }
    }

    /// Starts a new batch for the plan, superseding any batch still running.
    pub fn run(&mut self, plan: &TransitionPlan) -> BatchId {
        // Freeze the superseded batch at its current interpolated values. The
        // batch replacement below is what clears its transforms; persisted
        // items pick up their frozen position through the deltas the caller
        // computed from mid-flight visual rects.
        let mut frozen: HashMap<ItemId, Transform> = HashMap::new();
        if let Some(batch) = self.batch.take() {
            trace!("superseding batch {:?}", batch.id);
            for tween in &batch.tweens {
                frozen.insert(tween.id.clone(), tween.transform());
            }
        }

        let id = BatchId(self.next_batch_id);
        self.next_batch_id += 1;

        let anims = &self.options.animations;
        let stagger = Duration::from_millis(u64::from(anims.stagger_ms));

        // Stagger indices count per class.
        let mut moves = 0u32;
        let mut enters = 0u32;
        let mut exits = 0u32;

        let mut tweens = Vec::with_capacity(plan.len());
        for entry in plan.iter() {
            let tween = match entry.transition {
                Transition::Persisted { delta } => {
                    let delay = stagger * moves;
                    moves += 1;

                    // An item revived mid-exit or caught mid-enter fades the
                    // rest of the way back in.
                    let alpha = frozen
                        .get(&entry.id)
                        .filter(|t| t.alpha < 1.)
                        .map(|t| self.animation(t.alpha, 1., anims.item_enter, delay));

                    ItemTween {
                        id: entry.id.clone(),
                        kind: TweenKind::Move {
                            delta,
                            progress: self.animation(1., 0., anims.item_movement, delay),
                        },
                        alpha,
                    }
                }
                Transition::Entering => {
                    let delay = stagger * enters;
                    enters += 1;

                    let (from_alpha, from_scale) = frozen
                        .get(&entry.id)
                        .map_or((0., HIDDEN_SCALE), |t| (t.alpha, t.sx));

                    ItemTween {
                        id: entry.id.clone(),
                        kind: TweenKind::Enter {
                            scale: self.animation(from_scale, 1., anims.item_enter, delay),
                        },
                        alpha: Some(self.animation(from_alpha, 1., anims.item_enter, delay)),
                    }
                }
                Transition::Exiting => {
                    let delay = stagger * exits;
                    exits += 1;

                    let (from_alpha, from_scale) = frozen
                        .get(&entry.id)
                        .map_or((1., 1.), |t| (t.alpha, t.sx));

                    ItemTween {
                        id: entry.id.clone(),
                        kind: TweenKind::Exit {
                            scale: self.animation(from_scale, HIDDEN_SCALE, anims.item_exit, delay),
                        },
                        alpha: Some(self.animation(from_alpha, 0., anims.item_exit, delay)),
                    }
                }
            };
            tweens.push(tween);
        }

        trace!(
            "batch {id:?}: {moves} persisted, {enters} entering, {exits} exiting"
        );
        self.batch = Some(Batch { id, tweens });
        id
    }

    fn animation(
        &self,
        from: f64,
        to: f64,
        mut config: lostfound_config::Animation,
        delay: Duration,
    ) -> Animation {
        config.off |= self.options.animations.off;
        Animation::new(self.clock.clone(), from, to, config)
            .slowed_down(self.options.animations.slowdown)
            .with_delay(delay)
    }

    /// Reaps the batch once every tween has finished.
    ///
    /// Returns the id of the batch that just settled, if any; the caller uses
    /// it to finally unmount exited items.
    pub fn advance_animations(&mut self) -> Option<BatchId> {
        let settled = self
            .batch
            .as_ref()
            .is_some_and(|batch| batch.tweens.iter().all(ItemTween::is_done));
        if !settled {
            return None;
        }

        let batch = self.batch.take().unwrap();
        trace!("batch {:?} settled", batch.id);
        Some(batch.id)
    }

    pub fn are_animations_ongoing(&self) -> bool {
        self.batch.is_some()
    }

    pub fn current_batch(&self) -> Option<BatchId> {
        self.batch.as_ref().map(|batch| batch.id)
    }

    /// Current visual transform for an item; identity when nothing is
    /// animating it.
    pub fn transform_of(&self, id: &ItemId) -> Transform {
        self.batch
            .as_ref()
            .and_then(|batch| batch.tweens.iter().find(|tween| tween.id == *id))
            .map_or(Transform::IDENTITY, ItemTween::transform)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::feed::plan::PlanEntry;
    use crate::feed::tests::test_options;

    const STEP: Duration = Duration::from_millis(10);

    fn persisted(id: &str, dx: f64, dy: f64) -> PlanEntry {
        PlanEntry {
            id: ItemId::from(id),
            transition: Transition::Persisted {
                delta: Delta {
                    dx,
                    dy,
                    sx: 1.,
                    sy: 1.,
                },
            },
        }
    }

    fn entering(id: &str) -> PlanEntry {
        PlanEntry {
            id: ItemId::from(id),
            transition: Transition::Entering,
        }
    }

    fn exiting(id: &str) -> PlanEntry {
        PlanEntry {
            id: ItemId::from(id),
            transition: Transition::Exiting,
        }
    }

    fn director() -> (Clock, AnimationDirector) {
        let clock = Clock::new();
        let director = AnimationDirector::new(clock.clone(), test_options());
        (clock, director)
    }

    #[test]
    fn invert_then_play() {
        let (clock, mut director) = director();
        // Test options: linear 100 ms movement, 10 ms stagger.
        let plan = TransitionPlan::from_entries(vec![persisted("a", 100., -40.)]);
        director.run(&plan);

        // At start the full inverse delta is applied.
        let t = director.transform_of(&ItemId::from("a"));
        assert_abs_diff_eq!(t.dx, 100.);
        assert_abs_diff_eq!(t.dy, -40.);
        assert_abs_diff_eq!(t.alpha, 1.);

        // Halfway through the offset has half decayed.
        clock.advance(Duration::from_millis(50));
        let t = director.transform_of(&ItemId::from("a"));
        assert_abs_diff_eq!(t.dx, 50.);
        assert_abs_diff_eq!(t.dy, -20.);

        // Done: offset gone, batch settles.
        clock.advance(Duration::from_millis(50));
        let t = director.transform_of(&ItemId::from("a"));
        assert_abs_diff_eq!(t.dx, 0.);
        assert!(director.advance_animations().is_some());
        assert!(!director.are_animations_ongoing());
        assert_eq!(director.transform_of(&ItemId::from("a")), Transform::IDENTITY);
    }

    #[test]
    fn stagger_delays_later_items() {
        let (clock, mut director) = director();
        let plan = TransitionPlan::from_entries(vec![
            persisted("a", 100., 0.),
            persisted("b", 100., 0.),
        ]);
        director.run(&plan);

        clock.advance(STEP);
        let a = director.transform_of(&ItemId::from("a"));
        let b = director.transform_of(&ItemId::from("b"));
        // "a" started immediately, "b" only starts now.
        assert_abs_diff_eq!(a.dx, 90.);
        assert_abs_diff_eq!(b.dx, 100.);
    }

    #[test]
    fn stagger_counts_per_class() {
        let (clock, mut director) = director();
        let plan = TransitionPlan::from_entries(vec![
            persisted("a", 100., 0.),
            entering("b"),
            exiting("c"),
        ]);
        director.run(&plan);

        // Each item is first in its own class, so none of them is delayed.
        clock.advance(Duration::from_millis(100));
        assert!(director.advance_animations().is_some());
    }

    #[test]
    fn enter_and_exit_endpoints() {
        let (clock, mut director) = director();
        let plan = TransitionPlan::from_entries(vec![entering("in"), exiting("out")]);
        director.run(&plan);

        let t = director.transform_of(&ItemId::from("in"));
        assert_abs_diff_eq!(t.alpha, 0.);
        assert_abs_diff_eq!(t.sx, HIDDEN_SCALE);

        let t = director.transform_of(&ItemId::from("out"));
        assert_abs_diff_eq!(t.alpha, 1.);
        assert_abs_diff_eq!(t.sx, 1.);

        clock.advance(Duration::from_millis(100));
        let t = director.transform_of(&ItemId::from("in"));
        assert_abs_diff_eq!(t.alpha, 1.);
        assert_abs_diff_eq!(t.sx, 1.);

        // The exited item holds its hidden state until the batch is reaped.
        let t = director.transform_of(&ItemId::from("out"));
        assert_abs_diff_eq!(t.alpha, 0.);
        assert_abs_diff_eq!(t.sx, HIDDEN_SCALE);
    }

    #[test]
    fn supersession_freezes_and_continues() {
        let (clock, mut director) = director();
        let first = director.run(&TransitionPlan::from_entries(vec![exiting("a")]));

        // Halfway out: alpha 0.5, scale 0.9.
        clock.advance(Duration::from_millis(50));
        let mid = director.transform_of(&ItemId::from("a"));
        assert_abs_diff_eq!(mid.alpha, 0.5);
        assert_abs_diff_eq!(mid.sx, 0.9);

        // Revive as entering; the new tween continues from the frozen values.
        let second = director.run(&TransitionPlan::from_entries(vec![entering("a")]));
        assert!(second > first);
        let t = director.transform_of(&ItemId::from("a"));
        assert_abs_diff_eq!(t.alpha, 0.5);
        assert_abs_diff_eq!(t.sx, 0.9);

        // Only one tween registry remains, with one tween for the item.
        let batch = director.batch.as_ref().unwrap();
        assert_eq!(batch.tweens.len(), 1);
        assert_eq!(director.current_batch(), Some(second));

        clock.advance(Duration::from_millis(100));
        let t = director.transform_of(&ItemId::from("a"));
        assert_abs_diff_eq!(t.alpha, 1.);
        assert_abs_diff_eq!(t.sx, 1.);
    }

    #[test]
    fn batch_ids_are_monotonic() {
        let (_clock, mut director) = director();
        let a = director.run(&TransitionPlan::default());
        let b = director.run(&TransitionPlan::default());
        let c = director.run(&TransitionPlan::default());
        assert!(a < b && b < c);
    }

    #[test]
    fn empty_batch_settles_immediately() {
        let (_clock, mut director) = director();
        let id = director.run(&TransitionPlan::default());
        assert_eq!(director.advance_animations(), Some(id));
        assert!(director.advance_animations().is_none());
    }

    #[test]
    fn animations_off_settles_on_first_advance() {
        let clock = Clock::new();
        let mut options = crate::feed::Options::default();
        options.animations.off = true;
        let mut director = AnimationDirector::new(clock, Rc::new(options));

        director.run(&TransitionPlan::from_entries(vec![
            persisted("a", 100., 0.),
            entering("b"),
            exiting("c"),
        ]));
        assert_eq!(director.transform_of(&ItemId::from("a")), Transform::IDENTITY);
        assert!(director.advance_animations().is_some());
    }
}
