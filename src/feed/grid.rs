//! Fixed-column grid surface.
//!
//! Minimal [`RenderSurface`] for the demo binary and tests: cards of a fixed
//! size flow left to right into a configurable number of columns, like the
//! original feed grid.

use std::collections::HashMap;

use crate::catalog::ItemId;
use crate::feed::geometry::Rect;
use crate::feed::RenderSurface;

#[derive(Debug)]
pub struct GridSurface {
    columns: usize,
    gap: f64,
    card_width: f64,
    card_height: f64,
    slots: HashMap<ItemId, Rect>,
}

impl GridSurface {
    pub fn new(config: &lostfound_config::Feed) -> Self {
        Self {
            columns: config.columns.max(1),
            gap: config.gap,
            card_width: config.card_size.width,
            card_height: config.card_size.height,
            slots: HashMap::new(),
        }
    }

    fn slot_rect(&self, idx: usize) -> Rect {
        let col = idx % self.columns;
        let row = idx / self.columns;
        Rect::new(
            col as f64 * (self.card_width + self.gap),
            row as f64 * (self.card_height + self.gap),
            self.card_width,
            self.card_height,
        )
    }
}

impl RenderSurface for GridSurface {
    fn rect_of(&self, id: &ItemId) -> Option<Rect> {
        self.slots.get(id).copied()
    }

    fn relayout(&mut self, visible: &[ItemId]) {
        self.slots = visible
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.clone(), self.slot_rect(idx)))
            .collect();
    }
}
