//! Selected label layer

use tracing::debug;

use super::protocol::LAYER_COUNT;

/// Layer indicator lights around the ring.
///
/// Every key label depends on the selected layer, so selecting one requires
/// all labels to be republished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerIndicator {
    selected: usize,
}

impl Default for LayerIndicator {
    fn default() -> Self {
        Self { selected: 1 }
    }
}

impl LayerIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn is_layer_selected(&self, layer: usize) -> bool {
        debug_assert!((1..=LAYER_COUNT).contains(&layer));
        self.selected == layer
    }

    /// Apply a layer indicator state drawn by the host.
    ///
    /// Only state 1 selects; returns whether labels need refreshing.
    pub fn set_selected_layer(&mut self, layer: usize, state: i64) -> bool {
        debug_assert!((1..=LAYER_COUNT).contains(&layer));

        if state != 1 {
            return false;
        }

        debug!("Selected layer {}", layer);
        self.selected = layer;
        true
    }

    pub fn reset(&mut self) {
        self.selected = 1;
    }
}
