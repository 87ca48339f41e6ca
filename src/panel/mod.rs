//! Panel model: buttons, footswitch, gain ring, encoder and layer indicators

mod button;
mod encoder;
mod gain;
mod keys;
pub mod labels;
mod layer;
mod protocol;
mod ring;

pub use button::{Button, ButtonEffect};
pub use encoder::RotaryEncoder;
pub use gain::{GainChange, GainControl, RotationResetPolicy};
pub use keys::{KeyId, LedId, RingPosition};
pub use layer::LayerIndicator;
pub use protocol::*;
pub use ring::{color_for_db, LedColor, RingLedDisplay};

use crate::error::Result;

/// Result of a ring state write
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RingUpdate {
    /// A gain segment changed; carries the new gain if it moved
    Gain(Option<f32>),
    /// A layer indicator changed; carries whether a layer was selected
    Layer(bool),
}

/// Transient panel state
#[derive(Debug, Clone)]
pub struct Panel {
    buttons: Vec<Button>,
    pub gain: GainControl,
    pub layer: LayerIndicator,
}

impl Default for Panel {
    fn default() -> Self {
        Self::new()
    }
}

impl Panel {
    pub fn new() -> Self {
        Self {
            buttons: LedId::all().map(Button::new).collect(),
            gain: GainControl::new(),
            layer: LayerIndicator::new(),
        }
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    pub fn button(&self, led: LedId) -> &Button {
        &self.buttons[Self::index(led)]
    }

    /// Whether a key is down; the footswitch is momentary and always reads up
    pub fn key_state(&self, key: KeyId) -> bool {
        key.led_id()
            .map(|led| self.button(led).setting())
            .unwrap_or(false)
    }

    /// Apply an LED state drawn by the host and route the button's effect
    pub fn set_led_state(&mut self, led: LedId, on: bool) {
        let effect = self.buttons[Self::index(led)].set_led_state(on);
        if let Some(effect) = effect {
            self.apply(effect);
        }
    }

    fn apply(&mut self, effect: ButtonEffect) {
        match effect {
            ButtonEffect::GainAdjustable(adjustable) => self.gain.set_adjustable(adjustable),
        }
    }

    /// Current value at a ring position: segment color or layer selection
    pub fn ring_state(&self, position: RingPosition) -> i64 {
        match position {
            RingPosition::Segment(segment) => self.gain.volume(segment).raw(),
            RingPosition::Layer(layer) => self.layer.is_layer_selected(layer) as i64,
        }
    }

    pub fn set_ring_state(&mut self, position: RingPosition, value: i64) -> Result<RingUpdate> {
        match position {
            RingPosition::Segment(segment) => {
                Ok(RingUpdate::Gain(self.gain.set_volume(segment, value)?))
            }
            RingPosition::Layer(layer) => {
                Ok(RingUpdate::Layer(self.layer.set_selected_layer(layer, value)))
            }
        }
    }

    pub fn reset(&mut self, policy: RotationResetPolicy) {
        for button in &mut self.buttons {
            button.reset();
        }
        self.gain.reset(policy);
        self.layer.reset();
    }

    fn index(led: LedId) -> usize {
        // LED numbers start at 1
        led.raw() as usize - 1
    }
}
