//! LED buttons and the footswitch

use super::keys::{KeyId, LedId};

/// Side effect of a button state change on another panel object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEffect {
    /// The ref level is engaged or released, gain follows
    GainAdjustable(bool),
}

/// LED-equipped latching button
#[derive(Debug, Clone)]
pub struct Button {
    led: LedId,
    setting: bool,
}

impl Button {
    pub fn new(led: LedId) -> Self {
        Self {
            led,
            setting: false,
        }
    }

    pub fn key_id(&self) -> KeyId {
        self.led.key_id()
    }

    pub fn led_id(&self) -> LedId {
        self.led
    }

    pub fn setting(&self) -> bool {
        self.setting
    }

    /// Apply an LED state drawn by the host
    pub fn set_led_state(&mut self, on: bool) -> Option<ButtonEffect> {
        self.setting = on;
        (self.key_id() == KeyId::Ref).then_some(ButtonEffect::GainAdjustable(!on))
    }

    pub fn reset(&mut self) {
        self.setting = false;
    }
}
