//! LED ring codec
//!
//! The ring is built from bicolor LEDs read in pairs. Each pair can show one
//! of four states, so 27 segments give 104 steps of resolution. The position
//! is recovered by pattern matching the first pair that forms a valid state.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::protocol::*;

/// Color of a single ring segment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedColor {
    #[default]
    Off = 0,
    Green = 1,
    Red = 2,
    Orange = 3,
}

impl LedColor {
    pub fn raw(self) -> i64 {
        self as i64
    }
}

impl TryFrom<i64> for LedColor {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            0 => Ok(LedColor::Off),
            1 => Ok(LedColor::Green),
            2 => Ok(LedColor::Red),
            3 => Ok(LedColor::Orange),
            _ => Err(Error::InvalidParameter),
        }
    }
}

/// States an LED pair can be in, indexed by sub-step
const LED_LUT: [(LedColor, LedColor); LED_PAIR_STATES] = [
    (LedColor::Red, LedColor::Off),
    (LedColor::Orange, LedColor::Green),
    (LedColor::Orange, LedColor::Orange),
    (LedColor::Green, LedColor::Orange),
];

/// Ring step for a decibel value, clamping unrepresentable gain to 0
fn unscale_db(db: f32) -> usize {
    let db = clamp_to_host_range(db) - DB_RING_FLOOR;
    (db.max(0.0) * DB_INCREMENTS).round() as usize
}

/// Virtual LED ring mirroring what the host last drew
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingLedDisplay {
    leds: [LedColor; LED_COUNT],
}

impl RingLedDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ring pattern for a decibel value, the inverse of [`value`](Self::value)
    pub fn encode(db: f32) -> Self {
        let step = unscale_db(db).min(LED_STEPS);
        let (first, second) = LED_LUT[step % LED_PAIR_STATES];
        let index = step / LED_PAIR_STATES;

        let mut ring = Self::new();
        // Red at the origin is drawn as orange
        ring.leds[index] = if index == 0 && first == LedColor::Red {
            LedColor::Orange
        } else {
            first
        };
        if index + 1 < LED_COUNT {
            ring.leds[index + 1] = second;
        }
        ring
    }

    /// Ring position in steps.
    ///
    /// Returns `None` while no pair matches, which happens transiently as the
    /// host redraws the ring one segment at a time. An all-off ring is such a
    /// state and does not mean the floor.
    pub fn value(&self) -> Option<usize> {
        for i in 0..LED_COUNT {
            let mut pair = (
                self.leds[i],
                if i == LED_COUNT - 1 {
                    LedColor::Off
                } else {
                    self.leds[i + 1]
                },
            );

            if i == 0 && pair == (LedColor::Orange, LedColor::Off) {
                pair.0 = LedColor::Red;
            }

            if let Some(lut_index) = LED_LUT.iter().position(|p| *p == pair) {
                return Some(i * LED_PAIR_STATES + lut_index);
            }
        }

        None
    }

    /// Ring position in dB
    pub fn db_value(&self) -> Option<f32> {
        self.value()
            .map(|value| DB_RING_FLOOR + value as f32 / DB_INCREMENTS)
    }

    /// Set a segment (1-based).
    ///
    /// # Panics
    ///
    /// Panics if `segment` is not in `1..=LED_COUNT`.
    pub fn update(&mut self, segment: usize, color: LedColor) {
        assert!(
            (1..=LED_COUNT).contains(&segment),
            "ring segment {} out of range",
            segment
        );
        self.leds[segment - 1] = color;
    }

    /// Color of a segment (0-based)
    pub fn color_for_led(&self, index: usize) -> Option<LedColor> {
        self.leds.get(index).copied()
    }

    pub fn leds(&self) -> &[LedColor; LED_COUNT] {
        &self.leds
    }
}

/// Color a segment (1-based) should show for a decibel value.
///
/// # Panics
///
/// Panics if `segment` is not in `1..=LED_COUNT`.
pub fn color_for_db(segment: usize, db: f32) -> LedColor {
    assert!(
        (1..=LED_COUNT).contains(&segment),
        "ring segment {} out of range",
        segment
    );

    let step = unscale_db(db);
    if step / segment != 0 {
        let (odd, even) = LED_LUT[step % LED_PAIR_STATES];
        if segment % 2 != 0 {
            odd
        } else {
            even
        }
    } else {
        LedColor::Off
    }
}
