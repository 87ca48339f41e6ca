//! Virtual rotary encoder

use super::protocol::{DB_HOST_CEILING, DB_HOST_FLOOR, DB_INCREMENTS};

/// Relative detent counter of an incremental encoder.
///
/// The count wraps in both directions like the hardware register it stands
/// in for; only differences between readings are meaningful.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotaryEncoder {
    rotation_count: u16,
}

impl RotaryEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rotation_count(&self) -> u16 {
        self.rotation_count
    }

    /// Turn by a signed number of detents
    pub fn rotate(&mut self, steps: i32) {
        // Truncation is reduction modulo 2^16
        self.rotation_count = self.rotation_count.wrapping_add(steps as u16);
    }

    /// Turn by the number of detents between two host gain values
    pub fn rotate_scaled_db(&mut self, to: f32, from: f32) {
        let steps = Self::unscale_db(to) - Self::unscale_db(from);
        self.rotate(steps);
    }

    pub fn reset(&mut self) {
        self.rotation_count = 0;
    }

    /// Detents from the host floor to `db`: one per display quantum, so
    /// `DB_INCREMENTS` per dB (-6 dB is 188, 0 dB is 200).
    fn unscale_db(db: f32) -> i32 {
        debug_assert!(
            (DB_HOST_FLOOR..=DB_HOST_CEILING).contains(&db),
            "{} dB outside host range",
            db
        );
        ((db - DB_HOST_FLOOR) * DB_INCREMENTS).round() as i32
    }
}
