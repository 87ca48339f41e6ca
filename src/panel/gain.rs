//! Stepped gain control behind the ring and encoder

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::encoder::RotaryEncoder;
use super::protocol::{clamp_to_host_range, LED_COUNT};
use super::ring::{color_for_db, LedColor, RingLedDisplay};

/// Whether a full reset also zeroes the encoder count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationResetPolicy {
    /// Keep counting across resets
    #[default]
    Preserve,
    Reset,
}

/// Outcome of a gain write
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GainChange {
    /// New gain, if it differs from the previous one
    pub gain: Option<f32>,
    /// New encoder count, if it moved
    pub rotation_count: Option<u16>,
}

/// Authoritative gain value.
///
/// Gain writes from the device side turn the virtual encoder so the host
/// follows; ring redraws from the host feed back into the gain.
#[derive(Debug, Clone)]
pub struct GainControl {
    gain: f32,
    adjustable: bool,
    ring: RingLedDisplay,
    encoder: RotaryEncoder,
}

impl Default for GainControl {
    fn default() -> Self {
        Self::new()
    }
}

impl GainControl {
    pub fn new() -> Self {
        Self {
            gain: 0.0,
            adjustable: true,
            ring: RingLedDisplay::new(),
            encoder: RotaryEncoder::new(),
        }
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn is_adjustable(&self) -> bool {
        self.adjustable
    }

    pub fn set_adjustable(&mut self, adjustable: bool) {
        if self.adjustable != adjustable {
            debug!("Gain adjustable: {}", adjustable);
        }
        self.adjustable = adjustable;
    }

    pub fn rotation_count(&self) -> u16 {
        self.encoder.rotation_count()
    }

    pub fn ring(&self) -> &RingLedDisplay {
        &self.ring
    }

    /// Set the gain in dB, clamped to the host range
    pub fn set_gain(&mut self, db: f32) -> Result<GainChange> {
        if !db.is_finite() {
            return Err(Error::InvalidParameter);
        }
        if !self.adjustable {
            return Err(Error::ParameterOutOfRange);
        }

        let db = clamp_to_host_range(db);
        let previous_count = self.encoder.rotation_count();
        self.encoder.rotate_scaled_db(db, self.gain);

        let mut change = GainChange::default();
        if self.encoder.rotation_count() != previous_count {
            change.rotation_count = Some(self.encoder.rotation_count());
        }
        if db != self.gain {
            change.gain = Some(db);
        }
        self.gain = db;

        debug!(
            "Gain set to {} dB (rotation count {})",
            db,
            self.encoder.rotation_count()
        );
        Ok(change)
    }

    /// Color a ring segment (1-based) shows for the current gain
    pub fn volume(&self, segment: usize) -> LedColor {
        color_for_db(segment, self.gain)
    }

    /// Apply a ring segment (1-based) drawn by the host.
    ///
    /// Returns the new gain if the ring now decodes to a different value.
    pub fn set_volume(&mut self, segment: usize, color: i64) -> Result<Option<f32>> {
        let color = LedColor::try_from(color)?;
        if !(1..=LED_COUNT).contains(&segment) {
            return Err(Error::InvalidParameter);
        }

        self.ring.update(segment, color);

        match self.ring.db_value() {
            Some(db) if db != self.gain => {
                self.gain = db;
                Ok(Some(db))
            }
            _ => Ok(None),
        }
    }

    pub fn reset(&mut self, policy: RotationResetPolicy) {
        self.gain = 0.0;
        self.adjustable = true;
        self.ring = RingLedDisplay::new();
        if policy == RotationResetPolicy::Reset {
            self.encoder.reset();
        }
    }
}
