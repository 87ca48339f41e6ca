//! Panel constants
//!
//! Gain ranges:
//!   - Host range (outer):    -100 ... +12 dB (112 dB in total)
//!   - Ring range (inner):     -40 ... +12 dB (52 dB, 0.5 dB per ring step)
//!   - Below -40 dB the ring shows its minimum position
//!
//! Ring addressing (1-based):
//!   - Ring segments:   1-27
//!   - Layer indicators: 28-31 → layers 1-4

/// Number of segments on the LED ring
pub const LED_COUNT: usize = 27;

/// Number of states an LED pair can be in
pub const LED_PAIR_STATES: usize = 4;

/// Resolution of the ring in steps
pub const LED_STEPS: usize = (LED_COUNT - 1) * LED_PAIR_STATES;

/// Number of label layers
pub const LAYER_COUNT: usize = 4;

/// Full gain range of the host (112 dB)
pub const DB_TOTAL_GAIN: f32 = 112.0;

/// Display quantum of the ring and encoder, in steps per dB (0.5 dB steps)
pub const DB_INCREMENTS: f32 = 2.0;

/// Gain representable on the ring (52 dB)
pub const DB_REPRESENTABLE_GAIN: f32 = LED_STEPS as f32 / DB_INCREMENTS;

/// Gain below the ring's minimum position (60 dB)
pub const DB_UNREPRESENTABLE_GAIN: f32 = DB_TOTAL_GAIN - DB_REPRESENTABLE_GAIN;

/// Minimum host gain (-100 dB)
pub const DB_HOST_FLOOR: f32 = -100.0;

/// Maximum host gain (+12 dB)
pub const DB_HOST_CEILING: f32 = DB_HOST_FLOOR + DB_TOTAL_GAIN;

/// Minimum gain shown on the ring (-40 dB)
pub const DB_RING_FLOOR: f32 = DB_HOST_FLOOR + DB_UNREPRESENTABLE_GAIN;

/// Maximum gain shown on the ring (+12 dB)
pub const DB_RING_CEILING: f32 = DB_RING_FLOOR + DB_REPRESENTABLE_GAIN;

/// Clamp a decibel value to the host range
#[inline]
pub fn clamp_to_host_range(db: f32) -> f32 {
    db.clamp(DB_HOST_FLOOR, DB_HOST_CEILING)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_ranges() {
        assert_eq!(LED_STEPS, 104);
        assert_eq!(DB_REPRESENTABLE_GAIN, 52.0);
        assert_eq!(DB_UNREPRESENTABLE_GAIN, 60.0);
        assert_eq!(DB_HOST_CEILING, 12.0);
        assert_eq!(DB_RING_FLOOR, -40.0);
        assert_eq!(DB_RING_CEILING, 12.0);
        assert_eq!(DB_REPRESENTABLE_GAIN + DB_UNREPRESENTABLE_GAIN, DB_TOTAL_GAIN);
    }
}
