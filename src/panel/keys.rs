//! Key, LED and ring addressing
//!
//! Key numbers (1-based, 0 is the footswitch):
//!   - 1-3: source A/B/C (primary keys, labelled A/B/C by default)
//!   - 4-7: talkback, dim, cut, ref
//!
//! Every key except the footswitch carries an LED with the same number.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

use super::protocol::{LAYER_COUNT, LED_COUNT};

/// Physical control on the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyId {
    External = 0,
    SourceA = 1,
    SourceB = 2,
    SourceC = 3,
    Talkback = 4,
    Dim = 5,
    Cut = 6,
    Ref = 7,
}

impl KeyId {
    pub const ALL: [KeyId; 8] = [
        KeyId::External,
        KeyId::SourceA,
        KeyId::SourceB,
        KeyId::SourceC,
        KeyId::Talkback,
        KeyId::Dim,
        KeyId::Cut,
        KeyId::Ref,
    ];

    pub fn raw(self) -> i64 {
        self as i64
    }

    /// Suffix of the preference key holding this key's labels
    pub fn label_suffix(self) -> &'static str {
        match self {
            KeyId::External => "External",
            KeyId::SourceA => "SourceA",
            KeyId::SourceB => "SourceB",
            KeyId::SourceC => "SourceC",
            KeyId::Talkback => "Talkback",
            KeyId::Dim => "Dim",
            KeyId::Cut => "Cut",
            KeyId::Ref => "Ref",
        }
    }

    /// Keys whose default label is derived from their name
    pub fn is_primary(self) -> bool {
        self != KeyId::External && self <= KeyId::SourceC
    }

    /// LED backing this key, if any
    pub fn led_id(self) -> Option<LedId> {
        match self {
            KeyId::External => None,
            key => Some(LedId(key)),
        }
    }
}

impl TryFrom<i64> for KeyId {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        KeyId::ALL
            .iter()
            .copied()
            .find(|key| key.raw() == value)
            .ok_or(Error::InvalidParameter)
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = match self {
            KeyId::External => "Footswitch",
            KeyId::SourceA => "Source A",
            KeyId::SourceB => "Source B",
            KeyId::SourceC => "Source C",
            KeyId::Talkback => "Talkback",
            KeyId::Dim => "Dim",
            KeyId::Cut => "Cut",
            KeyId::Ref => "Ref",
        };
        f.write_str(role)
    }
}

/// LED-equipped key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedId(KeyId);

impl LedId {
    pub fn key_id(self) -> KeyId {
        self.0
    }

    pub fn raw(self) -> i64 {
        self.0.raw()
    }

    pub fn all() -> impl Iterator<Item = LedId> {
        KeyId::ALL.into_iter().filter_map(KeyId::led_id)
    }
}

impl TryFrom<i64> for LedId {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        KeyId::try_from(value)?
            .led_id()
            .ok_or(Error::InvalidParameter)
    }
}

/// Absolute ring number: gain segments followed by layer indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RingPosition {
    /// Gain ring segment, 1..=LED_COUNT
    Segment(usize),
    /// Layer indicator, 1..=LAYER_COUNT
    Layer(usize),
}

impl RingPosition {
    pub fn number(self) -> i64 {
        match self {
            RingPosition::Segment(segment) => segment as i64,
            RingPosition::Layer(layer) => (LED_COUNT + layer) as i64,
        }
    }
}

impl TryFrom<i64> for RingPosition {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        if value < 1 || value > (LED_COUNT + LAYER_COUNT) as i64 {
            return Err(Error::InvalidParameter);
        }

        let number = value as usize;
        if number <= LED_COUNT {
            Ok(RingPosition::Segment(number))
        } else {
            Ok(RingPosition::Layer(number - LED_COUNT))
        }
    }
}
