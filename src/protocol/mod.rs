//! Panel protocol: events with positional parameter lists
//!
//! The transport underneath delivers `(event, params)` and expects a status
//! plus the possibly extended parameter list back. Parameters are decoded
//! into typed [`Request`]s as soon as they arrive and results are written
//! back at each event's fixed positions by [`Reply::write_into`].

mod request;

pub use request::{Reply, Request};

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use crate::error::Status;

/// Panel protocol event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    PortError,
    PortOpen,
    PortReady,
    PortConnected,
    PortClosed,
    Identify,
    GetDeviceId,
    SetDeviceId,
    GetKeyState,
    GetLedState,
    SetLedState,
    GetLedIntensity,
    SetLedIntensity,
    GetRingLedState,
    SetRingLedState,
    GetRotationCount,
    /// Event this layer does not handle
    Other(u32),
}

/// Positional parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Param {
    Int(i64),
    Bool(bool),
    Str(String),
}

impl Param {
    /// Numeric value; booleans travel as 0/1
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Param::Int(i) => Some(*i),
            Param::Bool(b) => Some(*b as i64),
            Param::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Param::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Param::Int(value)
    }
}

impl From<bool> for Param {
    fn from(value: bool) -> Self {
        Param::Int(value as i64)
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Str(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Str(value)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Int(i) => write!(f, "{}", i),
            Param::Bool(b) => write!(f, "{}", b),
            Param::Str(s) => write!(f, "{:?}", s),
        }
    }
}

/// Notification to the panel host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelNotification {
    /// Sent immediately
    Immediate { event: Event, params: Vec<Param> },
    /// Queued and flushed as one dispatch
    Batch(Vec<(Event, Vec<Param>)>),
}

impl PanelNotification {
    /// Parameter list prefixed with the success status, as notifications
    /// carry it in place of a reply status
    pub fn success(event: Event, params: impl IntoIterator<Item = Param>) -> Self {
        PanelNotification::Immediate {
            event,
            params: with_success(params),
        }
    }

    /// Press and release of a momentary key in one dispatch
    pub fn key_down_up(key: i64) -> Self {
        PanelNotification::Batch(vec![
            (
                Event::GetKeyState,
                with_success([Param::Int(key), Param::Int(1)]),
            ),
            (
                Event::GetKeyState,
                with_success([Param::Int(key), Param::Int(0)]),
            ),
        ])
    }

    pub fn deliver(self, transport: &dyn PanelTransport) {
        match self {
            PanelNotification::Immediate { event, params } => transport.notify(event, params),
            PanelNotification::Batch(entries) => {
                for (event, params) in entries {
                    transport.notify_deferred(event, params);
                }
                transport.send_deferred();
            }
        }
    }
}

fn with_success(params: impl IntoIterator<Item = Param>) -> Vec<Param> {
    std::iter::once(Param::Int(Status::Success.code()))
        .chain(params)
        .collect()
}

/// Outbound side of the panel transport
pub trait PanelTransport: Send + Sync {
    fn notify(&self, event: Event, params: Vec<Param>);
    fn notify_deferred(&self, event: Event, params: Vec<Param>);
    fn send_deferred(&self);
}

/// Transport that only logs notifications
#[derive(Debug, Default)]
pub struct TracingTransport;

impl PanelTransport for TracingTransport {
    fn notify(&self, event: Event, params: Vec<Param>) {
        info!("Notify {:?} {}", event, format_params(&params));
    }

    fn notify_deferred(&self, event: Event, params: Vec<Param>) {
        info!("Queue {:?} {}", event, format_params(&params));
    }

    fn send_deferred(&self) {
        info!("Flush queued notifications");
    }
}

pub fn format_params(params: &[Param]) -> String {
    let items: Vec<String> = params.iter().map(|p| p.to_string()).collect();
    format!("[{}]", items.join(", "))
}
