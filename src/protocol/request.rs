//! Typed panel requests and positional replies

use crate::error::{Error, Result};
use crate::panel::{KeyId, LedId, RingPosition};
use crate::prefs::LedIntensity;
use crate::state::PortEvent;

use super::{Event, Param};

/// Decoded panel event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Port(PortEvent),
    Identify,
    GetDeviceId,
    SetDeviceId {
        device_id: Option<i64>,
        name: Option<String>,
    },
    GetKeyState(KeyId),
    GetLedState(LedId),
    SetLedState(LedId, bool),
    GetLedIntensity,
    SetLedIntensity(LedIntensity),
    GetRingLedState(RingPosition),
    SetRingLedState(RingPosition, i64),
    GetRotationCount,
}

fn require(params: &[Param], count: usize) -> Result<()> {
    if params.len() < count {
        Err(Error::InvalidRequest)
    } else {
        Ok(())
    }
}

fn int(params: &[Param], index: usize) -> Result<i64> {
    params
        .get(index)
        .and_then(Param::as_int)
        .ok_or(Error::InvalidParameter)
}

impl Request {
    /// Decode an event and its parameters.
    ///
    /// Events this layer does not handle yield [`Error::Unhandled`].
    pub fn parse(event: Event, params: &[Param]) -> Result<Self> {
        let request = match event {
            Event::PortError => Request::Port(PortEvent::Error),
            Event::PortOpen => Request::Port(PortEvent::Open),
            Event::PortReady => Request::Port(PortEvent::Ready),
            Event::PortConnected => Request::Port(PortEvent::Connected),
            Event::PortClosed => Request::Port(PortEvent::Closed),
            Event::Identify => Request::Identify,
            Event::GetDeviceId => Request::GetDeviceId,
            Event::SetDeviceId => Request::SetDeviceId {
                // Each field is optional and recognized by type
                device_id: params.first().and_then(Param::as_int),
                name: params.get(1).and_then(Param::as_str).map(String::from),
            },
            Event::GetKeyState => {
                require(params, 1)?;
                Request::GetKeyState(KeyId::try_from(int(params, 0)?)?)
            }
            Event::GetLedState => {
                require(params, 1)?;
                Request::GetLedState(LedId::try_from(int(params, 0)?)?)
            }
            Event::SetLedState => {
                require(params, 2)?;
                let led = LedId::try_from(int(params, 0)?)?;
                Request::SetLedState(led, int(params, 1)? != 0)
            }
            Event::GetLedIntensity => Request::GetLedIntensity,
            Event::SetLedIntensity => {
                require(params, 1)?;
                Request::SetLedIntensity(LedIntensity::try_from(int(params, 0)?)?)
            }
            Event::GetRingLedState => {
                require(params, 1)?;
                Request::GetRingLedState(RingPosition::try_from(int(params, 0)?)?)
            }
            Event::SetRingLedState => {
                require(params, 2)?;
                let position = RingPosition::try_from(int(params, 0)?)?;
                Request::SetRingLedState(position, int(params, 1)?)
            }
            Event::GetRotationCount => Request::GetRotationCount,
            Event::Other(_) => return Err(Error::Unhandled),
        };

        Ok(request)
    }
}

/// Typed result of a panel request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Done,
    KeyState(bool),
    LedState(bool),
    LedIntensity(LedIntensity),
    RingLedState(i64),
    RotationCount(u16),
    DeviceId { name: String, inventory_code: String },
}

impl Reply {
    /// Insert the result at the positions the event's caller reads it from
    pub fn write_into(self, params: &mut Vec<Param>) {
        match self {
            Reply::Done => {}
            Reply::KeyState(state) | Reply::LedState(state) => insert(params, 1, state.into()),
            Reply::LedIntensity(intensity) => insert(params, 0, intensity.raw().into()),
            Reply::RingLedState(value) => insert(params, 1, value.into()),
            Reply::RotationCount(count) => insert(params, 0, (count as i64).into()),
            Reply::DeviceId {
                name,
                inventory_code,
            } => {
                insert(params, 0, name.into());
                insert(params, 1, inventory_code.into());
            }
        }
    }
}

fn insert(params: &mut Vec<Param>, index: usize, value: Param) {
    let index = index.min(params.len());
    params.insert(index, value);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<Param> {
        values.iter().map(|v| Param::Int(*v)).collect()
    }

    #[test]
    fn test_short_parameter_lists() {
        assert_eq!(
            Request::parse(Event::GetKeyState, &[]),
            Err(Error::InvalidRequest)
        );
        assert_eq!(
            Request::parse(Event::SetLedState, &ints(&[1])),
            Err(Error::InvalidRequest)
        );
        assert_eq!(
            Request::parse(Event::SetRingLedState, &ints(&[3])),
            Err(Error::InvalidRequest)
        );
    }

    #[test]
    fn test_mistyped_parameters() {
        assert_eq!(
            Request::parse(Event::GetKeyState, &[Param::from("one")]),
            Err(Error::InvalidParameter)
        );
        assert_eq!(
            Request::parse(Event::SetLedState, &[Param::Int(1), Param::from("on")]),
            Err(Error::InvalidParameter)
        );
    }

    #[test]
    fn test_out_of_range_ids() {
        assert_eq!(
            Request::parse(Event::GetKeyState, &ints(&[8])),
            Err(Error::InvalidParameter)
        );
        // The footswitch has no LED
        assert_eq!(
            Request::parse(Event::GetLedState, &ints(&[0])),
            Err(Error::InvalidParameter)
        );
        assert_eq!(
            Request::parse(Event::GetRingLedState, &ints(&[32])),
            Err(Error::InvalidParameter)
        );
        assert_eq!(
            Request::parse(Event::SetLedIntensity, &ints(&[5])),
            Err(Error::InvalidParameter)
        );
    }

    #[test]
    fn test_parse_requests() {
        assert_eq!(
            Request::parse(Event::SetLedState, &[Param::Int(7), Param::Bool(true)]),
            Ok(Request::SetLedState(KeyId::Ref.led_id().unwrap(), true))
        );
        assert_eq!(
            Request::parse(Event::SetRingLedState, &ints(&[29, 1])),
            Ok(Request::SetRingLedState(RingPosition::Layer(2), 1))
        );
        assert_eq!(
            Request::parse(Event::PortConnected, &[]),
            Ok(Request::Port(PortEvent::Connected))
        );
    }

    #[test]
    fn test_set_device_id_fields_are_optional() {
        assert_eq!(
            Request::parse(Event::SetDeviceId, &[Param::from("x"), Param::from("Booth")]),
            Ok(Request::SetDeviceId {
                device_id: None,
                name: Some("Booth".to_string()),
            })
        );
        assert_eq!(
            Request::parse(Event::SetDeviceId, &ints(&[12])),
            Ok(Request::SetDeviceId {
                device_id: Some(12),
                name: None,
            })
        );
    }

    #[test]
    fn test_unknown_event_is_unhandled() {
        assert_eq!(
            Request::parse(Event::Other(3), &[]),
            Err(Error::Unhandled)
        );
    }

    #[test]
    fn test_reply_positions() {
        let mut params = ints(&[3]);
        Reply::KeyState(true).write_into(&mut params);
        assert_eq!(params, ints(&[3, 1]));

        let mut params = ints(&[28, 9]);
        Reply::RingLedState(0).write_into(&mut params);
        assert_eq!(params, ints(&[28, 0, 9]));

        let mut params = vec![];
        Reply::RotationCount(65535).write_into(&mut params);
        assert_eq!(params, ints(&[65535]));

        let mut params = vec![];
        Reply::DeviceId {
            name: "MOM".to_string(),
            inventory_code: "50".to_string(),
        }
        .write_into(&mut params);
        assert_eq!(params, vec![Param::from("MOM"), Param::from("50")]);
    }
}
