use serde::{Deserialize, Serialize};
use tracing::info;

/// Connection state of the panel port
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceState {
    #[default]
    Closed,
    Initializing,
    Updating,
    Operational,
    Error,
}

impl DeviceState {
    /// Whether writes are accepted and objects report enabled
    pub fn is_operational(self) -> bool {
        self == DeviceState::Operational
    }
}

/// Port status reported by the panel transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortEvent {
    Error,
    Open,
    Ready,
    Connected,
    Closed,
}

impl PortEvent {
    pub fn target_state(self) -> DeviceState {
        match self {
            PortEvent::Error => DeviceState::Error,
            PortEvent::Open => DeviceState::Initializing,
            PortEvent::Ready => DeviceState::Updating,
            PortEvent::Connected => DeviceState::Operational,
            PortEvent::Closed => DeviceState::Closed,
        }
    }
}

/// Result of applying a port event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: DeviceState,
    pub to: DeviceState,
}

impl Transition {
    /// Only operability is visible to device-side controllers
    pub fn operability_changed(&self) -> bool {
        self.from.is_operational() != self.to.is_operational()
    }

    /// Closing the port resets the panel
    pub fn requires_reset(&self) -> bool {
        self.to == DeviceState::Closed
    }
}

/// Port lifecycle: closed → initializing → updating → operational, with
/// error reachable from anywhere
#[derive(Debug, Clone, Default)]
pub struct PortStateMachine {
    state: DeviceState,
}

impl PortStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn is_operational(&self) -> bool {
        self.state.is_operational()
    }

    /// Commit the state an event maps to, unconditionally
    pub fn apply(&mut self, event: PortEvent) -> Transition {
        let transition = Transition {
            from: self.state,
            to: event.target_state(),
        };
        self.state = transition.to;

        if transition.from != transition.to {
            info!("Port state {:?} -> {:?}", transition.from, transition.to);
        }
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATES: [DeviceState; 5] = [
        DeviceState::Closed,
        DeviceState::Initializing,
        DeviceState::Updating,
        DeviceState::Operational,
        DeviceState::Error,
    ];

    const EVENTS: [PortEvent; 5] = [
        PortEvent::Error,
        PortEvent::Open,
        PortEvent::Ready,
        PortEvent::Connected,
        PortEvent::Closed,
    ];

    #[test]
    fn test_every_event_from_every_state() {
        for from in STATES {
            for event in EVENTS {
                let mut machine = PortStateMachine { state: from };
                let transition = machine.apply(event);
                assert_eq!(transition.from, from);
                assert_eq!(machine.state(), event.target_state());
                assert_eq!(
                    transition.operability_changed(),
                    from.is_operational() != event.target_state().is_operational()
                );
            }
        }
    }

    #[test]
    fn test_connect_changes_operability() {
        let mut machine = PortStateMachine::new();
        assert!(!machine.apply(PortEvent::Open).operability_changed());
        assert!(!machine.apply(PortEvent::Ready).operability_changed());
        assert!(machine.apply(PortEvent::Connected).operability_changed());
        assert!(machine.is_operational());
    }

    #[test]
    fn test_error_to_initializing_keeps_operability() {
        let mut machine = PortStateMachine::new();
        machine.apply(PortEvent::Error);
        let transition = machine.apply(PortEvent::Open);
        assert_eq!(transition.to, DeviceState::Initializing);
        assert!(!transition.operability_changed());
    }

    #[test]
    fn test_close_requires_reset() {
        let mut machine = PortStateMachine::new();
        machine.apply(PortEvent::Connected);
        let transition = machine.apply(PortEvent::Closed);
        assert!(transition.requires_reset());
        assert!(transition.operability_changed());
        assert_eq!(machine.state(), DeviceState::Closed);
    }
}
