mod port;

pub use port::{DeviceState, PortEvent, PortStateMachine, Transition};
