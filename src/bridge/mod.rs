//! Protocol bridge
//!
//! Owns all panel state. Panel events and device commands resolve their
//! target object here and run against the same state; any notifications
//! they cause are queued in an outbox for the actor to deliver.

pub mod actor;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{Error, Result, Status};
use crate::ocp::{methods, properties, Command, ObjectRole, PropertyChanged, PropertyId, Value};
use crate::panel::{
    labels, KeyId, LedColor, Panel, RingUpdate, RotationResetPolicy, LED_COUNT,
};
use crate::prefs::{LedIntensity, Preferences};
use crate::protocol::{Event, PanelNotification, Param, Reply, Request};
use crate::state::{DeviceState, PortEvent, PortStateMachine};

/// Identity published by the device manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceIdentity {
    pub device_id: i64,
    pub name: String,
    pub serial_number: String,
}

impl DeviceIdentity {
    pub fn inventory_code(&self) -> String {
        self.device_id.to_string()
    }
}

/// Static bridge settings
#[derive(Debug, Clone)]
pub struct BridgeOptions {
    /// Identity used where no preference overrides it
    pub identity: DeviceIdentity,
    pub rotation_reset: RotationResetPolicy,
}

/// Outbound notification produced by an operation
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Panel(PanelNotification),
    Property(PropertyChanged),
}

/// State of one key as reported in snapshots
#[derive(Debug, Clone, Serialize)]
pub struct KeySnapshot {
    pub key: KeyId,
    pub state: bool,
    pub label: String,
}

/// Read-only view of the bridge state
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub port_state: DeviceState,
    pub identity: DeviceIdentity,
    pub gain: f32,
    pub gain_adjustable: bool,
    pub rotation_count: u16,
    pub selected_layer: usize,
    pub led_intensity: LedIntensity,
    pub keys: Vec<KeySnapshot>,
    pub ring: Vec<LedColor>,
}

pub struct Bridge {
    panel: Panel,
    port: PortStateMachine,
    prefs: Preferences,
    options: BridgeOptions,
    identity: watch::Sender<DeviceIdentity>,
    outbox: Vec<Notification>,
}

impl Bridge {
    pub fn new(prefs: Preferences, options: BridgeOptions) -> Self {
        let (identity, _) = watch::channel(options.identity.clone());
        let mut bridge = Self {
            panel: Panel::new(),
            port: PortStateMachine::new(),
            prefs,
            options,
            identity,
            outbox: Vec::new(),
        };
        bridge.refresh_identity();
        bridge
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn port_state(&self) -> DeviceState {
        self.port.state()
    }

    pub fn identity(&self) -> DeviceIdentity {
        self.identity.borrow().clone()
    }

    /// Stream of identity changes
    pub fn subscribe_identity(&self) -> watch::Receiver<DeviceIdentity> {
        self.identity.subscribe()
    }

    /// Drain notifications queued by previous operations
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.outbox)
    }

    // ---- Panel protocol ----

    /// Handle a panel event, returning the status and the parameter list
    /// with any results inserted
    pub fn handle_event(&mut self, event: Event, mut params: Vec<Param>) -> (Status, Vec<Param>) {
        let result = Request::parse(event, &params).and_then(|request| {
            debug!("Panel request {:?}", request);
            self.dispatch(request)
        });

        match result {
            Ok(reply) => {
                reply.write_into(&mut params);
                (Status::Success, params)
            }
            Err(Error::Unhandled) => {
                debug!("Passing through {:?}", event);
                (Status::Continue, params)
            }
            Err(e) => {
                warn!("Panel event {:?} failed: {}", event, e);
                (e.into(), params)
            }
        }
    }

    fn dispatch(&mut self, request: Request) -> Result<Reply> {
        match request {
            Request::Port(event) => self.port_status_changed(event),
            Request::Identify => {
                info!("Identify requested");
                self.emit_property(ObjectRole::Identify, properties::IDENTIFY, true);
            }
            Request::GetDeviceId => {
                let identity = self.identity();
                return Ok(Reply::DeviceId {
                    inventory_code: identity.inventory_code(),
                    name: identity.name,
                });
            }
            Request::SetDeviceId { device_id, name } => {
                if let Some(device_id) = device_id {
                    self.prefs.set_device_id(device_id);
                }
                if let Some(name) = name {
                    self.prefs.set_device_name(&name);
                }
                self.refresh_identity();
            }
            Request::GetKeyState(key) => return Ok(Reply::KeyState(self.panel.key_state(key))),
            Request::GetLedState(led) => {
                return Ok(Reply::LedState(self.panel.button(led).setting()))
            }
            Request::SetLedState(led, on) => {
                let was_on = self.panel.button(led).setting();
                self.panel.set_led_state(led, on);
                if was_on != on {
                    self.emit_property(ObjectRole::Key(led.key_id()), properties::SETTING, on);
                }
            }
            Request::GetLedIntensity => {
                return Ok(Reply::LedIntensity(
                    self.prefs.led_intensity().unwrap_or_default(),
                ))
            }
            Request::SetLedIntensity(intensity) => self.prefs.set_led_intensity(intensity),
            Request::GetRingLedState(position) => {
                return Ok(Reply::RingLedState(self.panel.ring_state(position)))
            }
            Request::SetRingLedState(position, value) => {
                match self.panel.set_ring_state(position, value)? {
                    RingUpdate::Gain(Some(db)) => {
                        self.emit_property(ObjectRole::Gain, properties::GAIN, db)
                    }
                    RingUpdate::Layer(true) => self.layer_did_change(),
                    _ => {}
                }
            }
            Request::GetRotationCount => {
                return Ok(Reply::RotationCount(self.panel.gain.rotation_count()))
            }
        }

        Ok(Reply::Done)
    }

    fn port_status_changed(&mut self, event: PortEvent) {
        let transition = self.port.apply(event);

        if transition.requires_reset() {
            self.reset();
        }

        if transition.operability_changed() {
            self.broadcast_enabled();
        }
    }

    fn reset(&mut self) {
        info!("Resetting panel state");
        self.refresh_identity();

        let gain = self.panel.gain.gain();
        let lit: Vec<KeyId> = self
            .panel
            .buttons()
            .iter()
            .filter(|button| button.setting())
            .map(|button| button.key_id())
            .collect();

        self.panel.reset(self.options.rotation_reset);

        for key in lit {
            self.emit_property(ObjectRole::Key(key), properties::SETTING, false);
        }
        if self.panel.gain.gain() != gain {
            self.emit_property(ObjectRole::Gain, properties::GAIN, self.panel.gain.gain());
        }
        self.layer_did_change();
    }

    /// Recompute the published identity from preferences and defaults
    fn refresh_identity(&mut self) {
        let defaults = &self.options.identity;
        let identity = DeviceIdentity {
            device_id: self.prefs.device_id().unwrap_or(defaults.device_id),
            name: self
                .prefs
                .device_name()
                .unwrap_or_else(|| defaults.name.clone()),
            serial_number: defaults.serial_number.clone(),
        };

        self.identity.send_if_modified(|current| {
            if *current == identity {
                false
            } else {
                info!(
                    "Device identity: {} ({})",
                    identity.name,
                    identity.inventory_code()
                );
                *current = identity;
                true
            }
        });
    }

    /// Queue the identity notification for the panel host
    pub fn notify_identity(&mut self) {
        let identity = self.identity();
        self.outbox
            .push(Notification::Panel(PanelNotification::success(
                Event::GetDeviceId,
                [
                    Param::from(identity.name.as_str()),
                    Param::from(identity.inventory_code()),
                ],
            )));
    }

    // ---- Device protocol ----

    /// Handle a device command, returning the response value if any
    pub fn handle_command(&mut self, command: &Command) -> Result<Option<Value>> {
        debug!("Command {} on {}", command.method, command.role);

        let result = match self.handle_common(command) {
            Err(Error::Unhandled) => match command.role {
                ObjectRole::Key(key) => self.handle_key(key, command),
                ObjectRole::Gain => self.handle_gain(command),
                ObjectRole::Layer => self.handle_layer(command),
                ObjectRole::Identify => Err(Error::NotImplemented),
            },
            handled => handled,
        };

        if let Err(e) = &result {
            warn!("Command {} on {} failed: {}", command.method, command.role, e);
        }
        result
    }

    /// Methods every panel object answers the same way
    fn handle_common(&mut self, command: &Command) -> Result<Option<Value>> {
        match command.method {
            methods::GET_ENABLED => Ok(Some(self.port.is_operational().into())),
            methods::SET_ENABLED => {
                self.ensure_operational()?;
                // Enabled follows the port, it cannot be switched off
                if !command.arg()?.as_bool()? {
                    return Err(Error::ParameterOutOfRange);
                }
                Ok(None)
            }
            _ => Err(Error::Unhandled),
        }
    }

    fn handle_key(&mut self, key: KeyId, command: &Command) -> Result<Option<Value>> {
        match command.method {
            methods::GET_LABEL => Ok(Some(self.label(key).into())),
            methods::SET_LABEL => {
                self.ensure_operational()?;
                let label = command.arg()?.as_string()?.to_string();
                let layer = self.panel.layer.selected();
                labels::set_user_label(&mut self.prefs, key, layer, &label);
                self.label_did_change(key);
                Ok(None)
            }
            methods::GET_SETTING => match key.led_id() {
                Some(led) => Ok(Some(self.panel.button(led).setting().into())),
                // A footswitch has no visible state
                None => Err(Error::NotImplemented),
            },
            methods::SET_SETTING => {
                self.ensure_operational()?;
                match key.led_id() {
                    Some(led) => {
                        // The host echoes the new LED state back; only
                        // request the toggle here
                        let setting = command.arg()?.as_bool()?;
                        if setting != self.panel.button(led).setting() {
                            self.notify_key_down_up(key);
                        }
                    }
                    None => self.notify_key_down_up(key),
                }
                Ok(None)
            }
            _ => Err(Error::NotImplemented),
        }
    }

    fn handle_gain(&mut self, command: &Command) -> Result<Option<Value>> {
        match command.method {
            methods::GET_GAIN => Ok(Some(self.panel.gain.gain().into())),
            methods::SET_GAIN => {
                self.ensure_operational()?;
                let db = command.arg()?.as_f32()?;
                let change = self.panel.gain.set_gain(db)?;

                if let Some(count) = change.rotation_count {
                    self.outbox
                        .push(Notification::Panel(PanelNotification::success(
                            Event::GetRotationCount,
                            [Param::Int(count as i64)],
                        )));
                }
                if let Some(db) = change.gain {
                    self.emit_property(ObjectRole::Gain, properties::GAIN, db);
                }
                Ok(None)
            }
            _ => Err(Error::NotImplemented),
        }
    }

    fn handle_layer(&mut self, command: &Command) -> Result<Option<Value>> {
        match command.method {
            methods::GET_READING => Ok(Some(self.panel.layer.selected().into())),
            _ => Err(Error::NotImplemented),
        }
    }

    fn ensure_operational(&self) -> Result<()> {
        if self.port.is_operational() {
            Ok(())
        } else {
            Err(Error::DeviceError)
        }
    }

    // ---- Labels ----

    /// Label of a key on the selected layer
    pub fn label(&self, key: KeyId) -> String {
        labels::user_label(&self.prefs, key, self.panel.layer.selected())
    }

    fn label_did_change(&mut self, key: KeyId) {
        let label = self.label(key);
        self.emit_property(ObjectRole::Key(key), properties::LABEL, label);
    }

    fn layer_did_change(&mut self) {
        let layer = self.panel.layer.selected();
        self.emit_property(ObjectRole::Layer, properties::READING, layer);
        for key in KeyId::ALL {
            self.label_did_change(key);
        }
    }

    // ---- Notifications ----

    fn notify_key_down_up(&mut self, key: KeyId) {
        self.outbox.push(Notification::Panel(PanelNotification::key_down_up(
            key.raw(),
        )));
    }

    fn broadcast_enabled(&mut self) {
        let enabled = self.port.is_operational();
        for role in ObjectRole::all() {
            self.emit_property(role, properties::ENABLED, enabled);
        }
    }

    fn emit_property(&mut self, role: ObjectRole, property: PropertyId, value: impl Into<Value>) {
        self.outbox
            .push(Notification::Property(PropertyChanged::new(role, property, value)));
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            port_state: self.port.state(),
            identity: self.identity(),
            gain: self.panel.gain.gain(),
            gain_adjustable: self.panel.gain.is_adjustable(),
            rotation_count: self.panel.gain.rotation_count(),
            selected_layer: self.panel.layer.selected(),
            led_intensity: self.prefs.led_intensity().unwrap_or_default(),
            keys: KeyId::ALL
                .iter()
                .map(|key| KeySnapshot {
                    key: *key,
                    state: self.panel.key_state(*key),
                    label: self.label(*key),
                })
                .collect(),
            ring: (0..LED_COUNT)
                .filter_map(|i| self.panel.gain.ring().color_for_led(i))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocp::MethodId;
    use crate::panel::RingLedDisplay;

    fn bridge_options() -> BridgeOptions {
        BridgeOptions {
            identity: DeviceIdentity {
                device_id: 50,
                name: "MOM Bridge".to_string(),
                serial_number: "710000000000".to_string(),
            },
            rotation_reset: RotationResetPolicy::default(),
        }
    }

    fn bridge() -> Bridge {
        Bridge::new(Preferences::in_memory(), bridge_options())
    }

    fn connected() -> Bridge {
        let mut bridge = bridge();
        for event in [Event::PortOpen, Event::PortReady, Event::PortConnected] {
            assert_eq!(bridge.handle_event(event, vec![]).0, Status::Success);
        }
        bridge.take_notifications();
        bridge
    }

    fn ints(values: &[i64]) -> Vec<Param> {
        values.iter().map(|v| Param::Int(*v)).collect()
    }

    fn command(
        bridge: &mut Bridge,
        role: ObjectRole,
        method: MethodId,
        args: Vec<Value>,
    ) -> Result<Option<Value>> {
        bridge.handle_command(&Command::new(role, method, args))
    }

    fn properties_named(notifications: &[Notification], property: PropertyId) -> Vec<&PropertyChanged> {
        notifications
            .iter()
            .filter_map(|n| match n {
                Notification::Property(changed) if changed.property == property => Some(changed),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_enabled_follows_operability() {
        let mut bridge = bridge();

        bridge.handle_event(Event::PortOpen, vec![]);
        bridge.handle_event(Event::PortReady, vec![]);
        assert!(bridge.take_notifications().is_empty());

        bridge.handle_event(Event::PortConnected, vec![]);
        let notifications = bridge.take_notifications();
        let enabled = properties_named(&notifications, properties::ENABLED);
        assert_eq!(enabled.len(), ObjectRole::all().len());
        assert!(enabled.iter().all(|c| c.value == Value::Bool(true)));

        assert_eq!(
            command(&mut bridge, ObjectRole::Gain, methods::GET_ENABLED, vec![]),
            Ok(Some(Value::Bool(true)))
        );

        bridge.handle_event(Event::PortError, vec![]);
        let notifications = bridge.take_notifications();
        let enabled = properties_named(&notifications, properties::ENABLED);
        assert_eq!(enabled.len(), 11);
        assert!(enabled.iter().all(|c| c.value == Value::Bool(false)));
    }

    #[test]
    fn test_writes_require_operational_port() {
        let mut bridge = bridge();
        assert_eq!(
            command(&mut bridge, ObjectRole::Gain, methods::SET_GAIN, vec![Value::Float(-6.0)]),
            Err(Error::DeviceError)
        );
        assert_eq!(
            command(
                &mut bridge,
                ObjectRole::Key(KeyId::SourceA),
                methods::SET_LABEL,
                vec![Value::from("Mains".to_string())]
            ),
            Err(Error::DeviceError)
        );
        // Reads still work
        assert_eq!(
            command(&mut bridge, ObjectRole::Gain, methods::GET_GAIN, vec![]),
            Ok(Some(Value::Float(0.0)))
        );
    }

    #[test]
    fn test_enabled_cannot_be_cleared() {
        let mut bridge = connected();
        let role = ObjectRole::Key(KeyId::Dim);
        assert_eq!(
            command(&mut bridge, role, methods::SET_ENABLED, vec![Value::Bool(false)]),
            Err(Error::ParameterOutOfRange)
        );
        assert_eq!(
            command(&mut bridge, role, methods::SET_ENABLED, vec![Value::Bool(true)]),
            Ok(None)
        );
    }

    #[test]
    fn test_set_gain_turns_encoder() {
        let mut bridge = connected();
        assert_eq!(
            command(&mut bridge, ObjectRole::Gain, methods::SET_GAIN, vec![Value::Float(-6.0)]),
            Ok(None)
        );

        let notifications = bridge.take_notifications();
        assert_eq!(
            notifications,
            vec![
                Notification::Panel(PanelNotification::success(
                    Event::GetRotationCount,
                    [Param::Int(65524)],
                )),
                Notification::Property(PropertyChanged::new(
                    ObjectRole::Gain,
                    properties::GAIN,
                    -6.0f32
                )),
            ]
        );

        let (status, params) = bridge.handle_event(Event::GetRotationCount, vec![]);
        assert_eq!(status, Status::Success);
        assert_eq!(params, ints(&[65524]));
    }

    #[test]
    fn test_set_gain_rejects_bad_values() {
        let mut bridge = connected();
        assert_eq!(
            command(&mut bridge, ObjectRole::Gain, methods::SET_GAIN, vec![Value::Bool(true)]),
            Err(Error::InvalidParameter)
        );
        assert_eq!(
            command(&mut bridge, ObjectRole::Gain, methods::SET_GAIN, vec![]),
            Err(Error::InvalidRequest)
        );
    }

    #[test]
    fn test_ref_key_blocks_gain() {
        let mut bridge = connected();
        let ref_led = KeyId::Ref.led_id().unwrap();

        let (status, _) = bridge.handle_event(Event::SetLedState, ints(&[ref_led.raw(), 1]));
        assert_eq!(status, Status::Success);
        assert_eq!(
            command(&mut bridge, ObjectRole::Gain, methods::SET_GAIN, vec![Value::Float(-6.0)]),
            Err(Error::ParameterOutOfRange)
        );

        bridge.handle_event(Event::SetLedState, ints(&[ref_led.raw(), 0]));
        assert_eq!(
            command(&mut bridge, ObjectRole::Gain, methods::SET_GAIN, vec![Value::Float(-6.0)]),
            Ok(None)
        );
    }

    #[test]
    fn test_ring_redraw_updates_gain() {
        let mut bridge = connected();
        let ring = RingLedDisplay::encode(-20.0);

        for (index, color) in ring.leds().iter().enumerate() {
            let (status, _) =
                bridge.handle_event(Event::SetRingLedState, ints(&[index as i64 + 1, color.raw()]));
            assert_eq!(status, Status::Success);
        }

        assert_eq!(bridge.panel().gain.gain(), -20.0);
        let notifications = bridge.take_notifications();
        let gains = properties_named(&notifications, properties::GAIN);
        assert_eq!(
            gains.last().map(|c| c.value.clone()),
            Some(Value::Float(-20.0))
        );
    }

    #[test]
    fn test_ring_rejects_unknown_color() {
        let mut bridge = connected();
        let (status, params) = bridge.handle_event(Event::SetRingLedState, ints(&[3, 4]));
        assert_eq!(status, Status::InvalidParameter);
        assert_eq!(params, ints(&[3, 4]));
    }

    #[test]
    fn test_layer_selection_refreshes_labels() {
        let mut bridge = connected();

        let (status, _) = bridge.handle_event(Event::SetRingLedState, ints(&[29, 1]));
        assert_eq!(status, Status::Success);
        assert_eq!(bridge.panel().layer.selected(), 2);

        let notifications = bridge.take_notifications();
        assert_eq!(
            properties_named(&notifications, properties::READING)
                .first()
                .map(|c| c.value.clone()),
            Some(Value::Int(2))
        );
        let labels = properties_named(&notifications, properties::LABEL);
        assert_eq!(labels.len(), KeyId::ALL.len());

        let (_, params) = bridge.handle_event(Event::GetRingLedState, ints(&[29]));
        assert_eq!(params, ints(&[29, 1]));
        let (_, params) = bridge.handle_event(Event::GetRingLedState, ints(&[28]));
        assert_eq!(params, ints(&[28, 0]));
    }

    #[test]
    fn test_layer_deselect_is_ignored() {
        let mut bridge = connected();
        bridge.handle_event(Event::SetRingLedState, ints(&[30, 0]));
        assert_eq!(bridge.panel().layer.selected(), 1);
        assert!(bridge.take_notifications().is_empty());
    }

    #[test]
    fn test_labels_are_per_layer() {
        let mut bridge = connected();
        let role = ObjectRole::Key(KeyId::SourceA);

        assert_eq!(
            command(&mut bridge, role, methods::SET_LABEL, vec![Value::from("Mains".to_string())]),
            Ok(None)
        );
        assert_eq!(
            bridge.take_notifications(),
            vec![Notification::Property(PropertyChanged::new(
                role,
                properties::LABEL,
                "Mains".to_string()
            ))]
        );
        assert_eq!(
            command(&mut bridge, role, methods::GET_LABEL, vec![]),
            Ok(Some(Value::from("Mains".to_string())))
        );

        bridge.handle_event(Event::SetRingLedState, ints(&[29, 1]));
        assert_eq!(bridge.label(KeyId::SourceA), "A");
        assert_eq!(bridge.label(KeyId::Talkback), "");
    }

    #[test]
    fn test_key_setting_requests_toggle() {
        let mut bridge = connected();
        let role = ObjectRole::Key(KeyId::SourceB);

        assert_eq!(
            command(&mut bridge, role, methods::SET_SETTING, vec![Value::Bool(false)]),
            Ok(None)
        );
        assert!(bridge.take_notifications().is_empty());

        assert_eq!(
            command(&mut bridge, role, methods::SET_SETTING, vec![Value::Bool(true)]),
            Ok(None)
        );
        assert_eq!(
            bridge.take_notifications(),
            vec![Notification::Panel(PanelNotification::key_down_up(2))]
        );

        // The state only changes once the host redraws the LED
        assert_eq!(
            command(&mut bridge, role, methods::GET_SETTING, vec![]),
            Ok(Some(Value::Bool(false)))
        );
        bridge.handle_event(Event::SetLedState, ints(&[2, 1]));
        assert_eq!(
            command(&mut bridge, role, methods::GET_SETTING, vec![]),
            Ok(Some(Value::Bool(true)))
        );
        let (_, params) = bridge.handle_event(Event::GetKeyState, ints(&[2]));
        assert_eq!(params, ints(&[2, 1]));
    }

    #[test]
    fn test_footswitch() {
        let mut bridge = connected();
        let role = ObjectRole::Key(KeyId::External);

        assert_eq!(
            command(&mut bridge, role, methods::GET_SETTING, vec![]),
            Err(Error::NotImplemented)
        );
        assert_eq!(command(&mut bridge, role, methods::SET_SETTING, vec![]), Ok(None));
        assert_eq!(
            bridge.take_notifications(),
            vec![Notification::Panel(PanelNotification::key_down_up(0))]
        );

        let (status, params) = bridge.handle_event(Event::GetKeyState, ints(&[0]));
        assert_eq!(status, Status::Success);
        assert_eq!(params, ints(&[0, 0]));
    }

    #[test]
    fn test_unsupported_methods() {
        let mut bridge = connected();
        assert_eq!(
            command(&mut bridge, ObjectRole::Identify, methods::GET_SETTING, vec![]),
            Err(Error::NotImplemented)
        );
        assert_eq!(
            command(&mut bridge, ObjectRole::Layer, methods::SET_GAIN, vec![]),
            Err(Error::NotImplemented)
        );
        assert_eq!(
            command(&mut bridge, ObjectRole::Layer, methods::GET_READING, vec![]),
            Ok(Some(Value::Int(1)))
        );
    }

    #[test]
    fn test_port_close_resets_panel() {
        let mut bridge = connected();
        command(&mut bridge, ObjectRole::Gain, methods::SET_GAIN, vec![Value::Float(-10.0)]).unwrap();
        bridge.handle_event(Event::SetLedState, ints(&[4, 1]));
        bridge.handle_event(Event::SetRingLedState, ints(&[31, 1]));
        bridge.take_notifications();

        bridge.handle_event(Event::PortClosed, vec![]);

        assert_eq!(bridge.port_state(), DeviceState::Closed);
        assert_eq!(bridge.panel().gain.gain(), 0.0);
        assert!(!bridge.panel().key_state(KeyId::Talkback));
        assert_eq!(bridge.panel().layer.selected(), 1);

        let notifications = bridge.take_notifications();
        assert_eq!(properties_named(&notifications, properties::LABEL).len(), 8);
        assert_eq!(properties_named(&notifications, properties::ENABLED).len(), 11);

        let settings = properties_named(&notifications, properties::SETTING);
        assert_eq!(settings.len(), 1);
        assert_eq!(settings[0].role, ObjectRole::Key(KeyId::Talkback));
        assert_eq!(settings[0].value, Value::Bool(false));
        assert_eq!(
            command(
                &mut bridge,
                ObjectRole::Key(KeyId::Talkback),
                methods::GET_SETTING,
                vec![]
            ),
            Ok(Some(Value::Bool(false)))
        );
    }

    #[test]
    fn test_port_close_rotation_policy() {
        for (policy, expected) in [
            (RotationResetPolicy::Preserve, 65524),
            (RotationResetPolicy::Reset, 0),
        ] {
            let mut bridge = Bridge::new(
                Preferences::in_memory(),
                BridgeOptions {
                    rotation_reset: policy,
                    ..bridge_options()
                },
            );
            for event in [Event::PortOpen, Event::PortReady, Event::PortConnected] {
                bridge.handle_event(event, vec![]);
            }
            command(&mut bridge, ObjectRole::Gain, methods::SET_GAIN, vec![Value::Float(-6.0)])
                .unwrap();
            assert_eq!(bridge.panel().gain.rotation_count(), 65524);

            bridge.handle_event(Event::PortClosed, vec![]);

            assert_eq!(bridge.panel().gain.rotation_count(), expected, "{:?}", policy);
            let (_, params) = bridge.handle_event(Event::GetRotationCount, vec![]);
            assert_eq!(params, ints(&[i64::from(expected)]));
        }
    }

    #[test]
    fn test_locked_gain_still_validates_argument() {
        let mut bridge = connected();
        bridge.handle_event(Event::SetLedState, ints(&[KeyId::Ref.raw(), 1]));

        assert_eq!(
            command(&mut bridge, ObjectRole::Gain, methods::SET_GAIN, vec![Value::Bool(true)]),
            Err(Error::InvalidParameter)
        );
        assert_eq!(
            command(&mut bridge, ObjectRole::Gain, methods::SET_GAIN, vec![Value::Float(-3.0)]),
            Err(Error::ParameterOutOfRange)
        );
    }

    #[test]
    fn test_device_id() {
        let mut bridge = bridge();
        let mut identity = bridge.subscribe_identity();

        let (status, params) = bridge.handle_event(Event::GetDeviceId, vec![]);
        assert_eq!(status, Status::Success);
        assert_eq!(params, vec![Param::from("MOM Bridge"), Param::from("50")]);

        bridge.handle_event(Event::SetDeviceId, vec![Param::Int(12), Param::from("Booth")]);
        assert!(identity.has_changed().unwrap());
        assert_eq!(identity.borrow_and_update().name, "Booth");

        let (_, params) = bridge.handle_event(Event::GetDeviceId, vec![]);
        assert_eq!(params, vec![Param::from("Booth"), Param::from("12")]);

        bridge.notify_identity();
        assert_eq!(
            bridge.take_notifications(),
            vec![Notification::Panel(PanelNotification::success(
                Event::GetDeviceId,
                [Param::from("Booth"), Param::from("12")],
            ))]
        );
    }

    #[test]
    fn test_led_intensity_defaults_and_persists() {
        let mut bridge = bridge();
        let (_, params) = bridge.handle_event(Event::GetLedIntensity, vec![]);
        assert_eq!(params, ints(&[LedIntensity::Normal.raw()]));

        bridge.handle_event(Event::SetLedIntensity, ints(&[2]));
        let (_, params) = bridge.handle_event(Event::GetLedIntensity, vec![]);
        assert_eq!(params, ints(&[2]));
    }

    #[test]
    fn test_unknown_event_passes_through() {
        let mut bridge = bridge();
        let (status, params) = bridge.handle_event(Event::Other(40), ints(&[1, 2]));
        assert_eq!(status, Status::Continue);
        assert_eq!(params, ints(&[1, 2]));
    }

    #[test]
    fn test_identify_event() {
        let mut bridge = bridge();
        bridge.handle_event(Event::Identify, vec![]);
        assert_eq!(
            bridge.take_notifications(),
            vec![Notification::Property(PropertyChanged::new(
                ObjectRole::Identify,
                properties::IDENTIFY,
                true
            ))]
        );
    }

    #[test]
    fn test_snapshot() {
        let bridge = connected();
        let snapshot = bridge.snapshot();
        assert_eq!(snapshot.port_state, DeviceState::Operational);
        assert_eq!(snapshot.keys.len(), 8);
        assert_eq!(snapshot.ring.len(), LED_COUNT);
        assert_eq!(snapshot.keys[1].label, "A");
    }
}
