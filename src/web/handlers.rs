//! API endpoint handlers

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::bridge::actor::BridgeHandle;
use crate::bridge::Snapshot;
use crate::error::Status;
use crate::ocp::{Command, MethodId, ObjectRole, Value};

use super::types::{ApiResponse, EventName, ObjectSummary, PanelEventRequest, PanelEventResponse};

/// Shared state for web handlers
pub struct AppState {
    pub bridge: BridgeHandle,
}

/// POST /api/panel/events - Feed an event to the panel dispatcher
pub async fn post_panel_event(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PanelEventRequest>,
) -> Json<ApiResponse<PanelEventResponse>> {
    let event = match request.event {
        EventName::Known(event) => event,
        EventName::Unknown(name) => {
            debug!("Passing through unknown event '{}'", name);
            return Json(ApiResponse::ok(PanelEventResponse {
                status: Status::Continue,
                params: request.params,
            }));
        }
    };

    match state.bridge.handle_event(event, request.params).await {
        Ok((status, params)) => Json(ApiResponse::ok(PanelEventResponse { status, params })),
        Err(e) => {
            warn!("Panel event failed: {}", e);
            Json(ApiResponse::error(e.to_string()))
        }
    }
}

/// GET /api/objects - List the objects in the block
pub async fn list_objects() -> Json<ApiResponse<Vec<ObjectSummary>>> {
    let objects = ObjectRole::all().into_iter().map(ObjectSummary::from).collect();
    Json(ApiResponse::ok(objects))
}

/// POST /api/objects/{*path} - Invoke a method.
///
/// The path is the object's role path followed by the method id, e.g.
/// `MOM/Gain/4.2`; the body is the argument array.
pub async fn post_object_command(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    Json(args): Json<Vec<Value>>,
) -> Json<ApiResponse<Option<Value>>> {
    let command = match parse_command(&path, args) {
        Ok(command) => command,
        Err(e) => return Json(ApiResponse::error(format!("'{}': {}", path, e))),
    };

    match state.bridge.handle_command(command).await {
        Ok(Ok(value)) => Json(ApiResponse::ok(value)),
        Ok(Err(e)) => Json(ApiResponse::error(e.to_string())),
        Err(e) => {
            warn!("Command failed: {}", e);
            Json(ApiResponse::error(e.to_string()))
        }
    }
}

fn parse_command(path: &str, args: Vec<Value>) -> crate::error::Result<Command> {
    let (role, method) = path
        .rsplit_once('/')
        .ok_or(crate::error::Error::InvalidRequest)?;
    let role = ObjectRole::from_path(role)?;
    let method: MethodId = method.parse()?;
    Ok(Command::new(role, method, args))
}

/// GET /api/state - Snapshot of the panel state
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Snapshot>> {
    match state.bridge.snapshot().await {
        Ok(snapshot) => Json(ApiResponse::ok(snapshot)),
        Err(e) => Json(ApiResponse::error(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{actor, Bridge, BridgeOptions, DeviceIdentity};
    use crate::ocp::{methods, ObjectClass};
    use crate::panel::KeyId;
    use crate::prefs::Preferences;
    use crate::protocol::{Event, Param, TracingTransport};

    fn state() -> State<Arc<AppState>> {
        let bridge = Bridge::new(
            Preferences::in_memory(),
            BridgeOptions {
                identity: DeviceIdentity {
                    device_id: 50,
                    name: "MOM Bridge".to_string(),
                    serial_number: "710000000000".to_string(),
                },
                rotation_reset: Default::default(),
            },
        );
        let (bridge, _tasks) = actor::spawn(bridge, Arc::new(TracingTransport));
        State(Arc::new(AppState { bridge }))
    }

    async fn event(state: &State<Arc<AppState>>, event: Event, params: Vec<Param>) -> PanelEventResponse {
        let Json(response) = post_panel_event(
            State(state.0.clone()),
            Json(PanelEventRequest {
                event: EventName::Known(event),
                params,
            }),
        )
        .await;
        response.data.unwrap()
    }

    #[test]
    fn test_parse_command_path() {
        let command = parse_command("MOM/Gain/4.2", vec![Value::Float(-3.0)]).unwrap();
        assert_eq!(command.role, ObjectRole::Gain);
        assert_eq!(command.method, methods::SET_GAIN);

        let command = parse_command("Source A/2.8", vec![]).unwrap();
        assert_eq!(command.role, ObjectRole::Key(KeyId::SourceA));

        assert!(parse_command("Gain", vec![]).is_err());
        assert!(parse_command("MOM/Gain/gain", vec![]).is_err());
    }

    #[tokio::test]
    async fn test_panel_event_round_trip() {
        let state = state();
        let response = event(&state, Event::GetRingLedState, vec![Param::Int(28)]).await;
        assert_eq!(response.status, Status::Success);
        assert_eq!(response.params, vec![Param::Int(28), Param::Int(1)]);

        let response = event(&state, Event::GetKeyState, vec![Param::Int(9)]).await;
        assert_eq!(response.status, Status::InvalidParameter);
    }

    #[tokio::test]
    async fn test_unknown_event_name_passes_through() {
        let state = state();
        let request: PanelEventRequest =
            serde_json::from_str(r#"{"event": "foo", "params": [3, "x"]}"#).unwrap();
        assert_eq!(request.event, EventName::Unknown("foo".to_string()));

        let Json(response) = post_panel_event(State(state.0.clone()), Json(request)).await;
        let response = response.data.unwrap();
        assert_eq!(response.status, Status::Continue);
        assert_eq!(response.params, vec![Param::Int(3), Param::from("x")]);

        let request: PanelEventRequest = serde_json::from_str(r#"{"event": {"other": 40}}"#).unwrap();
        assert_eq!(request.event, EventName::Known(Event::Other(40)));
        let Json(response) = post_panel_event(State(state.0.clone()), Json(request)).await;
        assert_eq!(response.data.unwrap().status, Status::Continue);
    }

    #[tokio::test]
    async fn test_object_commands() {
        let state = state();
        for e in [Event::PortOpen, Event::PortReady, Event::PortConnected] {
            event(&state, e, vec![]).await;
        }

        let Json(response) = post_object_command(
            State(state.0.clone()),
            Path("MOM/Gain/4.2".to_string()),
            Json(vec![Value::Float(-10.0)]),
        )
        .await;
        assert!(response.success);

        let Json(response) = post_object_command(
            State(state.0.clone()),
            Path("MOM/Gain/4.1".to_string()),
            Json(vec![]),
        )
        .await;
        assert_eq!(response.data, Some(Some(Value::Float(-10.0))));

        let Json(response) = post_object_command(
            State(state.0.clone()),
            Path("MOM/Fader/4.1".to_string()),
            Json(vec![]),
        )
        .await;
        assert!(!response.success);

        let Json(response) = get_state(State(state.0.clone())).await;
        let snapshot = response.data.unwrap();
        assert_eq!(snapshot.gain, -10.0);
        assert!(snapshot.port_state.is_operational());
    }

    #[tokio::test]
    async fn test_list_objects() {
        let Json(response) = list_objects().await;
        let objects = response.data.unwrap();
        assert_eq!(objects.len(), 11);
        assert_eq!(objects[8].path, "MOM/Gain");
        assert_eq!(objects[8].class, ObjectClass::SteppedGain);
    }
}
