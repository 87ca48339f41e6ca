//! Request/response types for the web API

use serde::{Deserialize, Serialize};

use crate::error::Status;
use crate::ocp::{ObjectClass, ObjectRole, BLOCK_ROLE};
use crate::protocol::{Event, Param};

/// Event name as posted; names this bridge does not know pass through
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventName {
    Known(Event),
    Unknown(String),
}

/// Panel event posted by a client standing in for the panel transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelEventRequest {
    pub event: EventName,
    #[serde(default)]
    pub params: Vec<Param>,
}

/// Status and parameter list returned for a panel event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelEventResponse {
    pub status: Status,
    pub params: Vec<Param>,
}

/// Object summary for listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectSummary {
    /// Address path, `MOM/<role>`
    pub path: String,
    pub role: String,
    pub class: ObjectClass,
}

impl From<ObjectRole> for ObjectSummary {
    fn from(role: ObjectRole) -> Self {
        let address = role.address();
        Self {
            path: format!("{}/{}", BLOCK_ROLE, address.role),
            role: address.role,
            class: address.class,
        }
    }
}

/// Generic API response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}
