//! HTTP surface standing in for both protocol transports

mod handlers;
pub mod server;
mod types;

pub use server::{router, start_server};
pub use types::{ApiResponse, EventName, ObjectSummary, PanelEventRequest, PanelEventResponse};
