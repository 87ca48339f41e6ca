pub mod bridge;
pub mod config;
pub mod error;
pub mod ocp;
pub mod panel;
pub mod prefs;
pub mod protocol;
pub mod state;
pub mod web;

use anyhow::Result;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use bridge::actor::{self, BridgeHandle};
use bridge::Bridge;
use config::Config;
use prefs::{FileStore, Preferences};
use protocol::{PanelTransport, TracingTransport};

/// Main application struct
pub struct App {
    config: Config,
    bridge: BridgeHandle,
    tasks: Vec<JoinHandle<()>>,
    prefs_writer: Option<JoinHandle<()>>,
}

impl App {
    /// Create a new application instance with persisted preferences
    pub async fn new(config: Config) -> Result<Self> {
        let path = config.preferences_path()?;
        info!("Preferences at {:?}", path);
        let (store, writer) = FileStore::open(path);
        let prefs = Preferences::new(store);

        let mut app = Self::with_transport(config, prefs, Arc::new(TracingTransport));
        app.prefs_writer = Some(writer);
        Ok(app)
    }

    /// Create an application over an explicit store and panel transport
    pub fn with_transport(
        config: Config,
        prefs: Preferences,
        transport: Arc<dyn PanelTransport>,
    ) -> Self {
        let bridge = Bridge::new(prefs, config.bridge_options());
        let identity = bridge.identity();
        info!(
            "Device {} ({}), serial {}",
            identity.name,
            identity.inventory_code(),
            identity.serial_number
        );

        let (bridge, tasks) = actor::spawn(bridge, transport);

        Self {
            config,
            bridge,
            tasks,
            prefs_writer: None,
        }
    }

    pub fn bridge(&self) -> &BridgeHandle {
        &self.bridge
    }

    /// Serve the HTTP surface until it fails, or wait forever when disabled
    pub async fn run(&mut self) -> Result<()> {
        if !self.config.listener.enabled {
            info!("Listener disabled");
            std::future::pending::<()>().await;
            return Ok(());
        }

        web::start_server(self.bridge.clone(), self.config.listener.port).await
    }

    /// Gracefully shutdown the application
    pub async fn shutdown(&mut self) {
        info!("Shutting down mom-bridge...");

        // Stopping the bridge drops the preference store, which lets the
        // writer finish the queued snapshot and exit
        for task in self.tasks.drain(..) {
            task.abort();
            let _ = task.await;
        }
        if let Some(writer) = self.prefs_writer.take() {
            if let Err(e) = writer.await {
                warn!("Preference writer failed: {}", e);
            }
        }

        info!("Shutdown complete");
    }
}
