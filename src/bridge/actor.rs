//! Serialized access to the bridge
//!
//! One task owns the [`Bridge`] and runs every operation from either
//! protocol in arrival order. Notifications an operation queues are
//! delivered before its reply is sent.

use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::Status;
use crate::ocp::{Command, PropertyChanged, Value};
use crate::protocol::{Event, Param, PanelTransport};

use super::{Bridge, DeviceIdentity, Notification, Snapshot};

const QUEUE_DEPTH: usize = 64;
const PROPERTY_BACKLOG: usize = 256;

enum Message {
    PanelEvent {
        event: Event,
        params: Vec<Param>,
        reply: oneshot::Sender<(Status, Vec<Param>)>,
    },
    Command {
        command: Command,
        reply: oneshot::Sender<crate::error::Result<Option<Value>>>,
    },
    Snapshot {
        reply: oneshot::Sender<Snapshot>,
    },
    NotifyIdentity,
}

/// Cloneable client of the bridge task
#[derive(Clone)]
pub struct BridgeHandle {
    tx: mpsc::Sender<Message>,
    properties: broadcast::Sender<PropertyChanged>,
    identity: watch::Receiver<DeviceIdentity>,
}

impl BridgeHandle {
    /// Run a panel event, returning its status and parameters
    pub async fn handle_event(&self, event: Event, params: Vec<Param>) -> Result<(Status, Vec<Param>)> {
        let (reply, rx) = oneshot::channel();
        self.send(Message::PanelEvent {
            event,
            params,
            reply,
        })
        .await?;
        rx.await.context("bridge dropped the reply")
    }

    /// Run a device command
    pub async fn handle_command(&self, command: Command) -> Result<crate::error::Result<Option<Value>>> {
        let (reply, rx) = oneshot::channel();
        self.send(Message::Command { command, reply }).await?;
        rx.await.context("bridge dropped the reply")
    }

    pub async fn snapshot(&self) -> Result<Snapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(Message::Snapshot { reply }).await?;
        rx.await.context("bridge dropped the reply")
    }

    /// Property-changed events raised from now on
    pub fn subscribe(&self) -> broadcast::Receiver<PropertyChanged> {
        self.properties.subscribe()
    }

    pub fn identity(&self) -> DeviceIdentity {
        self.identity.borrow().clone()
    }

    async fn send(&self, message: Message) -> Result<()> {
        self.tx
            .send(message)
            .await
            .map_err(|_| anyhow!("bridge task stopped"))
    }
}

/// Start the bridge task and its identity watcher
pub fn spawn(bridge: Bridge, transport: Arc<dyn PanelTransport>) -> (BridgeHandle, Vec<JoinHandle<()>>) {
    let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
    let (properties, _) = broadcast::channel(PROPERTY_BACKLOG);
    let identity = bridge.subscribe_identity();

    let handle = BridgeHandle {
        tx: tx.clone(),
        properties: properties.clone(),
        identity: identity.clone(),
    };

    let tasks = vec![
        tokio::spawn(run(bridge, rx, transport, properties)),
        tokio::spawn(watch_identity(identity, tx.downgrade())),
    ];

    (handle, tasks)
}

async fn run(
    mut bridge: Bridge,
    mut rx: mpsc::Receiver<Message>,
    transport: Arc<dyn PanelTransport>,
    properties: broadcast::Sender<PropertyChanged>,
) {
    info!("Bridge running");

    while let Some(message) = rx.recv().await {
        match message {
            Message::PanelEvent {
                event,
                params,
                reply,
            } => {
                let result = bridge.handle_event(event, params);
                deliver(&mut bridge, transport.as_ref(), &properties);
                let _ = reply.send(result);
            }
            Message::Command { command, reply } => {
                let result = bridge.handle_command(&command);
                deliver(&mut bridge, transport.as_ref(), &properties);
                let _ = reply.send(result);
            }
            Message::Snapshot { reply } => {
                let _ = reply.send(bridge.snapshot());
            }
            Message::NotifyIdentity => {
                bridge.notify_identity();
                deliver(&mut bridge, transport.as_ref(), &properties);
            }
        }
    }

    info!("Bridge stopped");
}

fn deliver(
    bridge: &mut Bridge,
    transport: &dyn PanelTransport,
    properties: &broadcast::Sender<PropertyChanged>,
) {
    for notification in bridge.take_notifications() {
        match notification {
            Notification::Panel(notification) => notification.deliver(transport),
            Notification::Property(changed) => {
                debug!("{} {} = {:?}", changed.role, changed.property, changed.value);
                // No subscribers is not an error
                let _ = properties.send(changed);
            }
        }
    }
}

/// Tell the panel host whenever the published identity changes
async fn watch_identity(mut identity: watch::Receiver<DeviceIdentity>, tx: mpsc::WeakSender<Message>) {
    while identity.changed().await.is_ok() {
        identity.borrow_and_update();

        let Some(sender) = tx.upgrade() else {
            break;
        };
        if sender.send(Message::NotifyIdentity).await.is_err() {
            break;
        }
    }
}
