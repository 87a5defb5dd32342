//! MQTT session adapter.
//!
//! Implements [`BrokerPort`]. Received PUBLISHes are copied into
//! [`InboundMessage`]s and queued for the device loop, which drains them
//! with `poll_inbound` once per tick.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::mqtt::client::EspMqttClient`.
//!   A receiver thread drives the connection, tracks the session level in an
//!   `AtomicBool` and forwards messages over a bounded channel. The client
//!   reconnects on its own, so `connect` only creates it once.
//! - **all other targets**: an in-memory broker that loops publishes back to
//!   matching subscriptions and records everything it was sent.

use log::{debug, info, warn};

use crate::app::commands::InboundMessage;
use crate::app::ports::BrokerPort;
use crate::config::NodeConfig;
use crate::error::LinkError;

#[cfg(target_os = "espidf")]
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU32, Ordering},
    mpsc,
};

#[cfg(target_os = "espidf")]
use embedded_svc::mqtt::client::{Details, EventPayload, QoS};
#[cfg(target_os = "espidf")]
use esp_idf_svc::mqtt::client::{EspMqttClient, EspMqttConnection, MqttClientConfiguration};

/// Messages buffered between the receiver thread and the loop.
#[cfg(target_os = "espidf")]
const INBOUND_QUEUE: usize = 16;

// ───────────────────────────────────────────────────────────────
// ESP-IDF client
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub struct MqttAdapter {
    url: heapless::String<80>,
    reconnect_ms: u32,
    client: Option<EspMqttClient<'static>>,
    connected: Arc<AtomicBool>,
    generation: Arc<AtomicU32>,
    tx: mpsc::SyncSender<InboundMessage>,
    rx: mpsc::Receiver<InboundMessage>,
}

#[cfg(target_os = "espidf")]
impl MqttAdapter {
    pub fn new(cfg: &NodeConfig) -> Self {
        let (tx, rx) = mpsc::sync_channel(INBOUND_QUEUE);
        Self {
            url: cfg.broker_url(),
            reconnect_ms: cfg.broker.timing.retry_delay_ms,
            client: None,
            connected: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU32::new(0)),
            tx,
            rx,
        }
    }

    fn spawn_receiver(&self, mut conn: EspMqttConnection) -> Result<(), LinkError> {
        let connected = Arc::clone(&self.connected);
        let generation = Arc::clone(&self.generation);
        let tx = self.tx.clone();
        std::thread::Builder::new()
            .name("mqtt-rx".into())
            .stack_size(6 * 1024)
            .spawn(move || {
                while let Ok(event) = conn.next() {
                    match event.payload() {
                        EventPayload::Connected(_) => {
                            info!("MQTT: session up");
                            // Bumped before the level so a poll that sees the
                            // session up also sees its generation.
                            generation.fetch_add(1, Ordering::Release);
                            connected.store(true, Ordering::Release);
                        }
                        EventPayload::Disconnected => {
                            warn!("MQTT: session lost");
                            connected.store(false, Ordering::Relaxed);
                        }
                        EventPayload::Received {
                            topic: Some(topic),
                            data,
                            details: Details::Complete,
                            ..
                        } => match InboundMessage::new(topic, data) {
                            Ok(msg) => {
                                if tx.try_send(msg).is_err() {
                                    warn!("MQTT: inbound queue full, dropping '{}'", topic);
                                }
                            }
                            Err(_) => {
                                warn!("MQTT: dropping oversized message on '{}' ({} bytes)", topic, data.len());
                            }
                        },
                        _ => {}
                    }
                }
                connected.store(false, Ordering::Relaxed);
                info!("MQTT: connection closed");
            })
            .map(drop)
            .map_err(|_| LinkError::BrokerUnavailable)
    }
}

#[cfg(target_os = "espidf")]
impl BrokerPort for MqttAdapter {
    fn connect(&mut self, client_id: &str) -> Result<(), LinkError> {
        if self.client.is_some() {
            return Ok(());
        }
        info!("MQTT: connecting to {} as '{}'", self.url, client_id);
        let conf = MqttClientConfiguration {
            client_id: Some(client_id),
            reconnect_timeout: Some(std::time::Duration::from_millis(u64::from(self.reconnect_ms))),
            ..Default::default()
        };
        let (client, conn) = EspMqttClient::new(self.url.as_str(), &conf).map_err(|e| {
            warn!("MQTT: client creation failed: {:?}", e);
            LinkError::BrokerUnavailable
        })?;
        self.spawn_receiver(conn)?;
        self.client = Some(client);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn session_generation(&self) -> u32 {
        self.generation.load(Ordering::Acquire)
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), LinkError> {
        let client = self.client.as_mut().ok_or(LinkError::NotConnected)?;
        client
            .subscribe(topic, QoS::AtMostOnce)
            .map(drop)
            .map_err(|_| LinkError::SubscribeFailed)
    }

    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), LinkError> {
        let client = self.client.as_mut().ok_or(LinkError::NotConnected)?;
        client
            .enqueue(topic, QoS::AtLeastOnce, retain, payload)
            .map(drop)
            .map_err(|_| LinkError::PublishFailed)
    }

    fn poll_inbound(&mut self) -> Option<InboundMessage> {
        self.rx.try_recv().ok()
    }
}

// ───────────────────────────────────────────────────────────────
// In-memory broker (host)
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
use std::collections::VecDeque;

/// One message the node sent.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub topic: String,
    pub payload: Vec<u8>,
    pub retained: bool,
}

#[cfg(not(target_os = "espidf"))]
pub struct MqttAdapter {
    url: heapless::String<80>,
    available: bool,
    session: bool,
    generation: u32,
    subscriptions: Vec<String>,
    inbound: VecDeque<InboundMessage>,
    sent: Vec<SentMessage>,
}

#[cfg(not(target_os = "espidf"))]
impl MqttAdapter {
    pub fn new(cfg: &NodeConfig) -> Self {
        Self {
            url: cfg.broker_url(),
            available: true,
            session: false,
            generation: 0,
            subscriptions: Vec::new(),
            inbound: VecDeque::new(),
            sent: Vec::new(),
        }
    }

    /// Take the broker down (dropping the session) or bring it back.
    pub fn sim_set_available(&mut self, available: bool) {
        self.available = available;
        if !available {
            self.session = false;
        }
    }

    /// Drop and re-establish the session at once, as a client that
    /// reconnects on its own does between two polls.
    pub fn sim_bounce_session(&mut self) {
        if self.session {
            self.subscriptions.clear();
            self.generation = self.generation.wrapping_add(1);
        }
    }

    /// Deliver a message as if another client had published it.
    pub fn sim_inject(&mut self, topic: &str, payload: &[u8]) {
        if !self.subscriptions.iter().any(|s| s == topic) {
            return;
        }
        match InboundMessage::new(topic, payload) {
            Ok(msg) => self.inbound.push_back(msg),
            Err(_) => warn!("MQTT(sim): dropping oversized message on '{}'", topic),
        }
    }

    pub fn sent(&self) -> &[SentMessage] {
        &self.sent
    }

    pub fn subscriptions(&self) -> &[String] {
        &self.subscriptions
    }
}

#[cfg(not(target_os = "espidf"))]
impl BrokerPort for MqttAdapter {
    fn connect(&mut self, client_id: &str) -> Result<(), LinkError> {
        if !self.available {
            return Err(LinkError::BrokerUnavailable);
        }
        info!("MQTT(sim): session to {} as '{}'", self.url, client_id);
        // A new session starts without subscriptions.
        self.subscriptions.clear();
        self.session = true;
        self.generation = self.generation.wrapping_add(1);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.session
    }

    fn session_generation(&self) -> u32 {
        self.generation
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), LinkError> {
        if !self.is_connected() {
            return Err(LinkError::NotConnected);
        }
        if !self.subscriptions.iter().any(|s| s == topic) {
            self.subscriptions.push(topic.to_owned());
        }
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), LinkError> {
        if !self.is_connected() {
            return Err(LinkError::NotConnected);
        }
        debug!("MQTT(sim): {} <- {:?} (retain={})", topic, payload, retain);
        self.sent.push(SentMessage {
            topic: topic.to_owned(),
            payload: payload.to_vec(),
            retained: retain,
        });
        self.sim_inject(topic, payload);
        Ok(())
    }

    fn poll_inbound(&mut self) -> Option<InboundMessage> {
        self.inbound.pop_front()
    }
}
