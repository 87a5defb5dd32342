//! Device loop — the hexagonal core.
//!
//! [`DeviceLoop`] owns the channel table, both link supervisors, the UI
//! cursor and the sampling timers. It is driven by calling
//! [`tick`](DeviceLoop::tick) as often as the main loop can; every call does a
//! bounded amount of work and never blocks on the network.
//!
//! ```text
//!  NetworkPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!   BrokerPort ◀─▶ │        DeviceLoop         │
//!   SensorPort ──▶ │ links · channels · menu   │ ──▶ ActuatorPort
//!    InputPort ──▶ └──────────────────────────┘ ──▶ DisplayPort
//! ```
//!
//! ## Per-tick order
//!
//! 1. Network supervisor (start an attempt when due, level-check).
//! 2. Broker supervisor while the network is up; re-subscribe on connect.
//! 3. Boot gate: nothing below runs until the network has come up once or
//!    the boot policy gave up.
//! 4. Drain inbound messages into channels or auxiliary strings.
//! 5. Sample due sensors and publish; GPS fixes; heartbeat.
//! 6. Debounced buttons and the dial.
//! 7. Redraw if anything changed.

use log::{debug, info, warn};

use crate::channel::{Applied, Channels, Step};
use crate::codec::{self, encode_int};
use crate::config::NodeConfig;
use crate::input::{Debouncer, Dial, UiAction};
use crate::link::{LinkSupervisor, LinkTransition};
use crate::profile::{DeviceProfile, MAX_AUX, MAX_CHANNELS, MAX_CLIENT_ID, ValueDomain};
use crate::ui::{CONNECTING_BROKER, CONNECTING_NETWORK, Frame, LinkStatus, UiCursor, UiMode};

use super::commands::InboundMessage;
use super::events::{AppEvent, Link};
use super::ports::{
    ActuatorPort, BrokerPort, DisplayPort, EventSink, InputPort, NetworkPort, SensorPort,
};

pub type AuxText = heapless::String<64>;

/// Media-mode playback commands.
const MEDIA_PLAY_PAUSE: &[u8] = b"1";
const MEDIA_NEXT: &[u8] = b"2";
const MEDIA_PREV: &[u8] = b"3";

#[derive(Debug, Clone, Copy, Default)]
struct SampleTimer {
    next_due_ms: u64,
    last_published: Option<i32>,
}

// ───────────────────────────────────────────────────────────────
// DeviceLoop
// ───────────────────────────────────────────────────────────────

pub struct DeviceLoop {
    profile: &'static DeviceProfile,
    config: NodeConfig,
    client_id: heapless::String<MAX_CLIENT_ID>,
    network: LinkSupervisor,
    broker: LinkSupervisor,
    /// Broker session the current subscriptions belong to.
    subscribed_generation: u32,
    channels: Channels,
    aux: heapless::Vec<AuxText, MAX_AUX>,
    cursor: UiCursor,
    /// Redraw needed for reasons other than a channel value.
    ui_dirty: bool,
    last_status: LinkStatus,
    debouncer: Debouncer,
    dial: Option<Dial>,
    samplers: [SampleTimer; MAX_CHANNELS],
    heartbeat_due_ms: u64,
    heartbeat_count: u64,
    tick_count: u64,
}

impl DeviceLoop {
    /// Build the loop for `profile`. The client id is resolved with an
    /// all-zero MAC; use [`with_mac`](Self::with_mac) on real hardware.
    pub fn new(profile: &'static DeviceProfile, config: NodeConfig) -> Self {
        let aux = profile
            .aux
            .iter()
            .take(MAX_AUX)
            .map(|a| {
                let mut s = AuxText::new();
                let _ = s.push_str(a.placeholder);
                s
            })
            .collect();

        Self {
            profile,
            client_id: profile.client_id.resolve(&[0; 6]),
            network: LinkSupervisor::new(config.network.timing, config.network.boot),
            broker: LinkSupervisor::new(config.broker.timing, crate::config::BootPolicy::WaitForever),
            subscribed_generation: 0,
            channels: Channels::new(profile.channels),
            aux,
            cursor: UiCursor::default(),
            ui_dirty: true,
            last_status: LinkStatus::NoNetwork,
            debouncer: Debouncer::new(config.input.debounce_ms, config.input.debounce_mode),
            dial: profile.dial.map(Dial::new),
            samplers: [SampleTimer::default(); MAX_CHANNELS],
            heartbeat_due_ms: profile.heartbeat.map_or(0, |h| u64::from(h.interval_ms)),
            heartbeat_count: 0,
            tick_count: 0,
            config,
        }
    }

    /// Resolve the MQTT client id from the board's station MAC.
    #[must_use]
    pub fn with_mac(mut self, mac: &[u8; 6]) -> Self {
        self.client_id = self.profile.client_id.resolve(mac);
        self
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started { profile: self.profile.name });
        info!(
            "DeviceLoop started: profile={} client_id={} channels={}",
            self.profile.name,
            self.client_id,
            self.channels.len()
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one loop iteration at monotonic time `now_ms`.
    ///
    /// The `hw` parameter satisfies every board-side port at once, which
    /// avoids handing out several mutable borrows of the same adapter.
    pub fn tick(
        &mut self,
        now_ms: u64,
        net: &mut impl NetworkPort,
        broker: &mut impl BrokerPort,
        hw: &mut (impl SensorPort + ActuatorPort + InputPort + DisplayPort),
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        // 1. Network
        let net_up = net.is_connected();
        if let Some(t) = self.network.poll(now_ms, net_up, || net.begin_connect()) {
            self.on_network(t, now_ms, hw, sink);
        }

        // 2. Broker
        if self.network.is_up() {
            let broker_up = broker.is_connected();
            let client_id = &self.client_id;
            if let Some(t) = self.broker.poll(now_ms, broker_up, || broker.connect(client_id)) {
                self.on_broker(t, broker, hw, sink);
            } else if self.broker.is_up() && broker.session_generation() != self.subscribed_generation {
                warn!("MQTT: session re-established behind our back, resubscribing");
                sink.emit(&AppEvent::LinkDown(Link::Broker));
                sink.emit(&AppEvent::LinkUp(Link::Broker));
                self.subscribe_all(broker, sink);
            }
        }

        // 3. Boot gate
        if !self.network.boot_settled() {
            return;
        }

        // 4. Inbound
        while let Some(msg) = broker.poll_inbound() {
            self.handle_inbound(&msg, hw, sink);
        }

        // 5. Sensors, GPS, heartbeat
        self.sample_sensors(now_ms, broker, hw, sink);
        self.publish_gps(broker, hw, sink);
        self.heartbeat(now_ms, broker, sink);

        // 6. Local input
        let snap = hw.read_inputs(now_ms);
        for action in self.debouncer.actions(now_ms, &snap) {
            self.apply_action(action, broker, hw, sink);
        }
        if let Some(raw) = snap.encoder_count {
            self.update_dial(now_ms, raw, snap.dial_button, broker, sink);
        }

        // 7. Display
        self.redraw(hw);
    }

    // ── Link transitions ──────────────────────────────────────

    fn on_network(
        &mut self,
        t: LinkTransition,
        now_ms: u64,
        hw: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) {
        match t {
            LinkTransition::Up => {
                info!("WiFi: connected");
                sink.emit(&AppEvent::LinkUp(Link::Network));
                self.ui_dirty = true;
            }
            LinkTransition::Down => {
                warn!("WiFi: connection lost");
                sink.emit(&AppEvent::LinkDown(Link::Network));
                if self.broker.mark_down(now_ms).is_some() {
                    sink.emit(&AppEvent::LinkDown(Link::Broker));
                }
                self.ui_dirty = true;
            }
            LinkTransition::Attempting { attempt } => {
                info!("WiFi: connecting to '{}' (attempt {})", self.config.network.ssid, attempt);
                sink.emit(&AppEvent::Connecting { link: Link::Network, attempt });
                if self.profile.has_display && !self.network.boot_settled() {
                    hw.render(&Frame::Linking { message: CONNECTING_NETWORK });
                }
            }
            LinkTransition::AttemptFailed { attempt } => {
                debug!("WiFi: attempt {} failed", attempt);
            }
            LinkTransition::GaveUp { attempts } => {
                warn!("WiFi: giving up after {} attempts, running offline", attempts);
                sink.emit(&AppEvent::BootDegraded { attempts });
                self.ui_dirty = true;
            }
        }
    }

    fn on_broker(
        &mut self,
        t: LinkTransition,
        broker: &mut impl BrokerPort,
        hw: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) {
        match t {
            LinkTransition::Up => {
                info!("MQTT: connected as {}", self.client_id);
                sink.emit(&AppEvent::LinkUp(Link::Broker));
                self.subscribe_all(broker, sink);
                self.ui_dirty = true;
            }
            LinkTransition::Down => {
                warn!("MQTT: session lost");
                sink.emit(&AppEvent::LinkDown(Link::Broker));
                self.ui_dirty = true;
            }
            LinkTransition::Attempting { attempt } => {
                info!(
                    "MQTT: connecting to {}:{} (attempt {})",
                    self.config.broker.host, self.config.broker.port, attempt
                );
                sink.emit(&AppEvent::Connecting { link: Link::Broker, attempt });
                if self.profile.has_display {
                    hw.render(&Frame::Linking { message: CONNECTING_BROKER });
                }
            }
            LinkTransition::AttemptFailed { attempt } | LinkTransition::GaveUp { attempts: attempt } => {
                debug!(
                    "MQTT: attempt {} failed, retry in {} ms",
                    attempt, self.config.broker.timing.retry_delay_ms
                );
                self.ui_dirty = true;
            }
        }
    }

    /// Subscriptions do not survive a session; redo all of them.
    fn subscribe_all(&mut self, broker: &mut impl BrokerPort, sink: &mut impl EventSink) {
        self.subscribed_generation = broker.session_generation();
        for topic in self.profile.subscriptions() {
            match broker.subscribe(topic) {
                Ok(()) => {
                    debug!("MQTT: subscribed to {}", topic);
                    sink.emit(&AppEvent::Subscribed { topic });
                }
                Err(error) => {
                    warn!("MQTT: subscribe to {} failed: {}", topic, error);
                    sink.emit(&AppEvent::SubscribeFailed { topic, error });
                }
            }
        }
    }

    // ── Inbound ───────────────────────────────────────────────

    fn handle_inbound(
        &mut self,
        msg: &InboundMessage,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        let topic = msg.topic.as_str();
        if let Some(idx) = self.channels.find_by_topic(topic) {
            match self.channels.apply_remote(idx, &msg.payload, self.config.inbound_range) {
                Ok(Applied::Changed(value)) => {
                    debug!("MQTT: {} <- {}", topic, value);
                    hw.apply(idx, value);
                    sink.emit(&AppEvent::ChannelChanged { channel: idx, value, remote: true });
                }
                Ok(Applied::Unchanged) => {}
                Err(error) => {
                    debug!("MQTT: rejected payload on {}: {}", topic, error);
                    sink.emit(&AppEvent::InboundRejected { channel: idx, error });
                }
            }
            return;
        }

        let Some(index) = self.profile.aux.iter().position(|a| a.topic == topic) else {
            return;
        };
        let (Some(text), Some(slot)) = (msg.payload_str(), self.aux.get_mut(index)) else {
            return;
        };
        slot.clear();
        for c in text.chars() {
            if slot.push(c).is_err() {
                break;
            }
        }
        self.ui_dirty = true;
        sink.emit(&AppEvent::AuxUpdated { index });
    }

    // ── Outbound ──────────────────────────────────────────────

    fn sample_sensors(
        &mut self,
        now_ms: u64,
        broker: &mut impl BrokerPort,
        hw: &mut impl SensorPort,
        sink: &mut impl EventSink,
    ) {
        for idx in 0..self.channels.len() {
            let Some(spec) = self.channels.spec(idx) else {
                continue;
            };
            let ValueDomain::Sensor { publish, interval_ms } = spec.domain else {
                continue;
            };
            if interval_ms == 0 || now_ms < self.samplers[idx].next_due_ms {
                continue;
            }
            self.samplers[idx].next_due_ms = now_ms + u64::from(interval_ms);

            let value = match hw.sample(idx) {
                None => continue,
                Some(Err(e)) => {
                    debug!("Sensor: {} read failed: {}", spec.label, e);
                    continue;
                }
                Some(Ok(v)) => v,
            };
            if let Applied::Changed(v) = self.channels.set_local(idx, value) {
                sink.emit(&AppEvent::ChannelChanged { channel: idx, value: v, remote: false });
            }
            if self.broker.is_up()
                && publish.should_publish(value, self.samplers[idx].last_published)
                && publish_value(broker, sink, spec.topic, value, true)
            {
                self.samplers[idx].last_published = Some(value);
            }
        }
    }

    fn publish_gps(
        &mut self,
        broker: &mut impl BrokerPort,
        hw: &mut impl SensorPort,
        sink: &mut impl EventSink,
    ) {
        let Some(topic) = self.profile.gps_topic else {
            return;
        };
        let Some(fix) = hw.take_gps_fix() else {
            return;
        };
        if !self.broker.is_up() {
            debug!("GPS: fix dropped, broker down");
            return;
        }
        match codec::encode_gps(&fix) {
            Ok(json) => {
                info!("GPS: {}", json);
                if broker.publish(topic, json.as_bytes(), false).is_ok() {
                    sink.emit(&AppEvent::Published { topic, value: None, retained: false });
                }
            }
            Err(e) => warn!("GPS: encode failed: {}", e),
        }
    }

    fn heartbeat(&mut self, now_ms: u64, broker: &mut impl BrokerPort, sink: &mut impl EventSink) {
        let Some(hb) = self.profile.heartbeat else {
            return;
        };
        if now_ms < self.heartbeat_due_ms {
            return;
        }
        self.heartbeat_due_ms = now_ms + u64::from(hb.interval_ms);
        self.heartbeat_count += 1;
        if self.broker.is_up() {
            let value = i32::try_from(self.heartbeat_count).unwrap_or(i32::MAX);
            publish_value(broker, sink, hb.topic, value, false);
        }
    }

    // ── Local input ───────────────────────────────────────────

    fn apply_action(
        &mut self,
        action: UiAction,
        broker: &mut impl BrokerPort,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        if action == UiAction::ToggleMode {
            if self.profile.media_topic.is_some() {
                self.cursor.toggle_mode();
                self.ui_dirty = true;
                debug!("UI: mode {:?}", self.cursor.mode);
            }
            return;
        }

        if self.cursor.mode == UiMode::Media {
            let Some(topic) = self.profile.media_topic else {
                return;
            };
            let code = match action {
                UiAction::Select => MEDIA_PLAY_PAUSE,
                UiAction::Next => MEDIA_NEXT,
                UiAction::Prev | UiAction::ToggleMode => MEDIA_PREV,
            };
            if !self.broker.is_up() {
                debug!("UI: media command dropped, broker down");
                return;
            }
            if let Err(e) = broker.publish(topic, code, false) {
                debug!("MQTT: publish to {} failed: {}", topic, e);
            }
            return;
        }

        let len = self.channels.len();
        let idx = self.cursor.selected;
        match (action, self.cursor.editing) {
            (UiAction::Next, false) => {
                self.cursor.next(len);
                self.ui_dirty = true;
            }
            (UiAction::Prev, false) => {
                self.cursor.prev(len);
                self.ui_dirty = true;
            }
            // While editing, Next lowers the value and Prev raises it.
            (UiAction::Next, true) => self.edit(idx, Step::Down, hw, sink),
            (UiAction::Prev, true) => self.edit(idx, Step::Up, hw, sink),
            (UiAction::Select, editing) => {
                self.ui_dirty = true;
                let Some(spec) = self.channels.spec(idx) else {
                    return;
                };
                if spec.domain.is_sensor() {
                    return;
                }
                self.cursor.editing = !editing;
                if editing {
                    let value = self.channels.value(idx).unwrap_or(0);
                    if self.broker.is_up() {
                        publish_value(broker, sink, spec.topic, value, true);
                    } else {
                        debug!("UI: {} = {} not published, broker down", spec.topic, value);
                    }
                }
            }
            (UiAction::ToggleMode, _) => {}
        }
    }

    fn edit(
        &mut self,
        idx: usize,
        step: Step,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        self.ui_dirty = true;
        if let Applied::Changed(value) = self.channels.step(idx, step) {
            hw.apply(idx, value);
            sink.emit(&AppEvent::ChannelChanged { channel: idx, value, remote: false });
        }
    }

    fn update_dial(
        &mut self,
        now_ms: u64,
        raw: i32,
        button_down: bool,
        broker: &mut impl BrokerPort,
        sink: &mut impl EventSink,
    ) {
        let broker_up = self.broker.is_up();
        let Some(dial) = self.dial.as_mut() else {
            return;
        };
        let update = dial.update(now_ms, raw, button_down);
        if let Some(value) = update.moved_to {
            debug!("Dial: value {}", value);
        }
        if let Some(topic) = update.target_changed {
            info!("Dial: target {}", topic);
            sink.emit(&AppEvent::DialTarget { topic });
        }
        if !broker_up {
            return;
        }
        if let Some(p) = dial.pending(now_ms) {
            if publish_value(broker, sink, p.topic, p.value, false) {
                dial.mark_published(p.value);
            }
        }
    }

    // ── Display ───────────────────────────────────────────────

    fn redraw(&mut self, hw: &mut impl DisplayPort) {
        if !self.profile.has_display {
            self.channels.clear_dirty();
            return;
        }
        let status = LinkStatus::from_links(self.network.is_up(), self.broker.is_up());
        if status != self.last_status {
            self.last_status = status;
            self.ui_dirty = true;
        }
        if !self.ui_dirty && !self.channels.any_dirty() {
            return;
        }
        if let Some(frame) = Frame::build(&self.channels, &self.cursor, &self.aux, status) {
            hw.render(&frame);
        }
        self.ui_dirty = false;
        self.channels.clear_dirty();
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn profile(&self) -> &'static DeviceProfile {
        self.profile
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn channels(&self) -> &Channels {
        &self.channels
    }

    pub fn cursor(&self) -> UiCursor {
        self.cursor
    }

    pub fn aux(&self, index: usize) -> Option<&str> {
        self.aux.get(index).map(AuxText::as_str)
    }

    pub fn network_up(&self) -> bool {
        self.network.is_up()
    }

    pub fn broker_up(&self) -> bool {
        self.broker.is_up()
    }

    pub fn boot_settled(&self) -> bool {
        self.network.boot_settled()
    }

    pub fn heartbeat_count(&self) -> u64 {
        self.heartbeat_count
    }

    pub fn dial_value(&self) -> Option<i32> {
        self.dial.as_ref().map(Dial::value)
    }

    /// Total loop iterations since start.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

/// Publish an integer value; returns whether it was queued.
fn publish_value(
    broker: &mut impl BrokerPort,
    sink: &mut impl EventSink,
    topic: &'static str,
    value: i32,
    retain: bool,
) -> bool {
    match broker.publish(topic, encode_int(value).as_bytes(), retain) {
        Ok(()) => {
            debug!("MQTT: {} -> {}", topic, value);
            sink.emit(&AppEvent::Published { topic, value: Some(value), retained: retain });
            true
        }
        Err(e) => {
            debug!("MQTT: publish to {} failed: {}", topic, e);
            false
        }
    }
}
