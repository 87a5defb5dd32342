//! Mock adapters for integration tests.
//!
//! Every port the device loop talks to is replaced by an in-memory double
//! that records what it was asked to do, so tests can assert on the full
//! publish/apply/render history without touching a radio or GPIO.

use std::collections::{HashMap, VecDeque};

use homenode::app::commands::InboundMessage;
use homenode::app::events::AppEvent;
use homenode::app::ports::{
    ActuatorPort, BrokerPort, DisplayPort, EventSink, InputPort, NetworkPort, SensorPort,
};
use homenode::app::service::DeviceLoop;
use homenode::codec::GpsFix;
use homenode::config::NodeConfig;
use homenode::error::{LinkError, SensorError};
use homenode::input::InputSnapshot;
use homenode::profile::DeviceProfile;
use homenode::ui::{Frame, LinkStatus};

// ── MockNetwork ───────────────────────────────────────────────

pub struct MockNetwork {
    /// Whether the access point answers.
    pub available: bool,
    pub associated: bool,
    pub attempts: u32,
    /// Uninterrupted time an association needs before the link is up.
    /// Every `begin_connect` restarts it.
    pub assoc_ms: u64,
    /// When the association in progress started.
    pub joining_since: Option<u64>,
    /// Mirrors the node clock; set by the harness before each tick.
    pub now_ms: u64,
}

#[allow(dead_code)]
impl MockNetwork {
    /// Already associated, as after a fast boot.
    pub fn up() -> Self {
        Self { associated: true, ..Self::unreachable() }
    }

    /// Access point out of range.
    pub fn unreachable() -> Self {
        Self {
            available: false,
            associated: false,
            attempts: 0,
            assoc_ms: 0,
            joining_since: None,
            now_ms: 0,
        }
    }

    /// Reachable access point that takes `assoc_ms` to join.
    pub fn slow(assoc_ms: u64) -> Self {
        Self { available: true, assoc_ms, ..Self::unreachable() }
    }

    pub fn drop_link(&mut self) {
        self.associated = false;
        self.joining_since = None;
    }
}

impl NetworkPort for MockNetwork {
    fn begin_connect(&mut self) -> Result<(), LinkError> {
        self.attempts += 1;
        self.associated = self.available && self.assoc_ms == 0;
        self.joining_since = (self.available && self.assoc_ms > 0).then_some(self.now_ms);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.associated
            || self
                .joining_since
                .is_some_and(|t| self.available && self.now_ms.saturating_sub(t) >= self.assoc_ms)
    }
}

// ── MockBroker ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publish {
    pub topic: String,
    pub payload: String,
    pub retained: bool,
}

pub struct MockBroker {
    pub available: bool,
    pub session: bool,
    /// Sessions established so far.
    pub generation: u32,
    pub client_ids: Vec<String>,
    /// Every SUBSCRIBE, in order, across all sessions.
    pub subscribe_calls: Vec<String>,
    pub published: Vec<Publish>,
    pub inbound: VecDeque<InboundMessage>,
}

#[allow(dead_code)]
impl MockBroker {
    pub fn new() -> Self {
        Self {
            available: true,
            session: false,
            generation: 0,
            client_ids: Vec::new(),
            subscribe_calls: Vec::new(),
            published: Vec::new(),
            inbound: VecDeque::new(),
        }
    }

    /// Queue a message as if another client had published it.
    pub fn inject(&mut self, topic: &str, payload: &[u8]) {
        self.inbound.push_back(InboundMessage::new(topic, payload).expect("test message fits"));
    }

    pub fn drop_session(&mut self) {
        self.session = false;
    }

    /// Lose and regain the session without the level ever reading down.
    pub fn bounce_session(&mut self) {
        self.generation += 1;
    }

    pub fn published_on(&self, topic: &str) -> Vec<&Publish> {
        self.published.iter().filter(|p| p.topic == topic).collect()
    }

    pub fn payloads_on(&self, topic: &str) -> Vec<String> {
        self.published_on(topic).into_iter().map(|p| p.payload.clone()).collect()
    }
}

impl Default for MockBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl BrokerPort for MockBroker {
    fn connect(&mut self, client_id: &str) -> Result<(), LinkError> {
        self.client_ids.push(client_id.to_owned());
        if !self.available {
            return Err(LinkError::BrokerUnavailable);
        }
        self.session = true;
        self.generation += 1;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.session
    }

    fn session_generation(&self) -> u32 {
        self.generation
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), LinkError> {
        if !self.session {
            return Err(LinkError::NotConnected);
        }
        self.subscribe_calls.push(topic.to_owned());
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), LinkError> {
        if !self.session {
            return Err(LinkError::NotConnected);
        }
        self.published.push(Publish {
            topic: topic.to_owned(),
            payload: String::from_utf8_lossy(payload).into_owned(),
            retained: retain,
        });
        Ok(())
    }

    fn poll_inbound(&mut self) -> Option<InboundMessage> {
        self.inbound.pop_front()
    }
}

// ── MockHardware ──────────────────────────────────────────────

/// Owned copy of a rendered [`Frame`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Menu { selected: &'static str, value: i32, status: LinkStatus },
    Edit { label: &'static str, value: i32 },
    Media { top: String, bottom: String },
    Linking(&'static str),
}

pub struct MockHardware {
    /// Scripted reading per channel; channels without one report no sensor.
    pub samples: HashMap<usize, Result<i32, SensorError>>,
    pub sample_calls: usize,
    pub gps: VecDeque<GpsFix>,
    /// Returned by every `read_inputs` until changed.
    pub inputs: InputSnapshot,
    pub input_reads: usize,
    pub applied: Vec<(usize, i32)>,
    pub frames: Vec<Rendered>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            samples: HashMap::new(),
            sample_calls: 0,
            gps: VecDeque::new(),
            inputs: InputSnapshot::default(),
            input_reads: 0,
            applied: Vec::new(),
            frames: Vec::new(),
        }
    }

    pub fn set_sample(&mut self, channel: usize, value: i32) {
        self.samples.insert(channel, Ok(value));
    }

    pub fn last_frame(&self) -> Option<&Rendered> {
        self.frames.last()
    }

    /// Last value driven onto `channel`'s output.
    pub fn output(&self, channel: usize) -> Option<i32> {
        self.applied.iter().rev().find(|(c, _)| *c == channel).map(|(_, v)| *v)
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn sample(&mut self, channel: usize) -> Option<Result<i32, SensorError>> {
        self.sample_calls += 1;
        self.samples.get(&channel).copied()
    }

    fn take_gps_fix(&mut self) -> Option<GpsFix> {
        self.gps.pop_front()
    }
}

impl ActuatorPort for MockHardware {
    fn apply(&mut self, channel: usize, value: i32) {
        self.applied.push((channel, value));
    }
}

impl InputPort for MockHardware {
    fn read_inputs(&mut self, _now_ms: u64) -> InputSnapshot {
        self.input_reads += 1;
        self.inputs
    }
}

impl DisplayPort for MockHardware {
    fn render(&mut self, frame: &Frame<'_>) {
        let rendered = match *frame {
            Frame::Menu { rows, status } => {
                Rendered::Menu { selected: rows[1].label, value: rows[1].value, status }
            }
            Frame::Edit { label, value } => Rendered::Edit { label, value },
            Frame::Media { top, bottom } => {
                Rendered::Media { top: top.to_owned(), bottom: bottom.to_owned() }
            }
            Frame::Linking { message } => Rendered::Linking(message),
        };
        self.frames.push(rendered);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Node harness ──────────────────────────────────────────────

/// One device loop wired to mocks, with its own clock.
pub struct Node {
    pub device: DeviceLoop,
    pub net: MockNetwork,
    pub broker: MockBroker,
    pub hw: MockHardware,
    pub sink: RecordingSink,
    pub now: u64,
}

/// Spacing between simulated button presses; longer than the debounce.
pub const PRESS_GAP_MS: u64 = 350;

#[allow(dead_code)]
impl Node {
    /// Network reachable, broker reachable, nothing ticked yet.
    pub fn new(profile: &'static DeviceProfile) -> Self {
        Self::with_config(profile, NodeConfig::for_profile(profile))
    }

    pub fn with_config(profile: &'static DeviceProfile, config: NodeConfig) -> Self {
        let mut sink = RecordingSink::new();
        let mut device = DeviceLoop::new(profile, config);
        device.start(&mut sink);
        Self {
            device,
            net: MockNetwork::up(),
            broker: MockBroker::new(),
            hw: MockHardware::new(),
            sink,
            now: 0,
        }
    }

    /// Tick at 0 ms (network up, broker attempt) and 10 ms (broker up).
    pub fn boot(mut self) -> Self {
        self.tick_at(0);
        self.tick_at(10);
        self
    }

    pub fn online(profile: &'static DeviceProfile) -> Self {
        Self::new(profile).boot()
    }

    pub fn tick_at(&mut self, now_ms: u64) {
        self.now = now_ms;
        self.net.now_ms = now_ms;
        self.device
            .tick(now_ms, &mut self.net, &mut self.broker, &mut self.hw, &mut self.sink);
    }

    /// Tick every `step_ms` for `duration_ms`.
    pub fn run_for(&mut self, duration_ms: u64, step_ms: u64) {
        let end = self.now + duration_ms;
        while self.now < end {
            let next = (self.now + step_ms).min(end);
            self.tick_at(next);
        }
    }

    /// Tick until `done` holds or `limit_ms` passes. Returns whether it held.
    pub fn run_until(&mut self, limit_ms: u64, step_ms: u64, done: impl Fn(&Self) -> bool) -> bool {
        while self.now < limit_ms {
            if done(self) {
                return true;
            }
            self.tick_at(self.now + step_ms);
        }
        done(self)
    }

    /// Hold buttons for one tick after a debounce gap, then release them.
    pub fn press(&mut self, set: impl FnOnce(&mut InputSnapshot)) {
        set(&mut self.hw.inputs);
        self.tick_at(self.now + PRESS_GAP_MS);
        self.hw.inputs = InputSnapshot {
            encoder_count: self.hw.inputs.encoder_count,
            ..InputSnapshot::default()
        };
    }

    pub fn press_next(&mut self) {
        self.press(|s| s.next = true);
    }

    pub fn press_prev(&mut self) {
        self.press(|s| s.prev = true);
    }

    pub fn press_select(&mut self) {
        self.press(|s| s.select = true);
    }

    pub fn press_mode(&mut self) {
        self.press(|s| s.mode = true);
    }

    /// Deliver a message and process it on the next tick.
    pub fn receive(&mut self, topic: &str, payload: &[u8]) {
        self.broker.inject(topic, payload);
        self.tick_at(self.now + 10);
    }
}
