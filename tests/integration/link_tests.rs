//! Integration tests for link supervision: boot gating, give-up, broker
//! outages and re-subscription.

use crate::mock_hw::{MockNetwork, Node, Rendered};

use homenode::app::events::{AppEvent, Link};
use homenode::config::{BootPolicy, HALL_BOOT_WINDOW_MS, LinkTiming, NodeConfig};
use homenode::profile::{HALL, LAWN_SONAR};
use homenode::ui::{CONNECTING_NETWORK, LinkStatus};

fn is_link_up(link: Link) -> impl Fn(&AppEvent) -> bool {
    move |e| *e == AppEvent::LinkUp(link)
}

// ── Boot gate ─────────────────────────────────────────────────

#[test]
fn hall_gives_up_after_one_boot_window_and_runs_offline() {
    let mut node = Node::new(&HALL);
    node.net = MockNetwork::unreachable();
    node.hw.inputs.select = true;

    let gave_up = node.run_until(60_000, 100, |n| {
        n.sink.contains(&AppEvent::BootDegraded { attempts: 1 })
    });
    assert!(gave_up, "boot policy must give up");
    let window = u64::from(HALL_BOOT_WINDOW_MS);
    assert!((window..=window + 200).contains(&node.now), "gave up at {} ms", node.now);
    assert_eq!(node.net.attempts, 1);
    assert_eq!(node.hw.input_reads, 1, "inputs are first read on the give-up tick");
    let linking = node
        .hw
        .frames
        .iter()
        .filter(|f| **f == Rendered::Linking(CONNECTING_NETWORK))
        .count();
    assert_eq!(linking, 1, "one connecting screen per boot attempt");

    node.tick_at(node.now + 100);
    assert!(node.device.boot_settled());
    assert!(!node.device.network_up());
    assert!(node.device.cursor().editing, "menu works offline");
    assert!(matches!(
        node.hw.last_frame(),
        Some(Rendered::Edit { label: "Light 1", .. })
    ));
}

#[test]
fn offline_node_joins_when_access_point_returns() {
    let mut node = Node::new(&HALL);
    node.net = MockNetwork::unreachable();
    node.run_until(60_000, 100, |n| n.device.boot_settled());

    node.net.available = true;
    let online = node.run_until(node.now + 10_000, 100, |n| n.device.broker_up());
    assert!(online);
    assert!(node.sink.contains(&AppEvent::LinkUp(Link::Network)));
    assert_eq!(node.broker.subscribe_calls.len(), 8);
}

#[test]
fn wait_forever_node_does_nothing_until_network_is_up() {
    let mut node = Node::new(&LAWN_SONAR);
    node.net = MockNetwork::unreachable();
    node.hw.set_sample(4, 50);

    node.run_for(120_000, 500);
    assert!(!node.device.boot_settled());
    assert!(node.net.attempts > 1, "keeps retrying");
    assert_eq!(node.hw.sample_calls, 0);
    assert_eq!(node.hw.input_reads, 0);
    assert!(node.broker.client_ids.is_empty(), "no broker attempt without network");
    assert_eq!(node.sink.count(|e| matches!(e, AppEvent::BootDegraded { .. })), 0);
}

// ── Slow association ──────────────────────────────────────────

#[test]
fn hall_joins_access_point_slower_than_one_second() {
    let mut node = Node::new(&HALL);
    node.net = MockNetwork::slow(1_500);

    let joined = node.run_until(20_000, 10, |n| n.device.network_up());
    assert!(joined);
    assert_eq!(node.net.attempts, 1, "pending association left alone");
    assert!(node.now >= 1_500);
    assert_eq!(node.sink.count(|e| matches!(e, AppEvent::BootDegraded { .. })), 0);
}

#[test]
fn reissued_connect_restarts_association() {
    let mut config = NodeConfig::for_profile(&HALL);
    config.network.timing = LinkTiming { attempt_timeout_ms: 1_000, retry_delay_ms: 0 };
    config.network.boot = BootPolicy::WaitForever;
    let mut node = Node::with_config(&HALL, config);
    node.net = MockNetwork::slow(1_500);

    node.run_for(20_000, 10);
    assert!(!node.device.network_up(), "every retry cuts the join short");
    assert!(node.net.attempts >= 19, "attempts: {}", node.net.attempts);
}

#[test]
fn boot_give_up_covers_the_whole_window() {
    let window = u64::from(HALL_BOOT_WINDOW_MS);

    let mut node = Node::new(&HALL);
    node.net = MockNetwork::slow(window - 100);
    assert!(node.run_until(30_000, 10, |n| n.device.network_up()));
    assert_eq!(node.net.attempts, 1);
    assert_eq!(node.sink.count(|e| matches!(e, AppEvent::BootDegraded { .. })), 0);

    let mut node = Node::new(&HALL);
    node.net = MockNetwork::slow(window + 100);
    node.run_for(window - 10, 10);
    assert!(!node.device.boot_settled(), "still inside the window");
    assert!(node.run_until(30_000, 10, |n| n.device.boot_settled()));
    assert!(node.sink.contains(&AppEvent::BootDegraded { attempts: 1 }));
    assert!(node.now >= window);
}

// ── Broker outages ────────────────────────────────────────────

#[test]
fn broker_reconnect_resubscribes_everything() {
    let mut node = Node::online(&HALL);
    assert_eq!(node.broker.subscribe_calls.len(), 8);

    node.broker.drop_session();
    node.tick_at(100);
    assert!(node.sink.contains(&AppEvent::LinkDown(Link::Broker)));
    assert!(matches!(
        node.hw.last_frame(),
        Some(Rendered::Menu { status: LinkStatus::NoBroker, .. })
    ));

    node.tick_at(110);
    node.tick_at(120);
    assert!(node.device.broker_up());
    assert_eq!(node.broker.subscribe_calls.len(), 16);
    assert_eq!(&node.broker.subscribe_calls[..8], &node.broker.subscribe_calls[8..]);
    assert_eq!(node.sink.count(is_link_up(Link::Broker)), 2);
    assert!(node.broker.client_ids.iter().all(|id| id == "hallNode"));
}

#[test]
fn session_lost_between_polls_is_resubscribed() {
    let mut node = Node::online(&HALL);
    node.broker.bounce_session();
    node.tick_at(100);

    assert!(node.device.broker_up());
    assert_eq!(node.broker.subscribe_calls.len(), 16);
    assert_eq!(node.sink.count(is_link_up(Link::Broker)), 2);
    assert_eq!(node.broker.client_ids.len(), 1, "client reconnected by itself");

    node.tick_at(200);
    assert_eq!(node.broker.subscribe_calls.len(), 16, "once per session");
}

#[test]
fn unreachable_broker_retried_at_fixed_interval() {
    let mut node = Node::new(&LAWN_SONAR);
    node.broker.available = false;
    node.hw.set_sample(4, 42);
    let mut node = node.boot();

    node.run_for(12_000, 100);
    // Attempts at 0 s, 5 s and 10 s.
    assert_eq!(node.broker.client_ids.len(), 3);
    assert!(node.hw.sample_calls > 0, "sensors keep running");
    assert!(node.broker.published.is_empty());
}

#[test]
fn network_drop_takes_broker_down_with_it() {
    let mut node = Node::online(&HALL);
    node.net.drop_link();
    node.net.available = false;
    node.tick_at(100);

    assert!(node.sink.contains(&AppEvent::LinkDown(Link::Network)));
    assert!(node.sink.contains(&AppEvent::LinkDown(Link::Broker)));
    assert!(!node.device.broker_up());
    assert!(matches!(
        node.hw.last_frame(),
        Some(Rendered::Menu { status: LinkStatus::NoNetwork, .. })
    ));

    node.net.available = true;
    let back = node.run_until(5_000, 10, |n| n.device.broker_up());
    assert!(back);
    assert_eq!(node.broker.subscribe_calls.len(), 16);
}

#[test]
fn switchboard_follows_every_remote_change() {
    let mut node = Node::online(&HALL);
    for payload in [b"1", b"0", b"1"] {
        node.receive("hall/switchboard", payload);
    }
    assert_eq!(node.hw.applied, [(2, 1), (2, 0), (2, 1)]);
}
