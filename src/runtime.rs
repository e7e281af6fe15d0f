// Zenoh-facing runtime loop
// Slot writes arrive on <prefix>/cmd/<slot>, peers announce themselves with
// liveliness tokens under <prefix>/peer/**. Dispatch blocks this task, so a
// running sequence holds off every other slot until it finishes.

use std::collections::HashSet;
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior, interval};
use tracing::{debug, info, warn};
use zenoh::sample::SampleKind;

use crate::config::{
    DEFAULT_PREFIX, LOOP_HZ, MOTOR_ENABLED, MOTOR_PORT, TOPIC_ACTUATORS, TOPIC_CMD, TOPIC_HEALTH,
    TOPIC_PEER,
};
use crate::messages::{ActuatorState, CommandSlot, CommandWord, RuntimeHealth};
use crate::motor::{ActuatorBank, PulseSink, ServoControllerSink, SimulatedSink};
use crate::poll::{CommandTransport, PollLoop, SlotMailbox};
use crate::protocol::Dispatcher;
use crate::sequence::ThreadHold;

/// Deployment options
#[derive(Debug, Clone, clap::Parser)]
#[command(version, about = "Drives the vinebot actuator bank from zenoh command slots")]
pub struct RuntimeOptions {
    /// Serial port of the servo controller
    #[arg(long, default_value = MOTOR_PORT)]
    pub port: String,

    /// Log pulse widths instead of driving hardware
    #[arg(long)]
    pub simulate: bool,

    /// Zenoh key prefix for all topics
    #[arg(long, default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    /// Service slots without waiting for a peer liveliness token
    #[arg(long)]
    pub assume_connected: bool,
}

fn open_sink(options: &RuntimeOptions) -> Result<Box<dyn PulseSink>, crate::motor::SinkError> {
    if options.simulate || !MOTOR_ENABLED {
        info!("Using simulated actuator sink");
        return Ok(Box::new(SimulatedSink::new()));
    }
    info!("Opening servo controller on {}", options.port);
    Ok(Box::new(ServoControllerSink::open(&options.port)?))
}

/// Loop ticker; ticks missed during a blocking sequence are dropped, not replayed
fn loop_interval() -> Interval {
    let mut tick = interval(Duration::from_millis(1000 / LOOP_HZ));
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tick
}

/// Map a sample key like "vinebot/cmd/executeCommand" to its slot
fn slot_for_key(key: &str) -> Option<CommandSlot> {
    key.rsplit('/').next().and_then(CommandSlot::from_name)
}

pub async fn run(options: RuntimeOptions) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut bank = ActuatorBank::new(open_sink(&options)?);
    bank.initialize()?;
    let mut poll = PollLoop::new(Dispatcher::new(bank, Box::new(ThreadHold)));

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;

    let prefix = &options.prefix;
    let cmd_key = format!("{prefix}/{TOPIC_CMD}/*");
    let peer_key = format!("{prefix}/{TOPIC_PEER}/**");
    let health_key = format!("{prefix}/{TOPIC_HEALTH}");
    let actuators_key = format!("{prefix}/{TOPIC_ACTUATORS}");

    info!("Setting up publishers and subscribers...");
    let subscriber = session.declare_subscriber(cmd_key.clone()).await?;
    let peers_sub = session
        .liveliness()
        .declare_subscriber(peer_key.clone())
        .history(true)
        .await?;
    let pub_health = session.declare_publisher(health_key.clone()).await?;
    let pub_actuators = session.declare_publisher(actuators_key.clone()).await?;

    let mut mailbox = SlotMailbox::new();
    let mut peers: HashSet<String> = HashSet::new();
    let mut tick = loop_interval();

    info!("Runtime started: {}Hz loop", LOOP_HZ);
    info!("Subscribed to: {}, {}", cmd_key, peer_key);
    info!("Publishing to: {}, {}", health_key, actuators_key);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = tick.tick() => {}
            _ = &mut shutdown => {
                info!("Shutdown requested");
                poll.dispatcher_mut().estop();
                break;
            }
        }

        // 1. Track peers
        while let Ok(Some(sample)) = peers_sub.try_recv() {
            let key = sample.key_expr().to_string();
            match sample.kind() {
                SampleKind::Put => {
                    if peers.insert(key.clone()) {
                        info!("Peer token appeared: {}", key);
                    }
                }
                SampleKind::Delete => {
                    if peers.remove(&key) {
                        info!("Peer token dropped: {}", key);
                    }
                }
            }
        }
        mailbox.set_connected(options.assume_connected || !peers.is_empty());

        // 2. Drain slot writes into the mailbox
        while let Ok(Some(sample)) = subscriber.try_recv() {
            let key = sample.key_expr().as_str();
            let Some(slot) = slot_for_key(key) else {
                warn!("Write on unknown slot {}", key);
                continue;
            };
            if !mailbox.is_connected() {
                debug!("Dropping write on {} without a connected peer", slot);
                continue;
            }
            match CommandWord::from_payload(&sample.payload().to_bytes()) {
                Ok(word) => {
                    debug!("Write on {}: {}", slot, word);
                    mailbox.post(slot, word);
                }
                Err(e) => {
                    warn!("Failed to parse write on {}: {}", slot, e);
                }
            }
        }

        // 3. Dispatch; holds block this worker thread
        tokio::task::block_in_place(|| poll.poll_once(&mut mailbox));

        // 4. Publish health and actuator state
        let health = if mailbox.is_connected() {
            RuntimeHealth::Connected
        } else {
            RuntimeHealth::Idle
        };
        pub_health.put(serde_json::to_string(&health)?).await?;

        let state = ActuatorState {
            pulses_us: poll
                .dispatcher()
                .bank()
                .snapshot()
                .iter()
                .map(|w| w.as_micros())
                .collect(),
        };
        pub_actuators.put(serde_json::to_string(&state)?).await?;
    }

    Ok(())
}
