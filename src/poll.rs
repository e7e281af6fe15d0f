// Connection poll loop
//
// Scans the command slots in a fixed order while a peer is connected and
// runs the dispatcher to completion for each pending write.

use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::SETTLE_DELAY;
use crate::messages::{CommandSlot, CommandWord};
use crate::protocol::{DispatchOutcome, Dispatcher};

/// Source of slot writes
pub trait CommandTransport {
    fn is_connected(&self) -> bool;

    /// Take the pending write for a slot, if any. A write is returned once.
    fn take_write(&mut self, slot: CommandSlot) -> Option<CommandWord>;

    /// Drop every pending write
    fn discard_pending(&mut self);
}

/// Holds at most one pending write per slot
#[derive(Debug, Default)]
pub struct SlotMailbox {
    pending: HashMap<CommandSlot, CommandWord>,
    connected: bool,
}

impl SlotMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a write; a newer write replaces one not yet taken
    pub fn post(&mut self, slot: CommandSlot, word: CommandWord) {
        if let Some(previous) = self.pending.insert(slot, word) {
            warn!("{} overwritten before dispatch: {} -> {}", slot, previous, word);
        }
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl CommandTransport for SlotMailbox {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn take_write(&mut self, slot: CommandSlot) -> Option<CommandWord> {
        self.pending.remove(&slot)
    }

    fn discard_pending(&mut self) {
        self.clear();
    }
}

pub struct PollLoop {
    dispatcher: Dispatcher,
    settle: Duration,
    was_connected: bool,
}

impl PollLoop {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self::with_settle(dispatcher, SETTLE_DELAY)
    }

    pub fn with_settle(dispatcher: Dispatcher, settle: Duration) -> Self {
        Self {
            dispatcher,
            settle,
            was_connected: false,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    /// One scan over all slots. Returns the number of writes dispatched.
    pub fn poll_once(&mut self, transport: &mut impl CommandTransport) -> usize {
        let connected = transport.is_connected();
        if connected != self.was_connected {
            if connected {
                info!("Peer connected");
            } else {
                // Stop anything a vanished peer left running
                warn!("Peer disconnected, stopping actuators");
                self.dispatcher.estop();
            }
            self.was_connected = connected;
        }
        if !connected {
            // writes without a peer are never replayed on reconnect
            transport.discard_pending();
            return 0;
        }

        let mut dispatched = 0;
        for slot in CommandSlot::ALL {
            let Some(word) = transport.take_write(slot) else {
                continue;
            };
            let outcome = self.dispatcher.dispatch(slot, word);
            if outcome != DispatchOutcome::SequenceCompleted {
                self.dispatcher.hold(self.settle);
            }
            dispatched += 1;
        }
        dispatched
    }
}
