//! # Intent Delivery
//!
//! The core never teleports anyone itself. Every consequence of a rule is
//! an [`Intent`] addressed to a player and handed to an [`EffectSink`].
//!
//! ```text
//! ┌──────────────┐  (player, intent)  ┌──────────────┐  drain()  ┌──────────┐
//! │  Navigation  │───────────────────>│  IntentBus   │──────────>│   Host   │
//! │  Commands    │                    │  (bounded)   │           │          │
//! │  Ambient     │                    └──────────────┘           └──────────┘
//! └──────────────┘
//! ```

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use liminal_shared::{Intent, PlayerId};

/// An intent addressed to one player.
#[derive(Clone, Debug, PartialEq)]
pub struct Directive {
    /// Who the intent is for.
    pub player: PlayerId,
    /// What the host should do.
    pub intent: Intent,
}

/// Capability to hand intents to the host.
pub trait EffectSink: Send + Sync {
    /// Delivers one intent. Must not block.
    fn emit(&self, player: PlayerId, intent: Intent);

    /// Delivers several intents in order.
    fn emit_all(&self, player: PlayerId, intents: Vec<Intent>) {
        for intent in intents {
            self.emit(player, intent);
        }
    }
}

/// Bounded intent channel between the core and the host.
pub struct IntentBus {
    sender: Sender<Directive>,
    receiver: Receiver<Directive>,
}

impl IntentBus {
    /// Creates a new intent bus.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum intents in flight before new ones are dropped.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// Creates a sender handle.
    #[must_use]
    pub fn sender(&self) -> IntentSender {
        IntentSender {
            sender: self.sender.clone(),
        }
    }

    /// Creates a receiver handle.
    #[must_use]
    pub fn receiver(&self) -> IntentReceiver {
        IntentReceiver {
            receiver: self.receiver.clone(),
        }
    }

    /// Creates a new pair of sender and receiver.
    #[must_use]
    pub fn create_pair(capacity: usize) -> (IntentSender, IntentReceiver) {
        let bus = Self::new(capacity);
        (bus.sender(), bus.receiver())
    }
}

/// Handle for sending intents.
#[derive(Clone)]
pub struct IntentSender {
    sender: Sender<Directive>,
}

impl IntentSender {
    /// Sends a directive (non-blocking).
    ///
    /// Returns `false` if the channel is full or the host is gone.
    #[inline]
    pub fn send(&self, directive: Directive) -> bool {
        match self.sender.try_send(directive) {
            Ok(()) => true,
            Err(TrySendError::Full(d)) => {
                tracing::warn!("Intent channel full, dropping {:?} for {}", d.intent, d.player);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

impl EffectSink for IntentSender {
    fn emit(&self, player: PlayerId, intent: Intent) {
        let _ = self.send(Directive { player, intent });
    }
}

/// Handle for receiving intents.
#[derive(Clone)]
pub struct IntentReceiver {
    receiver: Receiver<Directive>,
}

impl IntentReceiver {
    /// Receives all pending directives (non-blocking).
    #[inline]
    pub fn drain(&self) -> Vec<Directive> {
        let mut directives = Vec::with_capacity(16);
        while let Ok(directive) = self.receiver.try_recv() {
            directives.push(directive);
        }
        directives
    }

    /// Receives one directive (non-blocking).
    #[inline]
    pub fn try_recv(&self) -> Option<Directive> {
        self.receiver.try_recv().ok()
    }

    /// Returns the number of pending directives.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Checks if there are pending directives.
    #[inline]
    #[must_use]
    pub fn has_intents(&self) -> bool {
        !self.receiver.is_empty()
    }
}
