// Slotted ALOHA Simulation Engine - Type Definitions

use serde::{Deserialize, Serialize};

// ─── Per-slot decision ───────────────────────────────────────────────────────

/// What a node chose to do with the current slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotDecision {
    /// Stay silent this slot (empty queue, or backoff still counting down).
    Defer,
    /// Contend for the channel this slot.
    Transmit,
}

// ─── Slot outcome ────────────────────────────────────────────────────────────

/// Channel-level result of one slot after collision resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotOutcome {
    /// Nobody transmitted.
    Idle,
    /// Exactly one transmitter: its head packet was delivered.
    Delivered { node: usize, delay: u64 },
    /// Two or more transmitters: every competing packet was lost. When a
    /// collider ran out of retries, `exhausted` names the first such node
    /// and the run must terminate.
    Collision {
        count: usize,
        exhausted: Option<usize>,
    },
}

// ─── Termination ─────────────────────────────────────────────────────────────

/// Why a run ended. Both variants are ordinary control flow, not faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason")]
pub enum Termination {
    /// The configured number of packets was delivered.
    TargetReached,
    /// A node collided more times than its retry budget allows.
    RetriesExhausted { node: usize },
}

impl Termination {
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::RetriesExhausted { .. })
    }
}

// ─── Run report ──────────────────────────────────────────────────────────────

/// Aggregate statistics for a completed (or aborted) run.
///
/// The core returns this value to its caller; presentation and process
/// exit are the caller's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Slots elapsed, including the slot that triggered an abort.
    pub slots: u64,
    /// Successful transmissions.
    pub delivered: u64,
    /// Sum of head-packet delays at the moment of each delivery.
    pub cumulative_delay: u64,
    pub termination: Termination,
}

impl RunReport {
    /// Delivered packets per slot, in [0, 1].
    pub fn utilization(&self) -> f64 {
        self.delivered as f64 / self.slots as f64
    }

    /// Mean slots waited per delivered packet.
    ///
    /// NaN when nothing was delivered, which only happens on an abort
    /// before the first success.
    pub fn avg_delay(&self) -> f64 {
        self.cumulative_delay as f64 / self.delivered as f64
    }
}
