// Slotted ALOHA Simulation Engine - Slot Loop and Collision Resolution

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::SimConfig;
use crate::node::ContendingNode;
use crate::types::{RunReport, SlotDecision, SlotOutcome, Termination};

// ─── SlotSimulator ───────────────────────────────────────────────────────────

/// Drives a fixed population of [`ContendingNode`]s through discrete time.
///
/// Each slot runs three phases in a strictly sequential pass: Bernoulli
/// packet arrivals, per-node transmit/defer decisions, and collision
/// resolution on the resulting attempt set. The simulator owns every node
/// and the random source for the whole run; with the same seed and config
/// a run is fully reproducible.
pub struct SlotSimulator<R: Rng> {
    cfg: SimConfig,
    nodes: Vec<ContendingNode>,
    rng: R,

    slot: u64,
    delivered: u64,
    cumulative_delay: u64,

    // Scratch attempt set, reused across slots.
    attempts: Vec<usize>,
}

impl SlotSimulator<ChaCha8Rng> {
    /// Build a simulator with the canonical seedable PRNG.
    pub fn from_seed(cfg: SimConfig, seed: u64) -> Self {
        Self::with_rng(cfg, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> SlotSimulator<R> {
    /// Build a simulator around an injected random source.
    pub fn with_rng(cfg: SimConfig, rng: R) -> Self {
        let nodes = (0..cfg.population)
            .map(|_| ContendingNode::new(cfg.initial_cw, cfg.max_retries))
            .collect();
        Self {
            cfg,
            nodes,
            rng,
            slot: 0,
            delivered: 0,
            cumulative_delay: 0,
            attempts: Vec::with_capacity(cfg.population),
        }
    }

    /// Advance simulated time by one slot.
    pub fn run_slot(&mut self) -> SlotOutcome {
        self.slot += 1;

        // Arrival phase. Trials are independent, but the pass is
        // sequential so the shared PRNG stays deterministic.
        for node in &mut self.nodes {
            if self.rng.gen::<f64>() < self.cfg.gen_prob {
                node.arrive();
            }
        }

        // Decision phase: collect this slot's attempt set in node order.
        self.attempts.clear();
        for (idx, node) in self.nodes.iter_mut().enumerate() {
            if node.slot_decision() == SlotDecision::Transmit {
                self.attempts.push(idx);
            }
        }

        // Resolution phase. One transmitter delivers; two or more destroy
        // each other's packets, with no capture and no priority.
        match self.attempts.as_slice() {
            [] => SlotOutcome::Idle,
            &[winner] => {
                let delay = self.nodes[winner].on_success();
                self.cumulative_delay += delay;
                self.delivered += 1;
                SlotOutcome::Delivered {
                    node: winner,
                    delay,
                }
            }
            _ => {
                let mut exhausted = None;
                for i in 0..self.attempts.len() {
                    let idx = self.attempts[i];
                    if self.nodes[idx].on_failure(&mut self.rng) && exhausted.is_none() {
                        exhausted = Some(idx);
                    }
                }
                SlotOutcome::Collision {
                    count: self.attempts.len(),
                    exhausted,
                }
            }
        }
    }

    /// Run slots until the delivery target is met or a node exhausts its
    /// retry budget, whichever comes first.
    pub fn run(&mut self) -> RunReport {
        while self.delivered < self.cfg.target_packets {
            if let SlotOutcome::Collision {
                exhausted: Some(node),
                ..
            } = self.run_slot()
            {
                return self.report(Termination::RetriesExhausted { node });
            }
        }
        self.report(Termination::TargetReached)
    }

    /// Statistics as of the just-completed slot.
    pub fn report(&self, termination: Termination) -> RunReport {
        RunReport {
            slots: self.slot,
            delivered: self.delivered,
            cumulative_delay: self.cumulative_delay,
            termination,
        }
    }

    /// Force a packet into a node's queue, bypassing the arrival roll.
    /// Scenario/test seam; subject to the same silent-drop policy.
    pub fn inject_packet(&mut self, idx: usize) {
        self.nodes[idx].arrive();
    }

    pub fn node(&self, idx: usize) -> &ContendingNode {
        &self.nodes[idx]
    }

    pub fn population(&self) -> usize {
        self.nodes.len()
    }

    pub fn config(&self) -> &SimConfig {
        &self.cfg
    }

    pub fn slot(&self) -> u64 {
        self.slot
    }

    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    pub fn cumulative_delay(&self) -> u64 {
        self.cumulative_delay
    }
}
