// Slotted ALOHA Simulation Engine - Contending Node

use rand::Rng;

use crate::types::SlotDecision;

/// Smallest contention window a node ever uses.
pub const CW_MIN: u32 = 2;
/// Largest contention window binary exponential backoff may reach.
pub const CW_MAX: u32 = 256;

/// Buffered packets per node. Arrivals beyond this are dropped silently.
pub const QUEUE_CAPACITY: u8 = 2;

// ─── ContendingNode ──────────────────────────────────────────────────────────

/// One transmitter's contention state: a two-deep packet queue, the
/// current contention window, the backoff countdown, and per-packet delay
/// accounting.
///
/// Per head packet the lifecycle is: arrival backlogs the node, the
/// backoff counts down to zero, the node contends, and the attempt either
/// delivers (window shrinks, next packet promoted) or collides (window
/// doubles, backoff redrawn) until the retry budget runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContendingNode {
    queue_depth: u8,
    cw: u32,
    backoff: u32,
    head_delay: u64,
    second_delay: u64,
    retries: u32,
    max_retries: u32,
}

impl ContendingNode {
    pub fn new(initial_cw: u32, max_retries: u32) -> Self {
        Self {
            queue_depth: 0,
            cw: initial_cw,
            backoff: 0,
            head_delay: 0,
            second_delay: 0,
            retries: 0,
            max_retries,
        }
    }

    /// A packet arrived at this node. No-op when the queue is full: the
    /// packet is dropped with no delay side effect.
    pub fn arrive(&mut self) {
        if self.queue_depth == QUEUE_CAPACITY {
            return;
        }
        self.queue_depth += 1;
    }

    /// Decide what to do with the current slot.
    ///
    /// A node without a backlog always defers and mutates nothing. A
    /// backlogged node first ages every buffered packet, then contends
    /// iff its backoff has fully elapsed; otherwise the backoff counts
    /// down by one.
    pub fn slot_decision(&mut self) -> SlotDecision {
        if !self.is_backlogged() {
            return SlotDecision::Defer;
        }

        self.head_delay += 1;
        if self.queue_depth == QUEUE_CAPACITY {
            self.second_delay += 1;
        }

        if self.backoff == 0 {
            SlotDecision::Transmit
        } else {
            self.backoff -= 1;
            SlotDecision::Defer
        }
    }

    /// This node was the sole transmitter in the slot: the head packet was
    /// delivered. Returns the slots it waited.
    ///
    /// The contention window shrinks (x0.75, floored, never below
    /// `CW_MIN`), the next packet (if any) is promoted to the head, and a
    /// fresh contention cycle starts with zeroed backoff and retries.
    pub fn on_success(&mut self) -> u64 {
        let delay = self.head_delay;

        self.cw = (self.cw * 3 / 4).max(CW_MIN);
        self.queue_depth -= 1;
        if self.queue_depth == 0 {
            self.head_delay = 0;
        } else {
            self.head_delay = self.second_delay;
        }
        self.second_delay = 0;
        self.retries = 0;
        self.backoff = 0;

        delay
    }

    /// This node transmitted into a collision. Redraws the backoff from
    /// the current window, then doubles the window (clamped to `CW_MAX`).
    ///
    /// Returns `true` once the head packet has already collided
    /// `max_retries` times: the budget is exhausted and the caller must
    /// abort the run.
    pub fn on_failure<R: Rng>(&mut self, rng: &mut R) -> bool {
        self.backoff = rng.gen_range(0..self.cw);
        self.cw = (self.cw * 2).min(CW_MAX);

        if self.retries == self.max_retries {
            return true;
        }
        self.retries += 1;
        false
    }

    pub fn is_backlogged(&self) -> bool {
        self.queue_depth > 0
    }

    pub fn queue_depth(&self) -> u8 {
        self.queue_depth
    }

    pub fn contention_window(&self) -> u32 {
        self.cw
    }

    pub fn backoff(&self) -> u32 {
        self.backoff
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn queue_depth_stays_within_capacity() {
        let mut node = ContendingNode::new(2, 10);
        for _ in 0..5 {
            node.arrive();
        }
        assert_eq!(node.queue_depth(), QUEUE_CAPACITY);

        node.slot_decision();
        node.on_success();
        assert_eq!(node.queue_depth(), 1);
        node.arrive();
        node.arrive();
        assert_eq!(node.queue_depth(), QUEUE_CAPACITY);
    }

    #[test]
    fn empty_node_defers_without_side_effects() {
        let mut node = ContendingNode::new(8, 10);
        for _ in 0..100 {
            assert_eq!(node.slot_decision(), SlotDecision::Defer);
        }
        assert_eq!(node, ContendingNode::new(8, 10));
    }

    #[test]
    fn backoff_gates_transmission() {
        let mut node = ContendingNode::new(2, 10);
        node.arrive();
        // First attempt goes out immediately (backoff starts at 0).
        assert_eq!(node.slot_decision(), SlotDecision::Transmit);

        let mut rng = rng();
        node.on_failure(&mut rng);
        let drawn = node.backoff();
        for remaining in (1..=drawn).rev() {
            assert_eq!(node.slot_decision(), SlotDecision::Defer);
            assert_eq!(node.backoff(), remaining - 1);
        }
        assert_eq!(node.slot_decision(), SlotDecision::Transmit);
    }

    #[test]
    fn window_shrinks_on_success_and_doubles_on_collision() {
        let mut rng = rng();
        let mut node = ContendingNode::new(CW_MIN, 1000);
        node.arrive();

        // Grow: 2 -> 4 -> 8 -> ... -> 256, then clamp.
        let mut expected = CW_MIN;
        for _ in 0..10 {
            node.on_failure(&mut rng);
            expected = (expected * 2).min(CW_MAX);
            assert_eq!(node.contention_window(), expected);
        }
        assert_eq!(node.contention_window(), CW_MAX);

        // Shrink: 256 -> 192 -> 144 -> ... -> 2, then clamp.
        loop {
            node.arrive();
            let before = node.contention_window();
            node.on_success();
            assert_eq!(node.contention_window(), (before * 3 / 4).max(CW_MIN));
            if node.contention_window() == CW_MIN {
                break;
            }
        }
        node.arrive();
        node.on_success();
        assert_eq!(node.contention_window(), CW_MIN);
    }

    #[test]
    fn success_resets_retries_and_backoff() {
        let mut rng = rng();
        let mut node = ContendingNode::new(4, 10);
        node.arrive();
        node.arrive();
        node.on_failure(&mut rng);
        node.on_failure(&mut rng);
        assert_eq!(node.retries(), 2);

        node.on_success();
        assert_eq!(node.retries(), 0);
        assert_eq!(node.backoff(), 0);
        assert!(node.is_backlogged());
    }

    #[test]
    fn exhaustion_on_attempt_past_the_budget() {
        let mut rng = rng();
        let budget = 5;
        let mut node = ContendingNode::new(2, budget);
        node.arrive();
        for _ in 0..budget {
            assert!(!node.on_failure(&mut rng));
        }
        // Attempt number budget + 1 exhausts; retries stop incrementing.
        assert!(node.on_failure(&mut rng));
        assert_eq!(node.retries(), budget);
    }

    #[test]
    fn zero_budget_exhausts_on_first_collision() {
        let mut rng = rng();
        let mut node = ContendingNode::new(2, 0);
        node.arrive();
        assert!(node.on_failure(&mut rng));
    }

    #[test]
    fn delivery_promotes_second_packet_delay() {
        let mut node = ContendingNode::new(2, 10);
        node.arrive();
        // Head waits 3 slots alone, then a second packet arrives.
        for _ in 0..3 {
            node.slot_decision();
            node.hold_one_slot();
        }
        node.arrive();
        // Both age together for 2 more slots.
        node.slot_decision();
        node.slot_decision();

        assert_eq!(node.on_success(), 5);
        // Second packet waited 2 slots; it is now the head.
        assert_eq!(node.queue_depth(), 1);
        node.slot_decision();
        assert_eq!(node.on_success(), 3);
        assert_eq!(node.queue_depth(), 0);

        // Fully drained: both delay counters are back to zero.
        node.arrive();
        node.slot_decision();
        assert_eq!(node.on_success(), 1);
    }

    #[test]
    fn dropped_arrival_leaves_delays_untouched() {
        let mut node = ContendingNode::new(2, 10);
        node.arrive();
        node.arrive();
        node.slot_decision();
        let before = node;
        node.arrive(); // queue full: silent drop
        assert_eq!(node, before);
    }

    #[test]
    fn backoff_draw_stays_within_window() {
        let mut rng = rng();
        let mut node = ContendingNode::new(2, u32::MAX);
        node.arrive();
        for _ in 0..1000 {
            let window = node.contention_window();
            node.on_failure(&mut rng);
            assert!(node.backoff() < window);
            assert!(node.contention_window() <= CW_MAX);
            assert!(node.contention_window() >= CW_MIN);
        }
    }

    impl ContendingNode {
        /// Test helper: force one more slot of silence so delay counters
        /// can be exercised without resolving an attempt.
        fn hold_one_slot(&mut self) {
            self.backoff = 1;
        }
    }
}
