// Per-slot JSONL trace recorder. One JSON line per slot for offline
// analysis of the contention process.

use serde::Serialize;
use std::io::Write;

use aloha_engine::SlotOutcome;

#[derive(Debug, Serialize)]
pub struct SlotSnapshot {
    pub slot: u64,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colliders: Option<usize>,
    pub delivered_total: u64,
    pub cumulative_delay: u64,
}

impl SlotSnapshot {
    pub fn new(slot: u64, outcome: &SlotOutcome, delivered_total: u64, cumulative_delay: u64) -> Self {
        let (label, winner, delay, colliders) = match *outcome {
            SlotOutcome::Idle => ("idle", None, None, None),
            SlotOutcome::Delivered { node, delay } => ("delivered", Some(node), Some(delay), None),
            SlotOutcome::Collision { count, .. } => ("collision", None, None, Some(count)),
        };
        Self {
            slot,
            outcome: label,
            winner,
            delay,
            colliders,
            delivered_total,
            cumulative_delay,
        }
    }
}

/// Accumulates snapshots in memory and writes them as JSONL at the end of
/// the run.
pub struct TraceRecorder {
    snapshots: Vec<SlotSnapshot>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self {
            snapshots: Vec::new(),
        }
    }

    pub fn record(&mut self, snapshot: SlotSnapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn write_jsonl(&self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = std::fs::File::create(path)?;
        for snapshot in &self.snapshots {
            let line = serde_json::to_string(snapshot)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_labels_match_outcomes() {
        let idle = SlotSnapshot::new(1, &SlotOutcome::Idle, 0, 0);
        assert_eq!(idle.outcome, "idle");
        assert_eq!(idle.winner, None);

        let hit = SlotSnapshot::new(
            2,
            &SlotOutcome::Delivered { node: 5, delay: 3 },
            1,
            3,
        );
        assert_eq!(hit.outcome, "delivered");
        assert_eq!(hit.winner, Some(5));
        assert_eq!(hit.delay, Some(3));

        let clash = SlotSnapshot::new(
            3,
            &SlotOutcome::Collision {
                count: 4,
                exhausted: None,
            },
            1,
            3,
        );
        assert_eq!(clash.outcome, "collision");
        assert_eq!(clash.colliders, Some(4));
    }
}
