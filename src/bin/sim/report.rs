// Report types for the sim runner: per-run records, multi-seed
// aggregation, and sweep output. All machine-readable via serde.

use serde::Serialize;

use aloha_engine::{RunReport, SimConfig, Termination};

// ─── Statistics (multi-seed aggregation) ─────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self {
                mean: 0.0,
                std_dev: 0.0,
                ci_lower: 0.0,
                ci_upper: 0.0,
                min: 0.0,
                max: 0.0,
                n: 0,
            };
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let std_dev = variance.sqrt();
        let stderr = std_dev / (n as f64).sqrt();
        let z = 1.96; // 95% CI
        Self {
            mean,
            std_dev,
            ci_lower: mean - z * stderr,
            ci_upper: mean + z * stderr,
            min: samples.iter().cloned().fold(f64::INFINITY, f64::min),
            max: samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            n,
        }
    }
}

// ─── Single-run record ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub nodes: usize,
    pub initial_cw: u32,
    pub gen_prob: f64,
    pub target_packets: u64,
    pub max_retries: u32,
    pub seed: u64,
    pub slots: u64,
    pub delivered: u64,
    pub utilization: f64,
    /// None when nothing was delivered (abort before the first success);
    /// NaN does not survive JSON.
    pub avg_delay: Option<f64>,
    pub aborted: bool,
    pub exhausted_node: Option<usize>,
}

impl RunRecord {
    pub fn new(cfg: &SimConfig, seed: u64, report: &RunReport) -> Self {
        let exhausted_node = match report.termination {
            Termination::RetriesExhausted { node } => Some(node),
            Termination::TargetReached => None,
        };
        Self {
            nodes: cfg.population,
            initial_cw: cfg.initial_cw,
            gen_prob: cfg.gen_prob,
            target_packets: cfg.target_packets,
            max_retries: cfg.max_retries,
            seed,
            slots: report.slots,
            delivered: report.delivered,
            utilization: report.utilization(),
            avg_delay: (report.delivered > 0).then(|| report.avg_delay()),
            aborted: report.termination.is_abort(),
            exhausted_node,
        }
    }
}

// ─── Multi-seed trial report ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct TrialReport {
    pub gen_prob: f64,
    pub n_runs: usize,
    pub abort_count: usize,
    pub utilization: Stats,
    /// Aggregated over runs that delivered at least one packet.
    pub avg_delay: Stats,
    pub slots: Stats,
    pub runs: Vec<RunRecord>,
}

impl TrialReport {
    pub fn aggregate(gen_prob: f64, runs: Vec<RunRecord>) -> Self {
        let abort_count = runs.iter().filter(|r| r.aborted).count();
        let utilization =
            Stats::from_samples(&runs.iter().map(|r| r.utilization).collect::<Vec<_>>());
        let avg_delay =
            Stats::from_samples(&runs.iter().filter_map(|r| r.avg_delay).collect::<Vec<_>>());
        let slots = Stats::from_samples(&runs.iter().map(|r| r.slots as f64).collect::<Vec<_>>());
        Self {
            gen_prob,
            n_runs: runs.len(),
            abort_count,
            utilization,
            avg_delay,
            slots,
            runs,
        }
    }

    /// Every seeded run hit retry exhaustion; nothing here measured a
    /// completed run.
    pub fn all_aborted(&self) -> bool {
        self.n_runs > 0 && self.abort_count == self.n_runs
    }
}

// ─── Sweep report ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub nodes: usize,
    pub initial_cw: u32,
    pub target_packets: u64,
    pub max_retries: u32,
    pub runs_per_point: usize,
    pub base_seed: u64,
    pub points: Vec<TrialReport>,
}
