// Slotted ALOHA Simulation Engine
//
// Discrete-time simulation of the slotted ALOHA medium-access protocol:
// a fixed population of transmitters contends for one broadcast channel,
// with binary exponential backoff resolving collisions. The engine
// measures channel utilization and average packet delay.

pub mod config;
pub mod node;
pub mod simulation;
pub mod types;

pub use config::{ConfigError, SimConfig};
pub use node::ContendingNode;
pub use simulation::SlotSimulator;
pub use types::{RunReport, SlotDecision, SlotOutcome, Termination};
