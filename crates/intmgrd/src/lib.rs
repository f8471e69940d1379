//! intmgrd - INT provisioning manager daemon for EVCs.
//!
//! Installs and removes In-band Network Telemetry flow rules along the
//! switch paths of Ethernet Virtual Circuits:
//!
//! 1. Validate per-circuit preconditions (existing INT state, proxy port
//!    health, topology)
//! 2. Generate source/hop/sink flow rules for both circuit directions
//! 3. Dispatch one batched install/remove per switch, concurrently
//! 4. Classify failures per circuit and retry transient ones

mod config;
mod dispatch;
mod flow_gen;
mod int_mgr;

pub use config::*;
pub use dispatch::*;
pub use flow_gen::*;
pub use int_mgr::{BulkReport, CircuitOutcome, FlowDiscrepancy, IntManager};
