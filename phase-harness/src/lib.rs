//! Phase Harness
//!
//! Drives the phase correlator the way a test framework would. It adds:
//! - Run plans describing a scope tree (TOML)
//! - Playback of lifecycle signals in framework order, optionally in parallel
//! - A JSON Lines recording backend
//! - Logging setup for harness runs
//!
//! # Example Usage
//!
//! ```
//! use phase_harness::{parse_plan, run_plan};
//!
//! let plan = parse_plan(r#"
//!     [[containers]]
//!     name = "Demo"
//!
//!     [[containers.members]]
//!     name = "test1"
//! "#).unwrap();
//!
//! let summary = run_plan(&plan).unwrap();
//! assert_eq!(summary.members, 1);
//! assert!(summary.leaked.is_empty());
//! ```

pub mod driver;
pub mod jsonl;
pub mod logging;
pub mod output;
pub mod plan;

pub use driver::{container_scope, member_scope, run, run_plan, RunSummary, ENGINE_ID};
pub use jsonl::JsonLinesRecorder;
pub use logging::init_logging;
pub use output::{build_recorder, OutputConfig, OutputFormat};
pub use plan::{load_plan, parse_plan, ContainerPlan, MemberPlan, RunPlan};
