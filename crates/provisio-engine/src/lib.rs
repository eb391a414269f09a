//! Provisio lifecycle engine
//!
//! Drives one provisioning request through the uniform lifecycle
//!
//! ```text
//! Initiated → Validated → Planned → AwaitingApproval → Approved
//!                                                        │
//!                                         Executing ◄────┘
//!                                             │
//!                                   Completed / Failed
//! ```
//!
//! The engine resolves the requested capability against the instance map and
//! the registry, cross-checks the context's parameters, invokes the plugin's
//! own validation, produces a plan, gates execution on approval and reports
//! a structured outcome — including a secondary rollback outcome on failure.
//!
//! Structural errors (unknown capability, bad parameter shape) are detected
//! before any plugin code runs. Capability-originated failures are always
//! returned as structured results so partial resource lists survive for
//! diagnosis; nothing here is fatal to the process.

pub mod engine;
pub mod error;
pub mod run;

pub use engine::{Engine, EngineBuilder, EngineConfig};
pub use error::{EngineError, Result};
pub use run::{RollbackOutcome, Run, RunOutcome, RunState};
