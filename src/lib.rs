//! A safe, simulated terminal trainer.
//!
//! Learners work through guided lesson modules and investigation challenges
//! by typing shell commands, but nothing is ever executed: every command is
//! answered from a deterministic built-in simulator. Lesson and scenario
//! content is authored in YAML and embedded into the binary at build time.

pub mod challenge;
mod data;
pub mod errors;
pub mod lesson;
pub mod progress;
pub mod scenario;
pub mod session;
pub mod simulate;

pub use data::CmdExit;
pub use errors::{Error, Result};
pub use lesson::{Module, Step};
pub use progress::Progress;
pub use scenario::{Answer, Goal, Scenario};
pub use session::{Session, SessionEvent, SessionState};
pub use simulate::{simulate, simulate_line, SimContext, SimulatedOutput};
