//! Shootplan - Photography Shoot Planner
//!
//! Shootplan keeps the planning record for photography shoots: concept,
//! schedule, checklist, budget, team, equipment and mood board.
//!
//! # Architecture
//!
//! - `model`: the `Project` aggregate and pure operations that return updated
//!   copies of it
//! - `state`: key-value persistence with date revival, cross-handle sync,
//!   migration and whole-dataset export/import
//! - `remote`: explicit conversion to and from the hosted backend's row shape
//! - `cli`: the command-line front end

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod remote;
pub mod state;

pub use config::PlannerConfig;
pub use error::{PlannerError, Result};
pub use model::{NewProject, Project, ProjectStatus, ProjectType};
pub use state::{FileBackend, KvBackend, MemoryBackend, ProjectStore, StorageManager};
