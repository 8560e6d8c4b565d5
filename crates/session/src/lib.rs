//! Client-side orchestration of the species dashboard.
//!
//! The types here are sans-IO state machines: they take user actions and
//! finished I/O, mutate themselves, and hand back [`Command`]s for an
//! executor to run.

pub mod command;
pub mod config;
pub mod dashboard;
pub mod popular;
pub mod search;
pub mod selection;

pub use command::*;
pub use config::*;
pub use dashboard::*;
pub use popular::*;
pub use search::*;
pub use selection::*;
