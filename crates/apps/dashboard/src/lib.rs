//! Executor and terminal front end for the species dashboard.
//!
//! [`Driver`] runs the commands the session state machines hand back on a
//! tokio runtime and feeds the results back in.

pub mod config;
pub mod driver;
pub mod render;

pub use config::*;
pub use driver::*;
