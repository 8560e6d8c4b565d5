pub mod token;

// Foundation crate: small, well-tested primitives only.
pub use token::*;
