pub mod api;
pub mod error;
pub mod species;
pub mod timeline;

pub use api::*;
pub use error::*;
pub use species::*;
pub use timeline::*;
