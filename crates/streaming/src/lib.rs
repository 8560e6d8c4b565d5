pub mod compositor;
pub mod image;
pub mod residency;
pub mod source;
pub mod tile;

pub use compositor::*;
pub use image::*;
pub use residency::*;
pub use source::*;
pub use tile::*;
