pub mod image;
pub mod style;

pub use image::*;
pub use style::*;
