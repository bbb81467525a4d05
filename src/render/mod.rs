//! Map figure rendering.

pub mod colormap;
pub mod map;

pub use colormap::{viridis, Rgb};
pub use map::{Extent, MapFigure};
