pub mod kdtree;

pub use kdtree::{Item, KdTree};
