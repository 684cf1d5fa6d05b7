pub mod analyze;
pub mod model;

pub use analyze::{analyze, Block, Edge, EdgeKind, Report};
pub use model::{load_listing, Image, Segment};
