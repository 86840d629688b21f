pub mod analyze;
pub mod model;

pub use analyze::{branch_targets, edges, Edge, EdgeKind};
pub use model::{import_source_labels, load_image, Image};
