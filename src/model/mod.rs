//! Model management and loading infrastructure.

pub mod device;
pub mod graph;
pub mod labels;
pub mod source;

pub use device::Device;
pub use graph::GraphInfo;
pub use labels::{load_labels, parse_id2label};
pub use source::{ModelFiles, ModelSource};
