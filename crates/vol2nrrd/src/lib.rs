pub mod chunk;
pub mod container;
pub mod convert;
pub mod error;
pub mod geometry;
pub mod metadata;
pub mod nrrd;
pub mod rotate;
pub mod volume;

pub use container::{VolumeDescriptor, ARRAY_TAG, VERSION_TAG};
pub use error::{Error, Result};
pub use volume::FILL_VALUE;
