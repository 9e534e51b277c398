pub mod baseline;
pub mod merge;
pub mod shaper;

pub use shaper::ResourceShaper;
