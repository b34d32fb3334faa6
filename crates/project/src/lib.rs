pub mod error;
pub mod host;
pub mod layer;
pub mod probe;
pub mod registry;
