pub mod error;
pub mod tree_support;
pub mod type_support;

pub use error::ThicketError;
pub use tree_support::{TreeConfig, TreeSerializer, TreeSupport};
