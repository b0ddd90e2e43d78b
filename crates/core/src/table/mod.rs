pub mod loader;
pub mod types;

pub use loader::LoadError;
pub use types::{SalesRow, SalesTable};
