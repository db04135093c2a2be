//! Loading visitor logs from disk.

pub mod loaders;


pub use loaders::{VisitLoadResult, VisitLoader};
