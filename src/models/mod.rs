pub mod file;
pub mod id;

pub use file::*;
pub use id::*;
