pub mod access;
pub mod repository;
pub mod report;

pub use access::*;
pub use repository::*;
pub use report::*;
