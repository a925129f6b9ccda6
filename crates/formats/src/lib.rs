pub mod flights;

pub use flights::*;
