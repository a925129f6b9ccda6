pub mod geodesy;
pub mod matrix;
pub mod vec;

pub use geodesy::*;
pub use matrix::*;
pub use vec::*;
