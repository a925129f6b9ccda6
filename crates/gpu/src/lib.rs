//! GPU-ready data for the flight globe: vertex layouts, the uniform block and
//! per-frame packets. Nothing here touches a device, so it is shared by the
//! web viewer and the tests.

pub mod globals;
pub mod renderer;
pub mod vertex;

pub use globals::*;
pub use renderer::*;
pub use vertex::*;
