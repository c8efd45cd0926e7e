pub mod buffers;
pub mod camera;
pub mod color;
pub mod config;
pub mod error;
pub mod framing;
pub mod renderer;
pub mod surface;

pub use buffers::*;
pub use camera::*;
pub use color::*;
pub use config::*;
pub use error::*;
pub use framing::*;
pub use renderer::*;
pub use surface::*;
