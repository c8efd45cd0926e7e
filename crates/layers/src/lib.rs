pub mod markers;
pub mod playback;

pub use markers::*;
pub use playback::*;
