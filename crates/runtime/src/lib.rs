pub mod activity;
pub mod clock;
pub mod debounce;
pub mod timer;
pub mod tween;

pub use activity::*;
pub use clock::*;
pub use debounce::*;
pub use timer::*;
pub use tween::*;
