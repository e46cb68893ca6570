pub mod player;
pub mod projection;
pub mod signal;
pub mod slate;

pub use player::*;
pub use projection::*;
pub use signal::*;
pub use slate::*;
