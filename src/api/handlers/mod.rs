pub mod admin;
pub mod projections;
pub mod slate;
pub mod system;

pub use admin::*;
pub use projections::*;
pub use slate::*;
pub use system::*;
