pub mod dir;
pub mod embedded;
pub mod kind;
pub mod manager;

pub use dir::*;
pub use embedded::*;
pub use kind::*;
pub use manager::*;
