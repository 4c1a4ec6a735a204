pub mod body;
pub mod gravity;

pub use body::Body;
