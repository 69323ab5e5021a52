//! Value types shared by every decoded structure.

pub mod handle;
pub mod value;
pub mod vector;

pub use handle::{Handle, HandleRef};
pub use value::Value;
pub use vector::{Vector2, Vector3};
