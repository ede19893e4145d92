//! Texture management

pub mod depth;
pub mod texture2d;

pub use depth::{DepthTexture, DEPTH_FORMAT};
pub use texture2d::{mip_level_count, Filtering, Texture2D, WrapMode};
