//! # linkflip-qr
//!
//! Self-contained QR Model 2 encoder used to draw the code on the back of a
//! card. Text goes in, a square [`BitMatrix`] of dark/light modules comes
//! out; the [`render`] module turns that matrix into vector geometry, SVG, a
//! PNG data URI or terminal text.
//!
//! Encoding always uses the smallest version (1-40) that fits the text at the
//! requested [`ErrorTolerance`], and picks the mask with the lowest penalty.

mod bits;
pub mod ecc;
pub mod encoder;
mod error;
pub mod matrix;
mod reed_solomon;
pub mod render;
pub mod segment;

pub use ecc::ErrorTolerance;
pub use encoder::encode;
pub use error::EncodeError;
pub use matrix::BitMatrix;
pub use render::{to_drawable, Drawable, Rect};
