//! Headless core of MaskPruner: geometry, mask engine, image set and
//! the masking session. The iced front end in `main.rs` drives it.

pub mod error;
pub mod geometry;
pub mod host;
pub mod mask;
pub mod state;

pub use error::{Error, Result};
