//! # dip-core
//!
//! Core types for 2-D image processing: the [`Image`] buffer, the shared
//! [`Error`] type, and intensity constants.
//!
//! ## Design Philosophy
//!
//! - **One buffer type**: a dense row-major `f32` grid with 1 or 3 channels
//!   carries every intermediate (spatial images, spectra, edge maps).
//! - **Fail fast**: dimensions and parameters are validated at operation
//!   boundaries; no operation returns a partially written buffer.
//! - **Value semantics**: cloning deep-copies sample storage, so pipeline
//!   stages can never alias each other's data.
//!
//! ## Crate Layout
//!
//! ```text
//!   dip-io ──────┐
//!                ├──> dip-core (Image, Error)
//!   dip-ops ─────┘
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod image;

pub use error::{Error, Result};
pub use image::{BIT_DEPTH, Image, LEVELS, MAX_LEVEL, SampleFormat, floor_power_of_two};

/// Commonly used imports.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::image::{BIT_DEPTH, Image, LEVELS, MAX_LEVEL, SampleFormat};
}
