//! # dip-io
//!
//! File codecs bridging [`dip_core::Image`] buffers to disk.
//!
//! PNG is the only on-disk format: [`png::read`] decodes 8- and 16-bit
//! grayscale and color files into `f32` buffers, [`png::write`] encodes
//! buffers back out at 8 bits with optional range rescaling. The numeric
//! crates never touch the filesystem themselves.
//!
//! # Example
//!
//! ```rust,ignore
//! use dip_io::png;
//!
//! let image = png::read("input.png")?;
//! let edges = dip_ops::canny::canny(&image, 2.0)?;
//! png::write("edges.png", &edges, false)?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod png;

pub use error::{IoError, IoResult};
