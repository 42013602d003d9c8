//! Integration tests for the dip crates.
//!
//! End-to-end pipelines that cross crate boundaries: FFT round-trips,
//! detector behavior on synthetic noisy fixtures, restoration through the
//! frequency domain, and PNG round-trips through the filesystem.
