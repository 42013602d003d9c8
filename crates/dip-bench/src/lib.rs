//! Benchmark-only crate; see `benches/dip_bench.rs`.
