//! Benchmarks and other diagnostics, compiled with the `bench` feature.

#[cfg(feature = "bench")]
pub mod bench;
