//! Shared constants for mixer and playback defaults.

/// Default output sample rate (Hz).
pub const DEFAULT_FREQUENCY: u32 = 44_100;

/// Default master buffer length (ms). At 44.1 kHz this is 4410 samples.
pub const DEFAULT_BUFFER_MS: u32 = 100;

/// Default interval between production calls of the output driver (ms).
pub const DEFAULT_CYCLE_MS: u64 = 10;

/// Default interval between scheduled effect triggers (ms).
pub const DEFAULT_EFFECT_INTERVAL_MS: u64 = 500;

/// Default run length of the demo program and offline renders (seconds).
pub const DEFAULT_DURATION_SECS: f64 = 5.0;
