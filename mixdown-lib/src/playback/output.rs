//! Device output: drives [`Mixer::produce_interleaved`] on a fixed cadence
//! and queues the blocks on a `rodio` sink.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{error, info, warn};
use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::audio::samples::to_samples_buffer;
use crate::mixer::Mixer;

use super::output_meter::{OutputMeter, DEFAULT_HOLD_BLOCKS};

const OUTPUT_STREAM_OPEN_RETRIES: usize = 20;
const OUTPUT_STREAM_OPEN_RETRY_MS: u64 = 100;

/// Handle to the thread feeding mixer output to the default device.
///
/// The thread stops when [`stop`](Self::stop) is called or the handle is
/// dropped.
pub struct OutputDriver {
    abort: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    blocks: Arc<AtomicU64>,
    meter: Arc<Mutex<OutputMeter>>,
    handle: Option<JoinHandle<()>>,
}

impl OutputDriver {
    /// Spawn the output thread, producing one block every `cycle`.
    pub fn start(mixer: Arc<Mixer>, cycle: Duration) -> Self {
        let abort = Arc::new(AtomicBool::new(false));
        let running = Arc::new(AtomicBool::new(true));
        let blocks = Arc::new(AtomicU64::new(0));
        let meter = Arc::new(Mutex::new(OutputMeter::new(
            mixer.spec().channel_count(),
            DEFAULT_HOLD_BLOCKS,
        )));

        let handle = {
            let abort = abort.clone();
            let running = running.clone();
            let blocks = blocks.clone();
            let meter = meter.clone();
            thread::spawn(move || {
                run_output(&mixer, cycle, &abort, &blocks, &meter);
                running.store(false, Ordering::SeqCst);
            })
        };

        Self {
            abort,
            running,
            blocks,
            meter,
            handle: Some(handle),
        }
    }

    /// Whether the output thread is still alive.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Number of non-empty blocks queued on the device so far.
    pub fn blocks_written(&self) -> u64 {
        self.blocks.load(Ordering::Relaxed)
    }

    /// Latest block peaks and the held peaks, per channel.
    pub fn levels(&self) -> (Vec<f32>, Vec<f32>) {
        let meter = self.meter.lock().unwrap_or_else(|e| e.into_inner());
        (meter.levels(), meter.peak_hold())
    }

    pub fn stop(&mut self) {
        self.abort.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("output thread panicked");
            }
        }
    }
}

impl Drop for OutputDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_output(
    mixer: &Mixer,
    cycle: Duration,
    abort: &AtomicBool,
    blocks: &AtomicU64,
    meter: &Mutex<OutputMeter>,
) {
    let stream = match open_output_stream_with_retry() {
        Some(stream) => stream,
        None => return,
    };
    let sink = Sink::connect_new(stream.mixer());

    let channels = mixer.spec().channel_count();
    let sample_rate = mixer.spec().frequency;
    info!(
        "output started: {} Hz, {} channel(s), cycle {:?}",
        sample_rate, channels, cycle
    );

    while !abort.load(Ordering::SeqCst) {
        let mut block = Vec::new();
        let produced = mixer.produce_interleaved(&mut block);
        if produced > 0 {
            meter
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push_block(&block);
            sink.append(to_samples_buffer(block, channels, sample_rate));
            blocks.fetch_add(1, Ordering::Relaxed);
        }
        thread::sleep(cycle);
    }

    sink.stop();
    info!(
        "output stopped after {} block(s)",
        blocks.load(Ordering::Relaxed)
    );
}

/// Open the default output stream with bounded retry behavior.
///
/// # Returns
///
/// `Some(OutputStream)` on success, otherwise `None` after all retries fail.
fn open_output_stream_with_retry() -> Option<OutputStream> {
    for attempt in 1..=OUTPUT_STREAM_OPEN_RETRIES {
        match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => return Some(stream),
            Err(err) => {
                if attempt == OUTPUT_STREAM_OPEN_RETRIES {
                    error!(
                        "failed to open default output stream after {} attempts: {}",
                        OUTPUT_STREAM_OPEN_RETRIES, err
                    );
                    return None;
                }
                warn!(
                    "open_default_stream attempt {}/{} failed: {}",
                    attempt, OUTPUT_STREAM_OPEN_RETRIES, err
                );
                thread::sleep(Duration::from_millis(OUTPUT_STREAM_OPEN_RETRY_MS));
            }
        }
    }
    None
}
