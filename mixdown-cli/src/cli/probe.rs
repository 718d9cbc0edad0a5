//! `mixdown probe`: decode a file and report its layout without playing it.

use clap::ArgMatches;
use log::info;
use serde::Serialize;

use mixdown_lib::asset::decode_file;

use super::CliResult;

#[derive(Debug, Serialize)]
struct ProbeReport<'a> {
    path: &'a str,
    sample_rate: u32,
    channels: usize,
    frames: usize,
    duration_secs: f64,
    peak: f32,
}

pub fn run_probe(args: &ArgMatches) -> CliResult<i32> {
    let Some(path) = args.get_one::<String>("INPUT") else {
        return Ok(1);
    };

    let asset = decode_file(path)?;
    let report = ProbeReport {
        path,
        sample_rate: asset.sample_rate(),
        channels: asset.channel_count(),
        frames: asset.duration_samples(),
        duration_secs: asset.duration().as_secs_f64(),
        peak: asset.peak(),
    };
    info!("probed {}", path);

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{}: sample_rate={} channels={} frames={} duration={:.3}s peak={:.3}",
            report.path,
            report.sample_rate,
            report.channels,
            report.frames,
            report.duration_secs,
            report.peak
        );
    }
    Ok(0)
}
