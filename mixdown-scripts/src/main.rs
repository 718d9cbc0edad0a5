use std::env;
use std::f32::consts::TAU;
use std::path::{Path, PathBuf};

use mixdown_lib::asset::decode_file;

struct ToneOptions {
    out_path: Option<PathBuf>,
    freq: f32,
    ms: u32,
    rate: u32,
    channels: u16,
    gain: f32,
    decay: bool,
}

impl Default for ToneOptions {
    fn default() -> Self {
        Self {
            out_path: None,
            freq: 440.0,
            ms: 1_000,
            rate: 44_100,
            channels: 2,
            gain: 0.5,
            decay: false,
        }
    }
}

fn main() {
    let mut args = env::args().skip(1);
    let Some(cmd) = args.next() else {
        print_help();
        return;
    };

    match cmd.as_str() {
        "tone" => tone_cmd(args.collect()),
        "-h" | "--help" => print_help(),
        _ => {
            eprintln!("Unknown command: {}", cmd);
            print_help();
        }
    }
}

fn tone_cmd(args: Vec<String>) {
    let mut options = ToneOptions::default();

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--out" => match iter.next() {
                Some(path) => options.out_path = Some(PathBuf::from(path)),
                None => {
                    eprintln!("--out requires a path");
                    return;
                }
            },
            "--freq" => match parse_value(&arg, iter.next()) {
                Some(value) => options.freq = value,
                None => return,
            },
            "--ms" => match parse_value(&arg, iter.next()) {
                Some(value) => options.ms = value,
                None => return,
            },
            "--rate" => match parse_value(&arg, iter.next()) {
                Some(value) => options.rate = value,
                None => return,
            },
            "--channels" => match parse_value(&arg, iter.next()) {
                Some(value) => options.channels = value,
                None => return,
            },
            "--gain" => match parse_value(&arg, iter.next()) {
                Some(value) => options.gain = value,
                None => return,
            },
            "--decay" => options.decay = true,
            "-h" | "--help" => {
                print_tone_help();
                return;
            }
            _ => {
                eprintln!("Unknown tone arg: {}", arg);
                print_tone_help();
                return;
            }
        }
    }

    let Some(path) = options.out_path.clone() else {
        eprintln!("--out is required");
        print_tone_help();
        return;
    };
    if options.rate == 0 || options.channels == 0 {
        eprintln!("--rate and --channels must be positive");
        return;
    }

    if let Err(err) = write_tone(&path, &options) {
        eprintln!("Failed to write {}: {}", path.display(), err);
        return;
    }

    match decode_file(&path.to_string_lossy()) {
        Ok(asset) => println!(
            "Wrote {} ({} Hz, {} ch, {} frames, peak {:.3})",
            path.display(),
            asset.sample_rate(),
            asset.channel_count(),
            asset.duration_samples(),
            asset.peak()
        ),
        Err(err) => eprintln!("Wrote {} but it does not decode: {}", path.display(), err),
    }
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<String>) -> Option<T> {
    let Some(value) = value else {
        eprintln!("{} requires a value", flag);
        return None;
    };
    match value.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            eprintln!("Invalid {} value: {}", flag, value);
            None
        }
    }
}

fn write_tone(path: &Path, options: &ToneOptions) -> Result<(), hound::Error> {
    let spec = hound::WavSpec {
        channels: options.channels,
        sample_rate: options.rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let frames = (options.rate as u64 * options.ms as u64 / 1000).max(1) as usize;
    let gain = options.gain.clamp(0.0, 1.0);

    let mut writer = hound::WavWriter::create(path, spec)?;
    for frame in 0..frames {
        let t = frame as f32 / options.rate as f32;
        let envelope = if options.decay {
            1.0 - frame as f32 / frames as f32
        } else {
            1.0
        };
        let sample = (TAU * options.freq * t).sin() * gain * envelope;
        let value = (sample * i16::MAX as f32) as i16;
        for _ in 0..options.channels {
            writer.write_sample(value)?;
        }
    }
    writer.finalize()
}

fn print_help() {
    println!(
        "mixdown-scripts\n\nCommands:\n  tone    Write a sine tone WAV for use as music or an effect\n\nRun 'mixdown-scripts tone --help' for options."
    );
}

fn print_tone_help() {
    println!(
        "mixdown-scripts tone --out <path> [--freq HZ] [--ms MS] [--rate HZ] [--channels N] [--gain G] [--decay]\n\nDefaults: 440 Hz, 1000 ms, 44100 Hz, 2 channels, gain 0.5. --decay fades linearly to silence."
    );
}
