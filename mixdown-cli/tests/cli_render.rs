use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

const RATE: u32 = 8_000;

fn write_tone(path: &Path, value: i16, frames: usize) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for _ in 0..frames {
        writer.write_sample(value).unwrap();
    }
    writer.finalize().unwrap();
}

fn mixdown() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("mixdown"))
}

#[test]
fn render_mixes_music_and_effect_into_a_wav() {
    let dir = tempfile::tempdir().unwrap();
    let music = dir.path().join("music.wav");
    let blip = dir.path().join("blip.wav");
    let out = dir.path().join("mix.wav");
    write_tone(&music, 8_192, 800);
    write_tone(&blip, 16_384, 80);

    mixdown()
        .arg("render")
        .arg(&music)
        .arg("--out")
        .arg(&out)
        .arg("--sfx")
        .arg(&blip)
        .args([
            "--frequency",
            "8000",
            "--channels",
            "mono",
            "--duration-secs",
            "0.5",
            "--interval-ms",
            "100",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rendered 4000 frame(s)"))
        .stdout(predicate::str::contains("5 effect trigger(s)"));

    let mut reader = hound::WavReader::open(&out).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, RATE);
    assert_eq!(spec.sample_format, hound::SampleFormat::Float);

    let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
    assert_eq!(samples.len(), 4_000);
    assert_eq!(samples[0], 0.75);
    assert_eq!(samples[79], 0.75);
    assert_eq!(samples[80], 0.25);
}

#[test]
fn render_without_music_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("mix.wav");

    mixdown()
        .arg("render")
        .arg(dir.path().join("missing.wav"))
        .arg("--out")
        .arg(&out)
        .assert()
        .failure();
    assert!(!out.exists());
}

#[test]
fn render_rejects_unbounded_duration() {
    let dir = tempfile::tempdir().unwrap();
    let music = dir.path().join("music.wav");
    write_tone(&music, 8_192, 800);

    mixdown()
        .arg("render")
        .arg(&music)
        .arg("--out")
        .arg(dir.path().join("mix.wav"))
        .args(["--frequency", "8000", "--duration-secs", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("duration"));
}
