use assert_cmd::Command;
use mixdown_lib::settings::MixerSettings;
use predicates::prelude::*;

#[test]
fn create_settings_json_prints_the_defaults() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mixdown"));
    let assert = cmd
        .args(["create", "settings-json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"frequency\": 44100"))
        .stdout(predicate::str::contains("\"channels\": \"stereo\""))
        .stdout(predicate::str::contains("\"buffer_ms\": 100"));

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let settings = MixerSettings::from_json_str(&stdout).unwrap();
    assert_eq!(settings, MixerSettings::default());
}

#[test]
fn no_arguments_prints_help() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mixdown"));
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
