//! Merge a settings file with command line overrides.

use clap::ArgMatches;
use mixdown_lib::audio::spec::ChannelLayout;
use mixdown_lib::settings::{MixerSettings, SettingsError};

/// Start from `--settings` (or the defaults) and apply every flag the user
/// actually passed. The `INPUT` positional replaces the background track.
pub fn resolve(args: &ArgMatches) -> Result<MixerSettings, SettingsError> {
    let mut settings = match args.get_one::<String>("settings") {
        Some(path) => MixerSettings::from_json_file(path)?,
        None => MixerSettings::default(),
    };
    apply_overrides(&mut settings, args);
    Ok(settings)
}

fn apply_overrides(settings: &mut MixerSettings, args: &ArgMatches) {
    if let Some(input) = args.get_one::<String>("INPUT") {
        settings.background = Some(input.clone());
    }
    if let Some(effect) = args.get_one::<String>("sfx") {
        settings.effect = Some(effect.clone());
    }
    if let Some(interval) = args.get_one::<u64>("interval-ms") {
        settings.effect_interval_ms = *interval;
    }
    if let Some(duration) = args.get_one::<f64>("duration-secs") {
        settings.duration_secs = *duration;
    }
    if let Some(frequency) = args.get_one::<u32>("frequency") {
        settings.frequency = *frequency;
    }
    if let Some(layout) = args
        .get_one::<String>("channels")
        .and_then(|value| ChannelLayout::parse(value))
    {
        settings.channels = layout;
    }
    if let Some(buffer_ms) = args.get_one::<u32>("buffer-ms") {
        settings.buffer_ms = *buffer_ms;
    }
    if let Some(cycle_ms) = args.get_one::<u64>("cycle-ms") {
        settings.cycle_ms = *cycle_ms;
    }
}
