//! `mixdown render`: mix offline against a simulated clock.

use std::sync::Arc;

use clap::ArgMatches;
use mixdown_lib::asset::{CachingLoader, SymphoniaLoader};
use mixdown_lib::mixer::clock::ManualClock;
use mixdown_lib::playback::{render_to_wav, RenderPlan};
use mixdown_lib::Mixer;

use super::{settings, CliResult};

pub fn run_render(args: &ArgMatches) -> CliResult<i32> {
    let settings = settings::resolve(args)?;
    let Some(out) = args.get_one::<String>("out") else {
        return Ok(1);
    };
    let Some(duration) = settings.run_duration() else {
        return Err("render needs a positive --duration-secs".into());
    };

    let config = settings.to_config()?;
    let loader = CachingLoader::new(SymphoniaLoader::new(config.spec.clone()));
    let clock = ManualClock::new();
    let mixer = Mixer::initialize(config, Arc::new(loader), Arc::new(clock.clone()))?;

    let plan = RenderPlan {
        duration,
        cycle: settings.cycle(),
        effect: settings.effect.clone(),
        effect_interval: settings.effect_interval(),
    };
    let summary = render_to_wav(&mixer, &clock, &plan, out)?;
    mixer.shutdown();

    println!(
        "Rendered {} frame(s) to {} ({} effect trigger(s), peak {:.3})",
        summary.frames, out, summary.effects_triggered, summary.peak
    );
    Ok(0)
}
