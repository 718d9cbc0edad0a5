use clap::ArgMatches;

use super::CliResult;

pub fn maybe_run_bench(args: &ArgMatches) -> CliResult<Option<i32>> {
    if args.get_flag("bench-mix") {
        return run_mix_bench(args);
    }
    Ok(None)
}

fn run_mix_bench(_args: &ArgMatches) -> CliResult<Option<i32>> {
    #[cfg(not(feature = "bench"))]
    {
        eprintln!("Benchmarking requires the `bench` feature.");
        return Ok(Some(1));
    }
    #[cfg(feature = "bench")]
    {
        use mixdown_lib::diagnostics::bench::{bench_mixer_sweep, MixBenchConfig};

        let args = _args;
        let settings = super::settings::resolve(args)?;
        let effects = args.get_one::<usize>("bench-effects").copied().unwrap_or(8);
        let iterations = args
            .get_one::<usize>("bench-iterations")
            .copied()
            .unwrap_or(200);

        let base = MixBenchConfig {
            frequency: settings.frequency,
            channels: settings.channels.channels().len(),
            buffer_ms: settings.buffer_ms,
            effects,
            iterations,
        };
        let mut counts = vec![0, 1, effects / 2, effects];
        counts.sort_unstable();
        counts.dedup();

        println!(
            "Mix bench ({} Hz, {} ch, buffer {} ms, iters {})",
            base.frequency, base.channels, base.buffer_ms, iterations
        );
        println!("effects | avg_ms | min_ms | max_ms | rt_x");
        for (count, result) in bench_mixer_sweep(base, &counts) {
            println!(
                "{:>7} | {:>6.3} | {:>6.3} | {:>6.3} | {:>6.1}",
                count, result.avg_ms, result.min_ms, result.max_ms, result.rt_factor
            );
        }

        return Ok(Some(0));
    }
}
