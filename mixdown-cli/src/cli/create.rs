//! `mixdown create ...`: print default payloads.

use clap::ArgMatches;
use mixdown_lib::settings::MixerSettings;

use super::CliResult;

pub fn run_create(args: &ArgMatches) -> CliResult<i32> {
    match args.subcommand() {
        Some(("settings-json", _)) => {
            println!("{}", MixerSettings::default().to_json_pretty()?);
            Ok(0)
        }
        _ => {
            eprintln!("Nothing to create. Try `mixdown create settings-json`.");
            Ok(1)
        }
    }
}
