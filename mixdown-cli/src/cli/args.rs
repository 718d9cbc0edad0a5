//! CLI argument definitions for `mixdown-cli`.

use clap::{value_parser, Arg, ArgAction, Command};

/// Build the CLI argument parser and command definitions.
pub fn build_cli() -> Command {
    Command::new("Mixdown")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Mix a looping music track with one-shot sound effects")
        .arg_required_else_help(true)
        .args(mix_args())
        .arg(
            Arg::new("bench-mix")
                .long("bench-mix")
                .action(ArgAction::SetTrue)
                .help("Run a synthetic mixing benchmark and exit"),
        )
        .arg(
            Arg::new("bench-effects")
                .long("bench-effects")
                .value_name("COUNT")
                .default_value("8")
                .value_parser(value_parser!(usize))
                .help("Concurrent effects for the mixing benchmark"),
        )
        .arg(
            Arg::new("bench-iterations")
                .long("bench-iterations")
                .value_name("COUNT")
                .default_value("200")
                .value_parser(value_parser!(usize))
                .help("Number of produce calls for the mixing benchmark"),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .action(ArgAction::SetTrue)
                .help("Suppress all console output"),
        )
        .arg(
            Arg::new("INPUT")
                .help("The looping music track")
                .required(false)
                .index(1),
        )
        .subcommand(
            Command::new("render")
                .about("Mix offline against a simulated clock and write a WAV file")
                .args(mix_args())
                .arg(
                    Arg::new("out")
                        .long("out")
                        .short('o')
                        .value_name("PATH")
                        .required(true)
                        .help("Destination WAV file"),
                )
                .arg(
                    Arg::new("INPUT")
                        .help("The looping music track")
                        .required(false)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("probe")
                .about("Decode an audio file and print its layout")
                .arg(
                    Arg::new("INPUT")
                        .help("The audio file to inspect")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the report as JSON"),
                ),
        )
        .subcommand(
            Command::new("create")
                .about("Emit default JSON payloads")
                .subcommand(
                    Command::new("settings-json").about("Print the default mixer settings JSON"),
                ),
        )
}

/// Options shared by live playback and offline rendering. None of them carry
/// a default here so that unset flags leave a settings file untouched.
fn mix_args() -> Vec<Arg> {
    vec![
        Arg::new("settings")
            .long("settings")
            .short('S')
            .value_name("PATH")
            .help("Read mixer settings from a JSON file"),
        Arg::new("sfx")
            .long("sfx")
            .short('e')
            .value_name("PATH")
            .help("Sound effect to trigger on a timer"),
        Arg::new("interval-ms")
            .long("interval-ms")
            .value_name("MS")
            .value_parser(value_parser!(u64))
            .help("Milliseconds between effect triggers [default: 500]"),
        Arg::new("duration-secs")
            .long("duration-secs")
            .short('d')
            .value_name("SECONDS")
            .value_parser(value_parser!(f64))
            .help("Run length in seconds, 0 runs until stopped [default: 5]"),
        Arg::new("frequency")
            .long("frequency")
            .short('f')
            .value_name("HZ")
            .value_parser(value_parser!(u32))
            .help("Output sample rate [default: 44100]"),
        Arg::new("channels")
            .long("channels")
            .short('c')
            .value_name("LAYOUT")
            .value_parser(["mono", "stereo"])
            .help("Output channel layout [default: stereo]"),
        Arg::new("buffer-ms")
            .long("buffer-ms")
            .value_name("MS")
            .value_parser(value_parser!(u32))
            .help("Master buffer length in milliseconds [default: 100]"),
        Arg::new("cycle-ms")
            .long("cycle-ms")
            .value_name("MS")
            .value_parser(value_parser!(u64))
            .help("Milliseconds between produce calls [default: 10]"),
    ]
}
