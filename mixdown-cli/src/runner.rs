use std::{
    io,
    sync::Arc,
    thread::sleep,
    time::{Duration, Instant},
};

use clap::ArgMatches;
use crossterm::{
    cursor, execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info};
use mixdown_lib::playback::OutputDriver;
use mixdown_lib::settings::MixerSettings;
use mixdown_lib::Mixer;
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::cli::{self, CliResult};
use crate::controls::{self, KeyAction};
use crate::logging::{self, LogBuffer};
use crate::ui;

const IDLE_TICK: Duration = Duration::from_millis(20);

pub fn run(args: &ArgMatches, log_buffer: LogBuffer) -> CliResult<i32> {
    let quiet = args.get_flag("quiet");
    let interactive = args.subcommand().is_none() && !args.get_flag("bench-mix") && !quiet;
    logging::set_echo_stderr(!interactive && !quiet);
    info!("Starting Mixdown CLI");

    if let Some(code) = cli::bench::maybe_run_bench(args)? {
        return Ok(code);
    }

    match args.subcommand() {
        Some(("render", sub)) => cli::render::run_render(sub),
        Some(("probe", sub)) => cli::probe::run_probe(sub),
        Some(("create", sub)) => cli::create::run_create(sub),
        _ => {
            let settings = cli::settings::resolve(args)?;
            play(&settings, quiet, log_buffer)
        }
    }
}

/// Live playback: the output thread pulls from the mixer while this thread
/// fires the scheduled effect, draws the status panel and reads keys.
fn play(settings: &MixerSettings, quiet: bool, log_buffer: LogBuffer) -> CliResult<i32> {
    let config = settings.to_config()?;
    let title = format!("Mixdown: {}", config.background);
    let mixer = Arc::new(Mixer::open(config)?);
    if let Some(effect) = settings.effect.as_deref() {
        mixer.preload(effect)?;
    }

    // Capture before the device opens so backend chatter lands in the log panel.
    let _stderr_capture = if quiet {
        None
    } else {
        logging::capture_stderr(log_buffer.clone())
    };
    let mut output = OutputDriver::start(mixer.clone(), settings.cycle());

    let _raw_mode = if quiet {
        None
    } else {
        RawModeGuard::enable().ok()
    };
    let mut terminal = if quiet { None } else { TerminalGuard::enter() };

    let started = Instant::now();
    let mut next_trigger = started + settings.effect_interval();
    let mut triggers = 0_usize;
    let mut result = Ok(0);

    loop {
        let now = Instant::now();
        if settings
            .run_duration()
            .is_some_and(|duration| now.duration_since(started) >= duration)
        {
            break;
        }
        if !output.is_running() {
            error!("output device stopped");
            result = Ok(1);
            break;
        }

        let mut fire = false;
        if now >= next_trigger {
            fire = true;
            next_trigger += settings.effect_interval();
        }

        if let Some(guard) = terminal.as_mut() {
            let (levels, peak_hold) = output.levels();
            let status = controls::status_text(controls::StatusArgs {
                elapsed: now.duration_since(started),
                duration: settings.run_duration(),
                frequency: mixer.spec().frequency,
                effect: settings.effect.as_deref(),
                triggers,
                active_effects: mixer.active_effects(),
                background_cursor: mixer.background_cursor(),
                pending_samples: mixer.pending_samples(),
                buffer_capacity: mixer.buffer_capacity(),
                blocks_written: output.blocks_written(),
                levels,
                peak_hold,
            });
            let log_lines = logging::snapshot(&log_buffer);
            ui::draw_status(&mut guard.terminal, &title, &status, &log_lines);

            match controls::handle_key_event() {
                KeyAction::Quit => break,
                KeyAction::TriggerEffect => fire = true,
                KeyAction::Continue => {}
            }
        } else {
            sleep(IDLE_TICK);
        }

        if fire {
            if let Some(effect) = settings.effect.as_deref() {
                if let Err(err) = mixer.request_playback(effect) {
                    result = Err(err.into());
                    break;
                }
                triggers += 1;
            }
        }
    }

    output.stop();
    mixer.shutdown();
    info!("played {} effect trigger(s)", triggers);
    result
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Alternate screen for the TUI, restored on drop so an early return still
/// leaves a usable terminal.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn enter() -> Option<Self> {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, EnterAlternateScreen, cursor::Hide);
        let backend = CrosstermBackend::new(stdout);
        Terminal::new(backend).ok().map(|terminal| Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        let stdout = self.terminal.backend_mut();
        let _ = execute!(stdout, LeaveAlternateScreen, cursor::Show);
    }
}
