use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};

const METER_WIDTH: usize = 24;

/// What the main loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Continue,
    TriggerEffect,
    Quit,
}

pub struct StatusSnapshot {
    pub text: String,
}

pub struct StatusArgs<'a> {
    pub elapsed: Duration,
    pub duration: Option<Duration>,
    pub frequency: u32,
    pub effect: Option<&'a str>,
    pub triggers: usize,
    pub active_effects: usize,
    pub background_cursor: usize,
    pub pending_samples: usize,
    pub buffer_capacity: usize,
    pub blocks_written: u64,
    pub levels: Vec<f32>,
    pub peak_hold: Vec<f32>,
}

pub fn status_text(args: StatusArgs) -> StatusSnapshot {
    let current = format_time(args.elapsed.as_secs_f64() * 1000.0);
    let total = match args.duration {
        Some(duration) => format_time(duration.as_secs_f64() * 1000.0),
        None => "--:--:--".to_string(),
    };
    let background_secs = if args.frequency > 0 {
        args.background_cursor as f64 / args.frequency as f64
    } else {
        0.0
    };
    let effect = args.effect.unwrap_or("none");

    let mut text = format!(
        "▶ Mixing   {} / {}\nEffect: {} | triggered: {} | playing: {}\nMusic: {:.2}s | pending: {} / {} | blocks: {}",
        current,
        total,
        effect,
        args.triggers,
        args.active_effects,
        background_secs,
        args.pending_samples,
        args.buffer_capacity,
        args.blocks_written
    );
    for (index, level) in args.levels.iter().enumerate() {
        let hold = args.peak_hold.get(index).copied().unwrap_or(*level);
        text.push_str(&format!(
            "\nch{} {} {:.2}",
            index,
            meter_bar(*level, hold),
            hold
        ));
    }

    StatusSnapshot { text }
}

pub fn handle_key_event() -> KeyAction {
    if event::poll(Duration::from_millis(20)).unwrap_or(false) {
        if let Ok(Event::Key(key)) = event::read() {
            if key.kind != KeyEventKind::Press {
                return KeyAction::Continue;
            }
            return match key.code {
                KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
                KeyCode::Char(' ') => KeyAction::TriggerEffect,
                _ => KeyAction::Continue,
            };
        }
    }

    KeyAction::Continue
}

fn meter_bar(level: f32, hold: f32) -> String {
    let filled = cells(level);
    let hold_cell = cells(hold);
    (0..METER_WIDTH)
        .map(|cell| {
            if cell < filled {
                '█'
            } else if hold_cell > 0 && cell == hold_cell - 1 {
                '|'
            } else {
                '·'
            }
        })
        .collect()
}

fn cells(level: f32) -> usize {
    (level.clamp(0.0, 1.0) * METER_WIDTH as f32).round() as usize
}

fn format_time(time: f64) -> String {
    let seconds = (time / 1000.0).ceil() as u32;
    let minutes = seconds / 60;
    let seconds = seconds % 60;
    let hours = minutes / 60;
    let minutes = minutes % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> StatusArgs<'static> {
        StatusArgs {
            elapsed: Duration::from_millis(1_500),
            duration: Some(Duration::from_secs(5)),
            frequency: 1_000,
            effect: Some("blip.wav"),
            triggers: 3,
            active_effects: 1,
            background_cursor: 250,
            pending_samples: 40,
            buffer_capacity: 100,
            blocks_written: 12,
            levels: vec![0.5, 0.0],
            peak_hold: vec![0.75, 0.0],
        }
    }

    #[test]
    fn status_lists_mixer_state() {
        let text = status_text(args()).text;
        assert!(text.contains("00:00:02 / 00:00:05"));
        assert!(text.contains("Effect: blip.wav | triggered: 3 | playing: 1"));
        assert!(text.contains("Music: 0.25s | pending: 40 / 100 | blocks: 12"));
        assert_eq!(text.lines().filter(|line| line.starts_with("ch")).count(), 2);
    }

    #[test]
    fn unbounded_runs_show_no_total() {
        let text = status_text(StatusArgs {
            duration: None,
            effect: None,
            ..args()
        })
        .text;
        assert!(text.contains("/ --:--:--"));
        assert!(text.contains("Effect: none"));
    }

    #[test]
    fn meter_marks_the_peak_hold() {
        let bar = meter_bar(0.25, 0.5);
        assert_eq!(bar.chars().count(), METER_WIDTH);
        assert_eq!(bar.chars().filter(|c| *c == '█').count(), METER_WIDTH / 4);
        assert_eq!(bar.chars().nth(METER_WIDTH / 2 - 1), Some('|'));
    }

    #[test]
    fn time_rounds_up_to_whole_seconds() {
        assert_eq!(format_time(0.0), "00:00:00");
        assert_eq!(format_time(61_001.0), "00:01:02");
        assert_eq!(format_time(3_600_000.0), "01:00:00");
    }
}
