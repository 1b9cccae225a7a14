//! Terminal front end: event loop and key handling

use std::time::Duration;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{DefaultTerminal, Frame};
use saavy_reverb::{
    engine::{AudioGraphRunner, ChainControls, ChainTaps},
    param::ParamHandle,
};

use crate::ui;

const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const MAX_RAMP_SECS: f32 = 2.0;

/// Rows of the control list, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Feedback,
    Cutoff,
    Balance,
    Ramp,
}

impl Control {
    pub const ALL: [Control; 4] = [
        Control::Feedback,
        Control::Cutoff,
        Control::Balance,
        Control::Ramp,
    ];
}

pub struct App {
    pub runner: AudioGraphRunner,
    pub controls: ChainControls,
    pub taps: ChainTaps,
    pub selected: usize,
    /// Last rejected action, shown in the status line.
    pub message: Option<String>,
    should_quit: bool,
}

impl App {
    pub fn new(runner: AudioGraphRunner, controls: ChainControls, taps: ChainTaps) -> Self {
        Self {
            runner,
            controls,
            taps,
            selected: 0,
            message: None,
            should_quit: false,
        }
    }

    pub fn run(&mut self, mut terminal: DefaultTerminal) -> EyreResult<()> {
        self.toggle_playback();

        while !self.should_quit {
            self.taps.poll();
            terminal.draw(|frame| self.render(frame))?;

            if event::poll(FRAME_INTERVAL)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        self.runner.stop()?;
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        ui::render(frame, self);
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(' ') => self.toggle_playback(),
            KeyCode::Tab | KeyCode::Down => {
                self.selected = (self.selected + 1) % Control::ALL.len();
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.selected = (self.selected + Control::ALL.len() - 1) % Control::ALL.len();
            }
            KeyCode::Right => self.adjust(1.0),
            KeyCode::Left => self.adjust(-1.0),
            _ => {}
        }
    }

    fn toggle_playback(&mut self) {
        let result = if self.runner.is_running() {
            self.runner.stop()
        } else {
            self.taps.clear();
            self.runner.start()
        };
        self.message = result.err().map(|err| err.to_string());
    }

    pub fn selected_control(&self) -> Control {
        Control::ALL[self.selected]
    }

    fn adjust(&mut self, direction: f32) {
        let result = match self.selected_control() {
            Control::Feedback => {
                let target = step_linear(&self.controls.feedback, direction * 0.02);
                self.controls.set_feedback(target)
            }
            Control::Cutoff => {
                // Quarter-octave steps.
                let handle = &self.controls.cutoff;
                let target = handle
                    .spec()
                    .clamp(handle.target() * 2f32.powf(direction * 0.25));
                self.controls.set_cutoff(target)
            }
            Control::Balance => {
                let target = step_linear(&self.controls.balance, direction * 0.05);
                self.controls.set_balance(target)
            }
            Control::Ramp => {
                let ramp =
                    (self.controls.ramp_duration() + direction * 0.01).clamp(0.0, MAX_RAMP_SECS);
                self.controls.set_ramp_duration(ramp)
            }
        };
        self.message = result.err().map(|err| err.to_string());
    }
}

fn step_linear(handle: &ParamHandle, delta: f32) -> f32 {
    handle.spec().clamp(handle.target() + delta)
}
