//! Keyboard controls for the running visualizer

use crossterm::event::{KeyCode, KeyModifiers};

/// What the frame loop should do after a key press
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    NextMode,
}

/// Runtime state for interactive controls
pub struct Controls {
    pub speed: f32, // Current speed (time per frame)
    pub paused: bool,
    pub show_help: bool,
}

impl Controls {
    pub fn new(initial_speed: f32) -> Self {
        Self {
            speed: initial_speed,
            paused: false,
            show_help: false,
        }
    }

    /// Handle keypress
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Action {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return Action::Quit,
            KeyCode::Char('m') | KeyCode::Char('M') | KeyCode::Tab | KeyCode::Enter => {
                return Action::NextMode
            }
            KeyCode::Char(' ') => self.paused = !self.paused,
            KeyCode::Char('?') => self.show_help = !self.show_help,
            // Number keys: change speed (1=fastest, 9=slowest, 0=very slow)
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.speed = match c {
                    '0' => 0.2,
                    '1' => 0.008,
                    '2' => 0.016,
                    '3' => 0.02,
                    '4' => 0.03,
                    '5' => 0.05,
                    '6' => 0.07,
                    '7' => 0.1,
                    '8' => 0.15,
                    _ => 0.2,
                };
            }
            _ => {}
        }
        Action::None
    }
}
