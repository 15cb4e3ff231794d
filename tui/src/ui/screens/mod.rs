pub mod lab;
pub mod menu;
pub mod setup;

use crossterm::event::KeyCode;
use ratatui::Frame;

pub enum Action {
    None,
    Quit,
    Transition(Screen),
}

pub enum Screen {
    Menu(menu::MenuState),
    Setup(setup::SetupState),
    Lab(lab::LabState),
}

impl Screen {
    /// Per-frame update before drawing. Only the lab screen has live state.
    pub fn tick(&mut self) {
        if let Screen::Lab(s) = self {
            s.tick();
        }
    }

    pub fn draw(&self, f: &mut Frame) {
        match self {
            Screen::Menu(s) => menu::draw(f, s),
            Screen::Setup(s) => setup::draw(f, s),
            Screen::Lab(s) => lab::draw(f, s),
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Action {
        match self {
            Screen::Menu(s) => menu::handle_key(s, key),
            Screen::Setup(s) => setup::handle_key(s, key),
            Screen::Lab(s) => lab::handle_key(s, key),
        }
    }
}
