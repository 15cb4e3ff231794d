use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    widgets::Block,
    Frame,
};

use crate::state::session::SessionState;
use crate::ui::theme::Theme;
use crate::ui::widgets;

use super::Action;

pub struct LabState {
    session: SessionState,
}

impl LabState {
    pub fn new(session: SessionState) -> Self {
        Self { session }
    }

    /// Per-frame update: drains pending training events into the view.
    pub fn tick(&mut self) {
        self.session.tick();
    }
}

pub fn handle_key(state: &mut LabState, key: KeyCode) -> Action {
    match key {
        KeyCode::Char('s') => {
            state.session.start();
            Action::None
        }
        KeyCode::Char('p') => {
            state.session.pause();
            Action::None
        }
        KeyCode::Char('r') => {
            state.session.resume();
            Action::None
        }
        KeyCode::Char('x') => {
            state.session.reset();
            Action::None
        }
        // Dropping the lab drops its runtime, which kills any pending tick.
        KeyCode::Char('q') | KeyCode::Esc => Action::Transition(super::Screen::Menu(
            crate::ui::screens::menu::MenuState::new(),
        )),
        _ => Action::None,
    }
}

pub fn draw(f: &mut Frame, state: &LabState) {
    let view = state.session.view();
    let area = f.size();
    f.render_widget(Block::default().style(Theme::base()), area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(12),
            Constraint::Length(8),
            Constraint::Length(1),
        ])
        .split(area);

    f.render_widget(widgets::header(view), rows[0]);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);

    widgets::fit_chart(f, charts[0], view);
    widgets::loss_chart(f, charts[1], view);

    f.render_widget(widgets::logs(view, 6), rows[2]);
    f.render_widget(widgets::hints(), rows[3]);
}
