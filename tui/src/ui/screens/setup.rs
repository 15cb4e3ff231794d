use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::config::{builder, json, model::LabDraft};
use crate::state::session::SessionState;
use crate::ui::theme::Theme;

use super::{Action, Screen};

const DRAFT_PATH: &str = "lab.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Epochs,
    TrueWeight,
    TrueBias,
    LearningRate,
}

impl Step {
    fn back(self) -> Option<Self> {
        match self {
            Step::Epochs => None,
            Step::TrueWeight => Some(Step::Epochs),
            Step::TrueBias => Some(Step::TrueWeight),
            Step::LearningRate => Some(Step::TrueBias),
        }
    }
}

pub struct SetupState {
    step: Step,
    draft: LabDraft,
    epochs: String,
    true_weight: String,
    true_bias: String,
    learning_rate: String,
    pub error: Option<String>,
}

impl SetupState {
    /// Starts the wizard, pre-filling defaults from ./lab.json when present.
    pub fn new() -> Self {
        let draft = json::load_draft(DRAFT_PATH).unwrap_or_default();
        Self {
            step: Step::Epochs,
            draft,
            epochs: String::new(),
            true_weight: String::new(),
            true_bias: String::new(),
            learning_rate: String::new(),
            error: None,
        }
    }

    fn field_mut(&mut self) -> &mut String {
        match self.step {
            Step::Epochs => &mut self.epochs,
            Step::TrueWeight => &mut self.true_weight,
            Step::TrueBias => &mut self.true_bias,
            Step::LearningRate => &mut self.learning_rate,
        }
    }
}

pub fn handle_key(state: &mut SetupState, key: KeyCode) -> Action {
    state.error = None;

    match key {
        KeyCode::Char(c) => {
            state.field_mut().push(c);
            Action::None
        }
        KeyCode::Backspace => {
            state.field_mut().pop();
            Action::None
        }
        KeyCode::Enter => confirm(state),
        KeyCode::Esc => match state.step.back() {
            Some(prev) => {
                state.step = prev;
                Action::None
            }
            None => Action::Transition(Screen::Menu(super::menu::MenuState::new())),
        },
        _ => Action::None,
    }
}

fn confirm(state: &mut SetupState) -> Action {
    let parsed = match state.step {
        Step::Epochs => parse_or(&state.epochs, state.draft.epochs).map(|v| {
            state.draft.epochs = v;
        }),
        Step::TrueWeight => parse_or(&state.true_weight, state.draft.true_weight).map(|v| {
            state.draft.true_weight = v;
        }),
        Step::TrueBias => parse_or(&state.true_bias, state.draft.true_bias).map(|v| {
            state.draft.true_bias = v;
        }),
        Step::LearningRate => parse_or(&state.learning_rate, state.draft.learning_rate).map(|v| {
            state.draft.learning_rate = v;
        }),
    };

    if let Err(e) = parsed {
        state.error = Some(e);
        return Action::None;
    }

    match state.step {
        Step::Epochs => state.step = Step::TrueWeight,
        Step::TrueWeight => state.step = Step::TrueBias,
        Step::TrueBias => state.step = Step::LearningRate,
        Step::LearningRate => return try_build(state),
    }
    Action::None
}

fn parse_or<T: std::str::FromStr>(input: &str, default: T) -> Result<T, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(default);
    }
    trimmed
        .parse()
        .map_err(|_| format!("cannot parse '{trimmed}' as a number"))
}

fn try_build(state: &mut SetupState) -> Action {
    let config = match builder::build(&state.draft) {
        Ok(c) => c,
        Err(reason) => {
            state.error = Some(reason);
            return Action::None;
        }
    };

    match SessionState::new(config) {
        Ok(session) => Action::Transition(Screen::Lab(super::lab::LabState::new(session))),
        Err(e) => {
            state.error = Some(format!("cannot start runtime: {e}"));
            Action::None
        }
    }
}

pub fn draw(f: &mut Frame, state: &SetupState) {
    let area = f.size();
    f.render_widget(Block::default().style(Theme::base()), area);

    let (title, label, current, default, step_label) = match state.step {
        Step::Epochs => (
            "Training Length",
            "epochs",
            &state.epochs,
            state.draft.epochs.to_string(),
            "Step 1 of 4",
        ),
        Step::TrueWeight => (
            "True Line",
            "true weight (slope)",
            &state.true_weight,
            state.draft.true_weight.to_string(),
            "Step 2 of 4",
        ),
        Step::TrueBias => (
            "True Line",
            "true bias (intercept)",
            &state.true_bias,
            state.draft.true_bias.to_string(),
            "Step 3 of 4",
        ),
        Step::LearningRate => (
            "Optimizer",
            "learning rate",
            &state.learning_rate,
            state.draft.learning_rate.to_string(),
            "Step 4 of 4",
        ),
    };

    draw_field_input(f, area, title, label, current, &default, step_label);
    draw_settings_note(f, area, &state.draft);

    if let Some(err) = &state.error {
        draw_error_bar(f, area, err);
    }
}

fn draw_field_input(
    f: &mut Frame,
    area: Rect,
    title: &str,
    label: &str,
    current: &str,
    default: &str,
    step_label: &str,
) {
    let outer = centered_rect(55, 70, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(1), // step label
            Constraint::Length(2), // spacer
            Constraint::Length(3), // input box
            Constraint::Length(1), // spacer
            Constraint::Length(1), // default note
            Constraint::Min(0),    // spacer
            Constraint::Length(4), // keybinds
        ])
        .split(outer);

    f.render_widget(
        Paragraph::new(Span::styled(
            title,
            Theme::title().add_modifier(Modifier::BOLD),
        )),
        chunks[0],
    );

    f.render_widget(
        Paragraph::new(Span::styled(step_label, Theme::dim())),
        chunks[1],
    );

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border())
        .title(format!(" {label} "))
        .title_style(Theme::title());

    let inner = input_block.inner(chunks[3]);
    f.render_widget(input_block, chunks[3]);

    let display = if current.is_empty() {
        Line::from(vec![
            Span::styled(default, Theme::muted()),
            Span::styled("█", Theme::accent_cyan()),
        ])
    } else {
        Line::from(vec![
            Span::styled(current, Theme::ok()),
            Span::styled("█", Theme::accent_cyan()),
        ])
    };

    f.render_widget(Paragraph::new(display), inner);

    f.render_widget(
        Paragraph::new(Span::styled(
            format!("leave empty to use {default}"),
            Theme::dim(),
        )),
        chunks[5],
    );

    render_hints(f, chunks[7], &[("enter", "confirm"), ("esc", "back")]);
}

fn draw_settings_note(f: &mut Frame, area: Rect, draft: &LabDraft) {
    let bar = Rect {
        x: area.x + 1,
        y: area.y + area.height.saturating_sub(2),
        width: area.width.saturating_sub(2),
        height: 1,
    };

    let seed = match draft.seed {
        Some(s) => s.to_string(),
        None => "os".into(),
    };
    f.render_widget(
        Paragraph::new(Span::styled(
            format!(
                "sample: {} points  |  delay: {} ms  |  seed: {seed}",
                draft.sample_size, draft.epoch_delay_ms
            ),
            Theme::muted(),
        ))
        .alignment(Alignment::Center),
        bar,
    );
}

fn draw_error_bar(f: &mut Frame, area: Rect, msg: &str) {
    let bar = Rect {
        x: area.x + 1,
        y: area.y + area.height - 1,
        width: area.width.saturating_sub(2),
        height: 1,
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(" ✖ ", Theme::error()),
            Span::styled(msg, Theme::error()),
        ])),
        bar,
    );
}

fn render_hints(f: &mut Frame, area: Rect, hints: &[(&str, &str)]) {
    let key_col_width = hints
        .iter()
        .map(|(k, _)| k.len() as u16 + 2)
        .max()
        .unwrap_or(8)
        + 2;

    let outer = centered_rect(40, 100, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            hints
                .iter()
                .map(|_| Constraint::Length(1))
                .chain(std::iter::once(Constraint::Min(0)))
                .collect::<Vec<_>>(),
        )
        .split(outer);

    for (i, (key, action)) in hints.iter().enumerate() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(key_col_width), Constraint::Min(0)])
            .split(rows[i]);

        f.render_widget(
            Paragraph::new(Span::styled(format!("[{key}]"), Theme::accent_cyan())),
            cols[0],
        );
        f.render_widget(Paragraph::new(Span::styled(*action, Theme::dim())), cols[1]);
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vert[1])[1]
}
