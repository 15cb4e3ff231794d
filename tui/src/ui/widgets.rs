use ratatui::{
    layout::{Alignment, Rect},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap},
    Frame,
};

use crate::state::model::{LabView, PhaseView};
use crate::ui::theme::Theme;

pub fn header<'a>(view: &'a LabView) -> Paragraph<'a> {
    let phase = match view.phase {
        PhaseView::Idle => "IDLE",
        PhaseView::Running => "RUNNING",
        PhaseView::Paused => "PAUSED",
        PhaseView::Finished => "FINISHED",
    };

    let line1 = Line::from(vec![
        Span::styled("Gradient Descent Lab", Theme::title()),
        Span::raw("  |  "),
        Span::raw(format!("Session: {phase}")),
        Span::raw("  |  "),
        Span::raw(format!("Epoch: {} / {}", view.epoch, view.target_epochs)),
    ]);

    let fit = match view.model {
        Some((w, b)) => format!("y = {w:.4}x + {b:.4}"),
        None => "y = ?".into(),
    };
    let truth = match view.true_line {
        Some((w, b)) => format!("y = {w}x + {b}"),
        None => "-".into(),
    };
    let loss = match view.loss {
        Some(l) => format!("{l:.6}"),
        None => "-".into(),
    };

    let line2 = Line::from(Span::raw(format!(
        "Fit: {fit}  |  True: {truth}  |  Loss: {loss}  |  lr: {}",
        view.learning_rate
    )));

    Paragraph::new(vec![line1, line2])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .title(" Overview "),
        )
        .wrap(Wrap { trim: true })
}

/// Scatter of the sample with the fitted and true lines over it.
pub fn fit_chart(f: &mut Frame, area: Rect, view: &LabView) {
    if view.points.is_empty() {
        let msg = Paragraph::new("Waiting for a sample...")
            .style(Theme::muted())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Theme::border())
                    .title(" Fit "),
            );
        f.render_widget(msg, area);
        return;
    }

    let max_x = view.points.last().map_or(5.0, |(x, _)| *x).max(1.0);

    // Y bounds follow the true line at the chart edges with a fixed margin,
    // keeping the scatter and both lines in frame regardless of slope sign.
    let (tw, tb) = view.true_line.unwrap_or((0.0, 0.0));
    let edge = tw * max_x + tb;
    let y_min = tb.min(edge) - 5.0;
    let y_max = tb.max(edge) + 5.0;

    let fitted: Vec<(f64, f64)> = view
        .model
        .map(|(w, b)| vec![(0.0, b), (max_x, w * max_x + b)])
        .unwrap_or_default();
    let truth: Vec<(f64, f64)> = view
        .true_line
        .map(|(w, b)| vec![(0.0, b), (max_x, w * max_x + b)])
        .unwrap_or_default();

    let mut datasets = vec![Dataset::default()
        .name("sample")
        .marker(symbols::Marker::Dot)
        .graph_type(GraphType::Scatter)
        .style(Theme::text())
        .data(&view.points)];

    if !truth.is_empty() {
        datasets.push(
            Dataset::default()
                .name("true")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Theme::accent_magenta())
                .data(&truth),
        );
    }
    if !fitted.is_empty() {
        datasets.push(
            Dataset::default()
                .name("fit")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Theme::accent_cyan())
                .data(&fitted),
        );
    }

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .title(" Fit "),
        )
        .x_axis(
            Axis::default()
                .style(Theme::dim())
                .bounds([0.0, max_x])
                .labels(vec![Span::raw("0"), Span::raw(format!("{max_x:.1}"))]),
        )
        .y_axis(
            Axis::default()
                .style(Theme::dim())
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format!("{y_min:.1}")),
                    Span::raw(format!("{y_max:.1}")),
                ]),
        );

    f.render_widget(chart, area);
}

/// Loss per epoch, from zero with headroom above the worst value.
pub fn loss_chart(f: &mut Frame, area: Rect, view: &LabView) {
    let data = &view.loss_history;

    if data.is_empty() {
        let msg = Paragraph::new("Waiting for training data...")
            .style(Theme::muted())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Theme::border())
                    .title(" Loss "),
            );
        f.render_widget(msg, area);
        return;
    }

    let max_loss = data
        .iter()
        .map(|(_, l)| *l)
        .fold(f64::NEG_INFINITY, f64::max);
    let max_epoch = data.last().map_or(1.0, |(e, _)| *e);
    let y_max = max_loss.max(0.1) * 1.15;

    let datasets = vec![Dataset::default()
        .name("loss")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Theme::text())
        .data(data)];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .title(" Loss "),
        )
        .x_axis(
            Axis::default()
                .style(Theme::dim())
                .bounds([0.0, max_epoch])
                .labels(vec![Span::raw("0"), Span::raw(format!("{max_epoch:.0}"))]),
        )
        .y_axis(
            Axis::default()
                .style(Theme::dim())
                .bounds([0.0, y_max])
                .labels(vec![Span::raw("0"), Span::raw(format!("{y_max:.3}"))]),
        );

    f.render_widget(chart, area);
}

pub fn logs<'a>(view: &'a LabView, rows: usize) -> Paragraph<'a> {
    let tail = view.logs.iter().rev().take(rows).rev();

    let lines = tail
        .map(|l| {
            let level_style = match l.level {
                "ERROR" => Theme::error(),
                _ => Theme::dim(),
            };
            Line::from(vec![
                Span::styled(format!("[{}] ", l.level), level_style),
                Span::styled(l.message.as_str(), Theme::text()),
            ])
        })
        .collect::<Vec<_>>();

    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .title(" Events "),
        )
        .wrap(Wrap { trim: true })
}

pub fn hints() -> Paragraph<'static> {
    Paragraph::new(Line::from(vec![
        Span::styled("s", Theme::dim()),
        Span::styled("  start    ", Theme::muted()),
        Span::styled("p", Theme::dim()),
        Span::styled("  pause    ", Theme::muted()),
        Span::styled("r", Theme::dim()),
        Span::styled("  resume    ", Theme::muted()),
        Span::styled("x", Theme::dim()),
        Span::styled("  reset    ", Theme::muted()),
        Span::styled("q", Theme::dim()),
        Span::styled("  menu", Theme::muted()),
    ]))
    .alignment(Alignment::Center)
}
