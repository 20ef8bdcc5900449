use std::f64::consts::PI;

use ratatui::prelude::*;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Context, Line as CanvasLine};
use ratatui::widgets::{Block, Cell, Clear, Paragraph, Row, Table, Wrap};

use crate::output::format_score;
use crate::scoring::{ScoreResult, AXIS_LABELS, SCORE_MAX};
use crate::tui::app::{App, Field, FlashKind, InputMode};
use crate::tui::theme::ThemeColors;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Handle very small terminal sizes gracefully
    if area.height < 14 || area.width < 60 {
        let msg = Paragraph::new("Terminal too small")
            .alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Layout: Title(1) + Body(fill) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1),  // Title bar
        Constraint::Fill(1),    // Form and chart
        Constraint::Length(1),  // Status bar
    ])
    .split(area);

    render_title(frame, chunks[0], app);

    let body = Layout::horizontal([
        Constraint::Length(36), // Form
        Constraint::Fill(1),    // Chart and diagnosis
    ])
    .split(chunks[1]);

    render_form(frame, body[0], app);

    let right = Layout::vertical([
        Constraint::Fill(1),    // Radar
        Constraint::Length(6),  // Diagnosis
    ])
    .split(body[1]);

    render_radar(frame, right[0], app);
    render_diagnosis(frame, right[1], app);
    render_status_bar(frame, chunks[2], app);

    // Render overlays based on input mode
    match app.input_mode {
        InputMode::NameInput => render_name_popup(frame, app),
        InputMode::Help => render_help_popup(frame, &app.colors),
        InputMode::Breakdown => render_breakdown_popup(frame, app),
        InputMode::Normal => {}
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let colors = &app.colors;
    let mut spans = vec![Span::styled("Sunan Radar", Style::default().fg(colors.title_color).bold())];

    let who = app.display_name.as_deref().unwrap_or("anonymous");
    let right_text = format!("{} -> {}", who, app.store_description);
    let left_len = "Sunan Radar".len();
    let right_len = right_text.chars().count();
    let padding_len = (area.width as usize).saturating_sub(left_len + right_len);

    spans.push(Span::raw(" ".repeat(padding_len)));
    spans.push(Span::styled(right_text, Style::default().fg(colors.muted)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_form(frame: &mut Frame, area: Rect, app: &App) {
    let colors = &app.colors;

    let rows: Vec<Row> = Field::ALL
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let row = Row::new(vec![
                Cell::from(field.label()).style(Style::default().fg(colors.field_label)),
                Cell::from(field.display(&app.form)).style(colors.field_value),
            ]);
            if idx == app.selected && app.input_mode == InputMode::Normal {
                row.style(colors.field_selected)
            } else {
                row
            }
        })
        .collect();

    let widths = [
        Constraint::Length(20), // Label
        Constraint::Fill(1),    // Value
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["Input", "Value"])
                .style(colors.header_style)
                .bottom_margin(1),
        )
        .block(Block::bordered().title(" Self-assessment "));

    frame.render_widget(table, area);
}

/// Point on spoke `axis` at `score`, in canvas units (radius 1 = SCORE_MAX).
/// The first axis points straight up; the others follow clockwise.
fn radar_point(axis: usize, score: f64) -> (f64, f64) {
    let angle = PI / 2.0 - axis as f64 * 2.0 * PI / AXIS_LABELS.len() as f64;
    let r = (score / SCORE_MAX).clamp(0.0, 1.0);
    (r * angle.cos(), r * angle.sin())
}

/// Closed polygon through one value per axis.
fn draw_polygon(ctx: &mut Context, values: [f64; 3], color: Color) {
    for i in 0..values.len() {
        let j = (i + 1) % values.len();
        let (x1, y1) = radar_point(i, values[i]);
        let (x2, y2) = radar_point(j, values[j]);
        ctx.draw(&CanvasLine { x1, y1, x2, y2, color });
    }
}

fn render_radar(frame: &mut Frame, area: Rect, app: &App) {
    let colors = app.colors.clone();
    let threshold = app.engine.config().threshold;
    let result: Option<ScoreResult> = app.session.last_result().cloned();

    let canvas = Canvas::default()
        .block(Block::bordered().title(" Radar "))
        .marker(Marker::Braille)
        .x_bounds([-1.5, 1.5])
        .y_bounds([-1.3, 1.3])
        .paint(move |ctx| {
            // Grid rings and spokes
            for ring in [25.0, 50.0, 75.0, 100.0] {
                draw_polygon(ctx, [ring; 3], colors.radar_grid);
            }
            for axis in 0..AXIS_LABELS.len() {
                let (x2, y2) = radar_point(axis, SCORE_MAX);
                ctx.draw(&CanvasLine {
                    x1: 0.0,
                    y1: 0.0,
                    x2,
                    y2,
                    color: colors.radar_grid,
                });
            }
            draw_polygon(ctx, [threshold; 3], colors.radar_threshold);

            ctx.layer();
            if let Some(ref result) = result {
                let values = [result.effectiveness, result.immunity, result.cohesion];
                draw_polygon(ctx, values, colors.radar_shape);
            }

            for (axis, label) in AXIS_LABELS.iter().enumerate() {
                let (x, y) = radar_point(axis, SCORE_MAX * 1.12);
                let text = match result {
                    Some(ref r) => format!("{} {}", label, format_score(r.axes()[axis].1)),
                    None => label.to_string(),
                };
                // Shift left-hand labels so they end near the spoke tip
                let x = if x < -0.1 { x - text.len() as f64 * 0.04 } else { x - 0.15 };
                ctx.print(x, y, Span::styled(text, Style::default().fg(colors.radar_label)));
            }
        });

    frame.render_widget(canvas, area);
}

fn render_diagnosis(frame: &mut Frame, area: Rect, app: &App) {
    let colors = &app.colors;
    let threshold = app.engine.config().threshold;
    let block = Block::bordered().title(" Diagnosis ");

    let lines: Vec<Line> = match app.session.last_result() {
        None => vec![Line::from(Span::styled(
            "Adjust the form and press Enter to compute.",
            Style::default().fg(colors.muted),
        ))],
        Some(result) => {
            let weakest = result
                .axes()
                .iter()
                .map(|(_, score)| *score)
                .fold(SCORE_MAX, f64::min);
            let headline_color = colors.score_color(weakest, threshold);

            let mut lines = vec![Line::from(Span::styled(
                result.diagnosis_text(),
                Style::default().fg(headline_color).bold(),
            ))];
            for action in &result.actions {
                lines.push(Line::from(format!("- {}", action)));
            }
            if app.session.is_saved() {
                lines.push(Line::from(Span::styled("(saved)", Style::default().fg(colors.muted))));
            }
            lines
        }
    };

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(block),
        area,
    );
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let colors = &app.colors;

    let text = if let Some((ref msg, kind, _)) = app.flash_message {
        let msg_color = match kind {
            FlashKind::Success => colors.flash_success,
            FlashKind::Error => colors.flash_error,
            FlashKind::Info => colors.flash_info,
        };
        Line::from(Span::styled(msg.clone(), Style::default().fg(msg_color)))
    } else {
        let mut spans = Vec::new();

        if app.is_saving {
            let spinner_chars = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
            let spinner = spinner_chars[app.spinner_frame % 10];
            spans.push(Span::styled(
                format!("{} saving...  ", spinner),
                Style::default().fg(colors.status_key_color),
            ));
        }

        let hints = [
            ("j", "/", "k", ":field "),
            ("h", "/", "l", ":adjust "),
            ("Enter", "", "", ":compute "),
            ("s", "", "", ":save "),
            ("b", "", "", ":breakdown "),
            ("?", "", "", ":help "),
            ("q", "", "", ":quit"),
        ];

        for (i, (key1, sep, key2, label)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(*key1, Style::default().fg(colors.status_key_color)));
            if !sep.is_empty() {
                spans.push(Span::raw(*sep));
                spans.push(Span::styled(*key2, Style::default().fg(colors.status_key_color)));
            }
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(colors.status_bar_bg)),
        area
    );
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    // Clamp dimensions to area bounds
    let width = width.min(area.width);
    let height = height.min(area.height);

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Render the display name prompt shown before the first save
fn render_name_popup(frame: &mut Frame, app: &App) {
    let colors = &app.colors;
    let popup_area = centered_rect_fixed(46, 5, frame.area());

    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(" Display name ", colors.popup_title))
        .border_style(Style::default().fg(colors.popup_border))
        .style(Style::default().bg(colors.popup_bg));
    frame.render_widget(block.clone(), popup_area);

    let inner = block.inner(popup_area);
    let chunks = Layout::vertical([
        Constraint::Length(1),  // Input line
        Constraint::Length(1),  // Help text
    ])
    .split(inner);

    let input = Paragraph::new(format!("{}|", app.name_input));
    frame.render_widget(input, chunks[0]);

    let help = Paragraph::new("Enter: save | Esc: cancel")
        .style(Style::default().fg(colors.muted));
    frame.render_widget(help, chunks[1]);
}

/// Render the help overlay popup
fn render_help_popup(frame: &mut Frame, colors: &ThemeColors) {
    let popup_area = centered_rect_fixed(50, 15, frame.area());

    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(" Keyboard Shortcuts ", colors.popup_title))
        .border_style(Style::default().fg(colors.popup_border))
        .style(Style::default().bg(colors.popup_bg));
    frame.render_widget(block.clone(), popup_area);

    let inner = block.inner(popup_area);
    let key_style = Style::default().fg(colors.status_key_color).bold();

    let entries = [
        ("j / Down      ", "Next field"),
        ("k / Up        ", "Previous field"),
        ("l / Right     ", "Increase value (L: x10)"),
        ("h / Left      ", "Decrease value (H: x10)"),
        ("Space         ", "Toggle team work"),
        ("Enter         ", "Compute scores"),
        ("s             ", "Save result to history"),
        ("b             ", "Score breakdown"),
        ("r             ", "Reset form"),
        ("?             ", "Show/hide this help"),
        ("q / Ctrl-c    ", "Quit"),
    ];

    let mut help_lines: Vec<Line> = entries
        .iter()
        .map(|(key, desc)| Line::from(vec![Span::styled(*key, key_style), Span::raw(*desc)]))
        .collect();
    help_lines.push(Line::from(""));
    help_lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(colors.muted),
    )));

    frame.render_widget(Paragraph::new(help_lines), inner);
}

/// Render the intermediate values behind the last result
fn render_breakdown_popup(frame: &mut Frame, app: &App) {
    let Some(analysis) = app.session.last() else {
        return;
    };
    let colors = &app.colors;
    let breakdown = app.engine.explain(&analysis.input);
    let result = &analysis.result;
    let threshold = app.engine.config().threshold;

    let popup_area = centered_rect_fixed(52, 16, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(" Score Breakdown ", colors.popup_title))
        .border_style(Style::default().fg(colors.popup_border))
        .style(Style::default().bg(colors.popup_bg));
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let row = |name: &str, value: f64| {
        Line::from(vec![
            Span::styled(format!("  {:<18}", name), Style::default().fg(colors.muted)),
            Span::raw(format_score(value)),
        ])
    };
    let score_row = |name: &str, value: f64| {
        Line::from(vec![
            Span::styled(format!("{:<20}", name), colors.header_style),
            Span::styled(
                format_score(value),
                Style::default().fg(colors.score_color(value, threshold)).bold(),
            ),
        ])
    };

    let lines = vec![
        score_row("Effectiveness", result.effectiveness),
        row("raw points", breakdown.raw_points),
        row("quality factor", breakdown.quality_factor),
        row("gained", breakdown.gained),
        row("time tax", breakdown.time_tax),
        score_row("Immunity", result.immunity),
        row("engagement", breakdown.engagement_total),
        row("independence", breakdown.independence_ratio),
        score_row("Cohesion", result.cohesion),
        row("team multiplier", breakdown.team_multiplier),
        Line::from(""),
        Line::from(Span::styled(
            format!("Computed {}", analysis.computed_at.format("%H:%M:%S")),
            Style::default().fg(colors.muted),
        )),
        Line::from(Span::styled("Esc/b to close", Style::default().fg(colors.muted))),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
}
