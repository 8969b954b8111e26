//! Pure view functions for the login screen.
//!
//! Reads `ScreenState` and `FormState`, draws to a ratatui Frame, and never
//! mutates anything.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use travorama_core::flow::FormState;

use crate::state::{Focus, ScreenState};

/// Width of the centered form column.
const FORM_WIDTH: u16 = 48;

/// Spinner frames for the submit button.
const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

const MASK_CHAR: char = '•';

const IDENTIFIER_LABEL: &str = "Email or phone number";
const SECRET_LABEL: &str = "Password";
const SUBMIT_LABEL: &str = "Log in";
const FORGOT_LABEL: &str = "Forgot password?";
const KEY_HINTS: &str = "Tab move · Ctrl+T show password · Esc quit";

pub fn render(screen: &ScreenState, form: &FormState, frame: &mut Frame) {
    let area = centered_column(frame.area(), FORM_WIDTH);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // title
            Constraint::Length(3), // identifier
            Constraint::Length(1), // identifier error
            Constraint::Length(3), // password
            Constraint::Length(1), // password error
            Constraint::Length(1), // spacer
            Constraint::Length(1), // submit
            Constraint::Length(1), // submission error
            Constraint::Length(1), // spacer
            Constraint::Length(1), // forgot password
            Constraint::Min(0),
            Constraint::Length(1), // hints
        ])
        .split(area);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "Travorama",
            Style::default().add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center),
        rows[0],
    );

    render_field(
        frame,
        rows[1],
        IDENTIFIER_LABEL,
        &form.identifier,
        screen.focus == Focus::Identifier,
    );
    render_error(frame, rows[2], form.identifier_error.as_deref());

    let secret = if form.is_secret_visible {
        form.secret.clone()
    } else {
        mask(&form.secret)
    };
    render_field(
        frame,
        rows[3],
        SECRET_LABEL,
        &secret,
        screen.focus == Focus::Secret,
    );
    render_error(frame, rows[4], form.secret_error.as_deref());

    render_submit(frame, rows[6], screen, form);
    render_error(frame, rows[7], form.submission_error.as_deref());

    let link_style = if screen.focus == Focus::ForgotLink {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::UNDERLINED | Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::UNDERLINED)
    };
    frame.render_widget(
        Paragraph::new(Span::styled(FORGOT_LABEL, link_style)).alignment(Alignment::Center),
        rows[9],
    );

    frame.render_widget(
        Paragraph::new(Span::styled(KEY_HINTS, Style::default().fg(Color::DarkGray)))
            .alignment(Alignment::Center),
        rows[11],
    );
}

fn render_field(frame: &mut Frame, area: Rect, label: &str, value: &str, focused: bool) {
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(label);

    let mut spans = vec![Span::raw(value.to_string())];
    if focused {
        spans.push(Span::styled("▏", Style::default().fg(Color::Yellow)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_error(frame: &mut Frame, area: Rect, message: Option<&str>) {
    if let Some(message) = message {
        frame.render_widget(
            Paragraph::new(Span::styled(message, Style::default().fg(Color::Red))),
            area,
        );
    }
}

fn render_submit(frame: &mut Frame, area: Rect, screen: &ScreenState, form: &FormState) {
    let label = if form.is_submitting() {
        let spinner = SPINNER_FRAMES[screen.spinner_frame % SPINNER_FRAMES.len()];
        format!("{spinner} Logging in…")
    } else {
        format!("[ {SUBMIT_LABEL} ]")
    };

    let style = if form.is_submitting() {
        Style::default().fg(Color::DarkGray)
    } else if screen.focus == Focus::Submit {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    frame.render_widget(
        Paragraph::new(Span::styled(label, style)).alignment(Alignment::Center),
        area,
    );
}

fn mask(secret: &str) -> String {
    std::iter::repeat_n(MASK_CHAR, secret.chars().count()).collect()
}

fn centered_column(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    }
}
