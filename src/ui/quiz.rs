use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::models::Puzzle;

use super::notice_line;

const WARNING_SECONDS: u32 = 10;
const CRITICAL_SECONDS: u32 = 5;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(puzzle) = app.session().current_puzzle() else {
        return;
    };

    let show_explanation =
        app.session().attempt().explanation_visible() && puzzle.has_explanation();
    let chunks = create_layout(area, show_explanation);

    render_status(frame, chunks[0], app);
    render_question_text(frame, chunks[1], &puzzle.question);
    render_options(frame, chunks[2], puzzle, app);

    let notice_chunk = if show_explanation {
        render_explanation(frame, chunks[3], puzzle.explanation.as_deref().unwrap_or(""));
        chunks[4]
    } else {
        chunks[3]
    };
    frame.render_widget(
        Paragraph::new(notice_line(app.notice())).alignment(Alignment::Center),
        notice_chunk,
    );

    let controls_chunk = if show_explanation { chunks[5] } else { chunks[4] };
    render_controls(frame, controls_chunk, app);
}

fn create_layout(area: Rect, show_explanation: bool) -> std::rc::Rc<[Rect]> {
    if show_explanation {
        Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(4),
            Constraint::Fill(1),
            Constraint::Length(5),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .margin(1)
        .split(area)
    } else {
        Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(4),
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .margin(2)
        .split(area)
    }
}

fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let session = app.session();
    let [text_row, gauge_row] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(area);
    let [level_area, timer_area, score_area] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
    ])
    .areas(text_row);

    let level = format!(
        "Level {} of {}",
        session.current_level() + 1,
        session.total_levels()
    );
    frame.render_widget(Paragraph::new(level).fg(Color::DarkGray), level_area);

    let remaining = session.attempt().time_remaining();
    let timer = Paragraph::new(format!("{remaining}s"))
        .alignment(Alignment::Center)
        .fg(timer_color(remaining))
        .bold();
    frame.render_widget(timer, timer_area);

    let score = Paragraph::new(format!("Score: {}", session.score()))
        .alignment(Alignment::Right)
        .fg(Color::Cyan);
    frame.render_widget(score, score_area);

    let [progress_area, time_area] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)])
            .spacing(2)
            .areas(gauge_row);
    let progress = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(ratio(session.current_level() + 1, session.total_levels()))
        .label("");
    frame.render_widget(progress, progress_area);

    let seconds = session.rules().question_seconds;
    let time = Gauge::default()
        .gauge_style(Style::default().fg(timer_color(remaining)))
        .ratio(ratio(remaining as usize, seconds as usize))
        .label("");
    frame.render_widget(time, time_area);
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (part as f64 / whole as f64).clamp(0.0, 1.0)
    }
}

fn timer_color(remaining: u32) -> Color {
    match remaining {
        0..=CRITICAL_SECONDS => Color::Red,
        r if r <= WARNING_SECONDS => Color::Yellow,
        _ => Color::Green,
    }
}

fn render_question_text(frame: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .fg(Color::White)
        .bold();
    frame.render_widget(widget, area);
}

fn render_options(frame: &mut Frame, area: Rect, puzzle: &Puzzle, app: &App) {
    let attempt = app.session().attempt();
    let answered = attempt.is_answered();
    let mut lines: Vec<Line> = Vec::with_capacity(puzzle.options.len() * 2);

    for (index, option) in puzzle.options.iter().enumerate() {
        let is_highlighted = !answered && index == app.highlighted();
        let is_selected = attempt.selected() == Some(index);
        let style = if !answered {
            if is_highlighted {
                Style::default().fg(Color::Cyan).bold()
            } else {
                Style::default().fg(Color::Gray)
            }
        } else if index == puzzle.correct_answer {
            Style::default().fg(Color::Green).bold()
        } else if is_selected {
            Style::default().fg(Color::Red).bold()
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let marker = if is_highlighted || is_selected { ">" } else { " " };

        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", marker), style),
            Span::styled(format!("{}. ", Puzzle::option_label(index)), style),
            Span::styled(option.as_str(), style),
        ]));
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_explanation(frame: &mut Frame, area: Rect, explanation: &str) {
    let widget = Paragraph::new(explanation)
        .wrap(Wrap { trim: true })
        .fg(Color::Yellow)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Color::DarkGray)
                .title(" Explanation ")
                .title_style(Style::default().fg(Color::Cyan))
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect, app: &App) {
    let session = app.session();
    let hint = if session.awaiting_advance() {
        if session.current_level() + 1 == session.total_levels() {
            "enter finish  ·  esc start over"
        } else {
            "enter next level  ·  esc start over"
        }
    } else if session.attempt().is_answered() {
        "esc start over  ·  ctrl-c quit"
    } else {
        "a-z answer  ·  j/k navigate  ·  enter select  ·  esc start over"
    };

    let widget = Paragraph::new(hint)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
