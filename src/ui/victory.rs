use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::app::App;
use crate::engine::Grade;

use super::notice_line;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let summary = app.session().summary();
    let grade = summary.grade();
    let grade_color = grade_color(grade);

    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(12),
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .split(area);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "ALL PUZZLES SOLVED",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            grade.headline(),
            Style::default().fg(grade_color).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("{} / {} points", summary.score, summary.max_score),
            Style::default().fg(Color::White).bold(),
        )),
        Line::from(Span::styled(
            format!("{}% accuracy", summary.accuracy_percentage),
            Style::default().fg(grade_color),
        )),
        Line::from(Span::styled(
            format!("{} levels", summary.total_levels),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, chunks[1]);

    frame.render_widget(
        Paragraph::new(notice_line(app.notice())).alignment(Alignment::Center),
        chunks[2],
    );
    render_controls(frame, chunks[3], app.score_saved());
}

fn grade_color(grade: Grade) -> Color {
    match grade {
        Grade::Perfect | Grade::Excellent => Color::Green,
        Grade::Great => Color::Cyan,
        Grade::Good => Color::Yellow,
        Grade::KeepPracticing => Color::Red,
    }
}

fn render_controls(frame: &mut Frame, area: Rect, score_saved: bool) {
    let hint = if score_saved {
        "l leaderboard  ·  r play again  ·  q quit"
    } else {
        "s save score  ·  l leaderboard  ·  r play again  ·  q quit"
    };
    let widget = Paragraph::new(hint)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
