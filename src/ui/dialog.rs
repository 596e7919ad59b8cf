//! Modal dialogs drawn over the current screen.

use ratatui::{
    layout::Flex,
    prelude::*,
    widgets::{Block, Borders, Clear, Padding, Paragraph},
};

use crate::app::{LeaderboardView, SaveScoreForm};
use crate::models::LeaderboardEntry;

const NAME_COLUMN_WIDTH: usize = 20;

pub fn render_save_score(frame: &mut Frame, area: Rect, form: &SaveScoreForm, submitting: bool) {
    let popup = centered(area, 50, 9);

    let mut content = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("Your name: ", Style::default().fg(Color::White)),
            Span::styled(form.input(), Style::default().fg(Color::Yellow)),
            Span::styled("_", Style::default().fg(Color::Yellow)),
        ]),
        Line::from(""),
    ];

    if submitting {
        content.push(Line::from(Span::styled(
            "Saving...",
            Style::default().fg(Color::Cyan),
        )));
    } else if let Some(err) = form.error() {
        content.push(Line::from(Span::styled(
            err.to_string(),
            Style::default().fg(Color::Red),
        )));
    } else {
        content.push(Line::from(""));
    }

    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "[Enter] save  ·  [Esc] cancel",
        Style::default().fg(Color::DarkGray),
    )));

    let widget = Paragraph::new(content)
        .alignment(Alignment::Center)
        .block(dialog_block(" Save Your Score "));
    frame.render_widget(Clear, popup);
    frame.render_widget(widget, popup);
}

pub fn render_leaderboard(frame: &mut Frame, area: Rect, view: &LeaderboardView) {
    let popup = centered(area, 64, 18);

    let mut lines: Vec<Line> = Vec::new();
    if view.is_loading() {
        lines.push(Line::from(Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow),
        )));
    } else if view.entries().is_empty() {
        lines.push(Line::from(Span::styled(
            "No scores yet. Be the first!",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        lines.extend(
            view.entries()
                .iter()
                .enumerate()
                .map(|(rank, entry)| entry_line(rank, entry)),
        );
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[Esc] close",
        Style::default().fg(Color::DarkGray),
    )));

    let widget = Paragraph::new(lines).block(dialog_block(" Global Leaderboard "));
    frame.render_widget(Clear, popup);
    frame.render_widget(widget, popup);
}

fn entry_line(rank: usize, entry: &LeaderboardEntry) -> Line<'static> {
    let rank_color = match rank {
        0 => Color::Yellow,
        1 => Color::White,
        2 => Color::LightRed,
        _ => Color::DarkGray,
    };

    Line::from(vec![
        Span::styled(
            format!("{:>2}. ", rank + 1),
            Style::default().fg(rank_color).bold(),
        ),
        Span::styled(
            format!(
                "{:<width$} ",
                truncate_name(&entry.player_name),
                width = NAME_COLUMN_WIDTH
            ),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("{:>5} pts ", entry.score),
            Style::default().fg(Color::Green),
        ),
        Span::styled(
            format!("{:>3}% ", entry.completion_percentage),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            entry.completed_at.date().to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

fn truncate_name(name: &str) -> String {
    if name.chars().count() > NAME_COLUMN_WIDTH {
        let truncated: String = name.chars().take(NAME_COLUMN_WIDTH - 3).collect();
        format!("{}...", truncated)
    } else {
        name.to_string()
    }
}

fn dialog_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title)
        .title_style(Style::default().fg(Color::Cyan).bold())
        .padding(Padding::horizontal(1))
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [popup] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    popup
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("Ada"), "Ada");
        let long = "abcdefghijklmnopqrstuvwxyz";
        assert_eq!(truncate_name(long), "abcdefghijklmnopq...");
        assert_eq!(truncate_name(long).chars().count(), NAME_COLUMN_WIDTH);
    }

    #[test]
    fn test_centered_fits_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered(area, 50, 10);
        assert_eq!(popup, Rect::new(25, 15, 50, 10));

        let small = Rect::new(0, 0, 30, 5);
        let popup = centered(small, 50, 10);
        assert!(popup.width <= 30 && popup.height <= 5);
    }
}
