mod dialog;
mod quiz;
mod victory;
mod welcome;

use ratatui::{prelude::*, widgets::Block};

use crate::app::{App, Notice, Overlay};
use crate::engine::Phase;

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match app.session().phase() {
        Phase::Welcome => welcome::render(frame, area, app),
        Phase::Playing => quiz::render(frame, area, app),
        Phase::Victory => victory::render(frame, area, app),
    }

    match app.overlay() {
        Overlay::None => {}
        Overlay::SaveScore(form) => {
            dialog::render_save_score(frame, area, form, app.is_submitting())
        }
        Overlay::Leaderboard(view) => dialog::render_leaderboard(frame, area, view),
    }
}

fn notice_line(notice: Option<&Notice>) -> Line<'static> {
    match notice {
        Some(Notice::Success(text)) => Line::from(Span::styled(
            text.clone(),
            Style::default().fg(Color::Green).bold(),
        )),
        Some(Notice::Failure(text)) => Line::from(Span::styled(
            text.clone(),
            Style::default().fg(Color::Red).bold(),
        )),
        None => Line::from(""),
    }
}
