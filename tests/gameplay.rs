use std::sync::Arc;

use brain_teaser::app::{App, Overlay};
use brain_teaser::engine::{Effect, Phase, Rules, Session};
use brain_teaser::leaderboard::{LeaderboardGateway, MemoryLeaderboard};
use brain_teaser::models::{Catalog, Puzzle};

fn two_puzzle_catalog() -> Arc<Catalog> {
    let puzzles = vec![
        Puzzle::new(
            "What has keys but can't open locks?",
            vec!["A map".into(), "A piano".into(), "A door".into()],
            1,
            Some("A piano has musical keys.".into()),
        ),
        Puzzle::new(
            "What gets wetter the more it dries?",
            vec!["A towel".into(), "A sponge".into()],
            0,
            None,
        ),
    ];
    Arc::new(Catalog::new(puzzles).unwrap())
}

fn expire(session: &mut Session) -> Vec<Effect> {
    let mut effects = Vec::new();
    for _ in 0..session.rules().question_seconds {
        effects.extend(session.tick());
    }
    effects
}

#[test]
fn test_two_correct_answers_reach_perfect_victory() {
    let mut session = Session::new(two_puzzle_catalog(), Rules::default());
    session.start().unwrap();

    session.select_answer(1).unwrap();
    session.advance().unwrap();
    session.select_answer(0).unwrap();
    let effects = session.advance().unwrap();

    assert_eq!(session.phase(), Phase::Victory);
    assert_eq!(session.score(), 20);
    match effects.as_slice() {
        [Effect::Victory(summary)] => {
            assert_eq!(summary.score, 20);
            assert_eq!(summary.max_score, 20);
            assert_eq!(summary.accuracy_percentage, 100);
        }
        other => panic!("expected victory, got {other:?}"),
    }
}

#[test]
fn test_timed_out_question_freezes_run_at_half_accuracy() {
    let mut session = Session::new(two_puzzle_catalog(), Rules::default());
    session.start().unwrap();

    session.select_answer(1).unwrap();
    session.advance().unwrap();

    let effects = expire(&mut session);
    assert!(matches!(
        effects.as_slice(),
        [Effect::AnswerResolved { verdict, points: 0 }] if verdict.timed_out && !verdict.is_correct
    ));
    assert_eq!(session.attempt().time_remaining(), 0);

    // Frozen: a late answer and further ticks change nothing.
    assert!(session.select_answer(0).unwrap().is_empty());
    assert!(session.tick().is_empty());
    assert!(session.advance().is_err());

    let summary = session.summary();
    assert_eq!(summary.score, 10);
    assert_eq!(summary.accuracy_percentage, 50);
    assert_eq!(session.phase(), Phase::Playing);
}

#[test]
fn test_timeout_on_first_level_blocks_advance_until_reset() {
    let mut session = Session::new(two_puzzle_catalog(), Rules::default());
    session.start().unwrap();

    let effects = expire(&mut session);
    assert_eq!(effects.len(), 1);
    assert_eq!(session.score(), 0);
    assert!(!session.awaiting_advance());
    assert!(!session.attempt().explanation_visible());
    assert!(session.advance().is_err());

    assert_eq!(session.play_again(), vec![Effect::Reset]);
    assert_eq!(session.phase(), Phase::Welcome);
    session.start().unwrap();
    assert_eq!(session.current_level(), 0);
    assert_eq!(session.attempt().time_remaining(), 30);
}

#[tokio::test]
async fn test_finished_run_lands_on_leaderboard() {
    let store = MemoryLeaderboard::new();
    let session = Session::new(two_puzzle_catalog(), Rules::default());
    let (mut app, mut events) = App::new(session, Arc::new(store.clone()), 10);

    app.start();
    app.select_answer(1);
    app.advance_level();
    app.select_answer(1);
    assert!(app.advance_level().is_empty());
    app.play_again();

    app.start();
    app.select_answer(1);
    app.advance_level();
    app.select_answer(0);
    app.advance_level();
    assert_eq!(app.session().phase(), Phase::Victory);

    app.save_score("  Ada  ").unwrap();
    let event = events.recv().await.unwrap();
    app.handle_event(event);
    assert!(app.score_saved());

    app.open_leaderboard();
    let event = events.recv().await.unwrap();
    app.handle_event(event);
    match app.overlay() {
        Overlay::Leaderboard(view) => {
            assert_eq!(view.entries().len(), 1);
            let entry = &view.entries()[0];
            assert_eq!(entry.player_name, "Ada");
            assert_eq!(entry.score, 20);
            assert_eq!(entry.total_levels, 2);
            assert_eq!(entry.completion_percentage, 100);
        }
        _ => panic!("leaderboard should be open"),
    }

    let top = store.fetch_top(10).await.unwrap();
    assert_eq!(top.len(), 1);
}
