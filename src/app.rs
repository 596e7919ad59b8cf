//! Controller tying the session to the leaderboard and the dialogs on screen.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::engine::{Effect, InvalidTransition, Phase, Session};
use crate::leaderboard::{
    GatewayResult, LeaderboardGateway, PLAYER_NAME_MAX_LENGTH, ScoreSubmission, SubmissionError,
};
use crate::models::LeaderboardEntry;

const SAVE_FAILED_MESSAGE: &str = "Failed to save your score. Please try again.";

/// Completion of work that ran off the event loop.
#[derive(Debug)]
pub enum AppEvent {
    /// Outcome of a save started during run number `run`.
    ScoreSubmitted {
        run: u64,
        result: GatewayResult<LeaderboardEntry>,
    },
    LeaderboardLoaded {
        generation: u64,
        entries: Vec<LeaderboardEntry>,
    },
    LeaderboardChanged {
        generation: u64,
    },
}

/// One-line status shown under the current view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Failure(String),
}

#[derive(Debug, Default)]
pub struct SaveScoreForm {
    input: String,
    error: Option<String>,
}

impl SaveScoreForm {
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn push(&mut self, c: char) {
        if self.input.chars().count() < PLAYER_NAME_MAX_LENGTH {
            self.input.push(c);
        }
        self.error = None;
    }

    fn pop(&mut self) {
        self.input.pop();
        self.error = None;
    }
}

/// Open leaderboard dialog. Dropping it releases the change subscription.
pub struct LeaderboardView {
    generation: u64,
    entries: Vec<LeaderboardEntry>,
    loading: bool,
    watcher: JoinHandle<()>,
}

impl LeaderboardView {
    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

impl Drop for LeaderboardView {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}

pub enum Overlay {
    None,
    SaveScore(SaveScoreForm),
    Leaderboard(LeaderboardView),
}

#[derive(Debug, Error)]
pub enum SaveScoreError {
    #[error("the run is not finished yet")]
    NotFinished,
    #[error("score already saved")]
    AlreadySaved,
    #[error(transparent)]
    Invalid(#[from] SubmissionError),
}

pub struct App {
    session: Session,
    gateway: Arc<dyn LeaderboardGateway>,
    leaderboard_limit: usize,
    overlay: Overlay,
    highlighted: usize,
    notice: Option<Notice>,
    score_saved: bool,
    submitting: bool,
    run: u64,
    generation: u64,
    events: mpsc::UnboundedSender<AppEvent>,
    should_quit: bool,
}

impl App {
    pub fn new(
        session: Session,
        gateway: Arc<dyn LeaderboardGateway>,
        leaderboard_limit: usize,
    ) -> (Self, mpsc::UnboundedReceiver<AppEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let app = Self {
            session,
            gateway,
            leaderboard_limit,
            overlay: Overlay::None,
            highlighted: 0,
            notice: None,
            score_saved: false,
            submitting: false,
            run: 0,
            generation: 0,
            events,
            should_quit: false,
        };
        (app, receiver)
    }

    pub fn start(&mut self) -> Vec<Effect> {
        let result = self.session.start();
        if result.is_ok() {
            self.begin_run();
        }
        self.apply(result)
    }

    pub fn select_answer(&mut self, index: usize) -> Vec<Effect> {
        let result = self.session.select_answer(index);
        self.apply(result)
    }

    pub fn select_highlighted(&mut self) -> Vec<Effect> {
        self.select_answer(self.highlighted)
    }

    pub fn tick(&mut self) -> Vec<Effect> {
        let effects = self.session.tick();
        self.apply(Ok(effects))
    }

    pub fn advance_level(&mut self) -> Vec<Effect> {
        let result = self.session.advance();
        self.apply(result)
    }

    pub fn play_again(&mut self) -> Vec<Effect> {
        self.begin_run();
        let effects = self.session.play_again();
        self.apply(Ok(effects))
    }

    /// Forget everything tied to the previous run. Saves still in flight
    /// for it are discarded when they complete.
    fn begin_run(&mut self) {
        self.run += 1;
        self.overlay = Overlay::None;
        self.score_saved = false;
        self.submitting = false;
        self.notice = None;
    }

    pub fn highlight_next(&mut self) {
        if let Some(puzzle) = self.session.current_puzzle() {
            self.highlighted = (self.highlighted + 1) % puzzle.options.len();
        }
    }

    pub fn highlight_previous(&mut self) {
        if let Some(puzzle) = self.session.current_puzzle() {
            let count = puzzle.options.len();
            self.highlighted = (self.highlighted + count - 1) % count;
        }
    }

    pub fn open_save_score(&mut self) {
        if self.session.phase() == Phase::Victory && !self.score_saved {
            self.overlay = Overlay::SaveScore(SaveScoreForm::default());
        }
    }

    pub fn save_form_push(&mut self, c: char) {
        if let Overlay::SaveScore(form) = &mut self.overlay {
            form.push(c);
        }
    }

    pub fn save_form_pop(&mut self) {
        if let Overlay::SaveScore(form) = &mut self.overlay {
            form.pop();
        }
    }

    /// Submit the name typed into the save dialog, reporting problems inline.
    pub fn submit_save_form(&mut self) {
        let Overlay::SaveScore(form) = &self.overlay else {
            return;
        };
        let name = form.input.clone();
        if let Err(err) = self.save_score(&name) {
            if let Overlay::SaveScore(form) = &mut self.overlay {
                form.error = Some(err.to_string());
            }
        }
    }

    /// Validate `player_name` locally, then hand the run to the leaderboard.
    ///
    /// The outcome arrives later as [`AppEvent::ScoreSubmitted`]. While a
    /// submission is in flight further calls are ignored.
    pub fn save_score(&mut self, player_name: &str) -> Result<(), SaveScoreError> {
        if self.session.phase() != Phase::Victory {
            return Err(SaveScoreError::NotFinished);
        }
        if self.score_saved {
            return Err(SaveScoreError::AlreadySaved);
        }
        if self.submitting {
            debug!("score submission already in flight");
            return Ok(());
        }

        let submission = ScoreSubmission::new(player_name, &self.session.summary())?;
        info!(player = %submission.player_name(), score = submission.score(), "submitting score");

        self.submitting = true;
        let run = self.run;
        let request = self.gateway.submit(submission);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = request.await;
            let _ = events.send(AppEvent::ScoreSubmitted { run, result });
        });
        Ok(())
    }

    pub fn open_leaderboard(&mut self) {
        if matches!(self.overlay, Overlay::Leaderboard(_)) {
            return;
        }

        self.generation += 1;
        let generation = self.generation;
        let mut subscription = self.gateway.subscribe();
        let events = self.events.clone();
        let watcher = tokio::spawn(async move {
            while subscription.recv().await.is_some() {
                if events
                    .send(AppEvent::LeaderboardChanged { generation })
                    .is_err()
                {
                    break;
                }
            }
        });

        self.overlay = Overlay::Leaderboard(LeaderboardView {
            generation,
            entries: Vec::new(),
            loading: true,
            watcher,
        });
        self.fetch_leaderboard(generation);
    }

    pub fn close_leaderboard(&mut self) {
        if matches!(self.overlay, Overlay::Leaderboard(_)) {
            self.overlay = Overlay::None;
        }
    }

    pub fn close_overlay(&mut self) {
        self.overlay = Overlay::None;
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::ScoreSubmitted { run, .. } if run != self.run => {
                debug!(run, current = self.run, "dropping save result from an earlier run");
            }
            AppEvent::ScoreSubmitted {
                result: Ok(entry), ..
            } => {
                info!(id = %entry.id, "score saved");
                self.submitting = false;
                self.score_saved = true;
                if matches!(self.overlay, Overlay::SaveScore(_)) {
                    self.overlay = Overlay::None;
                }
                self.notice = Some(Notice::Success("Score saved!".to_string()));
            }
            AppEvent::ScoreSubmitted {
                result: Err(err), ..
            } => {
                warn!(error = %err, "failed to save score");
                self.submitting = false;
                if let Overlay::SaveScore(form) = &mut self.overlay {
                    form.error = Some(SAVE_FAILED_MESSAGE.to_string());
                }
                self.notice = Some(Notice::Failure(SAVE_FAILED_MESSAGE.to_string()));
            }
            AppEvent::LeaderboardLoaded {
                generation,
                entries,
            } => {
                if let Overlay::Leaderboard(view) = &mut self.overlay {
                    if view.generation == generation {
                        view.entries = entries;
                        view.loading = false;
                    }
                }
            }
            AppEvent::LeaderboardChanged { generation } => {
                let current = match &self.overlay {
                    Overlay::Leaderboard(view) => view.generation == generation,
                    _ => false,
                };
                if current {
                    debug!("leaderboard changed; refreshing");
                    self.fetch_leaderboard(generation);
                }
            }
        }
    }

    fn fetch_leaderboard(&self, generation: u64) {
        let request = self.gateway.fetch_top(self.leaderboard_limit);
        let events = self.events.clone();
        tokio::spawn(async move {
            let entries = match request.await {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(error = %err, "failed to fetch leaderboard; showing no scores");
                    Vec::new()
                }
            };
            let _ = events.send(AppEvent::LeaderboardLoaded {
                generation,
                entries,
            });
        });
    }

    fn apply(&mut self, result: Result<Vec<Effect>, InvalidTransition>) -> Vec<Effect> {
        let effects = match result {
            Ok(effects) => effects,
            Err(err) => {
                debug!(error = %err, "ignoring action");
                return Vec::new();
            }
        };

        for effect in &effects {
            match effect {
                Effect::QuestionStarted { .. } => {
                    self.highlighted = 0;
                    self.notice = None;
                }
                Effect::AnswerResolved { verdict, points } => {
                    self.notice = Some(if verdict.is_correct {
                        Notice::Success(format!("Correct! +{points} points"))
                    } else if verdict.timed_out {
                        Notice::Failure("Time's up!".to_string())
                    } else {
                        Notice::Failure("Try again!".to_string())
                    });
                }
                Effect::Victory(_) | Effect::Reset => {
                    self.notice = None;
                }
            }
        }
        effects
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn score_saved(&self) -> bool {
        self.score_saved
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures_util::future::BoxFuture;

    use super::*;
    use crate::engine::Rules;
    use crate::leaderboard::{GatewayError, MemoryLeaderboard, Subscription};
    use crate::models::{Catalog, Puzzle};

    struct RecordingGateway {
        store: MemoryLeaderboard,
        submits: AtomicUsize,
        offline: bool,
    }

    impl RecordingGateway {
        fn new(offline: bool) -> Arc<Self> {
            Arc::new(Self {
                store: MemoryLeaderboard::new(),
                submits: AtomicUsize::new(0),
                offline,
            })
        }
    }

    impl LeaderboardGateway for RecordingGateway {
        fn submit(
            &self,
            submission: ScoreSubmission,
        ) -> BoxFuture<'static, GatewayResult<LeaderboardEntry>> {
            self.submits.fetch_add(1, Ordering::SeqCst);
            if self.offline {
                Box::pin(async { Err(GatewayError::Unavailable("offline".into())) })
            } else {
                self.store.submit(submission)
            }
        }

        fn fetch_top(&self, limit: usize) -> BoxFuture<'static, GatewayResult<Vec<LeaderboardEntry>>> {
            if self.offline {
                Box::pin(async { Err(GatewayError::Unavailable("offline".into())) })
            } else {
                self.store.fetch_top(limit)
            }
        }

        fn subscribe(&self) -> Subscription {
            self.store.subscribe()
        }
    }

    fn new_app(
        gateway: Arc<RecordingGateway>,
        levels: usize,
    ) -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let puzzles = (0..levels)
            .map(|i| {
                Puzzle::new(
                    format!("Q{i}"),
                    vec!["no".into(), "yes".into(), "maybe".into()],
                    1,
                    None,
                )
            })
            .collect();
        let catalog = Arc::new(Catalog::new(puzzles).unwrap());
        App::new(Session::new(catalog, Rules::default()), gateway, 10)
    }

    fn finish_run(app: &mut App) {
        app.start();
        while app.session().phase() == Phase::Playing {
            app.select_answer(1);
            app.advance_level();
        }
    }

    #[tokio::test]
    async fn test_empty_name_never_reaches_gateway() {
        let gateway = RecordingGateway::new(false);
        let (mut app, _events) = new_app(gateway.clone(), 2);
        finish_run(&mut app);

        let result = app.save_score("");
        assert!(matches!(
            result,
            Err(SaveScoreError::Invalid(SubmissionError::EmptyName))
        ));
        assert!(app.save_score(&"x".repeat(51)).is_err());
        assert_eq!(gateway.submits.load(Ordering::SeqCst), 0);
        assert!(!app.is_submitting());
    }

    #[tokio::test]
    async fn test_save_score_succeeds_once() {
        let gateway = RecordingGateway::new(false);
        let (mut app, mut events) = new_app(gateway.clone(), 2);
        assert!(matches!(
            app.save_score("Ada"),
            Err(SaveScoreError::NotFinished)
        ));

        finish_run(&mut app);
        app.open_save_score();
        for c in "  Ada ".chars() {
            app.save_form_push(c);
        }
        app.submit_save_form();
        assert!(app.is_submitting());
        // In-flight: a second attempt is ignored.
        app.save_score("Ada").unwrap();

        let event = events.recv().await.unwrap();
        app.handle_event(event);
        assert!(app.score_saved());
        assert!(matches!(app.overlay(), Overlay::None));
        assert!(matches!(app.notice(), Some(Notice::Success(_))));
        assert_eq!(gateway.submits.load(Ordering::SeqCst), 1);

        let top = gateway.store.top(10).await;
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].player_name, "Ada");
        assert_eq!(top[0].score, 20);
        assert_eq!(top[0].completion_percentage, 100);

        assert!(matches!(
            app.save_score("Ada"),
            Err(SaveScoreError::AlreadySaved)
        ));
    }

    #[tokio::test]
    async fn test_late_save_result_does_not_leak_into_next_run() {
        let gateway = RecordingGateway::new(false);
        let (mut app, mut events) = new_app(gateway.clone(), 1);
        finish_run(&mut app);
        app.save_score("Ada").unwrap();

        // Player restarts before the first save completes.
        app.play_again();
        assert!(!app.is_submitting());
        finish_run(&mut app);

        let late = events.recv().await.unwrap();
        app.handle_event(late);
        assert!(!app.score_saved());
        assert_eq!(app.notice(), None);

        app.save_score("Bob").unwrap();
        let event = events.recv().await.unwrap();
        app.handle_event(event);
        assert!(app.score_saved());

        let names: Vec<_> = gateway
            .store
            .top(10)
            .await
            .into_iter()
            .map(|e| e.player_name)
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"Ada".to_string()));
        assert!(names.contains(&"Bob".to_string()));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_dialog_open_for_retry() {
        let gateway = RecordingGateway::new(true);
        let (mut app, mut events) = new_app(gateway.clone(), 1);
        finish_run(&mut app);
        app.open_save_score();
        for c in "Ada".chars() {
            app.save_form_push(c);
        }
        app.submit_save_form();

        let event = events.recv().await.unwrap();
        app.handle_event(event);
        assert!(!app.score_saved());
        assert!(!app.is_submitting());
        match app.overlay() {
            Overlay::SaveScore(form) => {
                assert_eq!(form.error(), Some(SAVE_FAILED_MESSAGE));
                assert_eq!(form.input(), "Ada");
            }
            _ => panic!("save dialog should stay open"),
        }
        assert_eq!(app.session().score(), 10);

        app.submit_save_form();
        assert!(app.is_submitting());
        assert_eq!(gateway.submits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_blank_name_error_shown_in_dialog() {
        let gateway = RecordingGateway::new(false);
        let (mut app, _events) = new_app(gateway.clone(), 1);
        finish_run(&mut app);
        app.open_save_score();
        app.save_form_push(' ');
        app.submit_save_form();

        match app.overlay() {
            Overlay::SaveScore(form) => assert_eq!(form.error(), Some("Name cannot be empty")),
            _ => panic!("save dialog should stay open"),
        }
        assert_eq!(gateway.submits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_leaderboard_refreshes_on_change_and_releases_subscription() {
        let gateway = RecordingGateway::new(false);
        let (mut app, mut events) = new_app(gateway.clone(), 1);

        app.open_leaderboard();
        assert_eq!(gateway.store.subscriber_count(), 1);
        let event = events.recv().await.unwrap();
        app.handle_event(event);
        match app.overlay() {
            Overlay::Leaderboard(view) => {
                assert!(!view.is_loading());
                assert!(view.entries().is_empty());
            }
            _ => panic!("leaderboard should be open"),
        }

        let other = ScoreSubmission::new("Grace", &crate::engine::ScoreSummary::new(30, 3, 10))
            .unwrap();
        gateway.store.insert(&other).await;

        // Change notice, then the re-fetch it triggers.
        let changed = events.recv().await.unwrap();
        assert!(matches!(changed, AppEvent::LeaderboardChanged { .. }));
        app.handle_event(changed);
        let reloaded = events.recv().await.unwrap();
        app.handle_event(reloaded);
        match app.overlay() {
            Overlay::Leaderboard(view) => assert_eq!(view.entries()[0].player_name, "Grace"),
            _ => panic!("leaderboard should be open"),
        }

        app.close_leaderboard();
        for _ in 0..100 {
            if gateway.store.subscriber_count() == 0 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(gateway.store.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_shows_empty_list() {
        let gateway = RecordingGateway::new(true);
        let (mut app, mut events) = new_app(gateway, 1);

        app.open_leaderboard();
        let event = events.recv().await.unwrap();
        app.handle_event(event);
        match app.overlay() {
            Overlay::Leaderboard(view) => {
                assert!(!view.is_loading());
                assert!(view.entries().is_empty());
            }
            _ => panic!("leaderboard should be open"),
        }
    }

    #[tokio::test]
    async fn test_stale_leaderboard_results_are_discarded() {
        let gateway = RecordingGateway::new(false);
        let (mut app, _events) = new_app(gateway, 1);
        app.open_leaderboard();
        app.close_leaderboard();
        app.open_leaderboard();

        app.handle_event(AppEvent::LeaderboardLoaded {
            generation: 1,
            entries: Vec::new(),
        });
        match app.overlay() {
            Overlay::Leaderboard(view) => assert!(view.is_loading()),
            _ => panic!("leaderboard should be open"),
        }
    }

    #[tokio::test]
    async fn test_notices_and_highlight() {
        let gateway = RecordingGateway::new(false);
        let (mut app, _events) = new_app(gateway, 2);
        app.start();

        app.highlight_previous();
        assert_eq!(app.highlighted(), 2);
        app.highlight_next();
        app.highlight_next();
        assert_eq!(app.highlighted(), 1);

        app.select_answer(0);
        assert_eq!(
            app.notice(),
            Some(&Notice::Failure("Try again!".to_string()))
        );
        // Frozen on a wrong answer: advancing is refused.
        assert!(app.advance_level().is_empty());

        app.play_again();
        app.start();
        app.highlight_next();
        app.select_highlighted();
        assert_eq!(
            app.notice(),
            Some(&Notice::Success("Correct! +10 points".to_string()))
        );
        let effects = app.advance_level();
        assert_eq!(effects, vec![Effect::QuestionStarted { level: 1 }]);
        assert_eq!(app.highlighted(), 0);
        assert_eq!(app.notice(), None);
    }
}
