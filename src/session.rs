use crate::{
    difficulty::{DifficultyConfig, DifficultyLevel},
    question::{generate_question, Question},
    scheduler::{Deferred, Scheduler, TaskId},
    timer::TimerConfig,
};
use rand::rngs::ThreadRng;
use rand::Rng;
use std::time::Duration;

/// Bananas gained for a correct answer and lost for a wrong one
pub const POINTS_PER_ANSWER: u32 = 5;
/// Reaching this many bananas levels the player up
pub const LEVEL_UP_THRESHOLD: u32 = 100;
pub const LEVEL_UP_BANNER: Duration = Duration::from_millis(1800);
pub const DEFAULT_FEEDBACK_DELAY: Duration = Duration::from_millis(220);
pub const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

/// How a session is set up before it starts
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub difficulty: DifficultyConfig,
    pub timer: TimerConfig,
    /// Pause between an answer and the next question; zero advances immediately
    pub feedback_delay: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            difficulty: DifficultyConfig::default(),
            timer: TimerConfig::default(),
            feedback_delay: DEFAULT_FEEDBACK_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Never started (or reset); start hint visible
    Idle,
    Running,
    /// Countdown stopped; answers are still accepted and resume the session
    Paused,
}

/// Mutable session state, owned by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Bananas, always below `LEVEL_UP_THRESHOLD`
    pub score: u32,
    pub player_level: u32,
    pub question: Question,
    /// Bumped every time `question` is replaced
    pub question_serial: u64,
    pub running: bool,
    pub selected_choice: Option<u32>,
    pub seconds_remaining: u32,
    pub show_level_up: bool,
    pub show_start_hint: bool,
}

/// Read-only view handed to the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub phase: Phase,
    pub difficulty: DifficultyConfig,
    pub difficulty_level: Option<DifficultyLevel>,
    pub timer: TimerConfig,
}

impl SessionSnapshot {
    pub fn timer_visible(&self) -> bool {
        !self.timer.is_off()
    }

    /// Last five seconds of a countdown
    pub fn timer_urgent(&self) -> bool {
        self.timer_visible() && self.state.seconds_remaining <= 5
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub leveled_up: bool,
}

/// Drives one quiz session: scoring, level-ups, countdown and question turnover.
///
/// All time flows in through [`SessionController::tick`]; deferred work lives
/// in an owned [`Scheduler`] and at most one task per kind is pending.
#[derive(Debug)]
pub struct SessionController<R: Rng = ThreadRng> {
    state: SessionState,
    difficulty: DifficultyConfig,
    timer: TimerConfig,
    feedback_delay: Duration,
    scheduler: Scheduler,
    countdown: Option<TaskId>,
    pending_advance: Option<TaskId>,
    banner: Option<TaskId>,
    rng: R,
    shut_down: bool,
}

impl SessionController<ThreadRng> {
    pub fn new(settings: SessionSettings) -> Self {
        Self::with_rng(settings, rand::thread_rng())
    }
}

impl<R: Rng> SessionController<R> {
    pub fn with_rng(settings: SessionSettings, mut rng: R) -> Self {
        let difficulty = settings.difficulty.normalized();
        let timer = settings.timer.normalized();
        let question = generate_question(&difficulty, &mut rng);

        Self {
            state: SessionState {
                score: 0,
                player_level: 0,
                question,
                question_serial: 0,
                running: false,
                selected_choice: None,
                seconds_remaining: timer.seconds(),
                show_level_up: false,
                show_start_hint: true,
            },
            difficulty,
            timer,
            feedback_delay: settings.feedback_delay,
            scheduler: Scheduler::new(),
            countdown: None,
            pending_advance: None,
            banner: None,
            rng,
            shut_down: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn difficulty(&self) -> &DifficultyConfig {
        &self.difficulty
    }

    pub fn timer(&self) -> TimerConfig {
        self.timer
    }

    pub fn phase(&self) -> Phase {
        match (self.state.running, self.state.show_start_hint) {
            (true, _) => Phase::Running,
            (false, true) => Phase::Idle,
            (false, false) => Phase::Paused,
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Tasks still waiting on the clock
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending_count()
    }

    pub fn countdown_armed(&self) -> bool {
        self.countdown.is_some_and(|id| self.scheduler.is_pending(id))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state.clone(),
            phase: self.phase(),
            difficulty: self.difficulty.clone(),
            difficulty_level: self.difficulty.level(),
            timer: self.timer,
        }
    }

    /// Begin (or resume) with a fresh question. No-op while already running.
    pub fn start(&mut self) {
        if self.shut_down || self.state.running {
            return;
        }
        log::debug!("session started");
        self.state.running = true;
        self.state.show_start_hint = false;
        self.advance_question();
    }

    /// Stop the countdown. Score, level and question are kept.
    pub fn pause(&mut self) {
        if self.shut_down {
            return;
        }
        if self.state.running {
            log::debug!("session paused");
        }
        self.state.running = false;
        self.disarm_countdown();
    }

    pub fn toggle_running(&mut self) {
        if self.state.running {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Score a tapped choice against the question on screen.
    ///
    /// An idle or paused session resumes without replacing the question. The
    /// next question follows after the feedback delay; a later tap within
    /// that window replaces the pending advance.
    pub fn select_answer(&mut self, value: u32) -> AnswerOutcome {
        if self.shut_down {
            return AnswerOutcome {
                correct: false,
                leveled_up: false,
            };
        }
        if !self.state.running {
            self.state.running = true;
            self.state.show_start_hint = false;
            self.restart_countdown();
        }

        self.state.selected_choice = Some(value);
        let correct = self.state.question.is_correct(value);
        let delta = if correct {
            POINTS_PER_ANSWER as i64
        } else {
            -(POINTS_PER_ANSWER as i64)
        };
        let leveled_up = self.apply_score(self.state.score as i64 + delta);
        log::debug!(
            "answer {value} for {} is {}; score {} level {}",
            self.state.question.prompt(),
            if correct { "correct" } else { "wrong" },
            self.state.score,
            self.state.player_level
        );

        self.cancel_pending_advance();
        if self.feedback_delay.is_zero() {
            self.advance_question();
        } else {
            let serial = self.state.question_serial;
            self.pending_advance = Some(
                self.scheduler
                    .schedule_once(Deferred::Advance { serial }, self.feedback_delay),
            );
        }

        AnswerOutcome {
            correct,
            leveled_up,
        }
    }

    /// Swap the difficulty and replace the current question under it.
    pub fn change_difficulty(&mut self, difficulty: DifficultyConfig) {
        if self.shut_down {
            return;
        }
        self.difficulty = difficulty.normalized();
        log::debug!("difficulty changed to {}", self.difficulty);
        self.advance_question();
    }

    pub fn change_timer(&mut self, timer: TimerConfig) {
        if self.shut_down {
            return;
        }
        self.timer = timer.normalized();
        log::debug!("timer changed to {}", self.timer);
        self.restart_countdown();
    }

    /// Back to a fresh, idle session with the current configuration.
    pub fn reset(&mut self) {
        if self.shut_down {
            return;
        }
        log::debug!("session reset");
        self.pause();
        self.cancel_banner();
        self.state.score = 0;
        self.state.player_level = 0;
        self.state.show_level_up = false;
        self.state.show_start_hint = true;
        self.advance_question();
    }

    /// Feed elapsed wall-clock time. Fires every deferred action that falls
    /// due, in order, each seeing the state left by the previous one.
    pub fn tick(&mut self, elapsed: Duration) {
        if self.shut_down {
            return;
        }
        let deadline = self.scheduler.now() + elapsed;
        while let Some((id, kind)) = self.scheduler.pop_due(deadline) {
            self.fire(id, kind);
        }
    }

    /// Cancel everything still scheduled. Later calls leave the state alone.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        log::debug!("session shut down with {} pending tasks", self.pending_tasks());
        self.scheduler.clear();
        self.countdown = None;
        self.pending_advance = None;
        self.banner = None;
        self.state.running = false;
        self.shut_down = true;
    }

    fn fire(&mut self, id: TaskId, kind: Deferred) {
        match kind {
            Deferred::Countdown => {
                if self.countdown != Some(id) {
                    return;
                }
                if self.state.seconds_remaining <= 1 {
                    log::debug!("time is up for {}", self.state.question.prompt());
                    self.advance_question();
                } else {
                    self.state.seconds_remaining -= 1;
                }
            }
            Deferred::Advance { serial } => {
                if self.pending_advance != Some(id) {
                    return;
                }
                self.pending_advance = None;
                if serial == self.state.question_serial {
                    self.advance_question();
                }
            }
            Deferred::HideLevelUp => {
                if self.banner == Some(id) {
                    self.banner = None;
                    self.state.show_level_up = false;
                }
            }
        }
    }

    /// Floor at zero, or level up once the threshold is reached
    fn apply_score(&mut self, proposed: i64) -> bool {
        if proposed >= LEVEL_UP_THRESHOLD as i64 {
            self.state.player_level += 1;
            self.state.score = 0;
            self.state.show_level_up = true;
            self.cancel_banner();
            self.banner = Some(
                self.scheduler
                    .schedule_once(Deferred::HideLevelUp, LEVEL_UP_BANNER),
            );
            log::debug!("level up to {}", self.state.player_level);
            true
        } else {
            self.state.score = proposed.max(0) as u32;
            false
        }
    }

    /// Replace the question wholesale and restart the countdown
    fn advance_question(&mut self) {
        self.cancel_pending_advance();
        self.state.selected_choice = None;
        self.state.question = generate_question(&self.difficulty, &mut self.rng);
        self.state.question_serial += 1;
        self.restart_countdown();
    }

    /// Full duration again; armed only while running with a timer set
    fn restart_countdown(&mut self) {
        self.disarm_countdown();
        self.state.seconds_remaining = self.timer.seconds();
        if self.state.running && !self.timer.is_off() {
            self.countdown = Some(
                self.scheduler
                    .schedule_repeating(Deferred::Countdown, COUNTDOWN_PERIOD),
            );
        }
    }

    fn disarm_countdown(&mut self) {
        if let Some(id) = self.countdown.take() {
            self.scheduler.cancel(id);
        }
    }

    fn cancel_pending_advance(&mut self) {
        if let Some(id) = self.pending_advance.take() {
            self.scheduler.cancel(id);
        }
    }

    fn cancel_banner(&mut self) {
        if let Some(id) = self.banner.take() {
            self.scheduler.cancel(id);
        }
    }
}
