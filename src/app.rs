use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::rngs::ThreadRng;
use rand::Rng;
use std::time::Duration;

use crate::{
    difficulty::DifficultyLevel,
    session::{SessionController, SessionSettings},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// Terminal host: turns key presses and clock ticks into session operations
#[derive(Debug)]
pub struct App<R: Rng = ThreadRng> {
    pub session: SessionController<R>,
}

impl App<ThreadRng> {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            session: SessionController::new(settings),
        }
    }
}

impl<R: Rng> App<R> {
    pub fn with_session(session: SessionController<R>) -> Self {
        Self { session }
    }

    pub fn on_tick(&mut self, elapsed: Duration) {
        self.session.tick(elapsed);
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return self.quit();
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return self.quit(),
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                let value = self.session.state().question.choices[idx];
                self.session.select_answer(value);
            }
            KeyCode::Char(' ') | KeyCode::Enter => self.session.toggle_running(),
            KeyCode::Char('r') => self.session.reset(),
            KeyCode::Char('t') => {
                let next = self.session.timer().next();
                self.session.change_timer(next);
            }
            KeyCode::Left => self.shift_table(-1),
            KeyCode::Right => self.shift_table(1),
            KeyCode::Char('e') => self.session.change_difficulty(DifficultyLevel::Easy.config()),
            KeyCode::Char('m') => self.session.change_difficulty(DifficultyLevel::Medium.config()),
            KeyCode::Char('h') => self.session.change_difficulty(DifficultyLevel::Hard.config()),
            _ => {}
        }
        Action::Continue
    }

    fn shift_table(&mut self, delta: i32) {
        let next = self.session.difficulty().shift_table(delta);
        self.session.change_difficulty(next);
    }

    fn quit(&mut self) -> Action {
        self.session.shutdown();
        Action::Quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::DifficultyConfig;
    use crate::session::Phase;
    use crate::timer::TimerConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn app() -> App<StdRng> {
        App::with_session(SessionController::with_rng(
            SessionSettings {
                difficulty: DifficultyConfig::fixed(3),
                timer: TimerConfig::Seconds(30),
                feedback_delay: Duration::ZERO,
            },
            StdRng::seed_from_u64(5),
        ))
    }

    fn press(app: &mut App<StdRng>, code: KeyCode) -> Action {
        app.on_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn number_keys_answer_by_position() {
        let mut app = app();
        let q = app.session.state().question.clone();
        let slot = q.choices.iter().position(|c| *c == q.answer).unwrap();
        let key = char::from(b'1' + slot as u8);

        press(&mut app, KeyCode::Char(key));

        assert_eq!(app.session.state().score, 5);
        assert_eq!(app.session.phase(), Phase::Running);
    }

    #[test]
    fn space_toggles_and_r_resets() {
        let mut app = app();
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.session.phase(), Phase::Running);
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.session.phase(), Phase::Paused);
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.session.phase(), Phase::Idle);
    }

    #[test]
    fn t_cycles_timer_presets() {
        let mut app = app();
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.session.timer(), TimerConfig::Off);
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.session.timer(), TimerConfig::Seconds(15));
    }

    #[test]
    fn arrows_and_letters_change_difficulty() {
        let mut app = app();
        press(&mut app, KeyCode::Right);
        assert_eq!(app.session.difficulty(), &DifficultyConfig::fixed(4));
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.session.snapshot().difficulty_level, Some(DifficultyLevel::Hard));
        press(&mut app, KeyCode::Left);
        assert_eq!(app.session.difficulty(), &DifficultyConfig::fixed(5));
    }

    #[test]
    fn quit_shuts_the_session_down() {
        let mut app = app();
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(press(&mut app, KeyCode::Esc), Action::Quit);
        assert!(app.session.is_shut_down());
        assert_eq!(app.session.pending_tasks(), 0);

        let mut app = self::app();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(app.on_key(ctrl_c), Action::Quit);
    }
}
