// Library surface for headless/integration tests and reuse.
// The binary only adds terminal setup and argument parsing on top.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod difficulty;
pub mod question;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod timer;
pub mod ui;

pub use difficulty::{DifficultyConfig, DifficultyLevel, RangeScope};
pub use question::{generate_question, Question};
pub use session::{SessionController, SessionSettings, SessionSnapshot, SessionState};
pub use timer::TimerConfig;
