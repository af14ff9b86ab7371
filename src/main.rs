use bananas::{
    app::{Action, App},
    config::{Config, ConfigStore, FileConfigStore},
    runtime::{CrosstermEventSource, FixedTicker, QuizEvent, Runner},
    DifficultyConfig, DifficultyLevel, RangeScope, SessionSettings, TimerConfig,
};
use clap::{error::ErrorKind, ArgGroup, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

/// multiplication facts drill: pick a table, beat the clock, collect bananas
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Answer multiple-choice multiplication questions. Correct answers earn bananas, wrong ones cost them, and every 100 bananas is a level up."
)]
#[clap(group(ArgGroup::new("difficulty").args(["table", "tables", "level", "range"])))]
pub struct Cli {
    /// practice a single table (1-10)
    #[clap(short = 'n', long)]
    table: Option<u32>,

    /// practice a mix of tables, e.g. 2,5,10
    #[clap(long, value_delimiter = ',')]
    tables: Option<Vec<u32>>,

    /// practice a preset factor range
    #[clap(short = 'l', long, value_enum)]
    level: Option<DifficultyLevel>,

    /// practice factors from a custom range, e.g. 3-8
    #[clap(long, value_parser = parse_range)]
    range: Option<(u32, u32)>,

    /// with --range, draw only the first factor from the range
    #[clap(long, requires = "range")]
    one_factor: bool,

    /// seconds per question, or "off"
    #[clap(short = 's', long)]
    timer: Option<TimerConfig>,

    /// pause after an answer before the next question, in milliseconds
    #[clap(long = "feedback-ms")]
    feedback_ms: Option<u64>,

    /// read preferences from this file instead of the default location
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,
}

fn parse_range(s: &str) -> Result<(u32, u32), String> {
    let (min, max) = s
        .split_once('-')
        .ok_or_else(|| format!("expected MIN-MAX, got '{s}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|e| format!("'{v}' is not a number: {e}"))
    };
    Ok((parse(min)?, parse(max)?))
}

impl Cli {
    /// Command-line flags win over the config file
    fn settings(&self, base: Config) -> SessionSettings {
        let mut settings = SessionSettings::from(&base);

        if let Some(table) = self.table {
            settings.difficulty = DifficultyConfig::fixed(table);
        } else if let Some(ref tables) = self.tables {
            settings.difficulty = DifficultyConfig::tables(tables.iter().copied());
        } else if let Some(level) = self.level {
            settings.difficulty = level.config();
        } else if let Some((min, max)) = self.range {
            let scope = if self.one_factor {
                RangeScope::OneFactor
            } else {
                RangeScope::BothFactors
            };
            settings.difficulty = DifficultyConfig::range(min, max, scope);
        }

        if let Some(timer) = self.timer {
            settings.timer = timer;
        }
        if let Some(ms) = self.feedback_ms {
            settings.feedback_delay = Duration::from_millis(ms);
        }
        settings
    }

    fn config_store(&self) -> FileConfigStore {
        match self.config {
            Some(ref path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = cli.config_store();
    log::debug!("reading preferences from {}", store.path().display());
    let settings = cli.settings(store.load());
    log::info!("starting with {} / timer {}", settings.difficulty, settings.timer);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(settings);
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        let event = runner.step();
        // keep the countdown current before acting on input
        app.on_tick(runner.elapsed());

        match event {
            QuizEvent::Tick | QuizEvent::Resize => {}
            QuizEvent::Key(key) => {
                if app.on_key(key) == Action::Quit {
                    break;
                }
            }
        }
    }

    Ok(())
}
