use rand::Rng;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::{
    app::App,
    session::{Phase, SessionSnapshot, LEVEL_UP_THRESHOLD, POINTS_PER_ANSWER},
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

impl<R: Rng> Widget for &App<R> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        render_snapshot(&self.session.snapshot(), area, buf);
    }
}

/// Draw one frame of the quiz from a session snapshot
pub fn render_snapshot(snap: &SessionSnapshot, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let italic_dim_style = dim_style.add_modifier(Modifier::ITALIC);
    let state = &snap.state;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(1),    // padding
            Constraint::Length(3), // bananas / question / timer
            Constraint::Length(1), // padding
            Constraint::Length(3), // choices
            Constraint::Length(1), // level-up banner
            Constraint::Min(1),    // padding
            Constraint::Length(1), // start hint
            Constraint::Length(1), // key legend
        ])
        .split(area);

    let header = Line::from(vec![
        Span::raw("Level: "),
        Span::styled(state.player_level.to_string(), bold_style),
        Span::raw("   Difficulty: "),
        Span::styled(snap.difficulty.to_string(), bold_style),
        Span::raw("   Timer: "),
        Span::styled(snap.timer.to_string(), bold_style),
    ]);
    Paragraph::new(header)
        .alignment(Alignment::Center)
        .style(dim_style)
        .render(chunks[0], buf);

    let row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(10),
            Constraint::Min(10),
            Constraint::Length(10),
        ])
        .split(chunks[2]);

    Paragraph::new(Span::styled(
        format!("🍌 {}", state.score),
        bold_style.fg(Color::Yellow),
    ))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL))
    .render(row[0], buf);

    Paragraph::new(Span::styled(state.question.prompt(), bold_style))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Solve"))
        .render(row[1], buf);

    if snap.timer_visible() {
        let timer_color = if snap.timer_urgent() {
            Color::Red
        } else {
            Color::Green
        };
        Paragraph::new(Span::styled(
            format!("{}s", state.seconds_remaining),
            bold_style.fg(timer_color),
        ))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL))
        .render(row[2], buf);
    }

    let choice_cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(chunks[4]);

    for (idx, (choice, cell)) in state.question.choices.iter().zip(choice_cells.iter()).enumerate() {
        let selected = state.selected_choice == Some(*choice);
        let color = if selected { Color::Blue } else { Color::Green };
        Paragraph::new(Span::styled(choice.to_string(), bold_style.fg(color)))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color))
                    .title(format!("{}", idx + 1)),
            )
            .render(*cell, buf);
    }

    if state.show_level_up {
        Paragraph::new(Span::styled(
            format!(
                "🎉 Level up! You're now at Level {}. Bananas reset to 0. Keep going!",
                state.player_level
            ),
            bold_style.fg(Color::Green),
        ))
        .alignment(Alignment::Center)
        .render(chunks[5], buf);
    }

    if state.show_start_hint {
        Paragraph::new(Span::styled(
            format!(
                "Tip: each correct answer is +{POINTS_PER_ANSWER} bananas, wrong is -{POINTS_PER_ANSWER}. \
                 Hit {LEVEL_UP_THRESHOLD} bananas to level up 🎉"
            ),
            italic_dim_style,
        ))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[7], buf);
    }

    let toggle = match snap.phase {
        Phase::Running => "pause",
        Phase::Idle | Phase::Paused => "start",
    };
    Paragraph::new(Span::styled(
        format!(
            "(1-4) answer  (space) {toggle}  (←/→) table  (e/m/h) level  (t) timer  (r) reset  (esc) quit"
        ),
        italic_dim_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[8], buf);
}
