//! The terminal front end.
//!
//! Implements [`CommandSource`] over crossterm events: the screen is drawn
//! before every blocking read, so the view is always current when the core
//! asks for a command. Messages are rendered straight from the core's
//! history; prompt lines are overlaid on top while a selection is pending.

use std::io::Stdout;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction as LayoutDir, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Terminal;

use ef_core::action::{Command, CommandSource};
use ef_core::magic::SPELLS;
use ef_core::world::DayPhase;
use ef_core::SimulationState;

use crate::input::{key_to_command, letter_to_index};

pub struct App {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Prompt lines shown below the message history while selecting.
    prompt: Vec<String>,
}

impl App {
    pub fn new(terminal: Terminal<CrosstermBackend<Stdout>>) -> Self {
        Self {
            terminal,
            prompt: Vec::new(),
        }
    }

    fn draw(&mut self, state: &SimulationState) {
        let prompt = &self.prompt;
        let _ = self.terminal.draw(|frame| {
            let chunks = Layout::default()
                .direction(LayoutDir::Vertical)
                .constraints([
                    Constraint::Length(6),
                    Constraint::Min(5),
                    Constraint::Length(3),
                ])
                .split(frame.area());

            render_messages(frame, chunks[0], state, prompt);
            render_map(frame, chunks[1], state);
            render_status(frame, chunks[2], state);
        });
    }

    fn wait_key(&mut self) -> KeyCode {
        loop {
            if let Ok(Event::Key(key)) = event::read() {
                if key.kind == KeyEventKind::Press {
                    return key.code;
                }
            }
        }
    }

    /// Prompt for a single selection letter; anything else cancels.
    fn prompt_letter(&mut self, state: &SimulationState, prompt: &str) -> Option<usize> {
        self.prompt.push(prompt.to_string());
        self.draw(state);
        let picked = match self.wait_key() {
            KeyCode::Char(c) => letter_to_index(c),
            _ => None,
        };
        self.prompt.pop();
        picked
    }
}

impl CommandSource for App {
    fn next_command(&mut self, state: &SimulationState) -> Command {
        loop {
            self.draw(state);
            let key = match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => key,
                Ok(_) => continue,
                Err(_) => return Command::Quit,
            };

            if let Some(cmd) = key_to_command(key) {
                return cmd;
            }

            // Bindings that need a selection.
            match key.code {
                KeyCode::Char('Z') => {
                    let known: Vec<String> = SPELLS
                        .iter()
                        .take_while(|s| s.slevel <= state.player.level)
                        .enumerate()
                        .map(|(i, s)| format!("{}) {}", (b'a' + i as u8) as char, s.name))
                        .collect();
                    self.prompt.push(known.join("  "));
                    let picked = self.prompt_letter(state, "Cast which spell?");
                    self.prompt.pop();
                    if let Some(spell) = picked {
                        return Command::Cast {
                            spell,
                            target: None,
                        };
                    }
                }
                KeyCode::Char('E') => {
                    if let Some(slot) = self.prompt_letter(state, "Eat what?") {
                        return Command::Eat(slot);
                    }
                }
                KeyCode::Char('d') => {
                    if let Some(slot) = self.prompt_letter(state, "Drop what?") {
                        return Command::Drop(slot);
                    }
                }
                KeyCode::Char('A') => {
                    if let Some(slot) = self.prompt_letter(state, "Activate what?") {
                        return Command::Activate(slot);
                    }
                }
                KeyCode::Char('z') => {
                    if let Some(slot) = self.prompt_letter(state, "Zap which rod?") {
                        return Command::ZapRod(slot);
                    }
                }
                _ => {}
            }
        }
    }

    fn poll_interrupt(&mut self) -> bool {
        matches!(event::poll(Duration::from_millis(0)), Ok(true))
    }
}

fn render_messages(
    frame: &mut ratatui::Frame,
    area: Rect,
    state: &SimulationState,
    prompt: &[String],
) {
    let height = area.height.saturating_sub(2) as usize;
    let history = height.saturating_sub(prompt.len());
    let lines: Vec<Line> = state
        .message_history
        .iter()
        .rev()
        .take(history)
        .rev()
        .map(|m| Line::from(m.as_str()))
        .chain(prompt.iter().map(|m| {
            Line::styled(m.as_str(), Style::default().add_modifier(Modifier::BOLD))
        }))
        .collect();
    let para =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Messages"));
    frame.render_widget(para, area);
}

fn render_map(frame: &mut ratatui::Frame, area: Rect, state: &SimulationState) {
    // Minimal chart: @ centered, monsters placed relative to the player.
    let width = area.width.saturating_sub(2) as i32;
    let height = area.height.saturating_sub(2) as i32;
    let cx = width / 2;
    let cy = height / 2;

    let mut grid = vec![vec![' '; width.max(0) as usize]; height.max(0) as usize];
    for (_, m) in state.monsters.iter() {
        let x = cx + (m.pos.x - state.player.pos.x);
        let y = cy + (m.pos.y - state.player.pos.y);
        if (0..width).contains(&x) && (0..height).contains(&y) {
            let glyph = m.name.chars().next().unwrap_or('m');
            grid[y as usize][x as usize] = glyph;
        }
    }
    if (0..width).contains(&cx) && (0..height).contains(&cy) {
        grid[cy as usize][cx as usize] = '@';
    }

    let lines: Vec<Line> = grid
        .into_iter()
        .map(|row| Line::from(row.into_iter().collect::<String>()))
        .collect();
    let title = format!(
        "Depth {} ({})",
        state.level.depth,
        match state.clock.day_phase() {
            DayPhase::Day => "day",
            DayPhase::Night => "night",
        }
    );
    let para = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(para, area);
}

fn render_status(frame: &mut ratatui::Frame, area: Rect, state: &SimulationState) {
    let p = &state.player;
    let line = format!(
        "{}  L{}  HP {}/{}  SP {}/{}  Speed {}  Food {}  Turn {}",
        p.name,
        p.level,
        p.chp,
        p.mhp,
        p.csp,
        p.msp,
        p.speed(),
        p.food,
        state.clock.turn()
    );
    let style = if p.chp * 4 < p.mhp {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let para =
        Paragraph::new(Line::styled(line, style)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(para, area);
}
