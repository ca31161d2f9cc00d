use std::{io, thread, time::Duration};

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use station_core::{
    AppConfig, HeaviestRun, Outcome, PlatformSnapshot, Script, SharedConsole, StationSnapshot,
};
use tokio::{spawn, sync::mpsc, time::sleep};
use tracing::{error, info};

const TICK_RATE: Duration = Duration::from_millis(250);
const JOURNAL_ROWS: usize = 8;
const MAX_INPUT_LEN: usize = 96;
const HEAVIEST_WINDOW: usize = 2;

#[derive(Debug, Clone)]
struct Theme {
    accent: Color,
    muted: Color,
    success: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Cyan,
            muted: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

#[derive(Debug)]
enum AppEvent {
    Input(Event),
    Tick,
    Played {
        line: usize,
        command: String,
        result: std::result::Result<Outcome, String>,
    },
    PlaybackFinished {
        commands: usize,
    },
}

/// Answers of the read-only queries for the current station.
#[derive(Debug, Clone, Default)]
struct Queries {
    express: Option<usize>,
    overloaded: Option<usize>,
    optimal: Option<usize>,
    heaviest: Option<HeaviestRun>,
}

#[derive(Debug, Default)]
struct InputLine {
    buffer: String,
    history: Vec<String>,
    recall: Option<usize>,
}

impl InputLine {
    fn insert(&mut self, ch: char) {
        if self.buffer.len() < MAX_INPUT_LEN {
            self.buffer.push(ch);
        }
    }

    fn backspace(&mut self) {
        self.buffer.pop();
    }

    fn take(&mut self) -> String {
        let line = std::mem::take(&mut self.buffer);
        if !line.trim().is_empty() && self.history.last() != Some(&line) {
            self.history.push(line.clone());
        }
        self.recall = None;
        line
    }

    fn recall(&mut self, delta: isize) {
        if self.history.is_empty() {
            return;
        }
        let last = self.history.len() - 1;
        let next = match (self.recall, delta < 0) {
            (None, true) => Some(last),
            (None, false) => None,
            (Some(index), true) => Some(index.saturating_sub(1)),
            (Some(index), false) if index < last => Some(index + 1),
            (Some(_), false) => None,
        };
        self.recall = next;
        self.buffer = next
            .and_then(|index| self.history.get(index).cloned())
            .unwrap_or_default();
    }
}

/// Interactive terminal frontend for a shared station console.
pub struct StationApp {
    console: SharedConsole,
    config: AppConfig,
    input: InputLine,
    status: String,
    playback: Option<Script>,
    playing: bool,
    should_quit: bool,
    theme: Theme,
}

impl StationApp {
    pub fn new(console: SharedConsole, config: AppConfig) -> Self {
        Self {
            console,
            config,
            input: InputLine::default(),
            status: "Type a command (e.g. 'arrive 0 100') and press Enter. Esc quits.".to_string(),
            playback: None,
            playing: false,
            should_quit: false,
            theme: Theme::default(),
        }
    }

    /// Queue a script to replay once the UI is running.
    pub fn attach_playback(&mut self, script: Script) {
        self.playback = Some(script);
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx.clone());
        if let Some(script) = self.playback.take() {
            self.start_playback(script, event_tx.clone());
        }

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.should_quit {
                break;
            }
            match event_rx.recv().await {
                Some(event) => self.process_app_event(event),
                None => break,
            }
            if self.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        Ok(())
    }

    fn start_playback(&mut self, script: Script, sender: mpsc::Sender<AppEvent>) {
        let console = self.console.clone();
        let delay = Duration::from_millis(self.config.playback_delay_ms);
        let source = script
            .path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "script".to_string());
        info!(source = %source, commands = script.len(), "starting playback");
        self.status = format!("Replaying {source} ({} commands)", script.len());
        self.playing = true;

        spawn(async move {
            let commands = script.len();
            for line in script.lines {
                sleep(delay).await;
                let result = console
                    .execute(&line.command)
                    .map_err(|err| err.to_string());
                let event = AppEvent::Played {
                    line: line.number,
                    command: line.command.to_string(),
                    result,
                };
                if sender.send(event).await.is_err() {
                    return;
                }
            }
            let _ = sender.send(AppEvent::PlaybackFinished { commands }).await;
        });
    }

    fn process_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                self.handle_key(key)
            }
            AppEvent::Input(_) | AppEvent::Tick => {}
            AppEvent::Played {
                line,
                command,
                result,
            } => {
                self.status = match result {
                    Ok(outcome) => format!("line {line}: {command} -> {}", summarize(&outcome)),
                    Err(err) => format!("line {line}: {command} rejected: {err}"),
                };
            }
            AppEvent::PlaybackFinished { commands } => {
                info!(commands, "playback finished");
                self.playing = false;
                self.status = format!("Playback finished after {commands} commands");
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.buffer.clear()
            }
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => self.submit(),
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Up => self.input.recall(-1),
            KeyCode::Down => self.input.recall(1),
            KeyCode::Char(ch) => self.input.insert(ch),
            _ => {}
        }
    }

    fn submit(&mut self) {
        let line = self.input.take();
        if line.trim().is_empty() {
            return;
        }
        self.status = match self.console.execute_line(&line) {
            Ok(Some(outcome)) => format!("{} -> {}", line.trim(), summarize(&outcome)),
            Ok(None) => "Comment ignored".to_string(),
            Err(err) => {
                error!(command = line.trim(), %err, "command failed");
                format!("Error: {err}")
            }
        };
    }

    fn queries(&self) -> Option<Queries> {
        self.console.with(|console| {
            console.station().map(|station| Queries {
                express: Some(station.find_express_train()),
                overloaded: station.find_overloaded_train(),
                optimal: station
                    .platforms()
                    .iter()
                    .any(|platform| platform.is_occupied())
                    .then(|| station.find_optimal_train()),
                heaviest: station.find_heaviest_run(HEAVIEST_WINDOW),
            })
        })
    }

    fn draw(&mut self, frame: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),
                Constraint::Length(JOURNAL_ROWS as u16 + 2),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(frame.size());
        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(rows[0]);

        let snapshot = self.console.snapshot();
        let queries = self.queries();
        self.render_platforms(frame, top[0], snapshot.as_ref(), queries.as_ref());
        self.render_queries(frame, top[1], queries.as_ref());
        self.render_journal(frame, rows[1]);
        self.render_input(frame, rows[2]);
        self.render_status(frame, rows[3]);
    }

    fn render_platforms(
        &self,
        frame: &mut Frame,
        area: Rect,
        snapshot: Option<&StationSnapshot>,
        queries: Option<&Queries>,
    ) {
        let block = Block::default().borders(Borders::ALL).title("Platforms");
        let Some(snapshot) = snapshot else {
            let paragraph = Paragraph::new(Line::from(Span::styled(
                "No station open. Use 'open <platforms>'.",
                Style::default().fg(self.theme.muted),
            )))
            .block(block);
            frame.render_widget(paragraph, area);
            return;
        };

        let express = queries.and_then(|q| q.express);
        let lines: Vec<Line> = snapshot
            .platforms
            .iter()
            .map(|platform| self.platform_line(platform, express == Some(platform.index)))
            .collect();
        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn platform_line(&self, platform: &PlatformSnapshot, express: bool) -> Line<'static> {
        let mut spans = vec![Span::styled(
            format!("{:>2}: ", platform.index),
            Style::default().fg(self.theme.muted),
        )];
        let Some(power) = platform.locomotive_power else {
            return Line::from(spans);
        };
        let locomotive_style = if express {
            Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.theme.accent)
        };
        spans.push(Span::styled(format!("({power})"), locomotive_style));
        for weight in &platform.cars {
            spans.push(Span::raw(format!("-|{weight}|")));
        }
        let load = platform.load.unwrap_or_default();
        let load_style = if platform.is_overloaded() {
            Style::default().fg(self.theme.danger)
        } else {
            Style::default().fg(self.theme.success)
        };
        spans.push(Span::styled(format!("  load {load}"), load_style));
        Line::from(spans)
    }

    fn render_queries(&self, frame: &mut Frame, area: Rect, queries: Option<&Queries>) {
        let block = Block::default().borders(Borders::ALL).title("Queries");
        let label = Style::default().fg(self.theme.muted);
        let index = |value: Option<usize>| match value {
            Some(index) => index.to_string(),
            None => "-".to_string(),
        };

        let lines = match queries {
            Some(queries) => {
                let overloaded_style = if queries.overloaded.is_some() {
                    Style::default().fg(self.theme.danger)
                } else {
                    Style::default().fg(self.theme.success)
                };
                let heaviest = match queries.heaviest {
                    Some(run) => format!("{} @ car {} ({})", run.platform, run.position, run.weight),
                    None => "-".to_string(),
                };
                vec![
                    Line::from(vec![
                        Span::styled("express     ", label),
                        Span::raw(index(queries.express)),
                    ]),
                    Line::from(vec![
                        Span::styled("overloaded  ", label),
                        Span::styled(index(queries.overloaded), overloaded_style),
                    ]),
                    Line::from(vec![
                        Span::styled("optimal     ", label),
                        Span::raw(index(queries.optimal)),
                    ]),
                    Line::from(vec![
                        Span::styled(format!("heaviest {HEAVIEST_WINDOW}  "), label),
                        Span::raw(heaviest),
                    ]),
                ]
            }
            None => vec![Line::from(Span::styled("-", label))],
        };
        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_journal(&self, frame: &mut Frame, area: Rect) {
        let entries = self.console.recent(JOURNAL_ROWS);
        let lines: Vec<Line> = entries
            .iter()
            .map(|entry| {
                let marker = if entry.ok {
                    Span::styled("ok  ", Style::default().fg(self.theme.success))
                } else {
                    Span::styled("err ", Style::default().fg(self.theme.danger))
                };
                Line::from(vec![
                    Span::styled(
                        entry.at.with_timezone(&Local).format("%H:%M:%S ").to_string(),
                        Style::default().fg(self.theme.muted),
                    ),
                    marker,
                    Span::raw(format!("{:<24}", entry.command)),
                    Span::styled(entry.outcome.clone(), Style::default().fg(self.theme.muted)),
                ])
            })
            .collect();
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Journal"));
        frame.render_widget(paragraph, area);
    }

    fn render_input(&self, frame: &mut Frame, area: Rect) {
        let title = if self.playing {
            "Command (replaying script)"
        } else {
            "Command"
        };
        let paragraph = Paragraph::new(Line::from(vec![
            Span::styled("> ", Style::default().fg(self.theme.accent)),
            Span::raw(self.input.buffer.clone()),
        ]))
        .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(paragraph, area);
        let cursor_x = area.x + 3 + self.input.buffer.chars().count() as u16;
        frame.set_cursor(cursor_x.min(area.right().saturating_sub(2)), area.y + 1);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let style = if self.status.starts_with("Error") {
            Style::default().fg(self.theme.warning)
        } else {
            Style::default()
        };
        let paragraph = Paragraph::new(Line::from(Span::styled(self.status.clone(), style)))
            .block(Block::default().borders(Borders::ALL).title("Status"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn summarize(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Rendered(_) => "rendered".to_string(),
        other => other.to_string(),
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}
