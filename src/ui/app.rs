//! Round-history viewer state and logic

use crate::snapshot::{RoundSnapshot, ThreadSnapshot};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::{Constraint, Direction, Layout},
};
use std::io;
use std::time::{Duration, Instant};

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Stack,
    Symbols,
    Heap,
    Files,
    Output,
}

impl FocusedPane {
    /// Move focus to the next pane (clockwise: stack -> symbols -> heap -> files -> output)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Stack => FocusedPane::Symbols,
            FocusedPane::Symbols => FocusedPane::Heap,
            FocusedPane::Heap => FocusedPane::Files,
            FocusedPane::Files => FocusedPane::Output,
            FocusedPane::Output => FocusedPane::Stack,
        }
    }
}

/// The viewer state
pub struct App {
    /// Round history recorded during the run
    pub history: Vec<RoundSnapshot>,

    /// Index into `history` of the round on screen
    pub position: usize,

    /// Id of the thread on screen; kept across rounds while it exists
    pub selected_thread: Option<usize>,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll offsets
    pub stack_scroll: usize,
    pub symbols_scroll: usize,
    pub heap_scroll: usize,
    pub files_scroll: usize,
    pub output_scroll: usize,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,

    /// Whether auto-play mode is active
    pub is_playing: bool,

    /// Last time a round was advanced in play mode
    pub last_play_time: Instant,
}

impl App {
    pub fn new(history: Vec<RoundSnapshot>) -> Self {
        let selected_thread = history
            .first()
            .and_then(|round| round.threads.first())
            .map(|thread| thread.id);
        App {
            history,
            position: 0,
            selected_thread,
            focused_pane: FocusedPane::Stack,
            stack_scroll: 0,
            symbols_scroll: 0,
            heap_scroll: 0,
            files_scroll: 0,
            output_scroll: 0,
            should_quit: false,
            status_message: String::from("Ready!"),
            is_playing: false,
            last_play_time: Instant::now(),
        }
    }

    /// Round on screen
    pub fn current_round(&self) -> Option<&RoundSnapshot> {
        self.history.get(self.position)
    }

    /// Thread on screen, falling back to the first thread of the round
    pub fn current_thread(&self) -> Option<&ThreadSnapshot> {
        let round = self.current_round()?;
        self.selected_thread
            .and_then(|id| round.threads.iter().find(|t| t.id == id))
            .or_else(|| round.threads.first())
    }

    /// Run the viewer
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= Duration::from_millis(500) {
                if !self.step_round(1) {
                    self.is_playing = false;
                    self.status_message = "Playback complete".to_string();
                }
                self.last_play_time = Instant::now();
            }

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(main_chunks[0]);

        // Left column: Execution Stack (top) | Output (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(columns[0]);

        // Right column: Symbol Table | Heap | File Table
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(40),
                Constraint::Percentage(40),
                Constraint::Percentage(20),
            ])
            .split(columns[1]);

        let thread = self.current_thread().cloned();
        let thread = thread.as_ref();

        super::panes::render_stack_pane(
            frame,
            left_rows[0],
            thread,
            self.focused_pane == FocusedPane::Stack,
            &mut self.stack_scroll,
        );
        super::panes::render_output_pane(
            frame,
            left_rows[1],
            thread,
            self.focused_pane == FocusedPane::Output,
            &mut self.output_scroll,
        );
        super::panes::render_symbols_pane(
            frame,
            right_rows[0],
            thread,
            self.focused_pane == FocusedPane::Symbols,
            &mut self.symbols_scroll,
        );
        super::panes::render_heap_pane(
            frame,
            right_rows[1],
            thread,
            self.focused_pane == FocusedPane::Heap,
            &mut self.heap_scroll,
        );
        super::panes::render_files_pane(
            frame,
            right_rows[2],
            thread,
            self.focused_pane == FocusedPane::Files,
            &mut self.files_scroll,
        );

        super::panes::render_status_bar(
            frame,
            main_chunks[1],
            &self.status_message,
            self.position,
            self.history.len(),
            self.current_round().map_or(0, |r| r.threads.len()),
            thread,
            self.is_playing,
        );
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Left => {
                self.is_playing = false;
                if self.step_back(1) {
                    self.status_message = "Previous round".to_string();
                } else {
                    self.status_message = "Already at the first round".to_string();
                }
            }
            KeyCode::Right => {
                self.is_playing = false;
                if self.step_round(1) {
                    self.status_message = "Next round".to_string();
                } else {
                    self.status_message = "Already at the last round".to_string();
                }
            }
            KeyCode::Up => self.select_thread(-1),
            KeyCode::Down => self.select_thread(1),
            KeyCode::PageUp => {
                let scroll = self.focused_scroll();
                *scroll = scroll.saturating_sub(1);
            }
            KeyCode::PageDown => {
                let scroll = self.focused_scroll();
                *scroll = scroll.saturating_add(1);
            }
            KeyCode::Char(' ') => {
                self.is_playing = !self.is_playing;
                self.status_message = if self.is_playing {
                    "Playing...".to_string()
                } else {
                    "Paused".to_string()
                };
            }
            KeyCode::Enter => {
                self.is_playing = false;
                self.position = self.history.len().saturating_sub(1);
                self.status_message = "Jumped to end".to_string();
                self.output_scroll = usize::MAX;
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                self.position = 0;
                self.status_message = "Jumped to start".to_string();
            }
            _ => {}
        }
    }

    fn focused_scroll(&mut self) -> &mut usize {
        match self.focused_pane {
            FocusedPane::Stack => &mut self.stack_scroll,
            FocusedPane::Symbols => &mut self.symbols_scroll,
            FocusedPane::Heap => &mut self.heap_scroll,
            FocusedPane::Files => &mut self.files_scroll,
            FocusedPane::Output => &mut self.output_scroll,
        }
    }

    /// Advance `n` rounds; false when already at the end
    pub fn step_round(&mut self, n: usize) -> bool {
        let last = self.history.len().saturating_sub(1);
        if self.position >= last {
            return false;
        }
        self.position = (self.position + n).min(last);
        self.output_scroll = usize::MAX;
        true
    }

    /// Go back `n` rounds; false when already at the start
    pub fn step_back(&mut self, n: usize) -> bool {
        if self.position == 0 {
            return false;
        }
        self.position = self.position.saturating_sub(n);
        true
    }

    /// Move the thread selection within the current round
    pub fn select_thread(&mut self, delta: isize) {
        let Some(round) = self.current_round() else {
            return;
        };
        if round.threads.is_empty() {
            return;
        }
        let current = self
            .selected_thread
            .and_then(|id| round.threads.iter().position(|t| t.id == id))
            .unwrap_or(0);
        let count = round.threads.len() as isize;
        let next = (current as isize + delta).rem_euclid(count) as usize;
        let id = round.threads[next].id;
        self.selected_thread = Some(id);
        self.status_message = format!("Thread {}", id);
    }
}
