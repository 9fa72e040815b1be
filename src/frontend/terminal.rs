//! Terminal frontend using crossterm
//!
//! Stimuli are drawn as centred text labels. Key events are read while the
//! task waits and timestamped on arrival, so presses during a timed phase
//! keep their time when they are consumed later.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{
    cursor, execute, queue,
    style::{Print, ResetColor},
    terminal::{self, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::collections::VecDeque;
use std::io::{stdout, Write};
use std::time::{Duration, Instant};

use super::{Frontend, KeyPress};
use crate::error::{ExperimentError, Result};
use crate::stimuli::Stimulus;

const POLL_SLICE: Duration = Duration::from_millis(2);

pub struct TerminalFrontend {
    exit_key: String,
    auto_draw: Vec<Stimulus>,
    pending: VecDeque<(String, Instant)>,
    active: bool,
}

/// Name of a key as written in the config (`space`, `escape`, `return`, `a`, ...).
pub fn key_name(key: &KeyEvent) -> Option<String> {
    if let KeyCode::Char('c') = key.code {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some("escape".to_string());
        }
    }
    let name = match key.code {
        KeyCode::Char(' ') => "space".to_string(),
        KeyCode::Char(c) => c.to_lowercase().to_string(),
        KeyCode::Esc => "escape".to_string(),
        KeyCode::Enter => "return".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::F(n) => format!("f{}", n),
        _ => return None,
    };
    Some(name)
}

/// Removes presses of `keys` from `pending`, timed from `since`. Presses of
/// the exit key stay queued and everything else is dropped.
fn take_keys(
    pending: &mut VecDeque<(String, Instant)>,
    keys: &[String],
    exit_key: &str,
    since: Instant,
) -> Vec<KeyPress> {
    let mut pressed = Vec::new();
    let mut kept = VecDeque::new();
    for (key, at) in pending.drain(..) {
        if keys.contains(&key) {
            let rt = at.saturating_duration_since(since).as_secs_f64();
            pressed.push(KeyPress { key, rt });
        } else if key == exit_key {
            kept.push_back((key, at));
        }
    }
    *pending = kept;
    pressed
}

impl TerminalFrontend {
    pub fn new(exit_key: &str) -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = stdout();
        execute!(out, EnterAlternateScreen, cursor::Hide)?;
        Ok(Self {
            exit_key: exit_key.to_string(),
            auto_draw: Vec::new(),
            pending: VecDeque::new(),
            active: true,
        })
    }

    /// Move key events from the terminal into the pending queue, waiting at most `timeout`.
    fn pump(&mut self, timeout: Duration) -> Result<()> {
        let mut timeout = timeout;
        while event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(name) = key_name(&key) {
                        self.pending.push_back((name, Instant::now()));
                    }
                }
            }
            timeout = Duration::ZERO;
        }
        Ok(())
    }

    fn draw_lines(&self, lines: &[&str]) -> Result<()> {
        let mut out = stdout();
        let (width, height) = terminal::size()?;
        queue!(out, terminal::Clear(ClearType::All))?;

        let top = (height as usize).saturating_sub(lines.len()) / 2;
        for (i, line) in lines.iter().enumerate() {
            let len = line.chars().count();
            let left = (width as usize).saturating_sub(len) / 2;
            queue!(
                out,
                cursor::MoveTo(left as u16, (top + i) as u16),
                Print(line),
                ResetColor
            )?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn shutdown(&mut self) -> Result<()> {
        if self.active {
            self.active = false;
            let mut out = stdout();
            execute!(out, cursor::Show, LeaveAlternateScreen)?;
            terminal::disable_raw_mode()?;
        }
        Ok(())
    }
}

impl Frontend for TerminalFrontend {
    fn set_auto_draw(&mut self, stimulus: &Stimulus, on: bool) {
        self.auto_draw.retain(|s| s.name != stimulus.name);
        if on {
            self.auto_draw.push(stimulus.clone());
        }
    }

    fn flip(&mut self) -> Result<Instant> {
        let lines: Vec<&str> = self.auto_draw.iter().map(|s| s.label()).collect();
        self.draw_lines(&lines)?;
        Ok(Instant::now())
    }

    fn wait(&mut self, duration: Duration) -> Result<()> {
        let deadline = Instant::now() + duration;
        loop {
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            self.pump((deadline - now).min(POLL_SLICE))?;
        }
    }

    fn clear_events(&mut self) {
        // A failed poll leaves nothing to clear.
        let _ = self.pump(Duration::ZERO);
        self.pending.clear();
    }

    fn wait_keys(
        &mut self,
        keys: &[String],
        max_wait: Duration,
        since: Instant,
    ) -> Result<Option<Vec<KeyPress>>> {
        let deadline = Instant::now() + max_wait;
        loop {
            let pressed = take_keys(&mut self.pending, keys, &self.exit_key, since);
            if !pressed.is_empty() {
                return Ok(Some(pressed));
            }
            // the caller's exit check picks up the kept exit key
            if !self.pending.is_empty() {
                return Ok(None);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            self.pump((deadline - now).min(POLL_SLICE))?;
        }
    }

    fn exit_requested(&mut self) -> Result<bool> {
        self.pump(Duration::ZERO)?;
        Ok(self.pending.iter().any(|(key, _)| *key == self.exit_key))
    }

    fn show_info(&mut self, text: &str, duration: Option<Duration>) -> Result<()> {
        let lines: Vec<&str> = text.lines().collect();
        self.draw_lines(&lines)?;

        match duration {
            Some(duration) => self.wait(duration)?,
            None => {
                self.clear_events();
                while self.pending.is_empty() {
                    self.pump(Duration::from_millis(50))?;
                }
            }
        }
        if self.pending.iter().any(|(key, _)| *key == self.exit_key) {
            return Err(ExperimentError::ExitRequested);
        }
        self.pending.clear();
        self.flip()?;
        Ok(())
    }
}

impl Drop for TerminalFrontend {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}
