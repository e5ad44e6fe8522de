// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Draws cards in a raw-mode terminal and reads single keystrokes.

use std::io::Stdout;
use std::io::Write;
use std::io::stdout;

use crossterm::cursor::MoveTo;
use crossterm::event::Event;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::event::read;
use crossterm::queue;
use crossterm::style::Stylize;
use crossterm::terminal::Clear;
use crossterm::terminal::ClearType;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use flash_core::error::Fallible;
use flash_core::queue::Stats;
use flash_core::session::CardView;
use flash_core::session::Presenter;
use flash_core::session::Prompt;
use flash_core::session::Reply;

const INDENT: &str = "  ";
const SEPARATOR: &str = "·";
const OUTCOME_PROMPT: &str = "(1: correct, 2: incorrect, u: undo, h: help)";

const HELP: &[&str] = &[
    "any key  reveal the next side",
    "1        correct",
    "2        incorrect (so does any other key)",
    "u        undo the last answer",
    "h, ?     show this help",
    "ctrl-z   suspend",
    "ctrl-c   quit",
    "",
    "press any key to go back",
];

/// Key colour, by how far along the card is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tone {
    FirstTurn,
    Reviewing,
    LastTurn,
}

#[derive(Debug, PartialEq, Eq)]
enum Line {
    Blank,
    /// The previous answer: a check, a cross, or nothing.
    Mark(Option<bool>),
    Stats(Stats),
    Fact {
        key: String,
        /// Width the separator is right-aligned in.
        width: usize,
        text: String,
        tone: Tone,
    },
    Prompt,
}

impl Line {
    fn render(&self) -> String {
        match self {
            Line::Blank => String::new(),
            Line::Mark(None) => String::new(),
            Line::Mark(Some(true)) => "✔︎".dark_grey().to_string(),
            Line::Mark(Some(false)) => "✘".dark_grey().to_string(),
            Line::Stats(stats) => format!(
                "{INDENT}{} pending : {} waiting : {} done",
                stats.pending.to_string().magenta(),
                stats.waiting.to_string().cyan(),
                stats.done.to_string().green(),
            ),
            Line::Fact {
                key,
                width,
                text,
                tone,
            } => {
                let key = match tone {
                    Tone::FirstTurn => key.as_str().magenta(),
                    Tone::Reviewing => key.as_str().cyan(),
                    Tone::LastTurn => key.as_str().green(),
                };
                format!("{INDENT}{key} {SEPARATOR:>width$} {text}")
            }
            Line::Prompt => format!("{INDENT}{OUTCOME_PROMPT} "),
        }
    }
}

fn layout(view: &CardView) -> Vec<Line> {
    let card = view.card;
    let mut lines = vec![
        Line::Mark(view.previous),
        Line::Blank,
        Line::Stats(view.stats),
        Line::Blank,
    ];
    let longest = card
        .sides()
        .iter()
        .flatten()
        .map(|key| key.chars().count())
        .max()
        .unwrap_or(0);
    let tone = if card.is_first_turn() {
        Tone::FirstTurn
    } else if card.is_last_turn() {
        Tone::LastTurn
    } else {
        Tone::Reviewing
    };
    for side in 0..view.revealed {
        for (key, text) in card.side_facts(side) {
            lines.push(Line::Fact {
                key: key.to_string(),
                width: longest - key.chars().count() + 2,
                text: text.to_string(),
                tone,
            });
        }
    }
    if view.revealed >= card.sides().len() {
        lines.push(Line::Blank);
        lines.push(Line::Prompt);
    }
    lines
}

fn reply_for(key: KeyEvent, prompt: Prompt) -> Reply {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('d') => return Reply::Quit,
            KeyCode::Char('z') => return Reply::Pause,
            _ => {}
        }
    }
    match (key.code, prompt) {
        (KeyCode::Char('u'), _) => Reply::Undo,
        (KeyCode::Char('h') | KeyCode::Char('?'), _) => Reply::Help,
        (KeyCode::Char('1'), Prompt::Outcome) => Reply::Correct,
        (KeyCode::Char('2'), Prompt::Outcome) => Reply::Incorrect,
        _ => Reply::Continue,
    }
}

/// Holds the terminal in raw mode for as long as it lives.
pub struct TerminalPresenter {
    out: Stdout,
}

impl TerminalPresenter {
    pub fn new() -> Fallible<Self> {
        enable_raw_mode()?;
        Ok(Self { out: stdout() })
    }

    fn draw(&mut self, lines: impl IntoIterator<Item = String>) -> Fallible<()> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        for line in lines {
            // Raw mode does not translate newlines.
            write!(self.out, "{line}\r\n")?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn read_key(&mut self) -> Fallible<KeyEvent> {
        loop {
            if let Event::Key(key) = read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(key);
                }
            }
        }
    }
}

impl Presenter for TerminalPresenter {
    fn render(&mut self, view: &CardView) -> Fallible<()> {
        let lines: Vec<String> = layout(view).iter().map(Line::render).collect();
        self.draw(lines)
    }

    fn read(&mut self, prompt: Prompt) -> Fallible<Reply> {
        let key = self.read_key()?;
        let reply = reply_for(key, prompt);
        log::debug!("Key {:?} at {prompt:?} read as {reply:?}.", key.code);
        Ok(reply)
    }

    fn help(&mut self) -> Fallible<()> {
        let lines = std::iter::once(String::new())
            .chain(HELP.iter().map(|line| format!("{INDENT}{line}")));
        self.draw(lines)?;
        self.read_key()?;
        Ok(())
    }

    fn pause(&mut self) -> Fallible<()> {
        disable_raw_mode()?;
        // A failed suspend leaves the review running.
        if let Err(e) = suspend() {
            log::debug!("Failed to suspend: {e}.");
        }
        enable_raw_mode()?;
        Ok(())
    }
}

impl Drop for TerminalPresenter {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Stop this process as the shell's Ctrl-Z would. Returns once resumed.
#[cfg(unix)]
fn suspend() -> std::io::Result<()> {
    // SAFETY: `raise` has no memory-safety preconditions.
    if unsafe { libc::raise(libc::SIGTSTP) } != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(unix))]
fn suspend() -> std::io::Result<()> {
    log::debug!("Suspending is not supported on this platform.");
    Ok(())
}
