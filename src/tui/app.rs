//! 选择器主循环

use crate::tui::{key_to_input, picker_height, render, Picker, PickerOutcome};
use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use ratatui::backend::CrosstermBackend;
use ratatui::{Terminal, TerminalOptions, Viewport};
use std::io::{self, Stderr};
use tracing::debug;

pub type Tui = Terminal<CrosstermBackend<Stderr>>;

/// 退出时恢复终端模式
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            debug!(error = %e, "Failed to disable raw mode");
        }
    }
}

/// 在 stderr 上以内联视图运行选择器，直到确认或取消
pub fn run(mut picker: Picker) -> Result<PickerOutcome> {
    if let Some(outcome) = picker.outcome() {
        return Ok(outcome);
    }

    let _guard = RawModeGuard::enable()?;
    let mut terminal: Tui = Terminal::with_options(
        CrosstermBackend::new(io::stderr()),
        TerminalOptions {
            viewport: Viewport::Inline(picker_height(&picker)),
        },
    )
    .context("failed to initialize terminal")?;

    let home = dirs::home_dir();
    let outcome = loop {
        terminal.draw(|frame| render(frame, &picker, home.as_deref()))?;

        if let Event::Key(key) = event::read()? {
            if let Some(outcome) = key_to_input(key).and_then(|input| picker.handle(input)) {
                break outcome;
            }
        }
    };

    terminal.clear()?;
    Ok(outcome)
}
