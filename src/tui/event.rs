//! 事件处理模块

use crate::tui::PickerInput;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// 按键映射为选择器输入
pub fn key_to_input(key: KeyEvent) -> Option<PickerInput> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(PickerInput::Quit),
        KeyCode::Char('q') | KeyCode::Esc => Some(PickerInput::Quit),
        KeyCode::Enter => Some(PickerInput::Confirm),
        KeyCode::Char('k') | KeyCode::Up => Some(PickerInput::Up),
        KeyCode::Char('j') | KeyCode::Down => Some(PickerInput::Down),
        KeyCode::Char(' ') | KeyCode::Char('x') => Some(PickerInput::Toggle),
        KeyCode::Char('a') => Some(PickerInput::SelectAll),
        KeyCode::Char('n') => Some(PickerInput::SelectNone),
        _ => None,
    }
}
