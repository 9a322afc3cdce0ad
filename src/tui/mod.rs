//! 交互式重启选择器

mod app;
mod event;
mod picker;
mod ui;

pub use app::{run, Tui};
pub use event::key_to_input;
pub use picker::{Picker, PickerInput, PickerOutcome, PickerState, PlanItem};
pub use ui::{picker_height, picker_lines, render};
