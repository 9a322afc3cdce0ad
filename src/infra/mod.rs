//! 基础设施层 - tmux、进程、HTTP、终端文本

pub mod http;
pub mod process;
pub mod terminal;
pub mod tmux;

pub use http::HttpFetcher;
pub use process::{ProcessSource, RawProcess, SystemProcessSource};
pub use tmux::{KeyInput, Multiplexer, Pane, TmuxManager};
