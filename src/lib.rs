//! Agent Versions - 编码代理的版本检查与会话重启

pub mod cli;
pub mod config;
pub mod infra;
pub mod reconcile;
pub mod restart;
pub mod scan;
pub mod tui;
pub mod version;
#[path = "agent_mod/mod.rs"]
pub mod agent;

pub use agent::{all_adapters, get_adapter, AgentAdapter, AgentKind};
pub use config::{Config, OutputConfig, RestartTiming};
pub use infra::{Multiplexer, ProcessSource, RawProcess, SystemProcessSource, TmuxManager};
pub use reconcile::{reconcile, InstalledVersionSet, ReconciledSession, SessionStatus, StatusReport};
pub use restart::{RestartDriver, RestartOutcome, RestartTarget};
pub use scan::{scan_sessions, Session};
