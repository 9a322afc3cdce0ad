//! 会话扫描 - 进程定位、pane 关联、活动检测

pub mod activity;
pub mod correlate;
pub mod locator;

pub use activity::{classify_sessions, detect_activity, ActivityClassifier, PaneActivityClassifier};
pub use correlate::{attach_panes, correlate_with};
pub use locator::{find_agent_sessions, locate_sessions};

use crate::agent::{AgentAdapter, AgentKind};
use crate::infra::{Multiplexer, ProcessSource};
use serde::Serialize;

/// 一个正在运行的代理会话
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub pid: u32,
    pub agent: AgentKind,
    /// 控制终端，pane 关联的键
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tty: Option<String>,
    /// 实际加载的二进制版本，无法确定时为空
    pub running_version: String,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmux_session: Option<String>,
    /// 会话所在的 pane（如 `%3`），按键与捕获的精确目标
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pane_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub has_active_work: bool,
}

impl Session {
    /// 能否通过复用器重启
    pub fn is_restartable(&self) -> bool {
        self.tty.is_some() && self.tmux_session.is_some()
    }

    /// 复用器命令的目标：优先 pane id，否则 session 名（指向其活动 pane）
    pub fn mux_target(&self) -> Option<&str> {
        self.pane_id.as_deref().or(self.tmux_session.as_deref())
    }

    /// 显示用的名称：tmux session 名，或 `pid:<pid>`
    pub fn label(&self) -> String {
        match &self.tmux_session {
            Some(name) => name.clone(),
            None => format!("pid:{}", self.pid),
        }
    }
}

/// 完整扫描：定位会话，关联 pane，检测活动状态
pub fn scan_sessions(
    adapters: &[Box<dyn AgentAdapter>],
    processes: &dyn ProcessSource,
    mux: &dyn Multiplexer,
    capture_lines: u32,
) -> Vec<Session> {
    let mut sessions = find_agent_sessions(adapters, processes);
    correlate_with(&mut sessions, mux);

    let classifier = PaneActivityClassifier::new(mux, capture_lines);
    classify_sessions(&mut sessions, &classifier);

    sessions
}
