//! 重启驱动 - 通过 tmux 按键序列重启会话
//!
//! 序列：多次 Ctrl+C -> Ctrl+U -> `exit` + Enter -> 等待旧进程退出 -> 恢复命令 + Enter。
//! 恢复命令必须在旧进程释放终端之后发送，否则会被吞掉或与旧输入混在一起。

use crate::agent::AgentAdapter;
use crate::config::RestartTiming;
use crate::infra::{KeyInput, Multiplexer};
use anyhow::{anyhow, Result};
use serde::Serialize;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 重启目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartTarget {
    pub session_name: String,
    /// 会话所在 pane；缺省时按键发往 session 的活动 pane
    pub pane_id: Option<String>,
    pub working_dir: Option<String>,
}

/// 单个会话的重启结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestartOutcome {
    pub session: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 重启驱动
pub struct RestartDriver<'a> {
    mux: &'a dyn Multiplexer,
    timing: RestartTiming,
}

impl<'a> RestartDriver<'a> {
    pub fn new(mux: &'a dyn Multiplexer, timing: RestartTiming) -> Self {
        Self { mux, timing }
    }

    /// 对单个会话执行完整的按键序列，第一次发送失败即中止
    pub fn restart(&self, target: &RestartTarget, adapter: &dyn AgentAdapter) -> Result<()> {
        let name = target.pane_id.as_deref().unwrap_or(&target.session_name);
        info!(session = %target.session_name, pane = %name, agent = %adapter.kind().id(), "Restarting session");

        // 中断运行中的操作，并清掉提示符中的建议文本
        for _ in 0..self.timing.interrupt_count {
            self.send(name, &KeyInput::INTERRUPT, "Ctrl+C")?;
            self.pause(self.timing.interrupt_delay());
        }

        self.send(name, &KeyInput::CLEAR_LINE, "Ctrl+U")?;
        self.pause(self.timing.clear_delay());

        self.send(name, &KeyInput::literal("exit"), "exit")?;
        self.send(name, &KeyInput::SUBMIT, "Enter")?;

        self.pause(self.timing.exit_wait());

        let command = adapter.resume_command(target.working_dir.as_deref());
        debug!(pane = %name, command = %command, "Resuming");
        self.send(name, &KeyInput::Literal(command), "resume command")?;
        self.send(name, &KeyInput::SUBMIT, "Enter")?;

        info!(session = %target.session_name, "Session restarted");
        Ok(())
    }

    /// 依次重启多个会话；单个失败不影响后续会话
    pub fn restart_all<'s>(
        &self,
        targets: impl IntoIterator<Item = (RestartTarget, &'s dyn AgentAdapter)>,
    ) -> Vec<RestartOutcome> {
        targets
            .into_iter()
            .map(|(target, adapter)| match self.restart(&target, adapter) {
                Ok(()) => RestartOutcome {
                    session: target.session_name,
                    success: true,
                    error: None,
                },
                Err(e) => {
                    warn!(session = %target.session_name, error = %e, "Restart aborted");
                    RestartOutcome {
                        session: target.session_name,
                        success: false,
                        error: Some(e.to_string()),
                    }
                }
            })
            .collect()
    }

    fn send(&self, session: &str, keys: &KeyInput, step: &str) -> Result<()> {
        self.mux
            .send_keys(session, keys)
            .map_err(|e| anyhow!("failed to send {}: {}", step, e))
    }

    fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}
