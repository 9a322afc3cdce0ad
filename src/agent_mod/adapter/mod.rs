// src/agent_mod/adapter/mod.rs
//! Agent CLI 适配器模块
//!
//! 每种代理一个实现：运行版本识别、已安装版本、最新版本查询、恢复命令。

use crate::agent::AgentKind;
use crate::config::Config;
use crate::infra::{HttpFetcher, RawProcess};
use std::process::Command;
use tracing::debug;

/// Agent CLI 适配器 trait
pub trait AgentAdapter {
    /// 获取 Agent 类型
    fn kind(&self) -> AgentKind;

    /// 获取启动命令
    fn launcher(&self) -> &str {
        self.kind().launcher()
    }

    /// 从子进程的命令行或可执行路径中识别实际运行的版本
    fn running_version(&self, child: &RawProcess) -> Option<String>;

    /// 当前安装在磁盘上的版本，无法确定时为空字符串
    fn installed_version(&self) -> String;

    /// 远程最新版本，任何失败都返回空字符串
    fn latest_version(&self, http: &HttpFetcher) -> String;

    /// 重启后在 shell 中执行的恢复命令
    fn resume_command(&self, working_dir: Option<&str>) -> String;
}

/// 获取适配器
pub fn get_adapter(kind: AgentKind, config: &Config) -> Box<dyn AgentAdapter> {
    match kind {
        AgentKind::Claude => Box::new(claude::ClaudeAdapter::new(config.claude_projects_dir())),
        AgentKind::Codex => Box::new(codex::CodexAdapter),
    }
}

/// 所有代理的适配器，顺序与 `AgentKind::ALL` 一致
pub fn all_adapters(config: &Config) -> Vec<Box<dyn AgentAdapter>> {
    AgentKind::ALL
        .iter()
        .map(|kind| get_adapter(*kind, config))
        .collect()
}

/// 运行 `<binary> --version`，返回去掉首尾空白的输出
fn run_version_command(binary: &str) -> Option<String> {
    let path = which::which(binary).ok()?;
    let output = Command::new(&path).arg("--version").output().ok()?;
    if !output.status.success() {
        debug!(binary = %binary, status = %output.status, "--version failed");
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// 子进程的命令行和可执行路径，依次匹配
fn child_haystacks(child: &RawProcess) -> impl Iterator<Item = &str> {
    std::iter::once(child.command.as_str()).chain(child.executable.as_deref())
}

pub mod claude;
pub mod codex;
