//! 进程枚举模块 - 列出系统进程及其子进程

use anyhow::{anyhow, Context, Result};
use std::cell::OnceCell;
use std::process::Command;
use sysinfo::{Pid, System};
use tracing::debug;

/// 原始进程条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProcess {
    pub pid: u32,
    /// 控制终端（如 `ttys003`、`pts/4`），后台进程为 None
    pub tty: Option<String>,
    /// 完整命令行
    pub command: String,
    /// 可执行文件路径（进程树查询时可用）
    pub executable: Option<String>,
}

impl RawProcess {
    pub fn new(pid: u32, tty: Option<&str>, command: &str) -> Self {
        Self {
            pid,
            tty: tty.map(|t| t.to_string()),
            command: command.to_string(),
            executable: None,
        }
    }
}

/// 进程信息来源
pub trait ProcessSource {
    /// 列出所有进程 (pid, tty, 命令行)
    fn list_processes(&self) -> Result<Vec<RawProcess>>;

    /// 列出指定 PID 的直接子进程
    fn children_of(&self, pid: u32) -> Result<Vec<RawProcess>>;
}

/// 基于 `ps` 和 sysinfo 的系统进程来源
///
/// `ps` 提供控制终端信息；进程树（父子关系、可执行路径）由 sysinfo 提供，
/// 首次查询子进程时才加载。
pub struct SystemProcessSource {
    system: OnceCell<System>,
}

impl SystemProcessSource {
    pub fn new() -> Self {
        Self {
            system: OnceCell::new(),
        }
    }

    fn system(&self) -> &System {
        self.system.get_or_init(|| {
            let mut system = System::new_all();
            system.refresh_all();
            system
        })
    }
}

impl Default for SystemProcessSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessSource for SystemProcessSource {
    fn list_processes(&self) -> Result<Vec<RawProcess>> {
        let output = Command::new("ps")
            .args(["-eo", "pid=,tty=,command="])
            .output()
            .context("failed to run ps")?;

        if !output.status.success() {
            return Err(anyhow!("ps exited with {}", output.status));
        }

        let processes = parse_ps_output(&String::from_utf8_lossy(&output.stdout));
        debug!(count = processes.len(), "Listed processes");
        Ok(processes)
    }

    fn children_of(&self, pid: u32) -> Result<Vec<RawProcess>> {
        let parent = Pid::from_u32(pid);
        let mut children: Vec<RawProcess> = self
            .system()
            .processes()
            .iter()
            .filter(|(_, process)| process.parent() == Some(parent))
            .map(|(child_pid, process)| RawProcess {
                pid: child_pid.as_u32(),
                tty: None,
                command: process
                    .cmd()
                    .iter()
                    .map(|s| s.to_string_lossy().to_string())
                    .collect::<Vec<_>>()
                    .join(" "),
                executable: process.exe().map(|p| p.to_string_lossy().to_string()),
            })
            .collect();

        // 进程表是 HashMap，排序保证结果稳定
        children.sort_by_key(|c| c.pid);
        Ok(children)
    }
}

/// 解析 `ps -eo pid=,tty=,command=` 输出
pub fn parse_ps_output(output: &str) -> Vec<RawProcess> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let pid = fields.next()?.parse::<u32>().ok()?;
            let tty = fields.next()?;
            let command = fields.collect::<Vec<_>>().join(" ");
            if command.is_empty() {
                return None;
            }
            Some(RawProcess::new(pid, normalize_tty(tty), &command))
        })
        .collect()
}

/// `?` / `??` / `-` 表示没有控制终端
fn normalize_tty(tty: &str) -> Option<&str> {
    match tty {
        "" | "?" | "??" | "-" => None,
        other => Some(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ps_output() {
        // Given: macOS 风格的 ps 输出
        let output = "  101 ttys003  claude --continue\n  202 ??       /usr/sbin/cfprefsd agent\n  303 pts/4    codex\n";

        // When: 解析
        let processes = parse_ps_output(output);

        // Then: 三条记录，后台进程没有 tty
        assert_eq!(processes.len(), 3);
        assert_eq!(processes[0], RawProcess::new(101, Some("ttys003"), "claude --continue"));
        assert_eq!(processes[1].tty, None);
        assert_eq!(processes[2].tty.as_deref(), Some("pts/4"));
        assert_eq!(processes[2].command, "codex");
    }

    #[test]
    fn test_parse_ps_output_skips_malformed_lines() {
        let output = "\nabc ttys001 claude\n  12 ttys002\n  13 ?  node server.js\n";
        let processes = parse_ps_output(output);
        assert_eq!(processes.len(), 1);
        assert_eq!(processes[0].pid, 13);
        assert_eq!(processes[0].tty, None);
    }
}
