//! 会话定位 - 从进程列表中找出代理会话并确定实际运行的版本

use super::Session;
use crate::agent::AgentAdapter;
use crate::infra::{ProcessSource, RawProcess};
use std::collections::HashSet;
use tracing::{debug, warn};

/// 列出进程一次，定位所有代理的会话
///
/// 进程枚举失败时返回空列表。
pub fn find_agent_sessions(adapters: &[Box<dyn AgentAdapter>], source: &dyn ProcessSource) -> Vec<Session> {
    let processes = match source.list_processes() {
        Ok(processes) => processes,
        Err(e) => {
            warn!(error = %e, "Process enumeration failed");
            return Vec::new();
        }
    };

    adapters
        .iter()
        .flat_map(|adapter| locate_sessions(adapter.as_ref(), &processes, source))
        .collect()
}

/// 定位单个代理类型的会话
///
/// - 命令行第一个 token 必须与启动器名完全相同
/// - 没有控制终端的进程被忽略
/// - 同一终端只保留第一个进程
pub fn locate_sessions(
    adapter: &dyn AgentAdapter,
    processes: &[RawProcess],
    source: &dyn ProcessSource,
) -> Vec<Session> {
    let mut seen_ttys = HashSet::new();
    let mut sessions = Vec::new();

    for process in processes {
        if process.command.split_whitespace().next() != Some(adapter.launcher()) {
            continue;
        }

        let Some(tty) = process.tty.as_deref() else {
            continue;
        };

        if !seen_ttys.insert(tty.to_string()) {
            debug!(pid = process.pid, tty = %tty, "Skipping duplicate tty");
            continue;
        }

        let running_version = resolve_running_version(adapter, process.pid, source);
        debug!(
            pid = process.pid,
            agent = %adapter.kind().id(),
            tty = %tty,
            version = %running_version,
            "Found agent session"
        );

        sessions.push(Session {
            pid: process.pid,
            agent: adapter.kind(),
            tty: Some(tty.to_string()),
            running_version,
            command: process.command.clone(),
            tmux_session: None,
            pane_id: None,
            working_dir: None,
            has_active_work: false,
        });
    }

    sessions
}

/// 从直接子进程中找出实际加载的二进制版本
///
/// 启动器通常只是一个 shim，子进程的二进制路径才反映内存中运行的版本。
fn resolve_running_version(adapter: &dyn AgentAdapter, pid: u32, source: &dyn ProcessSource) -> String {
    match source.children_of(pid) {
        Ok(children) => children
            .iter()
            .find_map(|child| adapter.running_version(child))
            .unwrap_or_default(),
        Err(e) => {
            debug!(pid, error = %e, "Child lookup failed");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{get_adapter, AgentKind};
    use crate::config::Config;
    use anyhow::{anyhow, Result};
    use std::collections::HashMap;

    struct FakeProcesses {
        processes: Vec<RawProcess>,
        children: HashMap<u32, Vec<RawProcess>>,
    }

    impl ProcessSource for FakeProcesses {
        fn list_processes(&self) -> Result<Vec<RawProcess>> {
            Ok(self.processes.clone())
        }

        fn children_of(&self, pid: u32) -> Result<Vec<RawProcess>> {
            self.children
                .get(&pid)
                .cloned()
                .ok_or_else(|| anyhow!("no such process"))
        }
    }

    struct FailingProcesses;

    impl ProcessSource for FailingProcesses {
        fn list_processes(&self) -> Result<Vec<RawProcess>> {
            Err(anyhow!("ps not found"))
        }

        fn children_of(&self, _pid: u32) -> Result<Vec<RawProcess>> {
            Err(anyhow!("ps not found"))
        }
    }

    fn claude_child(pid: u32, version: &str) -> RawProcess {
        RawProcess::new(pid, None, &format!("/home/dev/.local/share/claude/versions/{}", version))
    }

    #[test]
    fn test_exact_launcher_match() {
        // Given: 命令行中提到 claude 但不是以它启动的进程
        let source = FakeProcesses {
            processes: vec![
                RawProcess::new(10, Some("ttys001"), "claude --continue"),
                RawProcess::new(11, Some("ttys002"), "vim claude.md"),
                RawProcess::new(12, Some("ttys003"), "claude-helper"),
            ],
            children: HashMap::new(),
        };
        let adapter = get_adapter(AgentKind::Claude, &Config::default());

        // When: 定位
        let sessions = locate_sessions(adapter.as_ref(), &source.processes, &source);

        // Then: 只匹配第一个 token 完全相同的进程
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].pid, 10);
    }

    #[test]
    fn test_background_processes_rejected() {
        let source = FakeProcesses {
            processes: vec![RawProcess::new(10, None, "claude -p hello")],
            children: HashMap::new(),
        };
        let adapter = get_adapter(AgentKind::Claude, &Config::default());
        assert!(locate_sessions(adapter.as_ref(), &source.processes, &source).is_empty());
    }

    #[test]
    fn test_dedup_keeps_first_process_per_tty() {
        // Given: 三个进程共享同一终端
        let source = FakeProcesses {
            processes: vec![
                RawProcess::new(20, Some("ttys004"), "claude"),
                RawProcess::new(21, Some("ttys004"), "claude --resume abc"),
                RawProcess::new(22, Some("ttys004"), "claude --continue"),
            ],
            children: HashMap::from([
                (20, vec![claude_child(30, "2.1.11")]),
                (21, vec![claude_child(31, "2.1.14")]),
            ]),
        };
        let adapter = get_adapter(AgentKind::Claude, &Config::default());

        // When: 定位
        let sessions = locate_sessions(adapter.as_ref(), &source.processes, &source);

        // Then: 只保留第一个进程的属性
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].pid, 20);
        assert_eq!(sessions[0].command, "claude");
        assert_eq!(sessions[0].running_version, "2.1.11");
    }

    #[test]
    fn test_running_version_from_children() {
        let source = FakeProcesses {
            processes: vec![RawProcess::new(40, Some("pts/1"), "claude")],
            children: HashMap::from([(
                40,
                vec![RawProcess::new(41, None, "node mcp-server.js"), claude_child(42, "2.1.14")],
            )]),
        };
        let adapter = get_adapter(AgentKind::Claude, &Config::default());
        let sessions = locate_sessions(adapter.as_ref(), &source.processes, &source);
        assert_eq!(sessions[0].running_version, "2.1.14");
    }

    #[test]
    fn test_child_lookup_failure_yields_empty_version() {
        let source = FakeProcesses {
            processes: vec![RawProcess::new(50, Some("pts/2"), "codex")],
            children: HashMap::new(),
        };
        let adapter = get_adapter(AgentKind::Codex, &Config::default());
        let sessions = locate_sessions(adapter.as_ref(), &source.processes, &source);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].running_version, "");
    }

    #[test]
    fn test_enumeration_failure_yields_no_sessions() {
        let adapters = crate::agent::all_adapters(&Config::default());
        assert!(find_agent_sessions(&adapters, &FailingProcesses).is_empty());
    }

    #[test]
    fn test_same_tty_different_agents_kept() {
        let source = FakeProcesses {
            processes: vec![
                RawProcess::new(60, Some("pts/3"), "claude"),
                RawProcess::new(61, Some("pts/3"), "codex"),
            ],
            children: HashMap::new(),
        };
        let adapters = crate::agent::all_adapters(&Config::default());
        let sessions = find_agent_sessions(&adapters, &source);
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].agent, AgentKind::Claude);
        assert_eq!(sessions[1].agent, AgentKind::Codex);
    }
}
