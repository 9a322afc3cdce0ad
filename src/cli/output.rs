//! Output formatting for CLI commands
//!
//! Reports go to stdout, diagnostics to stderr.

use crate::agent::AgentKind;
use crate::config::OutputConfig;
use crate::infra::terminal::{shorten_path, truncate_left};
use crate::reconcile::{AgentVersions, ReconciledSession, SessionStatus};
use crate::version::compare;
use anyhow::{Context, Result};
use crossterm::style::{Color, Stylize};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt::Write as _;
use std::io::{self, Write as _};
use std::path::PathBuf;

fn write_text(out: &mut impl io::Write, text: &str) -> Result<()> {
    out.write_all(text.as_bytes())
        .and_then(|()| out.flush())
        .context("failed to write report")
}

fn write_json<T: Serialize>(out: &mut impl io::Write, data: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(data)?;
    writeln!(out, "{}", text)
        .and_then(|()| out.flush())
        .context("failed to write report")
}

/// Terminal printer configured once at startup
pub struct Printer {
    config: OutputConfig,
    home: Option<PathBuf>,
}

impl Printer {
    pub fn new(config: OutputConfig) -> Self {
        Self {
            config,
            home: dirs::home_dir(),
        }
    }

    /// Printer with a fixed home directory, for deterministic path shortening
    pub fn with_home(config: OutputConfig, home: Option<PathBuf>) -> Self {
        Self { config, home }
    }

    pub fn config(&self) -> OutputConfig {
        self.config
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.config.color {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn tag(&self, plain: &str, text: &str, color: Color) -> String {
        if self.config.plain {
            format!("[{}]", plain)
        } else {
            self.paint(text, color)
        }
    }

    pub fn json<T: Serialize>(&self, data: &T) -> Result<()> {
        write_json(&mut io::stdout().lock(), data)
    }

    pub fn error(&self, message: &str) {
        self.diagnostic(&self.tag("error", "error:", Color::Red), message);
    }

    pub fn warn(&self, message: &str) {
        self.diagnostic(&self.tag("warn", "warn:", Color::Yellow), message);
    }

    // stderr 写入失败时无处可报，直接忽略
    fn diagnostic(&self, tag: &str, message: &str) {
        let _ = writeln!(io::stderr().lock(), "{} {}", tag, message);
    }

    pub fn info(&self, message: &str) -> Result<()> {
        let line = format!("{} {}\n", self.tag("info", "info:", Color::Blue), message);
        self.print(&line)
    }

    pub fn success(&self, message: &str) -> Result<()> {
        let line = format!("{} {}\n", self.tag("ok", "ok:", Color::Green), message);
        self.print(&line)
    }

    /// 写入报告流；stdout 关闭等错误向上返回
    pub fn print(&self, text: &str) -> Result<()> {
        write_text(&mut io::stdout().lock(), text)
    }

    pub fn header(&self, title: &str) -> String {
        if self.config.plain {
            format!("=== {} ===\n", title)
        } else if self.config.color {
            format!("{}\n", title.bold())
        } else {
            format!("{}\n", title)
        }
    }

    /// One installed-version line with its update status
    pub fn version_line(&self, kind: AgentKind, versions: &AgentVersions, fetched: bool) -> String {
        let installed = if versions.installed.is_empty() {
            "not installed"
        } else {
            versions.installed.as_str()
        };

        let status = if !fetched {
            String::new()
        } else if versions.latest.is_empty() {
            self.paint("(couldn't fetch latest)", Color::DarkGrey)
        } else if versions.installed.is_empty() {
            String::new()
        } else if compare(&versions.installed, &versions.latest) != Ordering::Less {
            self.tag("current", "current", Color::Green)
        } else {
            self.tag(
                &format!("update: {}", versions.latest),
                &format!("update available: {}", versions.latest),
                Color::Yellow,
            )
        };

        format!("  {:<14} {}  {}", kind.display_name(), installed, status)
            .trim_end()
            .to_string()
            + "\n"
    }

    fn status_text(&self, entry: &ReconciledSession) -> String {
        match entry.status {
            SessionStatus::Current => self.tag("current", "current", Color::Green),
            SessionStatus::Unknown => self.tag("unknown", "unknown", Color::DarkGrey),
            SessionStatus::Outdated if entry.session.has_active_work => {
                if self.config.plain {
                    "[restart needed, busy]".to_string()
                } else {
                    self.paint("restart needed", Color::Yellow) + &self.paint(" (busy)", Color::DarkGrey)
                }
            }
            SessionStatus::Outdated => self.tag("restart needed", "restart needed", Color::Yellow),
            SessionStatus::OutdatedDetectionOnly => {
                if self.config.plain {
                    "[outdated, no tmux]".to_string()
                } else {
                    self.paint("outdated", Color::Yellow) + &self.paint(" (no tmux)", Color::DarkGrey)
                }
            }
        }
    }

    /// Session table with per-agent counts
    pub fn session_table(&self, sessions: &[ReconciledSession]) -> String {
        if sessions.is_empty() {
            return "  No agent sessions running\n".to_string();
        }

        let mut out = String::new();
        let counts: Vec<String> = AgentKind::ALL
            .iter()
            .map(|kind| {
                let n = sessions.iter().filter(|s| s.session.agent == *kind).count();
                format!("{} {}", n, kind.id())
            })
            .collect();
        let _ = writeln!(out, "  Found {} session(s)\n", counts.join(", "));

        let header = format!("{:<22} {:<40} {:<10} {}", "SESSION", "PATH", "VERSION", "STATUS");
        let _ = writeln!(out, "  {}", self.paint(&header, Color::DarkGrey));

        for entry in sessions {
            let session = &entry.session;
            let path = shorten_path(session.working_dir.as_deref().unwrap_or(""), self.home.as_deref());
            let path = if path.is_empty() { "-".to_string() } else { truncate_left(&path, 38) };
            let version = if session.running_version.is_empty() {
                "?"
            } else {
                session.running_version.as_str()
            };

            let _ = writeln!(
                out,
                "  {:<22} {:<40} {:<10} {}",
                session.label(),
                path,
                version,
                self.status_text(entry)
            );
        }

        out
    }

    /// Trailing hint when restartable sessions are outdated
    pub fn restart_hint(&self, needs_restart: usize) -> Option<String> {
        if needs_restart == 0 {
            None
        } else {
            Some(format!(
                "\n{} session(s) need restart. Run `av restart` to update them.\n",
                needs_restart
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::Session;

    fn plain() -> Printer {
        Printer::with_home(
            OutputConfig { json: false, plain: true, color: false },
            Some(PathBuf::from("/home/dev")),
        )
    }

    fn uncolored() -> Printer {
        Printer::with_home(OutputConfig::default(), Some(PathBuf::from("/home/dev")))
    }

    fn entry(tmux: Option<&str>, version: &str, status: SessionStatus, active: bool) -> ReconciledSession {
        ReconciledSession {
            session: Session {
                pid: 4242,
                agent: AgentKind::Claude,
                tty: Some("pts/1".to_string()),
                running_version: version.to_string(),
                command: "claude".to_string(),
                tmux_session: tmux.map(|t| t.to_string()),
                pane_id: None,
                working_dir: tmux.map(|_| "/home/dev/repos/api".to_string()),
                has_active_work: active,
            },
            status,
            installed_version: "2.1.14".to_string(),
        }
    }

    fn versions(installed: &str, latest: &str) -> AgentVersions {
        AgentVersions {
            installed: installed.to_string(),
            latest: latest.to_string(),
        }
    }

    #[test]
    fn test_version_line_states() {
        let p = uncolored();
        assert!(p.version_line(AgentKind::Claude, &versions("2.1.14", "2.1.14"), true).contains("current"));
        assert!(p
            .version_line(AgentKind::Claude, &versions("2.1.11", "2.1.14"), true)
            .contains("update available: 2.1.14"));
        assert!(p
            .version_line(AgentKind::Codex, &versions("0.80.0", ""), true)
            .contains("(couldn't fetch latest)"));
        assert!(p.version_line(AgentKind::Codex, &versions("", "0.80.0"), true).contains("not installed"));
    }

    #[test]
    fn test_version_line_without_fetch_has_no_status() {
        let line = uncolored().version_line(AgentKind::Claude, &versions("2.1.14", ""), false);
        assert_eq!(line, "  Claude Code    2.1.14\n");
    }

    #[test]
    fn test_plain_tags() {
        let line = plain().version_line(AgentKind::Claude, &versions("2.1.11", "2.1.14"), true);
        assert!(line.contains("[update: 2.1.14]"));
    }

    #[test]
    fn test_session_table_labels() {
        let p = plain();
        let table = p.session_table(&[
            entry(Some("api"), "2.1.11", SessionStatus::Outdated, false),
            entry(None, "2.1.11", SessionStatus::OutdatedDetectionOnly, false),
            entry(Some("busy"), "2.1.11", SessionStatus::Outdated, true),
            entry(Some("fresh"), "2.1.14", SessionStatus::Current, false),
            entry(Some("odd"), "", SessionStatus::Unknown, false),
        ]);

        assert!(table.contains("Found 5 claude, 0 codex session(s)"));
        assert!(table.contains("~/repos/api"));
        assert!(table.contains("[restart needed]"));
        assert!(table.contains("pid:4242"));
        assert!(table.contains("[outdated, no tmux]"));
        assert!(table.contains("[restart needed, busy]"));
        assert!(table.contains("[current]"));
        assert!(table.contains("[unknown]"));
    }

    #[test]
    fn test_empty_session_table() {
        assert_eq!(plain().session_table(&[]), "  No agent sessions running\n");
    }

    #[test]
    fn test_restart_hint() {
        assert_eq!(plain().restart_hint(0), None);
        assert!(plain().restart_hint(2).unwrap().contains("2 session(s) need restart"));
    }

    /// 模拟已关闭的 stdout
    struct ClosedPipe;

    impl io::Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_closed_report_stream_is_an_error() {
        // Given: 读端已关闭的输出流
        let mut out = ClosedPipe;

        // When: 写入报告
        let text = write_text(&mut out, "report\n");
        let json = write_json(&mut out, &serde_json::json!({ "restarted": [] }));

        // Then: 返回错误而不是 panic
        assert!(format!("{:#}", text.unwrap_err()).contains("failed to write report"));
        assert!(json.is_err());
    }

    #[test]
    fn test_report_written_to_stream() {
        let mut out = Vec::new();
        write_json(&mut out, &serde_json::json!({ "a": 1 })).unwrap();
        write_text(&mut out, "done\n").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{\n  \"a\": 1\n}\ndone\n");
    }

    #[test]
    fn test_plain_header() {
        assert_eq!(plain().header("Running Sessions"), "=== Running Sessions ===\n");
    }
}
