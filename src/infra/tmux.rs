//! tmux 管理模块 - 封装 tmux 操作

use anyhow::{anyhow, Context, Result};
use std::process::{Command, Stdio};
use tracing::{debug, error};

/// tmux pane 信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pane {
    /// tmux pane id，如 `%3`
    pub id: String,
    /// pane 的终端设备路径，如 `/dev/ttys003`
    pub tty: String,
    pub session: String,
    pub path: String,
}

/// 发送给 session 的按键
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyInput {
    /// tmux 按键名，如 `C-c`、`C-u`、`Enter`
    Key(&'static str),
    /// 字面文本，使用 `-l` 发送，避免被解释为按键名
    Literal(String),
}

impl KeyInput {
    pub const INTERRUPT: KeyInput = KeyInput::Key("C-c");
    pub const CLEAR_LINE: KeyInput = KeyInput::Key("C-u");
    pub const SUBMIT: KeyInput = KeyInput::Key("Enter");

    pub fn literal(text: &str) -> Self {
        KeyInput::Literal(text.to_string())
    }
}

/// 终端复用器接口
pub trait Multiplexer {
    /// 复用器是否可用（已安装且 server 在运行）
    fn is_available(&self) -> bool;

    /// 列出所有 pane
    fn list_panes(&self) -> Result<Vec<Pane>>;

    /// 捕获目标最后 N 行输出；目标为 pane id 或 session 名
    fn capture_pane(&self, target: &str, lines: u32) -> Result<String>;

    /// 向目标发送按键；目标为 pane id 或 session 名
    fn send_keys(&self, target: &str, keys: &KeyInput) -> Result<()>;
}

/// tmux 管理器
pub struct TmuxManager;

impl TmuxManager {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TmuxManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Multiplexer for TmuxManager {
    fn is_available(&self) -> bool {
        Command::new("tmux")
            .arg("list-sessions")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn list_panes(&self) -> Result<Vec<Pane>> {
        let output = Command::new("tmux")
            .args([
                "list-panes",
                "-a",
                "-F",
                "#{pane_id}:#{pane_tty}:#{session_name}:#{pane_current_path}",
            ])
            .output()
            .context("failed to run tmux list-panes")?;

        if output.status.success() {
            Ok(parse_panes(&String::from_utf8_lossy(&output.stdout)))
        } else {
            // 没有 server 时 list-panes 失败
            Err(anyhow!(
                "tmux list-panes failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ))
        }
    }

    fn capture_pane(&self, target: &str, lines: u32) -> Result<String> {
        let output = Command::new("tmux")
            .args([
                "capture-pane",
                "-t", target,
                "-p",           // print to stdout
                "-S", &format!("-{}", lines),  // start from N lines back
            ])
            .output()
            .context("failed to run tmux capture-pane")?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            Err(anyhow!("Failed to capture pane from {}", target))
        }
    }

    fn send_keys(&self, target: &str, keys: &KeyInput) -> Result<()> {
        let mut command = Command::new("tmux");
        command.args(["send-keys", "-t", target]);
        match keys {
            KeyInput::Key(name) => {
                debug!(pane = %target, key = %name, "Sending key to tmux pane");
                command.arg(name);
            }
            KeyInput::Literal(text) => {
                debug!(pane = %target, keys_len = text.len(), "Sending text to tmux pane");
                command.args(["-l", text]);
            }
        }

        let status = command
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .context("failed to run tmux send-keys")?;

        if status.success() {
            Ok(())
        } else {
            error!(pane = %target, "Failed to send keys");
            Err(anyhow!("Failed to send keys to {}", target))
        }
    }
}

/// 解析 `#{pane_id}:#{pane_tty}:#{session_name}:#{pane_current_path}` 格式
///
/// 路径本身可能包含 `:`，只切前三个分隔符。
pub fn parse_panes(output: &str) -> Vec<Pane> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let mut parts = line.splitn(4, ':');
            let id = parts.next()?;
            let tty = parts.next()?;
            let session = parts.next()?;
            let path = parts.next()?;
            Some(Pane {
                id: id.to_string(),
                tty: tty.to_string(),
                session: session.to_string(),
                path: path.to_string(),
            })
        })
        .collect()
}
