//! 配置模块
//!
//! 读取优先级：
//! 1. 环境变量 `AV_CONFIG` 指定的文件
//! 2. `~/.config/agent-versions/config.json`
//! 3. 内置默认值
//!
//! 文件缺失时使用默认值；文件格式错误时记录警告并使用默认值。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// 配置文件路径环境变量
pub const CONFIG_ENV: &str = "AV_CONFIG";

/// 默认远程查询超时（秒）
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 5;

/// 活动检测捕获的行数
pub const DEFAULT_CAPTURE_LINES: u32 = 20;

/// 运行配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 每个远程请求的超时（秒）
    pub fetch_timeout_secs: u64,
    /// 活动检测时捕获的 pane 行数
    pub capture_lines: u32,
    /// Claude 会话记录目录，默认 `~/.claude/projects`
    pub claude_projects_dir: Option<PathBuf>,
    pub restart: RestartTiming,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            capture_lines: DEFAULT_CAPTURE_LINES,
            claude_projects_dir: None,
            restart: RestartTiming::default(),
        }
    }
}

/// 重启按键序列的时序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestartTiming {
    /// Ctrl+C 发送次数
    pub interrupt_count: u32,
    pub interrupt_delay_ms: u64,
    pub clear_delay_ms: u64,
    /// 发送 exit 后等待旧进程退出的时间
    pub exit_wait_ms: u64,
}

impl Default for RestartTiming {
    fn default() -> Self {
        Self {
            interrupt_count: 3,
            interrupt_delay_ms: 200,
            clear_delay_ms: 100,
            exit_wait_ms: 2000,
        }
    }
}

impl RestartTiming {
    /// 无等待的时序（测试用）
    pub fn immediate() -> Self {
        Self {
            interrupt_delay_ms: 0,
            clear_delay_ms: 0,
            exit_wait_ms: 0,
            ..Self::default()
        }
    }

    pub fn interrupt_delay(&self) -> Duration {
        Duration::from_millis(self.interrupt_delay_ms)
    }

    pub fn clear_delay(&self) -> Duration {
        Duration::from_millis(self.clear_delay_ms)
    }

    pub fn exit_wait(&self) -> Duration {
        Duration::from_millis(self.exit_wait_ms)
    }
}

impl Config {
    /// 从环境和配置文件加载
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// 从指定文件加载，失败时回退到默认值
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Self::default();
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot read config file, using defaults");
                return Self::default();
            }
        };

        match serde_json::from_str::<Config>(&content) {
            Ok(config) => {
                debug!(path = %path.display(), "Loaded config");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Malformed config file, using defaults");
                Self::default()
            }
        }
    }

    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        dirs::home_dir().map(|home| home.join(".config/agent-versions/config.json"))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Claude 会话记录目录
    pub fn claude_projects_dir(&self) -> PathBuf {
        self.claude_projects_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".claude")
                .join("projects")
        })
    }
}

/// 输出配置，启动时由命令行参数和环境变量构建一次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputConfig {
    pub json: bool,
    pub plain: bool,
    pub color: bool,
}

impl OutputConfig {
    /// 根据参数和环境变量构建
    ///
    /// `NO_COLOR` 非空或 `TERM=dumb` 时关闭颜色；plain 模式也不带颜色。
    pub fn new(json: bool, plain: bool, no_color: bool, no_color_env: Option<&str>, term: Option<&str>) -> Self {
        let env_disables = no_color_env.map(|v| !v.is_empty()).unwrap_or(false) || term == Some("dumb");
        Self {
            json,
            plain,
            color: !(no_color || plain || env_disables),
        }
    }

    /// 从进程环境读取
    pub fn from_env(json: bool, plain: bool, no_color: bool) -> Self {
        let no_color_env = std::env::var("NO_COLOR").ok();
        let term = std::env::var("TERM").ok();
        Self::new(json, plain, no_color, no_color_env.as_deref(), term.as_deref())
    }
}
