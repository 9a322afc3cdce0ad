//! Agent 类型与适配器

pub mod adapter;

pub use adapter::{all_adapters, get_adapter, AgentAdapter};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 支持的代理类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Claude,
    Codex,
}

impl AgentKind {
    pub const ALL: [AgentKind; 2] = [AgentKind::Claude, AgentKind::Codex];

    /// 机器可读的 id，用于 JSON 键名
    pub fn id(&self) -> &'static str {
        match self {
            AgentKind::Claude => "claude",
            AgentKind::Codex => "codex",
        }
    }

    /// 启动命令名，进程命令行的第一个 token 必须与之完全相同
    pub fn launcher(&self) -> &'static str {
        self.id()
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AgentKind::Claude => "Claude Code",
            AgentKind::Codex => "Codex",
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for AgentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "claude" | "claude-code" => Ok(AgentKind::Claude),
            "codex" => Ok(AgentKind::Codex),
            other => Err(anyhow!("unknown agent: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_agent_kind() {
        assert_eq!("claude".parse::<AgentKind>().unwrap(), AgentKind::Claude);
        assert_eq!("Codex".parse::<AgentKind>().unwrap(), AgentKind::Codex);
        assert!("opencode".parse::<AgentKind>().is_err());
    }

    #[test]
    fn test_serialized_as_id() {
        assert_eq!(serde_json::to_string(&AgentKind::Codex).unwrap(), "\"codex\"");
        assert_eq!(AgentKind::Claude.to_string(), "Claude Code");
    }
}
