//! 过期判断 - 比较已安装版本与会话实际运行的版本

use crate::agent::{AgentAdapter, AgentKind};
use crate::infra::HttpFetcher;
use crate::scan::Session;
use crate::version::compare;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// 单个代理的版本信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AgentVersions {
    /// 磁盘上安装的版本，未安装时为空
    pub installed: String,
    /// 远程最新版本，未查询或查询失败时为空
    pub latest: String,
}

/// 本次运行的版本快照
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledVersionSet {
    entries: BTreeMap<AgentKind, AgentVersions>,
    /// 是否查询过远程版本
    fetched: bool,
}

impl InstalledVersionSet {
    /// 读取已安装版本；提供 HTTP 客户端时同时查询最新版本
    pub fn resolve(adapters: &[Box<dyn AgentAdapter>], http: Option<&HttpFetcher>) -> Self {
        let entries = adapters
            .iter()
            .map(|adapter| {
                let installed = adapter.installed_version();
                let latest = http
                    .map(|http| adapter.latest_version(http))
                    .unwrap_or_default();
                debug!(agent = %adapter.kind().id(), installed = %installed, latest = %latest, "Resolved versions");
                (adapter.kind(), AgentVersions { installed, latest })
            })
            .collect();

        Self {
            entries,
            fetched: http.is_some(),
        }
    }

    /// 直接从已知版本构建
    pub fn from_entries(entries: impl IntoIterator<Item = (AgentKind, AgentVersions)>, fetched: bool) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            fetched,
        }
    }

    pub fn get(&self, kind: AgentKind) -> Option<&AgentVersions> {
        self.entries.get(&kind)
    }

    pub fn installed(&self, kind: AgentKind) -> &str {
        self.get(kind).map(|v| v.installed.as_str()).unwrap_or("")
    }

    pub fn latest(&self, kind: AgentKind) -> &str {
        self.get(kind).map(|v| v.latest.as_str()).unwrap_or("")
    }

    pub fn fetched(&self) -> bool {
        self.fetched
    }

    /// 已安装版本是否落后于远程最新版本
    pub fn update_available(&self, kind: AgentKind) -> bool {
        let installed = self.installed(kind);
        let latest = self.latest(kind);
        !installed.is_empty() && !latest.is_empty() && compare(installed, latest) == Ordering::Less
    }

    pub fn kinds(&self) -> impl Iterator<Item = AgentKind> + '_ {
        self.entries.keys().copied()
    }

    /// 按代理 id 排列的已安装版本
    pub fn installed_map(&self) -> BTreeMap<AgentKind, String> {
        self.entries
            .iter()
            .map(|(kind, v)| (*kind, v.installed.clone()))
            .collect()
    }

    /// 按代理 id 排列的最新版本
    pub fn latest_map(&self) -> BTreeMap<AgentKind, String> {
        self.entries
            .iter()
            .map(|(kind, v)| (*kind, v.latest.clone()))
            .collect()
    }
}

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// 无法确定运行版本
    Unknown,
    Current,
    /// 过期，可通过 tmux 重启
    Outdated,
    /// 过期，但没有 tmux session，只能手动重启
    OutdatedDetectionOnly,
}

impl SessionStatus {
    pub fn is_outdated(&self) -> bool {
        matches!(self, SessionStatus::Outdated | SessionStatus::OutdatedDetectionOnly)
    }

    /// 过期且可以自动重启
    pub fn needs_restart(&self) -> bool {
        *self == SessionStatus::Outdated
    }
}

/// 计算单个会话的状态
pub fn session_status(session: &Session, installed: &str) -> SessionStatus {
    if session.running_version.is_empty() {
        SessionStatus::Unknown
    } else if session.running_version == installed {
        SessionStatus::Current
    } else if session.is_restartable() {
        SessionStatus::Outdated
    } else {
        SessionStatus::OutdatedDetectionOnly
    }
}

/// 带状态的会话
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciledSession {
    #[serde(flatten)]
    pub session: Session,
    pub status: SessionStatus,
    /// 对比用的已安装版本
    pub installed_version: String,
}

/// 计算所有会话的状态
pub fn reconcile(sessions: Vec<Session>, versions: &InstalledVersionSet) -> Vec<ReconciledSession> {
    sessions
        .into_iter()
        .map(|session| {
            let installed = versions.installed(session.agent).to_string();
            let status = session_status(&session, &installed);
            ReconciledSession {
                session,
                status,
                installed_version: installed,
            }
        })
        .collect()
}

/// 需要重启（过期且可重启）的会话数
pub fn needs_restart_count(sessions: &[ReconciledSession]) -> usize {
    sessions.iter().filter(|s| s.status.needs_restart()).count()
}

/// 重启候选会话
///
/// 不可重启（没有 tmux session）的会话始终排除；`all` 为 false 时只包含过期的会话。
/// 活动中的会话保留，由选择器标记为禁用。
pub fn restart_candidates(sessions: &[ReconciledSession], all: bool) -> Vec<ReconciledSession> {
    sessions
        .iter()
        .filter(|s| s.session.is_restartable())
        .filter(|s| all || s.status.needs_restart())
        .cloned()
        .collect()
}

/// 状态报告
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub installed: BTreeMap<AgentKind, String>,
    pub latest: BTreeMap<AgentKind, String>,
    pub sessions: Vec<ReconciledSession>,
    pub needs_restart: usize,
}

impl StatusReport {
    pub fn new(versions: &InstalledVersionSet, sessions: Vec<ReconciledSession>) -> Self {
        Self {
            installed: versions.installed_map(),
            latest: versions.latest_map(),
            needs_restart: needs_restart_count(&sessions),
            sessions,
        }
    }
}

/// `check` 命令报告
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub installed: BTreeMap<AgentKind, String>,
    pub latest: BTreeMap<AgentKind, String>,
    /// 键名为 `<agent>_update_available`
    #[serde(flatten)]
    pub update_available: BTreeMap<String, bool>,
}

impl CheckReport {
    pub fn new(versions: &InstalledVersionSet) -> Self {
        Self {
            installed: versions.installed_map(),
            latest: versions.latest_map(),
            update_available: versions
                .kinds()
                .map(|kind| (format!("{}_update_available", kind.id()), versions.update_available(kind)))
                .collect(),
        }
    }
}
