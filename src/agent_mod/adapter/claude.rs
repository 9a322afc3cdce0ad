// src/agent_mod/adapter/claude.rs
//! Claude Code 适配器

use super::*;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::SystemTime;
use tracing::warn;

/// Claude 安装目录中的版本路径，如 `~/.local/share/claude/versions/2.1.14`
static VERSION_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/share/claude/versions/(\d+\.\d+\.\d+)").expect("Invalid version path regex")
});

/// CHANGELOG 中的版本标题，如 `## 2.1.14`
static CHANGELOG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"##?\s*(\d+\.\d+\.\d+)").expect("Invalid changelog regex"));

const RELEASES_URL: &str = "https://api.github.com/repos/anthropics/claude-code/releases/latest";
const CHANGELOG_URL: &str = "https://raw.githubusercontent.com/anthropics/claude-code/main/CHANGELOG.md";

#[derive(Deserialize)]
struct Release {
    tag_name: String,
}

pub struct ClaudeAdapter {
    /// 会话记录目录 `~/.claude/projects`
    projects_dir: PathBuf,
}

impl ClaudeAdapter {
    pub fn new(projects_dir: PathBuf) -> Self {
        Self { projects_dir }
    }

    /// 通过启动器符号链接的目标确定版本
    fn symlink_version(&self) -> Option<String> {
        let mut candidates = Vec::new();
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".local").join("bin").join("claude"));
        }
        if let Ok(path) = which::which("claude") {
            candidates.push(path);
        }

        candidates
            .iter()
            .filter_map(|path| fs::read_link(path).ok())
            .find_map(|target| version_from_link_target(&target))
    }

    /// 查找工作目录对应的最近一次会话 ID
    pub fn find_session_id(&self, working_dir: &str) -> Option<String> {
        if working_dir.is_empty() {
            return None;
        }

        project_dir_names(working_dir)
            .into_iter()
            .map(|name| self.projects_dir.join(name))
            .filter(|dir| dir.is_dir())
            .find_map(|dir| latest_session_in(&dir))
    }
}

impl AgentAdapter for ClaudeAdapter {
    fn kind(&self) -> AgentKind {
        AgentKind::Claude
    }

    fn running_version(&self, child: &RawProcess) -> Option<String> {
        child_haystacks(child).find_map(|text| {
            VERSION_PATH_RE
                .captures(text)
                .map(|caps| caps[1].to_string())
        })
    }

    fn installed_version(&self) -> String {
        if let Some(version) = self.symlink_version() {
            return version;
        }
        run_version_command("claude")
            .map(|out| parse_version_output(&out))
            .unwrap_or_default()
    }

    fn latest_version(&self, http: &HttpFetcher) -> String {
        match http.get_json::<Release>(RELEASES_URL) {
            Ok(release) if !release.tag_name.is_empty() => {
                return release.tag_name.trim_start_matches('v').to_string();
            }
            Ok(_) => debug!("Release has no tag, falling back to changelog"),
            Err(e) => debug!(error = %e, "Release lookup failed, falling back to changelog"),
        }

        match http.get_text(CHANGELOG_URL) {
            Ok(body) => parse_changelog_version(&body).unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Could not fetch latest Claude Code version");
                String::new()
            }
        }
    }

    fn resume_command(&self, working_dir: Option<&str>) -> String {
        match working_dir.and_then(|dir| self.find_session_id(dir)) {
            Some(session_id) => format!("claude --resume {}", session_id),
            None => "claude --continue".to_string(),
        }
    }
}

/// 解析 `claude --version` 输出，如 `2.1.14 (Claude Code)`
pub fn parse_version_output(output: &str) -> String {
    output
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

/// 解析 CHANGELOG 中第一个版本号
pub fn parse_changelog_version(body: &str) -> Option<String> {
    CHANGELOG_RE
        .captures(body)
        .map(|caps| caps[1].to_string())
}

fn version_from_link_target(target: &Path) -> Option<String> {
    let name = target.file_name()?.to_str()?;
    if crate::version::looks_like_version(name) {
        Some(name.to_string())
    } else {
        None
    }
}

/// 工作目录在 `~/.claude/projects` 下可能的目录名
///
/// 非字母数字字符替换为 `-`，`/Users/dev/repos/foo` -> `-Users-dev-repos-foo`。
/// 同时尝试去掉开头 `-` 的形式。
fn project_dir_names(working_dir: &str) -> Vec<String> {
    let encoded: String = working_dir
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let mut names = vec![encoded.clone()];
    if let Some(stripped) = encoded.strip_prefix('-') {
        names.push(stripped.to_string());
    }
    names
}

/// 目录中最近修改的 `.jsonl` 文件名（即会话 ID）
fn latest_session_in(dir: &Path) -> Option<String> {
    let entries = fs::read_dir(dir).ok()?;

    let mut latest: Option<(SystemTime, String)> = None;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("jsonl") {
            continue;
        }
        let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if !is_valid_session_id(id) {
            continue;
        }
        let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
            continue;
        };

        let newer = match &latest {
            None => true,
            Some((time, name)) => modified > *time || (modified == *time && id > name.as_str()),
        };
        if newer {
            latest = Some((modified, id.to_string()));
        }
    }

    latest.map(|(_, id)| id)
}

/// 会话 ID 只允许字母数字、`-`、`_`，避免拼进 shell 命令的内容被解释
fn is_valid_session_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;

    fn child(command: &str, executable: Option<&str>) -> RawProcess {
        RawProcess {
            pid: 2,
            tty: None,
            command: command.to_string(),
            executable: executable.map(|e| e.to_string()),
        }
    }

    #[test]
    fn test_running_version_from_command() {
        let adapter = ClaudeAdapter::new(PathBuf::from("/nonexistent"));
        let proc = child("/Users/dev/.local/share/claude/versions/2.1.11 --continue", None);
        assert_eq!(adapter.running_version(&proc), Some("2.1.11".to_string()));
    }

    #[test]
    fn test_running_version_from_executable() {
        let adapter = ClaudeAdapter::new(PathBuf::from("/nonexistent"));
        let proc = child("claude", Some("/home/dev/.local/share/claude/versions/2.1.14"));
        assert_eq!(adapter.running_version(&proc), Some("2.1.14".to_string()));
    }

    #[test]
    fn test_running_version_ignores_other_layouts() {
        let adapter = ClaudeAdapter::new(PathBuf::from("/nonexistent"));
        let proc = child("node /opt/codex/versions/0.80.0/bin/codex.js", None);
        assert_eq!(adapter.running_version(&proc), None);
    }

    #[test]
    fn test_parse_version_output() {
        assert_eq!(parse_version_output("2.1.14 (Claude Code)\n"), "2.1.14");
        assert_eq!(parse_version_output(""), "");
    }

    #[test]
    fn test_parse_changelog_version() {
        let body = "# Changelog\n\n## 2.1.14\n\n- Fixed things\n\n## 2.1.12\n";
        assert_eq!(parse_changelog_version(body), Some("2.1.14".to_string()));
        assert_eq!(parse_changelog_version("# Changelog\n"), None);
    }

    #[test]
    fn test_version_from_link_target() {
        let target = Path::new("/Users/dev/.local/share/claude/versions/2.1.14");
        assert_eq!(version_from_link_target(target), Some("2.1.14".to_string()));
        assert_eq!(version_from_link_target(Path::new("/usr/lib/node_modules/cli.js")), None);
    }

    #[test]
    fn test_project_dir_names() {
        assert_eq!(
            project_dir_names("/Users/dev/repos/my.app"),
            vec!["-Users-dev-repos-my-app".to_string(), "Users-dev-repos-my-app".to_string()]
        );
    }

    #[test]
    fn test_resume_uses_latest_session() {
        // Given: 项目目录中有两个会话记录
        let projects = tempfile::tempdir().unwrap();
        let project = projects.path().join("-work-api");
        fs::create_dir_all(&project).unwrap();

        let old = File::create(project.join("aaaa-1111.jsonl")).unwrap();
        old.set_modified(SystemTime::now() - Duration::from_secs(3600)).unwrap();
        let new = File::create(project.join("bbbb-2222.jsonl")).unwrap();
        new.set_modified(SystemTime::now()).unwrap();
        File::create(project.join("notes.txt")).unwrap();

        let adapter = ClaudeAdapter::new(projects.path().to_path_buf());

        // When: 构建恢复命令
        let command = adapter.resume_command(Some("/work/api"));

        // Then: 使用最近修改的会话
        assert_eq!(command, "claude --resume bbbb-2222");
    }

    #[test]
    fn test_resume_falls_back_to_continue() {
        let projects = tempfile::tempdir().unwrap();
        let adapter = ClaudeAdapter::new(projects.path().to_path_buf());

        assert_eq!(adapter.resume_command(Some("/work/unknown")), "claude --continue");
        assert_eq!(adapter.resume_command(None), "claude --continue");
    }

    #[test]
    fn test_invalid_session_ids_are_skipped() {
        let projects = tempfile::tempdir().unwrap();
        let project = projects.path().join("-work-api");
        fs::create_dir_all(&project).unwrap();
        File::create(project.join("bad;rm -rf.jsonl")).unwrap();

        let adapter = ClaudeAdapter::new(projects.path().to_path_buf());
        assert_eq!(adapter.resume_command(Some("/work/api")), "claude --continue");
    }
}
