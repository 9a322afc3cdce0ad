// src/agent_mod/adapter/codex.rs
//! Codex CLI 适配器

use super::*;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::warn;

/// 通用版本路径，只在 codex 相关路径中匹配
static VERSION_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/versions/(\d+\.\d+\.\d+)").expect("Invalid version path regex"));

const REGISTRY_URL: &str = "https://registry.npmjs.org/@openai/codex";
const REGISTRY_LATEST_URL: &str = "https://registry.npmjs.org/@openai/codex/latest";

#[derive(Deserialize)]
struct Package {
    #[serde(rename = "dist-tags")]
    dist_tags: DistTags,
}

#[derive(Deserialize)]
struct DistTags {
    #[serde(default)]
    latest: String,
}

#[derive(Deserialize)]
struct PackageVersion {
    #[serde(default)]
    version: String,
}

pub struct CodexAdapter;

impl AgentAdapter for CodexAdapter {
    fn kind(&self) -> AgentKind {
        AgentKind::Codex
    }

    fn running_version(&self, child: &RawProcess) -> Option<String> {
        child_haystacks(child)
            .filter(|text| text.contains("codex"))
            .find_map(|text| {
                VERSION_PATH_RE
                    .captures(text)
                    .map(|caps| caps[1].to_string())
            })
    }

    fn installed_version(&self) -> String {
        run_version_command("codex")
            .map(|out| parse_version_output(&out))
            .unwrap_or_default()
    }

    fn latest_version(&self, http: &HttpFetcher) -> String {
        match http.get_json::<Package>(REGISTRY_URL) {
            Ok(pkg) if !pkg.dist_tags.latest.is_empty() => return pkg.dist_tags.latest,
            Ok(_) => debug!("Registry has no latest tag, trying latest endpoint"),
            Err(e) => debug!(error = %e, "Registry lookup failed, trying latest endpoint"),
        }

        match http.get_json::<PackageVersion>(REGISTRY_LATEST_URL) {
            Ok(pkg) => pkg.version,
            Err(e) => {
                warn!(error = %e, "Could not fetch latest Codex version");
                String::new()
            }
        }
    }

    fn resume_command(&self, _working_dir: Option<&str>) -> String {
        "codex --continue".to_string()
    }
}

/// 解析 `codex --version` 输出，如 `codex-cli 0.80.0`
pub fn parse_version_output(output: &str) -> String {
    output
        .split_whitespace()
        .last()
        .unwrap_or_default()
        .to_string()
}
