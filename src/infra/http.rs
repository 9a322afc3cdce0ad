//! HTTP 获取 - 远程版本查询使用的阻塞客户端

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("agent-versions/", env!("CARGO_PKG_VERSION"));

/// 带固定超时的 HTTP 客户端
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// 创建新客户端，每个请求使用相同的超时
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| anyhow!("Cannot create HTTP client: {}", e))?;

        Ok(Self { client })
    }

    /// GET 并解析 JSON，非 2xx 状态视为错误
    pub fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url = %url, "Fetching JSON");
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("{} returned {}", url, status));
        }

        response
            .json::<T>()
            .with_context(|| format!("malformed JSON from {}", url))
    }

    /// GET 并返回文本内容
    pub fn get_text(&self, url: &str) -> Result<String> {
        debug!(url = %url, "Fetching text");
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("{} returned {}", url, status));
        }

        response
            .text()
            .with_context(|| format!("unreadable body from {}", url))
    }
}
