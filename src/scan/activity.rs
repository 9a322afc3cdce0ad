//! 活动检测 - 判断会话是否正在执行任务（不应被中断）
//!
//! 检查 pane 最近输出中代理 UI 在忙碌时显示的文本标记。
//! 这是启发式判断：代理 UI 文案变化时可能漏判。

use super::Session;
use crate::infra::terminal::truncate_last_lines;
use crate::infra::Multiplexer;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// "ctrl+c to interrupt" / "esc to interrupt" 提示
static INTERRUPT_HINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:ctrl\+c|esc) to interrupt").expect("Invalid interrupt hint regex")
});

/// 带省略号的 Running 进度
static RUNNING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Running[….]+").expect("Invalid running regex"));

/// spinner 字符后跟忙碌动词
static SPINNER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[⏺✻✶✳✢✽].*(?:Thinking|Reading|Writing|Manifesting|Editing)[….]*")
        .expect("Invalid spinner regex")
});

/// 会话活动判断
pub trait ActivityClassifier {
    fn is_active(&self, session: &Session) -> bool;
}

/// 文本中是否出现任一忙碌标记
pub fn detect_activity(content: &str) -> bool {
    INTERRUPT_HINT_RE.is_match(content) || RUNNING_RE.is_match(content) || SPINNER_RE.is_match(content)
}

/// 基于 pane 捕获内容的活动判断
pub struct PaneActivityClassifier<'a> {
    mux: &'a dyn Multiplexer,
    lines: u32,
}

impl<'a> PaneActivityClassifier<'a> {
    pub fn new(mux: &'a dyn Multiplexer, lines: u32) -> Self {
        Self { mux, lines }
    }
}

impl ActivityClassifier for PaneActivityClassifier<'_> {
    fn is_active(&self, session: &Session) -> bool {
        let Some(name) = session.mux_target() else {
            return false;
        };

        match self.mux.capture_pane(name, self.lines) {
            // pane 底部的空行不计入窗口
            Ok(content) => detect_activity(&truncate_last_lines(content.trim_end(), self.lines as usize)),
            Err(e) => {
                debug!(session = %name, error = %e, "Capture failed, treating as idle");
                false
            }
        }
    }
}

/// 为每个会话设置 `has_active_work`
pub fn classify_sessions(sessions: &mut [Session], classifier: &dyn ActivityClassifier) {
    for session in sessions.iter_mut() {
        session.has_active_work = classifier.is_active(session);
    }
}
