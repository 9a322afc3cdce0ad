//! pane 关联 - 按终端设备把 tmux session 名和工作目录合并到会话中

use super::Session;
use crate::infra::{Multiplexer, Pane};
use std::collections::HashMap;
use tracing::debug;

/// 终端设备的规范路径形式：`ttys003` -> `/dev/ttys003`
pub fn tty_path(tty: &str) -> String {
    if tty.starts_with("/dev/") {
        tty.to_string()
    } else {
        format!("/dev/{}", tty)
    }
}

/// 按终端设备精确匹配 pane，未匹配的会话保持为空
pub fn attach_panes(sessions: &mut [Session], panes: &[Pane]) {
    let by_tty: HashMap<String, &Pane> = panes
        .iter()
        .map(|pane| (tty_path(&pane.tty), pane))
        .collect();

    for session in sessions.iter_mut() {
        let Some(tty) = session.tty.as_deref() else {
            continue;
        };
        if let Some(pane) = by_tty.get(&tty_path(tty)) {
            session.tmux_session = Some(pane.session.clone());
            session.pane_id = Some(pane.id.clone());
            session.working_dir = Some(pane.path.clone()).filter(|p| !p.is_empty());
        }
    }
}

/// 从复用器读取 pane 并关联；复用器不可用时所有会话都没有 pane 信息
pub fn correlate_with(sessions: &mut [Session], mux: &dyn Multiplexer) {
    if sessions.is_empty() {
        return;
    }
    if !mux.is_available() {
        debug!("Multiplexer unavailable, sessions are detection-only");
        return;
    }

    match mux.list_panes() {
        Ok(panes) => attach_panes(sessions, &panes),
        Err(e) => debug!(error = %e, "Pane listing failed"),
    }
}
