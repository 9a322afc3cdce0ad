//! 选择器渲染

use crate::infra::terminal::{shorten_path, truncate_left};
use crate::tui::{Picker, PlanItem};
use ratatui::{prelude::*, widgets::Paragraph};
use std::path::Path;

const HELP: &str = "↑/↓ navigate • space toggle • a all • n none • enter confirm • q quit";

/// 标题、空行、帮助前空行、帮助
const CHROME_HEIGHT: u16 = 4;

/// 选择器需要的高度
pub fn picker_height(picker: &Picker) -> u16 {
    (picker.items().len() as u16).saturating_add(CHROME_HEIGHT)
}

/// 渲染选择器
pub fn render(frame: &mut Frame, picker: &Picker, home: Option<&Path>) {
    frame.render_widget(Paragraph::new(picker_lines(picker, home)), frame.area());
}

/// 选择器的所有行
pub fn picker_lines(picker: &Picker, home: Option<&Path>) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            "Select sessions to restart:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::default(),
    ];

    for (i, item) in picker.items().iter().enumerate() {
        lines.push(item_line(item, i == picker.cursor(), home));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(HELP, Style::default().fg(Color::DarkGray))));
    lines
}

fn item_line(item: &PlanItem, is_cursor: bool, home: Option<&Path>) -> Line<'static> {
    let cursor = if is_cursor {
        Span::styled("> ", Style::default().fg(Color::Yellow))
    } else {
        Span::raw("  ")
    };

    let (checkbox, style) = if item.disabled {
        ("[-]", Style::default().fg(Color::DarkGray))
    } else if item.selected {
        ("[x]", Style::default().fg(Color::Green))
    } else {
        ("[ ]", Style::default().fg(Color::Gray))
    };

    let session = &item.entry.session;
    let path = truncate_left(&shorten_path(session.working_dir.as_deref().unwrap_or(""), home), 35);

    let mut spans = vec![
        cursor,
        Span::styled(
            format!("{} {:<20} {:<38} ", checkbox, session.label(), path),
            style,
        ),
        Span::styled(session.running_version.clone(), Style::default().fg(Color::Red)),
        Span::raw(" -> "),
        Span::styled(item.entry.installed_version.clone(), Style::default().fg(Color::Green)),
    ];
    if item.disabled {
        spans.push(Span::styled(" (busy)", Style::default().fg(Color::DarkGray)));
    }

    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentKind;
    use crate::reconcile::{ReconciledSession, SessionStatus};
    use crate::scan::Session;

    fn entry(name: &str, active: bool) -> ReconciledSession {
        ReconciledSession {
            session: Session {
                pid: 7,
                agent: AgentKind::Claude,
                tty: Some("pts/7".to_string()),
                running_version: "2.1.11".to_string(),
                command: "claude".to_string(),
                tmux_session: Some(name.to_string()),
                pane_id: None,
                working_dir: Some("/home/dev/repos/api".to_string()),
                has_active_work: active,
            },
            status: SessionStatus::Outdated,
            installed_version: "2.1.14".to_string(),
        }
    }

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_picker_lines() {
        let picker = Picker::new(vec![entry("api", false), entry("worker", true)]);
        let lines = picker_lines(&picker, Some(Path::new("/home/dev")));

        assert_eq!(lines.len() as u16, picker_height(&picker));
        let first = text(&lines[2]);
        assert!(first.starts_with("> [x] api"));
        assert!(first.contains("~/repos/api"));
        assert!(first.contains("2.1.11 -> 2.1.14"));

        let second = text(&lines[3]);
        assert!(second.starts_with("  [-] worker"));
        assert!(second.ends_with("(busy)"));
    }
}
