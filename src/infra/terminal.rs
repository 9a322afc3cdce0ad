//! 终端文本与路径处理工具

use std::path::Path;

/// 截取文本的最后 N 行
pub fn truncate_last_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() <= n {
        return text.to_string();
    }
    lines[lines.len() - n..].join("\n")
}

/// 把 home 目录前缀替换为 `~`
pub fn shorten_path(path: &str, home: Option<&Path>) -> String {
    if path.is_empty() {
        return String::new();
    }
    if let Some(home) = home.and_then(|h| h.to_str()) {
        let home = home.trim_end_matches('/');
        if !home.is_empty() {
            if path == home {
                return "~".to_string();
            }
            if let Some(rest) = path.strip_prefix(home) {
                if rest.starts_with('/') {
                    return format!("~{}", rest);
                }
            }
        }
    }
    path.to_string()
}

/// 按字符截断路径左侧，保留末尾 `max` 个字符，前缀 `...`
pub fn truncate_left(path: &str, max: usize) -> String {
    let count = path.chars().count();
    if count <= max || max <= 3 {
        return path.to_string();
    }
    let keep = max - 3;
    let tail: String = path.chars().skip(count - keep).collect();
    format!("...{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_last_lines() {
        let text = (1..=100).map(|i| format!("line{}", i)).collect::<Vec<_>>().join("\n");
        let result = truncate_last_lines(&text, 10);
        assert!(result.starts_with("line91"));
        assert!(result.ends_with("line100"));
    }

    #[test]
    fn test_truncate_short_text() {
        let text = "line1\nline2\nline3";
        assert_eq!(truncate_last_lines(text, 10), text);
    }

    #[test]
    fn test_shorten_path() {
        let home = Path::new("/Users/dev");
        assert_eq!(shorten_path("/Users/dev/repos/api", Some(home)), "~/repos/api");
        assert_eq!(shorten_path("/Users/dev", Some(home)), "~");
        assert_eq!(shorten_path("/Users/devops/x", Some(home)), "/Users/devops/x");
        assert_eq!(shorten_path("/tmp", None), "/tmp");
        assert_eq!(shorten_path("", Some(home)), "");
    }

    #[test]
    fn test_truncate_left() {
        assert_eq!(truncate_left("~/short", 38), "~/short");
        let long = "~/repos/some/really/deeply/nested/project/directory";
        let cut = truncate_left(long, 20);
        assert_eq!(cut.chars().count(), 20);
        assert!(cut.starts_with("..."));
        assert!(cut.ends_with("directory"));
    }
}
