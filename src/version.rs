//! 版本比较模块 - 点分数字版本号比较

use std::cmp::Ordering;

/// 比较两个点分数字版本号
///
/// - 空字符串小于任何非空版本（没有版本的代理视为"最旧"）
/// - 按分量数值比较，`2.9` < `2.10`
/// - 前缀分量全部相等时，分量更多的版本更大
/// - 非数字分量按 0 处理，不会 panic
pub fn compare(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    match (a.is_empty(), b.is_empty()) {
        (true, _) => return Ordering::Less,
        (_, true) => return Ordering::Greater,
        _ => {}
    }

    let a_parts: Vec<u64> = a.split('.').map(parse_component).collect();
    let b_parts: Vec<u64> = b.split('.').map(parse_component).collect();

    for (x, y) in a_parts.iter().zip(b_parts.iter()) {
        match x.cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    a_parts.len().cmp(&b_parts.len())
}

/// 解析单个版本分量，取前导数字部分
///
/// 没有前导数字时为 0；超出 u64 的数字饱和为 `u64::MAX`。
fn parse_component(part: &str) -> u64 {
    let digits: String = part
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        0
    } else {
        digits.parse().unwrap_or(u64::MAX)
    }
}

/// 是否看起来像 `X.Y.Z` 版本号
pub fn looks_like_version(s: &str) -> bool {
    let parts: Vec<&str> = s.split('.').collect();
    parts.len() >= 2
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_versions() {
        assert_eq!(compare("2.1.14", "2.1.14"), Ordering::Equal);
        assert_eq!(compare("", ""), Ordering::Equal);
    }

    #[test]
    fn test_empty_is_oldest() {
        assert_eq!(compare("", "1.0.0"), Ordering::Less);
        assert_eq!(compare("0.0.1", ""), Ordering::Greater);
    }

    #[test]
    fn test_numeric_not_lexical() {
        assert_eq!(compare("2.9.0", "2.10.0"), Ordering::Less);
        assert_eq!(compare("2.10.0", "2.9.0"), Ordering::Greater);
        assert_eq!(compare("0.80.0", "0.9.1"), Ordering::Greater);
    }

    #[test]
    fn test_longer_wins_on_equal_prefix() {
        assert_eq!(compare("2.1", "2.1.0"), Ordering::Less);
        assert_eq!(compare("2.1.0.1", "2.1.0"), Ordering::Greater);
    }

    #[test]
    fn test_malformed_components_parse_as_zero() {
        // Given: 非数字分量
        // Then: 按 0 比较，不 panic
        assert_eq!(compare("1.x.3", "1.0.3"), Ordering::Equal);
        assert_eq!(compare("1.x.3", "1.1.0"), Ordering::Less);
        assert_eq!(compare("abc", "0"), Ordering::Equal);
        assert_eq!(compare("1.2.3-beta", "1.2.3"), Ordering::Equal);
    }

    #[test]
    fn test_oversized_component_saturates() {
        // Given: 超出 u64 范围的数字分量
        let huge = "99999999999999999999999";

        // Then: 仍按数值排在前面，而不是当作 0
        assert_eq!(compare(huge, "1"), Ordering::Greater);
        assert_eq!(compare("1.99999999999999999999999", "1.5"), Ordering::Greater);
        assert_eq!(compare(huge, "99999999999999999999999"), Ordering::Equal);
        assert_eq!(compare("2.x", "2.0"), Ordering::Equal);
    }

    #[test]
    fn test_antisymmetry_and_transitivity() {
        let versions = ["", "0.1", "1.0.0", "2.1.11", "2.1.14", "2.9.0", "2.10.0", "2.10.0.1"];
        for a in versions {
            assert_eq!(compare(a, a), Ordering::Equal);
            for b in versions {
                assert_eq!(compare(a, b), compare(b, a).reverse(), "{a} vs {b}");
                for c in versions {
                    if compare(a, b) == Ordering::Less && compare(b, c) == Ordering::Less {
                        assert_eq!(compare(a, c), Ordering::Less, "{a} < {b} < {c}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_looks_like_version() {
        assert!(looks_like_version("2.1.14"));
        assert!(looks_like_version("0.80"));
        assert!(!looks_like_version("claude"));
        assert!(!looks_like_version("2..1"));
        assert!(!looks_like_version(""));
    }
}
