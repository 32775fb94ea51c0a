//! 容错列表解析：把生成服务返回的任意文本变成恰好 N 条非空字符串
//!
//! 预处理去掉 ``` 围栏，然后按顺序尝试策略链，第一个给出结果的策略胜出：
//! 1. structured_decode：截取第一个 `[` 到最后一个 `]`，严格按 JSON 字符串数组解码
//! 2. line_scan：逐行启发式扫描（引号行、列表符号行、序号行）
//!
//! 不足 N 条时按固定顺序从兜底题库补齐；题库也耗尽时返回较少条目（shortfall），从不报错。

use std::sync::OnceLock;

use regex::Regex;

use crate::questions::pool::fallback_questions;

/// 产出条目的策略
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseStrategy {
    StructuredDecode,
    LineScan,
}

/// 解析结果
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedList {
    /// 解析条目在前，题库条目在后
    pub items: Vec<String>,
    pub strategy: ParseStrategy,
    /// 从文本中得到的条目数
    pub extracted: usize,
    /// 从题库补齐的条目数
    pub padded: usize,
}

impl ParsedList {
    /// 距离目标还差几条（只有题库耗尽时才 > 0）
    pub fn shortfall(&self, target: usize) -> usize {
        target.saturating_sub(self.items.len())
    }
}

/// 策略：(文本, N) → 可选的有序条目
type Strategy = fn(&str, usize) -> Option<Vec<String>>;

const STRATEGIES: [(ParseStrategy, Strategy); 2] = [
    (ParseStrategy::StructuredDecode, structured_decode),
    (ParseStrategy::LineScan, line_scan),
];

/// 解析 raw，目标 target 条；确定性、不报错
pub fn parse_list(raw: &str, target: usize) -> ParsedList {
    let text = strip_fences(raw);

    let (strategy, mut items) = STRATEGIES
        .iter()
        .find_map(|(kind, strategy)| strategy(&text, target).map(|items| (*kind, items)))
        .unwrap_or((ParseStrategy::LineScan, Vec::new()));

    items.truncate(target);
    let extracted = items.len();
    items.extend(fallback_questions(target - extracted));
    let padded = items.len() - extracted;

    ParsedList {
        items,
        strategy,
        extracted,
        padded,
    }
}

/// 只要条目的便捷版本
pub fn parse_questions(raw: &str, target: usize) -> Vec<String> {
    parse_list(raw, target).items
}

/// 去掉包裹全文的 ``` 围栏行（开头必须是围栏，结尾围栏可缺失）
fn strip_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let mut lines: Vec<&str> = trimmed.lines().skip(1).collect();
    if lines
        .last()
        .is_some_and(|last| last.trim_start().starts_with("```"))
    {
        lines.pop();
    }
    lines.join("\n")
}

/// 第一个 `[` 到最后一个 `]` 严格解码为字符串数组；空白条目丢弃。解码失败返回 None
fn structured_decode(text: &str, _target: usize) -> Option<Vec<String>> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end <= start {
        return None;
    }

    match serde_json::from_str::<Vec<String>>(&text[start..=end]) {
        Ok(items) => Some(
            items
                .into_iter()
                .filter(|item| !item.trim().is_empty())
                .collect(),
        ),
        Err(e) => {
            tracing::debug!(error = %e, "structured decode failed, falling back to line scan");
            None
        }
    }
}

fn numbered_line_re() -> &'static Regex {
    static NUMBERED: OnceLock<Regex> = OnceLock::new();
    NUMBERED.get_or_init(|| Regex::new(r"^(\d+)[.)](\s*)(\S.*)$").unwrap())
}

const BULLETS: [&str; 3] = ["- ", "* ", "• "];

/// 逐行扫描；序号行只接受与「下一个位置」相等的序号，因此是有状态的顺序扫描
fn line_scan(text: &str, target: usize) -> Option<Vec<String>> {
    let mut items: Vec<String> = Vec::new();

    for line in text.lines() {
        if items.len() >= target {
            break;
        }
        if let Some(item) = match_line(line.trim(), items.len() + 1) {
            items.push(item);
        }
    }

    Some(items)
}

/// 单行匹配；`next_position` 为下一个条目的 1-based 序号
fn match_line(line: &str, next_position: usize) -> Option<String> {
    let candidate = if let Some(inner) = line
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix("\","))
    {
        inner.to_string()
    } else if let Some(inner) = line.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
        inner.to_string()
    } else if let Some(rest) = BULLETS.iter().find_map(|b| line.strip_prefix(b)) {
        unquote(rest)
    } else {
        let caps = numbered_line_re().captures(line)?;
        let number: usize = caps.get(1)?.as_str().parse().ok()?;
        let text = caps.get(3)?.as_str();
        // `1.5 years` 是小数而不是序号
        let glued_digit = caps.get(2)?.as_str().is_empty()
            && text.starts_with(|c: char| c.is_ascii_digit());
        if number != next_position || glued_digit {
            return None;
        }
        unquote(text)
    };

    let candidate = candidate.trim();
    if candidate.is_empty() {
        None
    } else {
        Some(candidate.to_string())
    }
}

/// 去掉一对包裹引号与尾随逗号：`1. "Question",` → `Question`
fn unquote(s: &str) -> String {
    let s = s.trim();
    let s = s.strip_suffix(',').unwrap_or(s).trim_end();
    s.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(s)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::pool::{pool_size, FALLBACK_QUESTIONS};

    fn pool(range: std::ops::Range<usize>) -> Vec<String> {
        FALLBACK_QUESTIONS[range].iter().map(|q| q.to_string()).collect()
    }

    #[test]
    fn test_json_with_enough_items_takes_first_n() {
        let raw = r#"["Q one", "Q two", "Q three", "Q four"]"#;
        let parsed = parse_list(raw, 3);
        assert_eq!(parsed.items, vec!["Q one", "Q two", "Q three"]);
        assert_eq!(parsed.strategy, ParseStrategy::StructuredDecode);
        assert_eq!(parsed.padded, 0);
    }

    #[test]
    fn test_json_exact_count() {
        for n in 1..=5 {
            let items: Vec<String> = (1..=n).map(|i| format!("Question {i}?")).collect();
            let raw = serde_json::to_string(&items).unwrap();
            assert_eq!(parse_questions(&raw, n), items);
        }
    }

    #[test]
    fn test_json_with_prose_and_fences() {
        let raw = "```json\nHere you go:\n[\"Alpha?\", \"Beta?\"]\n```";
        assert_eq!(parse_questions(raw, 2), vec!["Alpha?", "Beta?"]);
    }

    #[test]
    fn test_fence_without_closing_line() {
        let raw = "```\n[\"Alpha?\", \"Beta?\"]";
        assert_eq!(parse_questions(raw, 2), vec!["Alpha?", "Beta?"]);
    }

    #[test]
    fn test_json_short_pads_from_pool_in_order() {
        let raw = r#"["Only one?"]"#;
        let parsed = parse_list(raw, 4);
        let mut expected = vec!["Only one?".to_string()];
        expected.extend(pool(0..3));
        assert_eq!(parsed.items, expected);
        assert_eq!(parsed.extracted, 1);
        assert_eq!(parsed.padded, 3);
        assert_eq!(parsed.strategy, ParseStrategy::StructuredDecode);
    }

    #[test]
    fn test_empty_json_array_is_all_pool() {
        assert_eq!(parse_questions("[]", 2), pool(0..2));
    }

    #[test]
    fn test_json_blank_items_are_dropped() {
        let raw = r#"["  ", "Real question?", ""]"#;
        let parsed = parse_list(raw, 2);
        assert_eq!(parsed.items[0], "Real question?");
        assert_eq!(parsed.items[1], FALLBACK_QUESTIONS[0]);
    }

    #[test]
    fn test_non_string_array_falls_through_to_line_scan() {
        let raw = "[1, 2, 3]\n- Bullet question?";
        let parsed = parse_list(raw, 1);
        assert_eq!(parsed.strategy, ParseStrategy::LineScan);
        assert_eq!(parsed.items, vec!["Bullet question?"]);
    }

    #[test]
    fn test_malformed_json_uses_quoted_lines() {
        let raw = "[\n\"First question?\",\n\"Second question?\",\n\"Third question?\"\n";
        let parsed = parse_list(raw, 3);
        assert_eq!(parsed.strategy, ParseStrategy::LineScan);
        assert_eq!(
            parsed.items,
            vec!["First question?", "Second question?", "Third question?"]
        );
    }

    #[test]
    fn test_trailing_comma_array_falls_back() {
        let raw = "[\n  \"A?\",\n  \"B?\",\n]";
        let parsed = parse_list(raw, 2);
        assert_eq!(parsed.strategy, ParseStrategy::LineScan);
        assert_eq!(parsed.items, vec!["A?", "B?"]);
    }

    #[test]
    fn test_bullets() {
        let raw = "Questions:\n- Tell me about X?\n* Tell me about Y?\n• Tell me about Z?";
        assert_eq!(
            parse_questions(raw, 3),
            vec!["Tell me about X?", "Tell me about Y?", "Tell me about Z?"]
        );
    }

    #[test]
    fn test_numbered_lines_must_follow_sequence() {
        let raw = "1. First?\n3. Out of order?\n2. Second?\n2. Duplicate two?\n3) Third?";
        assert_eq!(parse_questions(raw, 3), vec!["First?", "Second?", "Third?"]);
    }

    #[test]
    fn test_numbered_position_counts_other_matches() {
        let raw = "- Bullet first?\n2. Numbered second?";
        assert_eq!(
            parse_questions(raw, 2),
            vec!["Bullet first?", "Numbered second?"]
        );
    }

    #[test]
    fn test_numbered_with_quotes() {
        let raw = "1. \"Quoted one?\",\n2. \"Quoted two?\"";
        assert_eq!(parse_questions(raw, 2), vec!["Quoted one?", "Quoted two?"]);
    }

    #[test]
    fn test_numbered_without_space_after_separator() {
        let raw = "1.Tell me about a launch?\n2)Describe a conflict?";
        let parsed = parse_list(raw, 2);
        assert_eq!(parsed.items, vec!["Tell me about a launch?", "Describe a conflict?"]);
        assert_eq!(parsed.extracted, 2);
        assert_eq!(parsed.strategy, ParseStrategy::LineScan);
    }

    #[test]
    fn test_numbered_spaced_digit_text_is_accepted() {
        let parsed = parse_list("1. 5 reasons you left your last role?", 1);
        assert_eq!(parsed.items, vec!["5 reasons you left your last role?"]);
        assert_eq!(parsed.padded, 0);
    }

    #[test]
    fn test_numbered_version_string_not_taken_as_position() {
        let raw = "10. This is not question one\n1.5 years of experience";
        let parsed = parse_list(raw, 1);
        assert_eq!(parsed.extracted, 0);
        assert_eq!(parsed.items, pool(0..1));
    }

    #[test]
    fn test_scan_stops_at_target() {
        let raw = "- A?\n- B?\n- C?\n- D?";
        assert_eq!(parse_questions(raw, 2), vec!["A?", "B?"]);
    }

    #[test]
    fn test_scan_short_pads_from_pool() {
        let raw = "- Only bullet?";
        let mut expected = vec!["Only bullet?".to_string()];
        expected.extend(pool(0..2));
        assert_eq!(parse_questions(raw, 3), expected);
    }

    #[test]
    fn test_arbitrary_text_returns_min_of_n_and_pool() {
        let inputs = [
            "",
            "   ",
            "I'm sorry, I cannot help with that.",
            "]] [[ {\"not\": \"a list\"}",
            "\"",
            "-",
            "1.",
            "```",
            "```\n```",
        ];
        for raw in inputs {
            for n in [1, 3, 12, 20] {
                let parsed = parse_list(raw, n);
                assert_eq!(parsed.items.len(), n.min(pool_size()), "raw={raw:?} n={n}");
                assert_eq!(parsed.items, pool(0..n.min(pool_size())));
            }
        }
    }

    #[test]
    fn test_shortfall_when_pool_exhausted() {
        let raw = "- One?\n- Two?";
        let parsed = parse_list(raw, 20);
        assert_eq!(parsed.items.len(), 2 + pool_size());
        assert_eq!(parsed.shortfall(20), 20 - 2 - pool_size());
        assert_eq!(parsed.items[2..], pool(0..pool_size())[..]);
    }

    #[test]
    fn test_zero_target() {
        let parsed = parse_list(r#"["A?"]"#, 0);
        assert!(parsed.items.is_empty());
        assert_eq!(parsed.shortfall(0), 0);
    }

    #[test]
    fn test_deterministic() {
        let raw = "noise\n\"Q?\",\n- R?\n3. S?";
        assert_eq!(parse_list(raw, 5), parse_list(raw, 5));
    }

    #[test]
    fn test_items_never_blank() {
        let raw = "\"  \",\n-  \n1.   \n\"\"\n- Real?";
        let parsed = parse_list(raw, 3);
        assert!(parsed.items.iter().all(|q| !q.trim().is_empty()));
        assert_eq!(parsed.items[0], "Real?");
    }
}
