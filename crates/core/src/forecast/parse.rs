use crate::forecast::RawForecast;
use anyhow::Context;

/// Pulls the bracket-delimited numeric list out of a free-text reply.
/// Tolerates markdown fences and prose around the list; returns `None`
/// when no complete list of finite numbers is present.
pub fn extract_numeric_list(text: &str) -> Option<Vec<f64>> {
    let trimmed = strip_fences(text.trim());

    let start = trimmed.find('[')?;
    let end = trimmed.rfind(']')?;
    if end <= start {
        return None;
    }

    let inner = trimmed[start + 1..end].trim();
    if inner.is_empty() {
        return None;
    }

    let mut values = Vec::new();
    for token in inner.split(',') {
        let value = token.trim().parse::<f64>().ok()?;
        if !value.is_finite() {
            return None;
        }
        values.push(value);
    }
    Some(values)
}

/// The `Explanation:`-prefixed sentence, when the reply carries one.
pub fn extract_explanation(text: &str) -> Option<String> {
    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("Explanation:") {
            let rest = rest.trim();
            if !rest.is_empty() {
                return Some(rest.to_string());
            }
        }
    }
    None
}

pub fn parse_reply(text: &str) -> anyhow::Result<RawForecast> {
    let values = extract_numeric_list(text)
        .with_context(|| format!("reply contains no parseable numeric list: {}", snippet(text)))?;

    Ok(RawForecast {
        values,
        explanation: extract_explanation(text),
    })
}

fn strip_fences(text: &str) -> &str {
    if !text.starts_with("```") {
        return text;
    }

    // Remove Markdown fences (``` ... ``` with an optional language tag).
    let mut inner = text;
    if let Some(after_first) = inner.splitn(2, '\n').nth(1) {
        inner = after_first;
    }
    if let Some(end) = inner.rfind("```") {
        inner = &inner[..end];
    }
    inner.trim()
}

fn snippet(text: &str) -> String {
    const MAX: usize = 120;
    let trimmed = text.trim();
    if trimmed.len() <= MAX {
        trimmed.to_string()
    } else {
        let cut = trimmed
            .char_indices()
            .take_while(|(i, _)| *i < MAX)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &trimmed[..cut])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plain_list() {
        assert_eq!(
            extract_numeric_list("[100, 101.5, 99]"),
            Some(vec![100.0, 101.5, 99.0])
        );
    }

    #[test]
    fn extracts_list_wrapped_in_prose() {
        let reply = "Here is the forecast:\n[10, 20, 30]\nExplanation: Sales look stable.";
        assert_eq!(extract_numeric_list(reply), Some(vec![10.0, 20.0, 30.0]));
    }

    #[test]
    fn extracts_list_from_fenced_block() {
        let reply = "```python\n[1, 2, 3]\n```\n";
        assert_eq!(extract_numeric_list(reply), Some(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn rejects_reply_without_list() {
        assert_eq!(extract_numeric_list("sales will probably rise"), None);
        assert!(parse_reply("sales will probably rise").is_err());
    }

    #[test]
    fn rejects_empty_and_malformed_lists() {
        assert_eq!(extract_numeric_list("[]"), None);
        assert_eq!(extract_numeric_list("[1, two, 3]"), None);
        assert_eq!(extract_numeric_list("]1, 2["), None);
    }

    #[test]
    fn rejects_non_finite_values() {
        assert_eq!(extract_numeric_list("[1, NaN, 3]"), None);
        assert_eq!(extract_numeric_list("[inf]"), None);
    }

    #[test]
    fn explanation_is_optional() {
        let parsed = parse_reply("[1, 2]").unwrap();
        assert_eq!(parsed.explanation, None);

        let parsed = parse_reply("[1, 2]\nExplanation: Demand is steady.").unwrap();
        assert_eq!(parsed.explanation.as_deref(), Some("Demand is steady."));
    }

    #[test]
    fn explanation_prefix_mid_reply_is_found() {
        let reply = "[5, 6]\nSome preamble.\nExplanation: Rising trend.\n";
        assert_eq!(extract_explanation(reply).as_deref(), Some("Rising trend."));
    }
}
