//! 补全结果解码
//!
//! 模型回复可能包在 Markdown 代码块中，解码前先剥掉围栏。

use crate::application::ports::CollaboratorError;
use crate::domain::DescriptionRecord;

/// 去掉 ```json ... ``` 围栏，没有围栏时原样返回（去除首尾空白）
///
/// 围栏可以与正文同行；闭合围栏之后的文字被丢弃。
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // 跳过语言标记：独占首行，或与正文同行
    let body = match rest.find('\n') {
        Some(newline) if rest[..newline].trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
            &rest[newline + 1..]
        }
        _ => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    match body.rfind("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// 将补全文本解码为描述记录，并校验条目名称
pub fn decode_record(content: &str) -> Result<DescriptionRecord, CollaboratorError> {
    let json = strip_code_fence(content);
    let record: DescriptionRecord = serde_json::from_str(json)
        .map_err(|e| CollaboratorError::Decode(format!("invalid description record: {}", e)))?;
    record.validate().map_err(CollaboratorError::Decode)?;
    Ok(record)
}

/// 场景提示词为自由文本，只要求非空
pub fn decode_scene_prompt(content: &str) -> Result<String, CollaboratorError> {
    let prompt = content.trim();
    if prompt.is_empty() {
        return Err(CollaboratorError::Decode("empty scene prompt".to_string()));
    }
    Ok(prompt.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {} \n"), "{}");
    }

    #[test]
    fn test_strip_inline_fence() {
        assert_eq!(strip_code_fence("```json {\"a\":1} ```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json {\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn test_strip_fence_with_trailing_prose() {
        assert_eq!(
            strip_code_fence("```json\n{\"a\":1}\n```\nHope this helps!"),
            "{\"a\":1}"
        );
    }

    #[test]
    fn test_decode_inline_and_trailing_prose() {
        let inline = decode_record("```json {\"artstyle\":\"ink\"} ```").unwrap();
        assert_eq!(inline.artstyle, "ink");

        let trailing =
            decode_record("```json\n{\"artstyle\":\"ink\"}\n```\nHope this helps!").unwrap();
        assert_eq!(trailing.artstyle, "ink");
    }

    #[test]
    fn test_decode_fenced_record() {
        let content = "```json\n{\"characters\":[{\"name\":\"Ahab\",\"description\":\"one leg\"}],\"artstyle\":\"ink\"}\n```";
        let record = decode_record(content).unwrap();
        assert_eq!(record.characters[0].name, "Ahab");
        assert_eq!(record.artstyle, "ink");
    }

    #[test]
    fn test_decode_malformed_json() {
        assert!(matches!(
            decode_record("Sure! Here are the characters:"),
            Err(CollaboratorError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        assert!(matches!(
            decode_record(r#"{"characters":"Ahab"}"#),
            Err(CollaboratorError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_rejects_empty_name() {
        assert!(matches!(
            decode_record(r#"{"locations":[{"name":"","description":"sea"}]}"#),
            Err(CollaboratorError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_scene_prompt() {
        assert_eq!(decode_scene_prompt("  Oil painting of a whale.\n").unwrap(), "Oil painting of a whale.");
        assert!(decode_scene_prompt("   ").is_err());
    }
}
