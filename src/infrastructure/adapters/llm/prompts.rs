//! 系统提示词
//!
//! 优先读取 `{prompts_dir}/{name}_system_prompt.txt`，不存在时使用内置默认值。

use std::path::Path;

use crate::application::ports::CollaboratorError;

const DEFAULT_EXTRACT_PROMPT: &str = "You read a section of a novel and extract visual descriptions. \
Reply with a single JSON object and nothing else, using this shape: \
{\"characters\": [{\"name\": string, \"description\": string}], \
\"locations\": [{\"name\": string, \"description\": string}], \
\"props\": [{\"name\": string, \"description\": string}], \
\"artstyle\": string}. \
Only include named characters, props and locations that appear in the text. \
Describe physical appearance only: age, build, face, hair, clothing, materials, colors. \
Suggest an artstyle that fits the tone of the text.";

const DEFAULT_CONSOLIDATE_PROMPT: &str = "You receive a JSON array of description records for the same book. \
Merge them into one record with the same shape: \
{\"characters\": [...], \"locations\": [...], \"props\": [...], \"artstyle\": string}. \
Merge entries that refer to the same entity under its most complete name. \
When details conflict, prefer the record listed first. \
Fill sparse or ambiguous descriptions with plausible, consistent details. \
Reply with the JSON object only.";

const DEFAULT_IMAGE_SYSTEM_PROMPT: &str = "You receive a JSON description record followed by the text of one chapter. \
Pick the most visually striking scene of the chapter and write a single prompt for an image generation model. \
Use the record to keep characters, locations and props consistent, and use its artstyle. \
Reply with the prompt text only, at most 120 words.";

/// 提示词类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    ExtractDescriptions,
    ConsolidateDescriptions,
    GenerateImagePrompt,
}

impl PromptKind {
    /// 提示词文件名前缀
    pub fn file_stem(&self) -> &'static str {
        match self {
            PromptKind::ExtractDescriptions => "extract_descriptions",
            PromptKind::ConsolidateDescriptions => "consolidate_descriptions",
            PromptKind::GenerateImagePrompt => "generate_image_prompt",
        }
    }

    fn default_text(&self) -> &'static str {
        match self {
            PromptKind::ExtractDescriptions => DEFAULT_EXTRACT_PROMPT,
            PromptKind::ConsolidateDescriptions => DEFAULT_CONSOLIDATE_PROMPT,
            PromptKind::GenerateImagePrompt => DEFAULT_IMAGE_SYSTEM_PROMPT,
        }
    }
}

/// 三类系统提示词
#[derive(Debug, Clone)]
pub struct SystemPrompts {
    extract: String,
    consolidate: String,
    scene: String,
}

impl Default for SystemPrompts {
    fn default() -> Self {
        Self {
            extract: DEFAULT_EXTRACT_PROMPT.to_string(),
            consolidate: DEFAULT_CONSOLIDATE_PROMPT.to_string(),
            scene: DEFAULT_IMAGE_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl SystemPrompts {
    /// 从目录加载，缺失的文件使用默认值
    pub fn load(dir: Option<&Path>) -> Result<Self, CollaboratorError> {
        let Some(dir) = dir else {
            return Ok(Self::default());
        };
        Ok(Self {
            extract: load_one(dir, PromptKind::ExtractDescriptions)?,
            consolidate: load_one(dir, PromptKind::ConsolidateDescriptions)?,
            scene: load_one(dir, PromptKind::GenerateImagePrompt)?,
        })
    }

    pub fn get(&self, kind: PromptKind) -> &str {
        match kind {
            PromptKind::ExtractDescriptions => &self.extract,
            PromptKind::ConsolidateDescriptions => &self.consolidate,
            PromptKind::GenerateImagePrompt => &self.scene,
        }
    }
}

fn load_one(dir: &Path, kind: PromptKind) -> Result<String, CollaboratorError> {
    let path = dir.join(format!("{}_system_prompt.txt", kind.file_stem()));
    if !path.is_file() {
        tracing::debug!(prompt = kind.file_stem(), "Using built-in system prompt");
        return Ok(kind.default_text().to_string());
    }
    let text = std::fs::read_to_string(&path).map_err(|e| {
        CollaboratorError::Configuration(format!("cannot read {}: {}", path.display(), e))
    })?;
    tracing::info!(path = %path.display(), "System prompt loaded");
    Ok(text)
}
