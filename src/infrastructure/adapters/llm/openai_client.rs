//! OpenAI Collaborator - 调用 OpenAI 兼容的 chat completions 服务
//!
//! 同时实现提取、合并、场景提示三个端口
//!
//! 外部 API:
//! POST {base_url}/chat/completions
//! Request: {"model": "...", "messages": [{"role": "system", ...}, {"role": "user", ...}]}
//! Response: {"choices": [{"message": {"content": "..."}}]}

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::decode::{decode_record, decode_scene_prompt};
use super::prompts::{PromptKind, SystemPrompts};
use crate::application::ports::{
    generate_cache_key, CollaboratorError, CompletionCachePort, DescriptionEnhancerPort,
    DescriptionExtractorPort, ScenePromptPort,
};
use crate::domain::DescriptionRecord;

/// 退避上限（毫秒）
const MAX_BACKOFF_MS: u64 = 5_000;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI 客户端配置
#[derive(Debug, Clone)]
pub struct OpenAiClientConfig {
    /// 服务基础 URL（不含 /chat/completions）
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    /// 临时故障的最大重试次数
    pub max_retries: u32,
    /// 首次重试前的等待时间（毫秒），之后每次乘以 1.75
    pub initial_backoff_ms: u64,
    /// 系统提示词目录
    pub prompts_dir: Option<PathBuf>,
}

impl Default for OpenAiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4".to_string(),
            timeout_secs: 120,
            max_retries: 3,
            initial_backoff_ms: 750,
            prompts_dir: None,
        }
    }
}

impl OpenAiClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_retries(mut self, max_retries: u32, initial_backoff_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.initial_backoff_ms = initial_backoff_ms;
        self
    }
}

/// 第 `attempt` 次失败后的等待时间（attempt 从 1 开始）
pub fn backoff_delay(initial_ms: u64, attempt: u32) -> Duration {
    let factor = 1.75_f64.powi(attempt.saturating_sub(1) as i32);
    let delay = (initial_ms as f64 * factor).min(MAX_BACKOFF_MS as f64);
    Duration::from_millis(delay as u64)
}

/// OpenAI 协作方
pub struct OpenAiCollaborator {
    client: Client,
    config: OpenAiClientConfig,
    prompts: SystemPrompts,
    cache: Option<Arc<dyn CompletionCachePort>>,
}

impl OpenAiCollaborator {
    pub fn new(config: OpenAiClientConfig) -> Result<Self, CollaboratorError> {
        if config.api_key.trim().is_empty() {
            return Err(CollaboratorError::Configuration(
                "API key is not set".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CollaboratorError::Network(e.to_string()))?;
        let prompts = SystemPrompts::load(config.prompts_dir.as_deref())?;

        Ok(Self {
            client,
            config,
            prompts,
            cache: None,
        })
    }

    /// 启用补全缓存
    pub fn with_cache(mut self, cache: Arc<dyn CompletionCachePort>) -> Self {
        self.cache = Some(cache);
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// 带缓存的补全：命中缓存且可解码时直接返回；只缓存能成功解码的回复
    async fn complete<T>(
        &self,
        kind: PromptKind,
        user_prompt: &str,
        decode: fn(&str) -> Result<T, CollaboratorError>,
    ) -> Result<T, CollaboratorError> {
        let system_prompt = self.prompts.get(kind);
        let cache_key = generate_cache_key(&self.config.model, system_prompt, user_prompt);

        if let Some(cache) = &self.cache {
            match cache.get(&cache_key).await {
                Ok(Some(hit)) => match decode(&hit) {
                    Ok(value) => {
                        tracing::debug!(prompt = kind.file_stem(), "Completion cache hit");
                        return Ok(value);
                    }
                    Err(e) => tracing::warn!(error = %e, "Cached completion no longer decodes"),
                },
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "Completion cache read failed"),
            }
        }

        let content = self.send_with_retry(kind, system_prompt, user_prompt).await?;
        let value = decode(&content)?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(&cache_key, &content).await {
                tracing::warn!(error = %e, "Completion cache write failed");
            }
        }

        Ok(value)
    }

    async fn send_with_retry(
        &self,
        kind: PromptKind,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, CollaboratorError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.send_once(kind, system_prompt, user_prompt).await {
                Ok(content) => return Ok(content),
                Err(e) if e.is_retryable() && attempt <= self.config.max_retries => {
                    let delay = backoff_delay(self.config.initial_backoff_ms, attempt);
                    tracing::warn!(
                        prompt = kind.file_stem(),
                        attempt = attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Completion request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!(
                        prompt = kind.file_stem(),
                        attempt = attempt,
                        error = %e,
                        "Completion request failed"
                    );
                    return Err(e);
                }
            }
        }
    }

    async fn send_once(
        &self,
        kind: PromptKind,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, CollaboratorError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
        };

        tracing::debug!(
            url = %self.completions_url(),
            model = %self.config.model,
            prompt = kind.file_stem(),
            user_len = user_prompt.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CollaboratorError::Timeout
                } else if e.is_connect() {
                    CollaboratorError::Network(format!("Cannot connect to LLM service: {}", e))
                } else {
                    CollaboratorError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::Service {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::Decode(format!("invalid completion response: {}", e)))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CollaboratorError::Decode("completion has no content".to_string()))?;

        tracing::info!(
            prompt = kind.file_stem(),
            content_len = content.len(),
            "Completion received"
        );

        Ok(content)
    }
}

fn encode_records(records: &[DescriptionRecord]) -> Result<String, CollaboratorError> {
    serde_json::to_string(records)
        .map_err(|e| CollaboratorError::Decode(format!("cannot encode records: {}", e)))
}

#[async_trait]
impl DescriptionExtractorPort for OpenAiCollaborator {
    async fn extract(&self, section: &str) -> Result<DescriptionRecord, CollaboratorError> {
        self.complete(PromptKind::ExtractDescriptions, section, decode_record)
            .await
    }
}

#[async_trait]
impl DescriptionEnhancerPort for OpenAiCollaborator {
    async fn enhance(
        &self,
        records: &[DescriptionRecord],
    ) -> Result<DescriptionRecord, CollaboratorError> {
        let user_prompt = encode_records(records)?;
        self.complete(PromptKind::ConsolidateDescriptions, &user_prompt, decode_record)
            .await
    }
}

#[async_trait]
impl ScenePromptPort for OpenAiCollaborator {
    async fn generate(
        &self,
        chapter_text: &str,
        consolidated: &DescriptionRecord,
    ) -> Result<String, CollaboratorError> {
        let record_json = serde_json::to_string(consolidated)
            .map_err(|e| CollaboratorError::Decode(format!("cannot encode record: {}", e)))?;
        let user_prompt = format!("{}\n\n{}", record_json, chapter_text);
        self.complete(PromptKind::GenerateImagePrompt, &user_prompt, decode_scene_prompt)
            .await
    }
}
