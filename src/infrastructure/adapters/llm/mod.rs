//! LLM Adapter - 协作方实现
//!
//! OpenAI 兼容服务客户端与离线模式的本地实现

mod decode;
mod local_collaborator;
mod openai_client;
mod prompts;

pub use decode::{decode_record, decode_scene_prompt, strip_code_fence};
pub use local_collaborator::{LocalCollaborator, DEFAULT_SCENE_PROMPT};
pub use openai_client::{backoff_delay, OpenAiClientConfig, OpenAiCollaborator};
pub use prompts::{PromptKind, SystemPrompts};
