use async_trait::async_trait;
use thiserror::Error;

use super::event::{MessageRef, MessageSnapshot};

/// 拉取消息失败（消息或反应可能已被删除）
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("无效的消息引用: {0}")]
    InvalidReference(String),
    #[error("平台返回错误: {0}")]
    Platform(String),
}

/// 把 Partial 消息升级为完整快照
#[async_trait]
pub trait MessageFetcher: Send + Sync {
    async fn fetch_message(&self, reference: &MessageRef) -> Result<MessageSnapshot, FetchError>;
}
