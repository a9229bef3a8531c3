//! 平台无关的入站事件
//!
//! Gateway 适配层把 serenity 模型转换成这里的类型，Relay 只认这些类型。

use super::traits::{FetchError, MessageFetcher};

/// 用户快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    /// 旧版四位数字 discriminator，新用户名体系下为 "0"
    pub discriminator: String,
    pub global_name: Option<String>,
    pub bot: bool,
}

/// 角色快照（name 取自 guild 缓存，未命中时为 None）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleInfo {
    pub id: String,
    pub name: Option<String>,
}

/// guild 成员快照
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemberInfo {
    pub nickname: Option<String>,
    pub roles: Vec<RoleInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentInfo {
    pub id: String,
    pub name: String,
    pub content_type: Option<String>,
    pub size: u64,
    pub url: String,
    pub proxy_url: String,
}

/// 新消息事件
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingMessage {
    pub id: String,
    pub channel_id: String,
    pub guild_id: Option<String>,
    pub author: UserInfo,
    pub member: Option<MemberInfo>,
    pub content: String,
    pub attachments: Vec<AttachmentInfo>,
    pub embeds: Vec<serde_json::Value>,
    /// 平台给出的创建时间（epoch 毫秒）
    pub created_timestamp: i64,
}

/// 只含定位信息的消息引用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    pub message_id: String,
    pub channel_id: String,
    pub guild_id: Option<String>,
}

/// 被评分消息的完整快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSnapshot {
    pub reference: MessageRef,
    pub author: Option<UserInfo>,
    pub content: String,
}

/// 被评分的消息：可能只有引用（Partial），需要拉取后才能读内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RatedMessage {
    Partial(MessageRef),
    Complete(MessageSnapshot),
}

impl RatedMessage {
    pub fn reference(&self) -> &MessageRef {
        match self {
            Self::Partial(reference) => reference,
            Self::Complete(snapshot) => &snapshot.reference,
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, Self::Partial(_))
    }

    /// 升级为完整快照；Complete 直接返回，Partial 走一次 fetch
    pub async fn materialize(
        self,
        fetcher: &dyn MessageFetcher,
    ) -> Result<MessageSnapshot, FetchError> {
        match self {
            Self::Complete(snapshot) => Ok(snapshot),
            Self::Partial(reference) => fetcher.fetch_message(&reference).await,
        }
    }
}

/// 新增反应事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingReaction {
    /// unicode emoji 本身，或自定义 emoji 的名字
    pub emoji: String,
    pub reactor: UserInfo,
    pub message: RatedMessage,
}
