//! 发往 webhook 的 JSON 结构
//!
//! 每个 payload 都带 `type` 字段（`source_message` / `rating`），接收端据此分派。
//! 字段名使用 camelCase，与 n8n 侧 workflow 保持一致。

use serde::Serialize;

use super::event::{AttachmentInfo, IncomingMessage, MemberInfo, MessageSnapshot, UserInfo};
use super::rating::Rating;

/// 消息永久链接使用的 Web 域名
pub const DISCORD_WEB_HOST: &str = "discord.com";

/// Discord snowflake 纪元（2015-01-01T00:00:00Z，毫秒）
pub const DISCORD_EPOCH_MS: i64 = 1_420_070_400_000;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayPayload {
    SourceMessage(SourceMessageEvent),
    Rating(RatingEvent),
}

impl RelayPayload {
    /// `type` 字段的取值，用于日志
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SourceMessage(_) => "source_message",
            Self::Rating(_) => "rating",
        }
    }

    pub fn message_id(&self) -> &str {
        match self {
            Self::SourceMessage(event) => &event.message_id,
            Self::Rating(event) => &event.message_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMessageEvent {
    pub message_id: String,
    pub channel_id: String,
    pub guild_id: Option<String>,
    pub url: String,
    pub author: AuthorSnapshot,
    pub member: Option<MemberSnapshot>,
    pub content: String,
    pub attachments: Vec<AttachmentSnapshot>,
    pub embeds: Vec<serde_json::Value>,
    pub created_timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingEvent {
    pub message_id: String,
    pub channel_id: String,
    pub guild_id: Option<String>,
    pub url: String,
    pub rater: AuthorSnapshot,
    pub rating: Rating,
    pub emoji: String,
    pub original_author: Option<AuthorSnapshot>,
    pub original_content: String,
    /// 处理反应时的时间，不是原消息的创建时间
    pub created_timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorSnapshot {
    pub id: String,
    pub username: String,
    pub discriminator: String,
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot: Option<bool>,
}

impl AuthorSnapshot {
    /// 含 bot 标记的作者快照
    pub fn author(user: &UserInfo) -> Self {
        Self {
            bot: Some(user.bot),
            ..Self::rater(user)
        }
    }

    /// 评分人快照，不带 bot 字段（bot 的反应在此之前已被丢弃）
    pub fn rater(user: &UserInfo) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            discriminator: user.discriminator.clone(),
            tag: format_tag(&user.username, &user.discriminator),
            bot: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSnapshot {
    pub nickname: Option<String>,
    pub display_name: String,
    pub roles: Vec<RoleSnapshot>,
}

impl MemberSnapshot {
    pub fn new(member: &MemberInfo, user: &UserInfo) -> Self {
        Self {
            nickname: member.nickname.clone(),
            display_name: display_name(member, user),
            roles: member
                .roles
                .iter()
                .map(|role| RoleSnapshot {
                    id: role.id.clone(),
                    name: role.name.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleSnapshot {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentSnapshot {
    pub id: String,
    pub name: String,
    pub content_type: Option<String>,
    pub size: u64,
    pub url: String,
    pub proxy_url: String,
}

impl From<&AttachmentInfo> for AttachmentSnapshot {
    fn from(a: &AttachmentInfo) -> Self {
        Self {
            id: a.id.clone(),
            name: a.name.clone(),
            content_type: a.content_type.clone(),
            size: a.size,
            url: a.url.clone(),
            proxy_url: a.proxy_url.clone(),
        }
    }
}

impl SourceMessageEvent {
    pub fn from_message(message: &IncomingMessage) -> Self {
        Self {
            message_id: message.id.clone(),
            channel_id: message.channel_id.clone(),
            guild_id: message.guild_id.clone(),
            url: message_url(message.guild_id.as_deref(), &message.channel_id, &message.id),
            author: AuthorSnapshot::author(&message.author),
            member: message
                .member
                .as_ref()
                .map(|member| MemberSnapshot::new(member, &message.author)),
            content: message.content.clone(),
            attachments: message.attachments.iter().map(AttachmentSnapshot::from).collect(),
            embeds: message.embeds.clone(),
            created_timestamp: message.created_timestamp,
        }
    }
}

impl RatingEvent {
    pub fn new(
        rater: &UserInfo,
        rating: Rating,
        emoji: &str,
        rated: &MessageSnapshot,
        processed_at_ms: i64,
    ) -> Self {
        let reference = &rated.reference;
        Self {
            message_id: reference.message_id.clone(),
            channel_id: reference.channel_id.clone(),
            guild_id: reference.guild_id.clone(),
            url: message_url(
                reference.guild_id.as_deref(),
                &reference.channel_id,
                &reference.message_id,
            ),
            rater: AuthorSnapshot::rater(rater),
            rating,
            emoji: emoji.to_string(),
            original_author: rated.author.as_ref().map(AuthorSnapshot::author),
            original_content: rated.content.clone(),
            created_timestamp: processed_at_ms,
        }
    }
}

/// 两条路径共用的 tag 格式：新用户名体系（discriminator 为 "0"）只用用户名
pub fn format_tag(username: &str, discriminator: &str) -> String {
    match discriminator.trim() {
        "" | "0" => username.to_string(),
        disc => format!("{}#{}", username, disc),
    }
}

/// 消息永久链接；私信使用 `@me`
pub fn message_url(guild_id: Option<&str>, channel_id: &str, message_id: &str) -> String {
    format!(
        "https://{}/channels/{}/{}/{}",
        DISCORD_WEB_HOST,
        guild_id.unwrap_or("@me"),
        channel_id,
        message_id
    )
}

/// 从 snowflake 高 42 位取创建时间（epoch 毫秒）
pub fn snowflake_timestamp_ms(id: u64) -> i64 {
    ((id >> 22) as i64) + DISCORD_EPOCH_MS
}

/// 昵称 → 全局显示名 → 用户名
fn display_name(member: &MemberInfo, user: &UserInfo) -> String {
    member
        .nickname
        .clone()
        .or_else(|| user.global_name.clone())
        .unwrap_or_else(|| user.username.clone())
}
