//! 集成测试公共辅助函数
//!
//! 供 relay_flow.rs 和 webhook_http.rs 共用。

// 每个集成测试文件只使用 common 的一部分，未用到的辅助函数属于预期 dead_code
#![allow(dead_code)]

pub mod log_capture;
pub mod recording_sink;
pub use log_capture::LogCapture;
pub use recording_sink::{RecordingSink, StubFetcher};

use std::sync::Arc;

use discord_relay::relay::{
    AttachmentInfo, IncomingMessage, IncomingReaction, MessageRef, MessageSnapshot, RatedMessage,
    Relay, RelaySettings, UserInfo,
};

pub const SOURCE_URL: &str = "https://hooks.test/source";
pub const RATING_URL: &str = "https://hooks.test/rating";

/// 两个 webhook 都已配置、没有任何作用域过滤的设置
pub fn open_settings() -> RelaySettings {
    RelaySettings {
        source_url: Some(SOURCE_URL.to_string()),
        rating_url: Some(RATING_URL.to_string()),
        ..RelaySettings::default()
    }
}

/// 用 RecordingSink 构造 Relay，返回 sink 以便断言
pub fn test_relay(settings: RelaySettings) -> (Relay, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let relay = Relay::new(settings, sink.clone());
    (relay, sink)
}

pub fn user(id: &str, username: &str, bot: bool) -> UserInfo {
    UserInfo {
        id: id.to_string(),
        username: username.to_string(),
        discriminator: "0".to_string(),
        global_name: None,
        bot,
    }
}

/// guild G1 / channel C1 中的一条普通消息
pub fn message(content: &str) -> IncomingMessage {
    IncomingMessage {
        id: "M1".to_string(),
        channel_id: "C1".to_string(),
        guild_id: Some("G1".to_string()),
        author: user("U1", "alice", false),
        member: None,
        content: content.to_string(),
        attachments: vec![],
        embeds: vec![],
        created_timestamp: 1_700_000_000_000,
    }
}

pub fn attachment() -> AttachmentInfo {
    AttachmentInfo {
        id: "a1".to_string(),
        name: "f.png".to_string(),
        content_type: Some("image/png".to_string()),
        size: 10,
        url: "u".to_string(),
        proxy_url: "p".to_string(),
    }
}

pub fn message_ref(guild: Option<&str>, channel: &str) -> MessageRef {
    MessageRef {
        message_id: "M9".to_string(),
        channel_id: channel.to_string(),
        guild_id: guild.map(String::from),
    }
}

pub fn snapshot(guild: Option<&str>, channel: &str, content: &str) -> MessageSnapshot {
    MessageSnapshot {
        reference: message_ref(guild, channel),
        author: Some(user("U2", "bob", false)),
        content: content.to_string(),
    }
}

/// 已缓存（Complete）消息上的反应
pub fn reaction(emoji: &str, channel: &str) -> IncomingReaction {
    IncomingReaction {
        emoji: emoji.to_string(),
        reactor: user("U3", "carol", false),
        message: RatedMessage::Complete(snapshot(Some("G1"), channel, "rated text")),
    }
}

/// 未缓存（Partial）消息上的反应
pub fn partial_reaction(emoji: &str, channel: &str) -> IncomingReaction {
    IncomingReaction {
        emoji: emoji.to_string(),
        reactor: user("U3", "carol", false),
        message: RatedMessage::Partial(message_ref(Some("G1"), channel)),
    }
}
