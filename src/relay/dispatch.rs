use std::sync::Arc;

use tracing::{debug, info, warn};

use super::event::{IncomingMessage, IncomingReaction};
use super::filter::ScopeFilter;
use super::payload::{RatingEvent, RelayPayload, SourceMessageEvent};
use super::rating::Rating;
use super::traits::MessageFetcher;
use crate::config::Config;
use crate::webhook::{DeliveryOutcome, WebhookSink};

/// Relay 的只读设置，启动时由 Config 构造后注入
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySettings {
    pub guild_id: Option<String>,
    pub source_channel_id: Option<String>,
    pub rating_channel_id: Option<String>,
    pub source_url: Option<String>,
    pub rating_url: Option<String>,
    pub include_bot_messages: bool,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            guild_id: None,
            source_channel_id: None,
            rating_channel_id: None,
            source_url: None,
            rating_url: None,
            include_bot_messages: true,
        }
    }
}

impl RelaySettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            guild_id: config.filters.guild_id.clone(),
            source_channel_id: config.filters.source_channel_id.clone(),
            rating_channel_id: config.filters.rating_channel_id.clone(),
            source_url: non_blank(&config.webhooks.source_url),
            rating_url: non_blank(&config.webhooks.rating_url),
            include_bot_messages: config.relay.include_bot_messages,
        }
    }

    pub fn source_scope(&self) -> ScopeFilter {
        ScopeFilter::new(self.guild_id.clone(), self.source_channel_id.clone())
    }

    pub fn rating_scope(&self) -> ScopeFilter {
        ScopeFilter::new(self.guild_id.clone(), self.rating_channel_id.clone())
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// 事件被丢弃的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    GuildMismatch,
    ChannelMismatch,
    BotAuthor,
    BotReactor,
    NotARating,
    NoEndpoint,
    FetchFailed,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GuildMismatch => "guild_mismatch",
            Self::ChannelMismatch => "channel_mismatch",
            Self::BotAuthor => "bot_author",
            Self::BotReactor => "bot_reactor",
            Self::NotARating => "not_a_rating",
            Self::NoEndpoint => "no_endpoint",
            Self::FetchFailed => "fetch_failed",
        }
    }
}

/// 单个事件的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// 已尝试一次 POST（无论成功与否）
    Forwarded(DeliveryOutcome),
    Dropped(DropReason),
}

impl Disposition {
    pub fn is_forwarded(&self) -> bool {
        matches!(self, Self::Forwarded(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Forwarded(outcome) => outcome.label(),
            Self::Dropped(reason) => reason.as_str(),
        }
    }
}

/// 事件转发器：过滤 → 规范化 → 尽力投递
///
/// 除只读设置外不持有任何状态，处理函数不会返回错误。
pub struct Relay {
    settings: RelaySettings,
    sink: Arc<dyn WebhookSink>,
}

impl Relay {
    pub fn new(settings: RelaySettings, sink: Arc<dyn WebhookSink>) -> Self {
        Self { settings, sink }
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    /// 处理新消息
    pub async fn handle_message(&self, message: &IncomingMessage) -> Disposition {
        if let Err(reason) = self
            .settings
            .source_scope()
            .check(message.guild_id.as_deref(), &message.channel_id)
        {
            return Disposition::Dropped(reason);
        }

        if message.author.bot && !self.settings.include_bot_messages {
            return Disposition::Dropped(DropReason::BotAuthor);
        }

        let Some(url) = self.settings.source_url.as_deref() else {
            warn!("未配置 source webhook，跳过消息 {}", message.id);
            return Disposition::Dropped(DropReason::NoEndpoint);
        };

        let payload = RelayPayload::SourceMessage(SourceMessageEvent::from_message(message));

        // 只记 id 和 bot 标记，不记消息内容
        info!(
            "转发消息 → source webhook [id={}, bot={}]",
            message.id, message.author.bot
        );
        Disposition::Forwarded(self.sink.deliver(url, &payload).await)
    }

    /// 处理新增反应；Partial 消息会先通过 fetcher 拉取完整内容
    pub async fn handle_reaction(
        &self,
        reaction: IncomingReaction,
        fetcher: &dyn MessageFetcher,
    ) -> Disposition {
        if reaction.reactor.bot {
            return Disposition::Dropped(DropReason::BotReactor);
        }

        let message_id = reaction.message.reference().message_id.clone();
        let rated = match reaction.message.materialize(fetcher).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("获取被评分消息失败 [id={}]: {}", message_id, e);
                return Disposition::Dropped(DropReason::FetchFailed);
            }
        };

        if let Err(reason) = self.settings.rating_scope().check(
            rated.reference.guild_id.as_deref(),
            &rated.reference.channel_id,
        ) {
            return Disposition::Dropped(reason);
        }

        let Some(rating) = Rating::from_emoji(&reaction.emoji) else {
            debug!("忽略非评分反应 [id={}]", message_id);
            return Disposition::Dropped(DropReason::NotARating);
        };

        let Some(url) = self.settings.rating_url.as_deref() else {
            warn!("未配置 rating webhook，跳过评分 [id={}]", message_id);
            return Disposition::Dropped(DropReason::NoEndpoint);
        };

        let processed_at = chrono::Utc::now().timestamp_millis();
        let payload = RelayPayload::Rating(RatingEvent::new(
            &reaction.reactor,
            rating,
            &reaction.emoji,
            &rated,
            processed_at,
        ));

        info!(
            "转发评分 → rating webhook [id={}, rating={}, rater={}]",
            message_id,
            rating.value(),
            reaction.reactor.id
        );
        Disposition::Forwarded(self.sink.deliver(url, &payload).await)
    }
}
