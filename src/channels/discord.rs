//! Discord Gateway 适配层（serenity）
//!
//! 把 serenity 的 Message / Reaction 转成 `relay::event` 里的平台无关类型，
//! 交给 Relay 处理。适配层自身的失败（如解析反应用户）只记 warn，不影响 Gateway。

use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::eyre::{eyre, Context as _, Result};
use secrecy::ExposeSecret;
use serenity::all::{
    ChannelId, Client, Context, EventHandler, GatewayIntents, Message, MessageId, Reaction,
    ReactionType, Ready, User,
};
use serenity::cache::Settings as CacheSettings;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::relay::{
    snowflake_timestamp_ms, AttachmentInfo, FetchError, IncomingMessage, IncomingReaction,
    MemberInfo, MessageFetcher, MessageRef, MessageSnapshot, RatedMessage, Relay, RoleInfo,
    UserInfo,
};

/// Discord Gateway 事件处理器
pub struct DiscordHandler {
    relay: Arc<Relay>,
}

impl DiscordHandler {
    pub fn new(relay: Arc<Relay>) -> Self {
        Self { relay }
    }

    /// 需要的 Gateway intents（成员信息用于 member/roles 快照）
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
            | GatewayIntents::GUILD_MEMBERS
            | GatewayIntents::GUILD_MESSAGE_REACTIONS
    }
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("Bot 已登录: {}", ready.user.tag());
        let settings = self.relay.settings();
        if let Some(guild_id) = &settings.guild_id {
            info!("限定 guild: {}", guild_id);
        }
        if let Some(channel_id) = &settings.source_channel_id {
            info!("消息来源频道: {}", channel_id);
        }
        if let Some(channel_id) = &settings.rating_channel_id {
            info!("评分频道: {}", channel_id);
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let incoming = incoming_message(&ctx, &msg);
        let disposition = self.relay.handle_message(&incoming).await;
        debug!("messageCreate [{}] → {}", msg.id, disposition.label());
    }

    async fn reaction_add(&self, ctx: Context, reaction: Reaction) {
        let reactor = match reactor_info(&ctx, &reaction).await {
            Ok(user) => user,
            Err(e) => {
                warn!("获取反应用户失败 [message={}]: {}", reaction.message_id, e);
                return;
            }
        };

        let incoming = IncomingReaction {
            emoji: emoji_key(&reaction.emoji),
            reactor,
            message: rated_message(&ctx, &reaction),
        };
        let fetcher = SerenityFetcher { ctx: &ctx };
        let disposition = self.relay.handle_reaction(incoming, &fetcher).await;
        debug!(
            "messageReactionAdd [{}] → {}",
            reaction.message_id,
            disposition.label()
        );
    }
}

/// 通过 HTTP API 拉取未命中缓存的消息
struct SerenityFetcher<'a> {
    ctx: &'a Context,
}

#[async_trait]
impl MessageFetcher for SerenityFetcher<'_> {
    async fn fetch_message(&self, reference: &MessageRef) -> Result<MessageSnapshot, FetchError> {
        let channel_id = ChannelId::new(parse_snowflake(&reference.channel_id)?);
        let message_id = MessageId::new(parse_snowflake(&reference.message_id)?);

        let message = channel_id
            .message(self.ctx, message_id)
            .await
            .map_err(|e| FetchError::Platform(e.to_string()))?;

        Ok(MessageSnapshot {
            reference: reference.clone(),
            author: Some(user_info(&message.author)),
            content: message.content,
        })
    }
}

/// 运行 Discord Gateway，直到连接断开或收到 Ctrl+C
pub async fn run_discord(config: &Config, relay: Arc<Relay>) -> Result<()> {
    let token = config
        .discord
        .token
        .as_ref()
        .ok_or_else(|| eyre!("未设置 Discord Bot Token"))?;

    let mut cache_settings = CacheSettings::default();
    cache_settings.max_messages = config.discord.message_cache_size;

    let mut client = Client::builder(token.expose_secret(), DiscordHandler::intents())
        .event_handler(DiscordHandler::new(relay))
        .cache_settings(cache_settings)
        .await
        .wrap_err("创建 Discord 客户端失败")?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("收到 Ctrl+C，关闭 Gateway 连接");
            shard_manager.shutdown_all().await;
        }
    });

    info!("Discord Gateway 连接中...");
    client.start().await.wrap_err("Discord 登录失败")?;

    Ok(())
}

fn incoming_message(ctx: &Context, msg: &Message) -> IncomingMessage {
    IncomingMessage {
        id: msg.id.to_string(),
        channel_id: msg.channel_id.to_string(),
        guild_id: msg.guild_id.map(|id| id.to_string()),
        author: user_info(&msg.author),
        member: member_info(ctx, msg),
        content: msg.content.clone(),
        attachments: msg
            .attachments
            .iter()
            .map(|a| AttachmentInfo {
                id: a.id.to_string(),
                name: a.filename.clone(),
                content_type: a.content_type.clone(),
                size: u64::from(a.size),
                url: a.url.clone(),
                proxy_url: a.proxy_url.clone(),
            })
            .collect(),
        embeds: msg
            .embeds
            .iter()
            .filter_map(|e| serde_json::to_value(e).ok())
            .collect(),
        created_timestamp: snowflake_timestamp_ms(msg.id.get()),
    }
}

/// 角色名从 guild 缓存读取；缓存未命中时只保留 id
fn member_info(ctx: &Context, msg: &Message) -> Option<MemberInfo> {
    let member = msg.member.as_ref()?;
    let guild = msg.guild_id.and_then(|id| ctx.cache.guild(id));

    let roles = member
        .roles
        .iter()
        .map(|role_id| RoleInfo {
            id: role_id.to_string(),
            name: guild
                .as_ref()
                .and_then(|g| g.roles.get(role_id))
                .map(|role| role.name.clone()),
        })
        .collect();

    Some(MemberInfo {
        nickname: member.nick.clone(),
        roles,
    })
}

fn user_info(user: &User) -> UserInfo {
    UserInfo {
        id: user.id.to_string(),
        username: user.name.clone(),
        discriminator: user
            .discriminator
            .map(|d| format!("{:04}", d.get()))
            .unwrap_or_else(|| "0".to_string()),
        global_name: user.global_name.clone(),
        bot: user.bot,
    }
}

/// 优先用事件自带的 member，否则走缓存 / HTTP
async fn reactor_info(ctx: &Context, reaction: &Reaction) -> serenity::Result<UserInfo> {
    if let Some(member) = &reaction.member {
        return Ok(user_info(&member.user));
    }
    let user = reaction.user(ctx).await?;
    Ok(user_info(&user))
}

/// 命中消息缓存时直接构造完整快照，否则留给 fetcher
fn rated_message(ctx: &Context, reaction: &Reaction) -> RatedMessage {
    let reference = MessageRef {
        message_id: reaction.message_id.to_string(),
        channel_id: reaction.channel_id.to_string(),
        guild_id: reaction.guild_id.map(|id| id.to_string()),
    };

    match ctx.cache.message(reaction.channel_id, reaction.message_id) {
        Some(cached) => RatedMessage::Complete(MessageSnapshot {
            reference,
            author: Some(user_info(&cached.author)),
            content: cached.content.clone(),
        }),
        None => RatedMessage::Partial(reference),
    }
}

/// unicode emoji 原样返回；自定义 emoji 用名字，没有名字时用 id
fn emoji_key(emoji: &ReactionType) -> String {
    match emoji {
        ReactionType::Unicode(s) => s.clone(),
        ReactionType::Custom { id, name, .. } => {
            name.clone().unwrap_or_else(|| id.to_string())
        }
        _ => String::new(),
    }
}

fn parse_snowflake(raw: &str) -> Result<u64, FetchError> {
    match raw.parse::<u64>() {
        Ok(id) if id != 0 => Ok(id),
        _ => Err(FetchError::InvalidReference(raw.to_string())),
    }
}
