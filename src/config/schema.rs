use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Result};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};

use super::error::ConfigError;

/// 全局配置（启动时加载一次，之后只读）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub filters: FilterConfig,
    #[serde(default)]
    pub webhooks: WebhookConfig,
    #[serde(default)]
    pub relay: RelayConfig,
}

/// Discord Gateway 连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot Token（从 Discord Developer Portal 获取），不写回默认值层
    #[serde(default, skip_serializing)]
    pub token: Option<SecretString>,
    /// serenity 消息缓存条数，命中缓存的反应无需再拉取原消息
    #[serde(default = "default_message_cache_size")]
    pub message_cache_size: usize,
}

fn default_message_cache_size() -> usize {
    200
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: None,
            message_cache_size: default_message_cache_size(),
        }
    }
}

/// 作用域过滤（None = 不限制）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    /// 只处理该 guild 的事件
    #[serde(default, deserialize_with = "snowflake_opt")]
    pub guild_id: Option<String>,
    /// 只转发该频道的新消息
    #[serde(default, deserialize_with = "snowflake_opt")]
    pub source_channel_id: Option<String>,
    /// 只转发该频道内的评分反应
    #[serde(default, deserialize_with = "snowflake_opt")]
    pub rating_channel_id: Option<String>,
}

/// Webhook 目标配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// 新消息 payload 的目标 URL
    #[serde(default)]
    pub source_url: Option<String>,
    /// 评分 payload 的目标 URL（缺省时评分事件只记 warn）
    #[serde(default)]
    pub rating_url: Option<String>,
    /// source_url 是否必填；false 时缺省只告警
    #[serde(default = "default_require_source_url")]
    pub require_source_url: bool,
    /// 单次 POST 超时（秒）
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_require_source_url() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    crate::webhook::http::DEFAULT_TIMEOUT_SECS
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            source_url: None,
            rating_url: None,
            require_source_url: default_require_source_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// 转发行为配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// 是否转发 bot 发送的消息，默认 true
    #[serde(default = "default_include_bot_messages")]
    pub include_bot_messages: bool,
}

fn default_include_bot_messages() -> bool {
    true
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            include_bot_messages: default_include_bot_messages(),
        }
    }
}

/// 部署时沿用的扁平环境变量名 → 配置路径
const LEGACY_ENV: &[(&str, &str)] = &[
    ("DISCORD_TOKEN", "discord.token"),
    ("GUILD_ID", "filters.guild_id"),
    ("SOURCE_CHANNEL_ID", "filters.source_channel_id"),
    ("RATING_CHANNEL_ID", "filters.rating_channel_id"),
    ("N8N_SOURCE_WEBHOOK_URL", "webhooks.source_url"),
    ("N8N_RATING_WEBHOOK_URL", "webhooks.rating_url"),
    ("INCLUDE_BOT_MESSAGES", "relay.include_bot_messages"),
];

/// 旧部署的别名，先于 LEGACY_ENV 合并；同时设置时以 LEGACY_ENV 中的名字为准
const LEGACY_ENV_ALIASES: &[(&str, &str)] =
    &[("PROCESSED_CHANNEL_ID", "filters.rating_channel_id")];

/// 默认配置 TOML 模板
const DEFAULT_CONFIG_TOML: &str = r#"# discord-relay 配置
# 所有字段都可以用环境变量覆盖，例如 DISCORD_TOKEN、N8N_SOURCE_WEBHOOK_URL，
# 或 DISCORD_RELAY_FILTERS__GUILD_ID 这样的嵌套写法。

[discord]
# token = "your-bot-token"
message_cache_size = 200

[filters]
# guild_id = "123456789012345678"
# source_channel_id = "123456789012345678"
# rating_channel_id = "123456789012345678"

[webhooks]
# source_url = "https://n8n.example.com/webhook/source"
# rating_url = "https://n8n.example.com/webhook/rating"
require_source_url = true
timeout_secs = 30

[relay]
include_bot_messages = true
"#;

impl Config {
    /// 返回配置文件路径: `~/.discord-relay/config.toml`
    pub fn config_path() -> Result<PathBuf> {
        let base_dirs = directories::BaseDirs::new()
            .ok_or_else(|| color_eyre::eyre::eyre!("无法获取 home 目录"))?;
        Ok(base_dirs
            .home_dir()
            .join(".discord-relay")
            .join("config.toml"))
    }

    /// 写入默认配置模板；已存在时返回 false，不覆盖
    pub fn write_default(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).wrap_err("创建配置目录失败")?;
        }
        std::fs::write(path, DEFAULT_CONFIG_TOML).wrap_err("写入默认配置失败")?;
        Ok(true)
    }

    /// 默认值 + 配置文件（不读取环境变量）
    pub fn file_figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
    }

    /// 完整加载链：默认值 → 配置文件 → DISCORD_RELAY_* → 扁平环境变量（别名 → 正式名）
    pub fn figment(path: &Path) -> Figment {
        Self::file_figment(path)
            .merge(Env::prefixed("DISCORD_RELAY_").split("__"))
            .merge(legacy_env(LEGACY_ENV_ALIASES))
            .merge(legacy_env(LEGACY_ENV))
    }

    /// 从指定路径加载配置（figment 多层合并）；文件不存在时只用默认值和环境变量
    pub fn load_from_path(path: &Path) -> Result<Self> {
        Self::from_figment(Self::figment(path))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().wrap_err("解析配置失败")?;
        Ok(config)
    }

    /// 启动校验，任何错误都应导致进程退出
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        match &self.discord.token {
            Some(token) if !token.expose_secret().trim().is_empty() => {}
            _ => return Err(ConfigError::MissingToken),
        }

        if self.webhooks.require_source_url && blank(&self.webhooks.source_url) {
            return Err(ConfigError::MissingSourceWebhook);
        }

        for (field, url) in [
            ("webhooks.source_url", &self.webhooks.source_url),
            ("webhooks.rating_url", &self.webhooks.rating_url),
        ] {
            if let Some(url) = url.as_deref().filter(|u| !u.trim().is_empty()) {
                check_webhook_url(field, url)?;
            }
        }

        for (field, id) in [
            ("filters.guild_id", &self.filters.guild_id),
            ("filters.source_channel_id", &self.filters.source_channel_id),
            ("filters.rating_channel_id", &self.filters.rating_channel_id),
        ] {
            if let Some(id) = id {
                check_snowflake(field, id)?;
            }
        }

        if self.webhooks.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(())
    }

    /// 非致命的配置问题，启动时逐条 warn
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if blank(&self.webhooks.source_url) {
            warnings.push("未设置 webhooks.source_url，新消息不会被转发".to_string());
        }
        if blank(&self.webhooks.rating_url) {
            warnings.push("未设置 webhooks.rating_url，评分反应不会被转发".to_string());
        }
        warnings
    }
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

fn check_webhook_url(field: &'static str, raw: &str) -> std::result::Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidWebhookUrl {
        field,
        url: raw.to_string(),
        reason,
    };
    let parsed = url::Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("不支持的协议 {}", other))),
    }
}

fn check_snowflake(field: &'static str, raw: &str) -> std::result::Result<(), ConfigError> {
    match raw.parse::<u64>() {
        Ok(id) if id != 0 => Ok(()),
        _ => Err(ConfigError::InvalidSnowflake {
            field,
            value: raw.to_string(),
        }),
    }
}

/// 扁平环境变量映射，未列出的变量一律忽略
fn legacy_env(table: &'static [(&'static str, &'static str)]) -> Env {
    Env::raw().filter_map(move |key| {
        table
            .iter()
            .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
            .map(|(_, path)| (*path).into())
    })
}

/// 环境变量里的纯数字 id 会被 figment 解析成整数，这里统一成字符串
fn snowflake_opt<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Num(u64),
        Text(String),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Num(n)) => Some(n.to_string()),
        Some(RawId::Text(s)) => {
            let s = s.trim().to_string();
            (!s.is_empty()).then_some(s)
        }
        None => None,
    })
}
