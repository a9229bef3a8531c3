use thiserror::Error;

/// 启动期配置错误（致命，进程以 1 退出）
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("未设置 Discord Bot Token，请设置环境变量 DISCORD_TOKEN 或 [discord] token")]
    MissingToken,

    #[error("未设置 source webhook，请设置环境变量 N8N_SOURCE_WEBHOOK_URL 或 [webhooks] source_url")]
    MissingSourceWebhook,

    #[error("{field} 不是合法的 webhook URL ({url}): {reason}")]
    InvalidWebhookUrl {
        field: &'static str,
        url: String,
        reason: String,
    },

    #[error("{field} 不是合法的 Discord id: {value}")]
    InvalidSnowflake { field: &'static str, value: String },

    #[error("webhooks.timeout_secs 不能为 0")]
    ZeroTimeout,
}
