use std::time::Duration;

use async_trait::async_trait;
use color_eyre::eyre::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, error};

use super::traits::{DeliveryOutcome, WebhookSink};
use crate::relay::RelayPayload;

/// 默认超时（秒）
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// 只保留协议、主机和端口，路径与查询串统一打码（webhook 路径通常就是密钥）
pub fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(parsed) => {
            let origin = parsed.origin().ascii_serialization();
            if parsed.path() == "/" && parsed.query().is_none() {
                origin
            } else {
                format!("{}/***", origin)
            }
        }
        Err(_) => "(无效 URL)".to_string(),
    }
}

/// 基于 reqwest 的 webhook 投递：一次 POST，失败只记日志
pub struct HttpWebhookSink {
    client: reqwest::Client,
}

impl HttpWebhookSink {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("discord-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .wrap_err("创建 HTTP 客户端失败")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WebhookSink for HttpWebhookSink {
    async fn deliver(&self, url: &str, payload: &RelayPayload) -> DeliveryOutcome {
        // webhook URL 里通常带密钥路径，日志只记 payload 类型和消息 id
        let response = match self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(payload)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                error!(
                    "Webhook POST 出错 [{} id={}]: {}",
                    payload.kind(),
                    payload.message_id(),
                    e
                );
                return DeliveryOutcome::Failed {
                    error: e.to_string(),
                };
            }
        };

        let status = response.status();
        if status.is_success() {
            debug!(
                "Webhook POST 成功 [{} id={}]: {}",
                payload.kind(),
                payload.message_id(),
                status
            );
            return DeliveryOutcome::Delivered {
                status: status.as_u16(),
            };
        }

        let body = response.text().await.unwrap_or_default();
        error!(
            "Webhook POST 失败 ({} {}) [{} id={}]: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            payload.kind(),
            payload.message_id(),
            body
        );
        DeliveryOutcome::Rejected {
            status: status.as_u16(),
            body,
        }
    }
}
