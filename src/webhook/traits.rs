use async_trait::async_trait;

use crate::relay::RelayPayload;

/// 单次投递的结果（尽力而为，不重试）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// 2xx
    Delivered { status: u16 },
    /// 非 2xx，附带响应体文本
    Rejected { status: u16, body: String },
    /// 传输层失败（DNS、连接被拒、超时等）
    Failed { error: String },
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Delivered { status } | Self::Rejected { status, .. } => Some(*status),
            Self::Failed { .. } => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Delivered { .. } => "delivered",
            Self::Rejected { .. } => "rejected",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Webhook 投递抽象
///
/// `deliver` 不返回错误：失败只记录日志并体现在 `DeliveryOutcome` 里，
/// 调用方不需要也不应该处理异常。
#[async_trait]
pub trait WebhookSink: Send + Sync {
    async fn deliver(&self, url: &str, payload: &RelayPayload) -> DeliveryOutcome;
}
