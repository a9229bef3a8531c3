//! 测试专用 WebhookSink / MessageFetcher
//!
//! RecordingSink 记录每次 deliver 的 (url, JSON body)，不发任何 HTTP；
//! StubFetcher 返回预设快照或错误，并统计调用次数。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use discord_relay::relay::{FetchError, MessageFetcher, MessageRef, MessageSnapshot, RelayPayload};
use discord_relay::webhook::{DeliveryOutcome, WebhookSink};

/// 记录所有投递，按预设 outcome 返回（默认 204）
pub struct RecordingSink {
    calls: Mutex<Vec<(String, serde_json::Value)>>,
    outcome: DeliveryOutcome,
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::returning(DeliveryOutcome::Delivered { status: 204 })
    }
}

impl RecordingSink {
    pub fn returning(outcome: DeliveryOutcome) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            outcome,
        }
    }

    pub fn calls(&self) -> Vec<(String, serde_json::Value)> {
        self.calls.lock().expect("RecordingSink mutex 中毒").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("RecordingSink mutex 中毒").len()
    }
}

#[async_trait]
impl WebhookSink for RecordingSink {
    async fn deliver(&self, url: &str, payload: &RelayPayload) -> DeliveryOutcome {
        let body = serde_json::to_value(payload).expect("payload 序列化失败");
        self.calls
            .lock()
            .expect("RecordingSink mutex 中毒")
            .push((url.to_string(), body));
        self.outcome.clone()
    }
}

/// 预设结果的 fetcher；snapshot 为 None 时模拟消息已被删除
pub struct StubFetcher {
    snapshot: Option<MessageSnapshot>,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn returning(snapshot: MessageSnapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            snapshot: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageFetcher for StubFetcher {
    async fn fetch_message(&self, reference: &MessageRef) -> Result<MessageSnapshot, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.snapshot {
            Some(snapshot) => Ok(MessageSnapshot {
                reference: reference.clone(),
                ..snapshot.clone()
            }),
            None => Err(FetchError::Platform("Unknown Message".to_string())),
        }
    }
}
