pub mod http;
pub mod traits;

pub use http::{redact_url, HttpWebhookSink};
pub use traits::{DeliveryOutcome, WebhookSink};
