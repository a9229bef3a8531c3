pub mod dispatch;
pub mod event;
pub mod filter;
pub mod payload;
pub mod rating;
pub mod traits;

pub use dispatch::{Disposition, DropReason, Relay, RelaySettings};
pub use event::{
    AttachmentInfo, IncomingMessage, IncomingReaction, MemberInfo, MessageRef, MessageSnapshot,
    RatedMessage, RoleInfo, UserInfo,
};
pub use filter::ScopeFilter;
pub use payload::{
    format_tag, message_url, snowflake_timestamp_ms, RatingEvent, RelayPayload, SourceMessageEvent,
};
pub use rating::Rating;
pub use traits::{FetchError, MessageFetcher};
