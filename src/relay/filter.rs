use super::dispatch::DropReason;

/// guild / channel 作用域过滤（None = 不限制）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeFilter {
    pub guild_id: Option<String>,
    pub channel_id: Option<String>,
}

impl ScopeFilter {
    pub fn new(guild_id: Option<String>, channel_id: Option<String>) -> Self {
        Self {
            guild_id,
            channel_id,
        }
    }

    /// 先比 guild 再比 channel；事件没有 guild（私信）时 guild 过滤放行
    pub fn check(&self, guild_id: Option<&str>, channel_id: &str) -> Result<(), DropReason> {
        if let (Some(wanted), Some(actual)) = (self.guild_id.as_deref(), guild_id) {
            if wanted != actual {
                return Err(DropReason::GuildMismatch);
            }
        }

        if let Some(wanted) = self.channel_id.as_deref() {
            if wanted != channel_id {
                return Err(DropReason::ChannelMismatch);
            }
        }

        Ok(())
    }
}
