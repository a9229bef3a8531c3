use serde::Serialize;

/// 评分 emoji 查找表：keycap 1️⃣..4️⃣ 以及同名的纯数字（自定义 emoji 名）
const RATING_EMOJI: &[(&str, u8)] = &[
    ("1\u{FE0F}\u{20E3}", 1),
    ("2\u{FE0F}\u{20E3}", 2),
    ("3\u{FE0F}\u{20E3}", 3),
    ("4\u{FE0F}\u{20E3}", 4),
    ("1", 1),
    ("2", 2),
    ("3", 3),
    ("4", 4),
];

/// 1..=4 的评分
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    /// 不在查找表里的 emoji 不是评分反应，返回 None
    pub fn from_emoji(emoji: &str) -> Option<Self> {
        RATING_EMOJI
            .iter()
            .find(|(key, _)| *key == emoji)
            .map(|(_, value)| Self(*value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}
