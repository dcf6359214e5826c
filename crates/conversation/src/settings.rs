use chrono_tz::Tz;
use serde::Deserialize;

/// Tunables of the conversation layer. Every key is optional.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConversationSettings {
    /// Days covered by the statistics command.
    pub stats_window_days: i64,
    pub history_limit: u64,
    pub edit_candidates: u64,
    pub delete_candidates: u64,
    pub export_timeout_secs: u64,
    /// Timezone used to display dates.
    pub timezone: Tz,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            stats_window_days: 30,
            history_limit: 10,
            edit_candidates: 5,
            delete_candidates: 10,
            export_timeout_secs: 30,
            timezone: Tz::UTC,
        }
    }
}
