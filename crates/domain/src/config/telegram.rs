use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Telegram Bot API
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default = "d_api_base")]
    pub api_base: String,
    /// Environment variable holding the bot token.  Takes precedence over
    /// the inline `token` so secrets can stay out of the config file.
    #[serde(default = "d_token_env")]
    pub token_env: String,
    #[serde(default)]
    pub token: Option<String>,
    /// Operator chat that receives error reports and the shutdown notice.
    #[serde(default)]
    pub log_chat_id: String,
    #[serde(default = "d_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: d_api_base(),
            token_env: d_token_env(),
            token: None,
            log_chat_id: String::new(),
            timeout_ms: d_timeout_ms(),
        }
    }
}

impl TelegramConfig {
    /// Resolve the bot token: environment variable first, then the inline value.
    pub fn resolve_token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| self.token.clone().filter(|t| !t.is_empty()))
    }
}

fn d_api_base() -> String {
    "https://api.telegram.org".into()
}
fn d_token_env() -> String {
    "DP_TELEGRAM_TOKEN".into()
}
fn d_timeout_ms() -> u64 {
    15_000
}
