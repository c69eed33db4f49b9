use std::path::PathBuf;

pub const DEFAULT_API_BASE: &str = "https://api.cloudflare.com/client/v4";
pub const DEFAULT_MODEL: &str = "@cf/meta/llama-3.1-8b-instruct";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

const PLACEHOLDER_TOKEN: &str = "your-auth-token-here";
const PLACEHOLDER_ACCOUNT: &str = "your-account-id-here";

/// Runtime settings, read from the environment after `.env` is applied.
#[derive(Debug, Clone)]
pub struct Settings {
    pub auth_token: String,
    pub account_id: String,
    pub model: String,
    pub api_base: String,
    pub max_tokens: u32,
    pub ledger_dir: PathBuf,
    pub log_file: PathBuf,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Missing credentials fall back to placeholders; requests made with
    /// them fail at the transport layer instead of at startup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            auth_token: get("CLOUDFLARE_AUTH_TOKEN").unwrap_or_else(|| PLACEHOLDER_TOKEN.to_string()),
            account_id: get("CLOUDFLARE_ACCOUNT_ID")
                .unwrap_or_else(|| PLACEHOLDER_ACCOUNT.to_string()),
            model: get("CLOUDFLARE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: get("CLOUDFLARE_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            max_tokens: DEFAULT_MAX_TOKENS,
            ledger_dir: get("LEDGER_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            log_file: get("LEDGER_DESK_LOG")
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join("ledger-desk.log")),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.auth_token != PLACEHOLDER_TOKEN && self.account_id != PLACEHOLDER_ACCOUNT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_without_env() {
        let s = Settings::from_lookup(|_| None);
        assert_eq!(s.api_base, DEFAULT_API_BASE);
        assert_eq!(s.model, DEFAULT_MODEL);
        assert_eq!(s.max_tokens, 4096);
        assert_eq!(s.ledger_dir, PathBuf::from("."));
        assert!(!s.has_credentials());
    }

    #[test]
    fn reads_overrides_and_ignores_blank() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("CLOUDFLARE_AUTH_TOKEN", "tok"),
            ("CLOUDFLARE_ACCOUNT_ID", "acct"),
            ("CLOUDFLARE_MODEL", "  "),
            ("LEDGER_DIR", "/srv/vouchers"),
        ]);
        let s = Settings::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert!(s.has_credentials());
        assert_eq!(s.account_id, "acct");
        assert_eq!(s.model, DEFAULT_MODEL);
        assert_eq!(s.ledger_dir, PathBuf::from("/srv/vouchers"));
    }
}
