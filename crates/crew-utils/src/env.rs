//! Environment access
//!
//! Configuration is read through [`EnvSource`] so it can be validated once at
//! startup and swapped for a plain map in tests.

use std::collections::HashMap;

/// Source of configuration values keyed by variable name
pub trait EnvSource {
    /// Look up a variable; empty values count as absent
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.trim().is_empty()).cloned()
    }
}

impl EnvSource for HashMap<&str, &str> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key)
            .filter(|v| !v.trim().is_empty())
            .map(|v| (*v).to_string())
    }
}

/// Load a `.env` file from the current directory or its parents, if any
///
/// Returns the path that was loaded.
pub fn load_dotenv() -> Option<std::path::PathBuf> {
    dotenvy::dotenv().ok()
}

/// Shorten a secret to a loggable prefix
pub fn mask_secret(secret: &str) -> String {
    let prefix: String = secret.chars().take(4).collect();
    format!("{prefix}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_source() {
        let mut env = HashMap::new();
        env.insert("SERPER_API_KEY", "abc");
        env.insert("EMPTY", "  ");

        assert_eq!(env.var("SERPER_API_KEY"), Some("abc".to_string()));
        assert_eq!(env.var("EMPTY"), None);
        assert_eq!(env.var("MISSING"), None);
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("sk-1234567890"), "sk-1...");
        assert_eq!(mask_secret("ab"), "ab...");
    }
}
