//! Environment variable helpers

/// Load `.env` from the working directory or its parents, if present
///
/// Variables already set in the process win over the file. Returns the path
/// that was loaded.
pub fn load_dotenv() -> Option<std::path::PathBuf> {
    dotenvy::dotenv().ok()
}

/// Non-empty, trimmed value of `key`
pub fn env_opt(key: &str) -> Option<String> {
    non_empty(std::env::var(key).ok())
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("  abc ".to_string())), Some("abc".to_string()));
        assert_eq!(non_empty(Some("   ".to_string())), None);
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn test_env_opt_missing_key() {
        assert_eq!(env_opt("ENERGY_UTILS_TEST_SURELY_UNSET_KEY"), None);
    }
}
