/// Runtime configuration
///
/// The only configurable value is the base URL of the analysis backend.
/// It comes from the environment so deployments can point the app at a
/// remote backend without rebuilding.

use std::env;

/// Environment variable overriding the backend base URL
pub const API_BASE_URL_VAR: &str = "IMAGE_TO_MUSIC_API_BASE_URL";

/// Default backend when the environment does not say otherwise
const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// Resolve the backend base URL from the environment
pub fn api_base_url() -> String {
    resolve_base_url(env::var(API_BASE_URL_VAR).ok())
}

/// Resolution rules: blank values count as unset, trailing slashes are
/// trimmed so endpoint paths can always be appended with a single '/'
fn resolve_base_url(env_value: Option<String>) -> String {
    let value = env_value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

    value.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_when_unset() {
        assert_eq!(resolve_base_url(None), "http://localhost:5000/api");
    }

    #[test]
    fn test_blank_counts_as_unset() {
        assert_eq!(
            resolve_base_url(Some("   ".to_string())),
            "http://localhost:5000/api"
        );
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        assert_eq!(
            resolve_base_url(Some("https://api.example.com/api/".to_string())),
            "https://api.example.com/api"
        );
    }

    #[test]
    fn test_custom_value_passes_through() {
        assert_eq!(
            resolve_base_url(Some("http://10.0.0.2:8080/api".to_string())),
            "http://10.0.0.2:8080/api"
        );
    }
}
