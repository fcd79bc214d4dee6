//! API utilities for frontend-backend communication
//!
//! Provides helper functions for constructing API URLs.

/// Порт REST-бэкенда по умолчанию
pub const DEFAULT_API_PORT: u16 = 8000;

/// Ключ `localStorage` для явного адреса бэкенда (например, `https://api.example.com`)
pub const API_BASE_OVERRIDE_KEY: &str = "api_base_url";

/// Get the base URL for API requests
///
/// An explicit origin stored under [`API_BASE_OVERRIDE_KEY`] wins; otherwise the
/// URL is built from the current window location on [`DEFAULT_API_PORT`].
///
/// # Returns
/// - API base URL like "http://localhost:8000" or "https://example.com:8000"
/// - Empty string if window is not available
pub fn api_base() -> String {
    let window = match web_sys::window() {
        Some(w) => w,
        None => return String::new(),
    };

    let override_base = window
        .local_storage()
        .ok()
        .flatten()
        .and_then(|storage| storage.get_item(API_BASE_OVERRIDE_KEY).ok().flatten());
    if let Some(base) = override_base.as_deref().and_then(normalize_base) {
        return base;
    }

    let location = window.location();
    let protocol = location.protocol().unwrap_or_else(|_| "http:".to_string());
    let hostname = location
        .hostname()
        .unwrap_or_else(|_| "127.0.0.1".to_string());
    format!("{}//{}:{}", protocol, hostname, DEFAULT_API_PORT)
}

/// Build a full API URL from a path
///
/// # Example
/// ```rust,ignore
/// let url = api_url("/storage/warehouses/");
/// ```
pub fn api_url(path: &str) -> String {
    join_url(&api_base(), path)
}

/// Убрать хвостовые `/`; пустое значение означает «не задано»
fn normalize_base(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn join_url(base: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base() {
        assert_eq!(
            normalize_base("https://api.example.com/"),
            Some("https://api.example.com".to_string())
        );
        assert_eq!(normalize_base("   "), None);
    }

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://h:8000", "/storage/trays/3/"),
            "http://h:8000/storage/trays/3/"
        );
        assert_eq!(
            join_url("http://h:8000", "storage/trays/"),
            "http://h:8000/storage/trays/"
        );
    }
}
