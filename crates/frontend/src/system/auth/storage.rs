//! Read-only view of the session written by the login page.

use contracts::system::auth::UserInfo;
use web_sys::window;

const ACCESS_TOKEN_KEY: &str = "token";
const USER_KEY: &str = "user";

fn get_local_storage() -> Option<web_sys::Storage> {
    window()?.local_storage().ok()?
}

/// Get access token from localStorage
pub fn get_access_token() -> Option<String> {
    get_local_storage()?
        .get_item(ACCESS_TOKEN_KEY)
        .ok()?
        .filter(|t| !t.trim().is_empty())
}

/// Get the signed-in user from localStorage
pub fn get_user() -> Option<UserInfo> {
    let raw = get_local_storage()?.get_item(USER_KEY).ok()??;
    parse_user(&raw)
}

/// `Authorization` header value, if there is a token
pub fn auth_header() -> Option<String> {
    get_access_token().map(|token| format!("Bearer {}", token))
}

fn parse_user(raw: &str) -> Option<UserInfo> {
    match serde_json::from_str::<UserInfo>(raw) {
        Ok(user) => Some(user),
        Err(e) => {
            log::warn!("Stored session user is unreadable: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user() {
        let user = parse_user(r#"{"id": 12, "username": "tech1", "email": "t@x.es"}"#).unwrap();
        assert_eq!(user.id, 12);
        assert!(parse_user("{}").is_none());
        assert!(parse_user("not json").is_none());
    }
}
