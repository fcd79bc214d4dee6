//! Thin JSON helpers over `gloo-net` shared by every API module.
//!
//! Nothing here retries: a failed call is reported once and the user decides
//! whether to trigger it again.

use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::shared::api_utils::api_url;
use crate::system::auth::storage;

/// Сбой сети или HTTP при обращении к бэкенду
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("Сервер недоступен: {0}")]
    Network(String),
    #[error("Ошибка сервера: HTTP {status}")]
    Http { status: u16 },
    #[error("Некорректный ответ сервера: {0}")]
    Decode(String),
}

/// Ошибка отправки данных: либо сбой транспорта, либо отказ бэкенда
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PostError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// Бэкенд отклонил данные; сообщение показывается пользователю как есть
    #[error("{message}")]
    Rejected { status: u16, message: String },
}

fn with_auth(builder: RequestBuilder) -> RequestBuilder {
    match storage::auth_header() {
        Some(header) => builder.header("Authorization", &header),
        None => builder,
    }
}

/// `GET` JSON-ресурса
pub async fn get_json<T: DeserializeOwned>(path: &str) -> Result<T, FetchError> {
    let url = api_url(path);
    log::debug!("GET {}", url);

    let response = with_auth(Request::get(&url))
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|e| FetchError::Network(e.to_string()))?;

    if !response.ok() {
        log::warn!("GET {} failed: HTTP {}", url, response.status());
        return Err(FetchError::Http {
            status: response.status(),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| FetchError::Decode(e.to_string()))
}

/// `POST` JSON-тела; 4xx-ответ превращается в [`PostError::Rejected`]
pub async fn post_json<B, T>(path: &str, body: &B) -> Result<T, PostError>
where
    B: Serialize,
    T: DeserializeOwned,
{
    let url = api_url(path);
    log::debug!("POST {}", url);

    let response = with_auth(Request::post(&url))
        .json(body)
        .map_err(|e| FetchError::Decode(e.to_string()))?
        .send()
        .await
        .map_err(|e| FetchError::Network(e.to_string()))?;

    if !response.ok() {
        return Err(reject(&url, response).await);
    }

    response
        .json::<T>()
        .await
        .map_err(|e| PostError::Fetch(FetchError::Decode(e.to_string())))
}

async fn reject(url: &str, response: Response) -> PostError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    log::warn!("POST {} rejected: HTTP {} {}", url, status, body);

    if (400..500).contains(&status) {
        PostError::Rejected {
            status,
            message: rejection_message(status, &body),
        }
    } else {
        PostError::Fetch(FetchError::Http { status })
    }
}

/// Извлечь текст отказа из тела ответа бэкенда.
///
/// Порядок: `error`, `detail`, ошибки полей (`поле: сообщение`), сырой текст.
pub fn rejection_message(status: u16, body: &str) -> String {
    let trimmed = body.trim();
    let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) else {
        return if trimmed.is_empty() {
            format!("HTTP {}", status)
        } else {
            trimmed.to_string()
        };
    };

    for key in ["error", "detail"] {
        if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
            return text.to_string();
        }
    }

    let parts: Vec<String> = match &value {
        serde_json::Value::Object(fields) => fields
            .iter()
            .map(|(field, errors)| {
                let text = flatten_messages(errors).join(" ");
                if field == "non_field_errors" {
                    text
                } else {
                    format!("{}: {}", field, text)
                }
            })
            .collect(),
        other => flatten_messages(other),
    };

    if parts.is_empty() {
        format!("HTTP {}", status)
    } else {
        parts.join("; ")
    }
}

fn flatten_messages(value: &serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::String(s) => vec![s.clone()],
        serde_json::Value::Array(items) => items.iter().flat_map(flatten_messages).collect(),
        serde_json::Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}
