use serde::{de::DeserializeOwned, Serialize};
use std::hash::Hash;

/// Первичный ключ записи на бэкенде (целочисленный)
pub type ItemId = i64;

/// Трейт для типов идентификаторов агрегатов
pub trait AggregateId:
    Clone + Copy + PartialEq + Eq + Hash + Serialize + DeserializeOwned + std::fmt::Debug
{
    /// Преобразовать ID в строку
    fn as_string(&self) -> String;

    /// Создать ID из строки
    fn from_string(s: &str) -> Result<Self, String>;
}

impl AggregateId for i64 {
    fn as_string(&self) -> String {
        ToString::to_string(self)
    }

    fn from_string(s: &str) -> Result<Self, String> {
        s.trim()
            .parse::<i64>()
            .map_err(|e| format!("Invalid id '{}': {}", s, e))
    }
}

/// Разобрать значение `<select>`: пустая строка означает «ничего не выбрано»
pub fn parse_optional_id(value: &str) -> Option<ItemId> {
    if value.trim().is_empty() {
        return None;
    }
    ItemId::from_string(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_optional_id() {
        assert_eq!(parse_optional_id(""), None);
        assert_eq!(parse_optional_id("  "), None);
        assert_eq!(parse_optional_id("42"), Some(42));
        assert_eq!(parse_optional_id(" 7 "), Some(7));
        assert_eq!(parse_optional_id("abc"), None);
    }

    #[test]
    fn test_as_string_round_trip() {
        let id: ItemId = 15;
        assert_eq!(ItemId::from_string(&id.as_string()), Ok(15));
    }
}
