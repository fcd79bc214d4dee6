//! Material movements: what the console sends (`MovementRequest`) and what the
//! backend stores (`MaterialMovement`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::ItemId;

/// Тип операции движения
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementOperation {
    /// Поступление
    Add,
    /// Списание
    Remove,
    /// Перемещение
    Transfer,
}

impl MovementOperation {
    pub const ALL: [MovementOperation; 3] = [
        MovementOperation::Transfer,
        MovementOperation::Add,
        MovementOperation::Remove,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            MovementOperation::Add => "ADD",
            MovementOperation::Remove => "REMOVE",
            MovementOperation::Transfer => "TRANSFER",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ADD" => Some(MovementOperation::Add),
            "REMOVE" => Some(MovementOperation::Remove),
            "TRANSFER" => Some(MovementOperation::Transfer),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MovementOperation::Add => "Поступление",
            MovementOperation::Remove => "Списание",
            MovementOperation::Transfer => "Перемещение",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            MovementOperation::Add => "Добавить материал в место хранения",
            MovementOperation::Remove => "Списать материал из места хранения",
            MovementOperation::Transfer => "Переместить материал между местами хранения",
        }
    }

    /// Операция расходует остаток источника
    pub fn consumes_stock(&self) -> bool {
        matches!(self, MovementOperation::Remove | MovementOperation::Transfer)
    }

    pub fn needs_source(&self) -> bool {
        self.consumes_stock()
    }

    pub fn needs_target(&self) -> bool {
        matches!(self, MovementOperation::Add | MovementOperation::Transfer)
    }
}

impl Default for MovementOperation {
    fn default() -> Self {
        MovementOperation::Transfer
    }
}

/// Куда кладём материал: в существующий остаток или в лоток,
/// где остатка этого материала ещё нет
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementTarget {
    Location(ItemId),
    Tray(ItemId),
}

/// Маршрут движения; каждый вариант несёт только допустимые для операции поля
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementRoute {
    Add {
        target: MovementTarget,
    },
    Remove {
        source: ItemId,
    },
    Transfer {
        source: ItemId,
        target: MovementTarget,
    },
}

impl MovementRoute {
    pub fn operation(&self) -> MovementOperation {
        match self {
            MovementRoute::Add { .. } => MovementOperation::Add,
            MovementRoute::Remove { .. } => MovementOperation::Remove,
            MovementRoute::Transfer { .. } => MovementOperation::Transfer,
        }
    }

    pub fn source(&self) -> Option<ItemId> {
        match self {
            MovementRoute::Add { .. } => None,
            MovementRoute::Remove { source } | MovementRoute::Transfer { source, .. } => {
                Some(*source)
            }
        }
    }

    pub fn target(&self) -> Option<MovementTarget> {
        match self {
            MovementRoute::Remove { .. } => None,
            MovementRoute::Add { target } | MovementRoute::Transfer { target, .. } => {
                Some(*target)
            }
        }
    }
}

/// Тело `POST /storage/movements/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementRequest {
    pub material: ItemId,
    pub quantity: u32,
    pub operation: MovementOperation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_location: Option<ItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_location: Option<ItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_tray: Option<ItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub user: ItemId,
}

impl MovementRequest {
    /// Собрать тело запроса из маршрута; поля вне маршрута не заполняются
    pub fn new(
        material: ItemId,
        quantity: u32,
        route: MovementRoute,
        notes: &str,
        user: ItemId,
    ) -> Self {
        let (target_location, target_tray) = match route.target() {
            Some(MovementTarget::Location(id)) => (Some(id), None),
            Some(MovementTarget::Tray(id)) => (None, Some(id)),
            None => (None, None),
        };
        let notes = notes.trim();

        Self {
            material,
            quantity,
            operation: route.operation(),
            source_location: route.source(),
            target_location,
            target_tray,
            notes: if notes.is_empty() {
                None
            } else {
                Some(notes.to_string())
            },
            user,
        }
    }
}

/// Зарегистрированное движение (`GET /storage/movements/<id>/`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialMovement {
    pub id: ItemId,
    pub material: ItemId,
    #[serde(default)]
    pub material_name: Option<String>,
    pub quantity: u32,
    pub operation: MovementOperation,
    #[serde(default)]
    pub source_location: Option<ItemId>,
    #[serde(default)]
    pub target_location: Option<ItemId>,
    #[serde(default)]
    pub target_tray: Option<ItemId>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub user: Option<ItemId>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl MaterialMovement {
    /// Восстановить маршрут из сохранённой записи; `None`, если запись неполная
    pub fn route(&self) -> Option<MovementRoute> {
        let target = self
            .target_location
            .map(MovementTarget::Location)
            .or(self.target_tray.map(MovementTarget::Tray));

        match self.operation {
            MovementOperation::Add => target.map(|target| MovementRoute::Add { target }),
            MovementOperation::Remove => self
                .source_location
                .map(|source| MovementRoute::Remove { source }),
            MovementOperation::Transfer => match (self.source_location, target) {
                (Some(source), Some(target)) => Some(MovementRoute::Transfer { source, target }),
                _ => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_request_has_no_source() {
        let request = MovementRequest::new(
            7,
            3,
            MovementRoute::Add {
                target: MovementTarget::Tray(12),
            },
            "",
            1,
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({"material": 7, "quantity": 3, "operation": "ADD", "target_tray": 12, "user": 1})
        );
    }

    #[test]
    fn test_remove_request_has_no_target() {
        let request = MovementRequest::new(7, 2, MovementRoute::Remove { source: 30 }, " выдано ", 4);
        let value = serde_json::to_value(&request).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj["operation"], "REMOVE");
        assert_eq!(obj["source_location"], 30);
        assert_eq!(obj["notes"], "выдано");
        assert!(!obj.contains_key("target_location"));
        assert!(!obj.contains_key("target_tray"));
    }

    #[test]
    fn test_transfer_into_existing_location() {
        let request = MovementRequest::new(
            7,
            5,
            MovementRoute::Transfer {
                source: 30,
                target: MovementTarget::Location(31),
            },
            "",
            1,
        );
        assert_eq!(request.source_location, Some(30));
        assert_eq!(request.target_location, Some(31));
        assert_eq!(request.target_tray, None);
    }

    #[test]
    fn test_movement_record_route() {
        let json = r#"{
            "id": 5, "material": 7, "material_name": "Кабель", "quantity": 4,
            "operation": "TRANSFER", "source_location": 30, "target_location": null,
            "target_tray": 12, "notes": null, "user": 1, "user_name": "admin",
            "operation_display": "Traslado", "material_control": null,
            "timestamp": "2024-05-01T10:00:00Z"
        }"#;
        let movement: MaterialMovement = serde_json::from_str(json).unwrap();
        assert_eq!(
            movement.route(),
            Some(MovementRoute::Transfer {
                source: 30,
                target: MovementTarget::Tray(12)
            })
        );
        assert!(movement.timestamp.is_some());
    }

    #[test]
    fn test_incomplete_record_has_no_route() {
        let json = r#"{"id": 5, "material": 7, "quantity": 4, "operation": "TRANSFER", "source_location": 30}"#;
        let movement: MaterialMovement = serde_json::from_str(json).unwrap();
        assert_eq!(movement.route(), None);
    }

    #[test]
    fn test_operation_codes() {
        for op in MovementOperation::ALL {
            assert_eq!(MovementOperation::from_code(op.code()), Some(op));
        }
        assert_eq!(MovementOperation::from_code("MOVE"), None);
        assert!(MovementOperation::Transfer.needs_source());
        assert!(MovementOperation::Transfer.needs_target());
        assert!(!MovementOperation::Add.consumes_stock());
    }
}
