use serde::{Deserialize, Serialize};

use crate::domain::common::ItemId;

/// Остаток материала в лотке («в этом лотке лежит столько-то этого материала»).
///
/// Уникален по паре (лоток, материал); уникальность обеспечивает бэкенд.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLocation {
    pub id: ItemId,
    pub tray: ItemId,
    pub material: ItemId,
    pub quantity: u32,
    #[serde(default)]
    pub minimum_quantity: u32,
    #[serde(default)]
    pub material_name: Option<String>,
    #[serde(default)]
    pub tray_name: Option<String>,
    #[serde(default)]
    pub tray_full_code: Option<String>,
    #[serde(default)]
    pub shelf_name: Option<String>,
    #[serde(default)]
    pub department_name: Option<String>,
    #[serde(default)]
    pub warehouse_name: Option<String>,
}

impl StockLocation {
    /// Путь `Склад > Отдел > Стеллаж > Лоток`, насколько он известен
    pub fn path_label(&self) -> String {
        let parts: Vec<&str> = [
            self.warehouse_name.as_deref(),
            self.department_name.as_deref(),
            self.shelf_name.as_deref(),
            self.tray_name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect();

        if parts.is_empty() {
            format!("Лоток #{}", self.tray)
        } else {
            parts.join(" > ")
        }
    }

    pub fn is_below_minimum(&self) -> bool {
        self.quantity < self.minimum_quantity
    }
}

/// Фильтр списка остатков
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationQuery {
    ByTray(ItemId),
    ByMaterial(ItemId),
}

impl LocationQuery {
    pub fn to_query_string(&self) -> String {
        match self {
            LocationQuery::ByTray(id) => format!("tray={}", id),
            LocationQuery::ByMaterial(id) => format!("material={}", id),
        }
    }
}

/// Найти остаток материала среди остатков одного лотка
pub fn find_for_material(locations: &[StockLocation], material: ItemId) -> Option<&StockLocation> {
    locations.iter().find(|l| l.material == material)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_payload() {
        let json = r#"{
            "id": 11, "tray": 4, "material": 7, "quantity": 10, "minimum_quantity": 2,
            "notes": null, "material_name": "Кабель", "tray_name": "Лоток 1",
            "shelf_name": "Стеллаж A", "department_name": "Отдел 1",
            "warehouse_name": "Центральный", "tray_full_code": "",
            "created_at": "2024-05-01T10:00:00Z", "updated_at": "2024-05-01T10:00:00Z"
        }"#;
        let location: StockLocation = serde_json::from_str(json).unwrap();
        assert_eq!(location.quantity, 10);
        assert_eq!(
            location.path_label(),
            "Центральный > Отдел 1 > Стеллаж A > Лоток 1"
        );
        assert!(!location.is_below_minimum());
    }

    #[test]
    fn test_negative_quantity_is_rejected() {
        let json = r#"{"id": 1, "tray": 1, "material": 1, "quantity": -3}"#;
        assert!(serde_json::from_str::<StockLocation>(json).is_err());
    }

    #[test]
    fn test_query_strings() {
        assert_eq!(LocationQuery::ByTray(3).to_query_string(), "tray=3");
        assert_eq!(LocationQuery::ByMaterial(9).to_query_string(), "material=9");
    }
}
