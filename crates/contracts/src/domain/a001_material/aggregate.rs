use serde::{Deserialize, Serialize};

use crate::domain::common::ItemId;

/// Материал из каталога (`GET /materials/materials/`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
}

/// Найти название материала в каталоге; неизвестный id отображается явно
pub fn material_name(catalog: &[Material], id: ItemId) -> String {
    catalog
        .iter()
        .find(|m| m.id == id)
        .map(|m| m.name.clone())
        .unwrap_or_else(|| format!("Материал #{}", id))
}
