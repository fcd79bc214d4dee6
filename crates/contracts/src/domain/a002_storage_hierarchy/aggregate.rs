//! Storage hierarchy: warehouse → department → shelf → tray.
//!
//! Entities are owned by the backend; the console only keeps read-through
//! copies and projects them into [`HierarchyNode`] for the cascading pickers.

use serde::{Deserialize, Serialize};

use crate::domain::common::ItemId;

/// Уровень иерархии хранения
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelKind {
    Warehouse,
    Department,
    Shelf,
    Tray,
}

impl LevelKind {
    /// Коллекция REST API для уровня
    pub fn collection(&self) -> &'static str {
        match self {
            LevelKind::Warehouse => "warehouses",
            LevelKind::Department => "departments",
            LevelKind::Shelf => "shelves",
            LevelKind::Tray => "trays",
        }
    }

    /// Параметр фильтра по родителю (`?warehouse=`, `?department=`, `?shelf=`)
    pub fn parent_param(&self) -> Option<&'static str> {
        match self {
            LevelKind::Warehouse => None,
            LevelKind::Department => Some("warehouse"),
            LevelKind::Shelf => Some("department"),
            LevelKind::Tray => Some("shelf"),
        }
    }

    pub fn child(&self) -> Option<LevelKind> {
        match self {
            LevelKind::Warehouse => Some(LevelKind::Department),
            LevelKind::Department => Some(LevelKind::Shelf),
            LevelKind::Shelf => Some(LevelKind::Tray),
            LevelKind::Tray => None,
        }
    }
}

/// Элемент выпадающего списка любого уровня
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
}

impl HierarchyNode {
    /// Подпись для списка: `Имя (КОД)` или просто имя
    pub fn label(&self) -> String {
        match self.code.as_deref() {
            Some(code) if !code.is_empty() => format!("{} ({})", self.name, code),
            _ => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    pub warehouse: ItemId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shelf {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    pub department: ItemId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tray {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    /// Полный код `СКЛАД-ОТДЕЛ-СТЕЛЛАЖ-ЛОТОК`; бэкенд отдаёт пустую строку,
    /// если у какого-то уровня нет кода
    #[serde(default)]
    pub full_code: Option<String>,
    pub shelf: ItemId,
}

impl Tray {
    pub fn display_code(&self) -> Option<String> {
        self.full_code
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .or(self.code.as_deref().filter(|c| !c.trim().is_empty()))
            .map(str::to_string)
    }
}

impl From<Warehouse> for HierarchyNode {
    fn from(w: Warehouse) -> Self {
        Self {
            id: w.id,
            name: w.name,
            code: w.code,
        }
    }
}

impl From<Department> for HierarchyNode {
    fn from(d: Department) -> Self {
        Self {
            id: d.id,
            name: d.name,
            code: d.code,
        }
    }
}

impl From<Shelf> for HierarchyNode {
    fn from(s: Shelf) -> Self {
        Self {
            id: s.id,
            name: s.name,
            code: s.code,
        }
    }
}

impl From<Tray> for HierarchyNode {
    fn from(t: Tray) -> Self {
        let code = t.display_code();
        Self {
            id: t.id,
            name: t.name,
            code,
        }
    }
}
