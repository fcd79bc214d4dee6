//! Location hierarchy client and movement endpoints.

use contracts::domain::a001_material::aggregate::Material;
use contracts::domain::a002_storage_hierarchy::aggregate::{
    Department, HierarchyNode, LevelKind, Shelf, Tray, Warehouse,
};
use contracts::domain::a003_stock_location::aggregate::{LocationQuery, StockLocation};
use contracts::domain::a004_material_movement::aggregate::{MaterialMovement, MovementRequest};
use contracts::domain::common::ItemId;

use super::cascade::ChainSide;
use crate::shared::http::{get_json, post_json, FetchError, PostError};

/// Источник данных иерархии хранения.
///
/// `side` помечает, для какой цепочки (источник/назначение) выполняется
/// запрос; на результат он не влияет.
#[allow(async_fn_in_trait)]
pub trait HierarchySource {
    async fn list(
        &self,
        side: ChainSide,
        level: LevelKind,
        parent_id: Option<ItemId>,
    ) -> Result<Vec<HierarchyNode>, FetchError>;

    async fn locations(
        &self,
        side: ChainSide,
        query: LocationQuery,
    ) -> Result<Vec<StockLocation>, FetchError>;

    async fn location(&self, id: ItemId) -> Result<StockLocation, FetchError>;

    async fn tray(&self, id: ItemId) -> Result<Tray, FetchError>;

    async fn shelf(&self, id: ItemId) -> Result<Shelf, FetchError>;

    async fn department(&self, id: ItemId) -> Result<Department, FetchError>;
}

/// Путь списка уровня с фильтром по родителю
pub fn list_path(level: LevelKind, parent_id: Option<ItemId>) -> String {
    match (level.parent_param(), parent_id) {
        (Some(param), Some(parent)) => {
            format!("/storage/{}/?{}={}", level.collection(), param, parent)
        }
        _ => format!("/storage/{}/", level.collection()),
    }
}

/// REST-клиент складского API
#[derive(Debug, Clone, Copy, Default)]
pub struct StorageApi;

impl HierarchySource for StorageApi {
    async fn list(
        &self,
        side: ChainSide,
        level: LevelKind,
        parent_id: Option<ItemId>,
    ) -> Result<Vec<HierarchyNode>, FetchError> {
        let path = list_path(level, parent_id);
        log::debug!("[{}] loading {:?} options: {}", side.as_str(), level, path);

        match level {
            LevelKind::Warehouse => Ok(get_json::<Vec<Warehouse>>(&path)
                .await?
                .into_iter()
                .map(HierarchyNode::from)
                .collect()),
            LevelKind::Department => Ok(get_json::<Vec<Department>>(&path)
                .await?
                .into_iter()
                .map(HierarchyNode::from)
                .collect()),
            LevelKind::Shelf => Ok(get_json::<Vec<Shelf>>(&path)
                .await?
                .into_iter()
                .map(HierarchyNode::from)
                .collect()),
            LevelKind::Tray => Ok(get_json::<Vec<Tray>>(&path)
                .await?
                .into_iter()
                .map(HierarchyNode::from)
                .collect()),
        }
    }

    async fn locations(
        &self,
        side: ChainSide,
        query: LocationQuery,
    ) -> Result<Vec<StockLocation>, FetchError> {
        let path = format!("/storage/locations/?{}", query.to_query_string());
        log::debug!("[{}] loading stock locations: {}", side.as_str(), path);
        get_json(&path).await
    }

    async fn location(&self, id: ItemId) -> Result<StockLocation, FetchError> {
        get_json(&format!("/storage/locations/{}/", id)).await
    }

    async fn tray(&self, id: ItemId) -> Result<Tray, FetchError> {
        get_json(&format!("/storage/trays/{}/", id)).await
    }

    async fn shelf(&self, id: ItemId) -> Result<Shelf, FetchError> {
        get_json(&format!("/storage/shelves/{}/", id)).await
    }

    async fn department(&self, id: ItemId) -> Result<Department, FetchError> {
        get_json(&format!("/storage/departments/{}/", id)).await
    }
}

/// Каталог материалов
pub async fn fetch_materials() -> Result<Vec<Material>, FetchError> {
    get_json("/materials/materials/").await
}

pub async fn fetch_movement(id: ItemId) -> Result<MaterialMovement, FetchError> {
    get_json(&format!("/storage/movements/{}/", id)).await
}

/// Зарегистрировать движение; бэкенд сам перепроверяет остатки
pub async fn create_movement(request: &MovementRequest) -> Result<MaterialMovement, PostError> {
    post_json("/storage/movements/", request).await
}
