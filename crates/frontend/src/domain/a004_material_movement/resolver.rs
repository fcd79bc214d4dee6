//! Restores the full ancestor chain of a stock location or tray so the
//! cascade can be populated in one step ("use as source", "use as
//! destination", edit mode, deep links).
//!
//! Lookups are sequential: each one needs the parent id from the previous
//! response. After every await the caller-supplied `is_current` check is
//! consulted; a superseded resolution stops and reports
//! [`ResolveOutcome::Cancelled`] without producing anything to apply.

use contracts::domain::a002_storage_hierarchy::aggregate::LevelKind;
use contracts::domain::a003_stock_location::aggregate::{LocationQuery, StockLocation};
use contracts::domain::common::ItemId;

use super::api::HierarchySource;
use super::cascade::{ChainSide, ResolvedChain};
use crate::shared::http::FetchError;

/// С чего начинается разрешение цепочки
#[derive(Debug, Clone, PartialEq)]
pub enum ChainAnchor {
    /// Остаток уже загружен (панель остатков материала)
    Stock(StockLocation),
    /// Известен только id остатка (режим просмотра, ссылка)
    LocationId(ItemId),
    /// Лоток без остатка материала
    TrayId(ItemId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolveOutcome {
    Resolved(ResolvedChain),
    Cancelled,
}

fn cancelled(side: ChainSide) -> Result<ResolveOutcome, FetchError> {
    log::debug!("[{}] chain resolution superseded", side.as_str());
    Ok(ResolveOutcome::Cancelled)
}

/// Разрешить цепочку склад → отдел → стеллаж → лоток для `anchor`.
///
/// Для цепочки-источника выбирается и сам остаток; цепочка назначения
/// останавливается на лотке.
pub async fn resolve_chain<S, F>(
    source: &S,
    side: ChainSide,
    anchor: ChainAnchor,
    is_current: F,
) -> Result<ResolveOutcome, FetchError>
where
    S: HierarchySource,
    F: Fn() -> bool,
{
    let (location, tray_id) = match anchor {
        ChainAnchor::Stock(location) => {
            let tray = location.tray;
            (Some(location), tray)
        }
        ChainAnchor::LocationId(id) => {
            let location = source.location(id).await?;
            if !is_current() {
                return cancelled(side);
            }
            let tray = location.tray;
            (Some(location), tray)
        }
        ChainAnchor::TrayId(id) => (None, id),
    };

    let tray = source.tray(tray_id).await?;
    if !is_current() {
        return cancelled(side);
    }
    let shelf = source.shelf(tray.shelf).await?;
    if !is_current() {
        return cancelled(side);
    }
    let department = source.department(shelf.department).await?;
    if !is_current() {
        return cancelled(side);
    }

    log::debug!(
        "[{}] resolved tray {} -> shelf {} -> department {} -> warehouse {}",
        side.as_str(),
        tray.id,
        shelf.id,
        department.id,
        department.warehouse
    );

    let departments = source
        .list(side, LevelKind::Department, Some(department.warehouse))
        .await?;
    if !is_current() {
        return cancelled(side);
    }
    let shelves = source
        .list(side, LevelKind::Shelf, Some(department.id))
        .await?;
    if !is_current() {
        return cancelled(side);
    }
    let trays = source.list(side, LevelKind::Tray, Some(shelf.id)).await?;
    if !is_current() {
        return cancelled(side);
    }
    let locations = source.locations(side, LocationQuery::ByTray(tray.id)).await?;
    if !is_current() {
        return cancelled(side);
    }

    let material = location.as_ref().map(|l| l.material);
    let location = match side {
        ChainSide::Source => location.map(|l| l.id),
        ChainSide::Target => None,
    };

    Ok(ResolveOutcome::Resolved(ResolvedChain {
        warehouse: department.warehouse,
        department: department.id,
        shelf: shelf.id,
        tray: tray.id,
        location,
        material,
        departments,
        shelves,
        trays,
        locations,
    }))
}
