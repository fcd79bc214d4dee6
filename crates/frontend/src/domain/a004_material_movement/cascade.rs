//! Cascade state of the movement form.
//!
//! Two independent selection chains (source and target), each
//! warehouse → department → shelf → tray → stock location. Selecting a level
//! clears every level below it on the same chain, together with the option
//! lists fetched for those levels. Option lists arrive asynchronously and are
//! accepted only while their parent is still the selected one.
//!
//! Every user action on a chain bumps the chain's epoch; an ancestor-chain
//! resolution started earlier (see `resolver`) carries a [`ResolveTicket`]
//! with the old epoch and is discarded when it completes.

use contracts::domain::a002_storage_hierarchy::aggregate::{HierarchyNode, LevelKind};
use contracts::domain::a003_stock_location::aggregate::{find_for_material, StockLocation};
use contracts::domain::a004_material_movement::aggregate::MovementOperation;
use contracts::domain::common::ItemId;

/// Цепочка выбора: откуда берём или куда кладём
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainSide {
    Source,
    Target,
}

impl ChainSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainSide::Source => "source",
            ChainSide::Target => "target",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChainSide::Source => "Откуда",
            ChainSide::Target => "Куда",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CascadeLevel {
    Warehouse,
    Department,
    Shelf,
    Tray,
    Location,
}

impl CascadeLevel {
    pub const ALL: [CascadeLevel; 5] = [
        CascadeLevel::Warehouse,
        CascadeLevel::Department,
        CascadeLevel::Shelf,
        CascadeLevel::Tray,
        CascadeLevel::Location,
    ];

    pub fn child(&self) -> Option<CascadeLevel> {
        match self {
            CascadeLevel::Warehouse => Some(CascadeLevel::Department),
            CascadeLevel::Department => Some(CascadeLevel::Shelf),
            CascadeLevel::Shelf => Some(CascadeLevel::Tray),
            CascadeLevel::Tray => Some(CascadeLevel::Location),
            CascadeLevel::Location => None,
        }
    }

    pub fn parent(&self) -> Option<CascadeLevel> {
        match self {
            CascadeLevel::Warehouse => None,
            CascadeLevel::Department => Some(CascadeLevel::Warehouse),
            CascadeLevel::Shelf => Some(CascadeLevel::Department),
            CascadeLevel::Tray => Some(CascadeLevel::Shelf),
            CascadeLevel::Location => Some(CascadeLevel::Tray),
        }
    }

    /// Уровень иерархии для запроса списка; остатки грузятся отдельно
    pub fn hierarchy_kind(&self) -> Option<LevelKind> {
        match self {
            CascadeLevel::Warehouse => Some(LevelKind::Warehouse),
            CascadeLevel::Department => Some(LevelKind::Department),
            CascadeLevel::Shelf => Some(LevelKind::Shelf),
            CascadeLevel::Tray => Some(LevelKind::Tray),
            CascadeLevel::Location => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CascadeLevel::Warehouse => "Склад",
            CascadeLevel::Department => "Отдел",
            CascadeLevel::Shelf => "Стеллаж",
            CascadeLevel::Tray => "Лоток",
            CascadeLevel::Location => "Материал в лотке",
        }
    }
}

/// Список опций, который нужно загрузить после выбора
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionsRequest {
    pub side: ChainSide,
    pub level: CascadeLevel,
    pub parent_id: ItemId,
}

/// Полностью восстановленная цепочка предков места хранения
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedChain {
    pub warehouse: ItemId,
    pub department: ItemId,
    pub shelf: ItemId,
    pub tray: ItemId,
    pub location: Option<ItemId>,
    /// Материал остатка, с которого начиналось разрешение
    pub material: Option<ItemId>,
    pub departments: Vec<HierarchyNode>,
    pub shelves: Vec<HierarchyNode>,
    pub trays: Vec<HierarchyNode>,
    pub locations: Vec<StockLocation>,
}

/// Право применить результат разрешения цепочки
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveTicket {
    pub side: ChainSide,
    epoch: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CascadeChain {
    side: ChainSide,
    warehouse: Option<ItemId>,
    department: Option<ItemId>,
    shelf: Option<ItemId>,
    tray: Option<ItemId>,
    location: Option<ItemId>,
    departments: Vec<HierarchyNode>,
    shelves: Vec<HierarchyNode>,
    trays: Vec<HierarchyNode>,
    locations: Vec<StockLocation>,
    epoch: u64,
}

impl CascadeChain {
    pub fn new(side: ChainSide) -> Self {
        Self {
            side,
            warehouse: None,
            department: None,
            shelf: None,
            tray: None,
            location: None,
            departments: Vec::new(),
            shelves: Vec::new(),
            trays: Vec::new(),
            locations: Vec::new(),
            epoch: 0,
        }
    }

    pub fn selected(&self, level: CascadeLevel) -> Option<ItemId> {
        match level {
            CascadeLevel::Warehouse => self.warehouse,
            CascadeLevel::Department => self.department,
            CascadeLevel::Shelf => self.shelf,
            CascadeLevel::Tray => self.tray,
            CascadeLevel::Location => self.location,
        }
    }

    fn slot_mut(&mut self, level: CascadeLevel) -> &mut Option<ItemId> {
        match level {
            CascadeLevel::Warehouse => &mut self.warehouse,
            CascadeLevel::Department => &mut self.department,
            CascadeLevel::Shelf => &mut self.shelf,
            CascadeLevel::Tray => &mut self.tray,
            CascadeLevel::Location => &mut self.location,
        }
    }

    /// Опции уровня внутри цепочки; склады общие и хранятся в [`CascadeState`]
    pub fn options(&self, level: CascadeLevel) -> &[HierarchyNode] {
        match level {
            CascadeLevel::Department => &self.departments,
            CascadeLevel::Shelf => &self.shelves,
            CascadeLevel::Tray => &self.trays,
            CascadeLevel::Warehouse | CascadeLevel::Location => &[],
        }
    }

    pub fn locations(&self) -> &[StockLocation] {
        &self.locations
    }

    pub fn selected_location(&self) -> Option<&StockLocation> {
        let id = self.location?;
        self.locations.iter().find(|l| l.id == id)
    }

    /// Остаток материала в выбранном лотке, если он уже загружен
    pub fn location_for_material(&self, material: ItemId) -> Option<&StockLocation> {
        self.tray?;
        find_for_material(&self.locations, material)
    }

    pub fn is_empty(&self) -> bool {
        CascadeLevel::ALL.iter().all(|l| self.selected(*l).is_none())
    }

    /// Выбор пользователя на уровне `level`.
    ///
    /// Сбрасывает выбор и опции всех нижних уровней этой цепочки и
    /// отменяет незавершённое разрешение цепочки.
    pub fn select(&mut self, level: CascadeLevel, id: Option<ItemId>) -> Option<OptionsRequest> {
        self.epoch += 1;
        self.set_level(level, id)
    }

    /// Выбрать остаток-источник; возвращает материал этого остатка
    pub fn select_location(&mut self, id: Option<ItemId>) -> Option<ItemId> {
        self.select(CascadeLevel::Location, id);
        self.selected_location().map(|l| l.material)
    }

    /// Материал выбран отдельно от места: если в выбранном лотке есть его
    /// остаток, он становится выбранным, иначе место не подразумевается.
    ///
    /// Уровни иерархии не меняются, поэтому незавершённое разрешение
    /// цепочки остаётся актуальным.
    pub fn match_material(&mut self, material: Option<ItemId>) -> Option<ItemId> {
        let found = material
            .and_then(|m| self.location_for_material(m))
            .map(|l| l.id);
        if self.tray.is_some() {
            self.location = found;
        }
        found
    }

    fn set_level(&mut self, level: CascadeLevel, id: Option<ItemId>) -> Option<OptionsRequest> {
        *self.slot_mut(level) = id;
        self.clear_below(level);

        let child = level.child()?;
        id.map(|parent_id| OptionsRequest {
            side: self.side,
            level: child,
            parent_id,
        })
    }

    fn clear_below(&mut self, level: CascadeLevel) {
        for lower in CascadeLevel::ALL.into_iter().filter(|l| *l > level) {
            *self.slot_mut(lower) = None;
            self.clear_options(lower);
        }
    }

    fn clear_options(&mut self, level: CascadeLevel) {
        match level {
            CascadeLevel::Warehouse => {}
            CascadeLevel::Department => self.departments.clear(),
            CascadeLevel::Shelf => self.shelves.clear(),
            CascadeLevel::Tray => self.trays.clear(),
            CascadeLevel::Location => self.locations.clear(),
        }
    }

    /// Принять загруженные опции уровня, если родитель всё ещё выбран
    pub fn apply_nodes(
        &mut self,
        level: CascadeLevel,
        parent_id: ItemId,
        nodes: Vec<HierarchyNode>,
    ) -> bool {
        let Some(parent) = level.parent() else {
            return false;
        };
        if self.selected(parent) != Some(parent_id) {
            log::debug!(
                "[{}] dropping stale {:?} options for parent {}",
                self.side.as_str(),
                level,
                parent_id
            );
            return false;
        }

        match level {
            CascadeLevel::Department => self.departments = nodes,
            CascadeLevel::Shelf => self.shelves = nodes,
            CascadeLevel::Tray => self.trays = nodes,
            CascadeLevel::Warehouse | CascadeLevel::Location => return false,
        }
        true
    }

    /// Принять остатки лотка; если материал уже выбран и лежит в этом лотке,
    /// его остаток выбирается автоматически
    pub fn apply_locations(
        &mut self,
        tray_id: ItemId,
        locations: Vec<StockLocation>,
        material: Option<ItemId>,
    ) -> bool {
        if self.tray != Some(tray_id) {
            log::debug!(
                "[{}] dropping stale locations for tray {}",
                self.side.as_str(),
                tray_id
            );
            return false;
        }
        self.locations = locations;
        if material.is_some() && self.location.is_none() {
            self.match_material(material);
        }
        true
    }

    /// Сбросить цепочку целиком
    pub fn reset(&mut self) {
        let epoch = self.epoch + 1;
        *self = Self::new(self.side);
        self.epoch = epoch;
    }

    /// Заполнить все уровни разом: склад → отдел → стеллаж → лоток (→ остаток).
    /// Возвращает уровни в порядке применения.
    fn populate(&mut self, resolved: ResolvedChain) -> Vec<CascadeLevel> {
        let mut applied = Vec::with_capacity(5);

        self.set_level(CascadeLevel::Warehouse, Some(resolved.warehouse));
        self.departments = resolved.departments;
        applied.push(CascadeLevel::Warehouse);

        self.set_level(CascadeLevel::Department, Some(resolved.department));
        self.shelves = resolved.shelves;
        applied.push(CascadeLevel::Department);

        self.set_level(CascadeLevel::Shelf, Some(resolved.shelf));
        self.trays = resolved.trays;
        applied.push(CascadeLevel::Shelf);

        self.set_level(CascadeLevel::Tray, Some(resolved.tray));
        self.locations = resolved.locations;
        applied.push(CascadeLevel::Tray);

        if let Some(location) = resolved.location {
            self.location = Some(location);
            applied.push(CascadeLevel::Location);
        }

        applied
    }
}

/// Состояние обеих цепочек формы движения
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeState {
    warehouses: Vec<HierarchyNode>,
    source: CascadeChain,
    target: CascadeChain,
}

impl Default for CascadeState {
    fn default() -> Self {
        Self::new()
    }
}

impl CascadeState {
    pub fn new() -> Self {
        Self {
            warehouses: Vec::new(),
            source: CascadeChain::new(ChainSide::Source),
            target: CascadeChain::new(ChainSide::Target),
        }
    }

    pub fn warehouses(&self) -> &[HierarchyNode] {
        &self.warehouses
    }

    pub fn apply_warehouses(&mut self, nodes: Vec<HierarchyNode>) {
        self.warehouses = nodes;
    }

    /// Опции уровня для отображения
    pub fn options(&self, side: ChainSide, level: CascadeLevel) -> &[HierarchyNode] {
        match level {
            CascadeLevel::Warehouse => &self.warehouses,
            other => self.chain(side).options(other),
        }
    }

    pub fn chain(&self, side: ChainSide) -> &CascadeChain {
        match side {
            ChainSide::Source => &self.source,
            ChainSide::Target => &self.target,
        }
    }

    pub fn chain_mut(&mut self, side: ChainSide) -> &mut CascadeChain {
        match side {
            ChainSide::Source => &mut self.source,
            ChainSide::Target => &mut self.target,
        }
    }

    /// Какие цепочки показывает форма для операции
    pub fn relevant_sides(operation: MovementOperation) -> &'static [ChainSide] {
        match operation {
            MovementOperation::Add => &[ChainSide::Target],
            MovementOperation::Remove => &[ChainSide::Source],
            MovementOperation::Transfer => &[ChainSide::Source, ChainSide::Target],
        }
    }

    /// Смена операции: поступление сбрасывает источник, списание сбрасывает назначение
    pub fn on_operation_changed(&mut self, operation: MovementOperation) {
        if !operation.needs_source() {
            self.source.reset();
        }
        if !operation.needs_target() {
            self.target.reset();
        }
    }

    pub fn select(
        &mut self,
        side: ChainSide,
        level: CascadeLevel,
        id: Option<ItemId>,
    ) -> Option<OptionsRequest> {
        self.chain_mut(side).select(level, id)
    }

    /// Материал выбран в списке материалов: обе цепочки подбирают остаток
    pub fn select_material(&mut self, material: Option<ItemId>) {
        self.source.match_material(material);
        self.target.match_material(material);
    }

    /// Начать разрешение цепочки; предыдущее незавершённое становится устаревшим
    pub fn begin_resolution(&mut self, side: ChainSide) -> ResolveTicket {
        let chain = self.chain_mut(side);
        chain.epoch += 1;
        ResolveTicket {
            side,
            epoch: chain.epoch,
        }
    }

    pub fn is_current(&self, ticket: &ResolveTicket) -> bool {
        self.chain(ticket.side).epoch == ticket.epoch
    }

    /// Применить разрешённую цепочку, если билет ещё актуален.
    /// `None` означает, что результат устарел и ничего не изменилось.
    pub fn finish_resolution(
        &mut self,
        ticket: ResolveTicket,
        resolved: ResolvedChain,
    ) -> Option<Vec<CascadeLevel>> {
        if !self.is_current(&ticket) {
            log::debug!(
                "[{}] discarding superseded chain resolution",
                ticket.side.as_str()
            );
            return None;
        }
        Some(self.chain_mut(ticket.side).populate(resolved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: ItemId, name: &str) -> HierarchyNode {
        HierarchyNode {
            id,
            name: name.to_string(),
            code: None,
        }
    }

    fn stock(id: ItemId, tray: ItemId, material: ItemId, quantity: u32) -> StockLocation {
        StockLocation {
            id,
            tray,
            material,
            quantity,
            minimum_quantity: 0,
            material_name: None,
            tray_name: None,
            tray_full_code: None,
            shelf_name: None,
            department_name: None,
            warehouse_name: None,
        }
    }

    /// Цепочка, выбранная до лотка `tray` с загруженными опциями на каждом уровне
    fn filled_chain(state: &mut CascadeState, side: ChainSide, tray: ItemId) {
        state.select(side, CascadeLevel::Warehouse, Some(1));
        state
            .chain_mut(side)
            .apply_nodes(CascadeLevel::Department, 1, vec![node(10, "Отдел")]);
        state.select(side, CascadeLevel::Department, Some(10));
        state
            .chain_mut(side)
            .apply_nodes(CascadeLevel::Shelf, 10, vec![node(20, "Стеллаж")]);
        state.select(side, CascadeLevel::Shelf, Some(20));
        state
            .chain_mut(side)
            .apply_nodes(CascadeLevel::Tray, 20, vec![node(tray, "Лоток")]);
        state.select(side, CascadeLevel::Tray, Some(tray));
    }

    #[test]
    fn test_select_returns_next_request() {
        let mut state = CascadeState::new();
        let request = state.select(ChainSide::Source, CascadeLevel::Warehouse, Some(1));
        assert_eq!(
            request,
            Some(OptionsRequest {
                side: ChainSide::Source,
                level: CascadeLevel::Department,
                parent_id: 1
            })
        );

        let request = state.select(ChainSide::Source, CascadeLevel::Tray, Some(30));
        assert_eq!(request.map(|r| r.level), Some(CascadeLevel::Location));

        assert_eq!(
            state.select(ChainSide::Source, CascadeLevel::Location, Some(5)),
            None
        );
        assert_eq!(
            state.select(ChainSide::Source, CascadeLevel::Warehouse, None),
            None
        );
    }

    #[test]
    fn test_warehouse_change_clears_only_own_chain() {
        let mut state = CascadeState::new();
        filled_chain(&mut state, ChainSide::Source, 30);
        filled_chain(&mut state, ChainSide::Target, 31);
        state
            .chain_mut(ChainSide::Source)
            .apply_locations(30, vec![stock(100, 30, 7, 10)], None);
        state.chain_mut(ChainSide::Source).select_location(Some(100));

        let target_before = state.chain(ChainSide::Target).clone();

        state.select(ChainSide::Source, CascadeLevel::Warehouse, Some(2));

        let source = state.chain(ChainSide::Source);
        assert_eq!(source.selected(CascadeLevel::Warehouse), Some(2));
        for level in [
            CascadeLevel::Department,
            CascadeLevel::Shelf,
            CascadeLevel::Tray,
            CascadeLevel::Location,
        ] {
            assert_eq!(source.selected(level), None, "{:?} not cleared", level);
        }
        assert!(source.options(CascadeLevel::Department).is_empty());
        assert!(source.options(CascadeLevel::Shelf).is_empty());
        assert!(source.options(CascadeLevel::Tray).is_empty());
        assert!(source.locations().is_empty());

        let target = state.chain(ChainSide::Target);
        assert_eq!(target.selected(CascadeLevel::Tray), Some(31));
        assert_eq!(target.options(CascadeLevel::Tray).len(), 1);
        assert_eq!(target, &target_before);
    }

    #[test]
    fn test_target_warehouse_change_leaves_source() {
        let mut state = CascadeState::new();
        filled_chain(&mut state, ChainSide::Source, 30);
        filled_chain(&mut state, ChainSide::Target, 31);

        state.select(ChainSide::Target, CascadeLevel::Warehouse, Some(9));

        assert_eq!(
            state.chain(ChainSide::Source).selected(CascadeLevel::Tray),
            Some(30)
        );
        assert_eq!(
            state.chain(ChainSide::Target).selected(CascadeLevel::Department),
            None
        );
    }

    #[test]
    fn test_stale_options_are_dropped() {
        let mut state = CascadeState::new();
        state.select(ChainSide::Source, CascadeLevel::Warehouse, Some(1));
        state.select(ChainSide::Source, CascadeLevel::Warehouse, Some(2));

        let chain = state.chain_mut(ChainSide::Source);
        assert!(!chain.apply_nodes(CascadeLevel::Department, 1, vec![node(10, "old")]));
        assert!(chain.options(CascadeLevel::Department).is_empty());
        assert!(chain.apply_nodes(CascadeLevel::Department, 2, vec![node(11, "new")]));
        assert_eq!(chain.options(CascadeLevel::Department)[0].id, 11);

        assert!(!chain.apply_locations(99, vec![stock(1, 99, 7, 1)], None));
        assert!(chain.locations().is_empty());
    }

    #[test]
    fn test_selecting_source_location_reports_material() {
        let mut state = CascadeState::new();
        filled_chain(&mut state, ChainSide::Source, 30);
        let chain = state.chain_mut(ChainSide::Source);
        chain.apply_locations(30, vec![stock(100, 30, 7, 10), stock(101, 30, 8, 2)], None);

        assert_eq!(chain.select_location(Some(101)), Some(8));
        assert_eq!(chain.selected_location().map(|l| l.quantity), Some(2));
        assert_eq!(chain.select_location(None), None);
    }

    #[test]
    fn test_material_auto_selects_existing_location() {
        let mut state = CascadeState::new();
        filled_chain(&mut state, ChainSide::Source, 30);
        state
            .chain_mut(ChainSide::Source)
            .apply_locations(30, vec![stock(100, 30, 7, 10)], None);

        state.select_material(Some(7));
        assert_eq!(
            state.chain(ChainSide::Source).selected(CascadeLevel::Location),
            Some(100)
        );

        state.select_material(Some(8));
        assert_eq!(
            state.chain(ChainSide::Source).selected(CascadeLevel::Location),
            None
        );
    }

    #[test]
    fn test_locations_loaded_after_material_choice() {
        let mut state = CascadeState::new();
        filled_chain(&mut state, ChainSide::Target, 31);
        let chain = state.chain_mut(ChainSide::Target);
        chain.apply_locations(31, vec![stock(200, 31, 7, 1)], Some(7));
        assert_eq!(chain.selected(CascadeLevel::Location), Some(200));
    }

    #[test]
    fn test_material_without_tray_implies_nothing() {
        let mut state = CascadeState::new();
        state.select(ChainSide::Source, CascadeLevel::Warehouse, Some(1));
        state.select_material(Some(7));
        assert!(state
            .chain(ChainSide::Source)
            .selected(CascadeLevel::Location)
            .is_none());
    }

    #[test]
    fn test_operation_change_clears_irrelevant_chain() {
        let mut state = CascadeState::new();
        filled_chain(&mut state, ChainSide::Source, 30);
        filled_chain(&mut state, ChainSide::Target, 31);

        state.on_operation_changed(MovementOperation::Transfer);
        assert!(!state.chain(ChainSide::Source).is_empty());
        assert!(!state.chain(ChainSide::Target).is_empty());

        state.on_operation_changed(MovementOperation::Add);
        assert!(state.chain(ChainSide::Source).is_empty());
        assert!(!state.chain(ChainSide::Target).is_empty());

        filled_chain(&mut state, ChainSide::Source, 30);
        state.on_operation_changed(MovementOperation::Remove);
        assert!(!state.chain(ChainSide::Source).is_empty());
        assert!(state.chain(ChainSide::Target).is_empty());
    }

    #[test]
    fn test_relevant_sides() {
        assert_eq!(
            CascadeState::relevant_sides(MovementOperation::Add),
            &[ChainSide::Target]
        );
        assert_eq!(
            CascadeState::relevant_sides(MovementOperation::Remove),
            &[ChainSide::Source]
        );
        assert_eq!(CascadeState::relevant_sides(MovementOperation::Transfer).len(), 2);
    }

    fn resolved(location: Option<ItemId>) -> ResolvedChain {
        ResolvedChain {
            warehouse: 1,
            department: 10,
            shelf: 20,
            tray: 30,
            location,
            material: location.map(|_| 7),
            departments: vec![node(10, "Отдел")],
            shelves: vec![node(20, "Стеллаж")],
            trays: vec![node(30, "Лоток")],
            locations: vec![stock(100, 30, 7, 5)],
        }
    }

    #[test]
    fn test_resolution_populates_top_down() {
        let mut state = CascadeState::new();
        let ticket = state.begin_resolution(ChainSide::Target);
        let applied = state.finish_resolution(ticket, resolved(None)).unwrap();

        assert_eq!(
            applied,
            vec![
                CascadeLevel::Warehouse,
                CascadeLevel::Department,
                CascadeLevel::Shelf,
                CascadeLevel::Tray
            ]
        );
        let target = state.chain(ChainSide::Target);
        assert_eq!(target.selected(CascadeLevel::Warehouse), Some(1));
        assert_eq!(target.selected(CascadeLevel::Department), Some(10));
        assert_eq!(target.selected(CascadeLevel::Shelf), Some(20));
        assert_eq!(target.selected(CascadeLevel::Tray), Some(30));
        assert_eq!(target.options(CascadeLevel::Tray).len(), 1);
        assert_eq!(target.locations().len(), 1);
        assert!(state.chain(ChainSide::Source).is_empty());
    }

    #[test]
    fn test_user_selection_supersedes_resolution() {
        let mut state = CascadeState::new();
        let ticket = state.begin_resolution(ChainSide::Source);
        state.select(ChainSide::Source, CascadeLevel::Warehouse, Some(5));

        assert!(!state.is_current(&ticket));
        assert_eq!(state.finish_resolution(ticket, resolved(Some(100))), None);
        assert_eq!(
            state.chain(ChainSide::Source).selected(CascadeLevel::Warehouse),
            Some(5)
        );
    }

    #[test]
    fn test_newer_resolution_cancels_older() {
        let mut state = CascadeState::new();
        let first = state.begin_resolution(ChainSide::Source);
        let second = state.begin_resolution(ChainSide::Source);
        let other_side = state.begin_resolution(ChainSide::Target);

        assert!(!state.is_current(&first));
        assert!(state.is_current(&second));
        assert!(state.is_current(&other_side));

        let applied = state.finish_resolution(second, resolved(Some(100))).unwrap();
        assert_eq!(applied.last(), Some(&CascadeLevel::Location));
        assert_eq!(
            state
                .chain(ChainSide::Source)
                .selected_location()
                .map(|l| l.quantity),
            Some(5)
        );
    }

    #[test]
    fn test_material_choice_keeps_resolutions_current() {
        let mut state = CascadeState::new();
        let source = state.begin_resolution(ChainSide::Source);
        let target = state.begin_resolution(ChainSide::Target);

        state.finish_resolution(source, resolved(Some(100))).unwrap();
        state.select_material(Some(7));

        assert!(state.is_current(&target));
        assert_eq!(
            state.chain(ChainSide::Source).selected(CascadeLevel::Location),
            Some(100)
        );
        let applied = state.finish_resolution(target, resolved(None)).unwrap();
        assert_eq!(applied.last(), Some(&CascadeLevel::Tray));
        assert_eq!(
            state.chain(ChainSide::Target).selected(CascadeLevel::Tray),
            Some(30)
        );
    }

    #[test]
    fn test_reset_cancels_resolution() {
        let mut state = CascadeState::new();
        let ticket = state.begin_resolution(ChainSide::Source);
        state.on_operation_changed(MovementOperation::Add);
        assert!(!state.is_current(&ticket));
    }
}
