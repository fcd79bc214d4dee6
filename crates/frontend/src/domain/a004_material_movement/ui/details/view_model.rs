//! ViewModel for the material movement form
//!
//! Holds the cascade state in a single signal; every command mutates it
//! through `CascadeState` and starts whatever fetch the mutation asks for.

use chrono::{DateTime, Utc};
use contracts::domain::a001_material::aggregate::{material_name, Material};
use contracts::domain::a002_storage_hierarchy::aggregate::LevelKind;
use contracts::domain::a003_stock_location::aggregate::{LocationQuery, StockLocation};
use contracts::domain::a004_material_movement::aggregate::{
    MaterialMovement, MovementOperation, MovementRoute, MovementTarget,
};
use contracts::domain::common::{parse_optional_id, ItemId};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::domain::a004_material_movement::api::{
    create_movement, fetch_materials, fetch_movement, HierarchySource, StorageApi,
};
use crate::domain::a004_material_movement::assembler::{
    assemble, MovementDraft, MovementInput, TargetSelection,
};
use crate::domain::a004_material_movement::cascade::{
    CascadeLevel, CascadeState, ChainSide, OptionsRequest,
};
use crate::domain::a004_material_movement::resolver::{
    resolve_chain, ChainAnchor, ResolveOutcome,
};
use crate::domain::a004_material_movement::stock::{check_stock, StockCheck};
use crate::shared::http::{FetchError, PostError};
use crate::shared::notifications::NotificationCenter;
use crate::system::auth::storage;

/// Подпись остатка в списке: `Материал — 10 шт.`
pub fn location_label(location: &StockLocation, materials: &[Material]) -> String {
    let name = location
        .material_name
        .clone()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| material_name(materials, location.material));
    format!("{} — {} шт.", name, location.quantity)
}

/// Время движения для заголовка формы
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%d.%m.%Y %H:%M").to_string()
}

/// Пояснение под цепочкой назначения
pub fn target_hint(target: Option<&TargetSelection>) -> Option<String> {
    match target? {
        TargetSelection::Existing(location) => Some(format!(
            "В лотке уже есть этот материал: {} шт.",
            location.quantity
        )),
        TargetSelection::Tray(_) => {
            Some("Материал будет размещён в лотке впервые".to_string())
        }
    }
}

fn fetch_error_text(context: &str, error: &FetchError) -> String {
    format!("{}: {}", context, error)
}

fn movement_load_context(id: ItemId) -> String {
    format!("Ошибка загрузки движения #{}", id)
}

/// Какие цепочки восстановить для сохранённого маршрута
pub fn route_anchors(route: &MovementRoute) -> Vec<(ChainSide, ChainAnchor)> {
    let mut anchors = Vec::with_capacity(2);
    if let Some(source) = route.source() {
        anchors.push((ChainSide::Source, ChainAnchor::LocationId(source)));
    }
    match route.target() {
        Some(MovementTarget::Location(id)) => {
            anchors.push((ChainSide::Target, ChainAnchor::LocationId(id)))
        }
        Some(MovementTarget::Tray(id)) => anchors.push((ChainSide::Target, ChainAnchor::TrayId(id))),
        None => {}
    }
    anchors
}

#[derive(Clone, Copy)]
pub struct MaterialMovementDetailsVm {
    // === Form fields ===
    pub movement_id: RwSignal<Option<ItemId>>,
    pub recorded_at: RwSignal<Option<DateTime<Utc>>>,
    pub operation: RwSignal<MovementOperation>,
    pub material: RwSignal<Option<ItemId>>,
    pub quantity: RwSignal<String>,
    pub notes: RwSignal<String>,

    // === Cascade and reference data ===
    pub cascade: RwSignal<CascadeState>,
    pub materials: RwSignal<Vec<Material>>,
    pub material_stock: RwSignal<Vec<StockLocation>>,

    // === UI State ===
    pub loading: RwSignal<bool>,
    pub saving: RwSignal<bool>,
    pub error: RwSignal<Option<String>>,

    notifications: NotificationCenter,
}

impl MaterialMovementDetailsVm {
    pub fn new(notifications: NotificationCenter) -> Self {
        Self {
            movement_id: RwSignal::new(None),
            recorded_at: RwSignal::new(None),
            operation: RwSignal::new(MovementOperation::default()),
            material: RwSignal::new(None),
            quantity: RwSignal::new("1".to_string()),
            notes: RwSignal::new(String::new()),
            cascade: RwSignal::new(CascadeState::new()),
            materials: RwSignal::new(Vec::new()),
            material_stock: RwSignal::new(Vec::new()),
            loading: RwSignal::new(false),
            saving: RwSignal::new(false),
            error: RwSignal::new(None),
            notifications,
        }
    }

    // === Derived signals ===

    pub fn is_edit_mode(&self) -> Signal<bool> {
        let movement_id = self.movement_id;
        Signal::derive(move || movement_id.get().is_some())
    }

    pub fn source_location(&self) -> Signal<Option<StockLocation>> {
        let cascade = self.cascade;
        Signal::derive(move || {
            cascade.with(|c| c.chain(ChainSide::Source).selected_location().cloned())
        })
    }

    /// Материал задаётся остатком-источником, пока тот выбран
    pub fn is_material_locked(&self) -> Signal<bool> {
        let operation = self.operation;
        let source = self.source_location();
        Signal::derive(move || operation.get().needs_source() && source.get().is_some())
    }

    pub fn stock_check(&self) -> Signal<StockCheck> {
        let operation = self.operation;
        let quantity = self.quantity;
        let source = self.source_location();
        Signal::derive(move || {
            let requested = MovementInput::parse_quantity(&quantity.get());
            source.with(|s| check_stock(operation.get(), s.as_ref(), requested))
        })
    }

    pub fn target_selection(&self) -> Signal<Option<TargetSelection>> {
        let operation = self.operation;
        let material = self.material;
        let cascade = self.cascade;
        Signal::derive(move || {
            let draft = cascade
                .with(|c| MovementDraft::from_state(operation.get(), c, material.get()));
            draft.target().cloned()
        })
    }

    pub fn is_save_disabled(&self) -> Signal<bool> {
        let saving = self.saving;
        let stock = self.stock_check();
        Signal::derive(move || saving.get() || stock.get().is_insufficient())
    }

    fn input_untracked(&self) -> MovementInput {
        MovementInput {
            material: self.material.get_untracked(),
            quantity: MovementInput::parse_quantity(&self.quantity.get_untracked()),
            notes: self.notes.get_untracked(),
        }
    }

    fn notify_fetch_error(&self, context: &str, error: &FetchError) {
        let text = fetch_error_text(context, error);
        log::error!("{}", text);
        self.notifications.error(text);
    }

    // === Data loading ===

    /// Склады и каталог материалов (вызывается при монтировании)
    pub fn load_initial(&self) {
        let vm = *self;
        vm.loading.set(true);
        vm.error.set(None);

        spawn_local(async move {
            match StorageApi.list(ChainSide::Source, LevelKind::Warehouse, None).await {
                Ok(nodes) => vm.cascade.update(|c| c.apply_warehouses(nodes)),
                Err(e) => {
                    vm.error.set(Some("Ошибка загрузки складов".to_string()));
                    vm.notify_fetch_error("Ошибка загрузки складов", &e);
                }
            }
            match fetch_materials().await {
                Ok(items) => vm.materials.set(items),
                Err(e) => {
                    vm.error.set(Some("Ошибка загрузки материалов".to_string()));
                    vm.notify_fetch_error("Ошибка загрузки материалов", &e);
                }
            }
            vm.loading.set(false);
        });
    }

    fn load_options(&self, request: OptionsRequest) {
        let vm = *self;
        spawn_local(async move {
            let OptionsRequest {
                side,
                level,
                parent_id,
            } = request;

            match level.hierarchy_kind() {
                Some(kind) => match StorageApi.list(side, kind, Some(parent_id)).await {
                    Ok(nodes) => vm.cascade.update(|c| {
                        c.chain_mut(side).apply_nodes(level, parent_id, nodes);
                    }),
                    Err(e) => vm.notify_fetch_error(
                        &format!("Ошибка загрузки списка «{}»", level.label()),
                        &e,
                    ),
                },
                None => match StorageApi
                    .locations(side, LocationQuery::ByTray(parent_id))
                    .await
                {
                    Ok(locations) => {
                        let material = vm.material.get_untracked();
                        vm.cascade.update(|c| {
                            c.chain_mut(side).apply_locations(parent_id, locations, material);
                        });
                        vm.adopt_source_material(side);
                    }
                    Err(e) => vm.notify_fetch_error("Ошибка загрузки содержимого лотка", &e),
                },
            }
        });
    }

    /// Остатки выбранного материала для панели быстрого выбора
    fn load_material_stock(&self, material: Option<ItemId>) {
        let Some(material) = material else {
            self.material_stock.set(Vec::new());
            return;
        };

        let vm = *self;
        spawn_local(async move {
            match StorageApi
                .locations(ChainSide::Source, LocationQuery::ByMaterial(material))
                .await
            {
                Ok(locations) => {
                    if vm.material.get_untracked() == Some(material) {
                        vm.material_stock.set(locations);
                    }
                }
                Err(e) => vm.notify_fetch_error("Ошибка загрузки остатков материала", &e),
            }
        });
    }

    /// Открыть существующее движение: поля формы и обе цепочки
    pub fn load_movement(&self, id: ItemId) {
        let vm = *self;
        vm.loading.set(true);
        vm.error.set(None);
        vm.movement_id.set(Some(id));

        spawn_local(async move {
            match fetch_movement(id).await {
                Ok(movement) => vm.apply_movement(movement),
                Err(e) => {
                    vm.error.set(Some(format!("Ошибка загрузки: {}", e)));
                    vm.notify_fetch_error(&movement_load_context(id), &e);
                }
            }
            vm.loading.set(false);
        });
    }

    fn apply_movement(&self, movement: MaterialMovement) {
        self.recorded_at.set(movement.timestamp);
        self.operation.set(movement.operation);
        self.quantity.set(movement.quantity.to_string());
        self.notes.set(movement.notes.clone().unwrap_or_default());
        self.set_material(Some(movement.material));

        let Some(route) = movement.route() else {
            log::warn!(
                "movement {} ({}) has an incomplete route",
                movement.id,
                movement.operation.code()
            );
            let message = "В записи движения не хватает мест хранения".to_string();
            self.error.set(Some(message.clone()));
            self.notifications.error(message);
            return;
        };
        for (side, anchor) in route_anchors(&route) {
            self.resolve(side, anchor);
        }
    }

    /// Предзаполнение по ссылке `?source=` / `?target=`
    pub fn preset_locations(&self, source: Option<ItemId>, target: Option<ItemId>) {
        match (source, target) {
            (Some(_), None) => self.set_operation(MovementOperation::Remove),
            (None, Some(_)) => self.set_operation(MovementOperation::Add),
            _ => {}
        }
        if let Some(id) = source {
            self.resolve(ChainSide::Source, ChainAnchor::LocationId(id));
        }
        if let Some(id) = target {
            self.resolve(ChainSide::Target, ChainAnchor::LocationId(id));
        }
    }

    // === Commands ===

    pub fn set_operation(&self, operation: MovementOperation) {
        self.operation.set(operation);
        self.cascade.update(|c| c.on_operation_changed(operation));
    }

    pub fn select_level(&self, side: ChainSide, level: CascadeLevel, raw: String) {
        let id = parse_optional_id(&raw);
        let request = self
            .cascade
            .try_update(|c| c.select(side, level, id))
            .flatten();
        if let Some(request) = request {
            self.load_options(request);
        }
    }

    pub fn select_source_location(&self, raw: String) {
        let id = parse_optional_id(&raw);
        let material = self
            .cascade
            .try_update(|c| c.chain_mut(ChainSide::Source).select_location(id))
            .flatten();
        if material.is_some() && material != self.material.get_untracked() {
            self.set_material(material);
        }
    }

    pub fn select_material(&self, raw: String) {
        self.set_material(parse_optional_id(&raw));
    }

    fn set_material(&self, material: Option<ItemId>) {
        self.material.set(material);
        self.cascade.update(|c| c.select_material(material));
        self.load_material_stock(material);
    }

    /// Материал остатка-источника становится материалом формы
    fn adopt_source_material(&self, side: ChainSide) {
        if side != ChainSide::Source {
            return;
        }
        let material = self.cascade.with_untracked(|c| {
            c.chain(ChainSide::Source)
                .selected_location()
                .map(|l| l.material)
        });
        if material.is_some() && material != self.material.get_untracked() {
            self.set_material(material);
        }
    }

    pub fn use_as_source(&self, location: StockLocation) {
        if !self.operation.get_untracked().needs_source() {
            self.switch_to_transfer();
        }
        self.resolve(ChainSide::Source, ChainAnchor::Stock(location));
    }

    pub fn use_as_destination(&self, location: StockLocation) {
        if !self.operation.get_untracked().needs_target() {
            self.switch_to_transfer();
        }
        self.resolve(ChainSide::Target, ChainAnchor::Stock(location));
    }

    fn switch_to_transfer(&self) {
        self.set_operation(MovementOperation::Transfer);
        self.notifications.info(format!(
            "Операция изменена на «{}»",
            MovementOperation::Transfer.display_name()
        ));
    }

    /// Восстановить цепочку предков и заполнить её одним переходом.
    /// Более поздний выбор пользователя в этой цепочке отменяет результат.
    fn resolve(&self, side: ChainSide, anchor: ChainAnchor) {
        let Some(ticket) = self.cascade.try_update(|c| c.begin_resolution(side)) else {
            return;
        };

        let vm = *self;
        spawn_local(async move {
            let cascade = vm.cascade;
            let outcome = resolve_chain(&StorageApi, side, anchor, || {
                cascade.with_untracked(|c| c.is_current(&ticket))
            })
            .await;

            match outcome {
                Ok(ResolveOutcome::Resolved(chain)) => {
                    let material = chain.material;
                    let applied = cascade
                        .try_update(|c| c.finish_resolution(ticket, chain))
                        .flatten();
                    if applied.is_none() {
                        return;
                    }
                    match side {
                        ChainSide::Source => vm.adopt_source_material(side),
                        ChainSide::Target => {
                            if vm.material.get_untracked().is_none() && material.is_some() {
                                vm.set_material(material);
                            }
                        }
                    }
                }
                Ok(ResolveOutcome::Cancelled) => {
                    log::debug!("[{}] chain resolution cancelled", side.as_str());
                }
                Err(e) => vm.notify_fetch_error(
                    &format!("Не удалось определить место хранения ({})", side.title()),
                    &e,
                ),
            }
        });
    }

    /// Проверить форму и зарегистрировать движение
    pub fn save_command(&self, on_saved: Callback<()>) {
        self.error.set(None);

        let input = self.input_untracked();
        let operation = self.operation.get_untracked();
        let draft = self
            .cascade
            .with_untracked(|c| MovementDraft::from_state(operation, c, input.material));
        let user = storage::get_user();

        let request = match assemble(&input, &draft, user.as_ref()) {
            Ok(request) => request,
            Err(e) => {
                self.error.set(Some(e.to_string()));
                self.notifications.error(e.to_string());
                return;
            }
        };

        let vm = *self;
        vm.saving.set(true);
        spawn_local(async move {
            match create_movement(&request).await {
                Ok(movement) => {
                    log::info!("movement {} registered", movement.id);
                    vm.notifications
                        .success(format!("Движение #{} зарегистрировано", movement.id));
                    on_saved.run(());
                }
                Err(PostError::Rejected { status, message }) => {
                    log::warn!("movement rejected (HTTP {}): {}", status, message);
                    vm.error.set(Some(message.clone()));
                    vm.notifications.error(message);
                }
                Err(PostError::Fetch(e)) => {
                    vm.error.set(Some(e.to_string()));
                    vm.notify_fetch_error("Ошибка при регистрации движения", &e);
                }
            }
            vm.saving.set(false);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(material_name: Option<&str>) -> StockLocation {
        StockLocation {
            id: 100,
            tray: 30,
            material: 7,
            quantity: 12,
            minimum_quantity: 0,
            material_name: material_name.map(String::from),
            tray_name: None,
            tray_full_code: None,
            shelf_name: None,
            department_name: None,
            warehouse_name: None,
        }
    }

    #[test]
    fn test_location_label() {
        let catalog = vec![Material {
            id: 7,
            name: "Кабель UTP".into(),
            code: None,
        }];
        assert_eq!(
            location_label(&stock(Some("Коннектор RJ45")), &catalog),
            "Коннектор RJ45 — 12 шт."
        );
        assert_eq!(location_label(&stock(None), &catalog), "Кабель UTP — 12 шт.");
        assert_eq!(location_label(&stock(Some("")), &[]), "Материал #7 — 12 шт.");
    }

    #[test]
    fn test_format_timestamp() {
        let ts = DateTime::parse_from_rfc3339("2024-03-05T09:07:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_timestamp(&ts), "05.03.2024 09:07");
    }

    #[test]
    fn test_movement_load_failure_text() {
        let text = fetch_error_text(&movement_load_context(5), &FetchError::Http { status: 404 });
        assert_eq!(text, "Ошибка загрузки движения #5: Ошибка сервера: HTTP 404");
    }

    #[test]
    fn test_route_anchors() {
        let transfer = MovementRoute::Transfer {
            source: 100,
            target: MovementTarget::Tray(31),
        };
        assert_eq!(
            route_anchors(&transfer),
            vec![
                (ChainSide::Source, ChainAnchor::LocationId(100)),
                (ChainSide::Target, ChainAnchor::TrayId(31)),
            ]
        );
        assert_eq!(
            route_anchors(&MovementRoute::Add {
                target: MovementTarget::Location(200)
            }),
            vec![(ChainSide::Target, ChainAnchor::LocationId(200))]
        );
        assert_eq!(
            route_anchors(&MovementRoute::Remove { source: 100 }),
            vec![(ChainSide::Source, ChainAnchor::LocationId(100))]
        );
    }

    #[test]
    fn test_incomplete_record_has_no_anchors_to_apply() {
        let movement = MaterialMovement {
            id: 5,
            material: 7,
            material_name: None,
            quantity: 2,
            operation: MovementOperation::Transfer,
            source_location: Some(100),
            target_location: None,
            target_tray: None,
            notes: None,
            user: None,
            user_name: None,
            timestamp: None,
        };
        assert_eq!(movement.route(), None);
    }

    #[test]
    fn test_target_hint() {
        assert_eq!(target_hint(None), None);
        assert_eq!(
            target_hint(Some(&TargetSelection::Existing(stock(None)))).as_deref(),
            Some("В лотке уже есть этот материал: 12 шт.")
        );
        assert!(target_hint(Some(&TargetSelection::Tray(31))).is_some());
    }
}
