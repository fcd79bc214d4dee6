use super::view_model::{format_timestamp, location_label, target_hint, MaterialMovementDetailsVm};
use crate::domain::a004_material_movement::cascade::{CascadeLevel, CascadeState, ChainSide};
use crate::domain::a004_material_movement::ui::locations::StockLocationsPanel;
use crate::shared::icons::icon;
use crate::shared::notifications::use_notifications;
use contracts::domain::a004_material_movement::aggregate::MovementOperation;
use contracts::domain::common::{AggregateId, ItemId};
use leptos::prelude::*;
use thaw::*;

const HIERARCHY_LEVELS: [CascadeLevel; 4] = [
    CascadeLevel::Warehouse,
    CascadeLevel::Department,
    CascadeLevel::Shelf,
    CascadeLevel::Tray,
];

#[component]
pub fn MaterialMovementDetails(
    /// Открыть существующее движение
    #[prop(optional_no_strip)]
    id: Option<ItemId>,
    /// Предвыбранный остаток-источник
    #[prop(optional_no_strip)]
    source_location: Option<ItemId>,
    /// Предвыбранный остаток назначения
    #[prop(optional_no_strip)]
    target_location: Option<ItemId>,
    #[prop(into)] on_saved: Callback<()>,
    #[prop(into)] on_cancel: Callback<()>,
) -> impl IntoView {
    let vm = MaterialMovementDetailsVm::new(use_notifications());
    vm.load_initial();
    match id {
        Some(id) => vm.load_movement(id),
        None => vm.preset_locations(source_location, target_location),
    }

    let is_edit_mode = vm.is_edit_mode();
    let stock_check = vm.stock_check();
    let shows = move |side: ChainSide| {
        CascadeState::relevant_sides(vm.operation.get()).contains(&side)
    };

    view! {
        <div class="details-container movement-details">
            <div class="details-header">
                <h3>
                    {move || match (vm.movement_id.get(), vm.recorded_at.get()) {
                        (Some(id), Some(ts)) if is_edit_mode.get() => {
                            format!("Движение #{} от {}", id, format_timestamp(&ts))
                        }
                        (Some(id), None) => format!("Движение #{}", id),
                        _ => "Новое движение материала".to_string(),
                    }}
                </h3>
                <Button appearance=ButtonAppearance::Subtle on_click=move |_| on_cancel.run(())>
                    {icon("x")}
                    " Закрыть"
                </Button>
            </div>

            {move || vm.error.get().map(|e| view! {
                <div class="warning-box" style="background: var(--color-error-50); border-color: var(--color-error-100);">
                    <span class="warning-box__icon" style="color: var(--color-error);">{icon("alert-triangle")}</span>
                    <span class="warning-box__text" style="color: var(--color-error);">{e}</span>
                </div>
            })}

            <Show when=move || vm.loading.get()>
                <Flex gap=FlexGap::Small style="align-items:center;padding:var(--spacing-lg);">
                    <Spinner size=SpinnerSize::Small />
                    <span>"Загрузка..."</span>
                </Flex>
            </Show>

            <div class="details-form">
                <OperationSelect vm=vm />
                <MaterialSelect vm=vm />

                <div class="form__group">
                    <label class="form__label">"Количество"</label>
                    <Input value=vm.quantity placeholder="Количество" />
                    {move || stock_check.get().warning().map(|w| view! {
                        <span class="form__hint form__hint--error">{w}</span>
                    })}
                </div>

                <Show when=move || shows(ChainSide::Source)>
                    <ChainSection vm=vm side=ChainSide::Source />
                </Show>
                <Show when=move || shows(ChainSide::Target)>
                    <ChainSection vm=vm side=ChainSide::Target />
                </Show>

                <StockLocationsPanel
                    locations=vm.material_stock
                    materials=vm.materials
                    on_use_as_source=move |location| vm.use_as_source(location)
                    on_use_as_destination=move |location| vm.use_as_destination(location)
                />

                <div class="form__group">
                    <label class="form__label">"Примечание"</label>
                    <Textarea value=vm.notes placeholder="Необязательно" attr:rows=3 />
                </div>
            </div>

            <div class="details-actions">
                <Button
                    appearance=ButtonAppearance::Primary
                    on_click=move |_| vm.save_command(on_saved)
                    disabled=vm.is_save_disabled()
                >
                    {icon("save")}
                    {move || if vm.saving.get() { " Сохранение..." } else { " Зарегистрировать" }}
                </Button>
                <Button appearance=ButtonAppearance::Secondary on_click=move |_| on_cancel.run(())>
                    "Отмена"
                </Button>
            </div>
        </div>
    }
}

#[component]
fn OperationSelect(vm: MaterialMovementDetailsVm) -> impl IntoView {
    view! {
        <div class="form__group">
            <label class="form__label">"Операция"</label>
            <select
                class="form__select"
                on:change=move |ev| {
                    if let Some(operation) = MovementOperation::from_code(&event_target_value(&ev)) {
                        vm.set_operation(operation);
                    }
                }
            >
                {MovementOperation::ALL
                    .into_iter()
                    .map(|op| view! {
                        <option value=op.code() prop:selected=move || vm.operation.get() == op>
                            {op.display_name()}
                        </option>
                    })
                    .collect_view()}
            </select>
            <span class="form__hint">{move || vm.operation.get().hint()}</span>
        </div>
    }
}

#[component]
fn MaterialSelect(vm: MaterialMovementDetailsVm) -> impl IntoView {
    let locked = vm.is_material_locked();

    view! {
        <div class="form__group">
            <label class="form__label">"Материал"</label>
            <select
                class="form__select"
                disabled=move || locked.get()
                on:change=move |ev| vm.select_material(event_target_value(&ev))
            >
                <option value="" prop:selected=move || vm.material.get().is_none()>
                    "— выберите материал —"
                </option>
                <For
                    each=move || vm.materials.get()
                    key=|material| material.id
                    children=move |material| {
                        let id = material.id;
                        let label = match material.code.as_deref() {
                            Some(code) if !code.is_empty() => format!("{} ({})", material.name, code),
                            _ => material.name.clone(),
                        };
                        view! {
                            <option value=id.as_string() prop:selected=move || vm.material.get() == Some(id)>
                                {label}
                            </option>
                        }
                    }
                />
            </select>
            <Show when=move || locked.get()>
                <span class="form__hint">"Материал определяется выбранным остатком"</span>
            </Show>
        </div>
    }
}

#[component]
fn ChainSection(vm: MaterialMovementDetailsVm, side: ChainSide) -> impl IntoView {
    let target = vm.target_selection();
    let cascade = vm.cascade;
    let is_blank = move || cascade.with(|c| c.chain(side).is_empty());

    view! {
        <fieldset class="form__fieldset">
            <legend>{side.title()}</legend>
            <Show when=is_blank>
                <span class="form__hint">"Выберите склад или место в панели остатков"</span>
            </Show>
            {HIERARCHY_LEVELS
                .into_iter()
                .map(|level| view! { <CascadeSelect vm=vm side=side level=level /> })
                .collect_view()}
            {match side {
                ChainSide::Source => view! { <SourceLocationSelect vm=vm /> }.into_any(),
                ChainSide::Target => view! {
                    {move || target_hint(target.get().as_ref()).map(|hint| view! {
                        <span class="form__hint">{hint}</span>
                    })}
                }
                .into_any(),
            }}
        </fieldset>
    }
}

#[component]
fn CascadeSelect(vm: MaterialMovementDetailsVm, side: ChainSide, level: CascadeLevel) -> impl IntoView {
    let cascade = vm.cascade;
    let selected = move || cascade.with(|c| c.chain(side).selected(level));
    let disabled = move || match level.parent() {
        Some(parent) => cascade.with(|c| c.chain(side).selected(parent).is_none()),
        None => false,
    };

    view! {
        <div class="form__group">
            <label class="form__label">{level.label()}</label>
            <select
                class="form__select"
                disabled=disabled
                on:change=move |ev| vm.select_level(side, level, event_target_value(&ev))
            >
                <option value="" prop:selected=move || selected().is_none()>"— не выбрано —"</option>
                <For
                    each=move || cascade.with(|c| c.options(side, level).to_vec())
                    key=|node| node.id
                    children=move |node| {
                        let id = node.id;
                        view! {
                            <option value=id.as_string() prop:selected=move || selected() == Some(id)>
                                {node.label()}
                            </option>
                        }
                    }
                />
            </select>
        </div>
    }
}

#[component]
fn SourceLocationSelect(vm: MaterialMovementDetailsVm) -> impl IntoView {
    let cascade = vm.cascade;
    let materials = vm.materials;
    let selected = move || cascade.with(|c| c.chain(ChainSide::Source).selected(CascadeLevel::Location));
    let no_tray = move || {
        cascade.with(|c| c.chain(ChainSide::Source).selected(CascadeLevel::Tray).is_none())
    };

    view! {
        <div class="form__group">
            <label class="form__label">{CascadeLevel::Location.label()}</label>
            <select
                class="form__select"
                disabled=no_tray
                on:change=move |ev| vm.select_source_location(event_target_value(&ev))
            >
                <option value="" prop:selected=move || selected().is_none()>"— не выбрано —"</option>
                <For
                    each=move || cascade.with(|c| c.chain(ChainSide::Source).locations().to_vec())
                    key=|location| location.id
                    children=move |location| {
                        let id = location.id;
                        let label = materials.with_untracked(|m| location_label(&location, m));
                        view! {
                            <option value=id.as_string() prop:selected=move || selected() == Some(id)>
                                {label}
                            </option>
                        }
                    }
                />
            </select>
            <Show when=move || !no_tray() && cascade.with(|c| c.chain(ChainSide::Source).locations().is_empty())>
                <span class="form__hint">"Лоток пуст"</span>
            </Show>
        </div>
    }
}
