//! Stock records of the chosen material with shortcuts that fill a chain.

use crate::shared::icons::icon;
use contracts::domain::a001_material::aggregate::{material_name, Material};
use contracts::domain::a003_stock_location::aggregate::StockLocation;
use leptos::prelude::*;
use thaw::*;

/// `Склад > Отдел > Стеллаж > Лоток (WH-DEP-SH-T)`
fn place_label(location: &StockLocation) -> String {
    match location.tray_full_code.as_deref() {
        Some(code) if !code.is_empty() => format!("{} ({})", location.path_label(), code),
        _ => location.path_label(),
    }
}

#[component]
pub fn StockLocationsPanel(
    #[prop(into)] locations: Signal<Vec<StockLocation>>,
    #[prop(into)] materials: Signal<Vec<Material>>,
    #[prop(into)] on_use_as_source: Callback<StockLocation>,
    #[prop(into)] on_use_as_destination: Callback<StockLocation>,
) -> impl IntoView {
    let title = move || {
        locations.with(|locs| {
            locs.first().map(|first| {
                let name = first
                    .material_name
                    .clone()
                    .unwrap_or_else(|| materials.with(|m| material_name(m, first.material)));
                format!("Где лежит: {}", name)
            })
        })
    };

    view! {
        <Show when=move || locations.with(|l| !l.is_empty())>
            <Card>
                <div class="stock-panel">
                    <div class="stock-panel__title">
                        {icon("inventory")}
                        <span>{title}</span>
                    </div>
                    <table class="stock-panel__table">
                        <thead>
                            <tr>
                                <th>"Место"</th>
                                <th>"Кол-во"</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            <For
                                each=move || locations.get()
                                key=|location| (location.id, location.quantity)
                                children=move |location| {
                                    let row_class = if location.is_below_minimum() {
                                        "stock-panel__row stock-panel__row--low"
                                    } else {
                                        "stock-panel__row"
                                    };
                                    let place = place_label(&location);
                                    let quantity = location.quantity;
                                    let for_source = location.clone();
                                    let for_target = location;
                                    view! {
                                        <tr class=row_class>
                                            <td>{place}</td>
                                            <td>{quantity}</td>
                                            <td>
                                                <Button
                                                    appearance=ButtonAppearance::Subtle
                                                    size=ButtonSize::Small
                                                    on_click=move |_| on_use_as_source.run(for_source.clone())
                                                >
                                                    {icon("log-out")}
                                                    " Как источник"
                                                </Button>
                                                <Button
                                                    appearance=ButtonAppearance::Subtle
                                                    size=ButtonSize::Small
                                                    on_click=move |_| on_use_as_destination.run(for_target.clone())
                                                >
                                                    {icon("log-in")}
                                                    " Как назначение"
                                                </Button>
                                            </td>
                                        </tr>
                                    }
                                }
                            />
                        </tbody>
                    </table>
                </div>
            </Card>
        </Show>
    }
}
