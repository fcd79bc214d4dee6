use crate::domain::a004_material_movement::ui::details::MaterialMovementDetails;
use crate::shared::incident_counts::{IncidentBadge, IncidentCountStore, DEFAULT_POLL_INTERVAL_MS};
use crate::shared::notifications::{NotificationCenter, NotificationHost};
use crate::system::auth::storage;
use contracts::domain::common::ItemId;
use leptos::prelude::*;
use serde::Deserialize;
use web_sys::window;

/// Параметры ссылки на форму: `?movement=5`, `?source=12&target=40`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct MovementLink {
    #[serde(default)]
    pub movement: Option<ItemId>,
    #[serde(default)]
    pub source: Option<ItemId>,
    #[serde(default)]
    pub target: Option<ItemId>,
}

impl MovementLink {
    pub fn from_search(search: &str) -> Self {
        serde_qs::from_str(search.trim_start_matches('?')).unwrap_or_default()
    }

    fn current() -> Self {
        let search = window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default();
        Self::from_search(&search)
    }
}

/// Убрать параметры ссылки, чтобы перезагрузка не открыла форму заново
fn clear_link() {
    if let Some(w) = window() {
        if let Ok(history) = w.history() {
            let _ = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some("?"));
        }
    }
}

#[component]
pub fn App() -> impl IntoView {
    provide_context(NotificationCenter::new());

    let incidents = IncidentCountStore::new();
    incidents.start_polling(DEFAULT_POLL_INTERVAL_MS);
    provide_context(incidents.clone());
    on_cleanup(move || incidents.teardown());

    let link = RwSignal::new(MovementLink::current());
    if link.get_untracked() != MovementLink::default() {
        log::info!("opening movement form from link: {:?}", link.get_untracked());
    }

    // New key remounts the form with a clean state
    let form_key = RwSignal::new(0_u32);
    let reset_form = move || {
        clear_link();
        link.set(MovementLink::default());
        form_key.update(|k| *k += 1);
    };

    let user_name = storage::get_user()
        .map(|u| u.display_name())
        .unwrap_or_else(|| "Гость".to_string());

    view! {
        <div class="app">
            <header class="app__header">
                <span class="app__title">"Склад: движение материалов"</span>
                <div class="app__header-right">
                    <IncidentBadge />
                    <span class="app__user">{user_name}</span>
                </div>
            </header>
            <main class="app__content">
                {move || {
                    form_key.track();
                    let current = link.get_untracked();
                    view! {
                        <MaterialMovementDetails
                            id=current.movement
                            source_location=current.source
                            target_location=current.target
                            on_saved=move |_| reset_form()
                            on_cancel=move |_| reset_form()
                        />
                    }
                }}
            </main>
            <NotificationHost />
        </div>
    }
}
