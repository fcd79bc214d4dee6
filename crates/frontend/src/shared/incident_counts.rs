//! Incident counters shown in the console chrome.
//!
//! One store per application, created at the root and handed out through
//! context. Components subscribe explicitly and must unsubscribe on cleanup;
//! `teardown` drops every listener and stops polling.

use std::sync::{Arc, Mutex, MutexGuard};

use contracts::system::incidents::IncidentCounts;
use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::shared::http::{get_json, FetchError};

pub const DEFAULT_POLL_INTERVAL_MS: u32 = 60_000;

type Listener = Arc<dyn Fn(&IncidentCounts) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
    cached: Option<IncidentCounts>,
    poll_generation: u64,
}

#[derive(Clone, Default)]
pub struct IncidentCountStore {
    inner: Arc<Mutex<Registry>>,
}

impl IncidentCountStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        // Listeners never run under the lock, so a poisoned guard still holds consistent data
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Подписаться на обновления; последнее известное значение приходит сразу
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&IncidentCounts) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        let (id, cached) = {
            let mut registry = self.registry();
            registry.next_id += 1;
            let id = SubscriptionId(registry.next_id);
            registry.listeners.push((id, listener.clone()));
            (id, registry.cached)
        };

        if let Some(counts) = cached {
            listener(&counts);
        }
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = self.registry();
        let before = registry.listeners.len();
        registry.listeners.retain(|(sid, _)| *sid != id);
        registry.listeners.len() != before
    }

    pub fn cached(&self) -> Option<IncidentCounts> {
        self.registry().cached
    }

    /// Сохранить новые значения и разослать подписчикам
    pub fn publish(&self, counts: IncidentCounts) {
        let counts = counts.normalized();
        let listeners: Vec<Listener> = {
            let mut registry = self.registry();
            registry.cached = Some(counts);
            registry.listeners.iter().map(|(_, l)| l.clone()).collect()
        };

        for listener in listeners {
            listener(&counts);
        }
    }

    /// Перезапросить счётчики; при ошибке кэш остаётся прежним
    pub async fn refresh(&self) -> Result<IncidentCounts, FetchError> {
        match get_json::<IncidentCounts>("/incidents/counts/").await {
            Ok(counts) => {
                let counts = counts.normalized();
                self.publish(counts);
                Ok(counts)
            }
            Err(e) => {
                log::warn!("incident counts refresh failed: {}", e);
                Err(e)
            }
        }
    }

    /// Периодический опрос; повторный вызов заменяет предыдущий цикл
    pub fn start_polling(&self, interval_ms: u32) {
        let generation = {
            let mut registry = self.registry();
            registry.poll_generation += 1;
            registry.poll_generation
        };

        let store = self.clone();
        spawn_local(async move {
            while store.registry().poll_generation == generation {
                let _ = store.refresh().await;
                TimeoutFuture::new(interval_ms).await;
            }
            log::debug!("incident counts polling stopped");
        });
    }

    pub fn teardown(&self) {
        let mut registry = self.registry();
        registry.poll_generation += 1;
        registry.listeners.clear();
    }
}

/// Счётчик активных инцидентов в шапке консоли
#[component]
pub fn IncidentBadge() -> impl IntoView {
    let store = use_context::<IncidentCountStore>().expect("IncidentCountStore not provided");
    let active = RwSignal::new(store.cached().map(|c| c.active()).unwrap_or(0));

    let subscription = store.subscribe(move |counts| active.set(counts.active()));
    on_cleanup(move || {
        store.unsubscribe(subscription);
    });

    view! {
        <Show when=move || { active.get() > 0 }>
            <span class="badge badge--warning" title="Активные инциденты">
                {move || active.get()}
            </span>
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counts(pending: u32, in_progress: u32) -> IncidentCounts {
        IncidentCounts {
            pending,
            in_progress,
            active: None,
            total: pending + in_progress,
        }
    }

    #[test]
    fn test_publish_reaches_subscribers() {
        let store = IncidentCountStore::new();
        let seen = Arc::new(AtomicU32::new(0));
        let seen_in = seen.clone();
        store.subscribe(move |c| seen_in.store(c.active(), Ordering::SeqCst));

        store.publish(counts(2, 3));
        assert_eq!(seen.load(Ordering::SeqCst), 5);
        assert_eq!(store.cached().map(|c| c.active), Some(Some(5)));
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let store = IncidentCountStore::new();
        let calls = Arc::new(AtomicU32::new(0));
        let calls_in = calls.clone();
        let id = store.subscribe(move |_| {
            calls_in.fetch_add(1, Ordering::SeqCst);
        });

        store.publish(counts(1, 0));
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.publish(counts(4, 0));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.registry().listeners.len(), 0);
    }

    #[test]
    fn test_late_subscriber_gets_cached_value() {
        let store = IncidentCountStore::new();
        store.publish(counts(1, 1));

        let seen = Arc::new(AtomicU32::new(0));
        let seen_in = seen.clone();
        store.subscribe(move |c| seen_in.store(c.total, Ordering::SeqCst));
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_teardown_drops_listeners() {
        let store = IncidentCountStore::new();
        store.subscribe(|_| {});
        store.subscribe(|_| {});
        assert_eq!(store.registry().listeners.len(), 2);

        store.teardown();
        assert_eq!(store.registry().listeners.len(), 0);
        store.publish(counts(1, 0));
        assert!(store.cached().is_some());
    }

    #[test]
    fn test_clones_share_state() {
        let store = IncidentCountStore::new();
        let other = store.clone();
        other.publish(counts(0, 7));
        assert_eq!(store.cached().map(|c| c.active()), Some(7));
    }
}
