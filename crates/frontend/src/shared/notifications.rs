use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use thaw::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

impl NoticeKind {
    /// Ошибки висят дольше, чтобы их успели прочитать
    fn dismiss_after_ms(&self) -> u32 {
        match self {
            NoticeKind::Error => 8000,
            NoticeKind::Success | NoticeKind::Info => 4000,
        }
    }

    fn intent(&self) -> MessageBarIntent {
        match self {
            NoticeKind::Success => MessageBarIntent::Success,
            NoticeKind::Error => MessageBarIntent::Error,
            NoticeKind::Info => MessageBarIntent::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub text: String,
}

fn without(notices: &mut Vec<Notice>, id: u64) {
    notices.retain(|n| n.id != id);
}

/// Всплывающие уведомления приложения.
///
/// Создаётся в корне приложения и раздаётся через контекст;
/// уведомления снимаются сами по таймеру или кнопкой.
#[derive(Clone, Copy)]
pub struct NotificationCenter {
    notices: RwSignal<Vec<Notice>>,
    next_id: RwSignal<u64>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self {
            notices: RwSignal::new(Vec::new()),
            next_id: RwSignal::new(1),
        }
    }

    pub fn success(&self, text: impl Into<String>) -> u64 {
        self.push(NoticeKind::Success, text.into())
    }

    pub fn error(&self, text: impl Into<String>) -> u64 {
        self.push(NoticeKind::Error, text.into())
    }

    pub fn info(&self, text: impl Into<String>) -> u64 {
        self.push(NoticeKind::Info, text.into())
    }

    fn push(&self, kind: NoticeKind, text: String) -> u64 {
        let id = self.next_id.get_untracked();
        self.next_id.set(id + 1);

        match kind {
            NoticeKind::Error => log::warn!("notice: {}", text),
            _ => log::debug!("notice: {}", text),
        }
        self.notices.update(|n| n.push(Notice { id, kind, text }));

        let svc = *self;
        spawn_local(async move {
            TimeoutFuture::new(kind.dismiss_after_ms()).await;
            svc.dismiss(id);
        });

        id
    }

    pub fn dismiss(&self, id: u64) {
        self.notices.update(|n| without(n, id));
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.get()
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

pub fn use_notifications() -> NotificationCenter {
    use_context::<NotificationCenter>().expect("NotificationCenter not provided")
}

/// Renders active notices; mount once near the root.
#[component]
pub fn NotificationHost() -> impl IntoView {
    let center = use_notifications();

    view! {
        <div class="notification-host">
            <For
                each=move || center.notices()
                key=|notice| notice.id
                children=move |notice| {
                    let id = notice.id;
                    view! {
                        <MessageBar intent=notice.kind.intent()>
                            <div class="notification-host__item">
                                <span>{notice.text}</span>
                                <Button
                                    appearance=ButtonAppearance::Transparent
                                    size=ButtonSize::Small
                                    on_click=move |_| center.dismiss(id)
                                >
                                    "✕"
                                </Button>
                            </div>
                        </MessageBar>
                    }
                }
            />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_removes_only_matching() {
        let mut notices = vec![
            Notice {
                id: 1,
                kind: NoticeKind::Info,
                text: "a".into(),
            },
            Notice {
                id: 2,
                kind: NoticeKind::Error,
                text: "b".into(),
            },
        ];
        without(&mut notices, 1);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].id, 2);

        without(&mut notices, 42);
        assert_eq!(notices.len(), 1);
    }

    #[test]
    fn test_errors_stay_longer() {
        assert!(NoticeKind::Error.dismiss_after_ms() > NoticeKind::Success.dismiss_after_ms());
    }
}
