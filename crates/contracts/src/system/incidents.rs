use serde::{Deserialize, Serialize};

/// Счётчики инцидентов (`GET /incidents/counts/`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentCounts {
    #[serde(default)]
    pub pending: u32,
    #[serde(default)]
    pub in_progress: u32,
    /// Старые версии бэкенда поле не отдают
    #[serde(default)]
    pub active: Option<u32>,
    #[serde(default)]
    pub total: u32,
}

impl IncidentCounts {
    /// Активные = ожидающие + в работе, если бэкенд не прислал значение сам
    pub fn active(&self) -> u32 {
        self.active
            .unwrap_or_else(|| self.pending.saturating_add(self.in_progress))
    }

    pub fn normalized(mut self) -> Self {
        self.active = Some(self.active());
        self
    }
}
