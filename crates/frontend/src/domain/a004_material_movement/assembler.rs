//! Turns the form input and the cascade selections into a validated
//! [`MovementRequest`].
//!
//! Validation order is fixed: material, quantity, source, target, distinct
//! locations, stock, session. The first failure aborts and nothing is sent.

use contracts::domain::a003_stock_location::aggregate::StockLocation;
use contracts::domain::a004_material_movement::aggregate::{
    MovementOperation, MovementRequest, MovementRoute, MovementTarget,
};
use contracts::domain::common::ItemId;
use contracts::system::auth::UserInfo;
use thiserror::Error;

use super::cascade::{CascadeChain, CascadeLevel, CascadeState, ChainSide};
use super::stock::has_sufficient_stock;

/// Поля формы вне каскада
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovementInput {
    pub material: Option<ItemId>,
    /// Как введено; нечисловой ввод читается как 0
    pub quantity: i64,
    pub notes: String,
}

impl MovementInput {
    pub fn parse_quantity(raw: &str) -> i64 {
        raw.trim().parse().unwrap_or(0)
    }
}

/// Куда кладём: существующий остаток материала или пустой для него лоток
#[derive(Debug, Clone, PartialEq)]
pub enum TargetSelection {
    Existing(StockLocation),
    Tray(ItemId),
}

impl TargetSelection {
    pub fn tray(&self) -> ItemId {
        match self {
            TargetSelection::Existing(location) => location.tray,
            TargetSelection::Tray(tray) => *tray,
        }
    }

    fn to_target(&self) -> MovementTarget {
        match self {
            TargetSelection::Existing(location) => MovementTarget::Location(location.id),
            TargetSelection::Tray(tray) => MovementTarget::Tray(*tray),
        }
    }
}

/// Состояние формы, разложенное по операции
#[derive(Debug, Clone, PartialEq)]
pub enum MovementDraft {
    Add {
        target: Option<TargetSelection>,
    },
    Remove {
        source: Option<StockLocation>,
    },
    Transfer {
        source: Option<StockLocation>,
        target: Option<TargetSelection>,
    },
}

/// Назначение по цепочке: остаток материала в выбранном лотке, иначе сам лоток
fn target_selection(chain: &CascadeChain, material: Option<ItemId>) -> Option<TargetSelection> {
    let tray = chain.selected(CascadeLevel::Tray)?;
    match material.and_then(|m| chain.location_for_material(m)) {
        Some(existing) => Some(TargetSelection::Existing(existing.clone())),
        None => Some(TargetSelection::Tray(tray)),
    }
}

impl MovementDraft {
    pub fn from_state(
        operation: MovementOperation,
        state: &CascadeState,
        material: Option<ItemId>,
    ) -> Self {
        let source = || state.chain(ChainSide::Source).selected_location().cloned();
        let target = || target_selection(state.chain(ChainSide::Target), material);

        match operation {
            MovementOperation::Add => MovementDraft::Add { target: target() },
            MovementOperation::Remove => MovementDraft::Remove { source: source() },
            MovementOperation::Transfer => MovementDraft::Transfer {
                source: source(),
                target: target(),
            },
        }
    }

    pub fn operation(&self) -> MovementOperation {
        match self {
            MovementDraft::Add { .. } => MovementOperation::Add,
            MovementDraft::Remove { .. } => MovementOperation::Remove,
            MovementDraft::Transfer { .. } => MovementOperation::Transfer,
        }
    }

    pub fn source(&self) -> Option<&StockLocation> {
        match self {
            MovementDraft::Add { .. } => None,
            MovementDraft::Remove { source } | MovementDraft::Transfer { source, .. } => {
                source.as_ref()
            }
        }
    }

    pub fn target(&self) -> Option<&TargetSelection> {
        match self {
            MovementDraft::Remove { .. } => None,
            MovementDraft::Add { target } | MovementDraft::Transfer { target, .. } => {
                target.as_ref()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Выберите материал")]
    MissingMaterial,
    #[error("Количество должно быть больше нуля")]
    NonPositiveQuantity,
    #[error("Слишком большое количество")]
    QuantityTooLarge,
    #[error("Выберите место-источник")]
    MissingSource,
    #[error("Выберите лоток назначения")]
    MissingTarget,
    #[error("Источник и назначение совпадают")]
    SameLocation,
    #[error("Недостаточно материала. Доступно: {available}, запрошено: {requested}")]
    InsufficientStock { available: u32, requested: u32 },
    #[error("Сессия не найдена, войдите заново")]
    NotAuthenticated,
}

fn same_location(source: &StockLocation, target: &TargetSelection) -> bool {
    match target {
        TargetSelection::Existing(location) => location.id == source.id,
        TargetSelection::Tray(tray) => *tray == source.tray,
    }
}

pub fn assemble(
    input: &MovementInput,
    draft: &MovementDraft,
    user: Option<&UserInfo>,
) -> Result<MovementRequest, ValidationError> {
    let material = input.material.ok_or(ValidationError::MissingMaterial)?;

    if input.quantity <= 0 {
        return Err(ValidationError::NonPositiveQuantity);
    }
    let quantity = u32::try_from(input.quantity).map_err(|_| ValidationError::QuantityTooLarge)?;

    let route = match draft {
        MovementDraft::Add { target } => {
            let target = target.as_ref().ok_or(ValidationError::MissingTarget)?;
            MovementRoute::Add {
                target: target.to_target(),
            }
        }
        MovementDraft::Remove { source } => {
            let source = source.as_ref().ok_or(ValidationError::MissingSource)?;
            MovementRoute::Remove { source: source.id }
        }
        MovementDraft::Transfer { source, target } => {
            let source = source.as_ref().ok_or(ValidationError::MissingSource)?;
            let target = target.as_ref().ok_or(ValidationError::MissingTarget)?;
            if same_location(source, target) {
                return Err(ValidationError::SameLocation);
            }
            MovementRoute::Transfer {
                source: source.id,
                target: target.to_target(),
            }
        }
    };

    if let Some(source) = draft.source() {
        if !has_sufficient_stock(source, quantity) {
            return Err(ValidationError::InsufficientStock {
                available: source.quantity,
                requested: quantity,
            });
        }
    }

    let user = user.ok_or(ValidationError::NotAuthenticated)?;

    Ok(MovementRequest::new(
        material,
        quantity,
        route,
        &input.notes,
        user.id,
    ))
}
