//! Advisory stock check for operations that take material out of a location.
//! The backend re-validates on submit.

use contracts::domain::a003_stock_location::aggregate::StockLocation;
use contracts::domain::a004_material_movement::aggregate::MovementOperation;

pub fn has_sufficient_stock(source: &StockLocation, requested: u32) -> bool {
    requested <= source.quantity
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockCheck {
    /// Поступление, источник не выбран или количество не введено
    NotApplicable,
    Sufficient,
    Insufficient { available: u32, requested: u32 },
}

impl StockCheck {
    pub fn is_insufficient(&self) -> bool {
        matches!(self, StockCheck::Insufficient { .. })
    }

    /// Текст предупреждения под полем количества
    pub fn warning(&self) -> Option<String> {
        match self {
            StockCheck::Insufficient { available, .. } => Some(format!(
                "Недостаточно материала. Доступно: {}",
                available
            )),
            _ => None,
        }
    }
}

pub fn check_stock(
    operation: MovementOperation,
    source: Option<&StockLocation>,
    quantity: i64,
) -> StockCheck {
    if !operation.consumes_stock() || quantity <= 0 {
        return StockCheck::NotApplicable;
    }
    let Some(source) = source else {
        return StockCheck::NotApplicable;
    };

    // Above u32 range is always more than any stock record holds
    let requested = u32::try_from(quantity).unwrap_or(u32::MAX);
    if has_sufficient_stock(source, requested) {
        StockCheck::Sufficient
    } else {
        StockCheck::Insufficient {
            available: source.quantity,
            requested,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(quantity: u32) -> StockLocation {
        StockLocation {
            id: 1,
            tray: 2,
            material: 3,
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

    #[test]
    fn test_has_sufficient_stock() {
        let loc = source(5);
        assert!(!has_sufficient_stock(&loc, 6));
        assert!(has_sufficient_stock(&loc, 5));
        assert!(has_sufficient_stock(&loc, 1));
    }

    #[test]
    fn test_check_stock_by_operation() {
        let loc = source(5);

        assert_eq!(
            check_stock(MovementOperation::Remove, Some(&loc), 6),
            StockCheck::Insufficient {
                available: 5,
                requested: 6
            }
        );
        assert_eq!(
            check_stock(MovementOperation::Transfer, Some(&loc), 5),
            StockCheck::Sufficient
        );
        assert_eq!(
            check_stock(MovementOperation::Add, Some(&loc), 600),
            StockCheck::NotApplicable
        );
        assert_eq!(
            check_stock(MovementOperation::Remove, None, 6),
            StockCheck::NotApplicable
        );
        assert_eq!(
            check_stock(MovementOperation::Remove, Some(&loc), 0),
            StockCheck::NotApplicable
        );
    }

    #[test]
    fn test_huge_quantity_is_insufficient() {
        let check = check_stock(MovementOperation::Remove, Some(&source(5)), i64::MAX);
        assert!(check.is_insufficient());
        assert_eq!(
            check.warning().as_deref(),
            Some("Недостаточно материала. Доступно: 5")
        );
    }
}
