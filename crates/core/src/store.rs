//! Points store rules: product validation, redemption and point grants.

use crate::error::CoreError;

pub const MAX_PRODUCT_NAME_LENGTH: usize = 120;

/// Largest single manual point adjustment an owner may apply.
pub const MAX_POINT_ADJUSTMENT: i32 = 1_000_000;

/// Validate the editable fields of a store product.
pub fn validate_product(name: &str, point_cost: i32, stock: i32) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("Product name is required".to_string()));
    }
    if name.chars().count() > MAX_PRODUCT_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Product name must be at most {MAX_PRODUCT_NAME_LENGTH} characters"
        )));
    }
    if point_cost <= 0 {
        return Err(CoreError::Validation(
            "Point cost must be greater than zero".to_string(),
        ));
    }
    if stock < 0 {
        return Err(CoreError::Validation("Stock cannot be negative".to_string()));
    }
    Ok(())
}

/// Whether a balance covers a product's cost. Mirrors the enabled state of
/// the portal's redeem button.
pub fn can_afford(points: i32, point_cost: i32) -> bool {
    points >= point_cost
}

/// Check every precondition of a redemption.
pub fn check_redemption(
    points: i32,
    point_cost: i32,
    stock: i32,
    is_active: bool,
) -> Result<(), CoreError> {
    if !is_active {
        return Err(CoreError::Validation(
            "Product is not available for redemption".to_string(),
        ));
    }
    if stock <= 0 {
        return Err(CoreError::Conflict("Product is out of stock".to_string()));
    }
    if !can_afford(points, point_cost) {
        return Err(CoreError::Validation(format!(
            "Insufficient points: {points} available, {point_cost} required"
        )));
    }
    Ok(())
}

/// Apply an owner adjustment to a balance, returning the new balance.
///
/// Rejects zero or oversized deltas and any adjustment that would leave the
/// balance negative.
pub fn apply_point_adjustment(points: i32, delta: i32) -> Result<i32, CoreError> {
    if delta == 0 {
        return Err(CoreError::Validation(
            "Adjustment must be non-zero".to_string(),
        ));
    }
    if delta.unsigned_abs() > MAX_POINT_ADJUSTMENT as u32 {
        return Err(CoreError::Validation(format!(
            "Adjustment must be within +/-{MAX_POINT_ADJUSTMENT}"
        )));
    }
    let next = points
        .checked_add(delta)
        .ok_or_else(|| CoreError::Validation("Point balance overflow".to_string()))?;
    if next < 0 {
        return Err(CoreError::Validation(format!(
            "Adjustment would leave a negative balance ({next})"
        )));
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn product_validation() {
        assert!(validate_product("Hoodie", 500, 10).is_ok());
        assert!(validate_product("Sticker", 10, 0).is_ok());
        assert!(validate_product("", 500, 10).is_err());
        assert!(validate_product("Hoodie", 0, 10).is_err());
        assert!(validate_product("Hoodie", 500, -1).is_err());
    }

    #[test]
    fn redeem_disabled_when_points_below_cost() {
        assert!(!can_afford(99, 100));
        assert!(can_afford(100, 100));
        assert_matches!(
            check_redemption(99, 100, 5, true),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn out_of_stock_is_conflict() {
        assert_matches!(
            check_redemption(1000, 100, 0, true),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn inactive_product_rejected() {
        assert!(check_redemption(1000, 100, 5, false).is_err());
        assert!(check_redemption(1000, 100, 5, true).is_ok());
    }

    #[test]
    fn adjustments() {
        assert_eq!(apply_point_adjustment(100, 50).unwrap(), 150);
        assert_eq!(apply_point_adjustment(100, -100).unwrap(), 0);
        assert!(apply_point_adjustment(100, -101).is_err());
        assert!(apply_point_adjustment(100, 0).is_err());
        assert!(apply_point_adjustment(0, MAX_POINT_ADJUSTMENT + 1).is_err());
    }
}
