//! # Validation Module
//!
//! Business rule validation for products, quantities and discount rules.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Commerce API payloads (pantry-client)                         │
//! │  ├── Deserialization (types, decimal → cents)                           │
//! │  └── validate_product() on every fetched product                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Storefront commands                                           │
//! │  └── validate_quantity() before editing a line                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Cart (pantry-core)                                            │
//! │  └── Forgiving: bad input becomes a no-op, never an error               │
//! │                                                                         │
//! │  Configuration: validate_discount_code() + validate_discount_bps()      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pantry_core::validation::{validate_discount_code, validate_quantity};
//!
//! assert!(validate_quantity(5).is_ok());
//! assert_eq!(validate_discount_code(" happyhours ").unwrap(), "HAPPYHOURS");
//! ```

use crate::discount::normalize_code;
use crate::error::ValidationError;
use crate::types::Product;
use crate::{MAX_LINE_QUANTITY, MIN_LINE_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted discount code.
const MAX_DISCOUNT_CODE_LEN: usize = 32;

// =============================================================================
// Product Validators
// =============================================================================

/// Validates a catalog product id.
///
/// ## Rules
/// - Must not be empty or whitespace
/// - At most 64 characters
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::Required {
            field: "product id".to_string(),
        });
    }

    if id.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "product id".to_string(),
            max: 64,
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ```rust
/// use pantry_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Waffle with Berries").is_ok());
/// assert!(validate_product_name("").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is allowed.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a product fetched from the commerce API or a snapshot.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_product_id(&product.id)?;
    validate_product_name(&product.name)?;
    validate_price_cents(product.price_cents)
}

// =============================================================================
// Quantity Validators
// =============================================================================

/// Validates a quantity entered in the quantity editor.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed `MAX_LINE_QUANTITY` (99)
///
/// ## User Workflow
/// ```text
/// Shopper types 120 in the quantity box
///      │
///      ▼
/// validate_quantity(120) ← THIS FUNCTION
///      │
///      ├── qty <= 0?  → Error: "quantity must be positive"
///      ├── qty > 99?  → Error: "quantity must be between 1 and 99"
///      └── OK         → cart.update_quantity()
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty < MIN_LINE_QUANTITY {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: MIN_LINE_QUANTITY,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Discount Rule Validators
// =============================================================================

/// Validates a discount code and returns it normalized.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 32 characters
/// - Letters, digits, hyphens and underscores only
///
/// ```rust
/// use pantry_core::validation::validate_discount_code;
///
/// assert_eq!(validate_discount_code("buygetone").unwrap(), "BUYGETONE");
/// assert!(validate_discount_code("two words").is_err());
/// ```
pub fn validate_discount_code(code: &str) -> ValidationResult<String> {
    let code = normalize_code(code);

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "discount code".to_string(),
        });
    }

    if code.len() > MAX_DISCOUNT_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "discount code".to_string(),
            max: MAX_DISCOUNT_CODE_LEN,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "discount code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(code)
}

/// Validates a percentage discount in basis points (0 to 10000).
pub fn validate_discount_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "discount bps".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductImage;

    #[test]
    fn test_validate_product_id() {
        assert!(validate_product_id("1").is_ok());
        assert!(validate_product_id("").is_err());
        assert!(validate_product_id("   ").is_err());
        assert!(validate_product_id(&"9".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_product() {
        let mut product = Product {
            id: "3".to_string(),
            name: "Macaron Mix of Five".to_string(),
            category: "Macaron".to_string(),
            price_cents: 800,
            image: ProductImage::default(),
        };
        assert!(validate_product(&product).is_ok());

        product.price_cents = -1;
        assert!(validate_product(&product).is_err());

        product.price_cents = 0;
        product.name = " ".to_string();
        assert!(validate_product(&product).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(99).is_ok());

        assert!(matches!(
            validate_quantity(0),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(validate_quantity(-1).is_err());
        assert!(matches!(
            validate_quantity(100),
            Err(ValidationError::OutOfRange { max: 99, .. })
        ));
    }

    #[test]
    fn test_validate_discount_code() {
        assert_eq!(validate_discount_code("HAPPYHOURS").unwrap(), "HAPPYHOURS");
        assert_eq!(validate_discount_code(" spring_10 ").unwrap(), "SPRING_10");

        assert!(validate_discount_code("").is_err());
        assert!(validate_discount_code("   ").is_err());
        assert!(validate_discount_code("10% OFF").is_err());
        assert!(validate_discount_code(&"A".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_discount_bps() {
        assert!(validate_discount_bps(0).is_ok());
        assert!(validate_discount_bps(1800).is_ok());
        assert!(validate_discount_bps(10000).is_ok());
        assert!(validate_discount_bps(10001).is_err());
    }
}
