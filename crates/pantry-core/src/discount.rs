//! # Discount Module
//!
//! The pricing engine: turns a subtotal, an optional discount code and the
//! cart lines into a [`DiscountResult`].
//!
//! ## Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Discount Code Evaluation                           │
//! │                                                                         │
//! │  code ──► trim + uppercase ──► lookup in rule set                       │
//! │                                     │                                   │
//! │        ┌────────────────────────────┼───────────────────────┐           │
//! │        ▼                            ▼                       ▼           │
//! │  Percentage { bps }         CheapestLineFree            (unknown)       │
//! │  HAPPYHOURS = 1800          BUYGETONE                   no discount     │
//! │        │                            │                   kind: None      │
//! │        ▼                            ▼                                   │
//! │  subtotal × bps,            cheapest (price × qty)                      │
//! │  rounded to the cent        line is free; first                         │
//! │  kind: PERCENTAGE           minimum wins ties                           │
//! │                             kind: FREE_ITEM                             │
//! │                             (no lines → no discount)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Purity
//! Every function here is deterministic. Unknown codes never error; telling
//! the shopper a code is invalid is the cart's job.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::CartLine;
use crate::validation::{validate_discount_bps, validate_discount_code, ValidationResult};
use crate::{BUYGETONE_CODE, HAPPYHOURS_CODE, HAPPYHOURS_DISCOUNT_BPS};

// =============================================================================
// Discount Kind & Result
// =============================================================================

/// The kind of discount a code produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum DiscountKind {
    /// A fraction of the subtotal.
    Percentage,
    /// The cheapest line's full cost.
    FreeItem,
}

/// Outcome of pricing a cart. Derived on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DiscountResult {
    /// Amount taken off the subtotal (>= 0).
    pub discount_amount: Money,
    /// Subtotal minus discount (>= 0).
    pub final_total: Money,
    /// `None` when no discount applies.
    pub kind: Option<DiscountKind>,
}

impl DiscountResult {
    /// No discount: the total is the subtotal.
    pub fn none(subtotal: Money) -> Self {
        DiscountResult {
            discount_amount: Money::zero(),
            final_total: subtotal,
            kind: None,
        }
    }

    /// Applies `discount` to `subtotal`, keeping both figures non-negative.
    fn applied(subtotal: Money, discount: Money, kind: DiscountKind) -> Self {
        let discount = discount.non_negative().min(subtotal.non_negative());
        DiscountResult {
            discount_amount: discount,
            final_total: (subtotal - discount).non_negative(),
            kind: Some(kind),
        }
    }

    /// True when money was actually taken off.
    pub fn has_discount(&self) -> bool {
        self.discount_amount.is_positive()
    }
}

// =============================================================================
// Discount Rule
// =============================================================================

/// A pricing rule unlocked by a discount code.
///
/// ## Config Representation
/// ```toml
/// [[discounts]]
/// code = "HAPPYHOURS"
/// kind = "percentage"
/// bps = 1800
///
/// [[discounts]]
/// code = "BUYGETONE"
/// kind = "cheapest_line_free"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum DiscountRule {
    /// Take `bps` basis points off the subtotal.
    Percentage { bps: u32 },
    /// The line with the smallest `price × quantity` is free.
    CheapestLineFree,
}

impl DiscountRule {
    /// The kind of discount this rule produces.
    pub fn kind(&self) -> DiscountKind {
        match self {
            DiscountRule::Percentage { .. } => DiscountKind::Percentage,
            DiscountRule::CheapestLineFree => DiscountKind::FreeItem,
        }
    }

    /// Prices `subtotal` under this rule.
    pub fn apply(&self, subtotal: Money, lines: &[CartLine]) -> DiscountResult {
        match self {
            DiscountRule::Percentage { bps } => {
                DiscountResult::applied(subtotal, subtotal.percentage(*bps), self.kind())
            }
            DiscountRule::CheapestLineFree => match cheapest_line_total(lines) {
                Some(free) => DiscountResult::applied(subtotal, free, self.kind()),
                None => DiscountResult::none(subtotal),
            },
        }
    }

    /// Checks the rule's parameters.
    pub fn validate(&self) -> ValidationResult<()> {
        match self {
            DiscountRule::Percentage { bps } => validate_discount_bps(*bps),
            DiscountRule::CheapestLineFree => Ok(()),
        }
    }
}

/// Smallest line total; the first minimal line wins ties.
fn cheapest_line_total(lines: &[CartLine]) -> Option<Money> {
    lines.iter().map(CartLine::line_total).fold(None, |cheapest, total| match cheapest {
        Some(current) if current <= total => Some(current),
        _ => Some(total),
    })
}

// =============================================================================
// Code Normalization
// =============================================================================

/// Normalizes a discount code: trims whitespace and uppercases.
///
/// ```rust
/// use pantry_core::discount::normalize_code;
///
/// assert_eq!(normalize_code("  happyHours "), "HAPPYHOURS");
/// ```
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// The built-in rule for a normalized code.
fn standard_rule(code: &str) -> Option<DiscountRule> {
    match code {
        HAPPYHOURS_CODE => Some(DiscountRule::Percentage {
            bps: HAPPYHOURS_DISCOUNT_BPS,
        }),
        BUYGETONE_CODE => Some(DiscountRule::CheapestLineFree),
        _ => None,
    }
}

// =============================================================================
// Pricing Engine
// =============================================================================

/// Prices a cart under the built-in codes (`HAPPYHOURS`, `BUYGETONE`).
///
/// ## Example
/// ```rust
/// use pantry_core::discount::calculate_discount;
/// use pantry_core::money::Money;
///
/// let subtotal = Money::from_cents(1300);
///
/// let none = calculate_discount(subtotal, None, &[]);
/// assert_eq!(none.final_total, subtotal);
///
/// let unknown = calculate_discount(subtotal, Some("bogus"), &[]);
/// assert_eq!(unknown.discount_amount, Money::zero());
/// ```
pub fn calculate_discount(
    subtotal: Money,
    code: Option<&str>,
    lines: &[CartLine],
) -> DiscountResult {
    let code = match code.map(normalize_code) {
        Some(code) if !code.is_empty() => code,
        _ => return DiscountResult::none(subtotal),
    };

    match standard_rule(&code) {
        Some(rule) => rule.apply(subtotal, lines),
        None => DiscountResult::none(subtotal),
    }
}

// =============================================================================
// Configurable Rule Set
// =============================================================================

/// The set of discount codes a storefront accepts.
///
/// Keys are normalized codes. `Default` is the built-in pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountRules {
    rules: BTreeMap<String, DiscountRule>,
}

impl DiscountRules {
    /// The built-in codes: `HAPPYHOURS` (18% off) and `BUYGETONE`.
    pub fn standard() -> Self {
        let rules = [HAPPYHOURS_CODE, BUYGETONE_CODE]
            .into_iter()
            .filter_map(|code| standard_rule(code).map(|rule| (code.to_string(), rule)))
            .collect();
        DiscountRules { rules }
    }

    /// A rule set that accepts no codes.
    pub fn empty() -> Self {
        DiscountRules {
            rules: BTreeMap::new(),
        }
    }

    /// Builds a rule set from `(code, rule)` pairs.
    ///
    /// ## Errors
    /// Malformed codes, invalid rule parameters, or a code listed twice.
    pub fn from_entries<I, S>(entries: I) -> ValidationResult<Self>
    where
        I: IntoIterator<Item = (S, DiscountRule)>,
        S: AsRef<str>,
    {
        let mut rules = DiscountRules::empty();
        for (code, rule) in entries {
            rules.add_rule(code.as_ref(), rule)?;
        }
        Ok(rules)
    }

    /// Adds a code. Rejects duplicates rather than silently replacing.
    pub fn add_rule(&mut self, code: &str, rule: DiscountRule) -> ValidationResult<()> {
        let code = validate_discount_code(code)?;
        rule.validate()?;

        if self.rules.contains_key(&code) {
            return Err(ValidationError::Duplicate {
                field: "discount code".to_string(),
                value: code,
            });
        }

        self.rules.insert(code, rule);
        Ok(())
    }

    /// Looks up the rule for a code (normalized first).
    pub fn get(&self, code: &str) -> Option<&DiscountRule> {
        self.rules.get(&normalize_code(code))
    }

    /// True if the code unlocks a rule.
    pub fn is_known(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// Known codes in sorted order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Prices a cart under this rule set. Same contract as
    /// [`calculate_discount`], with the configured codes.
    pub fn calculate(
        &self,
        subtotal: Money,
        code: Option<&str>,
        lines: &[CartLine],
    ) -> DiscountResult {
        match code.and_then(|c| self.get(c)) {
            Some(rule) => rule.apply(subtotal, lines),
            None => DiscountResult::none(subtotal),
        }
    }
}

impl Default for DiscountRules {
    fn default() -> Self {
        DiscountRules::standard()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Product, ProductImage};

    fn product(id: &str, price_cents: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            category: "Dessert".to_string(),
            price_cents,
            image: ProductImage::default(),
        }
    }

    fn line(id: &str, price_cents: i64, quantity: i64) -> CartLine {
        CartLine::new(&product(id, price_cents), quantity)
    }

    fn subtotal(lines: &[CartLine]) -> Money {
        lines.iter().map(CartLine::line_total).sum()
    }

    /// [$5.00 × 2, $3.00 × 1]
    fn sample_lines() -> Vec<CartLine> {
        vec![line("1", 500, 2), line("2", 300, 1)]
    }

    #[test]
    fn test_no_code() {
        let lines = sample_lines();
        let result = calculate_discount(subtotal(&lines), None, &lines);
        assert_eq!(result, DiscountResult::none(Money::from_cents(1300)));
        assert!(!result.has_discount());
    }

    #[test]
    fn test_empty_and_whitespace_codes() {
        let lines = sample_lines();
        for code in ["", "   ", "\t\n"] {
            let result = calculate_discount(subtotal(&lines), Some(code), &lines);
            assert_eq!(result.discount_amount, Money::zero());
            assert_eq!(result.final_total.cents(), 1300);
            assert_eq!(result.kind, None);
        }
    }

    #[test]
    fn test_happyhours_scenario() {
        let lines = sample_lines();
        let result = calculate_discount(subtotal(&lines), Some("HAPPYHOURS"), &lines);

        assert_eq!(result.discount_amount.cents(), 234);
        assert_eq!(result.final_total.cents(), 1066);
        assert_eq!(result.kind, Some(DiscountKind::Percentage));
    }

    #[test]
    fn test_happyhours_is_case_and_space_insensitive() {
        let lines = sample_lines();
        let result = calculate_discount(subtotal(&lines), Some("  happyHours "), &lines);
        assert_eq!(result.discount_amount.cents(), 234);
    }

    #[test]
    fn test_happyhours_rounds_to_the_cent() {
        // $0.25 × 18% = 4.5¢ → 5¢
        let lines = vec![line("1", 25, 1)];
        let result = calculate_discount(subtotal(&lines), Some("HAPPYHOURS"), &lines);
        assert_eq!(result.discount_amount.cents(), 5);
        assert_eq!(result.final_total.cents(), 20);
    }

    #[test]
    fn test_happyhours_holds_for_many_subtotals() {
        for cents in [0, 1, 99, 100, 650, 1300, 12_345, 999_999] {
            let result = calculate_discount(Money::from_cents(cents), Some("HAPPYHOURS"), &[]);
            let expected = (cents * 1800 + 5000) / 10000;
            assert_eq!(result.discount_amount.cents(), expected, "subtotal {}", cents);
            assert_eq!(result.final_total.cents(), cents - expected);
        }
    }

    #[test]
    fn test_buygetone_scenario() {
        let lines = sample_lines();
        let result = calculate_discount(subtotal(&lines), Some("BUYGETONE"), &lines);

        // min($10.00, $3.00) = $3.00
        assert_eq!(result.discount_amount.cents(), 300);
        assert_eq!(result.final_total.cents(), 1000);
        assert_eq!(result.kind, Some(DiscountKind::FreeItem));
    }

    #[test]
    fn test_buygetone_discounts_whole_line_not_one_unit() {
        // [$2.00 × 3 = $6.00, $7.00 × 1 = $7.00] → $6.00 off
        let lines = vec![line("1", 200, 3), line("2", 700, 1)];
        let result = calculate_discount(subtotal(&lines), Some("buygetone"), &lines);
        assert_eq!(result.discount_amount.cents(), 600);
        assert_eq!(result.final_total.cents(), 700);
    }

    #[test]
    fn test_buygetone_empty_cart() {
        let result = calculate_discount(Money::zero(), Some("BUYGETONE"), &[]);
        assert_eq!(result.discount_amount, Money::zero());
        assert_eq!(result.final_total, Money::zero());
        assert_eq!(result.kind, None);
    }

    #[test]
    fn test_buygetone_single_line_is_free() {
        let lines = vec![line("1", 450, 2)];
        let result = calculate_discount(subtotal(&lines), Some("BUYGETONE"), &lines);
        assert_eq!(result.discount_amount.cents(), 900);
        assert_eq!(result.final_total, Money::zero());
    }

    #[test]
    fn test_cheapest_line_tie_takes_first() {
        let lines = vec![line("a", 300, 2), line("b", 600, 1), line("c", 200, 3)];
        // all three lines total $6.00; the first one is picked
        assert_eq!(cheapest_line_total(&lines), Some(Money::from_cents(600)));
        assert_eq!(cheapest_line_total(&[]), None);
    }

    #[test]
    fn test_unknown_code() {
        let lines = sample_lines();
        for code in ["bogus", "HAPPYHOUR", "BUY GET ONE"] {
            let result = calculate_discount(subtotal(&lines), Some(code), &lines);
            assert_eq!(result, DiscountResult::none(Money::from_cents(1300)));
        }
    }

    #[test]
    fn test_idempotent() {
        let lines = sample_lines();
        let first = calculate_discount(subtotal(&lines), Some("BUYGETONE"), &lines);
        let second = calculate_discount(subtotal(&lines), Some("BUYGETONE"), &lines);
        assert_eq!(first, second);
    }

    #[test]
    fn test_standard_rules_match_free_function() {
        let rules = DiscountRules::standard();
        let lines = sample_lines();
        for code in [None, Some(""), Some("happyhours"), Some("BUYGETONE"), Some("nope")] {
            assert_eq!(
                rules.calculate(subtotal(&lines), code, &lines),
                calculate_discount(subtotal(&lines), code, &lines),
                "code {:?}",
                code
            );
        }
    }

    #[test]
    fn test_custom_rules() {
        let rules = DiscountRules::from_entries([
            ("welcome10", DiscountRule::Percentage { bps: 1000 }),
            ("FREEBIE", DiscountRule::CheapestLineFree),
        ])
        .unwrap();

        assert_eq!(rules.len(), 2);
        assert!(rules.is_known("WELCOME10"));
        assert!(!rules.is_known("HAPPYHOURS"));
        assert_eq!(rules.codes().collect::<Vec<_>>(), vec!["FREEBIE", "WELCOME10"]);

        let lines = sample_lines();
        let result = rules.calculate(subtotal(&lines), Some("Welcome10"), &lines);
        assert_eq!(result.discount_amount.cents(), 130);
    }

    #[test]
    fn test_rules_reject_bad_entries() {
        let mut rules = DiscountRules::standard();
        assert!(rules.add_rule("happyhours", DiscountRule::CheapestLineFree).is_err());
        assert!(rules.add_rule("", DiscountRule::CheapestLineFree).is_err());
        assert!(rules
            .add_rule("TOOMUCH", DiscountRule::Percentage { bps: 10_001 })
            .is_err());
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn test_rule_serde_shape() {
        let rule: DiscountRule = serde_json::from_str(r#"{"kind": "percentage", "bps": 1800}"#).unwrap();
        assert_eq!(rule, DiscountRule::Percentage { bps: 1800 });

        let rule: DiscountRule = serde_json::from_str(r#"{"kind": "cheapest_line_free"}"#).unwrap();
        assert_eq!(rule, DiscountRule::CheapestLineFree);

        let kind = serde_json::to_value(DiscountKind::FreeItem).unwrap();
        assert_eq!(kind, "FREE_ITEM");
    }
}
