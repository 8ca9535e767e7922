//! Input validation for category amounts and goals.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;

use super::ledger_model::AssetCategory;
use crate::errors::ValidationError;

/// A validated field: `None` means the user left it blank.
pub type ValidatedAmount = Option<Decimal>;

/// Validates a raw category input.
///
/// A leading minus sign is rejected. Everything that is not a digit or a
/// decimal point is then stripped, so `"12a3.5"` reads as `123.5` and
/// `"1,000"` as `1000`. An empty result means "no value supplied".
pub fn validate_category_input(raw: &str) -> Result<ValidatedAmount, ValidationError> {
    if raw.trim_start().starts_with('-') {
        return Err(ValidationError::NegativeValue);
    }

    let sanitized: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if sanitized.is_empty() {
        return Ok(None);
    }

    let value = Decimal::from_str(&sanitized)
        .map_err(|_| ValidationError::InvalidNumber(sanitized.clone()))?;

    Ok(Some(value.normalize()))
}

/// Validates a raw goal input. Goals follow the same sanitizing rule but
/// must be supplied and strictly positive.
pub fn validate_goal_input(raw: &str) -> Result<Decimal, ValidationError> {
    match validate_category_input(raw)? {
        Some(goal) if goal > Decimal::ZERO => Ok(goal),
        Some(_) => Err(ValidationError::NonPositiveGoal),
        None => Err(ValidationError::MissingField("goal".to_string())),
    }
}

/// Per-field state of the "add data" form.
///
/// Each field holds either a validated amount (possibly blank) or the error
/// produced by its last edit. A form with any error cannot be committed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotForm {
    fields: BTreeMap<AssetCategory, Result<ValidatedAmount, ValidationError>>,
}

impl SnapshotForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a form from already-valid amounts.
    pub fn from_amounts<I>(amounts: I) -> Self
    where
        I: IntoIterator<Item = (AssetCategory, Decimal)>,
    {
        let fields = amounts
            .into_iter()
            .map(|(category, value)| (category, Ok(Some(value))))
            .collect();
        Self { fields }
    }

    /// Records a raw edit and returns the field's validation outcome.
    pub fn set_field(
        &mut self,
        category: AssetCategory,
        raw: &str,
    ) -> Result<ValidatedAmount, ValidationError> {
        let outcome = validate_category_input(raw);
        self.fields.insert(category, outcome.clone());
        outcome
    }

    /// Clears a field back to "omitted".
    pub fn clear_field(&mut self, category: AssetCategory) {
        self.fields.remove(&category);
    }

    pub fn field_error(&self, category: AssetCategory) -> Option<&ValidationError> {
        self.fields.get(&category).and_then(|f| f.as_ref().err())
    }

    pub fn has_errors(&self) -> bool {
        self.fields.values().any(|f| f.is_err())
    }

    pub fn field_errors(&self) -> BTreeMap<AssetCategory, ValidationError> {
        self.fields
            .iter()
            .filter_map(|(category, f)| f.as_ref().err().map(|e| (*category, e.clone())))
            .collect()
    }

    /// Supplied amounts, or `ValidationFailed` listing every invalid field.
    pub fn amounts(&self) -> Result<BTreeMap<AssetCategory, Decimal>, ValidationError> {
        if self.has_errors() {
            return Err(ValidationError::ValidationFailed {
                fields: self.field_errors(),
            });
        }

        Ok(self
            .fields
            .iter()
            .filter_map(|(category, f)| match f {
                Ok(Some(value)) => Some((*category, *value)),
                _ => None,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn plain_numbers_parse() {
        assert_eq!(validate_category_input("1000").unwrap(), Some(dec!(1000)));
        assert_eq!(validate_category_input("0.25").unwrap(), Some(dec!(0.25)));
        assert_eq!(validate_category_input("0").unwrap(), Some(dec!(0)));
    }

    #[test]
    fn stray_characters_are_stripped() {
        assert_eq!(validate_category_input("12a3.5").unwrap(), Some(dec!(123.5)));
        assert_eq!(validate_category_input("1,000").unwrap(), Some(dec!(1000)));
        assert_eq!(validate_category_input(" 42 ").unwrap(), Some(dec!(42)));
    }

    #[test]
    fn blank_input_is_omitted_not_zero() {
        assert_eq!(validate_category_input("").unwrap(), None);
        assert_eq!(validate_category_input("abc").unwrap(), None);
    }

    #[test]
    fn negative_input_is_rejected() {
        assert_eq!(
            validate_category_input("-50"),
            Err(ValidationError::NegativeValue)
        );
        assert_eq!(
            validate_category_input("  -0.5"),
            Err(ValidationError::NegativeValue)
        );
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        assert!(matches!(
            validate_category_input("1.2.3"),
            Err(ValidationError::InvalidNumber(s)) if s == "1.2.3"
        ));
    }

    #[test]
    fn goal_must_be_positive() {
        assert_eq!(validate_goal_input("2000").unwrap(), dec!(2000));
        assert_eq!(validate_goal_input("0"), Err(ValidationError::NonPositiveGoal));
        assert_eq!(
            validate_goal_input("-5"),
            Err(ValidationError::NegativeValue)
        );
        assert!(matches!(
            validate_goal_input(""),
            Err(ValidationError::MissingField(_))
        ));
    }

    #[test]
    fn form_tracks_errors_per_field() {
        let mut form = SnapshotForm::new();
        form.set_field(AssetCategory::Stocks, "1000").unwrap();
        assert!(form.set_field(AssetCategory::Crypto, "-1").is_err());

        assert!(form.has_errors());
        assert_eq!(
            form.field_error(AssetCategory::Crypto),
            Some(&ValidationError::NegativeValue)
        );
        assert!(form.field_error(AssetCategory::Stocks).is_none());

        match form.amounts() {
            Err(ValidationError::ValidationFailed { fields }) => {
                assert_eq!(fields.len(), 1);
                assert!(fields.contains_key(&AssetCategory::Crypto));
            }
            other => panic!("expected ValidationFailed, got {:?}", other),
        }

        // Fixing the field clears the error.
        form.set_field(AssetCategory::Crypto, "5").unwrap();
        assert!(!form.has_errors());
        let amounts = form.amounts().unwrap();
        assert_eq!(amounts.get(&AssetCategory::Crypto), Some(&dec!(5)));
    }

    #[test]
    fn blank_fields_are_not_reported_as_amounts() {
        let mut form = SnapshotForm::new();
        form.set_field(AssetCategory::Savings, "").unwrap();
        assert!(form.amounts().unwrap().is_empty());
    }
}
