//! Currency and attunement.

use std::collections::BTreeMap;

use charsheet_domain::rules::parse_deltas;
use charsheet_domain::{Denomination, DomainError, SignedAmount};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{validate_signed_amount, CharacterRequest};

/// `{pp?, gp?, ep?, sp?, cp?}`, each a signed amount string. Unknown keys
/// are kept so they can be rejected against their own field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ApplyCurrencyRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_signed_amount"))]
    pub pp: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_signed_amount"))]
    pub gp: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_signed_amount"))]
    pub ep: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_signed_amount"))]
    pub sp: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_signed_amount"))]
    pub cp: Option<String>,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, serde_json::Value>,
}

impl ApplyCurrencyRequest {
    fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        [
            ("pp", &self.pp),
            ("gp", &self.gp),
            ("ep", &self.ep),
            ("sp", &self.sp),
            ("cp", &self.cp),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
    }
}

impl CharacterRequest for ApplyCurrencyRequest {
    type Input = Vec<(Denomination, SignedAmount)>;

    fn into_input(self) -> Result<Self::Input, DomainError> {
        if let Some(key) = self.unknown.keys().next() {
            return Err(DomainError::invalid_field(
                key.as_str(),
                "unknown currency denomination",
            ));
        }
        parse_deltas(self.fields())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SetAttunementRequest {
    pub is_attuned: bool,
}

impl CharacterRequest for SetAttunementRequest {
    type Input = bool;

    fn into_input(self) -> Result<bool, DomainError> {
        Ok(self.is_attuned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn present_fields_become_deltas() {
        let request: ApplyCurrencyRequest =
            serde_json::from_value(json!({"gp": "+10", "sp": "-50"})).unwrap();
        request.validate().unwrap();
        let deltas = request.into_input().unwrap();
        assert_eq!(
            deltas,
            vec![
                (Denomination::Gp, SignedAmount::Add(10)),
                (Denomination::Sp, SignedAmount::Subtract(50)),
            ]
        );
    }

    #[test]
    fn oversized_magnitude_fails_on_its_field() {
        let request: ApplyCurrencyRequest =
            serde_json::from_value(json!({"cp": "-1234567890"})).unwrap();
        let errors = request.validate().unwrap_err();
        let field_errors = errors.field_errors();
        assert!(field_errors.contains_key("cp"));
        assert_eq!(field_errors.len(), 1);
    }

    #[test]
    fn unknown_currency_key_is_rejected_on_its_field() {
        let request: ApplyCurrencyRequest =
            serde_json::from_value(json!({"gp": "+1", "xp": "+1"})).unwrap();
        request.validate().unwrap();
        let err = request.into_input().unwrap_err();
        assert_eq!(err.field(), Some("xp"));
    }

    #[test]
    fn empty_body_has_no_deltas() {
        let request = ApplyCurrencyRequest::default();
        request.validate().unwrap();
        assert!(request.into_input().unwrap().is_empty());
    }
}
