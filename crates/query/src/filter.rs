use scene::Field;
use serde_json::Value;

use crate::eval::{Attribute, Op, ValidFilter};

/// A structured filter as received from the query service: attribute,
/// operator, value. Untrusted until `validate` has run.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub attribute: String,
    pub operator: String,
    pub value: Field,
}

/// Why an upstream payload was rejected.
///
/// Each variant is a distinct user-visible reason. Screening runs in
/// variant order and stops at the first failure; nothing past a failed
/// check is evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterError {
    /// The service echoed geographic data back instead of a filter.
    FeatureCollectionEcho,
    /// The payload is not a JSON object.
    NotAnObject,
    /// The service reported its own failure; surfaced verbatim.
    Upstream(String),
    /// A required field is absent. `value` may be zero or empty, but not
    /// missing.
    MissingField(&'static str),
    /// The attribute does not map to a queryable field.
    UnknownAttribute(String),
}

impl std::fmt::Display for FilterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterError::FeatureCollectionEcho => {
                write!(f, "query service returned raw feature data, not a filter")
            }
            FilterError::NotAnObject => write!(f, "filter must be a JSON object"),
            FilterError::Upstream(message) => write!(f, "{message}"),
            FilterError::MissingField(name) => write!(f, "filter is missing {name}"),
            FilterError::UnknownAttribute(name) => write!(f, "unknown attribute: {name}"),
        }
    }
}

impl std::error::Error for FilterError {}

impl Filter {
    /// Screens the raw payload shape: feature-collection echoes, embedded
    /// upstream errors, and missing fields, in that order.
    pub fn from_value(value: &Value) -> Result<Self, FilterError> {
        let obj = value.as_object().ok_or(FilterError::NotAnObject)?;

        let is_echo = obj.get("type").and_then(|v| v.as_str()) == Some("FeatureCollection")
            || obj.contains_key("features");
        if is_echo {
            return Err(FilterError::FeatureCollectionEcho);
        }

        if let Some(err) = obj.get("error") {
            let message = match err.as_str() {
                Some(s) => s.to_string(),
                None => err.to_string(),
            };
            return Err(FilterError::Upstream(message));
        }

        let attribute = obj
            .get("attribute")
            .and_then(|v| v.as_str())
            .ok_or(FilterError::MissingField("attribute"))?
            .to_string();
        let operator = obj
            .get("operator")
            .and_then(|v| v.as_str())
            .ok_or(FilterError::MissingField("operator"))?
            .to_string();
        let value = match obj.get("value") {
            Some(Value::Number(n)) => n.as_f64().map(Field::Number),
            Some(Value::String(s)) => Some(Field::text(s.clone())),
            _ => None,
        }
        .ok_or(FilterError::MissingField("value"))?;

        Ok(Self {
            attribute,
            operator,
            value,
        })
    }

    /// Resolves the attribute through the fixed lookup and applies the
    /// zoning coercion: a digit-only zoning value supplied as text becomes
    /// an integer before comparison.
    pub fn validate(self) -> Result<ValidFilter, FilterError> {
        let Some(attribute) = Attribute::lookup(&self.attribute) else {
            return Err(FilterError::UnknownAttribute(self.attribute));
        };

        let mut value = self.value;
        if attribute == Attribute::Zoning
            && let Field::Text(s) = &value
            && is_digits(s)
            && let Ok(n) = s.parse::<f64>()
        {
            value = Field::Number(n);
        }

        Ok(ValidFilter {
            attribute,
            op: Op::parse(&self.operator),
            value,
        })
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::{Filter, FilterError};
    use crate::eval::{Attribute, Op};
    use pretty_assertions::assert_eq;
    use scene::Field;
    use serde_json::json;

    #[test]
    fn rejects_a_feature_collection_echo() {
        let echo = json!({ "type": "FeatureCollection", "features": [] });
        assert_eq!(
            Filter::from_value(&echo).unwrap_err(),
            FilterError::FeatureCollectionEcho
        );

        // A bare features array is still an echo even without the type tag.
        let echo = json!({ "features": [] });
        assert_eq!(
            Filter::from_value(&echo).unwrap_err(),
            FilterError::FeatureCollectionEcho
        );
    }

    #[test]
    fn rejects_non_object_payloads() {
        assert_eq!(
            Filter::from_value(&json!([1, 2])).unwrap_err(),
            FilterError::NotAnObject
        );
    }

    #[test]
    fn surfaces_upstream_errors_verbatim() {
        let payload = json!({ "error": "model unavailable" });
        assert_eq!(
            Filter::from_value(&payload).unwrap_err(),
            FilterError::Upstream("model unavailable".to_string())
        );
    }

    #[test]
    fn rejects_missing_fields() {
        let payload = json!({ "attribute": "height", "operator": ">" });
        assert_eq!(
            Filter::from_value(&payload).unwrap_err(),
            FilterError::MissingField("value")
        );

        let payload = json!({ "operator": ">", "value": 10 });
        assert_eq!(
            Filter::from_value(&payload).unwrap_err(),
            FilterError::MissingField("attribute")
        );
    }

    #[test]
    fn zero_and_empty_values_are_present() {
        let payload = json!({ "attribute": "area", "operator": ">", "value": 0 });
        assert_eq!(
            Filter::from_value(&payload).unwrap().value,
            Field::Number(0.0)
        );

        let payload = json!({ "attribute": "zoning", "operator": "==", "value": "" });
        assert_eq!(Filter::from_value(&payload).unwrap().value, Field::text(""));
    }

    #[test]
    fn rejects_unknown_attributes() {
        let payload = json!({ "attribute": "footprint", "operator": ">", "value": 10 });
        let filter = Filter::from_value(&payload).unwrap();
        assert_eq!(
            filter.validate().unwrap_err(),
            FilterError::UnknownAttribute("footprint".to_string())
        );
    }

    #[test]
    fn maps_attributes_through_the_fixed_lookup() {
        for (name, expected) in [
            ("zoning", Attribute::Zoning),
            ("height", Attribute::Height),
            ("area", Attribute::Area),
            ("value", Attribute::Value),
        ] {
            let payload = json!({ "attribute": name, "operator": ">", "value": 1 });
            let valid = Filter::from_value(&payload).unwrap().validate().unwrap();
            assert_eq!(valid.attribute, expected);
        }
    }

    #[test]
    fn digit_zoning_text_coerces_to_a_number() {
        let payload = json!({ "attribute": "zoning", "operator": "==", "value": "12" });
        let valid = Filter::from_value(&payload).unwrap().validate().unwrap();
        assert_eq!(valid.value, Field::Number(12.0));

        // Non-digit zoning text stays text.
        let payload = json!({ "attribute": "zoning", "operator": "==", "value": "RC-G" });
        let valid = Filter::from_value(&payload).unwrap().validate().unwrap();
        assert_eq!(valid.value, Field::text("RC-G"));

        // Digit text under a non-zoning attribute stays text.
        let payload = json!({ "attribute": "height", "operator": ">", "value": "15" });
        let valid = Filter::from_value(&payload).unwrap().validate().unwrap();
        assert_eq!(valid.value, Field::text("15"));
    }

    #[test]
    fn unrecognized_operators_validate_as_unsupported() {
        let payload = json!({ "attribute": "height", "operator": "~=", "value": 10 });
        let valid = Filter::from_value(&payload).unwrap().validate().unwrap();
        assert_eq!(valid.op, Op::Unsupported("~=".to_string()));
    }
}
