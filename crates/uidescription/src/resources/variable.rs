//! Variable catalog entries.
//!
//! A variable holds either a number or a string. Without an explicit `type` the kind is
//! inferred from whether the whole value parses as a number.

use crate::attributes::parse_double;
use crate::node::{DescriptionNode, NodeKind};

/// Interpretation of a variable's value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VariableValue {
    /// Numeric variable; unparseable text reads as zero.
    Number(f64),
    /// String variable; numeric reads evaluate the text as an expression.
    String,
    /// Neither a declared type nor a value to infer one from.
    Unknown,
}

impl DescriptionNode {
    /// Raw value text; empty when the attribute is missing.
    #[inline]
    pub fn variable_string(&self) -> &str {
        self.attributes.get("value").unwrap_or_default()
    }

    pub fn variable_value(&self) -> Option<VariableValue> {
        if !matches!(self.kind, NodeKind::Variable) {
            return None;
        }
        let text = self.attributes.get("value");
        let value = match (self.attributes.get("type"), text) {
            (Some("number"), _) => {
                VariableValue::Number(text.and_then(parse_double).unwrap_or(0.0))
            }
            (Some("string"), _) => VariableValue::String,
            (_, Some(raw)) => {
                parse_double(raw).map_or(VariableValue::String, VariableValue::Number)
            }
            (_, None) => VariableValue::Unknown,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::VariableValue;
    use crate::attributes::AttributeMap;
    use crate::resources::Catalog;

    fn variable(pairs: &[(&str, &str)]) -> Option<VariableValue> {
        Catalog::Variables
            .new_entry(AttributeMap::from_pairs(pairs.iter().copied()))
            .variable_value()
    }

    #[test]
    fn type_is_detected_from_value() {
        assert_eq!(variable(&[("value", "20.5")]), Some(VariableValue::Number(20.5)));
        assert_eq!(variable(&[("value", "string")]), Some(VariableValue::String));
        assert_eq!(variable(&[]), Some(VariableValue::Unknown));
    }

    #[test]
    fn explicit_type_wins() {
        assert_eq!(
            variable(&[("type", "number"), ("value", "abc")]),
            Some(VariableValue::Number(0.0))
        );
        assert_eq!(
            variable(&[("type", "string"), ("value", "10")]),
            Some(VariableValue::String)
        );
        assert_eq!(
            variable(&[("type", "list"), ("value", "3")]),
            Some(VariableValue::Number(3.0))
        );
        assert_eq!(variable(&[("type", "list")]), Some(VariableValue::Unknown));
    }
}
