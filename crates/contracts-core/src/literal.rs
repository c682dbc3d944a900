//! # Literal Values
//!
//! Fixed values read from schema text: `const`, `default` and `enum`
//! members. Numbers with a fractional part or exponent are held as
//! [`Decimal`], so a literal such as `0.1234567890` keeps every digit
//! between the schema file and the generated source.
//!
//! The workspace enables `serde_json/arbitrary_precision`, which keeps the
//! original digits of a JSON number available through `Number::to_string`.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Number, Value};

/// A fixed literal taken from a schema document.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// JSON `null`.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// A number with no fractional part that fits in `i64`.
    Integer(i64),
    /// Any other number, kept exact.
    Decimal(Decimal),
    /// JSON string.
    String(String),
    /// JSON array of literals.
    List(Vec<Literal>),
}

impl Literal {
    /// Convert a JSON value into a literal.
    ///
    /// Objects are not literals in the schema model and are rejected, as
    /// are numbers outside the range `Decimal` can hold.
    pub fn from_json(value: &Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(Self::Null),
            Value::Bool(b) => Ok(Self::Bool(*b)),
            Value::Number(n) => number_literal(n),
            Value::String(s) => Ok(Self::String(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(Self::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::List),
            Value::Object(_) => Err("object literals are not supported".to_string()),
        }
    }

    /// Render the literal back to JSON without losing decimal digits.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Integer(i) => Value::Number(Number::from(*i)),
            Self::Decimal(d) => {
                serde_json::from_str(&d.to_string()).unwrap_or_else(|_| Value::String(d.to_string()))
            }
            Self::String(s) => Value::String(s.clone()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
        }
    }

    /// The elements when this literal is a list.
    pub fn as_list(&self) -> Option<&[Literal]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// The string content when this literal is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Whether the literal is a single scalar value (not a list, not null).
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::List(_) | Self::Null)
    }
}

fn number_literal(n: &Number) -> Result<Literal, String> {
    let text = n.to_string();
    if let Ok(i) = text.parse::<i64>() {
        return Ok(Literal::Integer(i));
    }
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map(Literal::Decimal)
        .map_err(|e| format!("number {text} cannot be held exactly: {e}"))
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn decimal_literal_keeps_every_digit() {
        let value: Value = serde_json::from_str("12345678.1234567890").unwrap();
        let lit = Literal::from_json(&value).unwrap();
        assert_eq!(
            lit,
            Literal::Decimal(Decimal::from_str("12345678.1234567890").unwrap())
        );
        assert_eq!(lit.to_string(), "12345678.1234567890");
    }

    #[test]
    fn integers_stay_integers() {
        assert_eq!(
            Literal::from_json(&serde_json::json!(42)).unwrap(),
            Literal::Integer(42)
        );
    }

    #[test]
    fn lists_and_strings() {
        let lit = Literal::from_json(&serde_json::json!(["OrderService", "PricingService"])).unwrap();
        assert_eq!(lit.as_list().map(<[Literal]>::len), Some(2));
        assert_eq!(lit.to_string(), r#"["OrderService", "PricingService"]"#);
        assert!(!lit.is_scalar());
        assert!(Literal::String("x".into()).is_scalar());
    }

    #[test]
    fn objects_are_rejected() {
        assert!(Literal::from_json(&serde_json::json!({"a": 1})).is_err());
    }

    proptest! {
        /// Decimal literals survive JSON text and back with full precision.
        #[test]
        fn decimal_text_round_trip(mantissa in any::<i64>(), scale in 0u32..=18) {
            let d = Decimal::new(mantissa, scale);
            let value: Value = serde_json::from_str(&d.to_string()).unwrap();
            let lit = Literal::from_json(&value).unwrap();
            let back = Literal::from_json(&lit.to_json()).unwrap();
            prop_assert_eq!(&lit, &back);
            match lit {
                Literal::Integer(i) => prop_assert_eq!(Decimal::from(i), d),
                Literal::Decimal(x) => prop_assert_eq!(x, d),
                other => prop_assert!(false, "unexpected literal {:?}", other),
            }
        }
    }
}
