//! Scalar parameter types.
//!
//! Every entry of a [`ParameterGroup`](crate::ParameterGroup) holds one of a
//! closed set of scalars. [`ParameterScalar`] maps a Rust type onto its
//! [`ParameterType`] so typed accessors can be written once, generically.

use std::fmt;

/// The type of a parameter value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum::EnumString, strum::Display,
)]
#[strum(serialize_all = "lowercase")]
pub enum ParameterType {
    Bool,
    Int,
    Unsigned,
    Float,
    String,
}

/// A typed parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Bool(bool),
    Int(i64),
    Unsigned(u64),
    Float(f64),
    String(std::string::String),
}

impl ParameterValue {
    /// Returns the parameter type of this value.
    pub fn parameter_type(&self) -> ParameterType {
        match self {
            Self::Bool(_) => ParameterType::Bool,
            Self::Int(_) => ParameterType::Int,
            Self::Unsigned(_) => ParameterType::Unsigned,
            Self::Float(_) => ParameterType::Float,
            Self::String(_) => ParameterType::String,
        }
    }

    /// Parse the textual form of a value of type `ty`.
    ///
    /// Booleans accept `true/false` and `1/0`; unsigned values accept a `0x`
    /// prefix so packed colors can be written the way they are usually read.
    pub fn parse(ty: ParameterType, text: &str) -> Option<Self> {
        let text = text.trim();
        match ty {
            ParameterType::Bool => match text {
                "true" | "1" => Some(Self::Bool(true)),
                "false" | "0" => Some(Self::Bool(false)),
                _ => None,
            },
            ParameterType::Int => text.parse().ok().map(Self::Int),
            ParameterType::Unsigned => match text
                .strip_prefix("0x")
                .or_else(|| text.strip_prefix("0X"))
            {
                Some(hex) => u64::from_str_radix(hex, 16).ok().map(Self::Unsigned),
                None => text.parse().ok().map(Self::Unsigned),
            },
            ParameterType::Float => text.parse().ok().map(Self::Float),
            ParameterType::String => Some(Self::String(text.to_string())),
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Unsigned(v) => write!(f, "{:#x}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "{:?}", v),
        }
    }
}

/// A Rust scalar that can be stored as a [`ParameterValue`].
///
/// Implemented for exactly `bool`, `i64`, `u64`, `f64` and `String`.
pub trait ParameterScalar: Clone + Sized {
    /// The parameter type this scalar is stored as.
    const TYPE: ParameterType;

    /// Extract the scalar, or `None` when `value` holds another type.
    fn from_value(value: &ParameterValue) -> Option<Self>;

    fn into_value(self) -> ParameterValue;
}

macro_rules! impl_scalar {
    ($ty:ty, $variant:ident) => {
        impl ParameterScalar for $ty {
            const TYPE: ParameterType = ParameterType::$variant;

            fn from_value(value: &ParameterValue) -> Option<Self> {
                match value {
                    ParameterValue::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }

            fn into_value(self) -> ParameterValue {
                ParameterValue::$variant(self)
            }
        }

        impl From<$ty> for ParameterValue {
            fn from(value: $ty) -> Self {
                ParameterValue::$variant(value)
            }
        }
    };
}

impl_scalar!(bool, Bool);
impl_scalar!(i64, Int);
impl_scalar!(u64, Unsigned);
impl_scalar!(f64, Float);
impl_scalar!(std::string::String, String);

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::String(value.to_string())
    }
}
