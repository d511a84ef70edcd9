//! Permissive numeric coercion
//!
//! Rows are often only partly filled in while a closing is being edited.
//! Missing or non-numeric values become zero instead of failing the
//! calculation.

use bigdecimal::BigDecimal;
use std::str::FromStr;

/// Parse a decimal, treating blank or non-numeric text as zero
pub fn coerce_decimal(raw: &str) -> BigDecimal {
    parse_decimal(raw).unwrap_or_else(|| BigDecimal::from(0))
}

/// Largest decimal exponent, in either direction, accepted from input
///
/// Adding a value to zero aligns both exponents, so an input such as
/// `1e4000000000` would expand to billions of digits.
pub const MAX_DECIMAL_EXPONENT: i64 = 64;

/// Parse a decimal, returning `None` for blank or non-numeric text and for
/// values whose exponent is beyond [`MAX_DECIMAL_EXPONENT`]
pub fn parse_decimal(raw: &str) -> Option<BigDecimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    BigDecimal::from_str(trimmed).ok().filter(within_exponent_bound)
}

fn within_exponent_bound(value: &BigDecimal) -> bool {
    let (_, scale) = value.as_bigint_and_exponent();
    scale.abs() <= MAX_DECIMAL_EXPONENT
}

/// Value of an optional field with missing coerced to zero
pub fn or_zero(value: Option<&BigDecimal>) -> BigDecimal {
    value.cloned().unwrap_or_else(|| BigDecimal::from(0))
}

/// Serde adapter for `Option<BigDecimal>` fields that accepts numbers,
/// numeric strings and null, and maps anything else to `None`
pub mod lenient {
    use bigdecimal::BigDecimal;
    use serde::de::{self, Deserializer, Visitor};
    use serde::{Serialize, Serializer};
    use std::fmt;

    pub fn serialize<S>(value: &Option<BigDecimal>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<BigDecimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(LenientVisitor)
    }

    struct LenientVisitor;

    impl<'de> Visitor<'de> for LenientVisitor {
        type Value = Option<BigDecimal>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number, a numeric string or null")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(BigDecimal::from(v)))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(BigDecimal::from(v)))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            if !v.is_finite() {
                return Ok(None);
            }
            Ok(super::parse_decimal(&v.to_string()))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(super::parse_decimal(v))
        }

        fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(LenientVisitor)
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            while seq.next_element::<de::IgnoredAny>()?.is_some() {}
            Ok(None)
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: de::MapAccess<'de>,
        {
            while map.next_entry::<de::IgnoredAny, de::IgnoredAny>()?.is_some() {}
            Ok(None)
        }
    }

    /// Same as the parent adapter for plain `BigDecimal` fields; invalid
    /// input becomes zero
    pub mod zero_if_missing {
        use bigdecimal::BigDecimal;
        use serde::{Deserializer, Serialize, Serializer};

        pub fn serialize<S>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            value.serialize(serializer)
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
        where
            D: Deserializer<'de>,
        {
            Ok(super::deserialize(deserializer)?.unwrap_or_else(|| BigDecimal::from(0)))
        }
    }

    /// Adapter for `String` fields: null and non-text values become an
    /// empty string, numbers keep their textual form
    pub mod text {
        use serde::de::{self, Deserializer, Visitor};
        use serde::Serializer;
        use std::fmt;

        pub fn serialize<S>(value: &str, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(value)
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(TextVisitor)
        }

        struct TextVisitor;

        impl<'de> Visitor<'de> for TextVisitor {
            type Value = String;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string, a number or null")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(v.to_string())
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(v)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(v.to_string())
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(v.to_string())
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(v.to_string())
            }

            fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Self::Value, E> {
                Ok(String::new())
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(String::new())
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(String::new())
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                deserializer.deserialize_any(TextVisitor)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                while seq.next_element::<de::IgnoredAny>()?.is_some() {}
                Ok(String::new())
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                while map.next_entry::<de::IgnoredAny, de::IgnoredAny>()?.is_some() {}
                Ok(String::new())
            }
        }
    }
}
