//! Data type normalization
//!
//! Dialect type syntax is first mapped to catalog-style names plus modifier
//! arguments ([`TypeName`]), then matched into a canonical [`DataType`].
//! Anything that does not match degrades to [`DataType::Unconverted`].

use serde::Serialize;
use sqlparser::ast::{CharacterLength, DataType as NativeType, ExactNumberInfo};

/// Catalog namespace some built-in type names are qualified with
const CATALOG_PREFIX: &str = "pg_catalog";

/// Canonical column type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataType {
    /// Size in bytes
    Integer { size: u32 },
    Float { size: u32 },
    Serial { size: u32 },
    Decimal {
        #[serde(skip_serializing_if = "Option::is_none")]
        precision: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        scale: Option<u32>,
    },
    /// Fixed-length character
    Character { size: u32 },
    CharacterVarying { size: u32 },
    Text,
    Unconverted { name: Vec<String> },
}

/// Type name as written, split into name parts and modifier arguments
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeName {
    pub names: Vec<String>,
    pub modifiers: Vec<String>,
}

impl TypeName {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            modifiers: Vec::new(),
        }
    }

    pub fn with_modifiers<S: Into<String>>(mut self, modifiers: impl IntoIterator<Item = S>) -> Self {
        self.modifiers = modifiers.into_iter().map(Into::into).collect();
        self
    }

    /// Map a native type to catalog-style names
    pub fn from_native(data_type: &NativeType) -> Self {
        match data_type {
            NativeType::Int(_) | NativeType::Integer(_) | NativeType::Int4(_) => Self::new(["int4"]),
            NativeType::SmallInt(_) | NativeType::Int2(_) => Self::new(["int2"]),
            NativeType::BigInt(_) | NativeType::Int8(_) => Self::new(["int8"]),
            NativeType::Real | NativeType::Float4 => Self::new(["float4"]),
            NativeType::DoublePrecision | NativeType::Float8 => Self::new(["float8"]),
            NativeType::Float(Some(precision)) if *precision <= 24 => Self::new(["float4"]),
            NativeType::Float(_) => Self::new(["float8"]),
            NativeType::Numeric(info) | NativeType::Decimal(info) => {
                let modifiers = match info {
                    ExactNumberInfo::None => vec![],
                    ExactNumberInfo::Precision(p) => vec![p.to_string()],
                    ExactNumberInfo::PrecisionAndScale(p, s) => vec![p.to_string(), s.to_string()],
                };
                Self::new(["numeric"]).with_modifiers(modifiers)
            }
            NativeType::Varchar(length) | NativeType::CharacterVarying(length) => {
                Self::new(["varchar"]).with_modifiers(length_modifiers(length.as_ref()))
            }
            NativeType::Char(length) | NativeType::Character(length) => {
                let modifiers = match length {
                    Some(length) => length_modifiers(Some(length)),
                    None => vec!["1".to_string()],
                };
                Self::new(["bpchar"]).with_modifiers(modifiers)
            }
            NativeType::Text => Self::new(["text"]),
            NativeType::Custom(name, modifiers) => Self {
                names: name.0.iter().map(|ident| ident.value.to_lowercase()).collect(),
                modifiers: modifiers.clone(),
            },
            other => Self::new([other.to_string().to_lowercase()]),
        }
    }

    /// Strip the catalog namespace
    fn without_catalog(&self) -> &[String] {
        match self.names.split_first() {
            Some((first, rest)) if first == CATALOG_PREFIX && !rest.is_empty() => rest,
            _ => &self.names,
        }
    }
}

fn length_modifiers(length: Option<&CharacterLength>) -> Vec<String> {
    match length {
        Some(CharacterLength::IntegerLength { length, .. }) => vec![length.to_string()],
        Some(CharacterLength::Max) => vec!["max".to_string()],
        None => vec![],
    }
}

/// Normalize a type name
pub fn normalize(type_name: &TypeName) -> DataType {
    let names = type_name.without_catalog();
    let unconverted = || DataType::Unconverted {
        name: names.to_vec(),
    };

    let [name] = names else {
        return unconverted();
    };
    let modifiers = &type_name.modifiers;

    let converted = if let Some(size) = sized(name, "int") {
        size.map(|size| DataType::Integer { size })
    } else if let Some(size) = sized(name, "float") {
        size.map(|size| DataType::Float { size })
    } else {
        match name.as_str() {
            "serial" => Some(DataType::Serial { size: 4 }),
            "smallserial" => Some(DataType::Serial { size: 2 }),
            "bigserial" => Some(DataType::Serial { size: 8 }),
            s if s.starts_with("serial") => sized(s, "serial")
                .flatten()
                .map(|size| DataType::Serial { size }),
            "numeric" => decimal(modifiers),
            "bpchar" => single_size(modifiers).map(|size| DataType::Character { size }),
            "varchar" => single_size(modifiers).map(|size| DataType::CharacterVarying { size }),
            "text" => Some(DataType::Text),
            _ => None,
        }
    };

    converted.unwrap_or_else(unconverted)
}

/// `Some(Some(n))` for `prefix` + digits, `Some(None)` for `prefix` + anything
/// else, `None` without the prefix
fn sized(name: &str, prefix: &str) -> Option<Option<u32>> {
    let rest = name.strip_prefix(prefix)?;
    Some(rest.parse().ok())
}

fn decimal(modifiers: &[String]) -> Option<DataType> {
    let numbers = modifiers
        .iter()
        .map(|m| m.parse::<u32>().ok())
        .collect::<Option<Vec<_>>>()?;

    match numbers.as_slice() {
        [] => Some(DataType::Decimal {
            precision: None,
            scale: None,
        }),
        [precision] => Some(DataType::Decimal {
            precision: Some(*precision),
            scale: None,
        }),
        [precision, scale] => Some(DataType::Decimal {
            precision: Some(*precision),
            scale: Some(*scale),
        }),
        _ => None,
    }
}

fn single_size(modifiers: &[String]) -> Option<u32> {
    match modifiers {
        [size] => size.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn norm(names: &[&str], modifiers: &[&str]) -> DataType {
        normalize(&TypeName::new(names.iter().copied()).with_modifiers(modifiers.iter().copied()))
    }

    fn unconverted(names: &[&str]) -> DataType {
        DataType::Unconverted {
            name: names.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn sized_numbers() {
        assert_eq!(norm(&["pg_catalog", "int4"], &[]), DataType::Integer { size: 4 });
        assert_eq!(norm(&["int8"], &[]), DataType::Integer { size: 8 });
        assert_eq!(norm(&["float8"], &[]), DataType::Float { size: 8 });
        assert_eq!(norm(&["interval"], &[]), unconverted(&["interval"]));
    }

    #[test]
    fn serials() {
        assert_eq!(norm(&["serial"], &[]), DataType::Serial { size: 4 });
        assert_eq!(norm(&["smallserial"], &[]), DataType::Serial { size: 2 });
        assert_eq!(norm(&["bigserial"], &[]), DataType::Serial { size: 8 });
        assert_eq!(norm(&["serial8"], &[]), DataType::Serial { size: 8 });
        assert_eq!(norm(&["serialx"], &[]), unconverted(&["serialx"]));
    }

    #[test]
    fn numeric_modifier_counts() {
        assert_eq!(
            norm(&["numeric"], &[]),
            DataType::Decimal { precision: None, scale: None }
        );
        assert_eq!(
            norm(&["numeric"], &["10"]),
            DataType::Decimal { precision: Some(10), scale: None }
        );
        assert_eq!(
            norm(&["pg_catalog", "numeric"], &["10", "2"]),
            DataType::Decimal { precision: Some(10), scale: Some(2) }
        );
        assert_eq!(norm(&["numeric"], &["1", "2", "3"]), unconverted(&["numeric"]));
    }

    #[test]
    fn character_types_need_one_length() {
        assert_eq!(norm(&["varchar"], &["255"]), DataType::CharacterVarying { size: 255 });
        assert_eq!(norm(&["bpchar"], &["3"]), DataType::Character { size: 3 });
        assert_eq!(norm(&["varchar"], &[]), unconverted(&["varchar"]));
        assert_eq!(norm(&["varchar"], &["max"]), unconverted(&["varchar"]));
        assert_eq!(norm(&["text"], &[]), DataType::Text);
    }

    #[test]
    fn qualified_custom_names_stay_unconverted() {
        assert_eq!(norm(&["myschema", "money2"], &[]), unconverted(&["myschema", "money2"]));
        assert_eq!(norm(&["bool"], &[]), unconverted(&["bool"]));
    }

    #[test]
    fn native_types() {
        assert_eq!(normalize(&TypeName::from_native(&NativeType::Int(None))), DataType::Integer { size: 4 });
        assert_eq!(normalize(&TypeName::from_native(&NativeType::BigInt(None))), DataType::Integer { size: 8 });
        assert_eq!(normalize(&TypeName::from_native(&NativeType::Text)), DataType::Text);
        assert_eq!(
            normalize(&TypeName::from_native(&NativeType::Numeric(ExactNumberInfo::PrecisionAndScale(12, 4)))),
            DataType::Decimal { precision: Some(12), scale: Some(4) }
        );
        assert_eq!(
            normalize(&TypeName::from_native(&NativeType::Char(None))),
            DataType::Character { size: 1 }
        );
    }
}
