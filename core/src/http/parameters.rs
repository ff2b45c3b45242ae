/*
 * parameters.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Fuel, an HTTP client engine.
 *
 * Fuel is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Fuel is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Fuel.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Request parameters: ordered `(key, value)` pairs where a value is a single
//! string, a list, or null.

/// A parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Value(String),
    /// Encoded as `key[]=v` once per element.
    List(Vec<String>),
    /// Encoded as a bare key.
    Null,
}

pub type Parameters = Vec<(String, ParamValue)>;

impl ParamValue {
    /// Form-part values: a list becomes `(key[], v)` per element, null an empty value.
    pub(crate) fn flatten(key: &str, value: &ParamValue) -> Vec<(String, String)> {
        match value {
            ParamValue::Value(v) => vec![(key.to_string(), v.clone())],
            ParamValue::Null => vec![(key.to_string(), String::new())],
            ParamValue::List(items) => items
                .iter()
                .map(|v| (format!("{}[]", key), v.clone()))
                .collect(),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Value(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Value(v)
    }
}

impl From<&String> for ParamValue {
    fn from(v: &String) -> Self {
        ParamValue::Value(v.clone())
    }
}

macro_rules! display_value {
    ($($t:ty),*) => {
        $(impl From<$t> for ParamValue {
            fn from(v: $t) -> Self {
                ParamValue::Value(v.to_string())
            }
        })*
    };
}

display_value!(bool, char, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(ParamValue::Null)
    }
}

impl<T: ToString> From<Vec<T>> for ParamValue {
    fn from(v: Vec<T>) -> Self {
        ParamValue::List(v.iter().map(ToString::to_string).collect())
    }
}

impl<T: ToString, const N: usize> From<[T; N]> for ParamValue {
    fn from(v: [T; N]) -> Self {
        ParamValue::List(v.iter().map(ToString::to_string).collect())
    }
}

/// Shorthand for building a parameter pair.
pub fn param(key: impl Into<String>, value: impl Into<ParamValue>) -> (String, ParamValue) {
    (key.into(), value.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        assert_eq!(ParamValue::from(42), ParamValue::Value("42".into()));
        assert_eq!(ParamValue::from(None::<&str>), ParamValue::Null);
        assert_eq!(ParamValue::from([1, 2]), ParamValue::List(vec!["1".into(), "2".into()]));
        assert_eq!(param("k", "v"), ("k".to_string(), ParamValue::Value("v".into())));
    }

    #[test]
    fn flatten_for_form_parts() {
        assert_eq!(
            ParamValue::flatten("ids", &ParamValue::from(vec!["a", "b"])),
            vec![("ids[]".to_string(), "a".to_string()), ("ids[]".to_string(), "b".to_string())]
        );
        assert_eq!(ParamValue::flatten("n", &ParamValue::Null), vec![("n".to_string(), String::new())]);
    }
}
