// ecxctl - CLI for the Equinix ECX Fabric API
// Copyright (C) 2024 Mathias Uhl <mathiasuhl@gmx.de>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Attribute filtering over heterogeneous records.
//!
//! Records expose their fields by wire name (the key used when the record is
//! serialized for transport) through [`RecordFields`]. The filter only knows
//! how to compare text and 64-bit integers; every other kind never matches.
//!
//! Typed records get their accessor table from [`record_fields!`]:
//!
//! ```ignore
//! record_fields!(Port {
//!     "uuid" => uuid,
//!     "name" => name,
//! });
//! ```

use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

/// Runtime view of one record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Integer(i64),
    Unsupported,
}

pub trait AsFieldValue {
    fn as_field_value(&self) -> FieldValue<'_>;
}

impl AsFieldValue for String {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::Text(self)
    }
}

impl AsFieldValue for str {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::Text(self)
    }
}

impl AsFieldValue for i64 {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::Integer(*self)
    }
}

impl<T: AsFieldValue> AsFieldValue for Option<T> {
    fn as_field_value(&self) -> FieldValue<'_> {
        match self {
            Some(inner) => inner.as_field_value(),
            None => FieldValue::Unsupported,
        }
    }
}

impl<T: AsFieldValue + ?Sized> AsFieldValue for Box<T> {
    fn as_field_value(&self) -> FieldValue<'_> {
        (**self).as_field_value()
    }
}

macro_rules! impl_unsupported_field {
    ($($ty:ty),* $(,)?) => {
        $(impl AsFieldValue for $ty {
            fn as_field_value(&self) -> FieldValue<'_> {
                FieldValue::Unsupported
            }
        })*
    };
}

impl_unsupported_field!(bool, f32, f64, i32, u32, u64);

impl<T> AsFieldValue for Vec<T> {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::Unsupported
    }
}

impl AsFieldValue for serde_json::Value {
    fn as_field_value(&self) -> FieldValue<'_> {
        match self {
            serde_json::Value::String(s) => FieldValue::Text(s),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(FieldValue::Integer)
                .unwrap_or(FieldValue::Unsupported),
            _ => FieldValue::Unsupported,
        }
    }
}

/// Field lookup by wire-serialization name.
pub trait RecordFields {
    /// Wire names this record type exposes; empty for dynamic records.
    const WIRE_NAMES: &'static [&'static str] = &[];

    /// `None` when the record has no field with that wire name.
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

/// Untyped JSON records: objects are looked up by key, anything else has no fields.
impl RecordFields for serde_json::Value {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        self.as_object()
            .and_then(|map| map.get(name))
            .map(AsFieldValue::as_field_value)
    }
}

/// Implement [`RecordFields`] for a struct from a `"wireName" => field` table.
#[macro_export]
macro_rules! record_fields {
    ($ty:ty { $($wire:literal => $field:ident),* $(,)? }) => {
        impl $crate::filter::RecordFields for $ty {
            const WIRE_NAMES: &'static [&'static str] = &[$($wire),*];

            fn field(&self, name: &str) -> Option<$crate::filter::FieldValue<'_>> {
                use $crate::filter::AsFieldValue;
                match name {
                    $($wire => Some(self.$field.as_field_value()),)*
                    _ => None,
                }
            }
        }
    };
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterParseError {
    #[error("filter `{0}` is not a key=value pair")]
    MissingSeparator(String),
    #[error("filter `{0}` has an empty attribute name")]
    EmptyKey(String),
}

/// Attribute name to match value; keys are unique, later entries win.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria(BTreeMap<String, String>);

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse `portName=EQUINIX,status=ACTIVE`.
    pub fn parse(input: &str) -> Result<Self, FilterParseError> {
        let mut criteria = Self::new();
        for pair in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| FilterParseError::MissingSeparator(pair.to_string()))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(FilterParseError::EmptyKey(pair.to_string()));
            }
            criteria.insert(key, value.trim());
        }
        Ok(criteria)
    }
}

impl FromStr for FilterCriteria {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FilterCriteria {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut criteria = Self::new();
        for (k, v) in iter {
            criteria.insert(k, v);
        }
        criteria
    }
}

/// True when every criterion matches its field on `record`.
///
/// Text fields match by case-sensitive substring, integer fields by equality
/// with the criterion parsed as a base-10 `i64`. Unknown names, other field
/// kinds and unparsable numbers never match.
pub fn matches<T: RecordFields + ?Sized>(record: &T, criteria: &FilterCriteria) -> bool {
    criteria.iter().all(|(name, wanted)| match record.field(name) {
        Some(FieldValue::Text(text)) => text.contains(wanted),
        Some(FieldValue::Integer(n)) => wanted.parse::<i64>().is_ok_and(|v| v == n),
        Some(FieldValue::Unsupported) | None => false,
    })
}

/// Records matching `criteria`, in input order. The input is left untouched.
pub fn filter<T: RecordFields + Clone>(items: &[T], criteria: &FilterCriteria) -> Vec<T> {
    items
        .iter()
        .filter(|item| matches(*item, criteria))
        .cloned()
        .collect()
}

/// Every declared wire name must be a key of the serialized record.
#[cfg(test)]
pub(crate) fn assert_wire_names<T: RecordFields + serde::Serialize>(record: &T) {
    let value = serde_json::to_value(record).unwrap();
    let keys = value.as_object().unwrap();
    for name in T::WIRE_NAMES {
        assert!(keys.contains_key(*name), "`{name}` is not a serialized key");
        assert!(record.field(name).is_some());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Circuit {
        port_name: String,
        status: String,
        vlan_s_tag: i64,
        speed: f64,
        redundant: bool,
        notifications: Vec<String>,
        named_tag: Option<String>,
        internal_note: String,
    }

    crate::record_fields!(Circuit {
        "portName" => port_name,
        "status" => status,
        "vlanSTag" => vlan_s_tag,
        "speed" => speed,
        "redundant" => redundant,
        "notifications" => notifications,
        "namedTag" => named_tag,
    });

    fn circuit(port: &str, status: &str, vlan: i64) -> Circuit {
        Circuit {
            port_name: port.into(),
            status: status.into(),
            vlan_s_tag: vlan,
            speed: 50.0,
            redundant: true,
            notifications: vec!["noc@example.com".into()],
            named_tag: None,
            internal_note: "ACTIVE".into(),
        }
    }

    fn criteria(pairs: &[(&str, &str)]) -> FilterCriteria {
        pairs.iter().copied().collect()
    }

    #[test]
    fn text_criterion_is_substring_match() {
        let items = vec![circuit("EQUINIX-LD4-CX-PRI-01", "PROVISIONED", 3022)];
        assert_eq!(filter(&items, &criteria(&[("portName", "EQUINIX")])).len(), 1);
        assert_eq!(filter(&items, &criteria(&[("portName", "LD4-CX")])).len(), 1);
        assert!(filter(&items, &criteria(&[("portName", "METROCODE")])).is_empty());
    }

    #[test]
    fn text_criterion_is_case_sensitive() {
        let items = vec![circuit("EQUINIX-LD4-CX-PRI-01", "PROVISIONED", 3022)];
        assert!(filter(&items, &criteria(&[("portName", "equinix")])).is_empty());
    }

    #[test]
    fn integer_criterion_is_exact_match() {
        let items = vec![
            circuit("A", "PROVISIONED", 3022),
            circuit("B", "PROVISIONED", 30221),
        ];
        let kept = filter(&items, &criteria(&[("vlanSTag", "3022")]));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].port_name, "A");
    }

    #[test]
    fn integer_criterion_covers_full_i64_range() {
        let items = vec![
            circuit("A", "PROVISIONED", 3_000_000_000),
            circuit("B", "PROVISIONED", -5),
        ];
        let kept = filter(&items, &criteria(&[("vlanSTag", "3000000000")]));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].port_name, "A");
        assert_eq!(filter(&items, &criteria(&[("vlanSTag", "-5")])).len(), 1);
        assert!(filter(&items, &criteria(&[("vlanSTag", "9223372036854775808")])).is_empty());
    }

    #[test]
    fn unparsable_integer_excludes_everything() {
        let items = vec![circuit("A", "PROVISIONED", 3022), circuit("B", "DEPROVISIONED", 7)];
        assert!(filter(&items, &criteria(&[("vlanSTag", "abc")])).is_empty());
    }

    #[test]
    fn criteria_combine_with_and() {
        let items = vec![
            circuit("EQUINIX-LD4", "PROVISIONED", 1),
            circuit("EQUINIX-AM1", "ACTIVE", 2),
        ];
        let kept = filter(
            &items,
            &criteria(&[("portName", "EQUINIX"), ("status", "ACTIVE")]),
        );
        assert_eq!(kept, vec![items[1].clone()]);
    }

    #[test]
    fn unknown_and_unsupported_fields_never_match() {
        let items = vec![circuit("A", "ACTIVE", 1)];
        for (name, value) in [
            ("nope", "A"),
            ("speed", "50"),
            ("redundant", "true"),
            ("notifications", "noc"),
            ("namedTag", ""),
            // declared in the struct but not exposed by wire name
            ("internalNote", "ACTIVE"),
            ("internal_note", "ACTIVE"),
        ] {
            assert!(
                filter(&items, &criteria(&[(name, value)])).is_empty(),
                "{name} should not match"
            );
        }
    }

    #[test]
    fn empty_criteria_keep_everything() {
        let items = vec![circuit("A", "ACTIVE", 1), circuit("B", "ACTIVE", 2)];
        assert_eq!(filter(&items, &FilterCriteria::new()), items);
    }

    #[test]
    fn filtering_is_idempotent_and_pure() {
        let items = vec![
            circuit("EQUINIX-LD4", "ACTIVE", 1),
            circuit("OTHER", "ACTIVE", 2),
            circuit("EQUINIX-AM1", "PENDING", 3),
        ];
        let c = criteria(&[("portName", "EQUINIX")]);
        let once = filter(&items, &c);
        let twice = filter(&once, &c);
        assert_eq!(once, twice);
        assert_eq!(items.len(), 3);
        assert_eq!(
            once.iter().map(|c| c.port_name.as_str()).collect::<Vec<_>>(),
            vec!["EQUINIX-LD4", "EQUINIX-AM1"]
        );
    }

    #[test]
    fn json_records_use_object_keys() {
        let items = vec![
            json!({"portName": "EQUINIX-LD4", "vlanSTag": 3022, "speed": 50.5}),
            json!({"portName": "OTHER", "vlanSTag": 10}),
            json!("not an object"),
            json!(42),
        ];
        assert_eq!(filter(&items, &criteria(&[("portName", "EQUINIX")])).len(), 1);
        assert_eq!(filter(&items, &criteria(&[("vlanSTag", "10")])).len(), 1);
        assert!(filter(&items, &criteria(&[("speed", "50")])).is_empty());
    }

    #[test]
    fn declared_wire_names_are_serialized_keys() {
        assert_wire_names(&circuit("A", "ACTIVE", 1));
    }

    #[test]
    fn parses_criteria_string() {
        let parsed = FilterCriteria::parse(" portName=EQUINIX , status=ACTIVE,").unwrap();
        assert_eq!(parsed, criteria(&[("portName", "EQUINIX"), ("status", "ACTIVE")]));
    }

    #[test]
    fn duplicate_keys_last_write_wins() {
        let parsed: FilterCriteria = "status=A,status=B".parse().unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.iter().next(), Some(("status", "B")));
    }

    #[test]
    fn value_may_contain_equals() {
        let parsed = FilterCriteria::parse("name=a=b").unwrap();
        assert_eq!(parsed.iter().next(), Some(("name", "a=b")));
    }

    #[test]
    fn rejects_malformed_pairs() {
        assert_eq!(
            FilterCriteria::parse("portName"),
            Err(FilterParseError::MissingSeparator("portName".into()))
        );
        assert_eq!(
            FilterCriteria::parse("=x"),
            Err(FilterParseError::EmptyKey("=x".into()))
        );
    }
}
