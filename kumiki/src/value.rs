//! Structured values exchanged between callers and the schema engines.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::NaiveDateTime;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(BigInt),
    Str(String),
    Bytes(Vec<u8>),
    BitString(BitString),
    Oid(Oid),
    Time(NaiveDateTime),
    List(Vec<Value>),
    Object(BTreeMap<String, Value>),
    Choice { branch: String, value: Box<Value> },
}

impl Value {
    pub fn object<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn choice(branch: impl Into<String>, value: impl Into<Value>) -> Self {
        Value::Choice {
            branch: branch.into(),
            value: Box::new(value.into()),
        }
    }

    /// Looks up a field when the value is an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            Value::Int(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_int().and_then(|i| i.to_i64())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            Value::BitString(bs) => Some(bs.as_bytes()),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Str(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::BitString(_) => "bit string",
            Value::Oid(_) => "object identifier",
            Value::Time(_) => "time",
            Value::List(_) => "list",
            Value::Object(_) => "object",
            Value::Choice { .. } => "choice",
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(BigInt::from(value))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Int(BigInt::from(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(BigInt::from(value))
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Value::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}

impl From<BitString> for Value {
    fn from(value: BitString) -> Self {
        Value::BitString(value)
    }
}

impl From<Oid> for Value {
    fn from(value: Oid) -> Self {
        Value::Oid(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::Time(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            // Arbitrary precision: decimal string like the INTEGER type does.
            Value::Int(i) => serializer.serialize_str(&i.to_string()),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Bytes(b) => serializer.serialize_str(&hex(b)),
            Value::BitString(bs) => bs.serialize(serializer),
            Value::Oid(oid) => serializer.serialize_str(&oid.to_string()),
            Value::Time(t) => serializer.serialize_str(&t.format("%Y-%m-%dT%H:%M:%S").to_string()),
            Value::List(items) => items.serialize(serializer),
            Value::Object(map) => {
                let mut state = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    state.serialize_entry(k, v)?;
                }
                state.end()
            }
            Value::Choice { branch, value } => {
                let mut state = serializer.serialize_struct("Choice", 2)?;
                state.serialize_field("type", branch)?;
                state.serialize_field("value", value)?;
                state.end()
            }
        }
    }
}

fn hex(data: &[u8]) -> String {
    data.iter().map(|b| format!("{:02x}", b)).collect()
}

/// OBJECT IDENTIFIER arcs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Oid {
    inner: Vec<u64>,
}

impl Oid {
    pub fn new(arcs: Vec<u64>) -> Self {
        Oid { inner: arcs }
    }

    pub fn arcs(&self) -> &[u64] {
        &self.inner
    }

    /// Arcs joined with a single space, an alternative spelling accepted by name maps.
    pub fn spaced(&self) -> String {
        self.inner
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Display for Oid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = self
            .inner
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{}", s)
    }
}

impl FromStr for Oid {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .split(['.', ' '])
            .filter(|p| !p.is_empty())
            .map(|p| p.parse::<u64>())
            .collect::<Result<Vec<u64>, _>>()?;
        Ok(Oid { inner })
    }
}

impl From<&[u64]> for Oid {
    fn from(value: &[u64]) -> Self {
        Oid {
            inner: value.to_vec(),
        }
    }
}

/// BIT STRING payload: the bytes plus the count of unused trailing bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitString {
    unused: u8,
    data: Vec<u8>,
}

impl BitString {
    pub fn new(unused: u8, data: Vec<u8>) -> Self {
        BitString { unused, data }
    }

    pub fn unused_bits(&self) -> u8 {
        self.unused
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn bit_len(&self) -> usize {
        if self.data.is_empty() {
            0
        } else {
            self.data.len() * 8 - self.unused as usize
        }
    }
}

impl Serialize for BitString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("BitString", 2)?;
        state.serialize_field("unused", &self.unused)?;
        state.serialize_field("data", &hex(&self.data))?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::NaiveDate;
    use num_bigint::BigInt;
    use rstest::rstest;

    use super::{BitString, Oid, Value};

    #[rstest(
        input,
        expected,
        case("1.2.840.113549", vec![1, 2, 840, 113549]),
        case("1 2 3", vec![1, 2, 3]),
        case("2.5.29.19", vec![2, 5, 29, 19])
    )]
    fn test_oid_from_str(input: &str, expected: Vec<u64>) {
        let oid = Oid::from_str(input).unwrap();
        assert_eq!(expected, oid.arcs());
    }

    #[test]
    fn test_oid_display() {
        let oid = Oid::new(vec![1, 3, 6, 1]);
        assert_eq!("1.3.6.1", oid.to_string());
        assert_eq!("1 3 6 1", oid.spaced());
    }

    #[rstest(
        input,
        expected,
        case(BitString::new(0, vec![0xff]), 8),
        case(BitString::new(3, vec![0xff, 0xe0]), 13),
        case(BitString::new(0, vec![]), 0)
    )]
    fn test_bitstring_bit_len(input: BitString, expected: usize) {
        assert_eq!(expected, input.bit_len());
    }

    #[rstest(
        input,
        expected_json,
        case(Value::from(123i64), r#""123""#),
        case(Value::from(vec![0x01, 0xab]), r#""01ab""#),
        case(Value::Null, "null"),
        case(Value::choice("num", 5i64), r#"{"type":"num","value":"5"}"#),
        case(
            Value::object([("a", Value::from(true)), ("b", Value::from("x"))]),
            r#"{"a":true,"b":"x"}"#
        ),
        case(Value::BitString(BitString::new(1, vec![0x80])), r#"{"unused":1,"data":"80"}"#)
    )]
    fn test_value_serialize(input: Value, expected_json: &str) {
        let json = serde_json::to_string(&input).unwrap();
        assert_eq!(expected_json, json);
    }

    #[test]
    fn test_value_serialize_time() {
        let t = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        let json = serde_json::to_string(&Value::Time(t)).unwrap();
        assert_eq!(r#""2024-01-02T03:04:05""#, json);
    }

    #[test]
    fn test_value_accessors() {
        let v = Value::object([("n", Value::Int(BigInt::from(-7)))]);
        assert_eq!(Some(-7), v.get("n").and_then(Value::as_i64));
        assert!(v.get("missing").is_none());
        assert_eq!("object", v.type_name());
    }
}
