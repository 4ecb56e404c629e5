use std::fmt;

/// A displayable scalar held by a record field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

/// Writes `x` the way ECMAScript's `Number::toString` does: shortest round-trip digits,
/// plain notation from 1e-6 up to 1e21, exponent notation outside that range.
fn write_number(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_nan() {
        return f.write_str("NaN");
    }
    if x.is_infinite() {
        return f.write_str(if x > 0.0 { "Infinity" } else { "-Infinity" });
    }
    if x == 0.0 {
        return f.write_str("0");
    }
    if x < 0.0 {
        f.write_str("-")?;
    }

    let sci = format!("{:e}", x.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    // value = 0.<digits> * 10^n
    let n = exp.parse::<i32>().unwrap_or(0) + 1;
    let k = digits.len() as i32;

    if k <= n && n <= 21 {
        write!(f, "{}{}", digits, "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        write!(f, "{}.{}", int, frac)
    } else if -6 < n && n <= 0 {
        write!(f, "0.{}{}", "0".repeat((-n) as usize), digits)
    } else {
        let (lead, rest) = digits.split_at(1);
        let sign = if n > 0 { "+" } else { "-" };
        if rest.is_empty() {
            write!(f, "{}e{}{}", lead, sign, (n - 1).abs())
        } else {
            write!(f, "{}.{}e{}{}", lead, rest, sign, (n - 1).abs())
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::UInt(u) => write!(f, "{}", u),
            Value::Float(x) => write_number(f, *x),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Text(s),
            // nested structures are shown as their compact JSON text
            nested => Value::Text(nested.to_string()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// A flat record: field names in a fixed order, each mapped to a scalar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Record {
        Record { fields: Vec::new() }
    }

    /// Sets `name` to `value`. An existing field keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Record {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.iter().map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Builds a record from a JSON object, keeping the object's key order.
    pub fn from_object(object: serde_json::Map<String, serde_json::Value>) -> Record {
        object.into_iter().collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

pub type RecordSet = Vec<Record>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_key_order_is_kept() {
        let serde_json::Value::Object(object) = json!({"zeta": 1, "alpha": "a", "mid": true})
        else {
            unreachable!()
        };
        let record = Record::from_object(object);
        assert_eq!(record.keys().collect::<Vec<_>>(), ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut record: Record = [("name", "Pablo"), ("qty", "3")].into_iter().collect();
        record.insert("name", "Robson");
        assert_eq!(record.keys().collect::<Vec<_>>(), ["name", "qty"]);
        assert_eq!(record.get("name"), Some(&Value::from("Robson")));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn textual_forms() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Float(3.0).to_string(), "3");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::from(json!(18446744073709551615u64)).to_string(), "18446744073709551615");
        assert_eq!(Value::from(json!(-7)).to_string(), "-7");
        assert_eq!(Value::from(json!({"a": [1, 2]})).to_string(), r#"{"a":[1,2]}"#);
    }

    #[test]
    fn floats_follow_browser_number_text() {
        let cases = [
            (3.0, "3"),
            (-2.5, "-2.5"),
            (123.456, "123.456"),
            (0.1, "0.1"),
            (0.000001, "0.000001"),
            (1e-7, "1e-7"),
            (1.5e-10, "1.5e-10"),
            (1e20, "100000000000000000000"),
            (1e21, "1e+21"),
            (1.5e300, "1.5e+300"),
            (-0.0, "0"),
            (f64::NAN, "NaN"),
            (f64::NEG_INFINITY, "-Infinity"),
        ];
        for (x, text) in cases {
            assert_eq!(Value::from(x).to_string(), text, "{:?}", x);
        }
    }

    #[test]
    fn scalar_conversions() {
        let record: Record = [
            ("id", Value::from(7i64)),
            ("price", Value::from(12.0)),
            ("active", Value::from(false)),
        ]
        .into_iter()
        .collect();
        let pairs: Vec<(&str, String)> = record.iter().map(|(k, v)| (k, v.to_string())).collect();
        assert_eq!(
            pairs,
            [("id", "7".to_owned()), ("price", "12".to_owned()), ("active", "false".to_owned())]
        );
        assert!(!record.is_empty());
        assert!(Record::new().is_empty());
    }
}
