//! JSON interchange for nodes.
//!
//! Strings, numbers and booleans become primitives, arrays become unnamed
//! lists and maps become unnamed objects. A map carrying the reserved key
//! `"$name"` describes a named node: with an `"$items"` array it is a named
//! list, otherwise a named object whose other keys are its properties.
//!
//! ```rust
//! use sutra_construct::ast::Node;
//! let json = serde_json::json!({ "$name": "+", "$items": ["1", "2"] });
//! let node = Node::from_json(&json).unwrap();
//! assert_eq!(node, Node::named_list("+", [Node::value("1"), Node::value("2")]));
//! assert_eq!(node.to_json(), json);
//! ```

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::Node;
use crate::errors::CoerceError;

pub const NAME_KEY: &str = "$name";
pub const ITEMS_KEY: &str = "$items";

impl Node {
    pub fn from_json(value: &Value) -> Result<Node, CoerceError> {
        match value {
            Value::Null => Err(CoerceError::UnsupportedJson { kind: "null" }),
            Value::Bool(b) => Ok(Node::value(b.to_string())),
            Value::Number(n) => Ok(Node::value(n.to_string())),
            Value::String(s) => Ok(Node::value(s.clone())),
            Value::Array(items) => Ok(Node::list(
                items
                    .iter()
                    .map(Node::from_json)
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            Value::Object(map) => from_json_map(map),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Node::Primitive(p) => Value::String(p.value().to_string()),
            Node::List(l) => {
                let items = Value::Array(l.iter().map(Node::to_json).collect());
                match l.name() {
                    None => items,
                    Some(name) => {
                        let mut map = Map::new();
                        map.insert(NAME_KEY.to_string(), Value::String(name.to_string()));
                        map.insert(ITEMS_KEY.to_string(), items);
                        Value::Object(map)
                    }
                }
            }
            Node::Object(o) => {
                let mut map = Map::new();
                if let Some(name) = o.name() {
                    map.insert(NAME_KEY.to_string(), Value::String(name.to_string()));
                }
                for (key, value) in o.properties() {
                    map.insert(key.to_string(), value.to_json());
                }
                Value::Object(map)
            }
        }
    }
}

fn from_json_map(map: &Map<String, Value>) -> Result<Node, CoerceError> {
    let name = match map.get(NAME_KEY) {
        None => None,
        Some(Value::String(name)) => Some(name.clone()),
        Some(_) => return Err(CoerceError::UnsupportedJson { kind: "non-string name" }),
    };
    if let (Some(name), Some(items)) = (&name, map.get(ITEMS_KEY)) {
        let Value::Array(items) = items else {
            return Err(CoerceError::UnsupportedJson { kind: "non-array items" });
        };
        let items = items
            .iter()
            .map(Node::from_json)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Node::named_list(name.clone(), items));
    }
    let properties = map
        .iter()
        .filter(|(key, _)| key.as_str() != NAME_KEY)
        .map(|(key, value)| Ok((key.clone(), Node::from_json(value)?)))
        .collect::<Result<Vec<_>, CoerceError>>()?;
    Ok(match name {
        Some(name) => Node::named_object(name, properties),
        None => Node::object(properties),
    })
}

impl TryFrom<&Value> for Node {
    type Error = CoerceError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Node::from_json(value)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Node::from_json(&value).map_err(D::Error::custom)
    }
}
