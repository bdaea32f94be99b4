//! Knowledge base record types
//!
//! These mirror the shape of the component metadata files: every component
//! carries four attribute collections keyed by attribute name, in file order.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

/// The four attribute kinds a component exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Props,
    Slots,
    Events,
    Methods,
}

impl AttributeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeKind::Props => "props",
            AttributeKind::Slots => "slots",
            AttributeKind::Events => "events",
            AttributeKind::Methods => "methods",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-form type descriptor, a single name or a union
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueType(pub Vec<String>);

impl ValueType {
    /// Render the union joined with `sep`
    pub fn join(&self, sep: &str) -> String {
        self.0.join(sep)
    }

    /// True only for a plain, non-union `Boolean`
    pub fn is_boolean(&self) -> bool {
        self.0.len() == 1 && self.0[0] == "Boolean"
    }
}

impl<'de> Deserialize<'de> for ValueType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(String),
            Many(Vec<String>),
        }

        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(name) => ValueType(vec![name]),
            OneOrMany::Many(names) => ValueType(names),
        })
    }
}

/// A prop, slot, event or method entry
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub value_type: Option<ValueType>,

    #[serde(rename = "desc")]
    pub description: String,

    #[serde(rename = "default")]
    pub default_value: Option<Value>,

    /// Accepted literal values, still wrapped in their quotes
    #[serde(rename = "values")]
    pub accepted_literals: Option<Vec<String>>,

    pub examples: Option<Vec<String>>,

    pub category: Option<String>,

    pub internal: bool,

    /// `None`: absent. `Some(None)`: present but null.
    #[serde(rename = "params", deserialize_with = "present_or_null")]
    pub parameters: Option<Option<IndexMap<String, Value>>>,

    #[serde(rename = "returns", deserialize_with = "present_or_null")]
    pub return_type: Option<Option<IndexMap<String, Value>>>,
}

impl Attribute {
    /// Short label description: the type, or a rendered callable signature
    pub fn signature(&self) -> Option<String> {
        fn names(shape: &Option<IndexMap<String, Value>>) -> String {
            match shape {
                Some(map) => map.keys().cloned().collect::<Vec<_>>().join(", "),
                None => "void".to_string(),
            }
        }

        match (&self.parameters, &self.return_type) {
            (Some(params), Some(returns)) => {
                Some(format!("({}) => {}", names(params), names(returns)))
            }
            (Some(params), None) => Some(format!("({})", names(params))),
            _ => self.value_type.as_ref().map(|t| t.join(" | ")),
        }
    }

    /// Accepted literals with their enclosing quotes removed
    pub fn literal_values(&self) -> Vec<String> {
        self.accepted_literals
            .iter()
            .flatten()
            .map(|v| strip_quotes(v).to_string())
            .collect()
    }
}

/// Remove one pair of matching enclosing quotes
pub fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        if (first == b'\'' || first == b'"') && bytes[bytes.len() - 1] == first {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// A UI component and its attribute collections
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Component {
    pub internal: bool,
    pub props: IndexMap<String, Attribute>,
    pub slots: IndexMap<String, Attribute>,
    pub events: IndexMap<String, Attribute>,
    pub methods: IndexMap<String, Attribute>,
    pub mixins: Vec<String>,
    pub meta: Option<Value>,
}

impl Component {
    pub fn attributes(&self, kind: AttributeKind) -> &IndexMap<String, Attribute> {
        match kind {
            AttributeKind::Props => &self.props,
            AttributeKind::Slots => &self.slots,
            AttributeKind::Events => &self.events,
            AttributeKind::Methods => &self.methods,
        }
    }
}

/// Component-agnostic fallback name lists
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GenericLists {
    pub props: Vec<String>,
    pub slots: Vec<String>,
    pub events: Vec<String>,
    pub methods: Vec<String>,
}

impl GenericLists {
    pub fn get(&self, kind: AttributeKind) -> &[String] {
        match kind {
            AttributeKind::Props => &self.props,
            AttributeKind::Slots => &self.slots,
            AttributeKind::Events => &self.events,
            AttributeKind::Methods => &self.methods,
        }
    }
}
