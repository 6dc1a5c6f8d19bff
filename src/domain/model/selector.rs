use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// An ordered variable path, e.g. `["llm_1", "text"]` or `["sys", "query"]`.
///
/// Unlike the engine's two-part selector, the editor keeps every segment so
/// that nested object fields and file attributes stay addressable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ValueSelector(Vec<String>);

impl ValueSelector {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn parse_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(arr) => {
                let mut parts = Vec::with_capacity(arr.len());
                for v in arr {
                    let s = v.as_str()?;
                    if !s.is_empty() {
                        parts.push(s.to_string());
                    }
                }
                Some(Self(parts))
            }
            Value::String(s) => Some(Self::parse_str(s)),
            _ => None,
        }
    }

    pub fn parse_str(selector: &str) -> Self {
        Self(
            selector
                .split('.')
                .filter(|p| !p.is_empty())
                .map(|p| p.to_string())
                .collect(),
        )
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Segments joined with `.`; the key space of the single-run form.
    pub fn dotted(&self) -> String {
        self.0.join(".")
    }

    /// The selector without its last segment.
    pub fn parent(&self) -> Option<ValueSelector> {
        if self.0.len() < 2 {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for ValueSelector {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

impl From<&[&str]> for ValueSelector {
    fn from(value: &[&str]) -> Self {
        Self::new(value.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for ValueSelector {
    fn from(value: [&str; N]) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for ValueSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.dotted())
    }
}

impl Serialize for ValueSelector {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ValueSelector {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SelectorVisitor;

        impl<'de> serde::de::Visitor<'de> for SelectorVisitor {
            type Value = ValueSelector;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("selector string like 'node.var' or string array")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(ValueSelector::parse_str(v))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(ValueSelector::default())
            }

            fn visit_none<E>(self) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(ValueSelector::default())
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut parts = Vec::new();
                while let Some(value) = seq.next_element::<String>()? {
                    if !value.is_empty() {
                        parts.push(value);
                    }
                }
                Ok(ValueSelector(parts))
            }
        }

        deserializer.deserialize_any(SelectorVisitor)
    }
}
