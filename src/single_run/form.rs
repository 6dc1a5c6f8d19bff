use serde_json::{Map, Value};

/// Values typed into the single-run form of an iteration node.
///
/// The iterator input lives under its own key next to the per-variable
/// fields; replacing the variable fields never drops it.
#[derive(Debug, Clone, PartialEq)]
pub struct RunInputForm {
    iterator_key: String,
    values: Map<String, Value>,
}

impl RunInputForm {
    pub fn new(iterator_key: impl Into<String>) -> Self {
        let iterator_key = iterator_key.into();
        let mut values = Map::new();
        values.insert(
            iterator_key.clone(),
            Value::Array(vec![Value::String(String::new())]),
        );
        Self {
            iterator_key,
            values,
        }
    }

    pub fn iterator_key(&self) -> &str {
        &self.iterator_key
    }

    /// All form values, iterator included.
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn input_var_values(&self) -> Map<String, Value> {
        self.values
            .iter()
            .filter(|(k, _)| **k != self.iterator_key)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn set_input_var_values(&mut self, values: Map<String, Value>) {
        let iterator = self.values.remove(&self.iterator_key);
        self.values = values;
        self.values.remove(&self.iterator_key);
        if let Some(iterator) = iterator {
            self.values.insert(self.iterator_key.clone(), iterator);
        }
    }

    pub fn iterator(&self) -> &[Value] {
        self.values
            .get(&self.iterator_key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn set_iterator(&mut self, items: Vec<Value>) {
        self.values
            .insert(self.iterator_key.clone(), Value::Array(items));
    }
}
