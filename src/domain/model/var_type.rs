use serde::{Deserialize, Serialize};

/// Editor-level type marker for workflow variables.
///
/// Wire names follow the workflow DSL (`array[string]`, ...). The snake-case
/// spellings used by the engine are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum VarType {
    #[default]
    #[serde(rename = "string")]
    String,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "secret")]
    Secret,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "object")]
    Object,
    #[serde(rename = "file")]
    File,
    #[serde(rename = "array")]
    Array,
    #[serde(rename = "array[string]", alias = "array_string")]
    ArrayString,
    #[serde(rename = "array[number]", alias = "array_number")]
    ArrayNumber,
    #[serde(rename = "array[object]", alias = "array_object")]
    ArrayObject,
    #[serde(rename = "array[file]", alias = "array_file")]
    ArrayFile,
    #[serde(rename = "any")]
    Any,
}

impl VarType {
    pub fn from_dsl_type(t: &str) -> Option<Self> {
        match t.trim().to_lowercase().as_str() {
            "string" => Some(VarType::String),
            "number" => Some(VarType::Number),
            "secret" => Some(VarType::Secret),
            "boolean" => Some(VarType::Boolean),
            "object" => Some(VarType::Object),
            "file" => Some(VarType::File),
            "array" => Some(VarType::Array),
            "array[string]" | "array_string" => Some(VarType::ArrayString),
            "array[number]" | "array_number" => Some(VarType::ArrayNumber),
            "array[object]" | "array_object" => Some(VarType::ArrayObject),
            "array[file]" | "array_file" => Some(VarType::ArrayFile),
            "any" => Some(VarType::Any),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VarType::String => "string",
            VarType::Number => "number",
            VarType::Secret => "secret",
            VarType::Boolean => "boolean",
            VarType::Object => "object",
            VarType::File => "file",
            VarType::Array => "array",
            VarType::ArrayString => "array[string]",
            VarType::ArrayNumber => "array[number]",
            VarType::ArrayObject => "array[object]",
            VarType::ArrayFile => "array[file]",
            VarType::Any => "any",
        }
    }

    /// Whether values of this type can be iterated over.
    pub fn is_array(&self) -> bool {
        matches!(
            self,
            VarType::Array
                | VarType::ArrayString
                | VarType::ArrayNumber
                | VarType::ArrayObject
                | VarType::ArrayFile
        )
    }

    /// Element type seen by the iteration body for a collection of this type.
    pub fn item_type(&self) -> VarType {
        match self {
            VarType::ArrayString => VarType::String,
            VarType::ArrayNumber => VarType::Number,
            VarType::ArrayObject => VarType::Object,
            VarType::ArrayFile => VarType::File,
            _ => VarType::Any,
        }
    }
}

impl std::fmt::Display for VarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
