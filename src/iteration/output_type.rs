use crate::domain::model::VarType;

/// Output type of an iteration whose per-run output has type `item_type`.
///
/// Scalars and objects are collected into the matching array type; arrays
/// keep their type. Anything else (or an unresolved selector) is treated as
/// `array[string]`.
pub fn promote(item_type: Option<VarType>) -> VarType {
    match item_type {
        Some(VarType::String) => VarType::ArrayString,
        Some(VarType::Number) => VarType::ArrayNumber,
        Some(VarType::Object) => VarType::ArrayObject,
        Some(VarType::File) => VarType::ArrayFile,
        Some(t) if t.is_array() => t,
        _ => VarType::ArrayString,
    }
}

/// Whether a variable may be picked as the iterator input.
pub fn filter_input_var(var_type: VarType) -> bool {
    var_type.is_array()
}
