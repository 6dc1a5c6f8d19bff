//! Comparison operators allowed per variable type.
//!
//! The first entry of every list is the default picked for new conditions.

use crate::domain::model::{ComparisonOperator, VarType};

use ComparisonOperator::*;

const STRING_OPERATORS: &[ComparisonOperator] = &[
    Contains, NotContains, StartWith, EndWith, Is, IsNot, Empty, NotEmpty, In, NotIn,
];

const NUMBER_OPERATORS: &[ComparisonOperator] = &[
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    Null,
    NotNull,
];

const BOOLEAN_OPERATORS: &[ComparisonOperator] = &[Is, IsNot, Null, NotNull];

const FILE_OPERATORS: &[ComparisonOperator] = &[Exists, NotExists];

const SCALAR_ARRAY_OPERATORS: &[ComparisonOperator] =
    &[Contains, NotContains, AllOf, Empty, NotEmpty, In, NotIn];

const FILE_ARRAY_OPERATORS: &[ComparisonOperator] =
    &[Contains, NotContains, AllOf, Empty, NotEmpty];

const EMPTINESS_OPERATORS: &[ComparisonOperator] = &[Empty, NotEmpty];

const ANY_OPERATORS: &[ComparisonOperator] = &[Is, IsNot, Empty, NotEmpty];

// File attributes.
const TEXT_ATTRIBUTE_OPERATORS: &[ComparisonOperator] =
    &[Contains, NotContains, StartWith, EndWith, Is, IsNot, Empty, NotEmpty];
const EXTENSION_OPERATORS: &[ComparisonOperator] = &[Is, IsNot, Contains, NotContains];
const ENUM_ATTRIBUTE_OPERATORS: &[ComparisonOperator] = &[In, NotIn];
const SIZE_OPERATORS: &[ComparisonOperator] =
    &[GreaterThan, GreaterOrEqual, LessThan, LessOrEqual];
const REDUCED_ATTRIBUTE_OPERATORS: &[ComparisonOperator] = &[Is, IsNot, Empty, NotEmpty];

/// Operators offered for a variable of `var_type`, or for the file attribute
/// `file_attribute_key` when one is given (the type is then ignored).
pub fn operators_for(
    var_type: VarType,
    file_attribute_key: Option<&str>,
) -> &'static [ComparisonOperator] {
    if let Some(key) = file_attribute_key {
        return match key {
            "name" | "url" | "mime_type" => TEXT_ATTRIBUTE_OPERATORS,
            "extension" => EXTENSION_OPERATORS,
            "type" | "transfer_method" => ENUM_ATTRIBUTE_OPERATORS,
            "size" => SIZE_OPERATORS,
            _ => REDUCED_ATTRIBUTE_OPERATORS,
        };
    }

    match var_type {
        VarType::String | VarType::Secret => STRING_OPERATORS,
        VarType::Number => NUMBER_OPERATORS,
        VarType::Boolean => BOOLEAN_OPERATORS,
        VarType::File => FILE_OPERATORS,
        VarType::ArrayString | VarType::ArrayNumber => SCALAR_ARRAY_OPERATORS,
        VarType::ArrayFile => FILE_ARRAY_OPERATORS,
        VarType::Array | VarType::ArrayObject | VarType::Object => EMPTINESS_OPERATORS,
        VarType::Any => ANY_OPERATORS,
    }
}

pub fn default_operator(var_type: VarType, file_attribute_key: Option<&str>) -> ComparisonOperator {
    operators_for(var_type, file_attribute_key)
        .first()
        .copied()
        .unwrap_or(ComparisonOperator::Is)
}

pub fn is_operator_allowed(
    operator: ComparisonOperator,
    var_type: VarType,
    file_attribute_key: Option<&str>,
) -> bool {
    operators_for(var_type, file_attribute_key).contains(&operator)
}
