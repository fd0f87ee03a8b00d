//! TypeScript-specific tree-sitter configuration
//!
//! Constants for the node and field names of the tree-sitter-typescript
//! grammar that the instrumentation pass inspects, plus small predicates over
//! them.

use lazy_static::lazy_static;
use std::collections::HashSet;

/// TypeScript tree-sitter node kinds
///
/// These constants match the exact node type names from tree-sitter-typescript grammar.
/// Source: https://github.com/tree-sitter/tree-sitter-typescript/blob/master/common/define-grammar.js
pub mod node_kinds {
    // Declarations
    pub const VARIABLE_DECLARATOR: &str = "variable_declarator";
    pub const PUBLIC_FIELD_DEFINITION: &str = "public_field_definition";
    pub const FUNCTION_DECLARATION: &str = "function_declaration";
    pub const GENERATOR_FUNCTION_DECLARATION: &str = "generator_function_declaration";
    pub const CLASS_DECLARATION: &str = "class_declaration";
    pub const ABSTRACT_CLASS_DECLARATION: &str = "abstract_class_declaration";
    pub const REQUIRED_PARAMETER: &str = "required_parameter";
    pub const OPTIONAL_PARAMETER: &str = "optional_parameter";
    pub const ARROW_FUNCTION: &str = "arrow_function";

    // Patterns
    pub const SHORTHAND_PROPERTY_IDENTIFIER_PATTERN: &str = "shorthand_property_identifier_pattern";

    // Import
    pub const IMPORT_STATEMENT: &str = "import_statement";
    pub const IMPORT_CLAUSE: &str = "import_clause";
    pub const NAMED_IMPORTS: &str = "named_imports";
    pub const NAMESPACE_IMPORT: &str = "namespace_import";

    // Expressions
    pub const CALL_EXPRESSION: &str = "call_expression";
    pub const ARGUMENTS: &str = "arguments";
    pub const IDENTIFIER: &str = "identifier";
    pub const OBJECT: &str = "object";

    // Types
    pub const TYPE_ANNOTATION: &str = "type_annotation";
}

/// Field names used to address children
pub mod fields {
    pub const FUNCTION: &str = "function";
    pub const ARGUMENTS: &str = "arguments";
    pub const OBJECT: &str = "object";
    pub const PROPERTY: &str = "property";
    pub const CONSTRUCTOR: &str = "constructor";
    pub const TYPE_ARGUMENTS: &str = "type_arguments";
    pub const NAME: &str = "name";
    pub const VALUE: &str = "value";
    pub const TYPE: &str = "type";
    pub const PATTERN: &str = "pattern";
    pub const SOURCE: &str = "source";
    pub const ALIAS: &str = "alias";
    pub const PARAMETER: &str = "parameter";
    /// Default value of an assignment pattern
    pub const RIGHT: &str = "right";
}

lazy_static! {
    /// Field modifiers that make a class field impossible to initialize
    pub static ref NON_INITIALIZABLE_FIELD_MODIFIERS: HashSet<&'static str> = {
        let mut set = HashSet::new();
        set.insert("abstract");
        set.insert("declare");
        // definite assignment assertion `x!: T`
        set.insert("!");
        set
    };
}

/// Check if the modifiers of a field allow an initializer
pub fn is_initializable_field<'a>(modifier_tokens: impl IntoIterator<Item = &'a str>) -> bool {
    !modifier_tokens
        .into_iter()
        .any(|token| NON_INITIALIZABLE_FIELD_MODIFIERS.contains(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initializable_field() {
        assert!(is_initializable_field(["private", "readonly"]));
        assert!(!is_initializable_field(["declare"]));
        assert!(!is_initializable_field(["protected", "abstract"]));
        assert!(!is_initializable_field(["!"]));
    }
}
