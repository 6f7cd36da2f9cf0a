/// Entry-Point Resolver
///
/// Finds the name of the function the harness should call by matching the
/// submitted source text against two narrow patterns. This is not a parser:
///
/// 1. `function <ident>(` (also matches `async function <ident>(`)
/// 2. `const|let|var <ident> =` followed by `function`, `(...) =>` or `x =>`
///
/// The first pattern is tried over the whole text before the second, and the
/// first occurrence wins. Unsupported on purpose: several top-level
/// functions (the first declared one is picked, even when nested), class
/// methods, `export` forms, generator declarations and destructured bindings.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    static ref FUNCTION_DECLARATION: Regex =
        Regex::new(r"function\s+([a-zA-Z_$][a-zA-Z0-9_$]*)\s*\(").unwrap();
    static ref FUNCTION_BINDING: Regex = Regex::new(
        r"(?:const|let|var)\s+([a-zA-Z_$][a-zA-Z0-9_$]*)\s*=\s*(?:function|\([^)]*\)\s*=>|[a-zA-Z_$][a-zA-Z0-9_$]*\s*=>)"
    )
    .unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("No function found in code. Please define a function.")]
    NoFunction,
}

/// Resolve the entry point of a submission
pub fn resolve_entry_point(source: &str) -> Result<String, ResolveError> {
    [&*FUNCTION_DECLARATION, &*FUNCTION_BINDING]
        .iter()
        .find_map(|pattern| pattern.captures(source))
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str().to_string())
        .ok_or(ResolveError::NoFunction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_declaration() {
        let source = "function twoSum(nums, target) { return [0, 1]; }";
        assert_eq!(resolve_entry_point(source).unwrap(), "twoSum");
    }

    #[test]
    fn test_async_function_declaration() {
        let source = "async function fetchAll(urls) { return urls; }";
        assert_eq!(resolve_entry_point(source).unwrap(), "fetchAll");
    }

    #[test]
    fn test_identifier_charset() {
        let source = "function $_helper2 (a) { return a; }";
        assert_eq!(resolve_entry_point(source).unwrap(), "$_helper2");
    }

    #[test]
    fn test_function_expression_binding() {
        let source = "const add = function (a, b) { return a + b; };";
        assert_eq!(resolve_entry_point(source).unwrap(), "add");
    }

    #[test]
    fn test_parenthesized_arrow_binding() {
        assert_eq!(resolve_entry_point("let sum = (a, b) => a + b;").unwrap(), "sum");
        assert_eq!(resolve_entry_point("var noop = () => {};").unwrap(), "noop");
    }

    #[test]
    fn test_single_parameter_arrow_binding() {
        let source = "const double = x => x * 2;";
        assert_eq!(resolve_entry_point(source).unwrap(), "double");
    }

    #[test]
    fn test_declaration_wins_over_earlier_binding() {
        // Declarations are searched first across the whole source.
        let source = "const helper = (x) => x;\nfunction solve(x) { return helper(x); }";
        assert_eq!(resolve_entry_point(source).unwrap(), "solve");
    }

    #[test]
    fn test_first_declaration_wins() {
        let source = "function first() {}\nfunction second() {}";
        assert_eq!(resolve_entry_point(source).unwrap(), "first");
    }

    #[test]
    fn test_non_function_binding_is_ignored() {
        let source = "const limit = 10;\nconst clamp = (x) => Math.min(x, limit);";
        assert_eq!(resolve_entry_point(source).unwrap(), "clamp");
    }

    #[test]
    fn test_no_function_found() {
        let err = resolve_entry_point("const answer = 42;").unwrap_err();
        assert_eq!(err, ResolveError::NoFunction);
        assert_eq!(
            err.to_string(),
            "No function found in code. Please define a function."
        );
    }

    #[test]
    fn test_class_is_unsupported() {
        let source = "class Solver { solve(x) { return x; } }";
        assert!(resolve_entry_point(source).is_err());
    }

    #[test]
    fn test_generator_declaration_is_unsupported() {
        assert!(resolve_entry_point("function* numbers() { yield 1; }").is_err());
    }
}
