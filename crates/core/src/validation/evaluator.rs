//! Rule evaluator -- pure logic, no I/O.
//!
//! Each field in the rule set is checked independently and reports at most
//! one error: the first violated constraint in the order
//! required -> integer -> min -> max -> max_items -> min_length -> max_length -> pattern.

use serde_json::{Map, Value};

use super::rules::{Constraint, Rule, RuleSet, ValidationContext, ValidationErrors};

/// Evaluate every rule in `rules` against `values`.
///
/// Missing keys in `values` are treated as empty. Fields that have no rule
/// are ignored.
pub fn validate(
    values: &Map<String, Value>,
    rules: &RuleSet,
    ctx: &ValidationContext,
) -> ValidationErrors {
    debug_assert!(
        rules.dangling_dependencies().is_empty(),
        "required_when references unknown fields: {:?}",
        rules.dangling_dependencies()
    );

    rules
        .iter()
        .filter_map(|(field, rule)| {
            check_field(rule, values.get(field), values, ctx).map(|constraint| {
                (
                    field.clone(),
                    ctx.messages.for_constraint(constraint).to_string(),
                )
            })
        })
        .collect()
}

/// [`validate`] with the current calendar year and default messages.
pub fn validate_now(values: &Map<String, Value>, rules: &RuleSet) -> ValidationErrors {
    validate(values, rules, &ValidationContext::now())
}

/// Whether a value counts as "not provided".
pub fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

fn is_required(rule: &Rule, values: &Map<String, Value>) -> bool {
    rule.required
        || rule.required_when.iter().any(|(dep, triggers)| {
            values
                .get(dep)
                .is_some_and(|current| triggers.contains(current))
        })
}

fn check_field(
    rule: &Rule,
    value: Option<&Value>,
    values: &Map<String, Value>,
    ctx: &ValidationContext,
) -> Option<Constraint> {
    let value = match value {
        v if is_empty(v) => {
            return is_required(rule, values).then_some(Constraint::Required);
        }
        Some(v) => v,
        None => return None,
    };

    let number = value.as_f64();

    if rule.integer && number.is_some_and(|n| n.fract() != 0.0) {
        return Some(Constraint::Integer);
    }

    if let (Some(min), Some(n)) = (rule.min, number) {
        if n < min.resolve(ctx.current_year) {
            return Some(Constraint::Min);
        }
    }

    if let (Some(max), Some(n)) = (rule.max, number) {
        if n > max.resolve(ctx.current_year) {
            return Some(Constraint::Max);
        }
    }

    if let (Some(limit), Value::Array(items)) = (rule.max_items, value) {
        if items.len() > limit {
            return Some(Constraint::MaxItems);
        }
    }

    if let Value::String(s) = value {
        let len = s.chars().count();
        if rule.min_length.is_some_and(|min| len < min) {
            return Some(Constraint::MinLength);
        }
        if rule.max_length.is_some_and(|max| len > max) {
            return Some(Constraint::MaxLength);
        }
        if rule.pattern.as_ref().is_some_and(|p| !p.is_match(s)) {
            return Some(Constraint::Pattern);
        }
    }

    None
}
