//! Tree-walking interpreter over the OXC expression AST.

use std::cmp::Ordering;

use oxc_ast::ast::{
    ArrayExpressionElement, BinaryOperator, ChainElement, ComputedMemberExpression, Expression,
    LogicalOperator, ObjectPropertyKind, PropertyKey, StaticMemberExpression, UnaryOperator,
};
use tessera_tile::{Scope, Value};

use super::{EvalError, EvalResult};
use crate::value::{
    compare, loose_equals, number, strict_equals, stringify, to_number, truthy, type_of,
};

/// Name under which the whole scope is visible.
pub const SCOPE_ROOT: &str = "$scope";

const UNDEFINED: &str = "undefined";

pub(crate) fn evaluate(expr: &Expression<'_>, scope: &Scope) -> EvalResult<Value> {
    match expr {
        Expression::BooleanLiteral(b) => Ok(Value::Bool(b.value)),
        Expression::NullLiteral(_) => Ok(Value::Null),
        Expression::NumericLiteral(n) => Ok(number(n.value)),
        Expression::StringLiteral(s) => Ok(Value::String(s.value.to_string())),
        Expression::Identifier(id) => lookup(scope, id.name.as_str()),

        Expression::TemplateLiteral(template) => {
            let mut out = String::new();
            let mut parts = template.expressions.iter();
            for quasi in template.quasis.iter() {
                let text = quasi.value.cooked.as_ref().unwrap_or(&quasi.value.raw);
                out.push_str(text.as_str());
                if let Some(part) = parts.next() {
                    out.push_str(&stringify(&evaluate(part, scope)?));
                }
            }
            Ok(Value::String(out))
        }

        Expression::ArrayExpression(array) => {
            let mut items = Vec::with_capacity(array.elements.len());
            for element in array.elements.iter() {
                match element {
                    ArrayExpressionElement::SpreadElement(spread) => {
                        match evaluate(&spread.argument, scope)? {
                            Value::Array(spread) => items.extend(spread),
                            Value::String(s) => {
                                items.extend(s.chars().map(|c| Value::String(c.to_string())))
                            }
                            other => {
                                return Err(EvalError::Type {
                                    message: format!("{} is not iterable", stringify(&other)),
                                })
                            }
                        }
                    }
                    ArrayExpressionElement::Elision(_) => items.push(Value::Null),
                    _ => match element.as_expression() {
                        Some(item) => items.push(evaluate(item, scope)?),
                        None => items.push(Value::Null),
                    },
                }
            }
            Ok(Value::Array(items))
        }

        Expression::ObjectExpression(object) => {
            let mut map = Scope::new();
            for property in object.properties.iter() {
                match property {
                    ObjectPropertyKind::ObjectProperty(p) => {
                        let key = match &p.key {
                            PropertyKey::StaticIdentifier(id) => id.name.to_string(),
                            key => match key.as_expression() {
                                Some(key) => stringify(&evaluate(key, scope)?),
                                None => return Err(unsupported()),
                            },
                        };
                        map.insert(key, evaluate(&p.value, scope)?);
                    }
                    ObjectPropertyKind::SpreadProperty(spread) => {
                        if let Value::Object(entries) = evaluate(&spread.argument, scope)? {
                            map.extend(entries);
                        }
                    }
                }
            }
            Ok(Value::Object(map))
        }

        Expression::StaticMemberExpression(member) => {
            Ok(static_member(member, scope)?.unwrap_or_default())
        }
        Expression::ComputedMemberExpression(member) => {
            Ok(computed_member(member, scope)?.unwrap_or_default())
        }
        Expression::ChainExpression(chain) => {
            let value = match &chain.expression {
                ChainElement::StaticMemberExpression(member) => static_member(member, scope)?,
                ChainElement::ComputedMemberExpression(member) => computed_member(member, scope)?,
                ChainElement::TSNonNullExpression(inner) => chain_part(&inner.expression, scope)?,
                _ => return Err(unsupported()),
            };
            Ok(value.unwrap_or_default())
        }

        Expression::UnaryExpression(unary) => {
            if unary.operator == UnaryOperator::Typeof {
                if let Expression::Identifier(id) = &unary.argument {
                    if !is_defined(scope, id.name.as_str()) {
                        return Ok(Value::from(UNDEFINED));
                    }
                }
            }
            let value = evaluate(&unary.argument, scope)?;
            match unary.operator {
                UnaryOperator::LogicalNot => Ok(Value::Bool(!truthy(&value))),
                UnaryOperator::UnaryNegation => Ok(number(-to_number(&value).unwrap_or(f64::NAN))),
                UnaryOperator::UnaryPlus => Ok(number(to_number(&value).unwrap_or(f64::NAN))),
                UnaryOperator::Typeof => Ok(Value::from(type_of(&value))),
                UnaryOperator::Void => Ok(Value::Null),
                _ => Err(unsupported()),
            }
        }
        Expression::BinaryExpression(expr) => {
            let left = evaluate(&expr.left, scope)?;
            let right = evaluate(&expr.right, scope)?;
            binary(expr.operator, &left, &right)
        }
        Expression::LogicalExpression(logical) => {
            let left = evaluate(&logical.left, scope)?;
            let short_circuit = match logical.operator {
                LogicalOperator::And => !truthy(&left),
                LogicalOperator::Or => truthy(&left),
                LogicalOperator::Coalesce => !left.is_null(),
            };
            if short_circuit {
                Ok(left)
            } else {
                evaluate(&logical.right, scope)
            }
        }
        Expression::ConditionalExpression(conditional) => {
            if truthy(&evaluate(&conditional.test, scope)?) {
                evaluate(&conditional.consequent, scope)
            } else {
                evaluate(&conditional.alternate, scope)
            }
        }
        Expression::ParenthesizedExpression(paren) => evaluate(&paren.expression, scope),

        Expression::TSAsExpression(ts) => evaluate(&ts.expression, scope),
        Expression::TSSatisfiesExpression(ts) => evaluate(&ts.expression, scope),
        Expression::TSNonNullExpression(ts) => evaluate(&ts.expression, scope),

        _ => Err(unsupported()),
    }
}

/// Evaluate one link of an optional chain; `None` means the chain
/// short-circuited on a nullish `?.` object.
fn chain_part(expr: &Expression<'_>, scope: &Scope) -> EvalResult<Option<Value>> {
    match expr {
        Expression::StaticMemberExpression(member) => static_member(member, scope),
        Expression::ComputedMemberExpression(member) => computed_member(member, scope),
        Expression::TSNonNullExpression(ts) => chain_part(&ts.expression, scope),
        _ => evaluate(expr, scope).map(Some),
    }
}

fn static_member(
    member: &StaticMemberExpression<'_>,
    scope: &Scope,
) -> EvalResult<Option<Value>> {
    let Some(object) = chain_part(&member.object, scope)? else {
        return Ok(None);
    };
    if member.optional && object.is_null() {
        return Ok(None);
    }
    property(&object, member.property.name.as_str()).map(Some)
}

fn computed_member(
    member: &ComputedMemberExpression<'_>,
    scope: &Scope,
) -> EvalResult<Option<Value>> {
    let Some(object) = chain_part(&member.object, scope)? else {
        return Ok(None);
    };
    if member.optional && object.is_null() {
        return Ok(None);
    }
    let index = evaluate(&member.expression, scope)?;
    match (&object, &index) {
        (Value::Array(items), Value::Number(n)) => Ok(Some(
            n.as_u64()
                .and_then(|i| items.get(i as usize))
                .cloned()
                .unwrap_or(Value::Null),
        )),
        _ => property(&object, &stringify(&index)).map(Some),
    }
}

fn is_defined(scope: &Scope, name: &str) -> bool {
    name == SCOPE_ROOT || name == UNDEFINED || scope.contains_key(name)
}

fn lookup(scope: &Scope, name: &str) -> EvalResult<Value> {
    if let Some(value) = scope.get(name) {
        return Ok(value.clone());
    }
    match name {
        SCOPE_ROOT => Ok(Value::Object(scope.clone())),
        UNDEFINED => Ok(Value::Null),
        _ => Err(EvalError::UndefinedName { name: name.into() }),
    }
}

fn property(object: &Value, property: &str) -> EvalResult<Value> {
    match object {
        Value::Null => Err(EvalError::Type {
            message: format!("Cannot read properties of undefined (reading '{property}')"),
        }),
        Value::Object(map) => Ok(map.get(property).cloned().unwrap_or(Value::Null)),
        Value::Array(items) => Ok(match property {
            "length" => Value::from(items.len()),
            _ => property
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get(i))
                .cloned()
                .unwrap_or(Value::Null),
        }),
        Value::String(s) => Ok(match property {
            "length" => Value::from(s.encode_utf16().count()),
            _ => property
                .parse::<usize>()
                .ok()
                .and_then(|i| s.chars().nth(i))
                .map(|c| Value::String(c.to_string()))
                .unwrap_or(Value::Null),
        }),
        Value::Bool(_) | Value::Number(_) => Ok(Value::Null),
    }
}

fn binary(operator: BinaryOperator, left: &Value, right: &Value) -> EvalResult<Value> {
    let numeric = |f: fn(f64, f64) -> f64| match (to_number(left), to_number(right)) {
        (Some(a), Some(b)) => number(f(a, b)),
        _ => Value::Null,
    };
    let ordered =
        |accept: fn(Ordering) -> bool| Value::Bool(compare(left, right).is_some_and(accept));

    Ok(match operator {
        BinaryOperator::Addition => {
            let concatenates =
                |v: &Value| matches!(v, Value::String(_) | Value::Array(_) | Value::Object(_));
            if concatenates(left) || concatenates(right) {
                Value::String(stringify(left) + &stringify(right))
            } else {
                numeric(|a, b| a + b)
            }
        }
        BinaryOperator::Subtraction => numeric(|a, b| a - b),
        BinaryOperator::Multiplication => numeric(|a, b| a * b),
        BinaryOperator::Division => numeric(|a, b| a / b),
        BinaryOperator::Remainder => numeric(|a, b| a % b),
        BinaryOperator::Exponential => numeric(f64::powf),
        BinaryOperator::LessThan => ordered(|o| o == Ordering::Less),
        BinaryOperator::LessEqualThan => ordered(|o| o != Ordering::Greater),
        BinaryOperator::GreaterThan => ordered(|o| o == Ordering::Greater),
        BinaryOperator::GreaterEqualThan => ordered(|o| o != Ordering::Less),
        BinaryOperator::Equality => Value::Bool(loose_equals(left, right)),
        BinaryOperator::Inequality => Value::Bool(!loose_equals(left, right)),
        BinaryOperator::StrictEquality => Value::Bool(strict_equals(left, right)),
        BinaryOperator::StrictInequality => Value::Bool(!strict_equals(left, right)),
        _ => return Err(unsupported()),
    })
}

fn unsupported() -> EvalError {
    EvalError::Syntax {
        message: "This expression is not supported".to_string(),
    }
}
