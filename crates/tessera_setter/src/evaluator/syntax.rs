//! Expression parsing with OXC and the check for the supported subset.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    ArrayExpressionElement, BinaryOperator, ChainElement, Expression, ObjectPropertyKind,
    PropertyKey, UnaryOperator,
};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType};

use super::{EvalError, EvalResult};

/// Deepest nesting the checker accepts.
pub(crate) const MAX_DEPTH: usize = 64;

/// Parse `source` and verify every node is side-effect free.
pub(crate) fn parse<'a>(allocator: &'a Allocator, source: &'a str) -> EvalResult<Expression<'a>> {
    let source_type = SourceType::from_path("expression.ts").unwrap_or_default();
    let expr = Parser::new(allocator, source, source_type)
        .parse_expression()
        .map_err(|errors| EvalError::Syntax {
            message: errors
                .first()
                .map_or_else(|| "Invalid expression".to_string(), ToString::to_string),
        })?;
    check(&expr, source, 0)?;
    Ok(expr)
}

fn check(expr: &Expression<'_>, source: &str, depth: usize) -> EvalResult<()> {
    if depth > MAX_DEPTH {
        return Err(EvalError::Syntax {
            message: format!("Expression is nested more than {MAX_DEPTH} levels deep"),
        });
    }
    let depth = depth + 1;

    match expr {
        Expression::BooleanLiteral(_)
        | Expression::NullLiteral(_)
        | Expression::NumericLiteral(_)
        | Expression::StringLiteral(_)
        | Expression::Identifier(_) => Ok(()),

        Expression::TemplateLiteral(template) => template
            .expressions
            .iter()
            .try_for_each(|part| check(part, source, depth)),

        Expression::ArrayExpression(array) => {
            for element in array.elements.iter() {
                match element {
                    ArrayExpressionElement::SpreadElement(spread) => {
                        check(&spread.argument, source, depth)?
                    }
                    ArrayExpressionElement::Elision(_) => {}
                    _ => {
                        if let Some(item) = element.as_expression() {
                            check(item, source, depth)?;
                        }
                    }
                }
            }
            Ok(())
        }

        Expression::ObjectExpression(object) => {
            for property in object.properties.iter() {
                match property {
                    ObjectPropertyKind::ObjectProperty(p) => {
                        if let PropertyKey::PrivateIdentifier(_) = &p.key {
                            return Err(unsupported(expr, source));
                        }
                        if p.computed {
                            if let Some(key) = p.key.as_expression() {
                                check(key, source, depth)?;
                            }
                        }
                        check(&p.value, source, depth)?;
                    }
                    ObjectPropertyKind::SpreadProperty(spread) => {
                        check(&spread.argument, source, depth)?;
                    }
                }
            }
            Ok(())
        }

        Expression::StaticMemberExpression(member) => check(&member.object, source, depth),
        Expression::ComputedMemberExpression(member) => {
            check(&member.object, source, depth)?;
            check(&member.expression, source, depth)
        }
        Expression::ChainExpression(chain) => match &chain.expression {
            ChainElement::StaticMemberExpression(member) => check(&member.object, source, depth),
            ChainElement::ComputedMemberExpression(member) => {
                check(&member.object, source, depth)?;
                check(&member.expression, source, depth)
            }
            ChainElement::TSNonNullExpression(inner) => check(&inner.expression, source, depth),
            _ => Err(unsupported(expr, source)),
        },

        Expression::UnaryExpression(unary) => match unary.operator {
            UnaryOperator::LogicalNot
            | UnaryOperator::UnaryNegation
            | UnaryOperator::UnaryPlus
            | UnaryOperator::Typeof
            | UnaryOperator::Void => check(&unary.argument, source, depth),
            _ => Err(unsupported(expr, source)),
        },
        Expression::BinaryExpression(binary) => {
            if !is_supported_binary(binary.operator) {
                return Err(unsupported(expr, source));
            }
            check(&binary.left, source, depth)?;
            check(&binary.right, source, depth)
        }
        Expression::LogicalExpression(logical) => {
            check(&logical.left, source, depth)?;
            check(&logical.right, source, depth)
        }
        Expression::ConditionalExpression(conditional) => {
            check(&conditional.test, source, depth)?;
            check(&conditional.consequent, source, depth)?;
            check(&conditional.alternate, source, depth)
        }
        Expression::ParenthesizedExpression(paren) => check(&paren.expression, source, depth),

        // Type-only wrappers
        Expression::TSAsExpression(ts) => check(&ts.expression, source, depth),
        Expression::TSSatisfiesExpression(ts) => check(&ts.expression, source, depth),
        Expression::TSNonNullExpression(ts) => check(&ts.expression, source, depth),

        _ => Err(unsupported(expr, source)),
    }
}

pub(crate) fn is_supported_binary(operator: BinaryOperator) -> bool {
    matches!(
        operator,
        BinaryOperator::Addition
            | BinaryOperator::Subtraction
            | BinaryOperator::Multiplication
            | BinaryOperator::Division
            | BinaryOperator::Remainder
            | BinaryOperator::Exponential
            | BinaryOperator::LessThan
            | BinaryOperator::LessEqualThan
            | BinaryOperator::GreaterThan
            | BinaryOperator::GreaterEqualThan
            | BinaryOperator::Equality
            | BinaryOperator::Inequality
            | BinaryOperator::StrictEquality
            | BinaryOperator::StrictInequality
    )
}

fn unsupported(expr: &Expression<'_>, source: &str) -> EvalError {
    let span = expr.span();
    let text = source
        .get(span.start as usize..span.end as usize)
        .unwrap_or(source);
    let what = match expr {
        Expression::CallExpression(_)
        | Expression::NewExpression(_)
        | Expression::TaggedTemplateExpression(_)
        | Expression::ChainExpression(_) => "Calls are",
        Expression::AssignmentExpression(_) | Expression::UpdateExpression(_) => {
            "Assignments are"
        }
        Expression::ArrowFunctionExpression(_) | Expression::FunctionExpression(_) => {
            "Functions are"
        }
        _ => "This expression is",
    };
    EvalError::Syntax {
        message: format!("{what} not supported: `{text}`"),
    }
}
