use crate::ast::{BlockStatement, Expression, InfixOperator, PrefixOperator, Program, Statement};
use crate::object::{builtins, Env, Environment, EvalError, EvalResult, Function, Object, NULL};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::trace;

/// Evaluates `program` in `env`. Failures come back as `Object::Error`, and a
/// top-level `return` yields its value directly.
pub fn eval(program: &Program, env: &Env) -> Object {
    eval_program(program, env).unwrap_or_else(Object::Error)
}

fn eval_program(program: &Program, env: &Env) -> EvalResult {
    let mut res = NULL;

    for statement in &program.statements {
        match eval_statement(statement, env)? {
            Object::Return(value) => return Ok(*value),
            obj => res = obj,
        }
    }

    Ok(res)
}

/// Unlike `eval_program`, a return signal is handed back still wrapped so
/// that it keeps bubbling until a call boundary.
fn eval_block_statement(block: &BlockStatement, env: &Env) -> EvalResult {
    let mut res = NULL;

    for statement in &block.statements {
        res = eval_statement(statement, env)?;

        if let Object::Return(_) = res {
            return Ok(res);
        }
    }

    Ok(res)
}

fn eval_statement(statement: &Statement, env: &Env) -> EvalResult {
    match statement {
        Statement::Expression(exp) => eval_expression(exp, env),
        Statement::Let(name, exp) => {
            let value = eval_expression(exp, env)?;
            env.borrow_mut().set(name, value);
            Ok(NULL)
        }
        Statement::Return(exp) => {
            let value = eval_expression(exp, env)?;
            Ok(Object::Return(Box::new(value)))
        }
    }
}

fn eval_expression(expression: &Expression, env: &Env) -> EvalResult {
    match expression {
        Expression::Identifier(name) => eval_identifier(name, env),
        Expression::IntegerLiteral(v) => Ok(Object::Integer(*v)),
        Expression::StringLiteral(s) => Ok(Object::String(s.clone())),
        Expression::Boolean(b) => Ok(Object::from(*b)),
        Expression::Prefix(operator, right) => {
            let right = eval_expression(right, env)?;
            eval_prefix_expression(*operator, right)
        }
        Expression::Infix(operator, left, right) => {
            let left = eval_expression(left, env)?;
            let right = eval_expression(right, env)?;
            eval_infix_expression(*operator, left, right)
        }
        Expression::If(condition, consequence, alternative) => {
            let condition = eval_expression(condition, env)?;

            if condition.is_truthy() {
                eval_block_statement(consequence, env)
            } else if let Some(alternative) = alternative {
                eval_block_statement(alternative, env)
            } else {
                Ok(NULL)
            }
        }
        Expression::FunctionLiteral(parameters, body) => Ok(Object::Function(Rc::new(Function {
            parameters: parameters.clone(),
            body: body.clone(),
            env: Rc::clone(env),
        }))),
        Expression::Call(function, arguments) => {
            let function = eval_expression(function, env)?;
            let args = eval_expressions(arguments, env)?;
            apply_function(function, args)
        }
    }
}

fn eval_identifier(name: &str, env: &Env) -> EvalResult {
    if let Some(value) = env.borrow().get(name) {
        return Ok(value);
    }

    builtins::lookup(name).ok_or_else(|| EvalError::IdentifierNotFound(name.to_string()))
}

/// Evaluates left to right, stopping at the first error.
fn eval_expressions(expressions: &[Expression], env: &Env) -> Result<Vec<Object>, EvalError> {
    expressions
        .iter()
        .map(|exp| eval_expression(exp, env))
        .collect()
}

fn eval_prefix_expression(operator: PrefixOperator, right: Object) -> EvalResult {
    match (operator, &right) {
        (PrefixOperator::Bang, _) => Ok(Object::from(!right.is_truthy())),
        (PrefixOperator::Minus, Object::Integer(v)) => v
            .checked_neg()
            .map(Object::Integer)
            .ok_or_else(|| EvalError::IntegerOverflow(format!("-({})", v))),
        (PrefixOperator::Minus, _) => Err(EvalError::UnsupportedPrefixOperator {
            operator,
            operand: right.type_name(),
        }),
    }
}

fn eval_infix_expression(operator: InfixOperator, left: Object, right: Object) -> EvalResult {
    match (&left, &right) {
        (Object::Integer(l), Object::Integer(r)) => eval_integer_infix_expression(operator, *l, *r),
        (Object::Boolean(l), Object::Boolean(r)) => match operator {
            InfixOperator::Eq => Ok(Object::from(l == r)),
            InfixOperator::NotEq => Ok(Object::from(l != r)),
            _ => Err(unsupported_infix(operator, &left, &right)),
        },
        (Object::String(l), Object::String(r)) => match operator {
            InfixOperator::Plus => Ok(Object::String(format!("{}{}", l, r))),
            _ => Err(unsupported_infix(operator, &left, &right)),
        },
        _ if left.type_name() != right.type_name() => Err(EvalError::TypeMismatch {
            operator,
            left: left.type_name(),
            right: right.type_name(),
        }),
        _ => Err(unsupported_infix(operator, &left, &right)),
    }
}

fn unsupported_infix(operator: InfixOperator, left: &Object, right: &Object) -> EvalError {
    EvalError::UnsupportedInfixOperator {
        operator,
        left: left.type_name(),
        right: right.type_name(),
    }
}

fn eval_integer_infix_expression(operator: InfixOperator, left: i64, right: i64) -> EvalResult {
    let arithmetic = |res: Option<i64>| {
        res.map(Object::Integer)
            .ok_or_else(|| EvalError::IntegerOverflow(format!("{} {} {}", left, operator, right)))
    };

    match operator {
        InfixOperator::Plus => arithmetic(left.checked_add(right)),
        InfixOperator::Minus => arithmetic(left.checked_sub(right)),
        InfixOperator::Asterisk => arithmetic(left.checked_mul(right)),
        InfixOperator::Slash => {
            if right == 0 {
                return Err(EvalError::DivisionByZero);
            }
            arithmetic(floor_div(left, right))
        }
        InfixOperator::Lt => Ok(Object::from(left < right)),
        InfixOperator::Gt => Ok(Object::from(left > right)),
        InfixOperator::Eq => Ok(Object::from(left == right)),
        InfixOperator::NotEq => Ok(Object::from(left != right)),
    }
}

/// Division rounding toward negative infinity. `None` on overflow.
fn floor_div(left: i64, right: i64) -> Option<i64> {
    let quotient = left.checked_div(right)?;

    if left % right != 0 && ((left < 0) != (right < 0)) {
        Some(quotient - 1)
    } else {
        Some(quotient)
    }
}

#[tracing::instrument(level = "trace", skip_all)]
fn apply_function(function: Object, args: Vec<Object>) -> EvalResult {
    match function {
        Object::Function(function) => {
            trace!(parameters = ?function.parameters, args = args.len(), "apply");
            if function.parameters.len() != args.len() {
                return Err(EvalError::WrongArgumentCount {
                    want: function.parameters.len(),
                    got: args.len(),
                });
            }

            let env = extend_function_env(&function, args);

            match eval_block_statement(&function.body, &env)? {
                Object::Return(value) => Ok(*value),
                obj => Ok(obj),
            }
        }
        Object::BuiltIn(builtin) => {
            trace!(args = args.len(), "apply builtin");
            builtin(args)
        }
        other => Err(EvalError::NotCallable(other.type_name())),
    }
}

fn extend_function_env(function: &Function, args: Vec<Object>) -> Env {
    let mut env = Environment::new_enclosed(Rc::clone(&function.env));

    for (parameter, arg) in function.parameters.iter().zip(args) {
        env.set(parameter, arg);
    }

    Rc::new(RefCell::new(env))
}
