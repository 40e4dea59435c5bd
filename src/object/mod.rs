use crate::ast::{BlockStatement, InfixOperator, PrefixOperator};
pub use crate::object::environment::{Env, Environment};
use std::{fmt, rc::Rc};
use thiserror::Error;

pub mod builtins;
pub mod environment;

pub const NULL: Object = Object::Null;
pub const TRUE: Object = Object::Boolean(true);
pub const FALSE: Object = Object::Boolean(false);

/// Native callable exposed to programs. Receives the already evaluated
/// arguments.
pub type BuiltInFunction = fn(Vec<Object>) -> EvalResult;

/// Runtime values. `Return` is a control-flow marker that the evaluator
/// unwraps at call and program boundaries; callers never observe it.
#[derive(Clone, Debug)]
pub enum Object {
    Null,
    Integer(i64),
    Boolean(bool),
    String(String),
    Return(Box<Object>),
    Function(Rc<Function>),
    BuiltIn(BuiltInFunction),
    Error(EvalError),
}

/// A user function together with the scope it was defined in.
#[derive(Debug)]
pub struct Function {
    pub parameters: Vec<String>,
    pub body: BlockStatement,
    pub env: Env,
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Object::Null => write!(f, "null"),
            Object::Integer(v) => write!(f, "{}", v),
            Object::Boolean(b) => write!(f, "{}", b),
            Object::String(s) => write!(f, "{}", s),
            Object::Return(obj) => write!(f, "{}", obj),
            Object::Function(function) => write!(
                f,
                "fn({}) {{\n{}\n}}",
                function.parameters.join(", "),
                function.body
            ),
            Object::BuiltIn(_) => write!(f, "builtin function"),
            Object::Error(err) => write!(f, "ERROR: {}", err),
        }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Null, Object::Null) => true,
            (Object::Integer(a), Object::Integer(b)) => a == b,
            (Object::Boolean(a), Object::Boolean(b)) => a == b,
            (Object::String(a), Object::String(b)) => a == b,
            (Object::Return(a), Object::Return(b)) => a == b,
            (Object::Function(a), Object::Function(b)) => Rc::ptr_eq(a, b),
            (Object::BuiltIn(a), Object::BuiltIn(b)) => *a as usize == *b as usize,
            (Object::Error(a), Object::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Object {
    fn from(value: bool) -> Self {
        if value {
            TRUE
        } else {
            FALSE
        }
    }
}

impl Object {
    /// Only `null` and `false` are falsy; `0` and `""` are truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Null | Object::Boolean(false))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Object::Error(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Boolean(_) => "boolean",
            Object::Integer(_) => "number",
            Object::Null => "null",
            Object::Return(_) => "return",
            Object::Function(_) => "function",
            Object::String(_) => "string",
            Object::BuiltIn(_) => "builtin",
            Object::Error(_) => "error",
        }
    }
}

pub type EvalResult = std::result::Result<Object, EvalError>;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum EvalError {
    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),
    #[error("not a function: {0}")]
    NotCallable(&'static str),
    #[error("unknown operator: {operator}{operand}")]
    UnsupportedPrefixOperator {
        operator: PrefixOperator,
        operand: &'static str,
    },
    #[error("unknown operator: {left} {operator} {right}")]
    UnsupportedInfixOperator {
        operator: InfixOperator,
        left: &'static str,
        right: &'static str,
    },
    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        operator: InfixOperator,
        left: &'static str,
        right: &'static str,
    },
    #[error("wrong number of arguments: want={want}, got={got}")]
    WrongArgumentCount { want: usize, got: usize },
    #[error("argument to `{function}` not supported, got {got}")]
    UnsupportedArgument {
        function: &'static str,
        got: &'static str,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow: {0}")]
    IntegerOverflow(String),
}

pub fn assert_argument_count(expected: usize, args: &[Object]) -> Result<(), EvalError> {
    if args.len() != expected {
        return Err(EvalError::WrongArgumentCount {
            want: expected,
            got: args.len(),
        });
    }

    Ok(())
}
