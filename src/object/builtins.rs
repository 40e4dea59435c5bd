use super::{assert_argument_count, EvalError, EvalResult, Object, NULL};

#[derive(Debug)]
pub struct BuiltIn {
    pub name: &'static str,
    builtin: Object,
}

/// Every builtin, in a stable order.
pub const BUILTINS: &[BuiltIn] = &[
    BuiltIn {
        name: "len",
        builtin: Object::BuiltIn(len),
    },
    BuiltIn {
        name: "puts",
        builtin: Object::BuiltIn(puts),
    },
];

/// Resolves `name` against the builtin registry. Consulted only after the
/// environment chain, so a `let` or parameter of the same name wins.
pub fn lookup(name: &str) -> Option<Object> {
    BUILTINS
        .iter()
        .find(|b| b.name == name)
        .map(|b| b.builtin.clone())
}

fn len(args: Vec<Object>) -> EvalResult {
    assert_argument_count(1, &args)?;

    match &args[0] {
        Object::String(value) => Ok(Object::Integer(value.chars().count() as i64)),
        other => Err(EvalError::UnsupportedArgument {
            function: "len",
            got: other.type_name(),
        }),
    }
}

fn puts(args: Vec<Object>) -> EvalResult {
    for arg in args {
        println!("{}", arg);
    }

    Ok(NULL)
}
