use std::io::{self, BufRead, Write};

use crate::evaluator;
use crate::lexer::Lexer;
use crate::object::{Env, Environment};
use crate::parser::{Parser, ParserError};

const PROMPT: &str = ">> ";

const MONKEY_FACE: &str = r#"            __,__
   .--.  .-"     "-.  .--.
  / .. \/  .-. .-.  \/ .. \
 | |  '|  /   Y   \  |'  | |
 | \   \  \ 0 | 0 /  /   / |
  \ '- ,\.-"""""""-./, -' /
   ''-' /_   ^ ^   _\ '-''
       |  \._   _./  |
       \   \ '~' /   /
        '._ '-=-' _.'
           '-----'
"#;

/// Reads lines from `input` until end of input or `exit`, evaluating each
/// against one environment so bindings carry over between lines.
pub fn start<R: BufRead, W: Write>(mut input: R, mut output: W) -> io::Result<()> {
    let env = Environment::new_shared();

    loop {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(());
        }

        match line.trim() {
            "exit" => return Ok(()),
            "" => continue,
            source => run_line(source, &env, &mut output)?,
        }
    }
}

fn run_line<W: Write>(source: &str, env: &Env, output: &mut W) -> io::Result<()> {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse_program();

    if !parser.errors().is_empty() {
        return print_parser_errors(parser.errors(), output);
    }

    writeln!(output, "{}", evaluator::eval(&program, env))
}

fn print_parser_errors<W: Write>(errors: &[ParserError], output: &mut W) -> io::Result<()> {
    write!(output, "{}", MONKEY_FACE)?;
    writeln!(output, "Woops! We ran into some monkey business here!")?;
    writeln!(output, " parser errors:")?;
    for error in errors {
        writeln!(output, "\t{}", error)?;
    }

    Ok(())
}
