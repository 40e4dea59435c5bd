use crate::ast::{BlockStatement, Expression, InfixOperator, PrefixOperator, Program, Statement};
use crate::lexer::Lexer;
use crate::token::Token;
use thiserror::Error;
use tracing::trace;

type Result<T> = std::result::Result<T, ParserError>;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ParserError {
    #[error("expected next token to be {expected}, got {actual} instead")]
    UnexpectedToken {
        expected: &'static str,
        actual: &'static str,
    },
    #[error("no prefix parse function for {0}")]
    NoPrefixParseFn(&'static str),
    #[error("could not parse {0:?} as integer")]
    InvalidInteger(String),
    #[error("illegal character: {0:?}")]
    IllegalCharacter(char),
}

/// Binding strength of operators, lowest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
}

fn precedence_of(token: &Token) -> Precedence {
    match token {
        Token::Eq | Token::Ne => Precedence::Equals,
        Token::Lt | Token::Gt => Precedence::LessGreater,
        Token::Plus | Token::Minus => Precedence::Sum,
        Token::Asterisk | Token::Slash => Precedence::Product,
        Token::OpenParen => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

type PrefixParseFn<'a> = fn(&mut Parser<'a>) -> Result<Expression>;
type InfixParseFn<'a> = fn(&mut Parser<'a>, Expression) -> Result<Expression>;

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    cur_token: Token,
    peek_token: Token,
    errors: Vec<ParserError>,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        let mut p = Parser {
            lexer,
            cur_token: Token::Eof,
            peek_token: Token::Eof,
            errors: vec![],
        };

        // Read 2 tokens so that cur_token and peek_token are both initialised
        p.next_token();
        p.next_token();

        p
    }

    pub fn errors(&self) -> &[ParserError] {
        &self.errors
    }

    fn next_token(&mut self) {
        self.cur_token = std::mem::replace(&mut self.peek_token, self.lexer.next_token());
    }

    /// Parses the whole input. Always returns a program; check `errors()`
    /// before trusting it.
    pub fn parse_program(&mut self) -> Program {
        let mut statements = vec![];

        while self.cur_token != Token::Eof {
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => self.record(err),
            }
            self.next_token();
        }

        Program { statements }
    }

    fn record(&mut self, err: ParserError) {
        trace!(error = %err, "parser error");
        self.errors.push(err);
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        match self.cur_token {
            Token::Let => self.parse_let_statement(),
            Token::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Result<Statement> {
        let name = if let Token::Ident(ident) = &self.peek_token {
            ident.clone()
        } else {
            return Err(self.peek_error("IDENT"));
        };
        self.next_token();

        self.expect_peek(Token::Assign)?;
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();

        Ok(Statement::Let(name, value))
    }

    fn parse_return_statement(&mut self) -> Result<Statement> {
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();

        Ok(Statement::Return(value))
    }

    fn parse_expression_statement(&mut self) -> Result<Statement> {
        let exp = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();

        Ok(Statement::Expression(exp))
    }

    fn skip_optional_semicolon(&mut self) {
        if self.peek_token == Token::SemiColon {
            self.next_token();
        }
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Result<Expression> {
        let prefix = match self.prefix_parse_fn() {
            Some(prefix) => prefix,
            None => {
                return Err(match self.cur_token {
                    Token::Illegal(c) => ParserError::IllegalCharacter(c),
                    _ => ParserError::NoPrefixParseFn(self.cur_token.kind()),
                })
            }
        };
        let mut left = prefix(self)?;

        while self.peek_token != Token::SemiColon && precedence < precedence_of(&self.peek_token)
        {
            let infix = match self.infix_parse_fn() {
                Some(infix) => infix,
                None => return Ok(left),
            };
            self.next_token();
            left = infix(self, left)?;
        }

        Ok(left)
    }

    fn prefix_parse_fn(&self) -> Option<PrefixParseFn<'a>> {
        match self.cur_token {
            Token::Ident(_) => Some(Self::parse_identifier),
            Token::Int(_) => Some(Self::parse_integer_literal),
            Token::String(_) => Some(Self::parse_string_literal),
            Token::True | Token::False => Some(Self::parse_boolean),
            Token::Bang | Token::Minus => Some(Self::parse_prefix_expression),
            Token::OpenParen => Some(Self::parse_grouped_expression),
            Token::If => Some(Self::parse_if_expression),
            Token::Function => Some(Self::parse_function_literal),
            _ => None,
        }
    }

    fn infix_parse_fn(&self) -> Option<InfixParseFn<'a>> {
        match self.peek_token {
            Token::Plus
            | Token::Minus
            | Token::Asterisk
            | Token::Slash
            | Token::Lt
            | Token::Gt
            | Token::Eq
            | Token::Ne => Some(Self::parse_infix_expression),
            Token::OpenParen => Some(Self::parse_call_expression),
            _ => None,
        }
    }

    fn parse_identifier(&mut self) -> Result<Expression> {
        Ok(Expression::Identifier(self.cur_token.literal()))
    }

    fn parse_integer_literal(&mut self) -> Result<Expression> {
        let literal = self.cur_token.literal();
        literal
            .parse()
            .map(Expression::IntegerLiteral)
            .map_err(|_| ParserError::InvalidInteger(literal))
    }

    fn parse_string_literal(&mut self) -> Result<Expression> {
        Ok(Expression::StringLiteral(self.cur_token.literal()))
    }

    fn parse_boolean(&mut self) -> Result<Expression> {
        Ok(Expression::Boolean(self.cur_token == Token::True))
    }

    fn parse_prefix_expression(&mut self) -> Result<Expression> {
        let operator = match self.cur_token {
            Token::Bang => PrefixOperator::Bang,
            _ => PrefixOperator::Minus,
        };
        self.next_token();

        let right = self.parse_expression(Precedence::Prefix)?;

        Ok(Expression::Prefix(operator, Box::new(right)))
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Result<Expression> {
        let operator = match self.cur_token {
            Token::Plus => InfixOperator::Plus,
            Token::Minus => InfixOperator::Minus,
            Token::Asterisk => InfixOperator::Asterisk,
            Token::Slash => InfixOperator::Slash,
            Token::Lt => InfixOperator::Lt,
            Token::Gt => InfixOperator::Gt,
            Token::Eq => InfixOperator::Eq,
            _ => InfixOperator::NotEq,
        };
        let precedence = precedence_of(&self.cur_token);
        self.next_token();

        let right = self.parse_expression(precedence)?;

        Ok(Expression::Infix(operator, Box::new(left), Box::new(right)))
    }

    fn parse_grouped_expression(&mut self) -> Result<Expression> {
        self.next_token();

        let exp = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(Token::CloseParen)?;

        Ok(exp)
    }

    fn parse_if_expression(&mut self) -> Result<Expression> {
        self.expect_peek(Token::OpenParen)?;
        self.next_token();

        let condition = self.parse_expression(Precedence::Lowest)?;

        self.expect_peek(Token::CloseParen)?;
        self.expect_peek(Token::OpenBrace)?;

        let consequence = self.parse_block_statement();

        let alternative = if self.peek_token == Token::Else {
            self.next_token();
            self.expect_peek(Token::OpenBrace)?;
            Some(self.parse_block_statement())
        } else {
            None
        };

        Ok(Expression::If(Box::new(condition), consequence, alternative))
    }

    /// Parses statements up to the closing brace (or end of input). Errors in
    /// inner statements are recorded and parsing carries on.
    fn parse_block_statement(&mut self) -> BlockStatement {
        let mut statements = vec![];
        self.next_token();

        while self.cur_token != Token::CloseBrace && self.cur_token != Token::Eof {
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => self.record(err),
            }
            self.next_token();
        }

        BlockStatement { statements }
    }

    fn parse_function_literal(&mut self) -> Result<Expression> {
        self.expect_peek(Token::OpenParen)?;

        let parameters = self.parse_function_parameters()?;

        self.expect_peek(Token::OpenBrace)?;

        let body = self.parse_block_statement();

        Ok(Expression::FunctionLiteral(parameters, body))
    }

    fn parse_function_parameters(&mut self) -> Result<Vec<String>> {
        let mut identifiers = vec![];

        if self.peek_token == Token::CloseParen {
            self.next_token();
            return Ok(identifiers);
        }

        identifiers.push(self.expect_ident()?);

        while self.peek_token == Token::Comma {
            self.next_token();
            identifiers.push(self.expect_ident()?);
        }

        self.expect_peek(Token::CloseParen)?;

        Ok(identifiers)
    }

    fn parse_call_expression(&mut self, function: Expression) -> Result<Expression> {
        let arguments = self.parse_call_arguments()?;

        Ok(Expression::Call(Box::new(function), arguments))
    }

    fn parse_call_arguments(&mut self) -> Result<Vec<Expression>> {
        let mut args = vec![];

        if self.peek_token == Token::CloseParen {
            self.next_token();
            return Ok(args);
        }

        self.next_token();
        args.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_token == Token::Comma {
            self.next_token();
            self.next_token();
            args.push(self.parse_expression(Precedence::Lowest)?);
        }

        self.expect_peek(Token::CloseParen)?;

        Ok(args)
    }

    /// Advances onto the next token if it is an identifier and returns its name.
    fn expect_ident(&mut self) -> Result<String> {
        match &self.peek_token {
            Token::Ident(name) => {
                let name = name.clone();
                self.next_token();
                Ok(name)
            }
            _ => Err(self.peek_error("IDENT")),
        }
    }

    fn expect_peek(&mut self, token: Token) -> Result<()> {
        if !self.peek_token.same_kind(&token) {
            return Err(self.peek_error(token.kind()));
        }

        self.next_token();
        Ok(())
    }

    fn peek_error(&self, expected: &'static str) -> ParserError {
        match self.peek_token {
            Token::Illegal(c) => ParserError::IllegalCharacter(c),
            _ => ParserError::UnexpectedToken {
                expected,
                actual: self.peek_token.kind(),
            },
        }
    }
}

/// Parses `input`, returning the (possibly partial) program and the rendered
/// parser errors. The program must not be evaluated when errors are present.
pub fn parse_program(input: &str) -> (Program, Vec<String>) {
    let mut parser = Parser::new(Lexer::new(input));
    let program = parser.parse_program();
    let errors = parser.errors().iter().map(|e| e.to_string()).collect();

    (program, errors)
}

#[cfg(test)]
mod test {
    use super::{parse_program, ParserError};
    use crate::ast::{Expression, InfixOperator, PrefixOperator, Program, Statement};
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> Program {
        let lexer = Lexer::new(input);
        let mut parser = Parser::new(lexer);
        let program = parser.parse_program();

        assert!(
            parser.errors().is_empty(),
            "Parser errors for `{}`: {:?}",
            input,
            parser.errors()
        );

        program
    }

    fn parse_errors(input: &str) -> Vec<ParserError> {
        let mut parser = Parser::new(Lexer::new(input));
        parser.parse_program();
        parser.errors().to_vec()
    }

    fn ident(name: &str) -> Expression {
        Expression::Identifier(name.to_owned())
    }

    fn int(v: i64) -> Box<Expression> {
        Box::new(Expression::IntegerLiteral(v))
    }

    #[test]
    fn let_statement() {
        let program = parse(
            "
let x = 5;
let y = true;
let foobar = y;
        ",
        );

        assert_eq!(
            program.statements,
            vec![
                Statement::Let("x".to_string(), Expression::IntegerLiteral(5)),
                Statement::Let("y".to_string(), Expression::Boolean(true)),
                Statement::Let("foobar".to_string(), ident("y")),
            ]
        );
    }

    #[test]
    fn return_statement() {
        let program = parse(
            "
return 5;
return 10;
return add(15)
",
        );

        assert_eq!(
            program.statements,
            vec![
                Statement::Return(Expression::IntegerLiteral(5)),
                Statement::Return(Expression::IntegerLiteral(10)),
                Statement::Return(Expression::Call(
                    Box::new(ident("add")),
                    vec![Expression::IntegerLiteral(15)]
                )),
            ]
        );
    }

    #[test]
    fn identifier_and_literal_expressions() {
        let tests = vec![
            ("foobar;", ident("foobar")),
            ("5;", Expression::IntegerLiteral(5)),
            (r#""hello world";"#, Expression::StringLiteral("hello world".to_owned())),
            ("true", Expression::Boolean(true)),
            ("false;", Expression::Boolean(false)),
        ];

        for (input, expected) in tests {
            assert_eq!(
                parse(input).statements,
                vec![Statement::Expression(expected)],
                "for `{}`",
                input
            );
        }
    }

    #[test]
    fn prefix_expressions() {
        let tests = vec![
            ("!5", PrefixOperator::Bang, int(5)),
            ("-15", PrefixOperator::Minus, int(15)),
            ("!true", PrefixOperator::Bang, Box::new(Expression::Boolean(true))),
        ];

        for (input, operator, right) in tests {
            assert_eq!(
                parse(input).statements,
                vec![Statement::Expression(Expression::Prefix(operator, right))],
                "for `{}`",
                input
            );
        }
    }

    #[test]
    fn infix_expressions() {
        let tests = vec![
            ("5 + 5", InfixOperator::Plus),
            ("5 - 5", InfixOperator::Minus),
            ("5 * 5", InfixOperator::Asterisk),
            ("5 / 5", InfixOperator::Slash),
            ("5 > 5", InfixOperator::Gt),
            ("5 < 5", InfixOperator::Lt),
            ("5 == 5", InfixOperator::Eq),
            ("5 != 5", InfixOperator::NotEq),
        ];

        for (input, operator) in tests {
            assert_eq!(
                parse(input).statements,
                vec![Statement::Expression(Expression::Infix(
                    operator,
                    int(5),
                    int(5)
                ))],
                "for `{}`",
                input
            );
        }
    }

    #[test]
    fn operator_precedence() {
        let tests = vec![
            ("-a * b", "((-a) * b)"),
            ("!-a", "(!(-a))"),
            ("a + b + c", "((a + b) + c)"),
            ("a * b / c", "((a * b) / c)"),
            ("5 + 6 + 7", "((5 + 6) + 7)"),
            ("5 + 6 * 7", "(5 + (6 * 7))"),
            ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4))"),
            ("3 > 4 == 4 < 3", "((3 > 4) == (4 < 3))"),
            (
                "3 + 4 * 5 == 3 * 1 + 4 * 5",
                "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)))",
            ),
            ("true != false == true", "((true != false) == true)"),
            ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4)"),
            ("(5 + 5) * 2", "((5 + 5) * 2)"),
            ("-(5 + 5)", "(-(5 + 5))"),
            ("!(true == true)", "(!(true == true))"),
            ("a + add(b * c) + d", "((a + add((b * c))) + d)"),
            (
                "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
                "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)))",
            ),
            ("a * b; c - d", "(a * b)(c - d)"),
        ];

        for (input, expected) in tests {
            assert_eq!(expected, parse(input).to_string(), "for `{}`", input);
        }
    }

    #[test]
    fn if_expression() {
        let program = parse("if (x < y) { x }");

        assert_eq!(
            program.statements,
            vec![Statement::Expression(Expression::If(
                Box::new(Expression::Infix(
                    InfixOperator::Lt,
                    Box::new(ident("x")),
                    Box::new(ident("y"))
                )),
                crate::ast::BlockStatement {
                    statements: vec![Statement::Expression(ident("x"))]
                },
                None,
            ))]
        );
    }

    #[test]
    fn if_else_expression() {
        let program = parse("if (x < y) { x } else { y; z }");

        match &program.statements[..] {
            [Statement::Expression(Expression::If(_, consequence, Some(alternative)))] => {
                assert_eq!(1, consequence.statements.len());
                assert_eq!(2, alternative.statements.len());
            }
            other => panic!("expected an if/else expression, got {:?}", other),
        }
    }

    #[test]
    fn function_literal() {
        let program = parse("fn(x, y) { x + y; }");

        assert_eq!("fn(x, y) (x + y)", program.to_string());
        match &program.statements[..] {
            [Statement::Expression(Expression::FunctionLiteral(parameters, body))] => {
                assert_eq!(&vec!["x".to_owned(), "y".to_owned()], parameters);
                assert_eq!(1, body.statements.len());
            }
            other => panic!("expected a function literal, got {:?}", other),
        }
    }

    #[test]
    fn function_parameters() {
        let tests = vec![
            ("fn() {};", vec![]),
            ("fn(x) {};", vec!["x"]),
            ("fn(x, y, z) {};", vec!["x", "y", "z"]),
        ];

        for (input, expected) in tests {
            match &parse(input).statements[..] {
                [Statement::Expression(Expression::FunctionLiteral(parameters, _))] => {
                    assert_eq!(&expected, parameters, "for `{}`", input)
                }
                other => panic!("expected a function literal, got {:?}", other),
            }
        }
    }

    #[test]
    fn call_expression() {
        let program = parse("add(1, 2 * 3, 4 + 5);");

        assert_eq!("add(1, (2 * 3), (4 + 5))", program.to_string());
        match &program.statements[..] {
            [Statement::Expression(Expression::Call(function, arguments))] => {
                assert_eq!(&Box::new(ident("add")), function);
                assert_eq!(3, arguments.len());
            }
            other => panic!("expected a call expression, got {:?}", other),
        }
    }

    #[test]
    fn let_statement_errors() {
        assert_eq!(
            parse_errors("let = 5;"),
            vec![
                ParserError::UnexpectedToken {
                    expected: "IDENT",
                    actual: "="
                },
                ParserError::NoPrefixParseFn("="),
            ]
        );
        assert_eq!(
            parse_errors("let x 5;"),
            vec![ParserError::UnexpectedToken {
                expected: "=",
                actual: "INT"
            }]
        );
    }

    #[test]
    fn errors_are_accumulated() {
        let (program, errors) = parse_program("let x 5; let y = 10; )");

        assert_eq!(
            errors,
            vec![
                "expected next token to be =, got INT instead".to_owned(),
                "no prefix parse function for )".to_owned(),
            ]
        );
        assert!(program
            .statements
            .contains(&Statement::Let("y".to_owned(), Expression::IntegerLiteral(10))));
    }

    #[test]
    fn integer_overflow_is_a_parser_error() {
        assert_eq!(
            parse_errors("99999999999999999999"),
            vec![ParserError::InvalidInteger(
                "99999999999999999999".to_owned()
            )]
        );
    }

    #[test]
    fn only_one_trailing_semicolon_is_consumed() {
        assert!(parse_errors("!!5;").is_empty());
        assert_eq!(
            parse_errors("!!5;;"),
            vec![ParserError::NoPrefixParseFn(";")]
        );
    }

    #[test]
    fn illegal_character_is_reported() {
        let (_, errors) = parse_program("let x = 5 @ 3;");

        assert_eq!(errors, vec!["illegal character: '@'".to_owned()]);
    }

    #[test]
    fn unclosed_block_stops_at_eof() {
        let (program, errors) = parse_program("if (x) { 1");

        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!("ifx 1", program.to_string());
    }
}
