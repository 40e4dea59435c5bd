use std::iter::Peekable;
use std::str::Chars;

use crate::token;
use crate::token::Token;

pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Lexer<'a> {
        Lexer {
            input: input.chars().peekable(),
        }
    }

    fn read_char(&mut self) -> Option<char> {
        self.input.next()
    }

    fn peek_char(&mut self) -> Option<char> {
        self.input.peek().copied()
    }

    fn peek_if<F>(&mut self, mut predicate: F) -> bool
    where
        F: FnMut(char) -> bool,
    {
        match self.peek_char() {
            Some(ch) => predicate(ch),
            None => false,
        }
    }

    /// Reads a run of characters matching `predicate`, starting with `first`.
    fn read_while<F>(&mut self, first: char, mut predicate: F) -> String
    where
        F: FnMut(char) -> bool,
    {
        let mut res = String::new();
        res.push(first);

        while let Some(c) = self.peek_char() {
            if !predicate(c) {
                break;
            }
            res.push(c);
            self.read_char();
        }

        res
    }

    fn read_string(&mut self) -> String {
        let mut res = String::new();

        while let Some(c) = self.read_char() {
            if c == '"' {
                break;
            }
            res.push(c);
        }

        res
    }

    fn skip_whitespace(&mut self) {
        while self.peek_if(|c| c.is_whitespace()) {
            self.read_char();
        }
    }

    /// Returns the next token. Once the input is exhausted every call returns
    /// `Token::Eof`.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        match self.read_char() {
            Some('=') => {
                if let Some('=') = self.peek_char() {
                    self.read_char();
                    Token::Eq
                } else {
                    Token::Assign
                }
            }
            Some('+') => Token::Plus,
            Some('!') => {
                if let Some('=') = self.peek_char() {
                    self.read_char();
                    Token::Ne
                } else {
                    Token::Bang
                }
            }
            Some('-') => Token::Minus,
            Some('*') => Token::Asterisk,
            Some('/') => Token::Slash,
            Some('<') => Token::Lt,
            Some('>') => Token::Gt,
            Some('(') => Token::OpenParen,
            Some(')') => Token::CloseParen,
            Some('{') => Token::OpenBrace,
            Some('}') => Token::CloseBrace,
            Some(',') => Token::Comma,
            Some(';') => Token::SemiColon,
            Some('"') => Token::String(self.read_string()),
            Some(c) => {
                if is_letter(c) {
                    token::lookup_ident(&self.read_while(c, is_letter))
                } else if c.is_ascii_digit() {
                    Token::Int(self.read_while(c, |c| c.is_ascii_digit()))
                } else {
                    Token::Illegal(c)
                }
            }
            None => Token::Eof,
        }
    }
}

fn is_letter(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_uppercase() || c == '_'
}
