//! Lexer for WebIDL and binding description sources
//!
//! Both grammars share the same token set; only the binding language uses
//! `%{ ... %}` code blocks, and only WebIDL uses numbers and `...`.

use crate::{
    error::{ParseError as Error, Result},
    span::Position,
    token::{Token, TokenKind},
};

/// Lexical analyzer
pub struct Lexer {
    chars: Vec<char>,
    position: usize,
    line: u32,
    column: u32,
}

impl Lexer {
    /// Create a new lexer for the given input
    pub fn new(input: &str) -> Self {
        Lexer {
            chars: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input; the last token is always `Eof`
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let is_eof = matches!(token.kind, TokenKind::Eof);
            tokens.push(token);

            if is_eof {
                break;
            }
        }

        Ok(tokens)
    }

    fn current_char(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.chars.get(self.position + 1).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position += 1;
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn here(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace_and_comments()?;

        let start = self.here();

        match self.current_char() {
            None => Ok(Token::eof(start)),

            Some('"') => self.read_string(start),

            Some('%') if self.peek_char() == Some('{') => self.read_code_block(start),

            Some('.') => {
                if self.peek_char() == Some('.') {
                    self.advance();
                    self.advance();
                    if self.current_char() != Some('.') {
                        return Err(Error::lexer("expected '...'", start));
                    }
                    self.advance();
                    Ok(Token::new(TokenKind::Ellipsis, start))
                } else if self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                    self.read_number(start)
                } else {
                    self.advance();
                    Ok(Token::new(TokenKind::Punct('.'), start))
                }
            }

            Some('-') if self.peek_char().is_some_and(|c| c.is_ascii_digit() || c == '.') => {
                self.read_number(start)
            }

            Some(ch) if ch.is_ascii_digit() => self.read_number(start),

            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => Ok(self.read_identifier(start)),

            Some(ch) if "{}()[];:,=<>?*-&|".contains(ch) => {
                self.advance();
                Ok(Token::new(TokenKind::Punct(ch), start))
            }

            Some(ch) => Err(Error::lexer(format!("unexpected character '{}'", ch), start)),
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<()> {
        loop {
            match self.current_char() {
                Some(ch) if ch.is_whitespace() => self.advance(),
                Some('/') if self.peek_char() == Some('/') => {
                    while let Some(ch) = self.current_char() {
                        if ch == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('/') if self.peek_char() == Some('*') => {
                    let start = self.here();
                    self.advance();
                    self.advance();
                    loop {
                        match self.current_char() {
                            None => return Err(Error::lexer("unterminated comment", start)),
                            Some('*') if self.peek_char() == Some('/') => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            Some(_) => self.advance(),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn read_string(&mut self, start: Position) -> Result<Token> {
        self.advance(); // opening quote

        let mut value = String::new();

        while let Some(ch) = self.current_char() {
            match ch {
                '"' => {
                    self.advance();
                    return Ok(Token::new(TokenKind::String(value), start));
                }
                '\\' => {
                    self.advance();
                    match self.current_char() {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('r') => value.push('\r'),
                        Some(c) => value.push(c),
                        None => break,
                    }
                    self.advance();
                }
                _ => {
                    value.push(ch);
                    self.advance();
                }
            }
        }

        Err(Error::lexer("unterminated string literal", start))
    }

    fn read_code_block(&mut self, start: Position) -> Result<Token> {
        self.advance();
        self.advance();

        let mut code = String::new();

        while let Some(ch) = self.current_char() {
            if ch == '%' && self.peek_char() == Some('}') {
                self.advance();
                self.advance();
                return Ok(Token::new(TokenKind::CodeBlock(code), start));
            }
            code.push(ch);
            self.advance();
        }

        Err(Error::lexer("unterminated code block, expected '%}'", start))
    }

    fn read_number(&mut self, start: Position) -> Result<Token> {
        let mut text = String::new();

        if self.current_char() == Some('-') {
            text.push('-');
            self.advance();
        }

        if self.current_char() == Some('0') && matches!(self.peek_char(), Some('x' | 'X')) {
            self.advance();
            self.advance();
            let mut digits = String::new();
            while let Some(ch) = self.current_char().filter(|c| c.is_ascii_hexdigit()) {
                digits.push(ch);
                self.advance();
            }
            let value = i64::from_str_radix(&digits, 16)
                .map_err(|e| Error::lexer(format!("invalid hex literal: {}", e), start))?;
            let value = if text.is_empty() { value } else { -value };
            return Ok(Token::new(TokenKind::Integer(value), start));
        }

        let mut is_float = false;
        while let Some(ch) = self.current_char() {
            match ch {
                '0'..='9' => text.push(ch),
                '.' if !is_float => {
                    is_float = true;
                    text.push(ch);
                }
                'e' | 'E' => {
                    is_float = true;
                    text.push(ch);
                    if matches!(self.peek_char(), Some('+' | '-')) {
                        self.advance();
                        if let Some(sign) = self.current_char() {
                            text.push(sign);
                        }
                    }
                }
                _ => break,
            }
            self.advance();
        }

        if is_float {
            text.parse::<f64>()
                .map(|v| Token::new(TokenKind::Float(v), start))
                .map_err(|e| Error::lexer(format!("invalid float literal '{}': {}", text, e), start))
        } else {
            text.parse::<i64>()
                .map(|v| Token::new(TokenKind::Integer(v), start))
                .map_err(|e| Error::lexer(format!("invalid integer literal '{}': {}", text, e), start))
        }
    }

    fn read_identifier(&mut self, start: Position) -> Token {
        let mut name = String::new();

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token::new(TokenKind::Ident(name), start)
    }
}

/// Tokenize a whole source string
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_webidl_tokens() {
        assert_eq!(
            kinds("interface Node : EventTarget { readonly attribute DOMString? name; };"),
            vec![
                TokenKind::Ident("interface".into()),
                TokenKind::Ident("Node".into()),
                TokenKind::Punct(':'),
                TokenKind::Ident("EventTarget".into()),
                TokenKind::Punct('{'),
                TokenKind::Ident("readonly".into()),
                TokenKind::Ident("attribute".into()),
                TokenKind::Ident("DOMString".into()),
                TokenKind::Punct('?'),
                TokenKind::Ident("name".into()),
                TokenKind::Punct(';'),
                TokenKind::Punct('}'),
                TokenKind::Punct(';'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers_and_ellipsis() {
        assert_eq!(
            kinds("0x1F -3 2.5 any... x"),
            vec![
                TokenKind::Integer(31),
                TokenKind::Integer(-3),
                TokenKind::Float(2.5),
                TokenKind::Ident("any".into()),
                TokenKind::Ellipsis,
                TokenKind::Ident("x".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("/* block\n comment */ a // line\n b"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Ident("b".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_code_block_is_verbatim() {
        let tokens = kinds("preamble %{\n#include <stdio.h>\n%}");
        assert_eq!(tokens[1], TokenKind::CodeBlock("\n#include <stdio.h>\n".into()));
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#""a \"quoted\" \\ word""#)[0],
            TokenKind::String("a \"quoted\" \\ word".into())
        );
    }

    #[test]
    fn test_positions_track_lines() {
        let tokens = tokenize("a\n  b").unwrap();
        assert_eq!(tokens[0].position, Position::new(1, 1));
        assert_eq!(tokens[1].position, Position::new(2, 3));
    }

    #[test]
    fn test_unterminated_inputs() {
        assert!(matches!(tokenize("\"open"), Err(Error::Lexer { .. })));
        assert!(matches!(tokenize("%{ never closed"), Err(Error::Lexer { .. })));
        assert!(matches!(tokenize("/* never closed"), Err(Error::Lexer { .. })));
        assert!(matches!(tokenize("@"), Err(Error::Lexer { .. })));
    }
}
