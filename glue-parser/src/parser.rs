//! Token cursor shared by the WebIDL and binding description parsers

use crate::{
    error::{ParseError as Error, Result},
    lexer::Lexer,
    span::Position,
    token::{Token, TokenKind},
};

/// Recursive descent helper over a token vector
pub struct TokenStream {
    tokens: Vec<Token>,
    current: usize,
}

impl TokenStream {
    /// Tokenize `input` and position the cursor on the first token
    pub fn new(input: &str) -> Result<Self> {
        let tokens = Lexer::new(input).tokenize()?;
        Ok(TokenStream { tokens, current: 0 })
    }

    pub fn current_token(&self) -> &Token {
        // the lexer always terminates the vector with Eof
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.current.min(last)]
    }

    pub fn peek_token(&self, offset: usize) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.current + offset).min(last)]
    }

    pub fn position(&self) -> Position {
        self.current_token().position
    }

    pub fn is_at_end(&self) -> bool {
        matches!(self.current_token().kind, TokenKind::Eof)
    }

    pub fn advance(&mut self) -> Token {
        let token = self.current_token().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    pub fn check_punct(&self, c: char) -> bool {
        self.current_token().is_punct(c)
    }

    pub fn check_ident(&self, name: &str) -> bool {
        self.current_token().is_ident(name)
    }

    pub fn match_punct(&mut self, c: char) -> bool {
        if self.check_punct(c) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn match_ident(&mut self, name: &str) -> bool {
        if self.check_ident(name) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect_punct(&mut self, c: char) -> Result<()> {
        if self.match_punct(c) {
            Ok(())
        } else {
            Err(self.unexpected(format!("'{}'", c)))
        }
    }

    pub fn expect_keyword(&mut self, name: &str) -> Result<()> {
        if self.match_ident(name) {
            Ok(())
        } else {
            Err(self.unexpected(format!("`{}`", name)))
        }
    }

    pub fn expect_ident(&mut self) -> Result<String> {
        match &self.current_token().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    pub fn expect_string(&mut self) -> Result<String> {
        match &self.current_token().kind {
            TokenKind::String(value) => {
                let value = value.clone();
                self.advance();
                Ok(value)
            }
            _ => Err(self.unexpected("string literal")),
        }
    }

    /// Error for the current token given what was expected
    pub fn unexpected(&self, expected: impl Into<String>) -> Error {
        let token = self.current_token();
        match token.kind {
            TokenKind::Eof => Error::unexpected_eof(expected),
            ref found => Error::unexpected_token(expected, found.to_string(), token.position),
        }
    }

    /// Consume a balanced bracketed group starting at the current opener
    pub fn skip_group(&mut self, open: char, close: char) -> Result<()> {
        self.expect_punct(open)?;
        let mut depth = 1usize;
        while depth > 0 {
            if self.is_at_end() {
                return Err(Error::unexpected_eof(format!("'{}'", close)));
            }
            let token = self.advance();
            if token.is_punct(open) {
                depth += 1;
            } else if token.is_punct(close) {
                depth -= 1;
            }
        }
        Ok(())
    }

    /// Consume tokens up to and including the next `;` outside any brackets
    pub fn skip_statement(&mut self) -> Result<()> {
        let mut depth = 0usize;
        loop {
            if self.is_at_end() {
                return Err(Error::unexpected_eof("';'"));
            }
            let token = self.advance();
            match token.kind {
                TokenKind::Punct('{' | '(' | '[') => depth += 1,
                TokenKind::Punct('}' | ')' | ']') => depth = depth.saturating_sub(1),
                TokenKind::Punct(';') if depth == 0 => return Ok(()),
                _ => {}
            }
        }
    }
}
