//! Turtle tokenizer.
//!
//! Turns raw Turtle text into a flat, forward-only stream of typed tokens,
//! each carrying its raw lexeme and 1-based line/column. Whitespace and `#`
//! comments are skipped between tokens. Lexemes stay raw: quote delimiters,
//! `<`/`>` and backslash escapes are removed later, by the parser.

use crate::error::{TurtleError, TurtleErrorKind};

/// The type of a [`Token`].
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TokenKind {
    /// `@prefix`
    PrefixDirective,
    /// `@base`
    BaseDirective,
    /// `<...>`, delimiters included in the lexeme
    IriRef,
    /// `prefix:local`, bare `:` included
    PrefixedName,
    /// `_:label`
    BlankNodeLabel,
    /// `[`
    OpenBracket,
    /// `]`
    CloseBracket,
    /// `.`
    Dot,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// the `a` keyword
    A,
    /// A fully delimited quoted string, single or triple-quoted, with any
    /// attached `@lang` or `^^datatype` suffix
    Literal,
    /// End of input; returned again on every further call
    Eof,
}

/// One lexical token with its raw text and position.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    /// 1-based line of the token's first character.
    pub line: u64,
    /// 1-based column of the token's first character.
    pub column: u64,
}

/// A lazy tokenizer over an in-memory Turtle document.
///
/// ```
/// use terrapin_turtle::{Tokenizer, TokenKind};
///
/// let mut tokenizer = Tokenizer::new("ex:s a ex:C .");
/// assert_eq!(TokenKind::PrefixedName, tokenizer.next_token()?.kind);
/// assert_eq!(TokenKind::A, tokenizer.next_token()?.kind);
/// assert_eq!(TokenKind::PrefixedName, tokenizer.next_token()?.kind);
/// assert_eq!(TokenKind::Dot, tokenizer.next_token()?.kind);
/// assert_eq!(TokenKind::Eof, tokenizer.next_token()?.kind);
/// # Ok::<_, terrapin_turtle::TurtleError>(())
/// ```
#[allow(missing_copy_implementations)]
#[derive(Debug)]
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    line: u64,
    column: u64,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Returns the next token, or [`TokenKind::Eof`] forever once the input
    /// is exhausted.
    pub fn next_token(&mut self) -> Result<Token, TurtleError> {
        self.skip_trivia();
        let start = self.pos;
        let (line, column) = (self.line, self.column);
        let c = match self.peek() {
            None => {
                return Ok(Token {
                    kind: TokenKind::Eof,
                    lexeme: String::new(),
                    line,
                    column,
                })
            }
            Some(c) => c,
        };
        let kind = match c {
            '<' => {
                self.scan_iri_ref()?;
                TokenKind::IriRef
            }
            '[' => self.single(TokenKind::OpenBracket),
            ']' => self.single(TokenKind::CloseBracket),
            '.' => self.single(TokenKind::Dot),
            ',' => self.single(TokenKind::Comma),
            ';' => self.single(TokenKind::Semicolon),
            '@' => self.scan_directive()?,
            '_' => {
                self.scan_blank_node_label()?;
                TokenKind::BlankNodeLabel
            }
            '"' | '\'' => {
                self.scan_literal()?;
                TokenKind::Literal
            }
            'a' if !self.continues_name(1) => self.single(TokenKind::A),
            c if is_name_start(c) || c == ':' => {
                self.scan_prefixed_name()?;
                TokenKind::PrefixedName
            }
            c => {
                return Err(self.error_here(TurtleErrorKind::UnexpectedCharacter(c), c))
            }
        };
        Ok(Token {
            kind,
            lexeme: self.input[start..self.pos].to_owned(),
            line,
            column,
        })
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.bump();
        kind
    }

    /// True if the character `n` positions ahead keeps a name going,
    /// i.e. `a` in `ab:x` is not the keyword.
    fn continues_name(&self, n: usize) -> bool {
        matches!(self.peek_at(n), Some(c) if is_name_char(c) || c == ':')
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.bump();
                }
                Some('#') => {
                    while !matches!(self.peek(), Some('\n') | Some('\r') | None) {
                        self.bump();
                    }
                }
                _ => return,
            }
        }
    }

    fn error_here(&self, kind: TurtleErrorKind, token: impl Into<String>) -> TurtleError {
        TurtleError {
            kind,
            line: self.line,
            column: self.column,
            token: token.into(),
        }
    }

    // [18] IRIREF ::= '<' ([^#x00-#x20<>"{}|^`\] | UCHAR)* '>'
    fn scan_iri_ref(&mut self) -> Result<(), TurtleError> {
        let start = self.pos;
        self.bump();
        loop {
            match self.peek() {
                None | Some('\n') | Some('\r') => {
                    return Err(self.error_here(
                        TurtleErrorKind::UnterminatedIriRef,
                        &self.input[start..self.pos],
                    ))
                }
                Some('>') => {
                    self.bump();
                    return Ok(());
                }
                Some(c @ (' ' | '<' | '"' | '{' | '}' | '|' | '`')) => {
                    return Err(self.error_here(TurtleErrorKind::UnexpectedCharacter(c), c))
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    fn scan_directive(&mut self) -> Result<TokenKind, TurtleError> {
        let start = self.pos;
        let (line, column) = (self.line, self.column);
        self.bump();
        while matches!(self.peek(), Some(c) if c.is_ascii_alphabetic()) {
            self.bump();
        }
        match &self.input[start..self.pos] {
            "@prefix" => Ok(TokenKind::PrefixDirective),
            "@base" => Ok(TokenKind::BaseDirective),
            other => Err(TurtleError {
                kind: TurtleErrorKind::UnknownDirective(other.trim_start_matches('@').to_owned()),
                line,
                column,
                token: other.to_owned(),
            }),
        }
    }

    // [141s] BLANK_NODE_LABEL ::= '_:' (PN_CHARS_U | [0-9]) ((PN_CHARS | '.')* PN_CHARS)?
    fn scan_blank_node_label(&mut self) -> Result<(), TurtleError> {
        self.bump();
        match self.peek() {
            Some(':') => {
                self.bump();
            }
            Some(c) => return Err(self.error_here(TurtleErrorKind::UnexpectedCharacter(c), c)),
            None => return Err(self.error_here(TurtleErrorKind::PrematureEof, "")),
        }
        match self.peek() {
            Some(c) if is_name_char(c) => {
                self.bump();
            }
            Some(c) => return Err(self.error_here(TurtleErrorKind::UnexpectedCharacter(c), c)),
            None => return Err(self.error_here(TurtleErrorKind::PrematureEof, "")),
        }
        self.scan_name_tail(false);
        Ok(())
    }

    // [136s] PrefixedName ::= PNAME_LN | PNAME_NS
    fn scan_prefixed_name(&mut self) -> Result<(), TurtleError> {
        if matches!(self.peek(), Some(c) if is_name_start(c)) {
            self.bump();
            self.scan_name_tail(false);
        }
        match self.peek() {
            Some(':') => {
                self.bump();
            }
            Some(c) => return Err(self.error_here(TurtleErrorKind::UnexpectedCharacter(c), c)),
            None => return Err(self.error_here(TurtleErrorKind::PrematureEof, "")),
        }
        if matches!(self.peek(), Some(c) if is_name_char(c)) {
            self.bump();
            self.scan_name_tail(true);
        }
        Ok(())
    }

    /// Consumes name continuation characters. A `.` is part of the name only
    /// when another name character follows, so `ex:s.` ends before the dot.
    fn scan_name_tail(&mut self, local: bool) {
        loop {
            match self.peek() {
                Some(c) if is_name_char(c) || (local && c == ':') => {
                    self.bump();
                }
                Some('.') if matches!(self.peek_at(1), Some(c) if is_name_char(c) || c == '.') => {
                    self.bump();
                }
                _ => return,
            }
        }
    }

    fn scan_literal(&mut self) -> Result<(), TurtleError> {
        let start = self.pos;
        let quote = match self.peek() {
            Some(q) => q,
            None => return Err(self.error_here(TurtleErrorKind::PrematureEof, "")),
        };
        let long = self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote);
        if long {
            self.scan_long_quoted(quote, start)?;
        } else {
            self.scan_short_quoted(quote, start)?;
        }
        // attached LANGTAG or '^^' datatype suffix
        match self.peek() {
            Some('@') => {
                self.bump();
                match self.peek() {
                    Some(c) if c.is_ascii_alphabetic() => {}
                    Some(c) => {
                        return Err(self.error_here(TurtleErrorKind::UnexpectedCharacter(c), c))
                    }
                    None => return Err(self.error_here(TurtleErrorKind::PrematureEof, "")),
                }
                while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '-') {
                    self.bump();
                }
            }
            Some('^') if self.peek_at(1) == Some('^') => {
                self.bump();
                self.bump();
                match self.peek() {
                    Some('<') => self.scan_iri_ref()?,
                    Some(c) if is_name_start(c) || c == ':' => self.scan_prefixed_name()?,
                    Some(c) => {
                        return Err(self.error_here(TurtleErrorKind::UnexpectedCharacter(c), c))
                    }
                    None => return Err(self.error_here(TurtleErrorKind::PrematureEof, "")),
                }
            }
            _ => {}
        }
        Ok(())
    }

    // [22] STRING_LITERAL_QUOTE / [23] STRING_LITERAL_SINGLE_QUOTE
    fn scan_short_quoted(&mut self, quote: char, start: usize) -> Result<(), TurtleError> {
        self.bump();
        loop {
            match self.peek() {
                None | Some('\n') | Some('\r') => {
                    return Err(self.error_here(
                        TurtleErrorKind::UnterminatedLiteral,
                        &self.input[start..self.pos],
                    ))
                }
                Some(c) if c == quote => {
                    self.bump();
                    return Ok(());
                }
                Some('\\') => {
                    self.bump();
                    if self.bump().is_none() {
                        return Err(self.error_here(
                            TurtleErrorKind::UnterminatedLiteral,
                            &self.input[start..self.pos],
                        ));
                    }
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    // [25] STRING_LITERAL_LONG_QUOTE / [24] STRING_LITERAL_LONG_SINGLE_QUOTE
    //
    // May span newlines and contain single or double quote pairs; when a run
    // of quotes ends the body, the last three of the run close the literal.
    fn scan_long_quoted(&mut self, quote: char, start: usize) -> Result<(), TurtleError> {
        self.bump();
        self.bump();
        self.bump();
        loop {
            match self.peek() {
                None => {
                    return Err(self.error_here(
                        TurtleErrorKind::UnterminatedLiteral,
                        &self.input[start..self.pos],
                    ))
                }
                Some(c) if c == quote => {
                    let mut run = 0;
                    while self.peek() == Some(quote) {
                        self.bump();
                        run += 1;
                    }
                    if run >= 3 {
                        return Ok(());
                    }
                }
                Some('\\') => {
                    self.bump();
                    if self.bump().is_none() {
                        return Err(self.error_here(
                            TurtleErrorKind::UnterminatedLiteral,
                            &self.input[start..self.pos],
                        ));
                    }
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, TurtleError>;

    /// Yields every token up to and including the first [`TokenKind::Eof`],
    /// then stops. A tokenizer error ends the stream as well.
    fn next(&mut self) -> Option<Result<Token, TurtleError>> {
        if self.pos > self.input.len() {
            return None;
        }
        match self.next_token() {
            Ok(token) => {
                if token.kind == TokenKind::Eof {
                    // move past the end so the next call returns None
                    self.pos = self.input.len() + 1;
                }
                Some(Ok(token))
            }
            Err(error) => {
                self.pos = self.input.len() + 1;
                Some(Err(error))
            }
        }
    }
}

// Permissive take on [163s] PN_CHARS_BASE: any alphabetic character
pub(crate) fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

// Permissive take on [166s] PN_CHARS
pub(crate) fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-')
}
