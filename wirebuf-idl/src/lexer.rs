//! Schema tokenizer.
//!
//! Whitespace separates tokens. `#` starts a comment running to the end of
//! the line. `{`, `}` and `->` always form their own token, so `Point{` and
//! `get(Id)->Reply` split without spaces. Everything else is an opaque name;
//! the parser decides what a valid name is.
use {core::fmt, tracing::trace};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Name(String),
    Use,
    Enum,
    Struct,
    Rpc,
    OpenBrace,
    CloseBrace,
    Arrow,
}

impl TokenKind {
    fn keyword(word: &str) -> Option<Self> {
        Some(match word {
            "use" => Self::Use,
            "enum" => Self::Enum,
            "struct" => Self::Struct,
            "rpc" => Self::Rpc,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Use => "use",
            Self::Enum => "enum",
            Self::Struct => "struct",
            Self::Rpc => "rpc",
            Self::OpenBrace => "{",
            Self::CloseBrace => "}",
            Self::Arrow => "->",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token and the 1-based position of its first character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

struct Lexer<'a> {
    rest: &'a str,
    line: usize,
    column: usize,
    word: String,
    word_start: (usize, usize),
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn bump(&mut self) -> Option<char> {
        let c = self.rest.chars().next()?;
        self.rest = &self.rest[c.len_utf8()..];
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn push(&mut self, kind: TokenKind, (line, column): (usize, usize)) {
        self.tokens.push(Token { kind, line, column });
    }

    fn end_word(&mut self) {
        if self.word.is_empty() {
            return;
        }
        let word = core::mem::take(&mut self.word);
        let kind = TokenKind::keyword(&word).unwrap_or(TokenKind::Name(word));
        self.push(kind, self.word_start);
    }

    fn run(mut self) -> Vec<Token> {
        while let Some(c) = self.rest.chars().next() {
            let here = (self.line, self.column);
            match c {
                '#' => {
                    self.end_word();
                    while self.bump().is_some_and(|c| c != '\n') {}
                }
                '{' | '}' => {
                    self.end_word();
                    self.bump();
                    let kind = if c == '{' {
                        TokenKind::OpenBrace
                    } else {
                        TokenKind::CloseBrace
                    };
                    self.push(kind, here);
                }
                '-' if self.rest.starts_with("->") => {
                    self.end_word();
                    self.bump();
                    self.bump();
                    self.push(TokenKind::Arrow, here);
                }
                c if c.is_whitespace() => {
                    self.end_word();
                    self.bump();
                }
                c => {
                    if self.word.is_empty() {
                        self.word_start = here;
                    }
                    self.word.push(c);
                    self.bump();
                }
            }
        }
        self.end_word();
        self.tokens
    }
}

/// Split `source` into tokens. Lexing never fails.
pub fn lex(source: &str) -> Vec<Token> {
    let tokens = Lexer {
        rest: source,
        line: 1,
        column: 1,
        word: String::new(),
        word_start: (1, 1),
        tokens: Vec::new(),
    }
    .run();
    trace!(count = tokens.len(), "lexed schema");
    tokens
}
