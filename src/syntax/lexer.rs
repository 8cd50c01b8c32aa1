//! Tokens of a file header (package and import directives).

use logos::Logos;

use crate::base::{Name, TextRange, TextSize};

#[derive(Logos, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\f]+")]
pub enum TokenKind {
    #[token("package")]
    Package,
    #[token("import")]
    Import,
    #[token("as")]
    As,
    #[token(".")]
    Dot,
    #[token("*")]
    Star,
    #[token(";")]
    Semicolon,
    #[token("\n")]
    Newline,

    #[regex(r"[\p{L}\p{Nl}_][\p{L}\p{N}\p{M}\p{Pc}]*", |lex| Name::is_valid_identifier(lex.slice()))]
    Ident,
    #[regex(r"`[^`\r\n]+`")]
    QuotedIdent,

    #[regex(r"//[^\n]*", logos::skip, allow_greedy = true)]
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", logos::skip)]
    Comment,
}

impl TokenKind {
    pub fn is_name(self) -> bool {
        matches!(self, TokenKind::Ident | TokenKind::QuotedIdent)
    }

    /// Human-readable description for error messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Package => "'package'",
            TokenKind::Import => "'import'",
            TokenKind::As => "'as'",
            TokenKind::Dot => "'.'",
            TokenKind::Star => "'*'",
            TokenKind::Semicolon => "';'",
            TokenKind::Newline => "line break",
            TokenKind::Ident | TokenKind::QuotedIdent => "identifier",
            TokenKind::Comment => "comment",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub range: TextRange,
}

/// Tokenize `text`. Unrecognized input is returned as `Err(range)`.
pub fn tokenize(text: &str) -> Result<Vec<Token>, TextRange> {
    let mut lexer = TokenKind::lexer(text);
    let mut tokens = Vec::new();
    while let Some(kind) = lexer.next() {
        let span = lexer.span();
        let range = TextRange::new(
            TextSize::from(span.start as u32),
            TextSize::from(span.end as u32),
        );
        match kind {
            Ok(kind) => tokens.push(Token { kind, range }),
            Err(()) => return Err(range),
        }
    }
    Ok(tokens)
}
