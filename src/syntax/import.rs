//! Package and import directives.
//!
//! Only the file header is parsed: an optional `package` directive followed
//! by `import` directives. Parsing stops at the first token that starts
//! anything else.

use std::fmt;

use thiserror::Error;

use super::lexer::{Token, TokenKind, tokenize};
use crate::base::{FileId, FileRange, FqName, ImportPath, Name, TextRange};

/// A simple name as written in source, with its location.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct NameReference {
    pub name: Name,
    pub range: FileRange,
}

impl fmt::Debug for NameReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:?}", self.name, self.range)
    }
}

/// `import a.b.C`, `import a.b.*`, `import a.b.C as D`, `import package.a.B`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportDirective {
    /// The qualified name, one reference per segment.
    pub segments: Vec<NameReference>,
    pub all_under: bool,
    pub alias: Option<NameReference>,
    /// Written with a leading `package.`.
    pub absolute_in_root_package: bool,
    pub range: FileRange,
}

impl ImportDirective {
    /// Parse the part of an import directive after the `import` keyword.
    pub fn parse(file: FileId, text: &str) -> Result<Self, ParseError> {
        let mut parser = Parser::new(file, text)?;
        let directive = parser.import_body(TextRange::empty(0.into()))?;
        parser.finish()?;
        Ok(directive)
    }

    pub fn fq_name(&self) -> FqName {
        FqName::from_segments(self.segments.iter().map(|s| &s.name))
    }

    pub fn import_path(&self) -> ImportPath {
        let path = ImportPath::new(self.fq_name(), self.all_under);
        match &self.alias {
            Some(alias) => path.with_alias(alias.name.clone()),
            None => path,
        }
    }

    /// The last segment, i.e. the reference diagnostics on the target attach to.
    pub fn last_reference(&self) -> Option<&NameReference> {
        self.segments.last()
    }

    /// The name a single import binds; `None` for all-under imports.
    pub fn alias_name(&self) -> Option<Name> {
        self.import_path().imported_name()
    }
}

/// The parsed header of one file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportHeader {
    pub package: FqName,
    pub imports: Vec<ImportDirective>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unrecognized character at {location:?}")]
    InvalidToken { location: FileRange },

    #[error("expected {expected}, found {found} at {location:?}")]
    Unexpected {
        expected: &'static str,
        found: &'static str,
        location: FileRange,
    },

    #[error("expected {expected}, found end of input")]
    UnexpectedEof { expected: &'static str },
}

/// Parse the `package` and `import` directives at the start of `text`.
pub fn parse_header(file: FileId, text: &str) -> Result<ImportHeader, ParseError> {
    let mut parser = Parser::new(file, text)?;
    let mut header = ImportHeader::default();

    parser.skip_separators();
    if parser.at(TokenKind::Package) {
        parser.bump();
        let segments = parser.qualified_name()?;
        header.package = FqName::from_segments(segments.iter().map(|s| &s.name));
        parser.end_of_directive()?;
    }

    loop {
        parser.skip_separators();
        let Some(start) = parser.peek().filter(|t| t.kind == TokenKind::Import) else {
            break;
        };
        parser.bump();
        let directive = parser.import_body(start.range)?;
        parser.end_of_directive()?;
        header.imports.push(directive);
    }

    tracing::trace!(?file, package = %header.package, imports = header.imports.len(), "parsed header");
    Ok(header)
}

struct Parser<'t> {
    file: FileId,
    text: &'t str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'t> Parser<'t> {
    fn new(file: FileId, text: &'t str) -> Result<Self, ParseError> {
        let tokens = tokenize(text).map_err(|range| ParseError::InvalidToken {
            location: FileRange::new(file, range),
        })?;
        Ok(Self {
            file,
            text,
            tokens,
            pos: 0,
        })
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn peek_nth(&self, n: usize) -> Option<Token> {
        self.tokens.get(self.pos + n).copied()
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|t| t.kind == kind)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    fn skip_separators(&mut self) {
        while self.at(TokenKind::Newline) || self.at(TokenKind::Semicolon) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        match self.bump() {
            Some(token) if token.kind == kind => Ok(token),
            Some(token) => Err(self.unexpected(kind.describe(), token)),
            None => Err(ParseError::UnexpectedEof {
                expected: kind.describe(),
            }),
        }
    }

    fn unexpected(&self, expected: &'static str, found: Token) -> ParseError {
        ParseError::Unexpected {
            expected,
            found: found.kind.describe(),
            location: FileRange::new(self.file, found.range),
        }
    }

    fn name(&mut self) -> Result<NameReference, ParseError> {
        let token = match self.bump() {
            Some(token) if token.kind.is_name() => token,
            Some(token) => return Err(self.unexpected("identifier", token)),
            None => return Err(ParseError::UnexpectedEof { expected: "identifier" }),
        };
        let text = &self.text[token.range];
        let text = match token.kind {
            TokenKind::QuotedIdent => &text[1..text.len() - 1],
            _ => text,
        };
        Ok(NameReference {
            name: Name::identifier(text),
            range: FileRange::new(self.file, token.range),
        })
    }

    /// `a.b.c`, stopping before a trailing `.*`.
    fn qualified_name(&mut self) -> Result<Vec<NameReference>, ParseError> {
        let mut segments = vec![self.name()?];
        while self.at(TokenKind::Dot)
            && self.peek_nth(1).is_some_and(|t| t.kind.is_name())
        {
            self.bump();
            segments.push(self.name()?);
        }
        Ok(segments)
    }

    /// Everything after `import`; `start` is the range of the keyword.
    fn import_body(&mut self, start: TextRange) -> Result<ImportDirective, ParseError> {
        let mut absolute_in_root_package = false;
        if self.at(TokenKind::Package) {
            self.bump();
            self.expect(TokenKind::Dot)?;
            absolute_in_root_package = true;
        }

        let segments = self.qualified_name()?;
        let mut end = segments.last().map_or(start, |s| s.range.range);

        let mut all_under = false;
        let mut alias = None;
        if self.at(TokenKind::Dot) {
            self.bump();
            end = self.expect(TokenKind::Star)?.range;
            all_under = true;
        } else if self.at(TokenKind::As) {
            self.bump();
            let name = self.name()?;
            end = name.range.range;
            alias = Some(name);
        }

        Ok(ImportDirective {
            segments,
            all_under,
            alias,
            absolute_in_root_package,
            range: FileRange::new(self.file, start.cover(end)),
        })
    }

    fn end_of_directive(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            None => Ok(()),
            Some(t) if matches!(t.kind, TokenKind::Newline | TokenKind::Semicolon) => {
                self.bump();
                Ok(())
            }
            Some(t) => Err(self.unexpected("end of directive", t)),
        }
    }

    fn finish(&mut self) -> Result<(), ParseError> {
        self.skip_separators();
        match self.peek() {
            None => Ok(()),
            Some(t) => Err(self.unexpected("end of input", t)),
        }
    }
}
