//! File header syntax: `package` and `import` directives.

mod import;
mod lexer;

pub use import::{ImportDirective, ImportHeader, NameReference, ParseError, parse_header};
pub use lexer::{Token, TokenKind, tokenize};
