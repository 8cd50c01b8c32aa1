//! Identifier names, fully-qualified names and class identifiers.

use std::fmt;

use smol_str::SmolStr;

/// A simple name of a declaration.
///
/// Names are either ordinary identifiers (`Function2`, `invoke`) or
/// *special* names wrapped in angle brackets (`<stdlib>`). Special names are
/// never visible to user code; modules must carry one.
#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Name(SmolStr);

impl Name {
    /// Create an identifier name. Does not validate; see [`Name::is_valid_identifier`].
    pub fn identifier(text: impl AsRef<str>) -> Self {
        Self(SmolStr::new(text.as_ref()))
    }

    /// Create a special name, `<text>`.
    pub fn special(text: impl AsRef<str>) -> Self {
        Self(SmolStr::new(format!("<{}>", text.as_ref())))
    }

    /// Whether this is a special (`<...>`) name.
    pub fn is_special(&self) -> bool {
        self.0.starts_with('<') && self.0.ends_with('>') && self.0.len() >= 2
    }

    /// Check whether `text` is a well-formed identifier.
    pub fn is_valid_identifier(text: &str) -> bool {
        let mut chars = text.chars();
        match chars.next() {
            Some(first) if first == '_' || unicode_ident::is_xid_start(first) => {}
            _ => return false,
        }
        chars.all(unicode_ident::is_xid_continue)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Name {
    fn from(text: &str) -> Self {
        Name::identifier(text)
    }
}

/// A dot-separated fully-qualified name such as `kotlin.reflect`.
///
/// The root package is the empty name.
#[derive(Clone, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FqName(SmolStr);

impl FqName {
    /// The root (empty) name.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a dotted string. Empty input yields the root.
    pub fn new(text: impl AsRef<str>) -> Self {
        Self(SmolStr::new(text.as_ref()))
    }

    /// Build from segments, in order.
    pub fn from_segments<'a>(segments: impl IntoIterator<Item = &'a Name>) -> Self {
        let joined: Vec<&str> = segments.into_iter().map(Name::as_str).collect();
        Self(SmolStr::new(joined.join(".")))
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The enclosing name. The root has none.
    pub fn parent(&self) -> Option<FqName> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('.') {
            Some(idx) => Some(Self(SmolStr::new(&self.0[..idx]))),
            None => Some(Self::root()),
        }
    }

    /// Append one segment.
    pub fn child(&self, name: &Name) -> FqName {
        if self.is_root() {
            Self(SmolStr::new(name.as_str()))
        } else {
            Self(SmolStr::new(format!("{}.{}", self.0, name)))
        }
    }

    /// Last segment; `None` for the root.
    pub fn short_name(&self) -> Option<Name> {
        if self.is_root() {
            return None;
        }
        let last = self.0.rsplit('.').next().unwrap_or(&self.0);
        Some(Name::identifier(last))
    }

    pub fn segments(&self) -> Vec<Name> {
        if self.is_root() {
            return Vec::new();
        }
        self.0.split('.').map(Name::identifier).collect()
    }

    /// Whether `self` equals `other` or lies underneath it.
    pub fn starts_with(&self, other: &FqName) -> bool {
        if other.is_root() {
            return true;
        }
        self.0 == other.0
            || (self.0.starts_with(other.0.as_str())
                && self.0.as_bytes().get(other.0.len()) == Some(&b'.'))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for FqName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("FqName(<root>)")
        } else {
            write!(f, "FqName({})", self.0)
        }
    }
}

impl fmt::Display for FqName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// Structured identifier of a class: its package plus the class path
/// relative to that package (`Outer.Inner` for nested classes).
#[derive(Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassId {
    package: FqName,
    relative_class_name: FqName,
    local: bool,
}

impl ClassId {
    pub fn new(package: FqName, relative_class_name: FqName, local: bool) -> Self {
        Self {
            package,
            relative_class_name,
            local,
        }
    }

    /// A top-level class in `package`.
    pub fn top_level(package: FqName, name: Name) -> Self {
        Self::new(package, FqName::root().child(&name), false)
    }

    /// Split `a.b.C` into package `a.b` and class `C`.
    pub fn top_level_from_fq_name(fq_name: &FqName) -> Option<Self> {
        let name = fq_name.short_name()?;
        let package = fq_name.parent().unwrap_or_default();
        Some(Self::top_level(package, name))
    }

    /// The id of a class nested inside this one.
    pub fn nested(&self, name: &Name) -> Self {
        Self::new(
            self.package.clone(),
            self.relative_class_name.child(name),
            self.local,
        )
    }

    pub fn package_fq_name(&self) -> &FqName {
        &self.package
    }

    pub fn relative_class_name(&self) -> &FqName {
        &self.relative_class_name
    }

    pub fn short_class_name(&self) -> Name {
        self.relative_class_name
            .short_name()
            .unwrap_or_else(|| Name::special("anonymous"))
    }

    pub fn is_local(&self) -> bool {
        self.local
    }

    pub fn is_nested_class(&self) -> bool {
        self.relative_class_name.as_str().contains('.')
    }

    pub fn as_fq_name(&self) -> FqName {
        let mut fq = self.package.clone();
        for segment in self.relative_class_name.segments() {
            fq = fq.child(&segment);
        }
        fq
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({self})")
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_root() {
            write!(f, "{}", self.relative_class_name)
        } else {
            write!(f, "{}/{}", self.package.as_str().replace('.', "/"), self.relative_class_name)
        }
    }
}

/// The target of an import directive: `a.b.C`, `a.b.*` or `a.b.C as D`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImportPath {
    pub fq_name: FqName,
    pub all_under: bool,
    pub alias: Option<Name>,
}

impl ImportPath {
    pub fn new(fq_name: FqName, all_under: bool) -> Self {
        Self {
            fq_name,
            all_under,
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: Name) -> Self {
        self.alias = Some(alias);
        self
    }

    /// The name a single import binds: the alias, or the last segment.
    /// All-under imports bind no single name.
    pub fn imported_name(&self) -> Option<Name> {
        if self.all_under {
            return None;
        }
        self.alias.clone().or_else(|| self.fq_name.short_name())
    }
}

impl fmt::Display for ImportPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.fq_name.as_str())?;
        if self.all_under {
            f.write_str(if self.fq_name.is_root() { "*" } else { ".*" })?;
        }
        if let Some(alias) = &self.alias {
            write!(f, " as {alias}")?;
        }
        Ok(())
    }
}
