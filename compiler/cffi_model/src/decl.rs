//! Declarations produced by the C parser.

use std::fmt;

use crate::TypeId;

/// What a declaration declares.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Typedef,
    Function,
    Struct,
    Union,
    /// An anonymous struct, union or enum named by a typedef.
    Anonymous,
    Constant,
    Enum,
    Macro,
    Variable,
    /// A kind this model does not know; kept so the compiler can report it.
    Other(String),
}

impl DeclKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Typedef => "typedef",
            Self::Function => "function",
            Self::Struct => "struct",
            Self::Union => "union",
            Self::Anonymous => "anonymous",
            Self::Constant => "constant",
            Self::Enum => "enum",
            Self::Macro => "macro",
            Self::Variable => "variable",
            Self::Other(kind) => kind,
        }
    }

    /// Parse the kind half of a `"kind name"` key.
    pub fn parse(kind: &str) -> Self {
        match kind {
            "typedef" => Self::Typedef,
            "function" => Self::Function,
            "struct" => Self::Struct,
            "union" => Self::Union,
            "anonymous" => Self::Anonymous,
            "constant" => Self::Constant,
            "enum" => Self::Enum,
            "macro" => Self::Macro,
            "variable" => Self::Variable,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of a `#define` as written in the interface description.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MacroValue {
    /// `#define FOO ...`: take whatever the headers say.
    Unknown,
    /// `#define FOO 42`: checked against the headers at load time.
    Int(i128),
}

/// What a declaration points at.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeclTarget {
    Type(TypeId),
    Macro(MacroValue),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Declaration {
    pub kind: DeclKind,
    pub name: String,
    pub target: DeclTarget,
}

impl Declaration {
    pub fn new(kind: DeclKind, name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            kind,
            name: name.into(),
            target: DeclTarget::Type(ty),
        }
    }

    /// The `"kind name"` key declarations are ordered by.
    pub fn key(&self) -> String {
        format!("{} {}", self.kind, self.name)
    }

    /// The declared type, if the target is one.
    pub fn ty(&self) -> Option<TypeId> {
        match self.target {
            DeclTarget::Type(ty) => Some(ty),
            DeclTarget::Macro(_) => None,
        }
    }
}

/// All declarations of one interface.
///
/// Duplicate keys are kept; deciding whether they conflict is the
/// compiler's job.
#[derive(Clone, Debug, Default)]
pub struct Declarations {
    entries: Vec<Declaration>,
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, decl: Declaration) {
        self.entries.push(decl);
    }

    pub fn typedef(&mut self, name: &str, ty: TypeId) {
        self.push(Declaration::new(DeclKind::Typedef, name, ty));
    }

    /// `ty` must be the function pointer form of the function.
    pub fn function(&mut self, name: &str, ty: TypeId) {
        self.push(Declaration::new(DeclKind::Function, name, ty));
    }

    pub fn struct_(&mut self, name: &str, ty: TypeId) {
        self.push(Declaration::new(DeclKind::Struct, name, ty));
    }

    pub fn union(&mut self, name: &str, ty: TypeId) {
        self.push(Declaration::new(DeclKind::Union, name, ty));
    }

    pub fn anonymous(&mut self, typedef_name: &str, ty: TypeId) {
        self.push(Declaration::new(DeclKind::Anonymous, typedef_name, ty));
    }

    pub fn constant(&mut self, name: &str, ty: TypeId) {
        self.push(Declaration::new(DeclKind::Constant, name, ty));
    }

    pub fn enum_(&mut self, name: &str, ty: TypeId) {
        self.push(Declaration::new(DeclKind::Enum, name, ty));
    }

    pub fn variable(&mut self, name: &str, ty: TypeId) {
        self.push(Declaration::new(DeclKind::Variable, name, ty));
    }

    pub fn macro_(&mut self, name: &str, value: MacroValue) {
        self.push(Declaration {
            kind: DeclKind::Macro,
            name: name.to_owned(),
            target: DeclTarget::Macro(value),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.entries.iter()
    }

    /// Declarations ordered by key; ties keep insertion order.
    pub fn sorted(&self) -> Vec<&Declaration> {
        let mut keyed: Vec<(String, &Declaration)> =
            self.entries.iter().map(|d| (d.key(), d)).collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed.into_iter().map(|(_, d)| d).collect()
    }
}

#[cfg(test)]
mod tests;
