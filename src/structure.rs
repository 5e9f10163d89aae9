//! Struct type metadata: naming, field layout, and a memoizing store.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::comment::{self, CommentGroup, Directive};

/// Struct tag key recognized on fields.
pub const TAG_NAME: &str = "exhaustruct";
/// Tag value marking a field as optional.
pub const OPTIONAL_TAG_VALUE: &str = "optional";
/// Display name used for unnamed struct types.
pub const ANONYMOUS: &str = "<anonymous>";

/// Handle of a resolved record type in the run's type table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub u32);

/// A field as declared by the front end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    /// Raw struct tag, e.g. `json:"a" exhaustruct:"optional"`.
    #[serde(default)]
    pub tag: String,
}

impl FieldDecl {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tag: String::new(),
        }
    }

    pub fn tagged(name: &str, tag: &str) -> Self {
        Self {
            name: name.to_string(),
            tag: tag.to_string(),
        }
    }
}

/// A resolved struct type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordType {
    /// Declared name; `None` for anonymous struct types.
    #[serde(default)]
    pub name: Option<String>,
    pub package_name: String,
    pub package_path: String,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    /// Comment groups related to the type declaration.
    #[serde(default)]
    pub comments: Vec<CommentGroup>,
}

/// Arena of record types for one analysis run.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    types: Vec<RecordType>,
}

impl TypeTable {
    pub fn new(types: Vec<RecordType>) -> Self {
        Self { types }
    }

    /// Add a type and return its handle.
    pub fn insert(&mut self, ty: RecordType) -> TypeId {
        self.types.push(ty);
        TypeId((self.types.len() - 1) as u32)
    }

    pub fn get(&self, id: TypeId) -> Option<&RecordType> {
        self.types.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Naming information of a struct type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    pub name: String,
    pub package_name: String,
    pub package_path: String,
}

impl TypeInfo {
    pub fn of(ty: &RecordType) -> Self {
        Self {
            name: ty.name.clone().unwrap_or_else(|| ANONYMOUS.to_string()),
            package_name: ty.package_name.clone(),
            package_path: ty.package_path.clone(),
        }
    }

    /// Key matched against include/exclude patterns: `path.Name`.
    pub fn matching_key(&self) -> String {
        format!("{}.{}", self.package_path, self.name)
    }

    /// User-facing name: `pkg.Name`.
    pub fn short_name(&self) -> String {
        format!("{}.{}", self.package_name, self.name)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.matching_key())
    }
}

/// A field of a struct as seen by the gap calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub exported: bool,
    pub optional: bool,
}

impl Field {
    pub fn from_decl(decl: &FieldDecl) -> Self {
        Self {
            name: decl.name.clone(),
            exported: is_exported(&decl.name),
            optional: has_optional_tag(&decl.tag),
        }
    }
}

/// Fields of a struct in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructFields(pub Vec<Field>);

impl StructFields {
    pub fn from_decls(decls: &[FieldDecl]) -> Self {
        Self(decls.iter().map(Field::from_decl).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.0.iter()
    }

    /// Whether any field must be set explicitly.
    pub fn has_required(&self) -> bool {
        self.0.iter().any(|f| !f.optional)
    }

    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|f| f.name.clone()).collect()
    }
}

impl fmt::Display for StructFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names().join(", "))
    }
}

/// Go export rule: the name starts with an upper-case letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().map(char::is_uppercase).unwrap_or(false)
}

/// Whether a struct tag carries `exhaustruct:"optional"`.
pub fn has_optional_tag(tag: &str) -> bool {
    lookup_tag(tag, TAG_NAME).as_deref() == Some(OPTIONAL_TAG_VALUE)
}

/// Look up `key` in a conventional `key:"value" key2:"value2"` struct tag.
///
/// Returns `None` when the key is absent or the tag is malformed at or
/// before the key.
pub fn lookup_tag(tag: &str, key: &str) -> Option<String> {
    let mut rest = tag;

    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            return None;
        }

        let name_len = rest
            .find(|c: char| c <= ' ' || c == ':' || c == '"' || c == '\x7f')
            .unwrap_or(rest.len());
        if name_len == 0 || !rest[name_len..].starts_with(":\"") {
            return None;
        }
        let name = &rest[..name_len];
        rest = &rest[name_len + 1..];

        // Scan the quoted value, honoring backslash escapes.
        let bytes = rest.as_bytes();
        let mut i = 1;
        while i < bytes.len() && bytes[i] != b'"' {
            if bytes[i] == b'\\' {
                i += 1;
            }
            i += 1;
        }
        if i >= bytes.len() {
            return None;
        }
        let quoted = &rest[1..i];
        rest = &rest[i + 1..];

        if name == key {
            return Some(unquote(quoted));
        }
    }
}

fn unquote(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// Everything the engine needs about one struct type.
#[derive(Debug, Clone)]
pub struct StructInfo {
    pub info: TypeInfo,
    pub fields: StructFields,
    /// Directive attached to the type declaration.
    pub directive: Directive,
}

impl StructInfo {
    pub fn from_record(ty: &RecordType) -> Self {
        let groups: Vec<&CommentGroup> = ty.comments.iter().collect();
        Self {
            info: TypeInfo::of(ty),
            fields: StructFields::from_decls(&ty.fields),
            directive: comment::last_directive(&groups),
        }
    }
}

/// Memoized struct metadata keyed by type identity.
///
/// Entries are computed on first lookup and never evicted. Concurrent misses
/// on the same key may compute twice; the later insert wins.
#[derive(Debug, Default)]
pub struct InfoCache {
    infos: RwLock<HashMap<TypeId, Arc<StructInfo>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl InfoCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata for `id`, or `None` if the table has no such type.
    pub fn get(&self, types: &TypeTable, id: TypeId) -> Option<Arc<StructInfo>> {
        if let Some(info) = self.read().get(&id) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Some(Arc::clone(info));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let record = types.get(id)?;
        let info = Arc::new(StructInfo::from_record(record));

        let mut infos = match self.infos.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        infos.insert(id, Arc::clone(&info));

        Some(info)
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<TypeId, Arc<StructInfo>>> {
        match self.infos.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
