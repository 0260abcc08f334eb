// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Canonical type identity.
//!
//! A [`TypeDescriptor`] names one concrete type: a dotted path such as
//! `acme.shop.Order` plus an ordered list of type arguments, each itself a
//! descriptor. `collections.List<acme.shop.Order>` and
//! `collections.List<acme.shop.Customer>` are distinct descriptors.
//!
//! Descriptors are the memoization key of a resolution session, so equality,
//! hashing and ordering are structural over `(path, args)`. Cloning is an
//! `Arc` increment.
//!
//! # Textual form
//!
//! ```text
//! descriptor := path [ '<' descriptor { ',' descriptor } '>' ]
//! path       := ident { '.' ident }
//! ident      := (ALPHA | '_') { ALNUM | '_' }
//! ```
//!
//! Whitespace around `<`, `,` and `>` is ignored; [`TypeDescriptor::signature`]
//! always renders the canonical form `a.B<c.D, e.F>`.

use std::fmt;
use std::iter::Peekable;
use std::str::{CharIndices, FromStr};
use std::sync::Arc;

use thiserror::Error;

/// Errors raised while parsing a descriptor signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("empty type descriptor")]
    Empty,

    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unexpected end of descriptor (expected {expected})")]
    UnexpectedEnd { expected: &'static str },

    #[error("invalid path segment '{segment}'")]
    InvalidSegment { segment: String },
}

#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct DescriptorInner {
    path: String,
    args: Vec<TypeDescriptor>,
}

/// Identifier of a concrete, fully-parameterized type.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeDescriptor {
    inner: Arc<DescriptorInner>,
}

impl TypeDescriptor {
    /// Non-generic descriptor for `path`.
    ///
    /// The path is taken verbatim; use [`str::parse`] to validate untrusted input.
    pub fn new(path: impl Into<String>) -> Self {
        Self::generic(path, Vec::new())
    }

    /// Descriptor for `path` parameterized by `args`.
    pub fn generic(path: impl Into<String>, args: Vec<TypeDescriptor>) -> Self {
        Self {
            inner: Arc::new(DescriptorInner {
                path: path.into(),
                args,
            }),
        }
    }

    /// Raw dotted path without type arguments (`acme.shop.Page`).
    pub fn qualified_name(&self) -> &str {
        &self.inner.path
    }

    /// Last path segment (`Page`).
    pub fn simple_name(&self) -> &str {
        match self.inner.path.rfind('.') {
            Some(idx) => &self.inner.path[idx + 1..],
            None => &self.inner.path,
        }
    }

    /// Everything before the last path segment (`acme.shop`), empty for root types.
    pub fn namespace(&self) -> &str {
        match self.inner.path.rfind('.') {
            Some(idx) => &self.inner.path[..idx],
            None => "",
        }
    }

    pub fn args(&self) -> &[TypeDescriptor] {
        &self.inner.args
    }

    pub fn is_generic(&self) -> bool {
        !self.inner.args.is_empty()
    }

    /// Canonical signature including arguments (`acme.shop.Page<acme.shop.Order>`).
    pub fn signature(&self) -> String {
        let mut out = String::with_capacity(self.inner.path.len());
        self.write_signature(&mut out);
        out
    }

    /// Simple name followed by the short names of every argument
    /// (`Page<Map<String, Order>>` -> `PageMapStringOrder`).
    pub fn short_name(&self) -> String {
        let mut out = String::from(self.simple_name());
        for arg in self.args() {
            out.push_str(&arg.short_name());
        }
        out
    }

    /// [`short_name`](Self::short_name) prefixed by the namespace, if any.
    pub fn namespaced_short_name(&self) -> String {
        let ns = self.namespace();
        if ns.is_empty() {
            self.short_name()
        } else {
            format!("{}.{}", ns, self.short_name())
        }
    }

    /// True if the path lies in `package` (whole-segment match).
    ///
    /// `package` may end with a `.`; `core` matches `core.String` and
    /// `core.time.Instant` but not `corelib.Thing`.
    pub fn in_package(&self, package: &str) -> bool {
        let package = package.trim_end_matches('.');
        if package.is_empty() {
            return false;
        }
        let path = self.qualified_name();
        path.len() > package.len()
            && path.starts_with(package)
            && path.as_bytes()[package.len()] == b'.'
    }

    fn write_signature(&self, out: &mut String) {
        out.push_str(&self.inner.path);
        if self.inner.args.is_empty() {
            return;
        }
        out.push('<');
        for (idx, arg) in self.inner.args.iter().enumerate() {
            if idx > 0 {
                out.push_str(", ");
            }
            arg.write_signature(out);
        }
        out.push('>');
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature())
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDescriptor({})", self.signature())
    }
}

impl FromStr for TypeDescriptor {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(DescriptorError::Empty);
        }
        let mut parser = Parser {
            chars: s.char_indices().peekable(),
        };
        let descriptor = parser.descriptor()?;
        parser.skip_ws();
        match parser.chars.next() {
            None => Ok(descriptor),
            Some((offset, ch)) => Err(DescriptorError::UnexpectedChar { ch, offset }),
        }
    }
}

impl serde::Serialize for TypeDescriptor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.signature())
    }
}

impl<'de> serde::Deserialize<'de> for TypeDescriptor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

struct Parser<'a> {
    chars: Peekable<CharIndices<'a>>,
}

impl Parser<'_> {
    fn skip_ws(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn descriptor(&mut self) -> Result<TypeDescriptor, DescriptorError> {
        self.skip_ws();
        let path = self.path()?;
        self.skip_ws();

        let mut args = Vec::new();
        if matches!(self.chars.peek(), Some((_, '<'))) {
            self.chars.next();
            loop {
                args.push(self.descriptor()?);
                self.skip_ws();
                match self.chars.next() {
                    Some((_, ',')) => continue,
                    Some((_, '>')) => break,
                    Some((offset, ch)) => {
                        return Err(DescriptorError::UnexpectedChar { ch, offset })
                    }
                    None => return Err(DescriptorError::UnexpectedEnd { expected: "'>'" }),
                }
            }
        }

        Ok(TypeDescriptor::generic(path, args))
    }

    fn path(&mut self) -> Result<String, DescriptorError> {
        let mut path = String::new();
        loop {
            let segment = self.ident()?;
            path.push_str(&segment);
            if matches!(self.chars.peek(), Some((_, '.'))) {
                self.chars.next();
                path.push('.');
            } else {
                return Ok(path);
            }
        }
    }

    fn ident(&mut self) -> Result<String, DescriptorError> {
        let mut segment = String::new();
        while let Some(&(_, ch)) = self.chars.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                segment.push(ch);
                self.chars.next();
            } else {
                break;
            }
        }

        if segment.is_empty() {
            return match self.chars.peek() {
                Some(&(offset, ch)) => Err(DescriptorError::UnexpectedChar { ch, offset }),
                None => Err(DescriptorError::UnexpectedEnd {
                    expected: "identifier",
                }),
            };
        }
        if segment.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(DescriptorError::InvalidSegment { segment });
        }
        Ok(segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> TypeDescriptor {
        s.parse().expect("valid descriptor")
    }

    #[test]
    fn test_parse_plain_path() {
        let d = parse("acme.shop.Order");
        assert_eq!(d.qualified_name(), "acme.shop.Order");
        assert_eq!(d.simple_name(), "Order");
        assert_eq!(d.namespace(), "acme.shop");
        assert!(!d.is_generic());
    }

    #[test]
    fn test_parse_nested_generics() {
        let d = parse("acme.Page< collections.Map<core.String,acme.Order> >");
        assert_eq!(d.args().len(), 1);
        assert_eq!(d.args()[0].args().len(), 2);
        assert_eq!(
            d.signature(),
            "acme.Page<collections.Map<core.String, acme.Order>>"
        );
        assert_eq!(d.short_name(), "PageMapStringOrder");
        assert_eq!(d.namespaced_short_name(), "acme.PageMapStringOrder");
    }

    #[test]
    fn test_signature_roundtrips_through_parser() {
        let d = parse("collections.List<acme.Order>");
        assert_eq!(parse(&d.signature()), d);
    }

    #[test]
    fn test_generic_parameterization_is_part_of_identity() {
        let orders = parse("collections.List<acme.Order>");
        let customers = parse("collections.List<acme.Customer>");
        assert_ne!(orders, customers);
        assert_eq!(orders, TypeDescriptor::generic(
            "collections.List",
            vec![TypeDescriptor::new("acme.Order")],
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<TypeDescriptor>(), Err(DescriptorError::Empty));
        assert!(matches!(
            "acme.".parse::<TypeDescriptor>(),
            Err(DescriptorError::UnexpectedEnd { .. })
        ));
        assert!(matches!(
            "acme.List<Order".parse::<TypeDescriptor>(),
            Err(DescriptorError::UnexpectedEnd { .. })
        ));
        assert!(matches!(
            "acme.1Order".parse::<TypeDescriptor>(),
            Err(DescriptorError::InvalidSegment { .. })
        ));
        assert!(matches!(
            "acme.Order>".parse::<TypeDescriptor>(),
            Err(DescriptorError::UnexpectedChar { ch: '>', .. })
        ));
    }

    #[test]
    fn test_in_package_matches_whole_segments() {
        let d = parse("core.time.Instant");
        assert!(d.in_package("core"));
        assert!(d.in_package("core."));
        assert!(d.in_package("core.time"));
        assert!(!d.in_package("cor"));
        assert!(!parse("corelib.Thing").in_package("core"));
        assert!(!parse("core").in_package("core"));
        assert!(!d.in_package(""));
    }

    #[test]
    fn test_root_type_has_empty_namespace() {
        let d = parse("i32");
        assert_eq!(d.namespace(), "");
        assert_eq!(d.namespaced_short_name(), "i32");
    }
}
