//! Name ↔ index tables for the enumerated categories of a run.
//!
//! Activities, location types and age classes are configuration, not code:
//! the network and transition matrices arrive labelled with strings.  A
//! `Labels` table fixes the index of each name once at start-up so the hot
//! path only ever handles the typed `u16` ids.

use crate::{CoreError, CoreResult};

/// An ordered, duplicate-free list of names.  Index `i` names id `i`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Labels {
    kind:  &'static str,
    names: Vec<String>,
}

impl Labels {
    /// Build a table for category `kind` (used only in error messages).
    ///
    /// # Errors
    ///
    /// [`CoreError::DuplicateLabel`] if a name appears twice, and
    /// [`CoreError::Config`] if there are more names than a `u16` id holds.
    pub fn new<I, S>(kind: &'static str, names: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if out.contains(&name) {
                return Err(CoreError::DuplicateLabel { kind, name });
            }
            out.push(name);
        }
        if out.len() >= u16::MAX as usize {
            return Err(CoreError::Config(format!("too many {kind} labels ({})", out.len())));
        }
        Ok(Self { kind, names: out })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Index of `name`, if present.
    pub fn position(&self, name: &str) -> Option<u16> {
        self.names.iter().position(|n| n == name).map(|i| i as u16)
    }

    /// Like [`position`](Self::position) but an unknown name is an error.
    pub fn require(&self, name: &str) -> CoreResult<u16> {
        self.position(name).ok_or_else(|| CoreError::UnknownLabel {
            kind: self.kind,
            name: name.to_owned(),
        })
    }

    /// Name at `index`, or `"?"` when out of range.
    pub fn name(&self, index: usize) -> &str {
        self.names.get(index).map(String::as_str).unwrap_or("?")
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}
