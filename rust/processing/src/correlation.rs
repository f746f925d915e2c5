// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Panel identity tokens and their correlation with regenerated host panels
//!
//! A host assembly pairs cells and panels by list position only. The
//! position is captured once at extraction as the panel's ordinal index and
//! carried in its identity token, so reconstruction never relies on the
//! order of the abstract panel list.

use crate::error::{Error, Result};
use crate::schema::{Panel, PanelKind};
use bim_bridge_core::HostId;
use rustc_hash::FxHashMap;
use std::fmt;
use std::str::FromStr;

/// Separates the fields of an identity token
pub const TOKEN_DELIMITER: char = ',';

/// Precedes a delimiter or another escape inside the type name field
pub const TOKEN_ESCAPE: char = '\\';

/// Ordinal index, type name and optional classification of a panel.
///
/// Encoded as `"{index},{type}"` or `"{index},{type},{classification}"`.
/// Delimiters in the type name are written as `\,`, so `Glass, Clear` at
/// index 2 encodes as `2,Glass\, Clear`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PanelIdentity {
    index: usize,
    type_name: String,
    kind: Option<PanelKind>,
}

impl PanelIdentity {
    pub fn new(index: usize, type_name: impl Into<String>) -> Self {
        Self {
            index,
            type_name: type_name.into(),
            kind: None,
        }
    }

    pub fn with_kind(mut self, kind: PanelKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[inline]
    pub fn kind(&self) -> Option<PanelKind> {
        self.kind
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }

    pub fn decode(token: &str) -> Result<Self> {
        let fields = split_fields(token)?;
        let (index, type_name, kind) = match fields.as_slice() {
            [index, type_name] => (index, type_name, None),
            [index, type_name, kind] => (index, type_name, Some(kind)),
            _ => {
                return Err(Error::invalid_token(
                    token,
                    format!("expected 2 or 3 fields, found {}", fields.len()),
                ))
            }
        };

        let index = index
            .trim()
            .parse::<usize>()
            .map_err(|err| Error::invalid_token(token, format!("bad index: {}", err)))?;
        let kind = kind
            .map(|k| {
                k.parse::<PanelKind>()
                    .map_err(|_| Error::invalid_token(token, format!("unknown classification {:?}", k)))
            })
            .transpose()?;

        Ok(Self {
            index,
            type_name: type_name.to_string(),
            kind,
        })
    }
}

/// Splits on unescaped delimiters and unescapes each field
fn split_fields(token: &str) -> Result<Vec<String>> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = token.chars();
    while let Some(c) = chars.next() {
        match c {
            TOKEN_ESCAPE => match chars.next() {
                Some(escaped) => field.push(escaped),
                None => return Err(Error::invalid_token(token, "dangling escape")),
            },
            TOKEN_DELIMITER => fields.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }
    fields.push(field);
    Ok(fields)
}

impl fmt::Display for PanelIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.index, TOKEN_DELIMITER)?;
        for c in self.type_name.chars() {
            if c == TOKEN_DELIMITER || c == TOKEN_ESCAPE {
                write!(f, "{}", TOKEN_ESCAPE)?;
            }
            write!(f, "{}", c)?;
        }
        if let Some(kind) = self.kind {
            write!(f, "{}{}", TOKEN_DELIMITER, kind)?;
        }
        Ok(())
    }
}

impl FromStr for PanelIdentity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}

impl TryFrom<String> for PanelIdentity {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::decode(&value)
    }
}

impl From<PanelIdentity> for String {
    fn from(identity: PanelIdentity) -> Self {
        identity.encode()
    }
}

/// Ordinal index to panel type lookup
#[derive(Debug, Clone, Default)]
pub struct PanelCorrelationIndex {
    types: FxHashMap<usize, String>,
}

/// Host panels paired with the type recorded at their position
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Correlation<'a> {
    pub matched: Vec<(HostId, &'a str)>,
    pub unmatched: Vec<HostId>,
}

impl PanelCorrelationIndex {
    /// Index panels by their identity. A repeated index keeps the first panel.
    pub fn from_panels<'a>(panels: impl IntoIterator<Item = &'a Panel>) -> Self {
        let mut types = FxHashMap::default();
        for panel in panels {
            let identity = &panel.identity;
            if types.contains_key(&identity.index()) {
                tracing::warn!(
                    index = identity.index(),
                    panel = %panel.name,
                    "Duplicate panel index, keeping the first panel"
                );
                continue;
            }
            types.insert(identity.index(), identity.type_name().to_string());
        }
        Self { types }
    }

    pub fn type_at(&self, index: usize) -> Option<&str> {
        self.types.get(&index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Pair host panels, given in generation order, with the recorded type at
    /// the same ordinal index
    pub fn correlate(&self, host_panels: &[HostId]) -> Correlation<'_> {
        let mut correlation = Correlation::default();
        for (index, &panel) in host_panels.iter().enumerate() {
            match self.type_at(index) {
                Some(type_name) => correlation.matched.push((panel, type_name)),
                None => correlation.unmatched.push(panel),
            }
        }
        correlation
    }
}
