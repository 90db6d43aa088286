//! Column extraction from schema sources
//!
//! Scans migration text for schema-builder calls of the shape
//! `$table-><verb>('<column>' ...)`, taking the verb as the column's type
//! tag. This is a deliberate syntactic approximation, not a parse of the
//! migration. Known blind spots:
//!
//! - calls without a leading string literal are ignored (composite indexes,
//!   `dropColumn(['a', 'b'])` array forms, `timestamps()`);
//! - conditionals and loops around builder calls are not evaluated; every
//!   matching call counts as unconditionally defining its column;
//! - `renameColumn('old', 'new')` is seen only as a definition of `old`.
//!
//! Columns merge across ordered sources by first occurrence; when a later
//! source redefines a column, the last writer wins for the type tag while
//! the position stays at the first occurrence. Drop verbs remove previously
//! collected columns so alteration migrations converge on the final state.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::Result;
use crate::policy::EffectivePolicy;

/// Builder verbs that remove a column instead of defining one.
const DROP_VERBS: &[&str] = &["dropColumn", "removeColumn", "dropSoftDeletes"];

static BUILDER_CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"->\s*(\w+)\(\s*['"]([^'"]+)['"]"#).unwrap());

/// A column extracted from a schema source: name plus the builder verb that
/// defined it. Order within a sequence matches declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub type_tag: String,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, type_tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_tag: type_tag.into(),
        }
    }
}

/// Ordered, name-unique column accumulator.
#[derive(Debug, Default)]
struct ColumnMerge {
    columns: Vec<Option<ColumnDef>>,
    index: HashMap<String, usize>,
}

impl ColumnMerge {
    fn define(&mut self, name: &str, type_tag: &str) {
        match self.index.get(name) {
            Some(&i) => {
                // Redefinition: keep the original position, take the new tag
                if let Some(col) = &mut self.columns[i] {
                    col.type_tag = type_tag.to_string();
                } else {
                    self.columns[i] = Some(ColumnDef::new(name, type_tag));
                }
            }
            None => {
                self.index.insert(name.to_string(), self.columns.len());
                self.columns.push(Some(ColumnDef::new(name, type_tag)));
            }
        }
    }

    fn drop(&mut self, name: &str) {
        if let Some(&i) = self.index.get(name) {
            self.columns[i] = None;
        }
    }

    fn into_columns(self) -> Vec<ColumnDef> {
        self.columns.into_iter().flatten().collect()
    }
}

/// Collect builder calls from one schema source into the accumulator.
fn collect(text: &str, merge: &mut ColumnMerge) {
    for caps in BUILDER_CALL_RE.captures_iter(text) {
        let verb = &caps[1];
        let name = &caps[2];
        if DROP_VERBS.contains(&verb) {
            merge.drop(name);
        } else {
            merge.define(name, verb);
        }
    }
}

/// Extract the filtered column sequence from ordered schema source texts.
pub fn extract_texts(texts: &[String], policy: &EffectivePolicy<'_>) -> Vec<ColumnDef> {
    let mut merge = ColumnMerge::default();
    for text in texts {
        collect(text, &mut merge);
    }
    merge
        .into_columns()
        .into_iter()
        .filter(|col| !policy.excludes(&col.name, &col.type_tag))
        .collect()
}

/// Read and extract from ordered schema source files.
pub fn extract_files(sources: &[PathBuf], policy: &EffectivePolicy<'_>) -> Result<Vec<ColumnDef>> {
    let mut texts = Vec::with_capacity(sources.len());
    for path in sources {
        texts.push(fs::read_to_string(path)?);
    }
    Ok(extract_texts(&texts, policy))
}

/// Filter a catalog-reported column listing through the policy.
///
/// Catalog mode has no type information, so only the name set and the
/// predicate apply; the predicate sees an empty type tag.
pub fn extract_catalog(columns: Vec<String>, policy: &EffectivePolicy<'_>) -> Vec<ColumnDef> {
    columns
        .into_iter()
        .filter(|name| !policy.excludes(name, ""))
        .map(|name| ColumnDef::new(name, ""))
        .collect()
}
