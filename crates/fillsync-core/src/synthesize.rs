//! Field declaration synthesis
//!
//! Pure text transformation: given a model source and a column sequence,
//! produce the source with its `$fillable` (or `$guarded`) declaration
//! replaced or inserted. Performs no I/O and is idempotent; running the
//! synthesizer over its own output yields byte-identical text.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

use crate::extract::ColumnDef;

/// The two mutually exclusive mutable-field declaration modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMode {
    /// Allow-list: `protected $fillable = [...]`
    Fillable,
    /// Deny-list: `protected $guarded = [...]`
    Guarded,
}

impl FieldMode {
    /// The PHP property name this mode writes.
    pub fn property(&self) -> &'static str {
        match self {
            FieldMode::Fillable => "fillable",
            FieldMode::Guarded => "guarded",
        }
    }

    /// Structural signature of an existing same-mode declaration. Matches
    /// regardless of formatting, including multi-line array bodies.
    fn signature(&self) -> &'static Regex {
        static FILLABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"(?s)protected\s+\$fillable\s*=\s*\[.*?\]\s*;").unwrap()
        });
        static GUARDED_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"(?s)protected\s+\$guarded\s*=\s*\[.*?\]\s*;").unwrap()
        });
        match self {
            FieldMode::Fillable => &FILLABLE_RE,
            FieldMode::Guarded => &GUARDED_RE,
        }
    }
}

impl std::fmt::Display for FieldMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.property())
    }
}

/// Render the canonical declaration for a column sequence.
///
/// Column names are opaque strings; quotes and backslashes are escaped, not
/// validated. An empty sequence still renders `[]`; an explicit empty list
/// is observably different from no declaration at all.
fn render(columns: &[ColumnDef], mode: FieldMode) -> String {
    let body = columns
        .iter()
        .map(|c| format!("'{}'", escape(&c.name)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("protected ${} = [{}];", mode.property(), body)
}

fn escape(name: &str) -> String {
    name.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Produce the model source with its declaration synchronized to `columns`.
///
/// An existing same-mode declaration is replaced wholesale; otherwise the
/// new declaration is inserted immediately after the first `{` (the class
/// body opener). Everything else is preserved byte-for-byte.
pub fn synthesize(text: &str, columns: &[ColumnDef], mode: FieldMode) -> String {
    let declaration = render(columns, mode);

    if mode.signature().is_match(text) {
        return mode
            .signature()
            .replace(text, NoExpand(&declaration))
            .into_owned();
    }

    match text.find('{') {
        Some(brace) => {
            let mut out = String::with_capacity(text.len() + declaration.len() + 6);
            out.push_str(&text[..=brace]);
            out.push_str("\n    ");
            out.push_str(&declaration);
            out.push_str(&text[brace + 1..]);
            out
        }
        None => {
            // No structural boundary; append rather than lose the declaration
            let mut out = text.to_string();
            if !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&declaration);
            out.push('\n');
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn columns(names: &[&str]) -> Vec<ColumnDef> {
        names
            .iter()
            .map(|n| ColumnDef::new(*n, "string"))
            .collect()
    }

    const BARE_MODEL: &str = "<?php

class User extends Model
{
    public function posts()
    {
        return $this->hasMany(Post::class);
    }
}
";

    #[test]
    fn inserts_after_class_opening_brace() {
        let result = synthesize(BARE_MODEL, &columns(&["id", "name"]), FieldMode::Fillable);
        assert!(result.contains("{\n    protected $fillable = ['id', 'name'];"));
        // Everything outside the insertion is untouched
        assert!(result.contains("return $this->hasMany(Post::class);"));
        assert_eq!(result.matches("protected $fillable").count(), 1);
    }

    #[test]
    fn replaces_existing_declaration_in_place() {
        let model = "<?php
class User extends Model
{
    protected $fillable = ['old'];

    protected $casts = [];
}
";
        let result = synthesize(model, &columns(&["id", "name"]), FieldMode::Fillable);
        let expected = "<?php
class User extends Model
{
    protected $fillable = ['id', 'name'];

    protected $casts = [];
}
";
        assert_eq!(result, expected);
    }

    #[test]
    fn replaces_multiline_declaration() {
        let model = "class User extends Model
{
    protected $fillable = [
        'a',
        'b',
    ];
}
";
        let result = synthesize(model, &columns(&["c"]), FieldMode::Fillable);
        assert!(result.contains("protected $fillable = ['c'];"));
        assert!(!result.contains("'a'"));
    }

    #[test]
    fn is_idempotent() {
        for model in [BARE_MODEL, "class X extends Model {\n}\n"] {
            let cols = columns(&["id", "email"]);
            let once = synthesize(model, &cols, FieldMode::Fillable);
            let twice = synthesize(&once, &cols, FieldMode::Fillable);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn guarded_mode_leaves_fillable_alone() {
        let model = "class User extends Model
{
    protected $fillable = ['name'];
}
";
        let result = synthesize(model, &columns(&["id"]), FieldMode::Guarded);
        // A different-mode declaration is not the canonical one; insert fresh
        assert!(result.contains("protected $guarded = ['id'];"));
        assert!(result.contains("protected $fillable = ['name'];"));
    }

    #[test]
    fn empty_columns_render_explicit_empty_list() {
        let result = synthesize(BARE_MODEL, &[], FieldMode::Guarded);
        assert!(result.contains("protected $guarded = [];"));
    }

    #[test]
    fn escapes_quotes_and_backslashes() {
        let cols = vec![ColumnDef::new("it's", "string"), ColumnDef::new("a\\b", "string")];
        let result = synthesize(BARE_MODEL, &cols, FieldMode::Fillable);
        assert!(result.contains(r"protected $fillable = ['it\'s', 'a\\b'];"));
    }

    #[test]
    fn no_brace_appends_declaration() {
        let result = synthesize("<?php // stub", &columns(&["id"]), FieldMode::Fillable);
        assert!(result.ends_with("protected $fillable = ['id'];\n"));
    }

    #[test]
    fn dollar_sign_in_replacement_is_literal() {
        // Regression guard: "$fillable" in the rendered text must not be
        // treated as a capture-group reference during replacement.
        let model = "class U extends Model { protected $fillable = ['x']; }";
        let result = synthesize(model, &columns(&["y"]), FieldMode::Fillable);
        assert_eq!(
            result,
            "class U extends Model { protected $fillable = ['y']; }"
        );
    }
}
