//! Name inflection helpers
//!
//! Covers the conventions used to derive a table name from a model name:
//! `UserProfile` -> `user_profiles`. The pluralizer implements the standard
//! English suffix rules plus a handful of irregulars; anything it does not
//! know about can be overridden with `protected $table` on the model.

/// Irregular plural forms the suffix rules would get wrong.
const IRREGULARS: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
];

/// Convert a StudlyCase or camelCase name to snake_case.
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Uppercase the first character, leaving the rest untouched.
pub fn ucfirst(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Pluralize a singular snake_case word.
pub fn pluralize(word: &str) -> String {
    for (singular, plural) in IRREGULARS {
        if word == *singular {
            return (*plural).to_string();
        }
        // Compounds keep their prefix: "sales_man" -> "sales_men". A bare
        // suffix is not a word boundary ("human" is not a kind of "man").
        if let Some(prefix) = word.strip_suffix(singular)
            && prefix.ends_with('_')
        {
            return format!("{prefix}{plural}");
        }
    }

    let bytes = word.as_bytes();
    if let Some(stem) = word.strip_suffix('y') {
        // "category" -> "categories", but "day" -> "days"
        let preceded_by_vowel = stem
            .bytes()
            .last()
            .is_some_and(|b| matches!(b, b'a' | b'e' | b'i' | b'o' | b'u'));
        if !preceded_by_vowel {
            return format!("{stem}ies");
        }
    }
    if word.ends_with("ch")
        || word.ends_with("sh")
        || matches!(bytes.last(), Some(b's' | b'x' | b'z'))
    {
        return format!("{word}es");
    }
    format!("{word}s")
}

/// Derive the conventional table name for a model: plural snake_case.
pub fn table_name(model: &str) -> String {
    pluralize(&snake_case(model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn snake_case_splits_on_uppercase() {
        assert_eq!(snake_case("UserProfile"), "user_profile");
        assert_eq!(snake_case("User"), "user");
        assert_eq!(snake_case("apiToken"), "api_token");
    }

    #[test]
    fn pluralize_applies_suffix_rules() {
        assert_eq!(pluralize("user"), "users");
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("day"), "days");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("address"), "addresses");
        assert_eq!(pluralize("batch"), "batches");
    }

    #[test]
    fn pluralize_knows_common_irregulars() {
        assert_eq!(pluralize("person"), "people");
        assert_eq!(pluralize("child"), "children");
        assert_eq!(pluralize("sales_man"), "sales_men");
    }

    #[test]
    fn irregulars_require_a_word_boundary() {
        assert_eq!(pluralize("human"), "humans");
        assert_eq!(pluralize("talisman"), "talismans");
    }

    #[test]
    fn table_name_combines_both() {
        assert_eq!(table_name("UserProfile"), "user_profiles");
        assert_eq!(table_name("Category"), "categories");
        assert_eq!(table_name("Person"), "people");
    }

    #[test]
    fn ucfirst_handles_empty_and_unicode() {
        assert_eq!(ucfirst(""), "");
        assert_eq!(ucfirst("user"), "User");
        assert_eq!(ucfirst("User"), "User");
    }
}
