//! Slug derivation for departments, collections, documents, and tags.
//!
//! Slugs are lowercase ASCII with single hyphens between words, matching
//! the slugs already present in seeded data. Provisioned structural tags
//! regenerate their slug whenever the linked entity is renamed.

/// Maximum slug length; longer inputs are truncated at a hyphen boundary
/// where possible.
pub const MAX_SLUG_LEN: usize = 160;

/// Derive a URL-safe slug from a human-readable name.
///
/// Alphanumerics are lowercased and kept; runs of any other characters
/// collapse into a single hyphen; leading/trailing hyphens are stripped.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_hyphen = true;
        }
    }
    truncate_slug(slug)
}

fn truncate_slug(mut slug: String) -> String {
    if slug.len() <= MAX_SLUG_LEN {
        return slug;
    }
    // Cut at a char boundary, then drop any trailing partial word.
    let mut cut = MAX_SLUG_LEN;
    while !slug.is_char_boundary(cut) {
        cut -= 1;
    }
    slug.truncate(cut);
    if let Some(pos) = slug.rfind('-') {
        if pos > 0 {
            slug.truncate(pos);
        }
    }
    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_lowercase_and_hyphens() {
        assert_eq!(slugify("Human Resources"), "human-resources");
        assert_eq!(slugify("IT & Security"), "it-security");
    }

    #[test]
    fn collapses_punctuation_runs() {
        assert_eq!(slugify("Ops -- Playbooks (2024)"), "ops-playbooks-2024");
    }

    #[test]
    fn strips_leading_and_trailing_separators() {
        assert_eq!(slugify("  --Onboarding--  "), "onboarding");
    }

    #[test]
    fn empty_input_yields_empty_slug() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn long_names_truncate_at_word_boundary() {
        let name = "word ".repeat(60);
        let slug = slugify(&name);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn unicode_is_lowercased() {
        assert_eq!(slugify("Éditions Légales"), "éditions-légales");
    }
}
