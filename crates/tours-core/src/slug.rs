/// Generate a URL-safe slug from a display name.
///
/// Lowercases ASCII letters, collapses every run of characters that are not
/// ASCII alphanumerics into a single `-`, and trims leading/trailing dashes.
/// Non-ASCII characters count as separators, so `"Café Tour"` becomes
/// `"caf-tour"`. Different names can map to the same slug.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_simple_name() {
        assert_eq!(slugify("Desert Safari Adventure"), "desert-safari-adventure");
    }

    #[test]
    fn slug_collapses_punctuation_runs() {
        assert_eq!(
            slugify("Manama: Old Souq & Pearl Trail!!"),
            "manama-old-souq-pearl-trail"
        );
    }

    #[test]
    fn slug_trims_leading_and_trailing_separators() {
        assert_eq!(slugify("  --Gulf Tours--  "), "gulf-tours");
    }

    #[test]
    fn slug_non_ascii_acts_as_separator() {
        assert_eq!(slugify("Café Tour"), "caf-tour");
    }

    #[test]
    fn slug_empty_and_symbol_only_inputs() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!! ???"), "");
    }

    #[test]
    fn slug_keeps_digits() {
        assert_eq!(slugify("4x4 Dune Bashing (3 Hours)"), "4x4-dune-bashing-3-hours");
    }

    #[test]
    fn slug_output_alphabet_and_idempotence() {
        let inputs = [
            "Bahrain Fort & Tree of Life",
            "  A--B  ",
            "ÀÉÎ",
            "Night Tour: 19:00 – 23:00",
            "already-a-slug",
            "UPPER lower 123",
            "\t\nmixed\u{00a0}whitespace",
        ];
        for input in inputs {
            let slug = slugify(input);
            assert!(
                slug.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
                "unexpected character in {slug:?}"
            );
            assert!(!slug.starts_with('-') && !slug.ends_with('-'), "{slug:?}");
            assert!(!slug.contains("--"), "{slug:?}");
            assert_eq!(slugify(&slug), slug, "slugify must be idempotent");
        }
    }
}
