use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

/// Lower-case, ASCII alphanumerics joined by single dashes.
pub fn slugify(text: &str) -> String {
    lazy_static! {
        static ref NON_ALNUM: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
    }
    let lowered = text.trim().to_lowercase();
    NON_ALNUM
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Slug with a short random suffix, for names that may repeat.
pub fn unique_slug(text: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    let base = slugify(text);
    if base.is_empty() {
        suffix[..8].to_string()
    } else {
        format!("{}-{}", base, &suffix[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("  Spicy Chicken -- Tikka!! "), "spicy-chicken-tikka");
        assert_eq!(slugify("Crème Brûlée"), "cr-me-br-l-e");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn unique_slug_keeps_base_and_adds_suffix() {
        let a = unique_slug("Pad Thai");
        let b = unique_slug("Pad Thai");
        assert!(a.starts_with("pad-thai-"));
        assert_eq!(a.len(), "pad-thai-".len() + 8);
        assert_ne!(a, b);
        assert_eq!(unique_slug("!!!").len(), 8);
    }
}
