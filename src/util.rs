//! Shared utility functions.

/// Turn a file stem into a page title.
///
/// Splits on `-` and `_` and capitalizes each word:
/// "getting-started" -> "Getting Started", "contact_form" -> "Contact Form".
pub fn title_case(stem: &str) -> String {
    stem.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("getting-started"), "Getting Started");
        assert_eq!(title_case("index"), "Index");
        assert_eq!(title_case("contact_form"), "Contact Form");
        assert_eq!(title_case("FAQ"), "FAQ");
        assert_eq!(title_case("--draft--"), "Draft");
    }
}
