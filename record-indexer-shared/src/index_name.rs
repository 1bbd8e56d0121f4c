//! Index name normalization.

/// Characters the search engine rejects in index names.
const FORBIDDEN_CHARACTERS: [char; 10] = ['<', '"', ' ', '\\', '/', ',', '|', '>', '?', '*'];

/// Normalize an index name before it reaches the wire.
///
/// Every forbidden character is replaced with `_` and the result is
/// lower-cased. The function is deterministic and idempotent.
pub fn sanitize_index_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if FORBIDDEN_CHARACTERS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_forbidden_characters() {
        assert_eq!(
            sanitize_index_name(r#"My Index<"\/,|>?*"#),
            format!("my_index{}", "_".repeat(9))
        );
    }

    #[test]
    fn test_sanitize_lowercases() {
        assert_eq!(sanitize_index_name("Clinical_Data_1.0"), "clinical_data_1.0");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let names = [
            "idx1",
            "Analysis Centric",
            "a/b\\c",
            "<weird>|name?*",
            "UPPER,lower",
            "",
        ];

        for name in names {
            let once = sanitize_index_name(name);
            assert_eq!(sanitize_index_name(&once), once, "not idempotent for {name:?}");
            assert!(!once.chars().any(|c| FORBIDDEN_CHARACTERS.contains(&c)));
        }
    }
}
