//! Size label normalization.
//!
//! Shopify option values do not always share the catalog's casing
//! ("x-large" vs "XL"), so both sides of every size comparison go through
//! [`normalize`] first.

/// Normalize a raw size label to its canonical code.
///
/// Known aliases collapse to the usual letter codes; anything else is
/// trimmed and uppercased as-is.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let key = raw.trim().to_lowercase();
    let canonical = match key.as_str() {
        "xs" | "x-small" => "XS",
        "s" | "small" => "S",
        "m" | "medium" => "M",
        "l" | "large" => "L",
        "xl" | "x-large" | "xlarge" => "XL",
        "xxl" | "xx-large" => "XXL",
        "xxxl" | "xxx-large" => "XXXL",
        _ => return raw.trim().to_uppercase(),
    };
    canonical.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_collapse() {
        assert_eq!(normalize("x-large"), "XL");
        assert_eq!(normalize("XL"), "XL");
        assert_eq!(normalize("xlarge"), "XL");
        assert_eq!(normalize("Medium"), "M");
        assert_eq!(normalize("xx-large"), "XXL");
    }

    #[test]
    fn test_whitespace_and_case() {
        assert_eq!(normalize("  small "), "S");
        assert_eq!(normalize("LARGE"), "L");
    }

    #[test]
    fn test_unknown_passthrough_uppercased() {
        assert_eq!(normalize("one-size"), "ONE-SIZE");
        assert_eq!(normalize(" 28x32 "), "28X32");
    }
}
