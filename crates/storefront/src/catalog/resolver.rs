//! Variant resolution from option selections.
//!
//! Resolution is the gate in front of the cart: a line only ever gets a
//! variant id this module confirmed, and an unresolvable selection blocks
//! add-to-cart entirely.

use merchdrop_core::Price;

use super::{Product, SIZE_OPTION, Variant, sizes};

/// A confirmed variant selection, ready to become a cart line.
#[derive(Debug, Clone)]
pub struct ResolvedVariant<'a> {
    pub variant: &'a Variant,
    /// Canonical size label from the selection, when the product has one.
    pub size: Option<String>,
    /// Price captured for the cart line.
    pub price: Price,
}

/// Find the single variant whose option assignments match every selected
/// (name, value) pair.
///
/// Yields `None` when the selection is incomplete (missing any product
/// option) or contradictory (no variant carries all the selected pairs).
/// Size values are normalized on both sides before comparison.
#[must_use]
pub fn resolve<'a>(
    product: &'a Product,
    selections: &[(String, String)],
) -> Option<ResolvedVariant<'a>> {
    // Every product option must be selected
    if !product
        .options
        .iter()
        .all(|option| selections.iter().any(|(name, _)| *name == option.name))
    {
        return None;
    }

    let variant = product.variants.iter().find(|variant| {
        selections.iter().all(|(name, value)| {
            variant
                .assignments
                .iter()
                .any(|a| a.name == *name && values_match(name, &a.value, value))
        })
    })?;

    let size = selections
        .iter()
        .find(|(name, _)| name == SIZE_OPTION)
        .map(|(_, value)| sizes::normalize(value));

    Some(ResolvedVariant {
        variant,
        size,
        price: variant.price.unwrap_or(product.price),
    })
}

fn values_match(option_name: &str, catalog_value: &str, selected_value: &str) -> bool {
    if option_name == SIZE_OPTION {
        sizes::normalize(catalog_value) == sizes::normalize(selected_value)
    } else {
        catalog_value == selected_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn selection(size: &str) -> Vec<(String, String)> {
        vec![(SIZE_OPTION.to_string(), size.to_string())]
    }

    #[test]
    fn test_resolves_exact_size() {
        let catalog = Catalog::builtin();
        let product = catalog.find_by_slug("twisted-love-black").expect("product");

        let resolved = resolve(product, &selection("M")).expect("resolved");
        assert_eq!(
            resolved.variant.id.as_str(),
            "gid://shopify/ProductVariant/46697207365890"
        );
        assert_eq!(resolved.size.as_deref(), Some("M"));
        assert_eq!(resolved.price, product.price);
    }

    #[test]
    fn test_resolves_normalized_alias() {
        let catalog = Catalog::builtin();
        let product = catalog.find_by_slug("twisted-love-white").expect("product");

        for raw in ["x-large", "XL", "xlarge"] {
            let resolved = resolve(product, &selection(raw)).expect("resolved");
            assert_eq!(
                resolved.variant.id.as_str(),
                "gid://shopify/ProductVariant/46697207562498"
            );
            assert_eq!(resolved.size.as_deref(), Some("XL"));
        }
    }

    #[test]
    fn test_incomplete_selection_is_no_match() {
        let catalog = Catalog::builtin();
        let product = catalog.find_by_slug("twisted-love-black").expect("product");
        assert!(resolve(product, &[]).is_none());
    }

    #[test]
    fn test_contradictory_selection_is_no_match() {
        let catalog = Catalog::builtin();
        let product = catalog.find_by_slug("twisted-love-black").expect("product");

        let mut selections = selection("M");
        selections.push(("Color".to_string(), "Green".to_string()));
        assert!(resolve(product, &selections).is_none());
    }

    #[test]
    fn test_size_without_variant_is_no_match() {
        let catalog = Catalog::builtin();
        let product = catalog.find_by_slug("twisted-love-black").expect("product");
        assert!(resolve(product, &selection("XXL")).is_none());
    }
}
