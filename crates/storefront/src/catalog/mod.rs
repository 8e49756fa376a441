//! Static product catalog.
//!
//! The catalog is an in-process, read-only table: it changes only on
//! redeploy, and cached page renderings of it are refreshed by the Shopify
//! webhook receiver. Each product advertises a list of sizes; sizes that map
//! to a Shopify variant GID are purchasable, the rest surface as unavailable.

pub mod resolver;
pub mod sizes;

use merchdrop_core::{Price, VariantGid};

/// The single selectable option these products carry.
pub const SIZE_OPTION: &str = "Size";

/// Front/back mockup image paths for a product.
#[derive(Debug, Clone)]
pub struct ProductImages {
    pub front: String,
    pub back: Option<String>,
}

/// A selectable option and its allowed values, in display order.
#[derive(Debug, Clone)]
pub struct ProductOption {
    pub name: String,
    pub values: Vec<String>,
}

/// One option assignment on a variant (e.g., Size = XL).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionAssignment {
    pub name: String,
    pub value: String,
}

/// A purchasable variant of a product.
#[derive(Debug, Clone)]
pub struct Variant {
    /// Shopify variant GID, required for checkout.
    pub id: VariantGid,
    /// Option assignments identifying this variant.
    pub assignments: Vec<OptionAssignment>,
    /// Price override; falls back to the product's base price.
    pub price: Option<Price>,
}

/// A catalog product.
#[derive(Debug, Clone)]
pub struct Product {
    /// Unique key, used in URLs.
    pub slug: String,
    pub name: String,
    /// Base price, captured onto cart lines at add time.
    pub price: Price,
    pub color: Option<String>,
    pub description: String,
    pub details: Vec<String>,
    pub care: Vec<String>,
    pub shipping: String,
    /// Selectable options in display order.
    pub options: Vec<ProductOption>,
    pub variants: Vec<Variant>,
    pub preorder: bool,
    pub ship_estimate: Option<String>,
    pub images: ProductImages,
}

impl Product {
    /// Advertised size labels, in display order.
    #[must_use]
    pub fn sizes(&self) -> &[String] {
        self.options
            .iter()
            .find(|o| o.name == SIZE_OPTION)
            .map_or(&[], |o| o.values.as_slice())
    }

    /// The variant for a raw size label, if the size is purchasable.
    #[must_use]
    pub fn variant_for_size(&self, raw: &str) -> Option<&Variant> {
        let canonical = sizes::normalize(raw);
        self.variants.iter().find(|v| {
            v.assignments
                .iter()
                .any(|a| a.name == SIZE_OPTION && sizes::normalize(&a.value) == canonical)
        })
    }
}

/// The static product table.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog from an explicit product list.
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// The built-in drop: four tees.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(builtin_products())
    }

    /// All products, in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Look up a product by slug.
    #[must_use]
    pub fn find_by_slug(&self, slug: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.slug == slug)
    }

    /// All product slugs, in catalog order.
    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.products.iter().map(|p| p.slug.as_str())
    }

    /// All slugs whose variant GIDs reference `reference`.
    ///
    /// `reference` may be a full GID or the bare numeric id Shopify webhook
    /// payloads carry.
    #[must_use]
    pub fn slugs_for_variant(&self, reference: &str) -> Vec<String> {
        self.products
            .iter()
            .filter(|p| p.variants.iter().any(|v| v.id.matches(reference)))
            .map(|p| p.slug.clone())
            .collect()
    }
}

// =============================================================================
// Built-in products
// =============================================================================

const ALL_SIZES: &[&str] = &["S", "M", "L", "XL", "XXL"];

/// Build a tee product from its size-to-GID table.
///
/// Sizes listed in `ALL_SIZES` but absent from `size_gids` are advertised as
/// unavailable (no variant).
#[allow(clippy::too_many_arguments)]
fn tee(
    slug: &str,
    name: &str,
    price_dollars: i64,
    color: &str,
    description: &str,
    details: &[&str],
    care: &[&str],
    shipping: &str,
    images: ProductImages,
    ship_estimate: &str,
    size_gids: &[(&str, &str)],
) -> Product {
    let variants = size_gids
        .iter()
        .map(|(size, gid)| Variant {
            id: VariantGid::new(*gid),
            assignments: vec![OptionAssignment {
                name: SIZE_OPTION.to_string(),
                value: (*size).to_string(),
            }],
            price: None,
        })
        .collect();

    Product {
        slug: slug.to_string(),
        name: name.to_string(),
        price: Price::usd(price_dollars),
        color: Some(color.to_string()),
        description: description.to_string(),
        details: details.iter().map(ToString::to_string).collect(),
        care: care.iter().map(ToString::to_string).collect(),
        shipping: shipping.to_string(),
        options: vec![ProductOption {
            name: SIZE_OPTION.to_string(),
            values: ALL_SIZES.iter().map(ToString::to_string).collect(),
        }],
        variants,
        preorder: true,
        ship_estimate: Some(ship_estimate.to_string()),
        images,
    }
}

fn builtin_products() -> Vec<Product> {
    vec![
        tee(
            "twisted-love-black",
            "Twisted Love Tee",
            55,
            "Black",
            "Portal-grade cotton. Twisted print on back, minimal front badge.",
            &[
                "100% heavyweight cotton",
                "Printed graphics front/back",
                "Boxy, slightly oversized fit",
            ],
            &["Machine wash cold", "Tumble dry low", "Do not iron print"],
            "Ships in 5-7 business days. Preorders ship once drop closes.",
            ProductImages {
                front: "/mockups/twisted-love-black-front.png".to_string(),
                back: Some("/mockups/twisted-love-black.png".to_string()),
            },
            "Ships late Sept",
            &[
                ("S", "gid://shopify/ProductVariant/46697207333122"),
                ("M", "gid://shopify/ProductVariant/46697207365890"),
                ("L", "gid://shopify/ProductVariant/46697207398658"),
                // XL shares the L variant upstream; XXL has no variant yet
                ("XL", "gid://shopify/ProductVariant/46697207398658"),
            ],
        ),
        tee(
            "twisted-love-white",
            "Twisted Love Tee",
            55,
            "White",
            "Whiteout variant of the Twisted Love tee. Same portal energy, crisp canvas.",
            &[
                "100% heavyweight cotton",
                "Printed graphics front/back",
                "Boxy, slightly oversized fit",
            ],
            &["Machine wash cold", "Tumble dry low", "Do not iron print"],
            "Ships in 5-7 business days. Preorders ship once drop closes.",
            ProductImages {
                front: "/mockups/twisted-love-white-front.png".to_string(),
                back: Some("/mockups/twisted-love-white.png".to_string()),
            },
            "Ships late Sept",
            &[
                ("S", "gid://shopify/ProductVariant/46697207464194"),
                ("M", "gid://shopify/ProductVariant/46697207496962"),
                ("L", "gid://shopify/ProductVariant/46697207529730"),
                ("XL", "gid://shopify/ProductVariant/46697207562498"),
            ],
        ),
        tee(
            "collab-black",
            "Collab Tee",
            45,
            "Black",
            "Collab graphic locked in black. Loud where it needs to be.",
            &["Heavyweight cotton", "Front print", "Classic fit"],
            &["Machine wash cold", "Tumble dry low"],
            "Ships in 5-7 business days.",
            ProductImages {
                front: "/mockups/collab-black.png".to_string(),
                back: None,
            },
            "Ships late Sept",
            &[
                ("S", "gid://shopify/ProductVariant/46651685503234"),
                ("M", "gid://shopify/ProductVariant/46651685536002"),
                ("L", "gid://shopify/ProductVariant/46651685568770"),
                ("XL", "gid://shopify/ProductVariant/46651685601538"),
            ],
        ),
        tee(
            "collab-white",
            "Collab Tee",
            45,
            "White",
            "White canvas with the collab graphic. Summer armor.",
            &["Heavyweight cotton", "Front print", "Classic fit"],
            &["Machine wash cold", "Tumble dry low"],
            "Ships in 5-7 business days.",
            ProductImages {
                front: "/mockups/collab-white.png".to_string(),
                back: None,
            },
            "Ships late Sept",
            &[
                ("S", "gid://shopify/ProductVariant/46697150873858"),
                ("M", "gid://shopify/ProductVariant/46697150906626"),
                ("L", "gid://shopify/ProductVariant/46697150939394"),
                ("XL", "gid://shopify/ProductVariant/46697150972162"),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_slugs() {
        let catalog = Catalog::builtin();
        let slugs: Vec<&str> = catalog.slugs().collect();
        assert_eq!(
            slugs,
            vec![
                "twisted-love-black",
                "twisted-love-white",
                "collab-black",
                "collab-white"
            ]
        );
    }

    #[test]
    fn test_find_by_slug() {
        let catalog = Catalog::builtin();
        assert!(catalog.find_by_slug("twisted-love-black").is_some());
        assert!(catalog.find_by_slug("missing").is_none());
    }

    #[test]
    fn test_advertised_size_without_variant_is_unavailable() {
        let catalog = Catalog::builtin();
        let product = catalog.find_by_slug("twisted-love-black").expect("product");
        assert!(product.sizes().contains(&"XXL".to_string()));
        assert!(product.variant_for_size("XXL").is_none());
        assert!(product.variant_for_size("M").is_some());
    }

    #[test]
    fn test_slugs_for_variant_by_gid_and_numeric() {
        let catalog = Catalog::builtin();
        let by_gid = catalog.slugs_for_variant("gid://shopify/ProductVariant/46697207333122");
        assert_eq!(by_gid, vec!["twisted-love-black".to_string()]);

        let by_numeric = catalog.slugs_for_variant("46697207333122");
        assert_eq!(by_numeric, vec!["twisted-love-black".to_string()]);

        assert!(catalog.slugs_for_variant("999").is_empty());
    }

    #[test]
    fn test_slugs_for_variant_shared_across_products() {
        // Two products referencing the same variant id both show up
        let shared = "gid://shopify/ProductVariant/42";
        let mut a = Catalog::builtin()
            .find_by_slug("twisted-love-black")
            .expect("product")
            .clone();
        a.slug = "a".to_string();
        a.variants = vec![Variant {
            id: VariantGid::new(shared),
            assignments: vec![],
            price: None,
        }];
        let mut b = a.clone();
        b.slug = "b".to_string();

        let catalog = Catalog::new(vec![a, b]);
        assert_eq!(
            catalog.slugs_for_variant("42"),
            vec!["a".to_string(), "b".to_string()]
        );
    }
}
