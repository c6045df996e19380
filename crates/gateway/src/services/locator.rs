//! Product locator resolution for Amazon detail-page URLs.
//!
//! The checkout provider's locator grammar is underspecified: the same item
//! can be addressed by several surface syntaxes, and which one a given
//! catalog integration accepts varies. [`locator_variations`] produces the
//! deterministic candidate order the submission engine walks through.

use std::sync::LazyLock;

use regex::Regex;

/// Locator prefix for the Amazon catalog integration.
const PROVIDER_PREFIX: &str = "amazon";

/// Canonical product-detail URL base.
const CANONICAL_URL_BASE: &str = "https://www.amazon.com/dp";

/// Matches a 10-character item identifier in the known detail-page path
/// shapes: `/dp/<ID>`, `/gp/product/<ID>`, or a bare `amazon.<tld>/dp/<ID>`.
static ASIN_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)/dp/([A-Z0-9]{10})",
        r"(?i)/gp/product/([A-Z0-9]{10})",
        r"(?i)amazon\.[a-z.]{2,6}/dp/([A-Z0-9]{10})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static pattern compiles"))
    .collect()
});

/// Stricter pattern for pre-validation: the URL must actually carry a
/// product-detail path segment, not just mention the domain.
static PRODUCT_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(www\.)?amazon\.[a-z.]{2,6}/(.+/)?(dp|gp/product)/[A-Z0-9]{10}")
        .expect("static pattern compiles")
});

/// Extract the canonical 10-character item identifier (ASIN) from a
/// marketplace URL. Matching is case-insensitive; the identifier is
/// normalized to upper case.
#[must_use]
pub fn extract_asin(url: &str) -> Option<String> {
    ASIN_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(url)
            .and_then(|captures| captures.get(1))
            .map(|id| id.as_str().to_uppercase())
    })
}

/// Whether the URL looks like a real product detail page.
///
/// Used for pre-validation before attempting extraction.
#[must_use]
pub fn is_valid_product_url(url: &str) -> bool {
    PRODUCT_URL_PATTERN.is_match(url)
}

/// Produce the ordered locator candidates for an item.
///
/// The order IS the retry sequence the submission engine follows:
/// 1. `amazon:<id>` - the canonical form
/// 2. `amazon:<canonical-url>/<id>`
/// 3. `amazon:<original-url>`
/// 4. bare `<id>`
/// 5. clean canonical URL
#[must_use]
pub fn locator_variations(asin: &str, original_url: &str) -> Vec<String> {
    vec![
        format!("{PROVIDER_PREFIX}:{asin}"),
        format!("{PROVIDER_PREFIX}:{CANONICAL_URL_BASE}/{asin}"),
        format!("{PROVIDER_PREFIX}:{original_url}"),
        asin.to_owned(),
        format!("{CANONICAL_URL_BASE}/{asin}"),
    ]
}
