//! Cache key builders for catalog resources.
//!
//! Keys are namespaced by resource so a single prefix invalidation drops a
//! whole family after a mutation.

/// Key for the featured items list
pub const FEATURED_ITEMS: &str = "featured_items";

/// Prefix shared by every favorite products batch key
pub const FAVORITE_PRODUCTS_PREFIX: &str = "favorite_products_";

/// Normalizes a product id list: trims, drops blanks, sorts, and de-duplicates.
pub fn normalize_ids<I, S>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut ids: Vec<String> = ids
        .into_iter()
        .map(|id| id.as_ref().trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();
    ids.sort();
    ids.dedup();
    ids
}

/// Key for a batch of favorite products. `ids` must already be normalized,
/// so the same set of ids always maps to the same key.
pub fn favorite_products(ids: &[String]) -> String {
    format!("{}{}", FAVORITE_PRODUCTS_PREFIX, ids.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_ids_sorts_and_dedups() {
        let ids = normalize_ids(["b", " a", "", "b", "c "]);
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_favorite_products_key_is_order_independent() {
        let first = favorite_products(&normalize_ids(["3", "1", "2"]));
        let second = favorite_products(&normalize_ids(["2", "3", "1"]));

        assert_eq!(first, "favorite_products_1,2,3");
        assert_eq!(first, second);
        assert!(first.starts_with(FAVORITE_PRODUCTS_PREFIX));
    }
}
