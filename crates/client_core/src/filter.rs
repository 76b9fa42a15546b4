//! Search filtering over the mirrored inventory.

use shared::domain::InventoryItem;

/// Items whose name contains `query`, ignoring case, in their original order.
/// An empty query keeps everything.
pub fn filter_items<'a>(items: &'a [InventoryItem], query: &str) -> Vec<&'a InventoryItem> {
    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| item.name.as_str().to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use shared::domain::ItemName;

    use super::*;

    fn items(names: &[&str]) -> Vec<InventoryItem> {
        names
            .iter()
            .map(|raw| {
                InventoryItem::new(
                    ItemName::parse(*raw).expect("name"),
                    NonZeroU32::new(1).expect("non-zero"),
                )
            })
            .collect()
    }

    fn names<'a>(view: &[&'a InventoryItem]) -> Vec<&'a str> {
        view.iter().map(|item| item.name.as_str()).collect()
    }

    #[test]
    fn matches_substrings_case_insensitively() {
        let mirror = items(&["Rice", "Beans"]);
        assert_eq!(names(&filter_items(&mirror, "ri")), vec!["Rice"]);
        assert_eq!(names(&filter_items(&mirror, "EAN")), vec!["Beans"]);
    }

    #[test]
    fn empty_query_keeps_original_order() {
        let mirror = items(&["salt", "Rice", "beans"]);
        assert_eq!(names(&filter_items(&mirror, "")), vec!["salt", "Rice", "beans"]);
    }

    #[test]
    fn query_is_not_trimmed() {
        let mirror = items(&["brown rice", "rice"]);
        assert_eq!(names(&filter_items(&mirror, " rice")), vec!["brown rice"]);
        assert!(filter_items(&mirror, "rice ").is_empty());
    }
}
