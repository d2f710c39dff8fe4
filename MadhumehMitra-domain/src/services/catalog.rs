use once_cell::sync::Lazy;

use crate::entities::nutrition::FoodItem;

/// How many base foods to suggest when the search box is empty
const EMPTY_QUERY_SUGGESTIONS: usize = 5;

/// Curated everyday Indian foods, per typical serving
pub static BASE_FOODS: Lazy<Vec<FoodItem>> = Lazy::new(|| {
    vec![
        FoodItem::new("f1", "Roti (Whole Wheat)", 100.0, 15.0, 3.0, 0.5),
        FoodItem::new("f2", "Dal (1 Katori)", 150.0, 18.0, 6.0, 4.0),
        FoodItem::new("f3", "Rice (White, 1 Bowl)", 200.0, 45.0, 4.0, 0.5),
        FoodItem::new("f4", "Rice (Brown, 1 Bowl)", 180.0, 40.0, 5.0, 1.5),
        FoodItem::new("f5", "Sabzi (Mixed Veg)", 120.0, 10.0, 2.0, 7.0),
        FoodItem::new("f6", "Paneer Curry (1 Bowl)", 250.0, 8.0, 12.0, 18.0),
        FoodItem::new("f7", "Dosa (Plain)", 130.0, 25.0, 3.0, 2.0),
        FoodItem::new("f8", "Idli (2 pcs)", 120.0, 24.0, 4.0, 0.5),
        FoodItem::new("f9", "Chai (with sugar)", 100.0, 12.0, 1.0, 3.0),
        FoodItem::new("f10", "Chai (no sugar)", 30.0, 2.0, 1.0, 2.0),
        FoodItem::new("f11", "Fruits (Apple/Guava)", 60.0, 14.0, 0.5, 0.2),
        FoodItem::new("f12", "Biscuits (Marie, 2)", 50.0, 8.0, 1.0, 1.5),
        FoodItem::new("f13", "Upma (1 Bowl)", 200.0, 30.0, 5.0, 7.0),
        FoodItem::new("f14", "Poha (1 Bowl)", 250.0, 40.0, 3.0, 8.0),
    ]
});

/// Base reference foods followed by the user's custom (AI-estimated) foods.
///
/// The catalog only grows: there is no removal.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodCatalog {
    base: Vec<FoodItem>,
    custom: Vec<FoodItem>,
}

impl Default for FoodCatalog {
    fn default() -> Self {
        Self::merge(BASE_FOODS.clone(), Vec::new())
    }
}

impl FoodCatalog {
    /// Concatenate the base list and the custom list, base first
    pub fn merge(base: Vec<FoodItem>, custom: Vec<FoodItem>) -> Self {
        Self { base, custom }
    }

    /// Add an AI-discovered food unless a custom food with the same name exists.
    ///
    /// Returns whether the item was added.
    pub fn add_custom(&mut self, item: FoodItem) -> bool {
        if self.custom.iter().any(|existing| existing.name == item.name) {
            return false;
        }
        self.custom.push(item);
        true
    }

    /// Case-insensitive substring search over names.
    ///
    /// An empty query suggests the first few base foods in their listed order.
    pub fn search(&self, query: &str) -> Vec<FoodItem> {
        if query.is_empty() {
            return self
                .base
                .iter()
                .take(EMPTY_QUERY_SUGGESTIONS)
                .cloned()
                .collect();
        }

        let needle = query.to_lowercase();
        self.items()
            .filter(|item| item.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Every food, base first
    pub fn items(&self) -> impl Iterator<Item = &FoodItem> {
        self.base.iter().chain(self.custom.iter())
    }

    /// Look up a food by id
    pub fn find(&self, id: &str) -> Option<&FoodItem> {
        self.items().find(|item| item.id == id)
    }

    /// The custom portion, in insertion order
    pub fn custom(&self) -> &[FoodItem] {
        &self.custom
    }

    pub fn len(&self) -> usize {
        self.base.len() + self.custom.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ai_food(id: &str, name: &str) -> FoodItem {
        FoodItem::new(id, name, 250.0, 40.0, 4.0, 8.0)
    }

    #[test]
    fn test_empty_query_returns_first_five_base_foods() {
        let catalog = FoodCatalog::merge(BASE_FOODS.clone(), vec![ai_food("ai_1", "Aloo Paratha")]);
        let names: Vec<String> = catalog.search("").into_iter().map(|f| f.name).collect();

        assert_eq!(
            names,
            vec![
                "Roti (Whole Wheat)",
                "Dal (1 Katori)",
                "Rice (White, 1 Bowl)",
                "Rice (Brown, 1 Bowl)",
                "Sabzi (Mixed Veg)",
            ]
        );
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let catalog = FoodCatalog::default();
        let hits: Vec<String> = catalog.search("CHAI").into_iter().map(|f| f.name).collect();
        assert_eq!(hits, vec!["Chai (with sugar)", "Chai (no sugar)"]);

        let rice: Vec<String> = catalog.search("bowl").into_iter().map(|f| f.id).collect();
        assert_eq!(rice, vec!["f3", "f4", "f6", "f13", "f14"]);
    }

    #[test]
    fn test_search_covers_custom_foods_after_base() {
        let mut catalog = FoodCatalog::default();
        catalog.add_custom(ai_food("ai_1", "Masala Dosa"));

        let hits: Vec<String> = catalog.search("dosa").into_iter().map(|f| f.id).collect();
        assert_eq!(hits, vec!["f7", "ai_1"]);
    }

    #[test]
    fn test_add_custom_dedups_by_name_not_id() {
        let mut catalog = FoodCatalog::default();
        assert!(catalog.add_custom(ai_food("ai_1", "Aloo Paratha")));
        assert!(!catalog.add_custom(ai_food("ai_2", "Aloo Paratha")));

        assert_eq!(catalog.custom().len(), 1);
        assert_eq!(catalog.custom()[0].id, "ai_1");
        assert_eq!(catalog.len(), BASE_FOODS.len() + 1);
    }

    #[test]
    fn test_find_by_id() {
        let catalog = FoodCatalog::default();
        assert_eq!(catalog.find("f8").map(|f| f.name.as_str()), Some("Idli (2 pcs)"));
        assert!(catalog.find("missing").is_none());
    }
}
