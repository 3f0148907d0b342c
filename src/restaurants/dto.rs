use serde::{Deserialize, Serialize};

use crate::meals::dto::MealView;
use crate::providers::dto::ProviderProfileView;

#[derive(Debug, Default, Deserialize)]
pub struct RestaurantQuery {
    pub search: Option<String>,
}

impl RestaurantQuery {
    pub fn search(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// A restaurant's public page: its profile and what it currently sells.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantDetail {
    #[serde(flatten)]
    pub profile: ProviderProfileView,
    pub meals: Vec<MealView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_search_is_ignored() {
        let q = RestaurantQuery {
            search: Some("  ".into()),
        };
        assert_eq!(q.search(), None);
        let q = RestaurantQuery {
            search: Some(" curry ".into()),
        };
        assert_eq!(q.search(), Some("curry"));
    }
}
