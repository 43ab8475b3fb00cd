//! Client-side filtering of fetched collections.

use crate::model::{Category, Difficulty, ForumPost, LearningPath};

/// Items that can be narrowed by a search term and one equality facet.
pub trait Filterable {
    type Facet: PartialEq + Copy;

    /// Fields the search term is matched against.
    fn search_fields(&self) -> [&str; 2];

    fn facet(&self) -> Self::Facet;
}

impl Filterable for ForumPost {
    type Facet = Category;

    fn search_fields(&self) -> [&str; 2] {
        [&self.title, &self.content]
    }

    fn facet(&self) -> Category {
        self.category
    }
}

impl Filterable for LearningPath {
    type Facet = Difficulty;

    fn search_fields(&self) -> [&str; 2] {
        [&self.title, &self.description]
    }

    fn facet(&self) -> Difficulty {
        self.difficulty
    }
}

/// Search term AND optional facet. An empty term matches everything; a
/// `None` facet is "all".
#[derive(Debug, Clone, PartialEq)]
pub struct ListFilter<F> {
    pub search: String,
    pub facet: Option<F>,
}

impl<F> Default for ListFilter<F> {
    fn default() -> Self {
        Self {
            search: String::new(),
            facet: None,
        }
    }
}

impl<F: PartialEq + Copy> ListFilter<F> {
    pub fn new(search: impl Into<String>, facet: Option<F>) -> Self {
        Self {
            search: search.into(),
            facet,
        }
    }

    pub fn matches<T: Filterable<Facet = F>>(&self, item: &T) -> bool {
        let facet_ok = self.facet.map_or(true, |f| item.facet() == f);
        if !facet_ok {
            return false;
        }
        let needle = self.search.to_lowercase();
        needle.is_empty()
            || item
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Matching items in their original order.
    pub fn apply<'a, T: Filterable<Facet = F>>(&self, items: &'a [T]) -> Vec<&'a T> {
        items.iter().filter(|item| self.matches(*item)).collect()
    }
}
