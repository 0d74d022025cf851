//! Catalog record types and id assignment
//!
//! The field order of [`CatalogRecord`] is load-bearing: the CSV dataset's
//! header row is derived from it, giving the fixed column schema
//! `id,title,price,rating,availability,category,image_url,product_url`.

use serde::{Deserialize, Serialize};

/// One normalized catalog item as persisted in the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Unique positive id, monotonically increasing in crawl-visitation order
    pub id: u32,

    /// Display title of the item
    pub title: String,

    /// Currency-stripped decimal price
    pub price: f64,

    /// Star rating 0-5; 0 means the rating class was unrecognized
    pub rating: u8,

    /// 1 if "In stock" was detected, 0 otherwise (not a true stock count)
    pub availability: u8,

    /// Category label as shown in the site's navigation
    pub category: String,

    /// Absolute image URL
    pub image_url: String,

    /// Absolute product page URL
    pub product_url: String,
}

/// An extracted item before an id has been assigned
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedBook {
    pub title: String,
    pub price: f64,
    pub rating: u8,
    pub availability: u8,
    pub category: String,
    pub image_url: String,
    pub product_url: String,
}

/// Assigns sequential ids starting at 1, in the exact order records
/// are produced by the crawl
#[derive(Debug)]
pub struct IdAssigner {
    next: u32,
}

impl IdAssigner {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Consumes an extracted item and stamps it with the next id
    pub fn assign(&mut self, book: ExtractedBook) -> CatalogRecord {
        let id = self.next;
        self.next += 1;

        CatalogRecord {
            id,
            title: book.title,
            price: book.price,
            rating: book.rating,
            availability: book.availability,
            category: book.category,
            image_url: book.image_url,
            product_url: book.product_url,
        }
    }
}

impl Default for IdAssigner {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps the site's star-rating class token ("One".."Five") to an integer.
/// Unrecognized tokens map to 0.
pub fn rating_from_class(token: &str) -> u8 {
    match token {
        "One" => 1,
        "Two" => 2,
        "Three" => 3,
        "Four" => 4,
        "Five" => 5,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_book(title: &str) -> ExtractedBook {
        ExtractedBook {
            title: title.to_string(),
            price: 51.77,
            rating: 3,
            availability: 1,
            category: "Poetry".to_string(),
            image_url: "https://books.toscrape.com/media/img.jpg".to_string(),
            product_url: "https://books.toscrape.com/catalogue/a_1/index.html".to_string(),
        }
    }

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let mut ids = IdAssigner::new();
        let a = ids.assign(sample_book("A"));
        let b = ids.assign(sample_book("B"));
        let c = ids.assign(sample_book("C"));

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(c.id, 3);
    }

    #[test]
    fn test_assign_preserves_fields() {
        let mut ids = IdAssigner::new();
        let record = ids.assign(sample_book("A Light in the Attic"));

        assert_eq!(record.title, "A Light in the Attic");
        assert_eq!(record.price, 51.77);
        assert_eq!(record.rating, 3);
        assert_eq!(record.availability, 1);
        assert_eq!(record.category, "Poetry");
    }

    #[test]
    fn test_rating_map() {
        assert_eq!(rating_from_class("One"), 1);
        assert_eq!(rating_from_class("Two"), 2);
        assert_eq!(rating_from_class("Three"), 3);
        assert_eq!(rating_from_class("Four"), 4);
        assert_eq!(rating_from_class("Five"), 5);
    }

    #[test]
    fn test_unrecognized_rating_maps_to_zero() {
        assert_eq!(rating_from_class("Six"), 0);
        assert_eq!(rating_from_class("three"), 0);
        assert_eq!(rating_from_class(""), 0);
    }
}
