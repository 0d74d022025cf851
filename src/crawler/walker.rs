//! Category walker: navigation discovery and pagination
//!
//! Discovers the category list from the root page's side navigation, then
//! walks each category through its "next page" chain. Categories are visited
//! in navigation order and pages in link order; that sequence determines id
//! assignment downstream.
//!
//! Parsing happens in sync helpers so the non-Send HTML document never
//! crosses an await point.

use crate::config::Config;
use crate::crawler::extractor::extract_book;
use crate::crawler::fetcher::{build_http_client, fetch_page};
use crate::crawler::gate::RateGate;
use crate::record::ExtractedBook;
use crate::CatalogError;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

/// A category discovered from the root page's navigation
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    /// Display label from the navigation list
    pub name: String,

    /// Absolute URL of the category's first page
    pub url: Url,
}

/// Everything collected while walking one category
#[derive(Debug)]
pub struct CategoryWalk {
    /// Successfully extracted items, in page order then in-page order
    pub books: Vec<ExtractedBook>,

    /// Items skipped due to extraction failures
    pub skipped_items: usize,

    /// Pages whose fetch failed, ending pagination for the category
    pub failed_pages: usize,
}

/// Items parsed from one category page
struct ParsedPage {
    books: Vec<ExtractedBook>,
    skipped: usize,
    next_url: Option<Url>,
}

/// Walks the catalog's category/pagination tree
///
/// Owns the HTTP client and the politeness gate; one fetch is in flight at
/// a time and every fetch waits on the gate first.
pub struct CategoryWalker {
    client: Client,
    gate: RateGate,
    base: Url,
    catalogue_path: String,
    max_retries: u32,
}

impl CategoryWalker {
    /// Creates a walker for the configured site
    pub fn new(config: &Config) -> Result<Self, CatalogError> {
        let base = Url::parse(&config.site.base_url)?;
        let client = build_http_client(&config.crawler)?;

        Ok(Self {
            client,
            gate: RateGate::new(config.crawler.request_delay_ms),
            base,
            catalogue_path: config.site.catalogue_path.clone(),
            max_retries: config.crawler.max_retries,
        })
    }

    /// Fetches the root page and discovers the category list
    ///
    /// A failure here is fatal for the crawl run: without the navigation
    /// list there is nothing to walk.
    pub async fn discover_categories(&mut self) -> Result<Vec<Category>, CatalogError> {
        let index_url = self.base.join("index.html")?;

        self.gate.wait().await;
        let body = fetch_page(&self.client, &index_url, self.max_retries).await?;

        let categories = parse_categories(&body, &self.base);
        tracing::info!("Discovered {} categories", categories.len());

        Ok(categories)
    }

    /// Walks one category through its pagination chain
    ///
    /// A page fetch failure stops pagination for this category only; items
    /// already collected are preserved.
    pub async fn walk_category(&mut self, category: &Category) -> CategoryWalk {
        let mut walk = CategoryWalk {
            books: Vec::new(),
            skipped_items: 0,
            failed_pages: 0,
        };
        let mut current_url = category.url.clone();

        loop {
            self.gate.wait().await;

            let body = match fetch_page(&self.client, &current_url, self.max_retries).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(
                        "Stopping pagination of '{}' at {}: {}",
                        category.name,
                        current_url,
                        e
                    );
                    walk.failed_pages += 1;
                    break;
                }
            };

            let page = parse_category_page(
                &body,
                &current_url,
                &category.name,
                &self.base,
                &self.catalogue_path,
            );

            walk.books.extend(page.books);
            walk.skipped_items += page.skipped;

            match page.next_url {
                Some(next) => current_url = next,
                None => break,
            }
        }

        tracing::debug!(
            "Category '{}': {} items, {} skipped",
            category.name,
            walk.books.len(),
            walk.skipped_items
        );

        walk
    }
}

/// Parses the root page's side navigation into the category list
fn parse_categories(body: &str, base: &Url) -> Vec<Category> {
    let document = Html::parse_document(body);
    let mut categories = Vec::new();

    if let Ok(selector) = Selector::parse(".side_categories ul li ul li a") {
        for element in document.select(&selector) {
            let name = element.text().collect::<String>().trim().to_string();
            if name.is_empty() {
                continue;
            }

            let Some(href) = element.value().attr("href") else {
                continue;
            };
            match base.join(href) {
                Ok(url) => categories.push(Category { name, url }),
                Err(e) => tracing::warn!("Skipping category '{}' with bad href: {}", name, e),
            }
        }
    }

    categories
}

/// Parses one category page: extracts items and finds the "next page" link
fn parse_category_page(
    body: &str,
    page_url: &Url,
    category: &str,
    base: &Url,
    catalogue_path: &str,
) -> ParsedPage {
    let document = Html::parse_document(body);
    let mut books = Vec::new();
    let mut skipped = 0;

    if let Ok(selector) = Selector::parse("article.product_pod") {
        for item in document.select(&selector) {
            match extract_book(&item, category, base, catalogue_path) {
                Ok(book) => books.push(book),
                Err(e) => {
                    tracing::warn!("Skipping item on {}: {}", page_url, e);
                    skipped += 1;
                }
            }
        }
    }

    // "Next page" resolves against the current page's URL
    let next_url = Selector::parse("li.next a")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| match page_url.join(href) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!("Ignoring bad next-page link on {}: {}", page_url, e);
                None
            }
        });

    ParsedPage {
        books,
        skipped,
        next_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://books.toscrape.com").unwrap()
    }

    fn item(title: &str, price: &str, rating: &str) -> String {
        format!(
            r#"<article class="product_pod">
                <img src="../../media/cache/aa/bb/img.jpg" />
                <p class="star-rating {rating}"></p>
                <h3><a href="../../../slug_1/index.html" title="{title}">{title}</a></h3>
                <p class="price_color">{price}</p>
                <p class="instock availability">In stock</p>
            </article>"#
        )
    }

    #[test]
    fn test_parse_categories_in_navigation_order() {
        let body = r#"
            <div class="side_categories">
                <ul><li>
                    <a href="catalogue/category/books_1/index.html">Books</a>
                    <ul>
                        <li><a href="catalogue/category/books/travel_2/index.html"> Travel </a></li>
                        <li><a href="catalogue/category/books/mystery_3/index.html">Mystery</a></li>
                    </ul>
                </li></ul>
            </div>
        "#;

        let categories = parse_categories(body, &base());

        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "Travel");
        assert_eq!(
            categories[0].url.as_str(),
            "https://books.toscrape.com/catalogue/category/books/travel_2/index.html"
        );
        assert_eq!(categories[1].name, "Mystery");
    }

    #[test]
    fn test_parse_categories_empty_page() {
        let categories = parse_categories("<html><body></body></html>", &base());
        assert!(categories.is_empty());
    }

    #[test]
    fn test_parse_category_page_extracts_items() {
        let body = format!(
            "<html><body>{}{}</body></html>",
            item("First", "£10.00", "One"),
            item("Second", "£20.00", "Five")
        );
        let page_url = base()
            .join("catalogue/category/books/travel_2/index.html")
            .unwrap();

        let page = parse_category_page(&body, &page_url, "Travel", &base(), "catalogue");

        assert_eq!(page.books.len(), 2);
        assert_eq!(page.skipped, 0);
        assert_eq!(page.books[0].title, "First");
        assert_eq!(page.books[1].rating, 5);
        assert!(page.next_url.is_none());
    }

    #[test]
    fn test_parse_category_page_skips_malformed_items() {
        let body = format!(
            r#"<html><body>
                {}
                <article class="product_pod"><p class="price_color">£9.99</p></article>
            </body></html>"#,
            item("Good", "£10.00", "Two")
        );
        let page_url = base()
            .join("catalogue/category/books/travel_2/index.html")
            .unwrap();

        let page = parse_category_page(&body, &page_url, "Travel", &base(), "catalogue");

        assert_eq!(page.books.len(), 1);
        assert_eq!(page.skipped, 1);
    }

    #[test]
    fn test_next_link_resolves_against_current_page() {
        let body = format!(
            r#"<html><body>{}<ul class="pager"><li class="next"><a href="page-2.html">next</a></li></ul></body></html>"#,
            item("Only", "£5.00", "Three")
        );
        let page_url = base()
            .join("catalogue/category/books/travel_2/index.html")
            .unwrap();

        let page = parse_category_page(&body, &page_url, "Travel", &base(), "catalogue");

        assert_eq!(
            page.next_url.unwrap().as_str(),
            "https://books.toscrape.com/catalogue/category/books/travel_2/page-2.html"
        );
    }

    #[test]
    fn test_no_next_link_ends_pagination() {
        let body = "<html><body></body></html>";
        let page_url = base().join("catalogue/category/books/travel_2/index.html").unwrap();

        let page = parse_category_page(body, &page_url, "Travel", &base(), "catalogue");

        assert!(page.next_url.is_none());
        assert!(page.books.is_empty());
    }
}
