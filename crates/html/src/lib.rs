//! # Product Page Parsing
//!
//! Reads product facts and customer review blocks out of Amazon-style product
//! and all-reviews pages. Every selector is optional: a page missing a field
//! simply yields `None` (or an empty list) for it.

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use tracing::debug;

/// Everything that could be read from one HTML page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedPage {
    pub title: Option<String>,
    pub price: Option<String>,
    /// The rating summary, e.g. `"4.2 out of 5 stars"`.
    pub average_rating: Option<String>,
    /// The ratings count text, e.g. `"1,024 ratings"`.
    pub total_ratings: Option<String>,
    pub features: Vec<String>,
    pub description: Option<String>,
    pub reviews: Vec<ParsedReview>,
}

impl ParsedPage {
    /// True when the page yielded neither product facts nor reviews.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.price.is_none() && self.reviews.is_empty()
    }
}

/// One review block, with field text as it appears on the page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedReview {
    pub name: Option<String>,
    pub rating: Option<String>,
    pub title: Option<String>,
    pub text: Option<String>,
    pub date: Option<String>,
    pub verified: bool,
}

/// Parses a product or all-reviews page.
pub fn parse_product_html(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let page = ParsedPage {
        title: first_text(root, "#productTitle"),
        price: parse_price(root),
        average_rating: first_attr(root, "#acrPopover", "title"),
        total_ratings: first_text(root, "#acrCustomerReviewText"),
        features: all_texts(root, "#feature-bullets ul li"),
        description: first_text(root, "#productDescription"),
        reviews: parse_reviews(root),
    };
    debug!(
        has_title = page.title.is_some(),
        has_price = page.price.is_some(),
        reviews = page.reviews.len(),
        "Parsed product page"
    );
    page
}

/// Only the review blocks of a page.
pub fn parse_reviews_html(html: &str) -> Vec<ParsedReview> {
    let document = Html::parse_document(html);
    parse_reviews(document.root_element())
}

fn parse_price(root: ElementRef<'_>) -> Option<String> {
    let whole = first_text(root, ".a-price-whole").map(|w| w.trim_end_matches('.').to_string());
    match whole {
        Some(whole) if !whole.is_empty() => {
            let symbol = first_text(root, ".a-price-symbol").unwrap_or_default();
            Some(match first_text(root, ".a-price-fraction") {
                Some(fraction) => format!("{symbol}{whole}.{fraction}"),
                None => format!("{symbol}{whole}"),
            })
        }
        _ => first_text(root, ".a-price .a-offscreen").or_else(|| first_text(root, ".a-offscreen")),
    }
}

fn parse_reviews(root: ElementRef<'_>) -> Vec<ParsedReview> {
    let mut blocks = select_all(root, r#"[data-hook="review"]"#);
    if blocks.is_empty() {
        blocks = select_all(root, ".review");
    }
    blocks.into_iter().map(parse_review).collect()
}

fn parse_review(block: ElementRef<'_>) -> ParsedReview {
    ParsedReview {
        name: first_text(block, ".a-profile-name"),
        rating: first_text(
            block,
            r#"[data-hook="review-star-rating"] .a-icon-alt, [data-hook="cmps-review-star-rating"] .a-icon-alt, .review-rating .a-icon-alt"#,
        ),
        title: first_text(block, r#"[data-hook="review-title"] > span:last-child"#)
            .or_else(|| first_text(block, r#"[data-hook="review-title"]"#)),
        text: first_text(block, r#"[data-hook="review-body"]"#)
            .or_else(|| first_text(block, ".review-text")),
        date: first_text(block, r#"[data-hook="review-date"]"#)
            .or_else(|| first_text(block, ".review-date")),
        verified: !select_all(block, r#"[data-hook="avp-badge"]"#).is_empty(),
    }
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn select_all<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match selector(css) {
        Some(sel) => scope.select(&sel).collect(),
        None => Vec::new(),
    }
}

fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = collapse_whitespace(&element.text().collect::<String>());
    (!text.is_empty()).then_some(text)
}

fn first_text(scope: ElementRef<'_>, css: &str) -> Option<String> {
    select_all(scope, css).into_iter().find_map(element_text)
}

fn all_texts(scope: ElementRef<'_>, css: &str) -> Vec<String> {
    select_all(scope, css)
        .into_iter()
        .filter_map(element_text)
        .collect()
}

fn first_attr(scope: ElementRef<'_>, css: &str, attr: &str) -> Option<String> {
    select_all(scope, css).into_iter().find_map(|el| {
        let value = collapse_whitespace(el.value().attr(attr)?);
        (!value.is_empty()).then_some(value)
    })
}

/// Collapses runs of whitespace into single spaces and trims the ends.
pub fn collapse_whitespace(input: &str) -> String {
    let mut buf = String::with_capacity(input.len());
    let mut last_space = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !last_space && !buf.is_empty() {
                buf.push(' ');
            }
            last_space = true;
        } else {
            buf.push(ch);
            last_space = false;
        }
    }
    buf.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
        assert_eq!(collapse_whitespace("\n\n"), "");
    }

    #[test]
    fn test_price_without_fraction() {
        let html = r#"<span class="a-price-symbol">$</span><span class="a-price-whole">42</span>"#;
        assert_eq!(parse_product_html(html).price.as_deref(), Some("$42"));
    }

    #[test]
    fn test_price_falls_back_to_offscreen() {
        let html = r#"<span class="a-price"><span class="a-offscreen">₹499.00</span></span>"#;
        assert_eq!(parse_product_html(html).price.as_deref(), Some("₹499.00"));
    }
}
