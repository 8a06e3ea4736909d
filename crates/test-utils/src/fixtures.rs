//! Product snapshots and Amazon-style HTML pages for tests.

use reviewlens::{ProductDetails, ProductSnapshot, RawReviewRecord};

/// A raw record carrying only a reviewer name and body text.
pub fn raw_review(name: &str, text: &str) -> RawReviewRecord {
    RawReviewRecord {
        reviewer_name: Some(name.to_string()),
        rating: Some("4.0 out of 5 stars".to_string()),
        review_text: Some(text.to_string()),
        review_date: Some("Reviewed in India on 3 March 2024".to_string()),
        is_verified_purchase: Some(true),
        ..Default::default()
    }
}

/// A snapshot whose reviews have the given texts, in order.
pub fn snapshot_with_texts(texts: &[&str]) -> ProductSnapshot {
    ProductSnapshot {
        title: "Wooden Serving Tray".to_string(),
        price: "₹1,299.00".to_string(),
        details: ProductDetails::default(),
        raw_reviews: texts
            .iter()
            .enumerate()
            .map(|(i, text)| raw_review(&format!("Reviewer {i}"), text))
            .collect(),
    }
}

/// One review block in a fixture page.
#[derive(Debug, Clone)]
pub struct ReviewFixture {
    pub name: String,
    pub rating: String,
    pub title: String,
    pub date: String,
    pub text: String,
    pub verified: bool,
}

impl ReviewFixture {
    pub fn new(name: &str, text: &str) -> Self {
        Self {
            name: name.to_string(),
            rating: "5.0 out of 5 stars".to_string(),
            title: "Nice".to_string(),
            date: "Reviewed in India on 3 March 2024".to_string(),
            text: text.to_string(),
            verified: true,
        }
    }

    fn to_html(&self) -> String {
        let badge = if self.verified {
            r#"<span data-hook="avp-badge" class="a-size-mini a-color-state a-text-bold">Verified Purchase</span>"#
        } else {
            ""
        };
        format!(
            r#"<div data-hook="review" class="a-section review aok-relative">
  <div class="a-profile-content"><span class="a-profile-name">{name}</span></div>
  <i data-hook="review-star-rating" class="a-icon a-icon-star review-rating"><span class="a-icon-alt">{rating}</span></i>
  <a data-hook="review-title" class="review-title"><span>{title}</span></a>
  <span data-hook="review-date" class="review-date">{date}</span>
  {badge}
  <span data-hook="review-body" class="review-text"><span>
    {text}
  </span></span>
</div>"#,
            name = self.name,
            rating = self.rating,
            title = self.title,
            date = self.date,
            text = self.text,
        )
    }
}

/// A product page with title, a split price and embedded reviews.
pub fn product_page_html(title: &str, reviews: &[ReviewFixture]) -> String {
    let review_blocks: String = reviews.iter().map(ReviewFixture::to_html).collect();
    format!(
        r#"<html><head><title>Amazon.in</title><script>var x = 1;</script></head>
<body>
  <span id="productTitle" class="a-size-large">
      {title}
  </span>
  <span class="a-price"><span class="a-offscreen">₹1,299.00</span>
    <span class="a-price-symbol">₹</span><span class="a-price-whole">1,299<span class="a-price-decimal">.</span></span><span class="a-price-fraction">00</span>
  </span>
  <span id="acrPopover" title="4.2 out of 5 stars"></span>
  <span id="acrCustomerReviewText">1,024 ratings</span>
  <div id="feature-bullets"><ul>
    <li><span>Solid acacia wood</span></li>
    <li><span>Hand finished</span></li>
  </ul></div>
  <div id="productDescription"><p>A serving tray for breakfast in bed.</p></div>
  <div id="cm-cr-dp-review-list">{review_blocks}</div>
</body></html>"#
    )
}

/// An all-reviews page carrying only review blocks.
pub fn reviews_page_html(reviews: &[ReviewFixture]) -> String {
    let review_blocks: String = reviews.iter().map(ReviewFixture::to_html).collect();
    format!(
        r#"<html><body><div id="cm_cr-review_list">{review_blocks}</div></body></html>"#
    )
}
