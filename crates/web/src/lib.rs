//! # reviewlens-web: Page Extraction
//!
//! Implements the `Extractor` seam of `reviewlens` over live product pages.
//! Pages are fetched either directly or through a Firecrawl-style scrape API,
//! then parsed with `reviewlens-html` into a [`ProductSnapshot`].

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reviewlens::{
    constants::NOT_AVAILABLE, providers::extract::Extractor, ExtractionError, ProductDetails,
    ProductSnapshot, RawReviewRecord,
};
use reviewlens_html::{parse_product_html, parse_reviews_html, ParsedPage, ParsedReview};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/94.0.4606.81 Safari/537.36";

static PRODUCT_ID_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"/(?:dp|product-reviews)/([A-Z0-9]{10})").ok());

// --- Data Structures ---

/// How page HTML is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// A plain GET with browser-like headers.
    Direct,
    /// A scrape API that takes `{"url", "formats"}` and returns the page HTML.
    Firecrawl { api_url: String, api_key: String },
}

/// The pages one extraction reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTargets {
    /// Source of title, price and (as a fallback) reviews.
    pub product_url: String,
    /// The all-reviews page, when the product id could be recognised.
    pub reviews_url: Option<String>,
}

impl PageTargets {
    /// Canonicalises a product URL.
    ///
    /// URLs carrying a product id after `/dp/` or `/product-reviews/` map to the
    /// canonical product and reviews pages on the same origin. Anything else is
    /// fetched as given.
    pub fn from_url(url: &str) -> Self {
        let as_given = Self {
            product_url: url.to_string(),
            reviews_url: None,
        };
        let Ok(parsed) = Url::parse(url) else {
            return as_given;
        };
        let Some(product_id) = PRODUCT_ID_RE
            .as_ref()
            .and_then(|re| re.captures(parsed.path()))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
        else {
            return as_given;
        };

        let origin = parsed.origin().ascii_serialization();
        Self {
            product_url: format!("{origin}/dp/{product_id}"),
            reviews_url: Some(format!(
                "{origin}/product-reviews/{product_id}/ref=cm_cr_dp_d_show_all_btm?ie=UTF8&reviewerType=all_reviews"
            )),
        }
    }
}

#[derive(Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: [&'a str; 1],
}

#[derive(Deserialize, Debug)]
struct ScrapeResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<ScrapeData>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ScrapeData {
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    raw_html: Option<String>,
}

// --- Extractor implementation ---

/// Extracts a product snapshot from live pages.
#[derive(Debug, Clone)]
pub struct PageExtractor {
    client: reqwest::Client,
    strategy: ExtractionStrategy,
    direct_fallback: bool,
}

impl PageExtractor {
    /// Creates a new `PageExtractor`. `timeout` bounds each page fetch.
    pub fn new(strategy: ExtractionStrategy, timeout: Duration) -> Result<Self, ExtractionError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(ExtractionError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            strategy,
            direct_fallback: false,
        })
    }

    /// Retry a failed Firecrawl fetch with a direct GET of the same page.
    pub fn with_direct_fallback(mut self, enabled: bool) -> Self {
        self.direct_fallback = enabled;
        self
    }

    /// Fetches the HTML of one page using the configured strategy.
    pub async fn fetch_page_html(&self, url: &str) -> Result<String, ExtractionError> {
        match &self.strategy {
            ExtractionStrategy::Direct => self.fetch_direct(url).await,
            ExtractionStrategy::Firecrawl { api_url, api_key } => {
                match self.fetch_firecrawl(api_url, api_key, url).await {
                    Err(e) if self.direct_fallback => {
                        warn!(%url, error = %e, "Firecrawl failed, falling back to a direct request");
                        self.fetch_direct(url).await
                    }
                    result => result,
                }
            }
        }
    }

    async fn fetch_direct(&self, url: &str) -> Result<String, ExtractionError> {
        info!("Fetching page directly: {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ExtractionError::Request {
                url: url.to_string(),
                source,
            })?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Status {
                url: url.to_string(),
                status,
                body,
            });
        }
        response
            .text()
            .await
            .map_err(|source| ExtractionError::Request {
                url: url.to_string(),
                source,
            })
    }

    async fn fetch_firecrawl(
        &self,
        api_url: &str,
        api_key: &str,
        url: &str,
    ) -> Result<String, ExtractionError> {
        info!("Fetching page through Firecrawl: {url}");
        let response = self
            .client
            .post(api_url)
            .bearer_auth(api_key)
            .json(&ScrapeRequest {
                url,
                formats: ["html"],
            })
            .send()
            .await
            .map_err(|source| ExtractionError::Request {
                url: url.to_string(),
                source,
            })?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Status {
                url: url.to_string(),
                status,
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| ExtractionError::Request {
                url: url.to_string(),
                source,
            })?;
        let scrape: ScrapeResponse = serde_json::from_str(&body)
            .map_err(|e| ExtractionError::MalformedBody(e.to_string()))?;
        if !scrape.success {
            return Err(ExtractionError::Service(
                scrape
                    .error
                    .unwrap_or_else(|| "scrape was not successful".to_string()),
            ));
        }
        scrape
            .data
            .and_then(|data| data.html.or(data.raw_html))
            .filter(|html| !html.trim().is_empty())
            .ok_or_else(|| ExtractionError::MalformedBody("response carries no html".to_string()))
    }
}

#[async_trait]
impl Extractor for PageExtractor {
    /// Fetches the product page and, when known, the all-reviews page.
    ///
    /// Either page may fail on its own: title and price fall back to `"N/A"`,
    /// reviews fall back to those embedded in the product page. The run only
    /// fails when every page failed, or when nothing usable was parsed.
    async fn extract(&self, url: &str) -> Result<ProductSnapshot, ExtractionError> {
        let targets = PageTargets::from_url(url);
        debug!(?targets, "Resolved extraction targets");

        let (product_html, reviews_html) = match &targets.reviews_url {
            Some(reviews_url) => {
                let (product, reviews) = tokio::join!(
                    self.fetch_page_html(&targets.product_url),
                    self.fetch_page_html(reviews_url)
                );
                (product, Some(reviews))
            }
            None => (self.fetch_page_html(&targets.product_url).await, None),
        };

        let mut page = match product_html {
            Ok(html) => parse_product_html(&html),
            Err(e) => match &reviews_html {
                Some(Ok(_)) => {
                    warn!(error = %e, "Product page unavailable, continuing with the reviews page");
                    ParsedPage::default()
                }
                Some(Err(reviews_error)) => {
                    warn!(error = %reviews_error, "Reviews page unavailable as well");
                    return Err(e);
                }
                None => return Err(e),
            },
        };

        match reviews_html {
            Some(Ok(html)) => {
                let reviews = parse_reviews_html(&html);
                if reviews.is_empty() {
                    info!("Reviews page had no reviews, using those on the product page");
                } else {
                    page.reviews = reviews;
                }
            }
            Some(Err(e)) => {
                warn!(error = %e, "Reviews page unavailable, using reviews on the product page");
            }
            None => {}
        }

        if page.is_empty() {
            return Err(ExtractionError::NothingExtracted(url.to_string()));
        }

        Ok(ProductSnapshot {
            title: page.title.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            price: page.price.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            details: ProductDetails {
                average_rating: page.average_rating,
                total_ratings: page.total_ratings,
                features: page.features,
                description: page.description,
            },
            raw_reviews: page.reviews.into_iter().map(to_raw_record).collect(),
        })
    }
}

fn to_raw_record(review: ParsedReview) -> RawReviewRecord {
    RawReviewRecord {
        reviewer_name: review.name,
        rating: review.rating,
        review_title: review.title,
        review_text: review.text,
        review_date: review.date,
        is_verified_purchase: Some(review.verified),
    }
}
