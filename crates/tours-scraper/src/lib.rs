pub mod cards;
pub mod error;
pub mod listing;
pub mod normalize;
pub mod page;
pub mod parse;
mod rate_limit;
pub mod types;

pub use error::ScraperError;
pub use listing::{extract_listings, ExtractSettings};
pub use normalize::{extract_external_id, normalize_listing};
pub use page::{BrowserPage, BrowserSettings, FixturePage, HttpPage, WebDriverPage};
pub use parse::{map_category, parse_duration, parse_price, parse_review_count, ParsedDuration};
pub use types::ListingRecord;
