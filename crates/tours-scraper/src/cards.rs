//! Card extraction from rendered listing page HTML.
//!
//! Source markup changes between category pages and over time, so every
//! field is read through a prioritized chain of strategies: the first one
//! that yields a value wins, and a chain that yields nothing leaves the field
//! empty. Only the card name is required.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use crate::types::ListingRecord;

/// Card container selectors, most specific first.
pub const CARD_SELECTORS: &[&str] = &[
    "[data-automation='cardWrapper']",
    "[data-automation='WebPresentation_SingleFlexCardSection']",
    "[data-test-target='product-card']",
    "div.attraction_element",
];

/// Consent banners and interstitials that cover the listing grid.
pub const POPUP_SELECTOR: &str = "#onetrust-accept-btn-handler, \
     button[aria-label='Close'], \
     [data-automation='closeModal']";

const TITLE_SELECTORS: &[&str] = &[
    "[data-automation='cardTitle']",
    ".listing_title",
    "h3",
    "h2",
];

const LINK_SELECTORS: &[&str] = &[
    "a[href*='AttractionProductReview']",
    "a[href*='Attraction_Review']",
    "a[href]",
];

const REVIEW_COUNT_SELECTORS: &[&str] = &[
    "[data-automation='bubbleReviewCount']",
    ".review_count",
    ".more a",
];

const CATEGORY_SELECTORS: &[&str] = &["[data-automation='cardCategory']", ".tag_line", ".category"];

const DESCRIPTION_SELECTORS: &[&str] = &[
    "[data-automation='cardDescription']",
    ".listing_description",
    "p",
];

const DURATION_SELECTORS: &[&str] = &["[data-automation='cardDuration']", ".duration"];

const PRICE_SELECTORS: &[&str] = &[
    "[data-automation='cardPrice']",
    ".price",
    "[class*='price']",
];

const PROVIDER_SELECTORS: &[&str] = &[
    "[data-automation='cardSupplier']",
    ".supplier",
    ".provider",
];

const GROUP_SIZE_SELECTORS: &[&str] = &["[data-automation='cardGroupSize']", ".group_size"];

const HIGHLIGHT_SELECTORS: &[&str] = &[
    "[data-automation='cardHighlight']",
    ".highlights li",
];

const RATING_VALUE_SELECTORS: &[&str] = &["[data-automation='bubbleRatingValue']", ".rating_value"];

/// Image attributes checked in order; lazy-loaded cards leave `src` empty.
const IMAGE_ATTRS: &[&str] = &["src", "data-src", "data-lazyurl", "srcset"];

/// Ratings are encoded in class names as tenths, e.g. `bubble_45` → 4.5.
const RATING_CLASS_DIVISOR: f64 = 10.0;

const MAX_RATING: f64 = 5.0;

static BUBBLE_CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^bubble_(\d{2})$").expect("valid bubble class regex"));

static RATING_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d(?:\.\d+)?)\s*of\s*5\b").expect("valid rating label regex")
});

static RANK_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s+").expect("valid rank prefix regex"));

// Hint patterns must cover the whole text node, so a number buried in a
// sentence ("Free cancellation up to 24 hours before") is not taken.
static DURATION_HINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:approx\.?\s*|about\s+)?\d+(?:\.\d+)?(?:\s*-\s*\d+(?:\.\d+)?)?\s*(?:hours?|hrs?|h|minutes?|mins?|m|days?)(?:\s*\d+\s*(?:minutes?|mins?|m)?)?\+?$",
    )
    .expect("valid duration hint regex")
});

static GROUP_SIZE_HINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?:up to|max(?:imum)?\.?)\s*\d+(?:\s*(?:people|persons?|travell?ers|guests|participants))?|\d+\s*(?:people|persons?|travell?ers|guests|participants)(?:\s*max(?:imum)?)?)$",
    )
    .expect("valid group size hint regex")
});

/// Booking policy text never carries a tour attribute.
static POLICY_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)cancel|refund").expect("valid policy text regex"));

static PRICE_HINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bfrom\s*[$€£]?\s*\d|[$€£]\s*\d|\b(?:BHD|BD)\s*\d|\d\s*(?:BHD|BD)\b")
        .expect("valid price hint regex")
});

type RatingStrategy = fn(ElementRef<'_>) -> Option<f64>;

const RATING_STRATEGIES: &[RatingStrategy] =
    &[rating_from_bubble_class, rating_from_label, rating_from_value_text];

/// Returns `true` if `css` matches at least one element of `html`.
///
/// Invalid selectors never match.
#[must_use]
pub fn html_matches(html: &str, css: &str) -> bool {
    let Some(sel) = selector(css) else {
        return false;
    };
    let document = Html::parse_document(html);
    let matched = document.select(&sel).next().is_some();
    matched
}

/// Extracts one [`ListingRecord`] per element matching `card_selector`, in
/// document order. Cards without a name are dropped.
///
/// `page_url` is used to resolve relative link and image URLs.
#[must_use]
pub fn extract_cards(html: &str, page_url: &str, card_selector: &str) -> Vec<ListingRecord> {
    let Some(sel) = selector(card_selector) else {
        return Vec::new();
    };
    let base = Url::parse(page_url).ok();
    let document = Html::parse_document(html);

    let records: Vec<ListingRecord> = document
        .select(&sel)
        .filter_map(|card| extract_card(card, base.as_ref()))
        .collect();
    records
}

fn extract_card(card: ElementRef<'_>, base: Option<&Url>) -> Option<ListingRecord> {
    let name = first_text(card, TITLE_SELECTORS)
        .map(|t| RANK_PREFIX_RE.replace(&t, "").into_owned())
        .filter(|t| !t.is_empty())?;

    let detail_url = first_attr(card, LINK_SELECTORS, &["href"])
        .map(|href| resolve(base, &href))
        .unwrap_or_default();

    let image_url = first_attr(card, &["img"], IMAGE_ATTRS)
        .map(|src| resolve(base, &src))
        .unwrap_or_default();

    let provider_name = first_text(card, PROVIDER_SELECTORS)
        .or_else(|| text_node_with_prefix(card, "By "))
        .map(|p| strip_by_prefix(&p))
        .unwrap_or_default();

    Some(ListingRecord {
        name,
        description: first_text(card, DESCRIPTION_SELECTORS).unwrap_or_default(),
        category_label: first_text(card, CATEGORY_SELECTORS).unwrap_or_default(),
        rating: RATING_STRATEGIES.iter().find_map(|strategy| strategy(card)),
        review_count_text: first_text(card, REVIEW_COUNT_SELECTORS).unwrap_or_default(),
        duration_text: first_text(card, DURATION_SELECTORS)
            .or_else(|| text_node_matching(card, &DURATION_HINT_RE))
            .unwrap_or_default(),
        group_size_text: first_text(card, GROUP_SIZE_SELECTORS)
            .or_else(|| text_node_matching(card, &GROUP_SIZE_HINT_RE))
            .unwrap_or_default(),
        price_text: first_text(card, PRICE_SELECTORS)
            .or_else(|| text_node_matching(card, &PRICE_HINT_RE))
            .unwrap_or_default(),
        image_url,
        provider_name,
        detail_url,
        highlights: all_texts(card, HIGHLIGHT_SELECTORS),
    })
}

// ---------------------------------------------------------------------------
// Rating strategies
// ---------------------------------------------------------------------------

fn rating_from_bubble_class(card: ElementRef<'_>) -> Option<f64> {
    let sel = selector("[class*='bubble_']")?;
    card.select(&sel)
        .flat_map(|el| el.value().classes())
        .filter_map(|class| BUBBLE_CLASS_RE.captures(class))
        .filter_map(|caps| caps.get(1)?.as_str().parse::<f64>().ok())
        .map(|tenths| tenths / RATING_CLASS_DIVISOR)
        .find(|r| valid_rating(*r))
}

/// Accessible labels such as `aria-label="4.5 of 5 bubbles"` or an SVG
/// `<title>` with the same text.
fn rating_from_label(card: ElementRef<'_>) -> Option<f64> {
    let parse = |text: &str| -> Option<f64> {
        RATING_LABEL_RE
            .captures(text)
            .and_then(|caps| caps.get(1)?.as_str().parse::<f64>().ok())
            .filter(|r| valid_rating(*r))
    };

    let labelled = selector("[aria-label]")?;
    let from_aria = card
        .select(&labelled)
        .filter_map(|el| el.value().attr("aria-label"))
        .find_map(parse);
    if from_aria.is_some() {
        return from_aria;
    }

    let titles = selector("svg title")?;
    card.select(&titles)
        .map(element_text)
        .find_map(|text| parse(&text))
}

fn rating_from_value_text(card: ElementRef<'_>) -> Option<f64> {
    first_text(card, RATING_VALUE_SELECTORS)
        .and_then(|t| t.parse::<f64>().ok())
        .filter(|r| valid_rating(*r))
}

fn valid_rating(rating: f64) -> bool {
    (0.0..=MAX_RATING).contains(&rating)
}

// ---------------------------------------------------------------------------
// DOM helpers
// ---------------------------------------------------------------------------

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(sel) => Some(sel),
        Err(e) => {
            tracing::debug!(css, error = %e, "skipping invalid CSS selector");
            None
        }
    }
}

/// Text content with whitespace runs collapsed to single spaces.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of the first element, across `selectors` in order, whose text is non-empty.
fn first_text(card: ElementRef<'_>, selectors: &[&str]) -> Option<String> {
    selectors.iter().filter_map(|css| selector(css)).find_map(|sel| {
        card.select(&sel)
            .map(element_text)
            .find(|text| !text.is_empty())
    })
}

/// First non-empty value of any of `attrs` on elements matching `selectors`.
fn first_attr(card: ElementRef<'_>, selectors: &[&str], attrs: &[&str]) -> Option<String> {
    selectors.iter().filter_map(|css| selector(css)).find_map(|sel| {
        card.select(&sel).find_map(|el| {
            attrs.iter().find_map(|attr| {
                let value = el.value().attr(attr)?;
                // srcset is "url 1x, url 2x"; keep the first URL.
                let value = value.split_whitespace().next()?.trim_end_matches(',');
                usable_url(value).then(|| value.to_string())
            })
        })
    })
}

/// All non-empty texts for the first selector that matches anything.
fn all_texts(card: ElementRef<'_>, selectors: &[&str]) -> Vec<String> {
    selectors
        .iter()
        .filter_map(|css| selector(css))
        .map(|sel| {
            card.select(&sel)
                .map(element_text)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
        })
        .find(|texts| !texts.is_empty())
        .unwrap_or_default()
}

fn text_node_matching(card: ElementRef<'_>, re: &Regex) -> Option<String> {
    card.text()
        .map(str::trim)
        .filter(|t| !POLICY_TEXT_RE.is_match(t))
        .find(|t| re.is_match(t))
        .map(str::to_string)
}

fn text_node_with_prefix(card: ElementRef<'_>, prefix: &str) -> Option<String> {
    card.text()
        .map(str::trim)
        .find(|t| t.len() > prefix.len() && t.starts_with(prefix))
        .map(str::to_string)
}

fn strip_by_prefix(provider: &str) -> String {
    let trimmed = provider.trim();
    match trimmed.get(..3) {
        Some(head) if head.eq_ignore_ascii_case("by ") => trimmed[3..].trim().to_string(),
        _ => trimmed.to_string(),
    }
}

fn usable_url(value: &str) -> bool {
    !value.is_empty() && value != "#" && !value.starts_with("data:") && !value.starts_with("javascript:")
}

fn resolve(base: Option<&Url>, href: &str) -> String {
    base.and_then(|b| b.join(href).ok())
        .map_or_else(|| href.to_string(), String::from)
}

#[cfg(test)]
#[path = "cards_test.rs"]
mod tests;
