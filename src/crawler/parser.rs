//! HTML parser for survey pages
//!
//! Two kinds of pages are parsed:
//! - Area pages carry a `<select name="neighborhoods">` dropdown whose
//!   options point at neighborhood pages
//! - Neighborhood pages carry image entries: a link into `/RES/access/sp/`
//!   or `/RES/access/up/` inside a table cell that also holds the caption
//!   and a "Photo Record" link

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;
use url::Url;

/// Path fragments that mark a link as a survey image
const IMAGE_PATH_MARKERS: [&str; 2] = ["/RES/access/sp/", "/RES/access/up/"];

/// Link text of the per-image record page
const PHOTO_RECORD_TEXT: &str = "Photo Record";

/// A neighborhood listed in an area page dropdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborhoodRef {
    /// Option text, e.g. "W. Franklin St. and Monument Ave. (A001)"
    pub name: String,
    /// Absolute URL of the neighborhood page
    pub url: String,
}

/// An image entry scraped from a neighborhood page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedImage {
    /// Stable identifier used for deduplication (the cleaned image URL)
    pub permalink: String,
    /// Absolute URL of the image file
    pub image_url: String,
    pub title: String,
    /// Secondary caption line, usually a street or district
    pub location: Option<String>,
    /// Caption line recognised as a date, verbatim
    pub date: Option<String>,
    pub year: i32,
    /// The entry's "Photo Record" page, when linked
    pub record_url: Option<String>,
}

/// Why an image entry was not turned into a [`ScrapedImage`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The link does not name an image file
    MissingPermalink,
    /// No caption text was found for the entry
    MissingTitle,
    /// The link could not be resolved against the page URL
    InvalidUrl(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPermalink => f.write_str("missing permalink"),
            Self::MissingTitle => f.write_str("missing title"),
            Self::InvalidUrl(e) => write!(f, "invalid url: {}", e),
        }
    }
}

/// A malformed image entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEntry {
    /// 1-based position of the entry among the page's image links
    pub index: usize,
    pub href: String,
    pub reason: RejectReason,
}

/// Result of parsing a neighborhood page
#[derive(Debug, Clone, Default)]
pub struct ParsedNeighborhood {
    pub images: Vec<ScrapedImage>,
    pub rejected: Vec<RejectedEntry>,
}

/// Parses an area page and extracts the neighborhood dropdown
///
/// Options with an empty value or a "Select ..." prompt are ignored, as are
/// options repeating an earlier URL.
///
/// # Returns
///
/// * `Ok(Vec<NeighborhoodRef>)` - Neighborhoods in document order (may be empty)
/// * `Err(String)` - The page has no neighborhoods dropdown
///
/// # Example
///
/// ```
/// use res_importer::crawler::parse_area_page;
/// use url::Url;
///
/// let html = r#"<select name="neighborhoods">
///     <option value="">Select a neighborhood</option>
///     <option value="/res/a001.html">Monument Ave. (A001)</option>
/// </select>"#;
/// let base = Url::parse("https://image.lva.virginia.gov/cgi-bin/res/res.pl").unwrap();
/// let found = parse_area_page(html, &base, true).unwrap();
/// assert_eq!(found[0].url, "https://image.lva.virginia.gov/res/a001.html");
/// ```
pub fn parse_area_page(
    html: &str,
    base_url: &Url,
    force_https: bool,
) -> Result<Vec<NeighborhoodRef>, String> {
    let document = Html::parse_document(html);

    let select_selector = selector("select[name='neighborhoods']");
    let option_selector = selector("option");

    let dropdown = document
        .select(&select_selector)
        .next()
        .ok_or_else(|| "no neighborhoods dropdown found".to_string())?;

    let mut seen = HashSet::new();
    let mut neighborhoods = Vec::new();

    for option in dropdown.select(&option_selector) {
        let value = option.value().attr("value").unwrap_or("").trim();
        let name = collapse_whitespace(&option.text().collect::<String>());

        if value.is_empty() || name.is_empty() || name.contains("Select") {
            continue;
        }

        let url = match resolve(value, base_url, force_https) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Skipping neighborhood option '{}' ({}): {}", name, value, e);
                continue;
            }
        };

        if seen.insert(url.to_string()) {
            neighborhoods.push(NeighborhoodRef {
                name,
                url: url.to_string(),
            });
        }
    }

    Ok(neighborhoods)
}

/// Parses a neighborhood page and extracts its image entries
///
/// Every link into the survey's image folders is one entry. Links that
/// repeat an earlier link's target on the same page are dropped (a
/// thumbnail and its caption often link the same file), whether or not the
/// entry is well formed; malformed entries are returned in `rejected`
/// rather than failing the page. Entry indexes count distinct entries.
pub fn parse_neighborhood_page(
    html: &str,
    base_url: &Url,
    force_https: bool,
    default_year: i32,
) -> ParsedNeighborhood {
    let document = Html::parse_document(html);
    let link_selector = selector("a[href]");

    let mut parsed = ParsedNeighborhood::default();
    let mut seen = HashSet::new();
    let mut index = 0;

    for link in document.select(&link_selector) {
        let href = link.value().attr("href").unwrap_or("");
        if !IMAGE_PATH_MARKERS.iter().any(|marker| href.contains(marker)) {
            continue;
        }

        let cleaned: String = href.chars().filter(|c| *c != '[' && *c != ']').collect();
        let resolved = resolve(&cleaned, base_url, force_https);
        let target = match &resolved {
            Ok(url) => url.to_string(),
            Err(_) => cleaned.trim().to_string(),
        };
        if !seen.insert(target) {
            tracing::trace!("Repeated link to {} on page", href);
            continue;
        }
        index += 1;

        match extract_image(link, resolved, base_url, force_https, default_year) {
            Ok(image) => parsed.images.push(image),
            Err(reason) => parsed.rejected.push(RejectedEntry {
                index,
                href: href.to_string(),
                reason,
            }),
        }
    }

    parsed
}

fn extract_image(
    link: ElementRef<'_>,
    resolved: Result<Url, url::ParseError>,
    base_url: &Url,
    force_https: bool,
    default_year: i32,
) -> Result<ScrapedImage, RejectReason> {
    let image_url = resolved.map_err(|e| RejectReason::InvalidUrl(e.to_string()))?;

    let names_file = image_url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .is_some_and(|last| !last.is_empty());
    if !names_file {
        return Err(RejectReason::MissingPermalink);
    }

    // The caption lives in the enclosing cell; fall back to the link itself
    let container = link
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == "td")
        .unwrap_or(link);

    let caption = Caption::from_element(container);
    let title = caption.title.ok_or(RejectReason::MissingTitle)?;

    let record_url = find_record_link(container)
        .and_then(|record_href| resolve(record_href, base_url, force_https).ok())
        .map(|url| url.to_string());

    Ok(ScrapedImage {
        permalink: image_url.to_string(),
        image_url: image_url.to_string(),
        title,
        location: caption.location,
        year: caption.year.unwrap_or(default_year),
        date: caption.date,
        record_url,
    })
}

/// Caption lines of an image entry, classified
#[derive(Debug, Default)]
struct Caption {
    title: Option<String>,
    location: Option<String>,
    date: Option<String>,
    year: Option<i32>,
}

impl Caption {
    fn from_element(element: ElementRef<'_>) -> Self {
        let mut caption = Self::default();

        let lines = element
            .text()
            .flat_map(str::lines)
            .map(clean_caption_line)
            .filter(|line| !line.is_empty() && !line.contains(PHOTO_RECORD_TEXT));

        for line in lines {
            if caption.date.is_none() {
                if let Some(year) = parse_year(&line) {
                    caption.year = Some(year);
                    caption.date = Some(line);
                    continue;
                }
            }

            if caption.title.is_none() {
                caption.title = Some(line);
            } else if caption.location.is_none() && caption.title.as_deref() != Some(line.as_str())
            {
                caption.location = Some(line);
            }
        }

        caption
    }
}

fn find_record_link(container: ElementRef<'_>) -> Option<&str> {
    let link_selector = selector("a[href]");
    container
        .select(&link_selector)
        .find(|a| a.text().any(|t| t.contains(PHOTO_RECORD_TEXT)))
        .and_then(|a| a.value().attr("href"))
}

/// Recognises caption lines that are dates: "1965", "c. 1965", "May 1965",
/// "May 12, 1965", "5/12/1965"
fn parse_year(line: &str) -> Option<i32> {
    static DATE_LINE: OnceLock<Regex> = OnceLock::new();
    let re = DATE_LINE.get_or_init(|| {
        Regex::new(
            r"(?i)^(?:(?:c\.|ca\.|circa)\s*)?(?:[a-z]+\.?\s+(?:\d{1,2},?\s+)?|\d{1,2}/\d{1,2}/)?((?:18|19|20)\d{2})$",
        )
        .expect("date pattern is valid")
    });

    re.captures(line)
        .and_then(|captures| captures.get(1))
        .and_then(|year| year.as_str().parse().ok())
}

/// Strips quotes and stray `>` left over from the survey's markup
fn clean_caption_line(line: &str) -> String {
    let line = line
        .trim()
        .trim_start_matches('"')
        .trim_end_matches(|c: char| c == '"' || c == '>' || c.is_whitespace());
    collapse_whitespace(line)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolves an href against the page URL, optionally upgrading to https
fn resolve(href: &str, base_url: &Url, force_https: bool) -> Result<Url, url::ParseError> {
    let mut url = base_url.join(href.trim())?;
    if force_https && url.scheme() == "http" {
        // http -> https is always a permitted scheme change
        let _ = url.set_scheme("https");
    }
    Ok(url)
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}
