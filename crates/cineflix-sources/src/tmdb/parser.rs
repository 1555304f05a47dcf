use cineflix_models::{CastMember, MovieRecord, WatchLink};
use regex::Regex;
use select::document::Document;
use select::node::Node;
use select::predicate::{Attr, Class, Name, Predicate};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

static STREAM_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)stream").expect("static regex"));
static ORIGINAL_LANGUAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)original language").expect("static regex"));
// Provider anchors bounce through a tracker; the real target is percent-encoded in `r=`
static PROVIDER_REDIRECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"r=(https%3A%2F%2F[^&]+)").expect("static regex"));

/// Fields read from the primary detail page. Watch links and backdrops live
/// on secondary pages and are resolved by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailPage {
    pub director: String,
    pub cast: Vec<CastMember>,
    pub genres: Vec<String>,
    pub runtime: Option<String>,
    pub certificate: Option<String>,
    pub language: Option<String>,
    pub overview: Option<String>,
    pub watch_page_url: Option<String>,
}

/// Collapse runs of whitespace the way the site indents its markup
fn clean_text(node: &Node) -> String {
    node.text().split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn first_text<P: Predicate>(node: &Node, predicate: P) -> Option<String> {
    node.find(predicate).next().map(|n| clean_text(&n)).and_then(non_empty)
}

fn first_attr<P: Predicate>(node: &Node, predicate: P, attr: &str) -> Option<String> {
    node.find(predicate)
        .next()
        .and_then(|n| n.attr(attr))
        .map(|value| value.trim().to_string())
        .and_then(non_empty)
}

/// Turn a site-relative href into an absolute URL
pub fn absolute_url(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!("{}{}", base_url, href)
    }
}

/// Parse the search results page. Cards without a result link and TV shows are skipped.
pub fn parse_search_results(html: &str, base_url: &str) -> Vec<MovieRecord> {
    let document = Document::from(html);
    let mut movies = Vec::new();

    for card in document.find(Name("div").and(Class("card")).and(Class("v4")).and(Class("tight"))) {
        let href = match card.find(Name("a").and(Class("result"))).next().and_then(|a| a.attr("href")) {
            Some(href) => href,
            None => continue,
        };

        if href.starts_with("/tv/") {
            continue;
        }

        movies.push(MovieRecord {
            title: first_text(&card, Name("h2")),
            poster: first_attr(&card, Name("img"), "src"),
            release_date: first_text(&card, Name("span").and(Class("release_date"))),
            overview: first_text(&card, Name("div").and(Class("overview")).descendant(Name("p"))),
            url: absolute_url(base_url, href),
        });
    }

    debug!("Parsed {} movie cards from search results", movies.len());
    movies
}

/// Parse one page of a category listing. Cards without a link have no identity and are skipped.
pub fn parse_listing_page(html: &str, base_url: &str) -> Vec<MovieRecord> {
    let document = Document::from(html);
    let mut movies = Vec::new();

    for card in document.find(Name("div").and(Class("card")).and(Class("style_1"))) {
        let href = match card.find(Name("a").and(Attr("href", ()))).next().and_then(|a| a.attr("href")) {
            Some(href) => href,
            None => {
                debug!("Skipping listing card without a link");
                continue;
            }
        };

        movies.push(MovieRecord {
            title: first_text(&card, Name("h2")),
            poster: first_attr(&card, Name("img"), "src"),
            release_date: first_text(&card, Name("div").and(Class("content")).descendant(Name("p"))),
            overview: None,
            url: absolute_url(base_url, href),
        });
    }

    movies
}

/// Parse a movie detail page.
///
/// Returns `None` when no director credit is present: that block anchors the
/// rest of the layout, and without it the page is treated as carrying no data.
pub fn parse_detail_page(html: &str, base_url: &str) -> Option<DetailPage> {
    let document = Document::from(html);

    let director = document.find(Name("li").and(Class("profile"))).find_map(|profile| {
        let character = profile.find(Name("p").and(Class("character"))).next()?;
        if !character.text().contains("Director") {
            return None;
        }
        first_text(&profile, Name("a"))
    })?;

    let cast = document
        .find(Name("li").and(Class("card")))
        .filter_map(|card| {
            let name = first_text(&card, Name("p"))?;
            Some(CastMember {
                name,
                image: first_attr(&card, Name("img"), "src"),
            })
        })
        .collect();

    let genres = document
        .find(Name("span").and(Class("genres")).descendant(Name("a")))
        .map(|a| clean_text(&a))
        .filter(|genre| !genre.is_empty())
        .collect();

    let facts = document.find(Name("div").and(Class("facts"))).next();
    let runtime = facts.as_ref().and_then(|f| first_text(f, Name("span").and(Class("runtime"))));
    let certificate = facts.as_ref().and_then(|f| first_text(f, Name("span").and(Class("certification"))));

    let language = document
        .find(Name("strong"))
        .filter(|strong| ORIGINAL_LANGUAGE.is_match(&strong.text()))
        .find_map(|strong| strong.parent())
        .and_then(|parent| non_empty(ORIGINAL_LANGUAGE.replace(&clean_text(&parent), "").trim().to_string()));

    let watch_page_url = document
        .find(Name("a"))
        .filter_map(|a| a.attr("href"))
        .find(|href| href.contains("/watch"))
        .map(|href| absolute_url(base_url, href));

    let overview = document
        .find(Name("div").and(Class("overview")).descendant(Name("p")))
        .next()
        .map(|p| clean_text(&p))
        .and_then(non_empty);

    Some(DetailPage {
        director,
        cast,
        genres,
        runtime,
        certificate,
        language,
        overview,
        watch_page_url,
    })
}

/// Parse the streaming providers listed under the "Stream" heading of a watch page
pub fn parse_watch_links(html: &str) -> Vec<WatchLink> {
    let document = Document::from(html);

    let heading = match document.find(Name("h3")).find(|h3| STREAM_HEADING.is_match(&h3.text())) {
        Some(heading) => heading,
        None => return Vec::new(),
    };

    let providers = match document
        .find(Name("ul").and(Class("providers")))
        .find(|ul| ul.index() > heading.index())
    {
        Some(providers) => providers,
        None => return Vec::new(),
    };

    let mut links: Vec<WatchLink> = Vec::new();
    for anchor in providers.find(Name("a").and(Attr("href", ()))) {
        let href = anchor.attr("href").unwrap_or_default();
        let target = PROVIDER_REDIRECT
            .captures(href)
            .and_then(|caps| caps.get(1))
            .and_then(|m| urlencoding::decode(m.as_str()).ok())
            .map(|decoded| decoded.into_owned());
        let icon = first_attr(&anchor, Name("img"), "src");

        if let (Some(url), Some(icon)) = (target, icon) {
            if !links.iter().any(|link| link.url == url) {
                links.push(WatchLink { icon, url });
            }
        }
    }

    links
}

/// Parse the backdrop gallery, keeping the first occurrence of each image
pub fn parse_backdrops(html: &str) -> Vec<String> {
    let document = Document::from(html);
    let mut seen = HashSet::new();

    document
        .find(Name("a").and(Attr("title", "View Original")))
        .filter_map(|a| a.attr("href"))
        .map(str::to_string)
        .filter(|href| seen.insert(href.clone()))
        .collect()
}
