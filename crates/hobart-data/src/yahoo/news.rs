//! Headline news from the Yahoo Finance RSS feed.

use crate::error::{DataError, Result};
use chrono::{DateTime, Utc};
use hobart_valuation::NewsItem;
use quick_xml::Reader;
use quick_xml::events::Event;

/// RSS feed endpoint; `{}` is the Yahoo-formatted symbol.
const FEED_URL: &str = "https://feeds.finance.yahoo.com/rss/2.0/headline?s={}";

/// Fetch recent headlines for a symbol.
///
/// Callers treat news as best-effort decoration on a snapshot; a feed
/// failure should be logged and degraded to an empty list, never allowed
/// to fail the evaluation.
pub async fn fetch_news(client: &reqwest::Client, symbol: &str) -> Result<Vec<NewsItem>> {
    let url = FEED_URL.replace("{}", symbol);
    let response = client.get(&url).send().await.map_err(DataError::Network)?;

    if !response.status().is_success() {
        return Err(DataError::YahooApi(format!(
            "news feed for {}: HTTP {}",
            symbol,
            response.status()
        )));
    }

    let body = response.text().await.map_err(DataError::Network)?;
    parse_feed(&body)
}

/// Element of an `<item>` currently being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemField {
    Guid,
    Title,
    Description,
    Link,
    PubDate,
}

#[derive(Debug, Default)]
struct ItemDraft {
    guid: Option<String>,
    title: Option<String>,
    description: Option<String>,
    link: Option<String>,
    pub_date: Option<String>,
}

impl ItemDraft {
    fn set(&mut self, field: ItemField, text: String) {
        let slot = match field {
            ItemField::Guid => &mut self.guid,
            ItemField::Title => &mut self.title,
            ItemField::Description => &mut self.description,
            ItemField::Link => &mut self.link,
            ItemField::PubDate => &mut self.pub_date,
        };
        // Concatenate in case the parser splits text across events.
        match slot {
            Some(existing) => existing.push_str(&text),
            None => *slot = Some(text),
        }
    }

    fn finish(self) -> Option<NewsItem> {
        // Without a stable identifier the item cannot be de-duplicated
        // downstream; fall back to the link before giving up.
        let id = self.guid.or_else(|| self.link.clone())?;
        Some(NewsItem {
            id,
            title: self.title,
            summary: self.description,
            url: self.link,
            provider_name: Some("Yahoo Finance".to_string()),
            published_at: self.pub_date.as_deref().and_then(parse_pub_date),
        })
    }
}

fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse an RSS 2.0 feed body into news items.
fn parse_feed(body: &str) -> Result<Vec<NewsItem>> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut draft: Option<ItemDraft> = None;
    let mut field: Option<ItemField> = None;

    loop {
        match reader.read_event() {
            Err(err) => return Err(DataError::XmlParse(err.to_string())),
            Ok(Event::Eof) => break,
            Ok(Event::Start(start)) => match start.name().as_ref() {
                b"item" => draft = Some(ItemDraft::default()),
                b"guid" if draft.is_some() => field = Some(ItemField::Guid),
                b"title" if draft.is_some() => field = Some(ItemField::Title),
                b"description" if draft.is_some() => field = Some(ItemField::Description),
                b"link" if draft.is_some() => field = Some(ItemField::Link),
                b"pubDate" if draft.is_some() => field = Some(ItemField::PubDate),
                _ => field = None,
            },
            Ok(Event::End(end)) => {
                if end.name().as_ref() == b"item"
                    && let Some(finished) = draft.take().and_then(ItemDraft::finish)
                {
                    items.push(finished);
                }
                field = None;
            }
            Ok(Event::Text(text)) => {
                if let (Some(current), Some(active)) = (draft.as_mut(), field) {
                    let text = text
                        .unescape()
                        .map_err(|err| DataError::XmlParse(err.to_string()))?;
                    current.set(active, text.into_owned());
                }
            }
            Ok(Event::CData(cdata)) => {
                if let (Some(current), Some(active)) = (draft.as_mut(), field) {
                    let text = String::from_utf8_lossy(&cdata.into_inner()).into_owned();
                    current.set(active, text);
                }
            }
            Ok(_) => {}
        }
    }

    Ok(items)
}
