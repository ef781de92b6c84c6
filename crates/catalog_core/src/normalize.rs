use serde_json::{Map, Value};

use crate::{NormalizedRecord, RawEntry};

/// Referral query parameter appended to every catalog URL.
pub const AFFILIATE_PARAM: &str = "fpr=p2hrc6";

/// Base used to synthesize a canonical item URL from `username` and `name`.
pub const PLATFORM_BASE_URL: &str = "https://apify.com";

const UNKNOWN: &str = "Unknown";

/// Maps one raw catalog entry to a [`NormalizedRecord`].
///
/// Never fails. A field that is absent, `null` or not a string takes its
/// default, so a non-object entry yields an all-default record. An empty
/// string is kept as is and never produces a synthesized URL.
pub fn normalize(raw: &RawEntry) -> NormalizedRecord {
    let name = string_field(raw, "name").unwrap_or(UNKNOWN).to_string();
    let username = string_field(raw, "username").unwrap_or_default().to_string();
    let title = string_field(raw, "title").unwrap_or(name.as_str()).to_string();

    let (url, affiliate_url) = match text_field(raw, "url") {
        Some(url) => (url.to_string(), with_affiliate_param(url)),
        None if !username.is_empty() && !name.is_empty() => {
            let url = format!("{PLATFORM_BASE_URL}/{username}/{name}");
            let affiliate_url = with_affiliate_param(&url);
            (url, affiliate_url)
        }
        None => (String::new(), String::new()),
    };

    NormalizedRecord {
        title,
        description: string_field(raw, "description").unwrap_or_default().to_string(),
        url,
        affiliate_url,
        stats: raw
            .get("stats")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_else(Map::new),
        categories: raw
            .get("categories")
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(ToOwned::to_owned)
                    .collect()
            })
            .unwrap_or_default(),
        created_at: string_field(raw, "createdAt").unwrap_or_default().to_string(),
        modified_at: string_field(raw, "modifiedAt").unwrap_or_default().to_string(),
        name,
        username,
    }
}

/// Appends [`AFFILIATE_PARAM`] to `url`, joining with `&` when the URL already
/// carries a query string and with `?` otherwise.
pub fn with_affiliate_param(url: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{AFFILIATE_PARAM}")
}

/// String value of `key`, if any.
fn string_field<'a>(raw: &'a RawEntry, key: &str) -> Option<&'a str> {
    raw.get(key).and_then(Value::as_str)
}

/// Non-empty string value of `key`, if any.
fn text_field<'a>(raw: &'a RawEntry, key: &str) -> Option<&'a str> {
    raw.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}
