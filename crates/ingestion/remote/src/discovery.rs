use era_network_spec::Network;
use futures::{StreamExt, stream};
use regex::Regex;
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::{error::RemoteError, range::EraRange};

const MAX_S3_PAGES: usize = 500;
const PROBE_BATCH_SIZE: u64 = 100;
const PROBE_CONCURRENCY: usize = 20;
const PROBE_STOP_AFTER_DRY_BATCHES: usize = 3;
const PROBE_DRY_THRESHOLD: f64 = 5.0;

/// Joins `segment` (an S3 key, an HTML `href`, or a generated filename)
/// onto `base_url`. Uses `Url::join` so an absolute `href` (already a full
/// URL) is taken as-is rather than doubly concatenated, falling back to
/// plain string concatenation if `base_url` doesn't parse as a URL at all.
fn join_url(base_url: &str, segment: &str) -> String {
    let segment = segment.trim_start_matches('/');
    let normalized_base = format!("{}/", base_url.trim_end_matches('/'));
    match Url::parse(&normalized_base).and_then(|base| base.join(segment)) {
        Ok(joined) => joined.to_string(),
        Err(_) => format!("{normalized_base}{segment}"),
    }
}

/// Discovers era file URLs on `base_url` for `network` within `range`,
/// preferring an S3-style bucket listing, falling back to scraping an HTML
/// directory index, and finally probing open-ended ranges with HEAD
/// requests when neither listing mechanism applies.
pub async fn discover_era_urls(
    client: &Client,
    base_url: &str,
    network: Network,
    range: EraRange,
) -> Result<Vec<(u64, String)>, RemoteError> {
    let mut found = if base_url.contains("s3") {
        discover_via_s3(client, base_url, network).await?
    } else {
        discover_via_html(client, base_url, network).await?
    };

    if found.is_empty() || range.end().is_none() {
        let probed = discover_open_ended(client, base_url, network, range.start()).await?;
        for entry in probed {
            if !found.iter().any(|(era, _)| *era == entry.0) {
                found.push(entry);
            }
        }
    }

    found.retain(|(era, _)| range.contains(*era));
    found.sort_by_key(|(era, _)| *era);
    Ok(found)
}

fn filename_pattern(network: Network) -> Regex {
    Regex::new(&format!(
        r"{}-(\d{{5}})-([0-9a-f]{{8}})\.era",
        regex::escape(network.as_str())
    ))
    .expect("pattern is statically well-formed")
}

async fn discover_via_s3(
    client: &Client,
    base_url: &str,
    network: Network,
) -> Result<Vec<(u64, String)>, RemoteError> {
    let pattern = filename_pattern(network);
    let key_pattern = Regex::new(r"<Key>([^<]+)</Key>").expect("static pattern");
    let token_pattern =
        Regex::new(r"<NextContinuationToken>([^<]+)</NextContinuationToken>").expect("static pattern");

    let mut found = Vec::new();
    let mut continuation_token: Option<String> = None;

    for _ in 0..MAX_S3_PAGES {
        let mut url = format!(
            "{base_url}/?list-type=2&prefix={}-&max-keys=1000",
            network.as_str()
        );
        if let Some(token) = &continuation_token {
            url.push_str(&format!("&continuation-token={token}"));
        }

        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|source| RemoteError::Request { url: url.clone(), source })?;
        let body = response
            .text()
            .await
            .map_err(|source| RemoteError::Request { url: url.clone(), source })?;

        for capture in key_pattern.captures_iter(&body) {
            let key = &capture[1];
            if let Some(era_capture) = pattern.captures(key) {
                if let Ok(era) = era_capture[1].parse::<u64>() {
                    found.push((era, join_url(base_url, key)));
                }
            }
        }

        continuation_token = token_pattern
            .captures(&body)
            .map(|capture| capture[1].to_string());
        if continuation_token.is_none() {
            break;
        }
    }

    debug!(count = found.len(), "discovered eras via S3 listing");
    Ok(found)
}

async fn discover_via_html(
    client: &Client,
    base_url: &str,
    network: Network,
) -> Result<Vec<(u64, String)>, RemoteError> {
    let pattern = filename_pattern(network);
    let response = client
        .get(base_url)
        .send()
        .await
        .map_err(|source| RemoteError::Request { url: base_url.to_string(), source })?;
    let body = response
        .text()
        .await
        .map_err(|source| RemoteError::Request { url: base_url.to_string(), source })?;

    let href_pattern = Regex::new(r#"href="([^"]+)""#).expect("static pattern");
    let mut found = Vec::new();
    for capture in href_pattern.captures_iter(&body) {
        let href = &capture[1];
        if let Some(era_capture) = pattern.captures(href) {
            if let Ok(era) = era_capture[1].parse::<u64>() {
                found.push((era, join_url(base_url, href)));
            }
        }
    }

    debug!(count = found.len(), "discovered eras via HTML listing");
    Ok(found)
}

async fn discover_open_ended(
    client: &Client,
    base_url: &str,
    network: Network,
    start: u64,
) -> Result<Vec<(u64, String)>, RemoteError> {
    let mut found = Vec::new();
    let mut batch_start = start;
    let mut consecutive_dry_batches = 0;

    loop {
        let eras: Vec<u64> = (batch_start..batch_start + PROBE_BATCH_SIZE).collect();
        let hits = stream::iter(eras.into_iter().map(|era| {
            let client = client.clone();
            let base_url = base_url.to_string();
            let network = network;
            async move {
                let url = join_url(&base_url, &format!("{}-{:05}-unknown.era", network.as_str(), era));
                match client.head(&url).send().await {
                    Ok(response) if response.status().is_success() => Some((era, url)),
                    _ => None,
                }
            }
        }))
        .buffer_unordered(PROBE_CONCURRENCY)
        .filter_map(|result| async move { result })
        .collect::<Vec<_>>()
        .await;

        let hit_count = hits.len();
        found.extend(hits);

        if (hit_count as f64) < PROBE_DRY_THRESHOLD {
            consecutive_dry_batches += 1;
        } else {
            consecutive_dry_batches = 0;
        }

        batch_start += PROBE_BATCH_SIZE;
        if consecutive_dry_batches >= PROBE_STOP_AFTER_DRY_BATCHES {
            break;
        }
    }

    info!(count = found.len(), "discovered eras via open-ended probing");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_relative_segment_onto_base() {
        assert_eq!(
            join_url("https://era.example.com/files", "mainnet-00100-abcd1234.era"),
            "https://era.example.com/files/mainnet-00100-abcd1234.era"
        );
    }

    #[test]
    fn base_trailing_slash_does_not_duplicate() {
        assert_eq!(
            join_url("https://era.example.com/files/", "mainnet-00100-abcd1234.era"),
            "https://era.example.com/files/mainnet-00100-abcd1234.era"
        );
    }

    #[test]
    fn absolute_href_is_taken_as_is() {
        assert_eq!(
            join_url("https://era.example.com/files", "https://other.example.com/mainnet-00100-abcd1234.era"),
            "https://other.example.com/mainnet-00100-abcd1234.era"
        );
    }
}
