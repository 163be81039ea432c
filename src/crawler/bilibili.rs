// Bilibili web API client for profile and upload crawling

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ORIGIN, REFERER, USER_AGENT};
use serde::Deserialize;
use tracing::debug;

use crate::config::environment::EnvironmentVariables;

// Bilibili rejects requests without a browser-looking identity
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const BILIBILI_WEB_ORIGIN: &str = "https://www.bilibili.com";

const REQUEST_TIMEOUT_SECONDS: u64 = 10;
const VIDEOS_PAGE_SIZE: u32 = 30;

/// Every Bilibili endpoint wraps its payload in this envelope;
/// code == 0 means success, anything else is a refusal.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    code: i64,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct CardData {
    card: CardInfo,
}

#[derive(Debug, Deserialize)]
struct CardInfo {
    mid: String,
    name: String,
    face: String,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    list: SearchList,
}

#[derive(Debug, Deserialize)]
struct SearchList {
    #[serde(default)]
    vlist: Vec<VlistEntry>,
}

#[derive(Debug, Deserialize)]
struct VlistEntry {
    aid: u64,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    pic: String,
}

/// A creator profile as reported by the card endpoint
#[derive(Debug, Clone)]
pub struct BilibiliProfile {
    pub mid: String,
    pub name: String,
    pub face: String,
}

/// One upload from the space search endpoint
#[derive(Debug, Clone)]
pub struct BilibiliVideo {
    pub aid: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
}

impl BilibiliVideo {
    /// Canonical watch URL for this upload
    pub fn url(&self) -> String {
        format!("{}/video/av{}", BILIBILI_WEB_ORIGIN, self.aid)
    }
}

#[derive(Debug, Clone)]
pub struct BilibiliClient {
    http: reqwest::Client,
    base_url: Arc<str>,
}

impl BilibiliClient {
    pub fn new(env: Arc<EnvironmentVariables>) -> Result<Self> {
        let mut headers: HeaderMap = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(REFERER, HeaderValue::from_static(BILIBILI_WEB_ORIGIN));
        headers.insert(ORIGIN, HeaderValue::from_static(BILIBILI_WEB_ORIGIN));

        let http: reqwest::Client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .build()
            .context("Failed to build Bilibili HTTP client")?;

        Ok(Self {
            http,
            base_url: Arc::from(env.bilibili_api_base.as_ref()),
        })
    }

    /// Fetches a creator's card (profile). Returns None when Bilibili
    /// answers with a non-zero code (unknown mid, rate limited, etc.).
    pub async fn get_user_info(&self, mid: &str) -> Result<Option<BilibiliProfile>> {
        let url: String = format!("{}/x/web-interface/card", self.base_url);

        let envelope: ApiEnvelope<CardData> = self.http
            .get(&url)
            .query(&[("mid", mid)])
            .send()
            .await
            .context("Bilibili card request failed")?
            .json()
            .await
            .context("Failed to decode Bilibili card response")?;

        if envelope.code != 0 {
            debug!("Bilibili card refused for mid {}: code {} ({})", mid, envelope.code, envelope.message);
            return Ok(None);
        }

        Ok(envelope.data.map(|d| BilibiliProfile {
            mid: d.card.mid,
            name: d.card.name,
            face: d.card.face,
        }))
    }

    /// Fetches a creator's most recent uploads, newest first.
    /// A non-zero code (e.g. a wbi-signature refusal) yields an empty list.
    pub async fn get_user_videos(&self, mid: &str) -> Result<Vec<BilibiliVideo>> {
        let url: String = format!("{}/x/space/wbi/arc/search", self.base_url);

        let envelope: ApiEnvelope<SearchData> = self.http
            .get(&url)
            .query(&[
                ("mid", mid),
                ("ps", &VIDEOS_PAGE_SIZE.to_string()),
                ("tid", "0"),
                ("pn", "1"),
                ("order", "pubdate"),
            ])
            .send()
            .await
            .context("Bilibili space search request failed")?
            .json()
            .await
            .context("Failed to decode Bilibili space search response")?;

        if envelope.code != 0 {
            debug!("Bilibili search refused for mid {}: code {} ({})", mid, envelope.code, envelope.message);
            return Ok(Vec::new());
        }

        let videos: Vec<BilibiliVideo> = envelope.data
            .map(|d| d.list.vlist)
            .unwrap_or_default()
            .into_iter()
            .map(|v| BilibiliVideo {
                aid: v.aid.to_string(),
                title: v.title,
                description: v.description,
                thumbnail: v.pic,
            })
            .collect();

        Ok(videos)
    }
}
