// Background sweep that keeps tracked creators' uploads in sync

use std::time::Duration;

use anyhow::Result;
use sqlx::Row;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::state::AppState;
use crate::crawler::bilibili::{BilibiliProfile, BilibiliVideo};
use crate::crawler::location::{extract_location, ExtractedLocation};

/// Spawns the periodic crawl task. The handle is aborted on shutdown.
pub fn spawn_crawl_scheduler(state: &'static AppState) -> JoinHandle<()> {
    let interval_seconds: u64 = state.environment.crawl_interval_seconds;

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_seconds));
        // Drop ticks we missed while a sweep was running
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            match run_crawl_sweep(state).await {
                Ok(crawled) => {
                    if crawled > 0 {
                        info!("Crawl sweep finished: {} creator(s) refreshed", crawled);
                    }
                }
                Err(e) => warn!("Crawl sweep failed: {}", e),
            }
        }
    })
}

/// Crawls every influencer with a Bilibili mid whose freshness marker has
/// expired. Returns how many were actually refreshed. A failure on one
/// creator is logged and does not abort the rest of the sweep.
pub async fn run_crawl_sweep(state: &AppState) -> Result<usize> {
    let pool: sqlx::PgPool = state.database.pool().await?;

    let rows: Vec<sqlx::postgres::PgRow> = sqlx::query(
        r#"
        SELECT id, bilibili_mid
        FROM influencers
        WHERE bilibili_mid IS NOT NULL
        ORDER BY created_at
        "#
    )
    .fetch_all(&pool)
    .await?;

    let mut crawled: usize = 0;

    for row in rows {
        let influencer_id: Uuid = row.get("id");
        let mid: String = row.get("bilibili_mid");

        // Skip creators crawled within the interval; a cache failure
        // only means we crawl once more than strictly needed
        let is_fresh: bool = state.redis.crawl_is_fresh(&mid).await.unwrap_or_else(|e| {
            warn!("Failed to check crawl freshness for mid {}: {}", mid, e);
            false
        });

        if is_fresh {
            debug!("Skipping mid {} (still fresh)", mid);
            continue;
        }

        match crawl_influencer(state, influencer_id, &mid).await {
            Ok(videos) => {
                crawled += 1;
                debug!("Refreshed influencer {} (mid {}): {} video(s)", influencer_id, mid, videos);

                if let Err(e) = state.redis.mark_crawled(&mid).await {
                    // Cache failures only cost us an extra crawl next sweep
                    warn!("Failed to mark mid {} as crawled: {}", mid, e);
                }
            }
            Err(e) => warn!("Failed to crawl influencer {} (mid {}): {}", influencer_id, mid, e),
        }
    }

    Ok(crawled)
}

/// Refreshes one creator: profile fields from the card endpoint, then an
/// upsert of their latest uploads with extracted locations.
pub async fn crawl_influencer(state: &AppState, influencer_id: Uuid, mid: &str) -> Result<usize> {
    let pool: sqlx::PgPool = state.database.pool().await?;

    // 1. Profile refresh (name and avatar follow the Bilibili card)
    let profile: Option<BilibiliProfile> = state.bilibili.get_user_info(mid).await?;

    if let Some(profile) = profile {
        sqlx::query(
            r#"
            UPDATE influencers
            SET name = $1, profile_picture = $2
            WHERE id = $3
            "#
        )
        .bind(&profile.name)
        .bind(&profile.face)
        .bind(influencer_id)
        .execute(&pool)
        .await?;
    }

    // 2. Upload sync
    let videos: Vec<BilibiliVideo> = state.bilibili.get_user_videos(mid).await?;
    let count: usize = videos.len();

    for video in videos {
        let location: Option<ExtractedLocation> = extract_location(&video.description);
        upsert_video(&pool, influencer_id, &video, location.as_ref()).await?;
    }

    Ok(count)
}

/// Inserts or refreshes one upload. The conflict key is
/// (influencer_id, source_aid), so re-crawling the same creator
/// updates existing rows instead of duplicating them.
pub async fn upsert_video(
    pool: &sqlx::PgPool,
    influencer_id: Uuid,
    video: &BilibiliVideo,
    location: Option<&ExtractedLocation>,
) -> Result<()> {
    let place_name: Option<&str> = location.map(|l| l.place_name.as_str());
    let longitude: Option<f64> = location.map(|l| l.longitude);
    let latitude: Option<f64> = location.map(|l| l.latitude);

    sqlx::query(
        r#"
        INSERT INTO videos (influencer_id, title, url, thumbnail, source_aid, place_name, longitude, latitude)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (influencer_id, source_aid) DO UPDATE
        SET title = EXCLUDED.title,
            url = EXCLUDED.url,
            thumbnail = EXCLUDED.thumbnail,
            place_name = EXCLUDED.place_name,
            longitude = EXCLUDED.longitude,
            latitude = EXCLUDED.latitude
        "#
    )
    .bind(influencer_id)
    .bind(&video.title)
    .bind(video.url())
    .bind(&video.thumbnail)
    .bind(&video.aid)
    .bind(place_name)
    .bind(longitude)
    .bind(latitude)
    .execute(pool)
    .await?;

    Ok(())
}
