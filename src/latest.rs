//! Latest full-disk images panel.
//!
//! Two fixed queries run once when the panel loads: the newest full color
//! cloud-moisture image and the newest full-disk image of any product. Each
//! fills its own slot; a failed query leaves its slot as a placeholder.

use std::fmt::Display;

use chrono::{DateTime, Locale, NaiveDateTime, TimeZone, Utc};
use tracing::{info, warn};

use crate::catalog::{Acronym, Channel, Sector};
use crate::client::ImageSearch;
use crate::error::{Result, SiteError};
use crate::models::ImageRecord;
use crate::query::{Filters, SearchQuery};
use crate::render::AssetResolver;

/// Display format for slot timestamps: the locale's date and time, then
/// the zone.
pub const TIMESTAMP_FORMAT: &str = "%x %X %Z";

/// Locale for timestamp labels, from `LC_ALL`, `LC_TIME` or `LANG` in that
/// order. Unset or unknown values fall back to POSIX.
pub fn viewer_locale() -> Locale {
    locale_from_env(|key| std::env::var(key).ok())
}

fn locale_from_env(var: impl Fn(&str) -> Option<String>) -> Locale {
    ["LC_ALL", "LC_TIME", "LANG"]
        .iter()
        .filter_map(|key| var(key))
        .find(|value| !value.is_empty())
        .and_then(|value| parse_locale(&value))
        .unwrap_or(Locale::POSIX)
}

/// Parse a locale tag such as `de_DE.UTF-8`, `en-US` or `de_DE@euro`.
pub fn parse_locale(tag: &str) -> Option<Locale> {
    let name = tag.split(['.', '@']).next()?.replace('-', "_");
    Locale::try_from(name.as_str()).ok()
}

/// One image slot. `None` fields mean the slot still shows its placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatestSlot {
    pub image_src: Option<String>,
    pub updated_label: Option<String>,
}

impl LatestSlot {
    pub fn is_placeholder(&self) -> bool {
        self.image_src.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatestPanel {
    pub full_color: LatestSlot,
    pub full_disk: LatestSlot,
}

/// Newest full color cloud-moisture full-disk image.
pub fn full_color_query() -> SearchQuery {
    SearchQuery::latest_single(Filters {
        acronym: Some(Acronym::CloudMoistureImagery),
        channel: Some(Channel::FullColor),
        sector: Some(Sector::FullDisk),
        ..Default::default()
    })
}

/// Newest full-disk image of any product.
pub fn full_disk_query() -> SearchQuery {
    SearchQuery::latest_single(Filters {
        sector: Some(Sector::FullDisk),
        ..Default::default()
    })
}

impl LatestPanel {
    /// Run both panel queries concurrently and fill the slots. Timestamps are
    /// rendered in `tz` with `locale`'s date and time layout.
    pub async fn load<S, Tz>(backend: &S, assets: &AssetResolver, tz: &Tz, locale: Locale) -> Self
    where
        S: ImageSearch + ?Sized,
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let full_color = full_color_query();
        let full_disk = full_disk_query();
        let (full_color, full_disk) =
            tokio::join!(backend.search(&full_color), backend.search(&full_disk));

        Self {
            full_color: fill_slot("full color", full_color, assets, tz, locale),
            full_disk: fill_slot("full disk", full_disk, assets, tz, locale),
        }
    }
}

fn fill_slot<Tz>(
    name: &str,
    result: Result<Vec<ImageRecord>>,
    assets: &AssetResolver,
    tz: &Tz,
    locale: Locale,
) -> LatestSlot
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let records = match result {
        Ok(records) => records,
        Err(e) => {
            warn!("Failed to load latest {} image: {}", name, e);
            return LatestSlot::default();
        }
    };
    let Some(record) = records.into_iter().next() else {
        warn!("No latest {} image available", name);
        return LatestSlot::default();
    };

    let updated_label = match record.datetime.as_deref().map(|dt| format_timestamp(dt, tz, locale)) {
        Some(Ok(label)) => Some(label),
        Some(Err(e)) => {
            warn!("Latest {} image has a bad timestamp: {}", name, e);
            None
        }
        None => None,
    };

    info!("Latest {} image: {}", name, record.path);
    LatestSlot {
        image_src: Some(assets.resolve(&record.path)),
        updated_label,
    }
}

/// Parse an API timestamp. RFC 3339 is preferred; offset-less values are
/// taken as UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| SiteError::Timestamp(s.to_string()))
}

/// Human-readable rendering of an API timestamp in `tz` and `locale`.
pub fn format_timestamp<Tz>(s: &str, tz: &Tz, locale: Locale) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    Ok(parse_timestamp(s)?
        .with_timezone(tz)
        .format_localized(TIMESTAMP_FORMAT, locale)
        .to_string())
}
