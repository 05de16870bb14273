//! Search query construction from form input.
//!
//! A [`SearchQuery`] is always in exactly one of two time modes: "latest"
//! (the backend returns the most recent matching records) or an explicit,
//! possibly open-ended, range. The mode is carried by [`TimeWindow`], so a
//! query can never hold both or neither.

use serde::de::IgnoredAny;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::catalog::{Acronym, Channel, Satellite, Sector};
use crate::models::RetField;

/// Page size for interactive searches.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Catalog filters. Absent filters are left out of the request body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acronym: Option<Acronym>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satellite: Option<Satellite>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<Sector>,
}

/// Time mode of a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TimeWindow {
    /// Most recent records only. Sent as `"latest": null`.
    #[default]
    Latest,
    /// Explicit range; either bound may be open.
    Range {
        from: Option<String>,
        to: Option<String>,
    },
}

impl TimeWindow {
    /// Build a window from optional bounds. Two open bounds mean latest mode.
    pub fn from_bounds(from: Option<String>, to: Option<String>) -> Self {
        match (from, to) {
            (None, None) => TimeWindow::Latest,
            (from, to) => TimeWindow::Range { from, to },
        }
    }

    /// Build a window from raw text inputs, treating blank text as absent.
    pub fn from_inputs(from: &str, to: &str) -> Self {
        Self::from_bounds(non_blank(from), non_blank(to))
    }

    pub fn is_latest(&self) -> bool {
        matches!(self, TimeWindow::Latest)
    }
}

fn non_blank(input: &str) -> Option<String> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl Serialize for TimeWindow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TimeWindow::Latest => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("latest", &())?;
                map.end()
            }
            TimeWindow::Range { from, to } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("from", from)?;
                map.serialize_entry("to", to)?;
                map.end()
            }
        }
    }
}

/// Raw window keys. The outer `Option` records whether the key was present
/// at all, since `null` is a meaningful value for every one of them.
#[derive(Deserialize)]
struct WindowKeys {
    #[serde(default, deserialize_with = "present")]
    latest: Option<Option<IgnoredAny>>,
    #[serde(default, deserialize_with = "present")]
    from: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    to: Option<Option<String>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl<'de> Deserialize<'de> for TimeWindow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let keys = WindowKeys::deserialize(deserializer)?;
        let has_range = keys.from.is_some() || keys.to.is_some();
        match (keys.latest.is_some(), has_range) {
            (true, false) => Ok(TimeWindow::Latest),
            (false, true) => Ok(TimeWindow::from_bounds(
                keys.from.flatten(),
                keys.to.flatten(),
            )),
            (true, true) => Err(serde::de::Error::custom(
                "query has both 'latest' and a time range",
            )),
            (false, false) => Err(serde::de::Error::custom(
                "query has neither 'latest' nor a time range",
            )),
        }
    }
}

/// Current values of the search form.
///
/// Selections are already typed; `from` and `to` are the raw text inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub acronym: Option<Acronym>,
    pub channel: Option<Channel>,
    pub satellite: Option<Satellite>,
    pub sector: Option<Sector>,
    pub from: String,
    pub to: String,
}

impl FormState {
    /// Form with the given acronym and whatever channel the control allows.
    pub fn with_channel_control(mut self, control: &ChannelControl) -> Self {
        self.channel = control.value();
        self
    }
}

/// Query sent to `POST /search/img/multi`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    #[serde(flatten)]
    pub filters: Filters,
    #[serde(flatten)]
    pub window: TimeWindow,
    pub limit: u32,
    pub page: u32,
    pub rets: Vec<RetField>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self::interactive(DEFAULT_SEARCH_LIMIT)
    }
}

impl SearchQuery {
    /// Query for the search form: first page, path and datetime returned.
    pub fn interactive(limit: u32) -> Self {
        Self {
            filters: Filters::default(),
            window: TimeWindow::Latest,
            limit: limit.max(1),
            page: 0,
            rets: vec![RetField::Path, RetField::Datetime],
        }
    }

    /// Single most recent record matching `filters`.
    pub fn latest_single(filters: Filters) -> Self {
        Self {
            filters,
            ..Self::interactive(1)
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Refresh filters and time window from the form. Pagination and the
    /// returned fields are left alone.
    pub fn update(&mut self, form: &FormState) {
        self.filters = Filters {
            acronym: form.acronym,
            channel: form.channel,
            satellite: form.satellite,
            sector: form.sector,
        };
        self.window = TimeWindow::from_inputs(&form.from, &form.to);
    }
}

/// Whether the channel selector currently accepts input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChannelState {
    Enabled(Channel),
    #[default]
    Disabled,
}

/// Channel selector whose availability follows the acronym selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelControl {
    state: ChannelState,
}

impl ChannelControl {
    pub fn for_acronym(acronym: Option<Acronym>) -> Self {
        let mut control = Self::default();
        control.on_acronym_change(acronym);
        control
    }

    /// React to a new acronym selection. Channel-bearing acronyms enable the
    /// selector and reset it to the default channel; anything else disables
    /// and clears it.
    pub fn on_acronym_change(&mut self, acronym: Option<Acronym>) {
        self.state = match acronym {
            Some(acronym) if acronym.has_channel() => ChannelState::Enabled(Channel::DEFAULT),
            _ => ChannelState::Disabled,
        };
    }

    /// Pick a channel. Ignored (returns false) while disabled.
    pub fn select(&mut self, channel: Channel) -> bool {
        match self.state {
            ChannelState::Enabled(_) => {
                self.state = ChannelState::Enabled(channel);
                true
            }
            ChannelState::Disabled => false,
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.state, ChannelState::Enabled(_))
    }

    pub fn value(&self) -> Option<Channel> {
        match self.state {
            ChannelState::Enabled(channel) => Some(channel),
            ChannelState::Disabled => None,
        }
    }
}
