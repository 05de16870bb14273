//! Command-line interface: the search form, copy button and latest panel as
//! subcommands.

use anyhow::Result;
use chrono::Local;
use clap::{Args, Parser, Subcommand, ValueEnum};
use console::style;
use tracing::warn;

use crate::catalog::{parse_optional, Acronym, Channel, Satellite, Sector};
use crate::client::{ImageSearch, SearchClient};
use crate::clipboard::{
    copy_with_fallback, Clipboard, CommandClipboard, ConsoleNotifier, CopyOutcome,
    StagedFileClipboard, TerminalClipboard,
};
use crate::config::Settings;
use crate::latest::{viewer_locale, LatestPanel, LatestSlot};
use crate::query::{ChannelControl, FormState, SearchQuery};
use crate::render::{pair_records, AssetResolver, GalleryItem};
use crate::session::{SearchSession, SubmitOutcome};
use crate::share::{build_share_link, ShareQuery};
use crate::templates;

#[derive(Debug, Parser)]
#[command(name = "goes-browse", version, about = "Browse and share GOES satellite imagery")]
pub struct Cli {
    /// Site origin (API routes and share links are built under it)
    #[arg(long, global = true, env = "GOES_SITE_URL")]
    pub base_url: Option<String>,

    /// Prefix for relative image paths
    #[arg(long, global = true, env = "GOES_ASSET_ROOT")]
    pub asset_root: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the most recent full-disk images
    Latest {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Search the image catalog
    Search {
        #[command(flatten)]
        filters: FilterArgs,
        /// Results per page (defaults to the configured search limit)
        #[arg(long)]
        limit: Option<u32>,
        /// Zero-based page
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print a shareable link for a query
    Share {
        #[command(flatten)]
        filters: FilterArgs,
        /// Also copy the link to the clipboard
        #[arg(long)]
        copy: bool,
    },
    /// Replay a shared link as a search
    Open {
        /// Full share link or its base64 segment
        link: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the site navigation fragment
    Nav,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per gallery row
    Text,
    /// Gallery fragment only
    Html,
    /// Standalone page with navigation
    Page,
}

/// Search form fields.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Product acronym, e.g. CLOUD_MOISTURE_IMAGERY or L1b
    #[arg(long)]
    pub acronym: Option<String>,
    /// Channel; only used with L1b, CLOUD_MOISTURE_IMAGERY and DERIVED_MOTION_WIND
    #[arg(long)]
    pub channel: Option<String>,
    /// Satellite, e.g. GOES16
    #[arg(long)]
    pub satellite: Option<String>,
    /// Sector, e.g. FULL_DISK
    #[arg(long)]
    pub sector: Option<String>,
    /// Start of the time range (omit both ends for the latest images)
    #[arg(long)]
    pub from: Option<String>,
    /// End of the time range
    #[arg(long)]
    pub to: Option<String>,
}

impl FilterArgs {
    /// Build the form state the way the search page would: the channel is
    /// only kept when the acronym enables the channel selector.
    pub fn to_form(&self) -> crate::Result<FormState> {
        let acronym = parse_optional::<Acronym>(self.acronym.as_deref().unwrap_or(""))?;
        let mut control = ChannelControl::for_acronym(acronym);

        if let Some(channel) = parse_optional::<Channel>(self.channel.as_deref().unwrap_or(""))? {
            if !control.select(channel) {
                warn!(
                    "Ignoring channel {}: acronym {} has no channels",
                    channel,
                    acronym.map(|a| a.as_str()).unwrap_or("(none)")
                );
            }
        }

        Ok(FormState {
            acronym,
            satellite: parse_optional::<Satellite>(self.satellite.as_deref().unwrap_or(""))?,
            sector: parse_optional::<Sector>(self.sector.as_deref().unwrap_or(""))?,
            from: self.from.clone().unwrap_or_default(),
            to: self.to.clone().unwrap_or_default(),
            ..Default::default()
        }
        .with_channel_control(&control))
    }
}

impl Cli {
    /// Command-line flags win over config files.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref base_url) = self.base_url {
            settings.base_url = base_url.clone();
        }
        if let Some(ref asset_root) = self.asset_root {
            settings.asset_root = asset_root.clone();
        }
        if let Some(timeout) = self.timeout {
            settings.request_timeout = timeout;
        }
    }
}

/// Run the parsed command.
pub async fn run(cli: Cli, settings: &Settings) -> Result<()> {
    let client = SearchClient::from_settings(settings)?;
    let assets = AssetResolver::new(settings.asset_root.clone());

    match cli.command {
        Commands::Latest { format } => cmd_latest(&client, &assets, format).await,
        Commands::Search {
            filters,
            limit,
            page,
            format,
        } => {
            let mut query = SearchQuery::interactive(limit.unwrap_or(settings.search_limit))
                .with_page(page);
            query.update(&filters.to_form()?);
            cmd_search(&client, &assets, query, format).await
        }
        Commands::Share { filters, copy } => cmd_share(&client, &filters, copy),
        Commands::Open { link, format } => {
            let query = ShareQuery::decode(&link)?.into_search(settings.search_limit);
            cmd_search(&client, &assets, query, format).await
        }
        Commands::Nav => {
            println!("{}", client.nav_fragment().await?);
            Ok(())
        }
    }
}

async fn cmd_latest(client: &SearchClient, assets: &AssetResolver, format: OutputFormat) -> Result<()> {
    let panel = LatestPanel::load(client, assets, &Local, viewer_locale()).await;
    let slots = [
        ("Full disk, full color", &panel.full_color),
        ("Full disk", &panel.full_disk),
    ];

    match format {
        OutputFormat::Text => {
            for (caption, slot) in slots {
                print_slot(caption, slot);
            }
        }
        OutputFormat::Html => println!("{}", templates::latest_panel(&slots)),
        OutputFormat::Page => {
            let nav = load_nav(client).await;
            println!(
                "{}",
                templates::base_template("Latest", nav.as_deref(), &templates::latest_panel(&slots))
            );
        }
    }
    Ok(())
}

fn print_slot(caption: &str, slot: &LatestSlot) {
    match &slot.image_src {
        Some(src) => println!(
            "{:<22} {}  {}",
            style(caption).bold(),
            src,
            style(slot.updated_label.as_deref().unwrap_or("")).dim()
        ),
        None => println!("{:<22} {}", style(caption).bold(), style("unavailable").red()),
    }
}

async fn cmd_search(
    client: &SearchClient,
    assets: &AssetResolver,
    query: SearchQuery,
    format: OutputFormat,
) -> Result<()> {
    if format == OutputFormat::Text {
        let records = client.search(&query).await?;
        if records.is_empty() {
            println!("{}", style("No images found").yellow());
        }
        for item in pair_records(&records) {
            match item {
                GalleryItem::Row(left, right) => {
                    println!("{}  {}", assets.resolve(&left.path), assets.resolve(&right.path))
                }
                GalleryItem::Single(record) => println!("{}", assets.resolve(&record.path)),
            }
        }
        return Ok(());
    }

    let share_link = build_share_link(client.origin(), &query)?;
    let session = SearchSession::new(query, assets.clone());
    // The query is already built; an empty form would reset it.
    if let SubmitOutcome::Applied { records, .. } = session.submit_current(client).await? {
        tracing::info!("Rendered {} images", records);
    }
    let section = templates::search_results(&session.results_html().await, Some(&share_link));

    match format {
        OutputFormat::Page => {
            let nav = load_nav(client).await;
            println!("{}", templates::base_template("Search", nav.as_deref(), &section));
        }
        _ => println!("{}", section),
    }
    Ok(())
}

fn cmd_share(client: &SearchClient, filters: &FilterArgs, copy: bool) -> Result<()> {
    let mut query = SearchQuery::default();
    query.update(&filters.to_form()?);
    let link = build_share_link(client.origin(), &query)?;
    println!("{}", link);

    if copy {
        let (command, staged, terminal) = (
            CommandClipboard::detect(),
            StagedFileClipboard::detect(),
            TerminalClipboard::stderr(),
        );
        let strategies: [&dyn Clipboard; 3] = [&command, &staged, &terminal];
        let outcome = copy_with_fallback(&link, &strategies, &ConsoleNotifier);
        if let CopyOutcome::Copied { via } = outcome {
            eprintln!("{} (via {})", style("Copied to clipboard").green(), via);
        }
    }
    Ok(())
}

/// Nav fragment, or `None` if it could not be fetched.
async fn load_nav(client: &SearchClient) -> Option<String> {
    match client.nav_fragment().await {
        Ok(nav) => Some(nav),
        Err(e) => {
            warn!("Failed to load navigation: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_search() {
        let cli = Cli::try_parse_from([
            "goes-browse",
            "--base-url",
            "https://goes.example.com",
            "search",
            "--acronym",
            "CLOUD_MOISTURE_IMAGERY",
            "--sector",
            "FULL_DISK",
            "--page",
            "2",
            "--format",
            "html",
        ])
        .unwrap();

        assert_eq!(cli.base_url.as_deref(), Some("https://goes.example.com"));
        match cli.command {
            Commands::Search {
                filters,
                page,
                format,
                limit,
            } => {
                assert_eq!(filters.acronym.as_deref(), Some("CLOUD_MOISTURE_IMAGERY"));
                assert_eq!(page, 2);
                assert_eq!(format, OutputFormat::Html);
                assert_eq!(limit, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_filter_args_default_channel() {
        let filters = FilterArgs {
            acronym: Some("L1b".to_string()),
            ..Default::default()
        };
        let form = filters.to_form().unwrap();
        assert_eq!(form.acronym, Some(Acronym::L1b));
        assert_eq!(form.channel, Some(Channel::FullColorLines));
    }

    #[test]
    fn test_filter_args_explicit_channel() {
        let filters = FilterArgs {
            acronym: Some("CLOUD_MOISTURE_IMAGERY".to_string()),
            channel: Some("FULL_COLOR".to_string()),
            from: Some("2023-01-01T00:00:00Z".to_string()),
            ..Default::default()
        };
        let form = filters.to_form().unwrap();
        assert_eq!(form.channel, Some(Channel::FullColor));
        assert_eq!(form.from, "2023-01-01T00:00:00Z");
        assert_eq!(form.to, "");
    }

    #[test]
    fn test_filter_args_drop_channel_without_channel_acronym() {
        let filters = FilterArgs {
            acronym: Some("SNOW_COVER".to_string()),
            channel: Some("RED".to_string()),
            ..Default::default()
        };
        assert_eq!(filters.to_form().unwrap().channel, None);
    }

    #[test]
    fn test_filter_args_reject_unknown() {
        let filters = FilterArgs {
            sector: Some("ATLANTIS".to_string()),
            ..Default::default()
        };
        assert!(filters.to_form().is_err());
    }

    #[test]
    fn test_cli_overrides_settings() {
        let cli = Cli::try_parse_from(["goes-browse", "--asset-root", "/img", "--timeout", "3", "nav"]).unwrap();
        let mut settings = Settings::default();
        cli.apply_to_settings(&mut settings);
        assert_eq!(settings.asset_root, "/img");
        assert_eq!(settings.request_timeout, 3);
        assert_eq!(settings.base_url, "http://localhost:8000");
    }
}
