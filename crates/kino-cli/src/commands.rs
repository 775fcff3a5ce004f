//! Subcommands and their handlers.

use anyhow::{Context, Result, bail};
use tracing::info;

use kino_api::account::{AccountRows, RowCollection};
use kino_api::markers::MarkerTarget;
use kino_api::{ApiClient, RevokeOutcome};
use kino_timeline::MarkerEditor;
use kino_timeline::batch::BatchSelection;
use kino_timeline::layout::{legend, render_ascii};
use kino_timeline::timecode::{format_timecode, parse_timecode};
use kino_types::{MarkerKind, SceneMarkers, TitleKind};

use crate::prompt;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Manage the title catalogue
    Titles {
        #[command(subcommand)]
        command: TitleCommands,
    },
    /// Inspect and edit scene markers
    Markers {
        #[command(subcommand)]
        command: MarkerCommands,
    },
    /// Manage trusted devices
    Devices {
        #[command(subcommand)]
        command: DeviceCommands,
    },
    /// Manage active login sessions
    Sessions {
        #[command(subcommand)]
        command: RowCommands,
    },
    /// Watch progress ("continue watching")
    Progress {
        #[command(subcommand)]
        command: ProgressCommands,
    },
}

#[derive(clap::Subcommand)]
pub enum TitleCommands {
    /// List titles
    List,
    /// Delete one or more titles in a single request
    Delete {
        #[arg(required = true, value_name = "ID")]
        ids: Vec<String>,
    },
}

/// A movie, or one episode of a series.
#[derive(clap::Args, Debug, Clone)]
pub struct TargetArgs {
    /// Title id
    title: String,

    /// Episode id (series only)
    #[arg(long, value_name = "ID")]
    episode: Option<String>,
}

impl From<&TargetArgs> for MarkerTarget {
    fn from(args: &TargetArgs) -> Self {
        match &args.episode {
            Some(episode) => MarkerTarget::episode(&args.title, episode),
            None => MarkerTarget::title(&args.title),
        }
    }
}

#[derive(clap::Subcommand)]
pub enum MarkerCommands {
    /// Print the marker layers and legend
    Show {
        #[command(flatten)]
        target: TargetArgs,

        /// Media duration (e.g. 45:10); defaults to the last marker end
        #[arg(long, value_parser = parse_seconds)]
        duration: Option<f64>,

        /// Width of the rendered strip in characters
        #[arg(long, default_value_t = 60)]
        width: usize,
    },
    /// Set one marker range
    Set {
        #[command(flatten)]
        target: TargetArgs,

        /// intro, recap, opening, ending, preview or credits
        kind: MarkerKind,

        #[arg(value_parser = parse_seconds)]
        start: f64,

        #[arg(value_parser = parse_seconds)]
        end: f64,

        /// Reject ranges ending past this duration
        #[arg(long, value_parser = parse_seconds)]
        duration: Option<f64>,
    },
    /// Remove one marker
    Clear {
        #[command(flatten)]
        target: TargetArgs,

        kind: MarkerKind,
    },
    /// Run server-side detection
    Detect {
        #[command(flatten)]
        target: TargetArgs,

        /// Merge the detected ranges into the stored markers and save
        #[arg(long)]
        apply: bool,
    },
    /// Copy one episode's markers onto other episodes
    Batch {
        /// Series title id
        title: String,

        /// Episode whose markers are copied
        #[arg(long, value_name = "ID")]
        from: String,

        /// Target every episode of the series
        #[arg(long, conflicts_with = "episodes", required_unless_present = "episodes")]
        all: bool,

        /// Comma-separated episode numbers
        #[arg(long, value_delimiter = ',', value_name = "N,N,..")]
        episodes: Vec<u32>,
    },
}

#[derive(clap::Subcommand)]
pub enum RowCommands {
    /// List rows, marking the current one
    List,
    /// Revoke one row by id
    Revoke { id: String },
    /// Revoke everything except the current row
    RevokeOthers,
    /// Revoke everything, including the current row
    RevokeAll,
}

#[derive(clap::Subcommand)]
pub enum DeviceCommands {
    /// Trust this device
    Register { label: String },
    #[command(flatten)]
    Rows(RowCommands),
}

#[derive(clap::Subcommand)]
pub enum ProgressCommands {
    /// Unfinished titles, most recent first
    List,
    /// Drop a title from "continue watching"
    Clear { title: String },
}

fn parse_seconds(text: &str) -> Result<f64, String> {
    parse_timecode(text).map_err(|e| e.to_string())
}

pub async fn dispatch(client: &ApiClient, command: Commands) -> Result<()> {
    match command {
        Commands::Titles { command } => titles(client, command).await,
        Commands::Markers { command } => markers(client, command).await,
        Commands::Devices {
            command: DeviceCommands::Register { label },
        } => {
            let device = client
                .devices()
                .register(&label, &|| prompt::confirm_password(client))
                .await?;
            println!("Trusted {} ({})", device.display_name(), device.id);
            Ok(())
        }
        Commands::Devices {
            command: DeviceCommands::Rows(command),
        } => rows(client, client.devices(), command).await,
        Commands::Sessions { command } => rows(client, client.sessions(), command).await,
        Commands::Progress { command } => progress(client, command).await,
    }
}

// -- Titles --

async fn titles(client: &ApiClient, command: TitleCommands) -> Result<()> {
    match command {
        TitleCommands::List => {
            let page = client.titles().list().await?;
            for title in &page.items {
                let episodes = title
                    .total_episodes
                    .map(|n| format!("{n} episodes"))
                    .unwrap_or_default();
                let kind = match title.kind {
                    TitleKind::Movie => "movie",
                    TitleKind::Series => "series",
                };
                println!("{:<24} {:<7} {:<32} {}", title.id, kind, title.name, episodes);
            }
            println!("{} of {} titles", page.items.len(), page.total);
        }
        TitleCommands::Delete { ids } => {
            let resp = client.titles().bulk_delete(&ids).await?;
            println!("Deleted {} of {} titles", resp.deleted, ids.len());
        }
    }
    Ok(())
}

// -- Scene markers --

async fn markers(client: &ApiClient, command: MarkerCommands) -> Result<()> {
    match command {
        MarkerCommands::Show {
            target,
            duration,
            width,
        } => {
            let markers = client.markers().load(&MarkerTarget::from(&target)).await?;
            print_markers(&markers, duration, width);
        }
        MarkerCommands::Set {
            target,
            kind,
            start,
            end,
            duration,
        } => {
            let target = MarkerTarget::from(&target);
            let stored = client.markers().load(&target).await?;
            let mut editor = MarkerEditor::load(stored, duration.unwrap_or(0.0));
            editor.set_range(kind, start, end)?;
            save(client, &target, &mut editor).await?;
            println!(
                "{}: {} - {}",
                kind.label(),
                format_timecode(start),
                format_timecode(end)
            );
        }
        MarkerCommands::Clear { target, kind } => {
            let target = MarkerTarget::from(&target);
            let stored = client.markers().load(&target).await?;
            let mut editor = MarkerEditor::load(stored, 0.0);
            editor.clear(kind);
            if !editor.is_dirty() {
                println!("No {} marker set", kind.label());
                return Ok(());
            }
            save(client, &target, &mut editor).await?;
            println!("Cleared {}", kind.label());
        }
        MarkerCommands::Detect { target, apply } => {
            let target = MarkerTarget::from(&target);
            let detected = client.markers().detect(&target).await?;
            if detected.is_empty() {
                println!("Nothing detected");
                return Ok(());
            }
            print_legend(&detected);
            if apply {
                let stored = client.markers().load(&target).await?;
                let mut editor = MarkerEditor::load(stored, 0.0);
                editor.apply_detected(&detected);
                save(client, &target, &mut editor).await?;
                println!("Saved");
            }
        }
        MarkerCommands::Batch {
            title,
            from,
            all,
            episodes,
        } => {
            let series = client.titles().get(&title).await?;
            let total = series
                .total_episodes
                .with_context(|| format!("{} has no episodes", series.name))?;
            let source = client
                .markers()
                .load(&MarkerTarget::episode(&title, &from))
                .await?;
            if source.is_empty() {
                bail!("episode {from} has no markers to copy");
            }

            let selection = if all {
                BatchSelection::all()
            } else {
                BatchSelection::episodes(episodes)
            };
            let request = selection.build_request(&source, total)?;
            let resp = client.markers().batch_apply(&title, &request).await?;
            println!("Updated {} episodes", resp.updated);
        }
    }
    Ok(())
}

async fn save(client: &ApiClient, target: &MarkerTarget, editor: &mut MarkerEditor) -> Result<()> {
    editor
        .save_with(|markers| async move { client.markers().save(target, &markers).await })
        .await?;
    Ok(())
}

fn print_markers(markers: &SceneMarkers, duration: Option<f64>, width: usize) {
    if markers.is_empty() {
        println!("No scene markers");
        return;
    }
    let duration = duration.unwrap_or_else(|| {
        markers
            .iter()
            .map(|(_, range)| range.end())
            .fold(0.0, f64::max)
    });
    for row in render_ascii(markers, duration, width) {
        println!("{row}");
    }
    let end = format_timecode(duration);
    println!("{:<8}  0:00{:>pad$}", "", end, pad = width.saturating_sub(4));
    println!();
    print_legend(markers);
}

fn print_legend(markers: &SceneMarkers) {
    for (_, label, range) in legend(markers) {
        println!(
            "  {:<10} {} - {}",
            label,
            format_timecode(range.start()),
            format_timecode(range.end())
        );
    }
}

// -- Devices and sessions --

async fn rows<K: RowCollection>(
    client: &ApiClient,
    rows: AccountRows<'_, K>,
    command: RowCommands,
) -> Result<()> {
    let prompt = || prompt::confirm_password(client);
    let outcome = match command {
        RowCommands::List => {
            for row in rows.list().await? {
                let marker = if row.is_current { "*" } else { " " };
                let last_used = row
                    .last_used_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".into());
                println!(
                    "{marker} {:<36} {:<32} {:<15} {}",
                    row.id,
                    row.display_name(),
                    row.ip.as_deref().unwrap_or("-"),
                    last_used
                );
            }
            return Ok(());
        }
        RowCommands::Revoke { id } => {
            let listed = rows.list().await?;
            let row = listed
                .iter()
                .find(|row| row.id == id)
                .with_context(|| format!("no {} entry with id {id}", K::NAME))?;
            rows.revoke(row, &prompt).await?
        }
        RowCommands::RevokeOthers => {
            let listed = rows.list().await?;
            rows.revoke_others(&listed, &prompt).await?
        }
        RowCommands::RevokeAll => {
            let listed = rows.list().await?;
            rows.revoke_all(&listed, &prompt).await?
        }
    };

    match outcome {
        RevokeOutcome::Nothing => println!("Nothing to revoke"),
        RevokeOutcome::Revoked(count) => println!("Revoked {count} {}", K::NAME),
        RevokeOutcome::SignedOut => {
            info!("current {} entry revoked", K::NAME);
            println!("Revoked the current session. Sign in again to continue.");
        }
    }
    Ok(())
}

// -- Progress --

async fn progress(client: &ApiClient, command: ProgressCommands) -> Result<()> {
    match command {
        ProgressCommands::List => {
            let rows = client.progress().continue_watching().await?;
            if rows.is_empty() {
                println!("Nothing in progress");
            }
            for row in rows {
                println!(
                    "{:<24} {:<10} {} / {} ({:.0}%)",
                    row.title_id,
                    row.episode_id.as_deref().unwrap_or("-"),
                    format_timecode(row.position_seconds),
                    format_timecode(row.duration_seconds),
                    row.fraction() * 100.0
                );
            }
        }
        ProgressCommands::Clear { title } => {
            client.progress().clear(&title).await?;
            println!("Removed {title} from continue watching");
        }
    }
    Ok(())
}
