use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use embedlink_core::fs_paths::{AppPaths, DesktopPaths};
use embedlink_lib::commands::resolve::{self, PreferenceOverrides};
use embedlink_lib::commands::settings;
use embedlink_lib::models::settings::PreferredQuality;
use embedlink_lib::storage::preferences::JsonPreferenceStore;
use embedlink_lib::AppState;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "embedlink", version, about = "Resolve streaming-site episode pages into playable links")]
struct Args {
    /// Directory holding settings.json and preferences.json
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug)]
struct PreferenceArgs {
    #[arg(long)]
    quality: Option<PreferredQuality>,
    #[arg(long)]
    server: Option<String>,
    #[arg(long)]
    language: Option<String>,
}

impl From<PreferenceArgs> for PreferenceOverrides {
    fn from(args: PreferenceArgs) -> Self {
        Self {
            quality: args.quality,
            server: args.server,
            language: args.language,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve an episode page into ranked streams
    Resolve {
        url: String,
        #[arg(long)]
        site: Option<String>,
        #[command(flatten)]
        preference: PreferenceArgs,
    },
    /// Decode a single embed page into language-grouped links
    Decode { url: String },
    /// Show which provider a URL is routed to
    Classify {
        url: String,
        #[arg(long)]
        site: Option<String>,
    },
    /// Inspect or change settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Inspect or store ranking preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    Show,
    Update { patch: String },
    Reset,
}

#[derive(Subcommand, Debug)]
enum PrefsAction {
    Show,
    Set {
        #[command(flatten)]
        preference: PreferenceArgs,
    },
}

struct ConfigPaths(Option<PathBuf>);

impl AppPaths for ConfigPaths {
    fn config_dir(&self) -> PathBuf {
        match &self.0 {
            Some(dir) => dir.clone(),
            None => DesktopPaths.config_dir(),
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(args: Args) -> anyhow::Result<()> {
    let paths = ConfigPaths(args.config);
    let settings_file = paths.settings_file();

    match args.command {
        Commands::Settings { action } => match action {
            SettingsAction::Show => print_json(&settings::get_settings(&settings_file)),
            SettingsAction::Update { patch } => {
                print_json(&settings::update_settings(&settings_file, &patch)?)
            }
            SettingsAction::Reset => print_json(&settings::reset_settings(&settings_file)?),
        },
        Commands::Prefs { action } => {
            let store = JsonPreferenceStore::open(&paths.preferences_file());
            match action {
                PrefsAction::Show => print_json(&settings::show_preferences(&store)),
                PrefsAction::Set { preference } => print_json(&settings::set_preferences(
                    &store,
                    &PreferenceOverrides::from(preference),
                )?),
            }
        }
        command => {
            let state = AppState::new(settings::get_settings(&settings_file))?;
            match command {
                Commands::Resolve {
                    url,
                    site,
                    preference,
                } => {
                    let store = JsonPreferenceStore::open(&paths.preferences_file());
                    let report = resolve::resolve_episode(
                        &state,
                        &store,
                        site.as_deref(),
                        &url,
                        &PreferenceOverrides::from(preference),
                    )
                    .await?;
                    print_json(&report)
                }
                Commands::Decode { url } => print_json(&resolve::decode_embed(&state, &url).await?),
                Commands::Classify { url, site } => {
                    print_json(&resolve::classify_url(&state, site.as_deref(), &url)?)
                }
                Commands::Settings { .. } | Commands::Prefs { .. } => Ok(()),
            }
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args).await {
        tracing::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefs_set_takes_preference_flags() {
        let args = Args::try_parse_from(["embedlink", "prefs", "set", "--quality", "480p"]).unwrap();
        match args.command {
            Commands::Prefs {
                action: PrefsAction::Set { preference },
            } => {
                assert_eq!(preference.quality, Some(PreferredQuality::P480));
                assert_eq!(preference.server, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert!(Args::try_parse_from(["embedlink", "prefs", "--quality", "480"]).is_err());
    }
}
