//! SMER CLI
//!
//! Command-line interface for the journal API:
//! - List, show and delete entries
//! - Compose new entries and edit existing ones
//! - Sign in, sign up and manage passwords
//! - View and edit the profile

use anyhow::{bail, ensure, Context};
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use smer::account::avatar_mime_for_path;
use smer::config::generate_default_config;
use smer::{
    ApiClient, AuthClient, CollectionController, CollectionError, Config, Credentials, Entry,
    EntryComposer, EntryId, EntryTransport, HttpEntryTransport, ItemStep, ListQuery, NewUser,
    Notifier, Page, Pagination, ProfileClient, Session, SessionHandle, SortSpec, Step,
};

#[derive(Parser)]
#[command(name = "smer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Journal of situations, thoughts, emotions and reactions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL (overrides the config file and SMER_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Access token from `smer signin`
    #[arg(long, env = "SMER_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Config file (default: search the standard locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List entries
    List {
        /// Page number (starts at 1)
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        /// Entries per page (default: from config)
        #[arg(short, long)]
        limit: Option<u32>,
        /// Sort order, repeatable: "column", "column:desc" or "-column"
        #[arg(short, long, allow_hyphen_values = true)]
        sort: Vec<SortSpec>,
        /// Column filter in column=text format, repeatable
        #[arg(short = 'F', long = "filter")]
        filters: Vec<String>,
    },

    /// Show one entry
    Show { id: EntryId },

    /// Compose a new entry
    New {
        /// What happened
        #[arg(long)]
        situation: String,
        /// Automatic thought, repeatable
        #[arg(short, long = "thought")]
        thoughts: Vec<String>,
        /// Emotion, repeatable
        #[arg(short, long = "emotion")]
        emotions: Vec<String>,
        /// Reaction, repeatable
        #[arg(short, long = "reaction")]
        reactions: Vec<String>,
    },

    /// Edit an existing entry
    Edit {
        id: EntryId,
        /// New situation text
        #[arg(long)]
        situation: Option<String>,
        #[arg(short, long = "thought")]
        thoughts: Vec<String>,
        #[arg(short, long = "emotion")]
        emotions: Vec<String>,
        #[arg(short, long = "reaction")]
        reactions: Vec<String>,
        /// Replace the items of every step given instead of appending
        #[arg(long)]
        replace: bool,
    },

    /// Delete an entry
    Delete { id: EntryId },

    /// Sign in and print the session tokens
    Signin {
        email: String,
        #[arg(long, env = "SMER_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Exchange a refresh token for a new token pair
    Refresh { refresh_token: String },

    /// Show who the token belongs to
    Whoami,

    /// Create an account
    Signup {
        email: String,
        #[arg(long, env = "SMER_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value = "")]
        username: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        surname: String,
    },

    /// Mail a password reset link
    ResetPassword { email: String },

    /// Set a new password with the hash from a reset link
    ChangePassword {
        hash: String,
        #[arg(long, env = "SMER_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Profile of the signed-in user
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommand {
    Show,
    Update {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        surname: Option<String>,
        #[arg(long)]
        patronymic: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Upload an image file as the avatar
    Avatar { path: PathBuf },
    /// Delete the account
    Delete {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

/// Prints successes for the user; failures surface as the command's error
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn success(&self, message: &str) {
        println!("{}", message);
    }

    fn error(&self, message: &str) {
        tracing::debug!(notification = "error", "{}", message);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    smer::logging::init(&config.logging)?;

    let session = SessionHandle::new();
    if let Some(token) = &cli.token {
        session.begin(Session::from_access_token(token.clone()));
    }
    let client = ApiClient::new(&config.api, session.clone())?;
    let transport = Arc::new(HttpEntryTransport::new(client.clone()));
    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);

    match cli.command {
        Commands::List {
            page,
            limit,
            sort,
            filters,
        } => {
            let limit = limit.unwrap_or(config.collection.page_size);
            ensure!(limit > 0, "--limit must be greater than zero");

            let mut query = ListQuery::new(Pagination { page: page.max(1), limit }).sorted_by(
                if sort.is_empty() {
                    config.collection.sort.clone()
                } else {
                    sort
                },
            );
            for (column, text) in parse_filters(&filters)? {
                query.set_filter(column, text);
            }

            let entries = CollectionController::with_query(transport, notifier, query);
            entries.refetch().await?;
            let listing = entries
                .page()
                .unwrap_or_else(|| Page::empty(page.max(1), limit));

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listing)?),
                OutputFormat::Csv => print_csv(&listing.data)?,
                OutputFormat::Table => print_table(&listing),
            }
        }

        Commands::Show { id } => {
            let entry = transport.view(id).await?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entry)?),
                OutputFormat::Csv => print_csv(std::slice::from_ref(&entry))?,
                OutputFormat::Table => print_entry(&entry),
            }
        }

        Commands::New {
            situation,
            thoughts,
            emotions,
            reactions,
        } => {
            let composer = EntryComposer::new(transport, notifier);
            composer.set_situation(situation);
            fill_steps(&composer, &thoughts, &emotions, &reactions, false);
            ensure_complete(&composer)?;
            composer.save().await?;
        }

        Commands::Edit {
            id,
            situation,
            thoughts,
            emotions,
            reactions,
            replace,
        } => {
            let composer = EntryComposer::new(transport, notifier);
            composer.load(id).await?;
            if let Some(situation) = situation {
                composer.set_situation(situation);
            }
            fill_steps(&composer, &thoughts, &emotions, &reactions, replace);
            ensure_complete(&composer)?;
            composer.save().await?;
        }

        Commands::Delete { id } => {
            let entries = CollectionController::new(transport, notifier, &config.collection);
            match entries.remove(id).await {
                Ok(()) => {}
                Err(CollectionError::Refresh(e)) => {
                    tracing::warn!(entry_id = id, error = %e, "entry deleted, list refresh failed");
                }
                Err(e) => return Err(e.into()),
            }
            println!("Deleted entry {}", id);
        }

        Commands::Signin { email, password } => {
            let auth = AuthClient::new(client);
            let session = auth.signin(&Credentials { email, password }).await?;
            print_session(&session, cli.format)?;
        }

        Commands::Refresh { refresh_token } => {
            session.begin(Session::new(cli.token.unwrap_or_default(), refresh_token));
            let auth = AuthClient::new(client);
            let session = auth.refresh().await?;
            print_session(&session, cli.format)?;
        }

        Commands::Whoami => {
            let info = AuthClient::new(client).info().await?;
            match cli.format {
                OutputFormat::Table => println!("{} <{}> (id {})", info.username, info.email, info.id),
                _ => println!(
                    "{}",
                    serde_json::json!({ "id": info.id, "email": info.email, "username": info.username })
                ),
            }
        }

        Commands::Signup {
            email,
            password,
            username,
            name,
            surname,
        } => {
            let auth = AuthClient::new(client);
            let id = auth
                .signup(&NewUser {
                    email,
                    password,
                    username,
                    name,
                    surname,
                })
                .await?;
            println!("Account {} created. Check your mail to activate it.", id);
        }

        Commands::ResetPassword { email } => {
            AuthClient::new(client).request_password_reset(&email).await?;
            println!("If {} is registered, a reset link is on its way.", email);
        }

        Commands::ChangePassword { hash, password } => {
            AuthClient::new(client).change_password(&hash, &password).await?;
            println!("Password changed.");
        }

        Commands::Profile { command } => {
            let profiles = ProfileClient::new(client);
            match command {
                ProfileCommand::Show => {
                    let user = profiles.view().await?;
                    match cli.format {
                        OutputFormat::Table => {
                            println!("Username:   {}", user.username);
                            println!("Email:      {}", user.email);
                            println!("Name:       {} {} {}", user.name, user.patronymic, user.surname);
                            println!("Avatar:     {}", if user.avatar.is_some() { "set" } else { "-" });
                        }
                        _ => println!("{}", serde_json::to_string_pretty(&user)?),
                    }
                }
                ProfileCommand::Update {
                    username,
                    name,
                    surname,
                    patronymic,
                    email,
                } => {
                    let mut user = profiles.view().await?;
                    let fields = [
                        (&mut user.username, username),
                        (&mut user.name, name),
                        (&mut user.surname, surname),
                        (&mut user.patronymic, patronymic),
                        (&mut user.email, email),
                    ];
                    for (field, value) in fields {
                        if let Some(value) = value {
                            *field = value;
                        }
                    }
                    profiles.update(&user).await?;
                    println!("Profile updated.");
                }
                ProfileCommand::Avatar { path } => {
                    let mime = avatar_mime_for_path(&path)
                        .with_context(|| format!("Unsupported image type: {:?}", path))?;
                    let bytes = std::fs::read(&path)
                        .with_context(|| format!("Failed to read {:?}", path))?;
                    profiles.upload_avatar(&bytes, mime).await?;
                    println!("Avatar updated.");
                }
                ProfileCommand::Delete { yes } => {
                    if !yes {
                        bail!("Refusing to delete the account without --yes");
                    }
                    profiles.remove().await?;
                    session.clear();
                    println!("Account deleted.");
                }
            }
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn parse_filters(filters: &[String]) -> anyhow::Result<BTreeMap<String, String>> {
    filters
        .iter()
        .map(|f| match f.split_once('=') {
            Some((column, text)) if !column.trim().is_empty() => {
                Ok((column.trim().to_string(), text.to_string()))
            }
            _ => bail!("Invalid filter {:?}. Use: column=text", f),
        })
        .collect()
}

/// Walk the wizard through the item steps, adding the given items
///
/// With `replace`, existing items of a step are removed before adding when
/// new items for that step were given.
fn fill_steps<T: EntryTransport + ?Sized>(
    composer: &EntryComposer<T>,
    thoughts: &[String],
    emotions: &[String],
    reactions: &[String],
    replace: bool,
) {
    let steps = [
        (ItemStep::Thoughts, thoughts),
        (ItemStep::Emotions, emotions),
        (ItemStep::Reactions, reactions),
    ];
    for (step, items) in steps {
        composer.jump_to(Step::from(step));
        if replace && !items.is_empty() {
            let existing: Vec<_> = composer.entry().items(step).iter().map(|i| i.id).collect();
            for id in existing {
                composer.remove_item(step, id);
            }
        }
        for text in items {
            composer.add_item(step, text.clone());
        }
    }
}

fn ensure_complete<T: EntryTransport + ?Sized>(composer: &EntryComposer<T>) -> anyhow::Result<()> {
    if composer.can_save() {
        return Ok(());
    }
    let entry = composer.entry();
    if entry.situation().is_empty() {
        bail!("The situation must not be empty");
    }
    let missing: Vec<String> = ItemStep::all()
        .iter()
        .filter(|step| entry.items(**step).is_empty())
        .map(|step| Step::from(*step).to_string())
        .collect();
    bail!("Add at least one item for: {}", missing.join(", "))
}

fn print_session(session: &Session, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => {
            println!("Signed in. Export the token to use it:");
            println!("  export SMER_TOKEN={}", session.token);
            if !session.refresh_token.is_empty() {
                println!("Refresh token: {}", session.refresh_token);
            }
        }
        _ => println!("{}", serde_json::to_string_pretty(session)?),
    }
    Ok(())
}

fn print_table(page: &Page<Entry>) {
    if page.data.is_empty() {
        println!("No entries found.");
        return;
    }

    println!(
        "{:<6} {:<17} {:<40} {:>3} {:>3} {:>3}",
        "ID", "Created", "Situation", "T", "E", "R"
    );
    println!("{}", "-".repeat(76));

    for entry in &page.data {
        println!(
            "{:<6} {:<17} {:<40} {:>3} {:>3} {:>3}",
            entry.id,
            entry.created_at.format("%Y-%m-%d %H:%M").to_string(),
            truncate(&entry.situation, 40),
            entry.thoughts.len(),
            entry.emotions.len(),
            entry.reactions.len()
        );
    }

    println!();
    println!(
        "Page {} of {} ({} entries)",
        page.meta.page,
        page.meta.page_count(),
        page.meta.total
    );
}

fn print_entry(entry: &Entry) {
    println!("Entry {} ({})", entry.id, entry.created_at.format("%Y-%m-%d %H:%M"));
    println!();
    println!("Situation:");
    println!("  {}", entry.situation);
    for (title, items) in [
        ("Thoughts", &entry.thoughts),
        ("Emotions", &entry.emotions),
        ("Reactions", &entry.reactions),
    ] {
        println!("{}:", title);
        for item in items {
            println!("  - {}", item);
        }
    }
}

fn print_csv(entries: &[Entry]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    writer.write_record(["id", "createdAt", "situation", "thoughts", "emotions", "reactions"])?;
    for entry in entries {
        writer.write_record([
            entry.id.to_string(),
            entry.created_at.to_rfc3339(),
            entry.situation.clone(),
            entry.thoughts.join("; "),
            entry.emotions.join("; "),
            entry.reactions.join("; "),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn truncate(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() <= max && !text.contains('\n') {
        return line.to_string();
    }
    let cut: String = line.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut)
}
