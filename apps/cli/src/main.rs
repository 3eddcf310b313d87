use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{
    compress::JpegCompressor, load_settings, AuthController, HttpStoryApi, RequestState,
    SelectedImage, SessionStore, StoryApi, StoryListController, StoryUploadController,
};
use shared::domain::{Story, StoryId};
use storage::Storage;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "story", about = "Story sharing client")]
struct Cli {
    /// Overrides `database_url` from client.toml / APP__DATABASE_URL.
    #[arg(long)]
    database_url: Option<String>,
    /// Overrides `base_url` from client.toml / APP__BASE_URL.
    #[arg(long)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Register {
        name: String,
        email: String,
        password: String,
    },
    Login {
        email: String,
        password: String,
    },
    Logout,
    Profile,
    Stories,
    Show {
        id: String,
    },
    Upload {
        #[arg(long)]
        image: Option<PathBuf>,
        #[arg(long, default_value = "")]
        caption: String,
    },
    DarkMode {
        #[arg(value_enum)]
        mode: Toggle,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Toggle {
    On,
    Off,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let cli = Cli::parse();
    let mut settings = load_settings()?;
    if let Some(database_url) = cli.database_url {
        settings.database_url = database_url;
    }
    if let Some(base_url) = cli.base_url {
        settings.base_url = base_url;
    }
    info!(base_url = %settings.base_url, database_url = %settings.database_url, "cli: starting");

    let storage = Storage::new(&settings.database_url)
        .await
        .with_context(|| format!("failed to open {}", settings.database_url))?;
    let session = Arc::new(SessionStore::new(Arc::new(storage)));
    session.init().await?;

    let api: Arc<dyn StoryApi> = Arc::new(HttpStoryApi::new(&settings.base_url)?);

    match cli.command {
        Command::Register {
            name,
            email,
            password,
        } => {
            let auth = AuthController::new(api, session);
            auth.register_new_user(&name, &email, &password).await;
            report(auth.state())?;
        }
        Command::Login { email, password } => {
            let auth = AuthController::new(api, session.clone());
            auth.login_user(&email, &password).await;
            report(auth.state())?;
            let current = session.load().await?;
            if current.is_authenticated() {
                println!("logged in as {} ({})", current.user_name, current.user_id);
            }
        }
        Command::Logout => {
            let auth = AuthController::new(api, session);
            auth.logout().await;
            report(auth.state())?;
        }
        Command::Profile => {
            let current = session.load().await?;
            if current.is_authenticated() {
                println!("user_id:   {}", current.user_id);
                println!("name:      {}", current.user_name);
                println!("email:     {}", current.user_email);
            } else {
                println!("not logged in");
            }
            println!(
                "dark_mode: {}",
                if current.dark_mode_enabled { "on" } else { "off" }
            );
        }
        Command::Stories => {
            let list = StoryListController::new(api);
            list.get_all_stories(&require_token(&session).await?).await;
            report(list.state())?;

            let stories = list.stories();
            info!(count = stories.len(), "cli: stories loaded");
            for story in &stories {
                print_summary(story);
            }
        }
        Command::Show { id } => {
            let list = StoryListController::new(api);
            list.get_all_stories(&require_token(&session).await?).await;
            report(list.state())?;
            match list.find_story(&StoryId::from(id.as_str())) {
                Some(story) => print_detail(&story),
                None => bail!("story {id} not found"),
            }
        }
        Command::Upload { image, caption } => {
            let token = session.auth_token().await?.unwrap_or_default();
            let image = match image {
                Some(path) => Some(SelectedImage::from_path(&path).await?),
                None => None,
            };
            let upload = StoryUploadController::with_compressor(
                api,
                Arc::new(JpegCompressor),
                settings.max_upload_bytes,
            );
            if let Err(err) = upload.add_new_story(&token, image, &caption).await {
                bail!("{err}");
            }
            report(upload.state())?;
        }
        Command::DarkMode { mode } => {
            let enabled = matches!(mode, Toggle::On);
            session.set_dark_mode(enabled).await?;
            println!("dark mode {}", if enabled { "enabled" } else { "disabled" });
        }
    }

    Ok(())
}

async fn require_token(session: &SessionStore) -> Result<String> {
    match session.auth_token().await? {
        Some(token) => Ok(token),
        None => bail!("not logged in; run `story login <email> <password>` first"),
    }
}

fn report(state: RequestState) -> Result<()> {
    let message = state.take_message();
    if state.is_error {
        bail!("{}", message.unwrap_or_else(|| "request failed".into()));
    }
    if let Some(message) = message {
        println!("{message}");
    }
    Ok(())
}

fn print_summary(story: &Story) {
    println!("{}  {}  {}", story.id, story.name, story.description);
}

fn print_detail(story: &Story) {
    println!("id:          {}", story.id);
    println!("name:        {}", story.name);
    println!("description: {}", story.description);
    println!("photo:       {}", story.photo_url);
    match story.created_at_utc() {
        Some(created) => println!("created:     {}", created.to_rfc3339()),
        None => println!("created:     {}", story.created_at),
    }
    println!("location:    {}, {}", story.latitude, story.longitude);
}
