use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    forms::parse_date, FileLocalStorage, KinoClient, Notice, ProfileForm, ProfileSaveOutcome,
    RegistrationForm, ToggleOutcome,
};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod browse;
mod config;
mod render;

use config::{load_settings, Overrides};

#[derive(Parser, Debug)]
#[command(name = "kino", about = "Browse the movie catalog and keep a favorites list")]
struct Cli {
    /// Settings file (defaults to ./kino.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[arg(long, global = true)]
    session_path: Option<PathBuf>,
    /// Use the production API unless an explicit URL is configured.
    #[arg(long, global = true)]
    production: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        username: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    Register {
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        email: String,
        /// YYYY-MM-DD
        #[arg(long)]
        birth_date: Option<String>,
    },
    Whoami,
    /// Prints the carousel window over the (optionally filtered) catalog.
    Movies {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 0)]
        forward: usize,
        #[arg(long, default_value_t = 0)]
        back: usize,
    },
    Titles,
    Movie {
        title: String,
    },
    Genre {
        name: String,
    },
    Director {
        name: String,
    },
    Starring {
        title: String,
    },
    Actor {
        name: String,
    },
    Favorites,
    ToggleFavorite {
        /// Movie id or title.
        movie: String,
    },
    UpdateProfile {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        birth_date: Option<String>,
    },
    DeleteAccount {
        #[arg(long)]
        yes: bool,
    },
    Users,
    Browse,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            config_path: self.config.clone(),
            api_url: self.api_url.clone(),
            session_path: self.session_path.clone(),
            production: self.production,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli.overrides())?;
    init_tracing(&settings.log_filter);
    info!(
        "kino: starting profile={:?} api_url={} session={}",
        settings.profile,
        settings.api_url,
        settings.session_path.display()
    );

    let client = KinoClient::new(
        &settings.api_url,
        FileLocalStorage::new(&settings.session_path),
    )
    .with_context(|| format!("cannot use api url '{}'", settings.api_url))?;
    let mut notices = client.subscribe_notices();

    let result = run(&client, cli.command, &mut notices).await;
    print_notices(&mut notices);
    result
}

fn init_tracing(configured: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Drains notices published so far.
pub(crate) fn print_notices(notices: &mut broadcast::Receiver<Notice>) {
    loop {
        match notices.try_recv() {
            Ok(notice) => println!("{}", render::notice_line(&notice)),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}

async fn run(
    client: &KinoClient,
    command: Command,
    notices: &mut broadcast::Receiver<Notice>,
) -> Result<()> {
    match command {
        Command::Login { username, password } => {
            let user = client.login(&username, &password).await?;
            println!("logged in as {}", user.username);
        }
        Command::Logout => {
            client.auth().logout().await?;
            println!("logged out");
        }
        Command::Register {
            username,
            password,
            email,
            birth_date,
        } => {
            let form = RegistrationForm {
                username,
                password,
                email,
                birth_date: birth_date.as_deref().map(date_arg).transpose()?,
            };
            let user = client.users().register(&form).await?;
            println!("registered {}", user.username);
        }
        Command::Whoami => match client.auth().current_user().await? {
            Some(user) => println!("{}", render::user_summary(&user)),
            None => println!("not logged in"),
        },
        Command::Movies {
            search,
            forward,
            back,
        } => {
            let mut browser = client.browser().await;
            if let Some(query) = search {
                browser.set_query(query);
            }
            for _ in 0..forward {
                browser.next();
            }
            for _ in 0..back {
                browser.previous();
            }
            let user = client.session().user().await?;
            println!("{}", render::carousel_view(&browser, user.as_ref()));
        }
        Command::Titles => {
            for title in client.movies().movie_titles().await? {
                println!("{title}");
            }
        }
        Command::Movie { title } => {
            let movie = client.movies().movie_by_title(&title).await?;
            println!("{}", render::movie_detail(&movie));
        }
        Command::Genre { name } => {
            println!("{}", render::genre_detail(&client.movies().genre(&name).await?));
        }
        Command::Director { name } => {
            println!(
                "{}",
                render::director_detail(&client.movies().director(&name).await?)
            );
        }
        Command::Actor { name } => {
            println!("{}", render::actor_detail(&client.movies().actor(&name).await?));
        }
        Command::Starring { title } => {
            for actor in client.movies().starring(&title).await? {
                println!("{actor}");
            }
        }
        Command::Favorites => {
            let favorites = client.favorite_movies().await?;
            if favorites.is_empty() {
                println!("no favorites yet");
            }
            for movie in &favorites {
                println!("{}", render::movie_line(movie, true));
            }
        }
        Command::ToggleFavorite { movie } => {
            let Some(found) = client.find_movie(&movie).await else {
                bail!("no movie matches '{movie}'");
            };
            match client.toggle_favorite(&found).await? {
                ToggleOutcome::Applied { user, .. } => {
                    println!("{} favorites", user.favorites.len());
                }
                ToggleOutcome::NotAuthenticated => {}
            }
        }
        Command::UpdateProfile {
            username,
            password,
            email,
            birth_date,
        } => {
            let Some(current) = client.auth().current_user().await? else {
                bail!("Please log in first.");
            };
            let mut form = ProfileForm::from_user(&current);
            if let Some(username) = username {
                form.username = username;
            }
            if let Some(password) = password {
                form.password = password;
            }
            if let Some(email) = email {
                form.email = email;
            }
            if let Some(raw) = birth_date {
                form.birth_date = Some(date_arg(&raw)?);
            }
            match client.profile().save(&form).await? {
                ProfileSaveOutcome::Updated(user) => println!("{}", render::user_summary(&user)),
                ProfileSaveOutcome::LoggedOut => println!("log in again with your new credentials"),
                ProfileSaveOutcome::NoChanges => {}
            }
        }
        Command::DeleteAccount { yes } => {
            if !yes {
                bail!("refusing to delete the account without --yes");
            }
            let confirmation = client.profile().delete_account().await?;
            println!("{confirmation}");
        }
        Command::Users => {
            for user in client.users().list_users().await? {
                println!("{} <{}>", user.username, user.email);
            }
        }
        Command::Browse => browse::run(client, notices).await?,
    }
    Ok(())
}

fn date_arg(raw: &str) -> Result<chrono::NaiveDate> {
    match parse_date(raw) {
        Some(date) => Ok(date),
        None => bail!("'{raw}' is not a date (expected YYYY-MM-DD)"),
    }
}
