//! `gazette` command-line entry point.
//!
//! # Responsibility
//! - Serve the news or notes site.
//! - Run schema migrations and seed/administer the shared database.

use anyhow::{anyhow, bail, Context};
use chrono::{Days, Local};
use clap::{Parser, Subcommand};
use gazette_core::db::Connection;
use gazette_core::repo::news_repo::SqliteNewsRepository;
use gazette_core::repo::session_repo::SqliteSessionRepository;
use gazette_core::repo::user_repo::SqliteUserRepository;
use gazette_core::{
    init_logging, open_db, AuthService, AuthServiceError, LogSink, NewNews, NewsService,
    Settings,
};
use gazette_web::{AppKind, AppState};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gazette", version, about = "News and notes web applications")]
struct Cli {
    /// TOML settings file; `GAZETTE_*` environment variables override it.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve one of the sites
    Serve {
        /// news | notes
        #[arg(long)]
        app: AppKind,
        /// Overrides `bind_addr`
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },
    /// Create or upgrade the database schema
    Migrate,
    /// Publish COUNT news items, one per day going back from today
    SeedNews {
        #[arg(long, default_value_t = 11)]
        count: u32,
    },
    /// Register an account
    CreateUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Inspect settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective settings as TOML
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;

    if let Command::Config {
        action: ConfigAction::Show,
    } = &cli.command
    {
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    let sink = LogSink::from_dir(settings.log_dir.as_deref()).map_err(|err| anyhow!(err))?;
    init_logging(&settings.log_level, sink).map_err(|err| anyhow!(err))?;

    match cli.command {
        Command::Serve { app, bind } => serve(settings, app, bind).await,
        Command::Migrate => migrate(&settings),
        Command::SeedNews { count } => seed_news(&settings, count),
        Command::CreateUser { username, password } => create_user(&settings, &username, &password),
        Command::Config { .. } => Ok(()),
    }
}

async fn serve(settings: Settings, app: AppKind, bind: Option<String>) -> anyhow::Result<()> {
    let addr = bind.unwrap_or_else(|| settings.bind_addr.clone());
    let conn = open_db(&settings.database_path)
        .with_context(|| format!("failed to open `{}`", settings.database_path.display()))?;

    let purged = auth_service(&conn, &settings).purge_expired_sessions()?;
    info!("event=session_purge module=cli status=ok removed={purged}");

    let state = AppState::new(app, conn, settings)?;
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind `{addr}`"))?;
    gazette_web::serve(listener, state).await?;
    Ok(())
}

fn migrate(settings: &Settings) -> anyhow::Result<()> {
    open_db(&settings.database_path)?;
    println!(
        "database `{}` is at schema version {}",
        settings.database_path.display(),
        gazette_core::db::migrations::latest_version()
    );
    Ok(())
}

fn seed_news(settings: &Settings, count: u32) -> anyhow::Result<()> {
    let conn = open_db(&settings.database_path)?;
    let service = NewsService::new(SqliteNewsRepository::new(&conn));
    let today = Local::now().date_naive();

    for index in 0..count {
        let date = today
            .checked_sub_days(Days::new(u64::from(index)))
            .ok_or_else(|| anyhow!("date out of range for index {index}"))?;
        service.publish(&NewNews::dated(
            format!("Новость {index}"),
            "Просто текст.",
            date,
        ))?;
    }
    println!("published {count} news items");
    Ok(())
}

fn create_user(settings: &Settings, username: &str, password: &str) -> anyhow::Result<()> {
    let conn = open_db(&settings.database_path)?;
    let user = match auth_service(&conn, settings).register(username, password) {
        Ok(user) => user,
        Err(AuthServiceError::Invalid(errors)) => bail!("{}", errors.field("username").join(" ")),
        Err(err) => return Err(err.into()),
    };
    println!("created user `{}` (id {})", user.username, user.id);
    Ok(())
}

fn auth_service<'conn>(
    conn: &'conn Connection,
    settings: &Settings,
) -> AuthService<SqliteUserRepository<'conn>, SqliteSessionRepository<'conn>> {
    AuthService::with_session_ttl(
        SqliteUserRepository::new(conn),
        SqliteSessionRepository::new(conn),
        settings.session_ttl(),
    )
}
