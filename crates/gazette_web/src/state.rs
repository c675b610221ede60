//! Shared request state.
//!
//! # Invariants
//! - One SQLite connection per process; handlers hold the lock for the whole
//!   read/write sequence of a request and never across an `.await`.

use crate::error::WebError;
use crate::render::load_templates;
use gazette_core::Settings;
use rusqlite::Connection;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;
use tera::Tera;
use tokio::sync::{Mutex, MutexGuard};

/// Which site a router serves. Both share the users pages and the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppKind {
    News,
    Notes,
}

impl AppKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::News => "news",
            Self::Notes => "notes",
        }
    }
}

impl Display for AppKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "news" => Ok(Self::News),
            "notes" => Ok(Self::Notes),
            other => Err(format!("unknown app `{other}`; expected news|notes")),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    kind: AppKind,
    db: Arc<Mutex<Connection>>,
    templates: Arc<Tera>,
    settings: Arc<Settings>,
}

impl AppState {
    /// Takes ownership of an already migrated connection.
    pub fn new(kind: AppKind, conn: Connection, settings: Settings) -> Result<Self, WebError> {
        Ok(Self {
            kind,
            db: Arc::new(Mutex::new(conn)),
            templates: Arc::new(load_templates()?),
            settings: Arc::new(settings),
        })
    }

    pub fn kind(&self) -> AppKind {
        self.kind
    }

    pub async fn db(&self) -> MutexGuard<'_, Connection> {
        self.db.lock().await
    }

    pub fn templates(&self) -> &Tera {
        &self.templates
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
