use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use todo_core::Database;

#[derive(Debug, Parser)]
#[command(name = "todo", version, about = "Personal task tracker served over HTTP")]
pub struct Config {
    /// Address the HTTP server listens on
    #[arg(long, env = "TODO_BIND", default_value = "127.0.0.1:5001")]
    pub bind: SocketAddr,

    /// SQLite database file. Defaults to the user's state directory.
    #[arg(long, env = "TODO_DATABASE")]
    pub database: Option<PathBuf>,
}

impl Config {
    pub async fn open_database(&self) -> todo_core::Result<Database> {
        match &self.database {
            Some(path) => Database::open(path).await,
            None => Database::connect().await,
        }
    }
}
