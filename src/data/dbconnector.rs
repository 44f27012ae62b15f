use crate::data::configuration::Configuration;
use crate::data::schema;
use crate::entity::helpers::{self, NewPerson};
use anyhow::Context;
use log::{debug, info};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use std::time::Duration;

/// Retirement age for the single in-memory connection. Dropping it drops the data.
const IN_MEMORY_CONNECTION_LIFETIME: Duration = Duration::from_secs(60 * 60 * 24 * 365);

#[allow(async_fn_in_trait)]
pub trait RecordStoreConnection {
    async fn connect(&mut self) -> Result<(), anyhow::Error>;
    async fn check(&self) -> Result<(), anyhow::Error>;
    async fn close(&self) -> Result<(), anyhow::Error>;
    async fn is_initialized(&self) -> Result<bool, anyhow::Error>;
    async fn initialize(&self, config: &Configuration) -> Result<(), anyhow::Error>;
}

pub struct SQLConnector {
    url: String,
    database_connection: Option<DatabaseConnection>,
}

impl SQLConnector {
    /// Store backed by `<path>/db.sqlite`, created on first connect.
    pub fn new(path: &str) -> Self {
        SQLConnector {
            url: format!("sqlite://{path}/db.sqlite?mode=rwc"),
            database_connection: None,
        }
    }

    /// Private in-memory store. Lives as long as its single pooled connection.
    pub fn in_memory() -> Self {
        SQLConnector {
            url: String::from("sqlite::memory:"),
            database_connection: None,
        }
    }

    pub fn connection(&self) -> Result<&DatabaseConnection, DbErr> {
        self.database_connection
            .as_ref()
            .ok_or_else(|| DbErr::Custom(String::from("record store is not connected")))
    }

    fn connect_options(&self) -> ConnectOptions {
        let mut options = ConnectOptions::new(self.url.clone());
        options.sqlx_logging_level(log::LevelFilter::Trace);
        if self.url.contains(":memory:") {
            // every pooled connection would otherwise see its own empty database,
            // and a recycled one would come back empty
            options
                .max_connections(1)
                .min_connections(1)
                .max_lifetime(IN_MEMORY_CONNECTION_LIFETIME)
                .idle_timeout(IN_MEMORY_CONNECTION_LIFETIME);
        }
        options
    }

    /// Connects, pings and initializes the store when it is empty.
    pub async fn open(mut self, config: &Configuration) -> anyhow::Result<Self> {
        self.connect().await?;
        self.check().await?;
        if self.is_initialized().await? {
            info!("Database is initialized");
        } else {
            info!("Database is not initialized, performing initialization");
            self.initialize(config).await?;
        }
        Ok(self)
    }
}

impl RecordStoreConnection for SQLConnector {
    async fn connect(&mut self) -> Result<(), anyhow::Error> {
        let db = Database::connect(self.connect_options())
            .await
            .with_context(|| format!("failed to open {}", self.url))?;

        self.database_connection = Some(db);
        Ok(())
    }
    async fn check(&self) -> Result<(), anyhow::Error> {
        if let Some(ref db) = self.database_connection {
            db.ping().await?;
        }
        Ok(())
    }
    async fn close(&self) -> Result<(), anyhow::Error> {
        if let Some(ref db) = self.database_connection {
            let db = db.clone();
            db.close().await?;
        }
        Ok(())
    }
    async fn is_initialized(&self) -> Result<bool, anyhow::Error> {
        let db = self.connection()?;
        let row = db
            .query_one(Statement::from_string(
                db.get_database_backend(),
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'dinners'",
            ))
            .await?;
        Ok(row.is_some())
    }
    async fn initialize(&self, config: &Configuration) -> Result<(), anyhow::Error> {
        let db = self.connection()?;
        schema::create_schema(db)
            .await
            .context("failed to create schema")?;

        for (handle, member) in &config.members {
            let person = helpers::create_person(
                db,
                NewPerson {
                    name: member.name.clone(),
                    nickname: member.nickname.clone(),
                    birthday: member.birthday,
                    reliability: member.reliability,
                },
            )
            .await
            .with_context(|| format!("failed to seed member {handle}"))?;
            debug!("Seeded member {handle} as person {}", person.id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_store_keeps_its_one_connection() {
        let options = SQLConnector::in_memory().connect_options();
        assert_eq!(options.get_max_connections(), Some(1));
        assert_eq!(options.get_min_connections(), Some(1));
        assert_eq!(options.get_max_lifetime(), Some(IN_MEMORY_CONNECTION_LIFETIME));
        assert_eq!(options.get_idle_timeout(), Some(IN_MEMORY_CONNECTION_LIFETIME));
    }

    #[test]
    fn file_store_uses_pool_defaults() {
        let options = SQLConnector::new("/tmp/hostroll").connect_options();
        assert_eq!(options.get_url(), "sqlite:///tmp/hostroll/db.sqlite?mode=rwc");
        assert_eq!(options.get_max_connections(), None);
    }
}
