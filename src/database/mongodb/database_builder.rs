use crate::config::AdminConfig;
use crate::database::mongodb::{get_compressors, MongodbDatabase};
use crate::{AdminError, AdminResult};
use mongodb::options::ClientOptions;
use mongodb::Client;

/// Characters MongoDB does not allow in a database name.
const FORBIDDEN_NAME_CHARACTERS: [char; 7] = ['/', '\\', '.', ' ', '"', '$', '\0'];
const MAX_DATABASE_NAME_BYTES: usize = 64;

/// Checks a database name against the server's naming rules before any connection is made.
fn check_database_name(name: &str) -> AdminResult<()> {
    if name.trim().is_empty() {
        return Err(AdminError::ConfigError("No database name provided".into()));
    }

    if let Some(c) = name.chars().find(|c| FORBIDDEN_NAME_CHARACTERS.contains(c)) {
        return Err(AdminError::ConfigError(format!(
            "Database name `{}` contains the forbidden character {:?}",
            name, c
        )));
    }

    if name.len() >= MAX_DATABASE_NAME_BYTES {
        return Err(AdminError::ConfigError(format!(
            "Database name `{}` must be shorter than {} bytes",
            name, MAX_DATABASE_NAME_BYTES
        )));
    }

    Ok(())
}

#[derive(Default)]
pub struct MongodbDatabaseBuilder {
    database_name: Option<String>,
    client_options: Option<ClientOptions>,
}

impl MongodbDatabaseBuilder {
    pub fn new() -> MongodbDatabaseBuilder {
        MongodbDatabaseBuilder::default()
    }

    /// Parses the connection string from the config and takes its database and app names.
    pub async fn from_config(config: &AdminConfig) -> AdminResult<MongodbDatabaseBuilder> {
        let mut client_options = ClientOptions::parse(config.uri.as_str()).await?;
        if client_options.app_name.is_none() {
            client_options.app_name = Some(config.app_name.clone());
        }

        Ok(Self::new()
            .database_name(config.database_name.as_str())
            .client_options(client_options))
    }

    pub fn database_name(mut self, database_name: impl Into<String>) -> Self {
        self.database_name = Some(database_name.into());
        self
    }

    pub fn client_options(mut self, options: impl Into<Option<ClientOptions>>) -> Self {
        self.client_options = options.into();
        self
    }

    pub async fn build(self) -> AdminResult<MongodbDatabase> {
        // Validate the name first so a bad one fails without touching the network
        let database_name = self
            .database_name
            .ok_or_else(|| AdminError::ConfigError("No database name provided".into()))?;
        check_database_name(&database_name)?;

        let mut client_options = if let Some(options) = self.client_options {
            options
        } else {
            return Err(AdminError::ConfigError(
                "No client options provided for the database connection".into(),
            ));
        };

        if client_options.compressors.is_none() {
            client_options.compressors = get_compressors();
        }

        let client = Client::with_options(client_options)?;
        let db = client.database(database_name.as_str());

        Ok(MongodbDatabase::new(client, db))
    }
}
