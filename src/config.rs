use serde_derive::{Deserialize, Serialize};

pub const DEFAULT_URI: &str = "mongodb://localhost:27017";
pub const DEFAULT_DATABASE_NAME: &str = "globalmarket";
pub const DEFAULT_APP_NAME: &str = "globalmarket-admin";

/// Where the administrative commands connect to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminConfig {
    pub uri: String,
    pub database_name: String,
    pub app_name: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_URI.into(),
            database_name: DEFAULT_DATABASE_NAME.into(),
            app_name: DEFAULT_APP_NAME.into(),
        }
    }
}

impl AdminConfig {
    pub fn new(uri: impl Into<String>, database_name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database_name: database_name.into(),
            ..Self::default()
        }
    }

    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }
}
