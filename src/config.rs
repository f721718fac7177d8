use std::{env, path::PathBuf};

use crate::{upload::CoverStorage, Error};

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub project_root: PathBuf,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| Error::Config("DATABASE_URL must be set".to_string()))?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "20".to_string())
            .parse()
            .map_err(|_| {
                Error::Config("DATABASE_MAX_CONNECTIONS must be a positive integer".to_string())
            })?;

        let project_root = match env::var("PROJECT_ROOT") {
            Ok(root) => PathBuf::from(root),
            Err(_) => env::current_dir()?,
        };

        Ok(Self {
            database_url,
            database_max_connections,
            project_root,
        })
    }

    pub fn cover_storage(&self) -> CoverStorage {
        CoverStorage::new(&self.project_root)
    }
}
