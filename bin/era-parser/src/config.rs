use std::path::PathBuf;

use clap::Args;
use directories::ProjectDirs;
use era_loader::LoaderConfig;

/// Environment-driven configuration for the remote downloader and the
/// analytics store client. Every field maps to one of spec §6's
/// documented environment variables; `state_dir` is the one addition this
/// repo needs beyond that list, since the state store has to live
/// somewhere on disk.
#[derive(Debug, Clone, Args)]
pub struct StoreConfig {
    #[arg(long, env = "ERA_BASE_URL")]
    pub era_base_url: Option<String>,

    #[arg(long, env = "ERA_DOWNLOAD_DIR", default_value = "./era_downloads")]
    pub era_download_dir: PathBuf,

    #[arg(long, env = "ERA_CLEANUP_AFTER_PROCESS", default_value_t = true)]
    pub era_cleanup_after_process: bool,

    #[arg(long, env = "ERA_MAX_RETRIES", default_value_t = 3)]
    pub era_max_retries: u32,

    /// Left unset, `state_dir()` falls back to the OS's local app-data
    /// directory rather than a relative path, so the state store survives
    /// regardless of the working directory a cron job or systemd unit runs
    /// this from.
    #[arg(long, env = "ERA_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    #[arg(long, env = "CLICKHOUSE_HOST")]
    pub clickhouse_host: Option<String>,

    #[arg(long, env = "CLICKHOUSE_PORT", default_value_t = 8443)]
    pub clickhouse_port: u16,

    #[arg(long, env = "CLICKHOUSE_USER", default_value = "default")]
    pub clickhouse_user: String,

    #[arg(long, env = "CLICKHOUSE_PASSWORD", default_value = "")]
    pub clickhouse_password: String,

    #[arg(long, env = "CLICKHOUSE_DATABASE", default_value = "beacon_chain")]
    pub clickhouse_database: String,

    #[arg(long, env = "CLICKHOUSE_SECURE", default_value_t = true)]
    pub clickhouse_secure: bool,
}

impl StoreConfig {
    /// Resolves where the state store lives: the explicit `--state-dir`/
    /// `ERA_STATE_DIR` value if set, otherwise the OS-local app-data
    /// directory for `era-parser`, mirroring the teacher's
    /// `setup_data_dir` fallback.
    pub fn state_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.state_dir {
            Some(dir) => Ok(dir.clone()),
            None => ProjectDirs::from("", "", "era-parser")
                .map(|dirs| dirs.data_local_dir().to_path_buf())
                .ok_or_else(|| anyhow::anyhow!("could not determine a default state directory for this OS; pass --state-dir explicitly")),
        }
    }

    pub fn loader_config(&self) -> anyhow::Result<LoaderConfig> {
        let host = self
            .clickhouse_host
            .clone()
            .ok_or_else(|| anyhow::anyhow!("CLICKHOUSE_HOST is required when --export clickhouse is used"))?;
        Ok(LoaderConfig {
            host,
            port: self.clickhouse_port,
            user: self.clickhouse_user.clone(),
            password: self.clickhouse_password.clone(),
            database: self.clickhouse_database.clone(),
            secure: self.clickhouse_secure,
        })
    }

    pub fn require_base_url(&self) -> anyhow::Result<&str> {
        self.era_base_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("ERA_BASE_URL is required for remote operations"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> StoreConfig {
        StoreConfig {
            era_base_url: None,
            era_download_dir: PathBuf::from("./era_downloads"),
            era_cleanup_after_process: true,
            era_max_retries: 3,
            state_dir: None,
            clickhouse_host: None,
            clickhouse_port: 8443,
            clickhouse_user: "default".to_string(),
            clickhouse_password: String::new(),
            clickhouse_database: "beacon_chain".to_string(),
            clickhouse_secure: true,
        }
    }

    #[test]
    fn explicit_state_dir_is_used_verbatim() {
        let mut config = base_config();
        config.state_dir = Some(PathBuf::from("/tmp/my-state"));
        assert_eq!(config.state_dir().unwrap(), PathBuf::from("/tmp/my-state"));
    }

    #[test]
    fn unset_state_dir_falls_back_to_os_app_data_dir() {
        let config = base_config();
        let resolved = config.state_dir().unwrap();
        assert!(resolved.is_absolute());
    }

    #[test]
    fn loader_config_requires_clickhouse_host() {
        let config = base_config();
        assert!(config.loader_config().is_err());
    }
}
