use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
            worker_threads: Some(4),
            cors_origins: default_cors_origins(),
        }
    }
}

fn default_cors_origins() -> Vec<String> { vec!["http://localhost:8080".to_string()] }

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Local,
    S3,
}

impl std::str::FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "fs" | "file" => Ok(Self::Local),
            "s3" | "object" => Ok(Self::S3),
            other => Err(anyhow!("unknown storage backend `{other}` (expected `local` or `s3`)")),
        }
    }
}

/// Blob storage settings. `base_dir` applies to the local backend only;
/// the remaining fields are required when `backend = "s3"`.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default = "default_base_dir")]
    pub base_dir: String,
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Local,
            base_dir: default_base_dir(),
            bucket: String::new(),
            endpoint: String::new(),
            region: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
        }
    }
}

fn default_base_dir() -> String { "data".to_string() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`) if present, otherwise start from
    /// defaults; then apply environment overrides and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_missing_file(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize_from_env();
        self.server.normalize()?;
        self.storage.normalize_from_env()?;
        self.storage.validate()?;
        Ok(())
    }
}

fn is_missing_file(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl ServerConfig {
    fn normalize_from_env(&mut self) {
        if let Some(host) = env_nonempty("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = env_nonempty("SERVER_PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl StorageConfig {
    /// Fill unset fields from the environment. Environment values only apply
    /// where the TOML left a field empty, except `STORAGE_BACKEND` which wins.
    pub fn normalize_from_env(&mut self) -> Result<()> {
        if let Some(kind) = env_nonempty("STORAGE_BACKEND") {
            self.backend = kind.parse()?;
        }
        if let Some(dir) = env_nonempty("DATA_DIR") {
            if self.base_dir.trim().is_empty() || self.base_dir == default_base_dir() {
                self.base_dir = dir;
            }
        }
        let fill = |field: &mut String, key: &str| {
            if field.trim().is_empty() {
                if let Some(v) = env_nonempty(key) {
                    *field = v;
                }
            }
        };
        fill(&mut self.bucket, "SCW_BUCKET_NAME");
        fill(&mut self.endpoint, "SCW_ENDPOINT_URL");
        fill(&mut self.region, "SCW_REGION");
        fill(&mut self.access_key, "SCW_ACCESS_KEY");
        fill(&mut self.secret_key, "SCW_SECRET_KEY");

        if !self.endpoint.is_empty()
            && !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://"))
        {
            self.endpoint = format!("https://{}", self.endpoint);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        match self.backend {
            BackendKind::Local => {
                if self.base_dir.trim().is_empty() {
                    return Err(anyhow!("storage.base_dir is empty; set it in config.toml or DATA_DIR"));
                }
            }
            BackendKind::S3 => {
                let required = [
                    ("storage.bucket / SCW_BUCKET_NAME", &self.bucket),
                    ("storage.endpoint / SCW_ENDPOINT_URL", &self.endpoint),
                    ("storage.region / SCW_REGION", &self.region),
                    ("storage.access_key / SCW_ACCESS_KEY", &self.access_key),
                    ("storage.secret_key / SCW_SECRET_KEY", &self.secret_key),
                ];
                let missing: Vec<&str> = required
                    .iter()
                    .filter(|(_, v)| v.trim().is_empty())
                    .map(|(name, _)| *name)
                    .collect();
                if !missing.is_empty() {
                    return Err(anyhow!("s3 storage is missing: {}", missing.join(", ")));
                }
            }
        }
        Ok(())
    }
}
