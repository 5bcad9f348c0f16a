use serde::Deserialize;

/// Log output style for the server binary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Top-level server configuration, loaded from `prophunt.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Directory of `<arena>.toml` files loaded at startup.
    pub arenas_dir: String,
    /// Frames per second of the tick loop. Session clocks advance once every
    /// `tick_rate` frames.
    pub tick_rate: u32,
    pub log_format: LogFormat,
    pub limits: LimitsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            arenas_dir: "arenas".to_string(),
            tick_rate: 20,
            log_format: LogFormat::Pretty,
            limits: LimitsConfig::default(),
        }
    }
}

/// Channel sizes for the tick loop.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Pending commands the tick loop buffers before callers wait.
    pub command_buffer: usize,
    pub max_name_len: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            command_buffer: 256,
            max_name_len: 32,
        }
    }
}

impl ServerConfig {
    /// Validate configuration, exiting on anything the server cannot run with.
    pub fn validate(&self) {
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            tracing::error!(
                addr = %self.listen_addr,
                "listen_addr is not a valid socket address"
            );
            std::process::exit(1);
        }
        if self.tick_rate == 0 || self.tick_rate > 1000 {
            tracing::error!(tick_rate = self.tick_rate, "tick_rate must be in 1..=1000");
            std::process::exit(1);
        }
        if self.limits.command_buffer == 0 {
            tracing::error!("limits.command_buffer must be > 0");
            std::process::exit(1);
        }
        if self.limits.max_name_len == 0 {
            tracing::error!("limits.max_name_len must be > 0");
            std::process::exit(1);
        }
        if !std::path::Path::new(&self.arenas_dir).is_dir() {
            tracing::warn!(
                dir = %self.arenas_dir,
                "Arena directory not found; starting with no arenas"
            );
        }
    }

    /// Load config from `prophunt.toml` (or `PROPHUNT_CONFIG`) if it exists,
    /// then apply env var overrides.
    pub fn load() -> Self {
        let path = std::env::var("PROPHUNT_CONFIG")
            .ok()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| "prophunt.toml".to_string());
        let mut config = match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<ServerConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!(path = %path, "Loaded configuration");
                    cfg
                }
                Err(e) => {
                    tracing::warn!(path = %path, "Failed to parse config: {e}, using defaults");
                    ServerConfig::default()
                }
            },
            Err(_) => {
                tracing::info!(path = %path, "No config file found, using defaults");
                ServerConfig::default()
            }
        };
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Ok(addr) = std::env::var("PROPHUNT_LISTEN_ADDR")
            && !addr.is_empty()
        {
            self.listen_addr = addr;
        }
        if let Ok(dir) = std::env::var("PROPHUNT_ARENAS_DIR")
            && !dir.is_empty()
        {
            self.arenas_dir = dir;
        }
        if let Ok(val) = std::env::var("PROPHUNT_TICK_RATE")
            && let Ok(n) = val.parse::<u32>()
        {
            self.tick_rate = n;
        }
        if let Ok(val) = std::env::var("PROPHUNT_LOG_FORMAT")
            && let Some(format) = LogFormat::parse(&val)
        {
            self.log_format = format;
        }
    }
}
