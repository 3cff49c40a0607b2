use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use std::{env, fmt, str::FromStr, time::Duration};

/// Which generation of the HTTP API the gateway serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ApiVersion {
    /// Flat bucket: list every object, upload under the file's own name.
    V1,
    /// Original/resized key layout with pre-signed download links.
    V2,
}

/// Object storage implementation behind the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    S3,
    Memory,
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiVersion::V1 => write!(f, "v1"),
            ApiVersion::V2 => write!(f, "v2"),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::S3 => write!(f, "s3"),
            BackendKind::Memory => write!(f, "memory"),
        }
    }
}

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub api_version: ApiVersion,
    pub backend: BackendKind,
    pub bucket: String,
    pub region: String,
    pub endpoint_url: Option<String>,
    pub original_prefix: String,
    pub resized_prefix: String,
    pub presign_ttl: Duration,
    pub max_upload_bytes: usize,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "HTTP gateway in front of an object storage bucket")]
pub struct Args {
    /// Host to bind to (overrides STORAGE_GATEWAY_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides STORAGE_GATEWAY_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// API generation to serve (overrides STORAGE_GATEWAY_API_VERSION)
    #[arg(long, value_enum)]
    pub api_version: Option<ApiVersion>,

    /// Storage backend (overrides STORAGE_GATEWAY_BACKEND)
    #[arg(long, value_enum)]
    pub backend: Option<BackendKind>,

    /// Bucket holding every object (overrides STORAGE_GATEWAY_BUCKET)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Bucket region (overrides STORAGE_GATEWAY_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// Custom S3-compatible endpoint, e.g. http://localhost:9000
    /// (overrides STORAGE_GATEWAY_ENDPOINT_URL)
    #[arg(long)]
    pub endpoint_url: Option<String>,

    /// Key prefix of uploaded originals (overrides STORAGE_GATEWAY_ORIGINAL_PREFIX)
    #[arg(long)]
    pub original_prefix: Option<String>,

    /// Key prefix of resized variants (overrides STORAGE_GATEWAY_RESIZED_PREFIX)
    #[arg(long)]
    pub resized_prefix: Option<String>,

    /// Lifetime of pre-signed URLs in seconds (overrides STORAGE_GATEWAY_PRESIGN_TTL_SECS)
    #[arg(long)]
    pub presign_ttl_secs: Option<u64>,

    /// Largest accepted request body in bytes (overrides STORAGE_GATEWAY_MAX_UPLOAD_BYTES)
    #[arg(long)]
    pub max_upload_bytes: Option<usize>,
}

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BUCKET: &str = "cftask2-4";
const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_ORIGINAL_PREFIX: &str = "original/";
const DEFAULT_RESIZED_PREFIX: &str = "resized/";
const DEFAULT_PRESIGN_TTL_SECS: u64 = 60 * 60;
/// SigV4 pre-signed URLs cannot outlive seven days.
const MAX_PRESIGN_TTL_SECS: u64 = 7 * 24 * 60 * 60;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        // Parse CLI once
        let args = Args::parse();
        Self::resolve(args, |name| env::var(name))
    }

    /// Merge parsed arguments with values looked up through `lookup`.
    ///
    /// Arguments win over the environment, the environment wins over defaults.
    pub fn resolve<F>(args: Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let text = |name: &str, default: &str| -> Result<String> {
            match lookup(name) {
                Ok(value) => Ok(value),
                Err(env::VarError::NotPresent) => Ok(default.to_string()),
                Err(err) => Err(err).with_context(|| format!("reading {}", name)),
            }
        };

        // --- Environment fallback ---
        let env_host = text("STORAGE_GATEWAY_HOST", "0.0.0.0")?;
        let env_port = parse_var(&lookup, "STORAGE_GATEWAY_PORT", DEFAULT_PORT)?;
        let env_version = parse_enum(&lookup, "STORAGE_GATEWAY_API_VERSION", ApiVersion::V2)?;
        let env_backend = parse_enum(&lookup, "STORAGE_GATEWAY_BACKEND", BackendKind::S3)?;
        let env_bucket = text("STORAGE_GATEWAY_BUCKET", DEFAULT_BUCKET)?;
        let env_region = text("STORAGE_GATEWAY_REGION", DEFAULT_REGION)?;
        let env_endpoint = match lookup("STORAGE_GATEWAY_ENDPOINT_URL") {
            Ok(value) if !value.trim().is_empty() => Some(value),
            Ok(_) | Err(env::VarError::NotPresent) => None,
            Err(err) => return Err(err).context("reading STORAGE_GATEWAY_ENDPOINT_URL"),
        };
        let env_original = text("STORAGE_GATEWAY_ORIGINAL_PREFIX", DEFAULT_ORIGINAL_PREFIX)?;
        let env_resized = text("STORAGE_GATEWAY_RESIZED_PREFIX", DEFAULT_RESIZED_PREFIX)?;
        let env_ttl = parse_var(
            &lookup,
            "STORAGE_GATEWAY_PRESIGN_TTL_SECS",
            DEFAULT_PRESIGN_TTL_SECS,
        )?;
        let env_max_upload = parse_var(
            &lookup,
            "STORAGE_GATEWAY_MAX_UPLOAD_BYTES",
            DEFAULT_MAX_UPLOAD_BYTES,
        )?;

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            api_version: args.api_version.unwrap_or(env_version),
            backend: args.backend.unwrap_or(env_backend),
            bucket: args.bucket.unwrap_or(env_bucket),
            region: args.region.unwrap_or(env_region),
            endpoint_url: args.endpoint_url.or(env_endpoint),
            original_prefix: args.original_prefix.unwrap_or(env_original),
            resized_prefix: args.resized_prefix.unwrap_or(env_resized),
            presign_ttl: Duration::from_secs(args.presign_ttl_secs.unwrap_or(env_ttl)),
            max_upload_bytes: args.max_upload_bytes.unwrap_or(env_max_upload),
        };

        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.bucket.trim().is_empty() {
            anyhow::bail!("bucket name must not be empty");
        }
        if self.presign_ttl.is_zero() {
            anyhow::bail!("pre-signed URL lifetime must be at least one second");
        }
        if self.presign_ttl > Duration::from_secs(MAX_PRESIGN_TTL_SECS) {
            anyhow::bail!(
                "pre-signed URL lifetime of {}s exceeds the {}s maximum",
                self.presign_ttl.as_secs(),
                MAX_PRESIGN_TTL_SECS
            );
        }
        if self.api_version == ApiVersion::V2 && self.original_prefix == self.resized_prefix {
            anyhow::bail!(
                "original and resized prefixes must differ (both are `{}`)",
                self.original_prefix
            );
        }
        Ok(())
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Result<String, env::VarError>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", name, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", name)),
    }
}

fn parse_enum<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Result<String, env::VarError>,
    T: ValueEnum,
{
    match lookup(name) {
        Ok(value) => T::from_str(value.trim(), true)
            .map_err(|err| anyhow!(err))
            .with_context(|| format!("parsing {} value `{}`", name, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", name)),
    }
}
