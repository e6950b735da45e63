use anyhow::{Context, Result};
use postgres_native_tls::MakeTlsConnector;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_postgres::{Client, NoTls};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    #[serde(default)]
    pub ssl_mode: SslMode,
    /// Accept invalid/self-signed certificates. Ignored for VerifyCa/VerifyFull.
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// Optional path to a custom CA certificate file (PEM format).
    /// If not set, the system CA store is used.
    #[serde(default)]
    pub ca_cert_path: Option<String>,
}

/// SSL/TLS connection modes for PostgreSQL.
///
/// These match the standard PostgreSQL sslmode parameter:
/// - `Disable`: No SSL (unencrypted)
/// - `Prefer`: Try SSL first, fall back to non-SSL (default)
/// - `Require`: Require SSL but don't verify certificate
/// - `VerifyCa`: Require SSL and verify the server certificate is signed by a trusted CA
/// - `VerifyFull`: Like VerifyCa, but also verify the server hostname matches the certificate
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub enum SslMode {
    Disable,
    #[default]
    Prefer,
    Require,
    VerifyCa,
    VerifyFull,
}

impl SslMode {
    /// The `sslmode` connection-string value. tokio-postgres only knows
    /// disable/prefer/require; the verify modes connect as `require` and the
    /// TLS connector does the certificate checks.
    fn as_param(&self) -> &'static str {
        match self {
            SslMode::Disable => "disable",
            SslMode::Prefer => "prefer",
            SslMode::Require | SslMode::VerifyCa | SslMode::VerifyFull => "require",
        }
    }
}

impl ConnectionConfig {
    pub fn connection_string(&self) -> String {
        format!(
            "host={} port={} dbname={} user={} password={} sslmode={} connect_timeout=10",
            quote_conn_value(&self.host),
            self.port,
            quote_conn_value(&self.database),
            quote_conn_value(&self.username),
            quote_conn_value(&self.password),
            self.ssl_mode.as_param()
        )
    }

    pub fn display_string(&self) -> String {
        format!(
            "{}@{}:{}/{}",
            self.username, self.host, self.port, self.database
        )
    }

    /// Fill in an empty password from `PGPASSWORD`, or prompt on the terminal.
    pub fn resolve_password(&mut self) -> Result<()> {
        if !self.password.is_empty() {
            return Ok(());
        }
        if let Ok(pw) = std::env::var("PGPASSWORD") {
            self.password = pw;
        } else {
            let prompt = format!("Password for {}: ", self.display_string());
            self.password = rpassword::read_password_from_tty(Some(&prompt))
                .context("Failed to read password")?;
        }
        Ok(())
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            name: String::from("Local PostgreSQL"),
            host: String::from("localhost"),
            port: 5432,
            database: String::from("postgres"),
            username: String::from("postgres"),
            password: String::new(),
            ssl_mode: SslMode::default(),
            accept_invalid_certs: false,
            ca_cert_path: None,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SavedConnections {
    #[serde(default)]
    pub connections: Vec<ConnectionConfig>,
}

impl SavedConnections {
    /// `<config_dir>/pgwhere/connections.toml`
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pgwhere")
            .join("connections.toml")
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// A missing file is an empty list, not an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Case-insensitive lookup by connection name.
    pub fn find(&self, name: &str) -> Option<&ConnectionConfig> {
        self.connections
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn names(&self) -> Vec<&str> {
        self.connections.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Connect to PostgreSQL and drive the connection on a background task.
pub async fn create_client(config: &ConnectionConfig) -> Result<Client> {
    let conn_string = config.connection_string();
    let timeout = Duration::from_secs(15);

    let client = match config.ssl_mode {
        SslMode::Disable => {
            let (client, connection) =
                tokio::time::timeout(timeout, tokio_postgres::connect(&conn_string, NoTls))
                    .await
                    .map_err(|_| anyhow::anyhow!("Connection timed out after 15s"))?
                    .context("Failed to connect to PostgreSQL")?;
            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    tracing::error!(error = %e, "connection error");
                }
            });
            client
        }
        SslMode::Prefer | SslMode::Require | SslMode::VerifyCa | SslMode::VerifyFull => {
            let strict = matches!(config.ssl_mode, SslMode::VerifyCa | SslMode::VerifyFull);
            let tls = build_tls_connector(config, strict)?;
            let (client, connection) =
                tokio::time::timeout(timeout, tokio_postgres::connect(&conn_string, tls))
                    .await
                    .map_err(|_| anyhow::anyhow!("Connection timed out after 15s"))?
                    .context("Failed to connect to PostgreSQL")?;
            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    tracing::error!(error = %e, "connection error");
                }
            });
            client
        }
    };

    tracing::debug!(server = %config.display_string(), "connected");
    Ok(client)
}

/// Build a TLS connector. `strict_verify` forces certificate verification
/// even when the config asks to accept invalid certificates.
fn build_tls_connector(
    config: &ConnectionConfig,
    strict_verify: bool,
) -> Result<MakeTlsConnector> {
    let mut builder = native_tls::TlsConnector::builder();

    if config.accept_invalid_certs && !strict_verify {
        builder.danger_accept_invalid_certs(true);
        builder.danger_accept_invalid_hostnames(true);
    } else if let Some(ca_path) = &config.ca_cert_path {
        let ca_data = std::fs::read(ca_path)
            .with_context(|| format!("Failed to read CA certificate file: {}", ca_path))?;
        let cert = native_tls::Certificate::from_pem(&ca_data)
            .context("Failed to parse CA certificate")?;
        builder.add_root_certificate(cert);
    }

    if config.ssl_mode == SslMode::VerifyCa {
        builder.danger_accept_invalid_hostnames(true);
    }

    let connector = builder.build().context("Failed to build TLS connector")?;

    Ok(MakeTlsConnector::new(connector))
}

/// Quote a value for use in a libpq key=value connection string.
/// Wraps in single quotes and escapes backslashes and single quotes.
fn quote_conn_value(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_conn_value() {
        assert_eq!(quote_conn_value("db"), "'db'");
        assert_eq!(quote_conn_value("it's"), r"'it\'s'");
        assert_eq!(quote_conn_value(r"a\b"), r"'a\\b'");
    }

    #[test]
    fn test_connection_string() {
        let config = ConnectionConfig {
            password: "secret".into(),
            ssl_mode: SslMode::VerifyFull,
            ..Default::default()
        };
        let s = config.connection_string();
        assert!(s.contains("host='localhost'"));
        assert!(s.contains("port=5432"));
        assert!(s.contains("password='secret'"));
        assert!(s.contains("sslmode=require"));
    }

    #[test]
    fn test_connection_string_parses_for_every_ssl_mode() {
        for mode in [
            SslMode::Disable,
            SslMode::Prefer,
            SslMode::Require,
            SslMode::VerifyCa,
            SslMode::VerifyFull,
        ] {
            let config = ConnectionConfig {
                password: "it's".into(),
                ssl_mode: mode,
                ..Default::default()
            };
            let parsed = config.connection_string().parse::<tokio_postgres::Config>();
            assert!(parsed.is_ok(), "{:?}: {:?}", mode, parsed.err());
        }
    }

    #[test]
    fn test_display_string() {
        assert_eq!(
            ConnectionConfig::default().display_string(),
            "postgres@localhost:5432/postgres"
        );
    }

    #[test]
    fn test_saved_connections_parse_and_find() {
        let toml = r#"
            [[connections]]
            name = "Staging"
            host = "db.internal"
            port = 5433
            database = "app"
            username = "reader"
            ssl_mode = "Require"
        "#;
        let saved = SavedConnections::from_toml_str(toml).unwrap();
        assert_eq!(saved.names(), vec!["Staging"]);
        let staging = saved.find("staging").unwrap();
        assert_eq!(staging.port, 5433);
        assert_eq!(staging.ssl_mode, SslMode::Require);
        assert!(staging.password.is_empty());
        assert!(saved.find("prod").is_none());
    }

    #[test]
    fn test_ssl_mode_defaults_to_prefer() {
        let toml = r#"
            [[connections]]
            name = "Local"
            host = "localhost"
            port = 5432
            database = "postgres"
            username = "postgres"
        "#;
        let saved = SavedConnections::from_toml_str(toml).unwrap();
        assert_eq!(saved.connections[0].ssl_mode, SslMode::Prefer);
    }

    #[test]
    fn test_password_never_serialized() {
        let saved = SavedConnections {
            connections: vec![ConnectionConfig {
                password: "hunter2".into(),
                ..Default::default()
            }],
        };
        let out = toml::to_string_pretty(&saved).unwrap();
        assert!(!out.contains("hunter2"));
        assert!(out.contains("Local PostgreSQL"));
    }

    #[test]
    fn test_missing_config_file_is_empty() {
        let path = std::env::temp_dir().join("pgwhere-does-not-exist/connections.toml");
        let saved = SavedConnections::load_from(&path).unwrap();
        assert!(saved.connections.is_empty());
    }

    #[test]
    fn test_resolve_password_keeps_existing() {
        let mut config = ConnectionConfig {
            password: "set".into(),
            ..Default::default()
        };
        config.resolve_password().unwrap();
        assert_eq!(config.password, "set");
    }
}
