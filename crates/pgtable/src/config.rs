//! Connection configuration builder.
//!
//! [`Table`](crate::Table) takes its connection configuration as an opaque
//! string. `ConnConfig` is an optional typed way to produce one, either field by
//! field or from the standard libpq environment variables.

use std::fmt;

const ENV_HOST: &str = "PGHOST";
const ENV_PORT: &str = "PGPORT";
const ENV_USER: &str = "PGUSER";
const ENV_PASSWORD: &str = "PGPASSWORD";
const ENV_DBNAME: &str = "PGDATABASE";
const ENV_SSLMODE: &str = "PGSSLMODE";

const DEFAULT_SSLMODE: &str = "disable";

/// Connection settings rendered as a libpq `key=value` string.
///
/// ```
/// use pgtable::ConnConfig;
///
/// let config = ConnConfig::new()
///     .host("localhost")
///     .user("postgres")
///     .password("s3cret")
///     .dbname("test");
/// assert_eq!(
///     config.to_conn_string(),
///     "host=localhost user=postgres password=s3cret dbname=test sslmode=disable"
/// );
/// assert!(!config.to_string().contains("s3cret"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ConnConfig {
    host: Option<String>,
    port: Option<u16>,
    user: Option<String>,
    password: Option<String>,
    dbname: Option<String>,
    sslmode: String,
}

impl Default for ConnConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            user: None,
            password: None,
            dbname: None,
            sslmode: DEFAULT_SSLMODE.to_string(),
        }
    }
}

impl ConnConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `PGHOST`, `PGPORT`, `PGUSER`, `PGPASSWORD`, `PGDATABASE` and
    /// `PGSSLMODE`. Unset or empty variables leave the field unset; an
    /// unparseable `PGPORT` is ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let mut config = Self {
            host: var(ENV_HOST),
            port: var(ENV_PORT).and_then(|p| p.trim().parse().ok()),
            user: var(ENV_USER),
            password: var(ENV_PASSWORD),
            dbname: var(ENV_DBNAME),
            ..Self::default()
        };
        if let Some(mode) = var(ENV_SSLMODE) {
            config.sslmode = mode;
        }
        config
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn dbname(mut self, dbname: impl Into<String>) -> Self {
        self.dbname = Some(dbname.into());
        self
    }

    /// `disable` unless set. `prefer` and `require` only make sense with a TLS
    /// connector, which this crate does not ship.
    pub fn sslmode(mut self, sslmode: impl Into<String>) -> Self {
        self.sslmode = sslmode.into();
        self
    }

    /// Render as a libpq connection string.
    pub fn to_conn_string(&self) -> String {
        self.render(false)
    }

    fn render(&self, mask_password: bool) -> String {
        let port = self.port.map(|p| p.to_string());
        let password = if mask_password {
            self.password.as_ref().map(|_| "***".to_string())
        } else {
            self.password.clone()
        };

        let pairs = [
            ("host", self.host.as_deref()),
            ("port", port.as_deref()),
            ("user", self.user.as_deref()),
            ("password", password.as_deref()),
            ("dbname", self.dbname.as_deref()),
            ("sslmode", Some(self.sslmode.as_str())),
        ];

        let mut out = String::new();
        for (key, value) in pairs {
            let Some(value) = value else { continue };
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(key);
            out.push('=');
            push_quoted(&mut out, value);
        }
        out
    }
}

// libpq: empty values and values with whitespace, quotes or backslashes are
// single-quoted, with `'` and `\` backslash-escaped inside.
fn push_quoted(out: &mut String, value: &str) {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c == '\'' || c == '\\');
    if !needs_quotes {
        out.push_str(value);
        return;
    }
    out.push('\'');
    for c in value.chars() {
        if c == '\'' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
}

impl fmt::Display for ConnConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(true))
    }
}

impl fmt::Debug for ConnConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("dbname", &self.dbname)
            .field("sslmode", &self.sslmode)
            .finish()
    }
}

impl From<ConnConfig> for String {
    fn from(config: ConnConfig) -> Self {
        config.to_conn_string()
    }
}

impl From<&ConnConfig> for String {
    fn from(config: &ConnConfig) -> Self {
        config.to_conn_string()
    }
}
