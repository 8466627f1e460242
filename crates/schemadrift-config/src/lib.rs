//! Facet types for the schemadrift configuration file.
//!
//! The file names two connection-parameter sets: `DATABASE_A`, the
//! reference schema, and `DATABASE_B`, the candidate checked against it.
//!
//! ```text
//! DATABASE_A {
//!     host localhost
//!     user postgres
//!     password secret
//!     dbname app_staging
//! }
//! DATABASE_B {
//!     host db.internal
//!     port 6432
//!     user readonly
//!     dbname app
//!     schema app
//! }
//! ```

use facet::Facet;

/// Namespace compared when a connection does not name one.
pub const DEFAULT_SCHEMA: &str = "public";

/// Root configuration.
#[derive(Facet, Debug, Clone)]
pub struct Config {
    /// Reference database (ground truth)
    #[facet(rename = "DATABASE_A")]
    pub database_a: Connection,

    /// Candidate database, checked against the reference
    #[facet(rename = "DATABASE_B")]
    pub database_b: Connection,
}

/// Connection parameters for one database.
#[derive(Facet, Debug, Clone)]
pub struct Connection {
    pub host: String,

    #[facet(default)]
    pub port: Option<u16>,

    pub user: String,

    #[facet(default)]
    pub password: Option<String>,

    pub dbname: String,

    /// Postgres namespace to compare (default: `public`)
    #[facet(default)]
    pub schema: Option<String>,
}

impl Config {
    /// Check that every required parameter is non-empty.
    ///
    /// Returns the set name and field of the first offending parameter.
    pub fn validate(&self) -> Result<(), (&'static str, &'static str)> {
        self.database_a
            .validate()
            .map_err(|field| ("DATABASE_A", field))?;
        self.database_b
            .validate()
            .map_err(|field| ("DATABASE_B", field))?;
        Ok(())
    }
}

impl Connection {
    fn validate(&self) -> Result<(), &'static str> {
        let required = [
            ("host", &self.host),
            ("user", &self.user),
            ("dbname", &self.dbname),
        ];
        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(*field),
            None => Ok(()),
        }
    }

    pub fn schema(&self) -> &str {
        self.schema.as_deref().unwrap_or(DEFAULT_SCHEMA)
    }

    /// Build the tokio-postgres connection config.
    pub fn to_pg_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.host)
            .user(&self.user)
            .dbname(&self.dbname)
            .application_name("schemadrift");
        if let Some(port) = self.port {
            config.port(port);
        }
        if let Some(password) = &self.password {
            config.password(password);
        }
        config
    }

    /// `user@host:port/dbname`, without the password.
    pub fn display_target(&self) -> String {
        match self.port {
            Some(port) => format!("{}@{}:{}/{}", self.user, self.host, port, self.dbname),
            None => format!("{}@{}/{}", self.user, self.host, self.dbname),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    const SAMPLE: &str = r#"
DATABASE_A {
    host localhost
    user postgres
    password secret
    dbname app_staging
}
DATABASE_B {
    host db.internal
    port 6432
    user readonly
    dbname app
    schema app
}
"#;

    #[test]
    fn parses_both_connections() {
        let config: Config = facet_styx::from_str(SAMPLE).unwrap();

        assert_eq!(config.database_a.host, "localhost");
        assert_eq!(config.database_a.port, None);
        assert_eq!(config.database_a.password.as_deref(), Some("secret"));
        assert_eq!(config.database_a.schema(), "public");

        assert_eq!(config.database_b.port, Some(6432));
        assert_eq!(config.database_b.password, None);
        assert_eq!(config.database_b.schema(), "app");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_set_fails_to_parse() {
        let source = "DATABASE_A {host localhost, user postgres, dbname app}";
        let result: Result<Config, _> = facet_styx::from_str(source);
        assert!(result.is_err());
    }

    #[test]
    fn empty_required_field_is_invalid() {
        let mut config: Config = facet_styx::from_str(SAMPLE).unwrap();
        config.database_b.dbname = String::new();

        assert_eq!(config.validate(), Err(("DATABASE_B", "dbname")));
    }

    #[test]
    fn display_target_hides_password() {
        let config: Config = facet_styx::from_str(SAMPLE).unwrap();

        assert_eq!(
            config.database_a.display_target(),
            "postgres@localhost/app_staging"
        );
        assert_eq!(
            config.database_b.display_target(),
            "readonly@db.internal:6432/app"
        );
    }

    #[test]
    fn pg_config_carries_parameters() {
        let config: Config = facet_styx::from_str(SAMPLE).unwrap();
        let pg = config.database_b.to_pg_config();

        assert_eq!(pg.get_user(), Some("readonly"));
        assert_eq!(pg.get_dbname(), Some("app"));
        assert_eq!(pg.get_ports(), &[6432]);
    }
}
