use crate::error::ConfigError;

/// Environment variable holding the token signing secret.
pub const SECRET_ENV_VAR: &str = "SECRET";
/// HS256 needs at least 256 bits of key material.
pub const MIN_SECRET_BYTES: usize = 32;
/// Upper bound on `jwt_settings.expires` (one year, in minutes).
pub const MAX_EXPIRES_MINUTES: i64 = 60 * 24 * 365;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: Option<DatabaseSettings>,
    pub jwt_settings: JwtSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_static_dir() -> String {
    "./public".to_string()
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// JWT settings read from the `jwt_settings` section.
///
/// The signing secret never comes from the file; it is injected from
/// the `SECRET` environment variable by [`get_configuration`].
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    #[serde(rename = "validIssuer", alias = "validissuer")]
    pub valid_issuer: String,
    #[serde(rename = "validAudience", alias = "validaudience")]
    pub valid_audience: String,
    /// Access token lifetime in minutes
    pub expires: i64,
    #[serde(skip)]
    pub secret: String,
}

impl JwtSettings {
    /// Fails when the secret is missing or too short to sign with, or when
    /// `expires` is outside `1..=MAX_EXPIRES_MINUTES`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::MissingRequired(format!(
                "{} environment variable",
                SECRET_ENV_VAR
            )));
        }
        if self.secret.as_bytes().len() < MIN_SECRET_BYTES {
            return Err(ConfigError::InvalidValue(format!(
                "signing secret must be at least {} bytes",
                MIN_SECRET_BYTES
            )));
        }
        if self.expires <= 0 {
            return Err(ConfigError::InvalidValue(
                "jwt_settings.expires must be a positive number of minutes".to_string(),
            ));
        }
        if self.expires > MAX_EXPIRES_MINUTES {
            return Err(ConfigError::InvalidValue(format!(
                "jwt_settings.expires must be at most {} minutes",
                MAX_EXPIRES_MINUTES
            )));
        }
        Ok(())
    }
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .build()?;
    let mut settings = settings.try_deserialize::<Settings>()?;

    settings.jwt_settings.secret = std::env::var(SECRET_ENV_VAR).unwrap_or_default();
    settings.jwt_settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt_settings(secret: &str) -> JwtSettings {
        JwtSettings {
            valid_issuer: "https://localhost:5001".to_string(),
            valid_audience: "https://localhost:5001".to_string(),
            expires: 15,
            secret: secret.to_string(),
        }
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let result = jwt_settings("").validate();
        assert!(matches!(result, Err(ConfigError::MissingRequired(_))));
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let result = jwt_settings("too-short").validate();
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_non_positive_expiry_is_rejected() {
        let mut settings = jwt_settings("TestSecretKeyForJWTMustBeAtLeast32BytesLong");
        settings.expires = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_oversized_expiry_is_rejected() {
        let mut settings = jwt_settings("TestSecretKeyForJWTMustBeAtLeast32BytesLong");
        settings.expires = 1_000_000_000_000;
        assert!(matches!(settings.validate(), Err(ConfigError::InvalidValue(_))));

        settings.expires = MAX_EXPIRES_MINUTES;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_valid_settings() {
        assert!(jwt_settings("TestSecretKeyForJWTMustBeAtLeast32BytesLong")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_jwt_section_uses_camel_case_keys() {
        let source = r#"
application:
  port: 8080
jwt_settings:
  validIssuer: "https://localhost:5001"
  validAudience: "https://localhost:5001"
  expires: 15
"#;
        let settings = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Yaml))
            .build()
            .expect("Failed to build configuration")
            .try_deserialize::<Settings>()
            .expect("Failed to deserialize configuration");

        assert_eq!(settings.jwt_settings.valid_issuer, "https://localhost:5001");
        assert_eq!(settings.jwt_settings.expires, 15);
        assert!(settings.jwt_settings.secret.is_empty());
        assert!(settings.database.is_none());
        assert_eq!(settings.application.host, "127.0.0.1");
    }
}
