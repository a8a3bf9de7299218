use crate::error::ConfigError;

/// Minimum length accepted for the HS256 signing secret. Shorter keys make
/// brute-forcing the signature cheaper than brute-forcing passwords.
const MIN_SECRET_LENGTH: usize = 32;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub jwt: JwtSettings,
    pub password: PasswordSettings,
    pub store: StoreSettings,
}

/// Token signing and lifetime settings
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    /// Symmetric signing key. Fixed at deployment time; never rotated live.
    pub secret: String,
    pub issuer: String,
    /// Lifetime granted to tokens issued by login, in seconds.
    pub default_token_ttl: i64,
    /// Upper bound on any requested ttl, in seconds.
    pub max_token_ttl: i64,
    /// Clock-skew tolerance applied to the expiry check, in seconds.
    pub expiry_leeway: u64,
}

/// Password hashing settings
#[derive(serde::Deserialize, Clone)]
pub struct PasswordSettings {
    /// bcrypt cost factor. The default (12) lands around 100ms per hash on
    /// current server hardware.
    pub cost: u32,
}

/// Credential store settings
#[derive(serde::Deserialize, Clone)]
pub struct StoreSettings {
    /// Bound on any single store call, in milliseconds. A timeout surfaces
    /// as a retryable failure, never as a denial.
    pub lookup_timeout_ms: u64,
}

impl Settings {
    /// Startup validation. A gate must refuse to come up over a broken
    /// configuration rather than serve unauthenticated traffic.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("jwt.secret".to_string()));
        }
        if self.jwt.secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::InvalidValue(format!(
                "jwt.secret must be at least {} bytes",
                MIN_SECRET_LENGTH
            )));
        }
        if self.jwt.issuer.trim().is_empty() {
            return Err(ConfigError::MissingRequired("jwt.issuer".to_string()));
        }
        if self.jwt.default_token_ttl <= 0 {
            return Err(ConfigError::InvalidValue(
                "jwt.default_token_ttl must be positive".to_string(),
            ));
        }
        if self.jwt.max_token_ttl < self.jwt.default_token_ttl {
            return Err(ConfigError::InvalidValue(
                "jwt.max_token_ttl must be >= jwt.default_token_ttl".to_string(),
            ));
        }
        // bcrypt only accepts costs in 4..=31
        if !(4..=31).contains(&self.password.cost) {
            return Err(ConfigError::InvalidValue(
                "password.cost must be between 4 and 31".to_string(),
            ));
        }
        if self.store.lookup_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "store.lookup_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .build()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;
    let settings = settings
        .try_deserialize::<Settings>()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;
    settings.validate()?;
    Ok(settings)
}
