// Password hashing and verification utilities using Argon2id

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

use crate::app_config::SecurityConfig;

/// Errors that can occur during password operations
#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashingError(String),

    #[error("Failed to verify password: {0}")]
    VerificationError(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,

    #[error("Memory cost ({0} KiB) exceeds safe limit ({1} KiB) - risk of out-of-memory error")]
    MemoryCostTooHigh(u32, u32),
}

/// Configuration for Argon2id password hashing
#[derive(Debug, Clone)]
pub struct PasswordConfig {
    /// Memory cost in KiB (default: 19456 = 19 MiB)
    pub memory_cost: u32,
    /// Time cost (iterations, default: 2)
    pub time_cost: u32,
    /// Parallelism factor (default: 1)
    pub parallelism: u32,
    /// Output hash length in bytes (default: 32)
    pub output_length: usize,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        // OWASP minimum parameters for Argon2id
        Self {
            memory_cost: 19456,
            time_cost: 2,
            parallelism: 1,
            output_length: 32,
        }
    }
}

impl From<&SecurityConfig> for PasswordConfig {
    fn from(security: &SecurityConfig) -> Self {
        Self {
            memory_cost: security.password_memory_cost,
            time_cost: security.password_time_cost,
            ..Self::default()
        }
    }
}

impl PasswordConfig {
    /// 25% of available memory, or 512 MiB where /proc/meminfo is unavailable
    fn get_safe_memory_limit() -> u32 {
        const FALLBACK_KIB: u32 = 524_288;

        std::fs::read_to_string("/proc/meminfo")
            .ok()
            .and_then(|content| {
                content
                    .lines()
                    .find(|line| line.starts_with("MemAvailable:"))
                    .and_then(|line| line.split_whitespace().nth(1))
                    .and_then(|kb| kb.parse::<u64>().ok())
            })
            .map(|available_kb| (available_kb / 4).min(u32::MAX as u64) as u32)
            .unwrap_or(FALLBACK_KIB)
    }

    fn validate_memory_cost(&self) -> Result<(), PasswordError> {
        let safe_limit = Self::get_safe_memory_limit();

        if self.memory_cost > safe_limit {
            return Err(PasswordError::MemoryCostTooHigh(
                self.memory_cost,
                safe_limit,
            ));
        }

        Ok(())
    }

    fn build_hasher(&self) -> Result<Argon2<'static>, PasswordError> {
        self.validate_memory_cost()?;

        let params = Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            Some(self.output_length),
        )
        .map_err(|e| PasswordError::HashingError(e.to_string()))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Hash a password with the given configuration
///
/// # Returns
/// * `Result<String, PasswordError>` - The hashed password in PHC string format
///   (`$argon2id$v=19$m=19456,t=2,p=1$...`)
pub fn hash_password_with_config(
    password: &str,
    config: &PasswordConfig,
) -> Result<String, PasswordError> {
    let argon2 = config.build_hasher()?;
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashingError(e.to_string()))?;

    Ok(password_hash.to_string())
}

/// Verify a password against a PHC string hash. Parameters are read from the
/// hash itself, so hashes made with older settings keep verifying.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerificationError(e.to_string())),
    }
}
