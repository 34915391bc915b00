/// Work factor used by the service unless configured otherwise.
const DEFAULT_BCRYPT_COST: u32 = 10;

/// Hashing failed before anything was stored.
#[derive(Debug, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordHashError(#[from] bcrypt::BcryptError);

/// Hashes and verifies admin passwords.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;
    fn verify(&self, password: &str, stored: &str) -> bool;
}

/// Salted bcrypt hashes in the modular crypt format (`$2b$<cost>$...`).
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::with_cost(DEFAULT_BCRYPT_COST)
    }
}

impl PasswordHasher for BcryptPasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        Ok(bcrypt::hash(password, self.cost)?)
    }

    /// Malformed stored values never verify.
    fn verify(&self, password: &str, stored: &str) -> bool {
        bcrypt::verify(password, stored).unwrap_or(false)
    }
}
