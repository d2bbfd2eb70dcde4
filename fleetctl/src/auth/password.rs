//! Password hashing and verification.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::errors::Error;

/// Argon2 hashing parameters.
#[derive(Debug, Clone, Copy)]
pub struct Argon2Params {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Argon2Params {
    fn to_argon2(self) -> Result<Argon2<'static>, Error> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None).map_err(|e| Error::Internal {
            operation: format!("create argon2 params: {e}"),
        })?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for Argon2Params {
    /// Argon2id RFC recommendations
    fn default() -> Self {
        Self {
            memory_kib: 19456, // 19 MB
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Hash a password into a PHC string.
pub fn hash_password_with_params(password: &str, params: Argon2Params) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = params
        .to_argon2()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Internal {
            operation: format!("hash password: {e}"),
        })?;

    Ok(hash.to_string())
}

pub fn hash_password(password: &str) -> Result<String, Error> {
    hash_password_with_params(password, Argon2Params::default())
}

/// Verify a password against a stored hash. Parameters come from the hash itself.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, Error> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| Error::Internal {
        operation: format!("parse password hash: {e}"),
    })?;

    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed_hash).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> Argon2Params {
        Argon2Params {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn test_password_round_trip() {
        let hash = hash_password_with_params("matatu-2024", fast()).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("matatu-2024", &hash).unwrap());
        assert!(!verify_password("matatu-2025", &hash).unwrap());
    }

    #[test]
    fn test_same_password_different_salts() {
        let first = hash_password_with_params("same", fast()).unwrap();
        let second = hash_password_with_params("same", fast()).unwrap();
        assert_ne!(first, second);
        assert!(verify_password("same", &second).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_internal() {
        assert!(matches!(verify_password("x", "not-a-phc-string"), Err(Error::Internal { .. })));
    }
}
