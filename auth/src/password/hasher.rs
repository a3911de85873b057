use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::errors::PasswordError;

/// Work factor for password hashing.
///
/// `iterations` is the Argon2 time cost and `memory_kib` the memory cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    pub iterations: u32,
    pub memory_kib: u32,
}

impl HashCost {
    pub const fn new(iterations: u32, memory_kib: u32) -> Self {
        Self {
            iterations,
            memory_kib,
        }
    }
}

impl Default for HashCost {
    fn default() -> Self {
        Self::new(Params::DEFAULT_T_COST, Params::DEFAULT_M_COST)
    }
}

/// Password hashing implementation.
///
/// Provides cryptographic password hashing (internally uses Argon2id).
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: HashCost,
}

impl PasswordHasher {
    /// Create a password hasher with the library defaults.
    pub fn new() -> Self {
        Self {
            cost: HashCost::default(),
        }
    }

    /// Create a password hasher with an explicit work factor.
    ///
    /// # Errors
    /// * `InvalidCost` - Argon2 rejects the parameters
    pub fn with_cost(cost: HashCost) -> Result<Self, PasswordError> {
        Self::params(cost)?;
        Ok(Self { cost })
    }

    pub fn cost(&self) -> HashCost {
        self.cost
    }

    fn params(cost: HashCost) -> Result<Params, PasswordError> {
        Params::new(
            cost.memory_kib,
            cost.iterations,
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|e| PasswordError::InvalidCost(e.to_string()))
    }

    /// Hash a plaintext password securely.
    ///
    /// Uses Argon2id with random salt generation.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// PHC string format hash (includes algorithm, parameters, salt, and hash)
    ///
    /// # Errors
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, Self::params(self.cost)?);

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// A malformed stored hash verifies as `false`, exactly like a wrong
    /// password. Parameters are read from the PHC string, so hashes made
    /// with a different cost still verify.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            tracing::warn!("Stored password hash is not a valid PHC string");
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Whether `hash` was produced with a different work factor than this
    /// hasher's. Unparseable hashes report `false`; they never verify anyway.
    pub fn needs_rehash(&self, hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };
        match Params::try_from(&parsed_hash) {
            Ok(params) => {
                params.t_cost() != self.cost.iterations || params.m_cost() != self.cost.memory_kib
            }
            Err(_) => false,
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const FAST: HashCost = HashCost::new(1, 1024);

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::with_cost(FAST).expect("Invalid cost");
        let password = "my_secure_password";

        let hash = hasher.hash(password).expect("Failed to hash password");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify(password, &hash));
        assert!(!hasher.verify("wrong_password", &hash));
    }

    #[test]
    fn test_verify_invalid_hash_is_false() {
        let hasher = PasswordHasher::with_cost(FAST).expect("Invalid cost");
        assert!(!hasher.verify("password", "invalid_hash"));
        assert!(!hasher.verify("password", ""));
    }

    #[test]
    fn test_hash_embeds_cost() {
        let hasher = PasswordHasher::with_cost(HashCost::new(2, 2048)).expect("Invalid cost");
        let hash = hasher.hash("password").expect("Failed to hash password");
        assert!(hash.contains("m=2048,t=2"));

        // Verification reads parameters from the hash itself
        let other = PasswordHasher::with_cost(FAST).expect("Invalid cost");
        assert!(other.verify("password", &hash));
    }

    #[test]
    fn test_needs_rehash_compares_embedded_cost() {
        let hasher = PasswordHasher::with_cost(FAST).expect("Invalid cost");
        let costlier = PasswordHasher::with_cost(HashCost::new(2, 1024)).expect("Invalid cost");

        let own = hasher.hash("password").expect("Failed to hash password");
        let foreign = costlier.hash("password").expect("Failed to hash password");

        assert!(!hasher.needs_rehash(&own));
        assert!(hasher.needs_rehash(&foreign));
        assert!(!hasher.needs_rehash("not-a-hash"));
    }

    #[test]
    fn test_rejects_invalid_cost() {
        let result = PasswordHasher::with_cost(HashCost::new(0, 1024));
        assert!(matches!(result, Err(PasswordError::InvalidCost(_))));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 16,
            ..ProptestConfig::default()
        })]

        #[test]
        fn verify_matches_only_the_hashed_password(
            password in "[ -~]{1,32}",
            other in "[ -~]{1,32}",
        ) {
            let hasher = PasswordHasher::with_cost(FAST).unwrap();
            let hash = hasher.hash(&password).unwrap();
            prop_assert!(hasher.verify(&password, &hash));
            if password != other {
                prop_assert!(!hasher.verify(&other, &hash));
            }
        }
    }
}
