use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

/// Default credential seeded into an empty user table.
pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "1234";

const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;
#[cfg(not(test))]
const ITERATIONS: u32 = 200_000;
#[cfg(test)]
const ITERATIONS: u32 = 1_000;

/// A stored password: hex-encoded salt and PBKDF2-HMAC-SHA256 key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash {
    pub salt: String,
    pub hash: String,
}

impl PasswordHash {
    pub fn new(password: &str) -> Self {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let hash = hex::encode(derive_key(password, &salt));
        Self {
            salt: hex::encode(salt),
            hash,
        }
    }

    pub fn matches(&self, password: &str) -> bool {
        let (Ok(salt), Ok(expected)) = (hex::decode(&self.salt), hex::decode(&self.hash)) else {
            return false;
        };
        let actual = derive_key(password, &salt);
        actual.as_slice().ct_eq(expected.as_slice()).into()
    }
}

fn derive_key(password: &str, salt: &[u8]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, ITERATIONS, &mut key);
    key
}
