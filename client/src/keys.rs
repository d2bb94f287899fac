use p256::ecdsa::SigningKey;

use crate::model::{GrantKey, KeyType};

/// Single-use P-256 key handed to the wallet as the grant's session key.
pub struct SessionKey {
    signing_key: SigningKey,
}

impl SessionKey {
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut rand::thread_rng()),
        }
    }

    /// Uncompressed public key without the SEC1 `0x04` tag, as `0x`-prefixed hex.
    pub fn public_key_hex(&self) -> String {
        let point = self.signing_key.verifying_key().to_encoded_point(false);
        format!("0x{}", hex::encode(&point.as_bytes()[1..]))
    }

    pub fn grant_key(&self) -> GrantKey {
        GrantKey {
            public_key: self.public_key_hex(),
            key_type: KeyType::P256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_key_is_64_bytes_of_hex() {
        let key = SessionKey::generate();
        let public_key = key.public_key_hex();

        assert!(public_key.starts_with("0x"));
        assert_eq!(public_key.len(), 2 + 128);
        assert!(hex::decode(&public_key[2..]).is_ok());
    }

    #[test]
    fn every_key_is_fresh() {
        let first = SessionKey::generate().grant_key();
        let second = SessionKey::generate().grant_key();

        assert_eq!(first.key_type, KeyType::P256);
        assert_ne!(first.public_key, second.public_key);
    }
}
