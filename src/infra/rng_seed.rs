//! RngSeed: доменный seed для клиентского RNG и ключей карт.
//!
//! Позволяет:
//!   - хранить базовый seed ([u8; 32])
//!   - делать детерминированное hash-reseeding:
//!         new = H(domain || old || table_id || game_id || index)
//!   - создавать DeterministicRng из seed

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::infra::rng::DeterministicRng;

/// 32-байтовый seed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RngSeed {
    pub bytes: [u8; 32],
}

impl RngSeed {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Создать seed из u64 (для удобства тестов).
    pub fn from_u64(x: u64) -> Self {
        let mut b = [0u8; 32];
        b[..8].copy_from_slice(&x.to_le_bytes());
        Self { bytes: b }
    }

    /// Доменное хэш-расширение с контекстом стола и раздачи.
    pub fn derive(&self, table_id: u64, game_id: u64, index: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"REVEAL_POKER_RNG_V1");
        hasher.update(self.bytes);
        hasher.update(table_id.to_le_bytes());
        hasher.update(game_id.to_le_bytes());
        hasher.update(index.to_le_bytes());

        Self {
            bytes: hasher.finalize().into(),
        }
    }

    pub fn to_rng(&self) -> DeterministicRng {
        DeterministicRng::from_seed(self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_depends_on_context() {
        let seed = RngSeed::from_u64(1);
        assert_eq!(seed.derive(1, 2, 3), seed.derive(1, 2, 3));
        assert_ne!(seed.derive(1, 2, 3), seed.derive(1, 2, 4));
        assert_ne!(seed.derive(1, 2, 3), seed.derive(2, 2, 3));
    }
}
