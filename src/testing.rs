//! In-memory backends for unit tests.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::{backend::HomomorphicBackend, error::VoteError};

/// "Ciphertext" that carries its plaintext in the clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlainCiphertext {
    pub value: u64,
    pub nonce: u64,
}

/// Transparent backend: addition is integer addition.
#[derive(Debug, Default)]
pub(crate) struct PlainBackend {
    nonce: AtomicU64,
    max_count: Option<u64>,
}

impl PlainBackend {
    pub fn with_max_count(max_count: u64) -> Self {
        Self {
            max_count: Some(max_count),
            ..Self::default()
        }
    }
}

impl HomomorphicBackend for PlainBackend {
    type PublicKey = ();
    type PrivateKey = ();
    type Ciphertext = PlainCiphertext;

    fn generate_keys(&self) -> Result<((), ()), VoteError> {
        Ok(((), ()))
    }

    fn encrypt(&self, bit: bool, _pk: &()) -> Result<PlainCiphertext, VoteError> {
        Ok(PlainCiphertext {
            value: u64::from(bit),
            nonce: self.nonce.fetch_add(1, Ordering::Relaxed),
        })
    }

    fn add(&self, lhs: &PlainCiphertext, rhs: &PlainCiphertext) -> PlainCiphertext {
        PlainCiphertext {
            value: lhs.value + rhs.value,
            nonce: lhs.nonce ^ rhs.nonce,
        }
    }

    fn decrypt(&self, ct: &PlainCiphertext, _sk: &()) -> Result<u64, VoteError> {
        Ok(ct.value)
    }

    fn max_count(&self) -> u64 {
        self.max_count.unwrap_or(u64::MAX)
    }

    fn fingerprint(&self, ct: &PlainCiphertext) -> String {
        format!("plain({}#{})", ct.value, ct.nonce)
    }
}

/// Plain backend whose encryption or decryption starts failing after a number of
/// successful calls.
#[derive(Debug)]
pub(crate) struct FaultyBackend {
    inner: PlainBackend,
    encrypt_budget: AtomicUsize,
    decrypt_budget: AtomicUsize,
}

impl FaultyBackend {
    pub fn failing_encrypt_after(successes: usize) -> Self {
        Self {
            inner: PlainBackend::default(),
            encrypt_budget: AtomicUsize::new(successes),
            decrypt_budget: AtomicUsize::new(usize::MAX),
        }
    }

    pub fn failing_decrypt_after(successes: usize) -> Self {
        Self {
            inner: PlainBackend::default(),
            encrypt_budget: AtomicUsize::new(usize::MAX),
            decrypt_budget: AtomicUsize::new(successes),
        }
    }

    fn take(budget: &AtomicUsize) -> bool {
        budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
    }
}

impl HomomorphicBackend for FaultyBackend {
    type PublicKey = ();
    type PrivateKey = ();
    type Ciphertext = PlainCiphertext;

    fn generate_keys(&self) -> Result<((), ()), VoteError> {
        Ok(((), ()))
    }

    fn encrypt(&self, bit: bool, pk: &()) -> Result<PlainCiphertext, VoteError> {
        if !Self::take(&self.encrypt_budget) {
            return Err(VoteError::Encryption("injected encryption fault".into()));
        }
        self.inner.encrypt(bit, pk)
    }

    fn add(&self, lhs: &PlainCiphertext, rhs: &PlainCiphertext) -> PlainCiphertext {
        self.inner.add(lhs, rhs)
    }

    fn decrypt(&self, ct: &PlainCiphertext, sk: &()) -> Result<u64, VoteError> {
        if !Self::take(&self.decrypt_budget) {
            return Err(VoteError::Decryption("injected decryption fault".into()));
        }
        self.inner.decrypt(ct, sk)
    }

    fn fingerprint(&self, ct: &PlainCiphertext) -> String {
        self.inner.fingerprint(ct)
    }
}
