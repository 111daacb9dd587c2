//! Capability interface over the homomorphic encryption scheme.
//!
//! The tally never looks inside a ciphertext. Everything it needs from the cryptosystem is
//! expressed by [`HomomorphicBackend`]: encrypt a bit, add two ciphertexts, decrypt a
//! count. Any scheme providing additive homomorphism can back an election.

use crate::error::VoteError;

/// Additively homomorphic encryption of single bits.
///
/// Keys and ciphertexts are associated types so that each backend keeps its own
/// representation. The private key type is only ever borrowed by [`Self::decrypt()`].
pub trait HomomorphicBackend: Send + Sync {
    /// Key used by voters to encrypt ballots.
    type PublicKey: Send + Sync;
    /// Key held by the tallying authority.
    type PrivateKey;
    /// Encryption of a single plaintext value.
    type Ciphertext: Clone + Send + Sync;

    /// Generates a fresh key pair.
    fn generate_keys(&self) -> Result<(Self::PublicKey, Self::PrivateKey), VoteError>;

    /// Encrypts `bit` as the plaintext 0 or 1.
    fn encrypt(&self, bit: bool, pk: &Self::PublicKey) -> Result<Self::Ciphertext, VoteError>;

    /// Returns a ciphertext encrypting zero.
    fn zero(&self, pk: &Self::PublicKey) -> Result<Self::Ciphertext, VoteError> {
        self.encrypt(false, pk)
    }

    /// Homomorphic addition of two ciphertexts.
    fn add(&self, lhs: &Self::Ciphertext, rhs: &Self::Ciphertext) -> Self::Ciphertext;

    /// Decrypts a ciphertext into the integer it encrypts.
    fn decrypt(&self, ct: &Self::Ciphertext, sk: &Self::PrivateKey) -> Result<u64, VoteError>;

    /// Largest count a single ciphertext can represent without wrapping around.
    fn max_count(&self) -> u64 {
        u64::MAX
    }

    /// Short textual form of a ciphertext, for diagnostics only.
    fn fingerprint(&self, ct: &Self::Ciphertext) -> String;
}
