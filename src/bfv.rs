//! BFV backend built on the `fhe` crate.

use std::sync::Arc;

use fhe::bfv::{self, BfvParameters, Ciphertext, Encoding, Plaintext, PublicKey, SecretKey};
use fhe_traits::{FheDecoder, FheDecrypter, FheEncoder, FheEncrypter, Serialize};
use rand_fhe::{rng as thread_rng, rngs::OsRng, TryRngCore};
use tracing::debug;

use crate::{backend::HomomorphicBackend, error::VoteError};

/// Default degree of the polynomial modulus.
pub const DEFAULT_DEGREE: usize = 2048;

/// Default ciphertext moduli, a single 54-bit level.
pub const DEFAULT_MODULI: [u64; 1] = [0x3FFFFFFF000001];

/// Parameters of the BFV scheme used for an election.
///
/// The plaintext modulus bounds every per-candidate count: a column of the tally
/// decrypts modulo this value, so it must exceed the number of votes a candidate
/// can receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectionParameters {
    pub degree: usize,
    pub plaintext_modulus: u64,
    pub moduli: Vec<u64>,
}

impl ElectionParameters {
    /// Picks the smallest tabulated prime plaintext modulus able to count
    /// `expected_voters` votes.
    pub fn for_voters(expected_voters: usize) -> Self {
        let plaintext_modulus: u64 = match expected_voters {
            0..=999 => 1009,
            1000..=9999 => 10007,
            10000..=99999 => 100003,
            100000..=199999 => 200003,
            200000..=299999 => 300007,
            300000..=399999 => 400009,
            400000..=499999 => 500009,
            500000..=599999 => 600011,
            600000..=699999 => 700001,
            700000..=799999 => 800011,
            800000..=899999 => 900001,
            _ => 1032193,
        };
        Self {
            degree: DEFAULT_DEGREE,
            plaintext_modulus,
            moduli: DEFAULT_MODULI.to_vec(),
        }
    }

    pub fn with_degree(mut self, degree: usize) -> Self {
        self.degree = degree;
        self
    }

    pub fn with_plaintext_modulus(mut self, plaintext_modulus: u64) -> Self {
        self.plaintext_modulus = plaintext_modulus;
        self
    }

    /// Builds the `fhe` parameter set, validating degree and moduli.
    pub fn build(&self) -> Result<Arc<BfvParameters>, VoteError> {
        let params = bfv::BfvParametersBuilder::new()
            .set_degree(self.degree)
            .set_plaintext_modulus(self.plaintext_modulus)
            .set_moduli(&self.moduli)
            .build_arc()
            .map_err(|err| VoteError::Parameters(err.into()))?;
        debug!(
            degree = self.degree,
            plaintext_modulus = self.plaintext_modulus,
            "built BFV parameters"
        );
        Ok(params)
    }
}

impl Default for ElectionParameters {
    fn default() -> Self {
        Self::for_voters(0)
    }
}

/// Encodes a single value in the constant coefficient of a plaintext.
pub(crate) fn encode_value(
    value: u64,
    params: &Arc<BfvParameters>,
) -> Result<Plaintext, VoteError> {
    Plaintext::try_encode(&[value], Encoding::poly(), params)
        .map_err(|err| VoteError::Encryption(err.into()))
}

/// Reads the count held in the constant coefficient of a decrypted plaintext.
pub(crate) fn decode_count(pt: &Plaintext) -> Result<u64, VoteError> {
    let coefficients = Vec::<u64>::try_decode(pt, Encoding::poly())
        .map_err(|err| VoteError::Decryption(err.into()))?;
    coefficients
        .first()
        .copied()
        .ok_or_else(|| VoteError::Decryption("decrypted plaintext has no coefficients".into()))
}

/// Number of serialized bytes shown by [`fingerprint`].
const FINGERPRINT_BYTES: usize = 8;

/// Hex of the trailing serialized bytes of a ciphertext, plus its length.
///
/// The leading bytes are encoding headers shared by every ciphertext; the tail is
/// polynomial data and differs between encryptions.
pub(crate) fn fingerprint(ct: &Ciphertext) -> String {
    let bytes = ct.to_bytes();
    let tail = &bytes[bytes.len().saturating_sub(FINGERPRINT_BYTES)..];
    let hex: String = tail.iter().map(|b| format!("{b:02x}")).collect();
    format!("{hex}/{}B", bytes.len())
}

/// Single-key BFV backend: one secret key decrypts the tally.
#[derive(Debug, Clone)]
pub struct BfvBackend {
    params: Arc<BfvParameters>,
}

impl BfvBackend {
    pub fn new(params: Arc<BfvParameters>) -> Self {
        Self { params }
    }

    pub fn from_parameters(parameters: &ElectionParameters) -> Result<Self, VoteError> {
        Ok(Self::new(parameters.build()?))
    }

    pub fn params(&self) -> &Arc<BfvParameters> {
        &self.params
    }
}

impl HomomorphicBackend for BfvBackend {
    type PublicKey = PublicKey;
    type PrivateKey = SecretKey;
    type Ciphertext = Ciphertext;

    fn generate_keys(&self) -> Result<(PublicKey, SecretKey), VoteError> {
        let sk = SecretKey::random(&self.params, &mut OsRng.unwrap_err());
        let pk = PublicKey::new(&sk, &mut thread_rng());
        Ok((pk, sk))
    }

    fn encrypt(&self, bit: bool, pk: &PublicKey) -> Result<Ciphertext, VoteError> {
        let pt = encode_value(u64::from(bit), &self.params)?;
        pk.try_encrypt(&pt, &mut thread_rng())
            .map_err(|err| VoteError::Encryption(err.into()))
    }

    fn add(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> Ciphertext {
        let mut sum = lhs.clone();
        sum += rhs;
        sum
    }

    fn decrypt(&self, ct: &Ciphertext, sk: &SecretKey) -> Result<u64, VoteError> {
        let pt = sk
            .try_decrypt(ct)
            .map_err(|err| VoteError::Decryption(err.into()))?;
        decode_count(&pt)
    }

    fn max_count(&self) -> u64 {
        self.params.plaintext() - 1
    }

    fn fingerprint(&self, ct: &Ciphertext) -> String {
        fingerprint(ct)
    }
}
