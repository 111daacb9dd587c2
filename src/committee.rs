//! Multiparty BFV backend.
//!
//! The private key is split across a committee of parties. Each party generates a
//! secret key share and a public key share from a common random polynomial (CRP);
//! the election public key is the sum of the public key shares. Decrypting the tally
//! requires a decryption share from every party, and the shares are summed to
//! recover the plaintext. No single party can decrypt a ballot on its own.

use std::sync::Arc;

use fhe::{
    bfv::{BfvParameters, Ciphertext, Plaintext, PublicKey, SecretKey},
    mbfv::{AggregateIter, CommonRandomPoly, DecryptionShare, PublicKeyShare},
};
use fhe_traits::FheEncrypter;
use rand_fhe::{rng as thread_rng, rngs::OsRng, TryRngCore};
use rayon::prelude::*;
use tracing::debug;

use crate::{
    backend::HomomorphicBackend,
    bfv::{decode_count, encode_value, fingerprint, ElectionParameters},
    error::VoteError,
};

/// One member of the decryption committee.
pub(crate) struct Party {
    sk_share: SecretKey,
    pk_share: PublicKeyShare,
}

/// The committee jointly holding the election private key.
pub struct Committee {
    parties: Vec<Party>,
}

impl Committee {
    pub fn len(&self) -> usize {
        self.parties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parties.is_empty()
    }
}

/// BFV backend whose private key is a [`Committee`] of key shares.
#[derive(Debug, Clone)]
pub struct MultipartyBfvBackend {
    params: Arc<BfvParameters>,
    num_parties: usize,
}

impl MultipartyBfvBackend {
    pub fn new(params: Arc<BfvParameters>, num_parties: usize) -> Self {
        Self {
            params,
            num_parties,
        }
    }

    pub fn from_parameters(
        parameters: &ElectionParameters,
        num_parties: usize,
    ) -> Result<Self, VoteError> {
        Ok(Self::new(parameters.build()?, num_parties))
    }

    pub fn num_parties(&self) -> usize {
        self.num_parties
    }
}

impl HomomorphicBackend for MultipartyBfvBackend {
    type PublicKey = PublicKey;
    type PrivateKey = Committee;
    type Ciphertext = Ciphertext;

    fn generate_keys(&self) -> Result<(PublicKey, Committee), VoteError> {
        if self.num_parties == 0 {
            return Err(VoteError::Parameters(
                "a committee needs at least one party".into(),
            ));
        }
        let crp = CommonRandomPoly::new(&self.params, &mut thread_rng())
            .map_err(|err| VoteError::Parameters(err.into()))?;

        let parties = (0..self.num_parties)
            .into_par_iter()
            .map(|_| {
                let sk_share = SecretKey::random(&self.params, &mut OsRng.unwrap_err());
                let pk_share = PublicKeyShare::new(&sk_share, crp.clone(), &mut thread_rng())
                    .map_err(|err| VoteError::Parameters(err.into()))?;
                Ok(Party { sk_share, pk_share })
            })
            .collect::<Result<Vec<_>, VoteError>>()?;

        // Shares come from the same CRP, so they can be summed in any order.
        let pk: PublicKey = parties
            .iter()
            .map(|p| p.pk_share.clone())
            .aggregate()
            .map_err(|err| VoteError::Parameters(err.into()))?;
        debug!(parties = parties.len(), "aggregated committee public key");

        Ok((pk, Committee { parties }))
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

    fn decrypt(&self, ct: &Ciphertext, committee: &Committee) -> Result<u64, VoteError> {
        let ct = Arc::new(ct.clone());
        let shares = committee
            .parties
            .par_iter()
            .map(|party| {
                DecryptionShare::new(&party.sk_share, &ct, &mut thread_rng())
                    .map_err(|err| VoteError::Decryption(err.into()))
            })
            .collect::<Result<Vec<_>, VoteError>>()?;

        let pt: Plaintext = shares
            .into_iter()
            .aggregate()
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
