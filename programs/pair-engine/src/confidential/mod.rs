//! Confidential volume accumulator.
//!
//! Callers may attach an encrypted declaration of trade size to a swap or a
//! deposit. The pair verifies a proof that the ciphertext was validly
//! encrypted for its viewer, folds it into a running encrypted total by
//! homomorphic addition, and publishes only a handle of the new total.
//!
//! Nothing here is ever decrypted by the pair and nothing here feeds the
//! settlement math: reserves, shares and fees depend on observed balances
//! alone. The backend is a narrow capability ([`VolumeBackend`]) so any
//! additively homomorphic scheme can be substituted.

use std::fmt;

use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use solana_sdk::pubkey::Pubkey;

use crate::error::{PairError, Result};
use crate::state::PoolState;

pub mod elgamal;

pub use elgamal::{
    ElGamalBackend, ElGamalCiphertext, ElGamalKeypair, ElGamalPublicKey, EncryptionProof,
    ViewingKey,
};

// ─── Handle ───────────────────────────────────────────────────────────────────

/// Public fingerprint of a ciphertext; what events carry instead of amounts.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CiphertextHandle(pub [u8; 32]);

impl fmt::Display for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CiphertextHandle({self})")
    }
}

impl Serialize for CiphertextHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for CiphertextHandle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let bytes = hex::decode(&raw).map_err(D::Error::custom)?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| D::Error::custom("ciphertext handle must be 32 bytes"))?;
        Ok(Self(bytes))
    }
}

// ─── Backend capability ───────────────────────────────────────────────────────

/// What a declaration's proof is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofContext {
    pub pair:   Pubkey,
    pub asset:  Pubkey,
    pub sender: Pubkey,
}

/// Verify-and-add over ciphertexts. Implementations must never need a
/// decryption key.
pub trait VolumeBackend {
    type Ciphertext: Clone + fmt::Debug + PartialEq;
    type Proof: Clone + fmt::Debug;

    /// Encryption of zero, the starting total.
    fn zero(&self) -> Self::Ciphertext;

    fn verify(
        &self,
        ciphertext: &Self::Ciphertext,
        proof: &Self::Proof,
        context: &ProofContext,
    ) -> bool;

    fn add(&self, lhs: &Self::Ciphertext, rhs: &Self::Ciphertext) -> Self::Ciphertext;

    fn handle(&self, ciphertext: &Self::Ciphertext) -> CiphertextHandle;
}

/// One encrypted trade-size declaration and its proof of valid encryption.
pub struct VolumeDeclaration<B: VolumeBackend> {
    pub ciphertext: B::Ciphertext,
    pub proof:      B::Proof,
}

impl<B: VolumeBackend> Clone for VolumeDeclaration<B> {
    fn clone(&self) -> Self {
        Self { ciphertext: self.ciphertext.clone(), proof: self.proof.clone() }
    }
}

impl<B: VolumeBackend> fmt::Debug for VolumeDeclaration<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VolumeDeclaration")
            .field("ciphertext", &self.ciphertext)
            .field("proof", &self.proof)
            .finish()
    }
}

/// Optional declaration per asset leg.
pub struct ConfidentialLegs<B: VolumeBackend> {
    pub a: Option<VolumeDeclaration<B>>,
    pub b: Option<VolumeDeclaration<B>>,
}

impl<B: VolumeBackend> Default for ConfidentialLegs<B> {
    fn default() -> Self {
        Self { a: None, b: None }
    }
}

impl<B: VolumeBackend> ConfidentialLegs<B> {
    pub fn leg_a(declaration: VolumeDeclaration<B>) -> Self {
        Self { a: Some(declaration), b: None }
    }

    pub fn leg_b(declaration: VolumeDeclaration<B>) -> Self {
        Self { a: None, b: Some(declaration) }
    }
}

/// Client-side coarse-graining of a trade size before encryption.
pub fn declared_volume(amount: u64, divisor: u64) -> u64 {
    amount / divisor.max(1)
}

// ─── Accumulator ──────────────────────────────────────────────────────────────

/// Verified new totals, computed before settlement and applied after it.
pub(crate) struct FoldPlan<B: VolumeBackend> {
    asset_a: Pubkey,
    asset_b: Pubkey,
    total_a: Option<B::Ciphertext>,
    total_b: Option<B::Ciphertext>,
}

/// Running encrypted totals of declared volume, one per asset.
pub struct ConfidentialVolume<B: VolumeBackend> {
    backend: B,
    total_a: B::Ciphertext,
    total_b: B::Ciphertext,
}

impl<B: VolumeBackend> ConfidentialVolume<B> {
    pub fn new(backend: B) -> Self {
        let total_a = backend.zero();
        let total_b = backend.zero();
        Self { backend, total_a, total_b }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn total_a(&self) -> &B::Ciphertext {
        &self.total_a
    }

    pub fn total_b(&self) -> &B::Ciphertext {
        &self.total_b
    }

    /// `fold(ciphertext, proof) -> ciphertext`: verify, then add to `current`.
    pub fn fold(
        &self,
        current: &B::Ciphertext,
        declaration: &VolumeDeclaration<B>,
        context: &ProofContext,
    ) -> Result<B::Ciphertext> {
        if !self.backend.verify(&declaration.ciphertext, &declaration.proof, context) {
            return Err(PairError::InvalidCiphertext);
        }
        Ok(self.backend.add(current, &declaration.ciphertext))
    }

    pub(crate) fn prepare(
        &self,
        legs: &ConfidentialLegs<B>,
        pair: Pubkey,
        pool: &PoolState,
        sender: Pubkey,
    ) -> Result<FoldPlan<B>> {
        let context = |asset| ProofContext { pair, asset, sender };
        let total_a = legs
            .a
            .as_ref()
            .map(|d| self.fold(&self.total_a, d, &context(pool.asset_a)))
            .transpose()?;
        let total_b = legs
            .b
            .as_ref()
            .map(|d| self.fold(&self.total_b, d, &context(pool.asset_b)))
            .transpose()?;
        Ok(FoldPlan { asset_a: pool.asset_a, asset_b: pool.asset_b, total_a, total_b })
    }

    /// Install verified totals; returns `(asset, handle)` per updated leg.
    pub(crate) fn apply(&mut self, plan: FoldPlan<B>) -> Vec<(Pubkey, CiphertextHandle)> {
        let mut updated = Vec::with_capacity(2);
        if let Some(total) = plan.total_a {
            updated.push((plan.asset_a, self.backend.handle(&total)));
            self.total_a = total;
        }
        if let Some(total) = plan.total_b {
            updated.push((plan.asset_b, self.backend.handle(&total)));
            self.total_b = total;
        }
        updated
    }
}
