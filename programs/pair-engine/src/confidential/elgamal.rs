//! Exponential ElGamal over Ristretto255.
//!
//! `Enc(m; r) = (r·G, m·G + r·P)` for viewer key `P = x·G`. Component-wise
//! addition of ciphertexts adds plaintexts.
//!
//! Proof of valid encryption (Fiat–Shamir sigma protocol) shows knowledge of
//! `(r, m)` with `R = r·G` and `C = m·G + r·P`:
//! ```text
//! T1 = k_r·G        T2 = k_m·G + k_r·P
//! c  = H(tag ‖ pair ‖ asset ‖ sender ‖ P ‖ R ‖ C ‖ T1 ‖ T2)
//! s_r = k_r + c·r   s_m = k_m + c·m
//! verify: s_r·G == T1 + c·R  and  s_m·G + s_r·P == T2 + c·C
//! ```
//! Binding the transcript to `(pair, asset, sender)` stops a declaration from
//! being replayed into another pair, leg or account.

use std::collections::HashMap;
use std::fmt;

use curve25519_dalek::{
    constants::RISTRETTO_BASEPOINT_POINT as G,
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
    traits::Identity,
};
use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha256, Sha512};

use super::{declared_volume, CiphertextHandle, ProofContext, VolumeBackend, VolumeDeclaration};
use crate::constants::VOLUME_PROOF_DOMAIN;
use crate::error::{PairError, Result};

// ─── Keys ─────────────────────────────────────────────────────────────────────

/// Secret key of the authorized viewer. Only off-chain analytics hold it.
#[derive(Clone)]
pub struct ViewingKey(Scalar);

impl fmt::Debug for ViewingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ViewingKey(..)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElGamalPublicKey(RistrettoPoint);

#[derive(Debug, Clone)]
pub struct ElGamalKeypair {
    public: ElGamalPublicKey,
    secret: ViewingKey,
}

impl ElGamalKeypair {
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let x = Scalar::random(rng);
        Self { public: ElGamalPublicKey(G * x), secret: ViewingKey(x) }
    }

    pub fn public(&self) -> ElGamalPublicKey {
        self.public
    }

    pub fn viewing_key(&self) -> &ViewingKey {
        &self.secret
    }
}

impl ViewingKey {
    /// Recover a plaintext known to lie in `0..=max` (baby-step giant-step).
    pub fn decrypt(&self, ciphertext: &ElGamalCiphertext, max: u64) -> Option<u64> {
        let target = ciphertext.masked - ciphertext.ephemeral * self.0;
        let step = isqrt(max).saturating_add(1);

        let mut baby = HashMap::with_capacity(step as usize);
        let mut point = RistrettoPoint::identity();
        for j in 0..step {
            baby.insert(point.compress().to_bytes(), j);
            point += G;
        }
        let giant = G * Scalar::from(step);
        let mut gamma = target;
        for i in 0..=step {
            if let Some(j) = baby.get(&gamma.compress().to_bytes()) {
                let m = i.checked_mul(step)?.checked_add(*j)?;
                return (m <= max).then_some(m);
            }
            gamma -= giant;
        }
        None
    }
}

// Integer square root (Babylonian method)
fn isqrt(n: u64) -> u64 {
    if n == 0 {
        return 0;
    }
    let n = n as u128;
    let mut x = n;
    let mut y = (x + 1) >> 1;
    while y < x {
        x = y;
        y = (y + n / y) >> 1;
    }
    x as u64
}

// ─── Ciphertext ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElGamalCiphertext {
    /// `r·G`
    ephemeral: RistrettoPoint,
    /// `m·G + r·P`
    masked:    RistrettoPoint,
}

impl ElGamalCiphertext {
    pub const LEN: usize = 64;

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[..32].copy_from_slice(self.ephemeral.compress().as_bytes());
        out[32..].copy_from_slice(self.masked.compress().as_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::LEN {
            return Err(PairError::InvalidCiphertext);
        }
        Ok(Self {
            ephemeral: read_point(&bytes[..32])?,
            masked:    read_point(&bytes[32..])?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncryptionProof {
    t_ephemeral: RistrettoPoint,
    t_masked:    RistrettoPoint,
    s_r:         Scalar,
    s_m:         Scalar,
}

impl EncryptionProof {
    pub const LEN: usize = 128;

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[..32].copy_from_slice(self.t_ephemeral.compress().as_bytes());
        out[32..64].copy_from_slice(self.t_masked.compress().as_bytes());
        out[64..96].copy_from_slice(self.s_r.as_bytes());
        out[96..].copy_from_slice(self.s_m.as_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::LEN {
            return Err(PairError::InvalidCiphertext);
        }
        Ok(Self {
            t_ephemeral: read_point(&bytes[..32])?,
            t_masked:    read_point(&bytes[32..64])?,
            s_r:         read_scalar(&bytes[64..96])?,
            s_m:         read_scalar(&bytes[96..])?,
        })
    }
}

fn read_point(bytes: &[u8]) -> Result<RistrettoPoint> {
    let raw: [u8; 32] = bytes.try_into().map_err(|_| PairError::InvalidCiphertext)?;
    CompressedRistretto(raw).decompress().ok_or(PairError::InvalidCiphertext)
}

fn read_scalar(bytes: &[u8]) -> Result<Scalar> {
    let raw: [u8; 32] = bytes.try_into().map_err(|_| PairError::InvalidCiphertext)?;
    Option::<Scalar>::from(Scalar::from_canonical_bytes(raw)).ok_or(PairError::InvalidCiphertext)
}

// ─── Encryption (client side) ─────────────────────────────────────────────────

impl ElGamalPublicKey {
    pub fn encrypt<R: RngCore + CryptoRng>(&self, value: u64, rng: &mut R) -> ElGamalCiphertext {
        self.encrypt_with(Scalar::from(value), Scalar::random(rng))
    }

    fn encrypt_with(&self, m: Scalar, r: Scalar) -> ElGamalCiphertext {
        ElGamalCiphertext { ephemeral: G * r, masked: G * m + self.0 * r }
    }

    /// Encrypt `value` for this viewer and prove it, bound to `context`.
    pub fn declare<R: RngCore + CryptoRng>(
        &self,
        value: u64,
        context: &ProofContext,
        rng: &mut R,
    ) -> VolumeDeclaration<ElGamalBackend> {
        let m = Scalar::from(value);
        let r = Scalar::random(rng);
        let ciphertext = self.encrypt_with(m, r);

        let k_r = Scalar::random(rng);
        let k_m = Scalar::random(rng);
        let t_ephemeral = G * k_r;
        let t_masked = G * k_m + self.0 * k_r;
        let c = challenge(self, &ciphertext, &t_ephemeral, &t_masked, context);

        VolumeDeclaration {
            ciphertext,
            proof: EncryptionProof {
                t_ephemeral,
                t_masked,
                s_r: k_r + c * r,
                s_m: k_m + c * m,
            },
        }
    }
}

impl VolumeDeclaration<ElGamalBackend> {
    /// Coarse-grain `amount` by `divisor`, then encrypt and prove it for
    /// `viewer`.
    pub fn encrypt<R: RngCore + CryptoRng>(
        viewer: &ElGamalPublicKey,
        context: &ProofContext,
        amount: u64,
        divisor: u64,
        rng: &mut R,
    ) -> Self {
        viewer.declare(declared_volume(amount, divisor), context, rng)
    }
}

fn challenge(
    viewer: &ElGamalPublicKey,
    ciphertext: &ElGamalCiphertext,
    t_ephemeral: &RistrettoPoint,
    t_masked: &RistrettoPoint,
    context: &ProofContext,
) -> Scalar {
    let mut h = Sha512::new();
    h.update(VOLUME_PROOF_DOMAIN);
    h.update(context.pair.to_bytes());
    h.update(context.asset.to_bytes());
    h.update(context.sender.to_bytes());
    h.update(viewer.0.compress().as_bytes());
    h.update(ciphertext.to_bytes());
    h.update(t_ephemeral.compress().as_bytes());
    h.update(t_masked.compress().as_bytes());
    Scalar::from_hash(h)
}

// ─── Backend ──────────────────────────────────────────────────────────────────

/// Holds only the viewer's public key: it can verify and add, never decrypt.
#[derive(Debug, Clone, Copy)]
pub struct ElGamalBackend {
    viewer: ElGamalPublicKey,
}

impl ElGamalBackend {
    pub fn new(viewer: ElGamalPublicKey) -> Self {
        Self { viewer }
    }

    pub fn viewer(&self) -> ElGamalPublicKey {
        self.viewer
    }
}

impl VolumeBackend for ElGamalBackend {
    type Ciphertext = ElGamalCiphertext;
    type Proof = EncryptionProof;

    fn zero(&self) -> ElGamalCiphertext {
        ElGamalCiphertext {
            ephemeral: RistrettoPoint::identity(),
            masked:    RistrettoPoint::identity(),
        }
    }

    fn verify(
        &self,
        ciphertext: &ElGamalCiphertext,
        proof: &EncryptionProof,
        context: &ProofContext,
    ) -> bool {
        let c = challenge(&self.viewer, ciphertext, &proof.t_ephemeral, &proof.t_masked, context);
        let knows_r = G * proof.s_r == proof.t_ephemeral + ciphertext.ephemeral * c;
        let knows_m =
            G * proof.s_m + self.viewer.0 * proof.s_r == proof.t_masked + ciphertext.masked * c;
        knows_r && knows_m
    }

    fn add(&self, lhs: &ElGamalCiphertext, rhs: &ElGamalCiphertext) -> ElGamalCiphertext {
        ElGamalCiphertext {
            ephemeral: lhs.ephemeral + rhs.ephemeral,
            masked:    lhs.masked + rhs.masked,
        }
    }

    fn handle(&self, ciphertext: &ElGamalCiphertext) -> CiphertextHandle {
        CiphertextHandle(Sha256::digest(ciphertext.to_bytes()).into())
    }
}
