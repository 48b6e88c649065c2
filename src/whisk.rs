//! Whisk tracker layer: the anonymous leader-election packaging of the
//! shuffle argument, concrete over BLS12-381 G1.
//!
//! A validator's tracker is the pair `(r G, k r G)` for its secret `k` and a
//! one-time blinder `r`. Registration is backed by a discrete-log-equality
//! proof binding the tracker to the validator's public commitment `k G`;
//! shuffling is backed by the outer shuffle argument over whole tracker
//! vectors.

use crate::crs::Crs;
use crate::curdleproof::{self, CurdleproofsProof};
use crate::errors::ProofError;
use crate::transcript::ProofTranscript;
use crate::util::{generate_permutation, shuffle_permute_commit};
use ark_bls12_381::{Fr, G1Affine, G1Projective};
use ark_ec::{AffineRepr, CurveGroup, PrimeGroup};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::rand::RngCore;
use ark_std::vec::Vec;
use ark_std::UniformRand;

const LOG_TARGET: &str = "curdleproofs::whisk";

/// Tracker count per shuffle; with the blinders this gives recursion size 128.
pub const WHISK_ELL: usize = 124;

const LABEL_DOMAIN: &[u8] = b"whisk_opening_proof";
const LABEL_POINTS: &[u8] = b"opening_proof_points";
const LABEL_CHALLENGE: &[u8] = b"opening_proof_challenge";

#[derive(Clone, Copy, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct WhiskTracker {
    pub r_g: G1Affine,
    pub k_r_g: G1Affine,
}

impl WhiskTracker {
    pub fn compute(k: &Fr, r: &Fr) -> Self {
        let r_g = (G1Projective::generator() * r).into_affine();
        let k_r_g = (r_g.into_group() * k).into_affine();
        Self { r_g, k_r_g }
    }
}

/// Commitment `k G` a validator registers alongside its tracker.
pub fn tracker_commitment(k: &Fr) -> G1Affine {
    (G1Projective::generator() * k).into_affine()
}

/// Discrete-log-equality proof that one `k` links `G -> k G` and
/// `r G -> k r G`: commitments to a fresh exponent over both bases, one
/// challenge, one response.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct WhiskTrackerProof {
    pub a_1: G1Projective,
    pub a_2: G1Projective,
    pub s: Fr,
}

pub fn generate_whisk_tracker_proof<R: RngCore>(
    tracker: &WhiskTracker,
    k_comm: &G1Affine,
    k: &Fr,
    rng: &mut R,
) -> WhiskTrackerProof {
    let blinder = Fr::rand(rng);
    let a_1 = G1Projective::generator() * blinder;
    let a_2 = tracker.r_g.into_group() * blinder;

    let mut transcript = ProofTranscript::new(LABEL_DOMAIN);
    transcript.append_affines(LABEL_POINTS, &[*k_comm, tracker.k_r_g, tracker.r_g]);
    transcript.append_points(LABEL_POINTS, &[a_1, a_2]);
    let challenge: Fr = transcript.challenge_scalar(LABEL_CHALLENGE);

    WhiskTrackerProof {
        a_1,
        a_2,
        s: blinder + challenge * k,
    }
}

pub fn is_valid_whisk_tracker_proof(
    tracker: &WhiskTracker,
    k_comm: &G1Affine,
    proof: &WhiskTrackerProof,
) -> bool {
    let mut transcript = ProofTranscript::new(LABEL_DOMAIN);
    transcript.append_affines(LABEL_POINTS, &[*k_comm, tracker.k_r_g, tracker.r_g]);
    transcript.append_points(LABEL_POINTS, &[proof.a_1, proof.a_2]);
    let challenge: Fr = transcript.challenge_scalar(LABEL_CHALLENGE);

    G1Projective::generator() * proof.s == proof.a_1 + k_comm.into_group() * challenge
        && tracker.r_g.into_group() * proof.s
            == proof.a_2 + tracker.k_r_g.into_group() * challenge
}

#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct WhiskShuffleProof {
    pub m_comm: G1Projective,
    pub proof: CurdleproofsProof<G1Projective>,
}

impl WhiskShuffleProof {
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProofError> {
        let mut bytes = Vec::new();
        self.serialize_compressed(&mut bytes)?;
        Ok(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProofError> {
        Ok(Self::deserialize_compressed(bytes)?)
    }
}

/// Shuffles `pre_trackers` under a fresh `(permutation, k)` and proves it.
#[tracing::instrument(target = LOG_TARGET, skip_all)]
pub fn generate_whisk_shuffle_proof<R: RngCore>(
    crs: &Crs<G1Projective>,
    pre_trackers: &[WhiskTracker],
    rng: &mut R,
) -> Result<(Vec<WhiskTracker>, WhiskShuffleProof), ProofError> {
    let permutation = generate_permutation(pre_trackers.len(), rng);
    let k = Fr::rand(rng);

    let vec_r: Vec<G1Affine> = pre_trackers.iter().map(|t| t.r_g).collect();
    let vec_s: Vec<G1Affine> = pre_trackers.iter().map(|t| t.k_r_g).collect();
    let (vec_t, vec_u, m_comm, r_ms) = shuffle_permute_commit::<G1Projective, _>(
        &crs.gs,
        &crs.hs,
        &vec_r,
        &vec_s,
        &permutation,
        &k,
        rng,
    )?;

    let proof = curdleproof::prove(
        crs,
        &vec_r,
        &vec_s,
        &vec_t,
        &vec_u,
        &m_comm,
        &permutation,
        &k,
        &r_ms,
        rng,
    )?;

    let post_trackers: Vec<WhiskTracker> = vec_t
        .iter()
        .zip(&vec_u)
        .map(|(r_g, k_r_g)| WhiskTracker {
            r_g: *r_g,
            k_r_g: *k_r_g,
        })
        .collect();

    Ok((post_trackers, WhiskShuffleProof { m_comm, proof }))
}

#[tracing::instrument(target = LOG_TARGET, skip_all)]
pub fn is_valid_whisk_shuffle_proof<R: RngCore>(
    crs: &Crs<G1Projective>,
    pre_trackers: &[WhiskTracker],
    post_trackers: &[WhiskTracker],
    proof: &WhiskShuffleProof,
    rng: &mut R,
) -> Result<bool, ProofError> {
    if pre_trackers.len() != post_trackers.len() {
        return Err(ProofError::LengthMismatch {
            expected: pre_trackers.len(),
            actual: post_trackers.len(),
        });
    }

    let vec_r: Vec<G1Affine> = pre_trackers.iter().map(|t| t.r_g).collect();
    let vec_s: Vec<G1Affine> = pre_trackers.iter().map(|t| t.k_r_g).collect();
    let vec_t: Vec<G1Affine> = post_trackers.iter().map(|t| t.r_g).collect();
    let vec_u: Vec<G1Affine> = post_trackers.iter().map(|t| t.k_r_g).collect();

    curdleproof::verify(
        &proof.proof,
        crs,
        &vec_r,
        &vec_s,
        &vec_t,
        &vec_u,
        &proof.m_comm,
        rng,
    )
}
