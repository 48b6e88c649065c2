//! Same-permutation argument: commitments `A` and `M` open to the same
//! secret permutation of, respectively, a public vector and the range
//! `0..ell`.
//!
//! Challenges `alpha, beta` compress both openings into one committed vector
//! whose grand product equals `prod_i (as[i] + alpha * i + beta)` — a value
//! the verifier computes from public data alone, since the product is
//! invariant under the permutation.

use crate::errors::ProofError;
use crate::grand_product_argument::{self, GrandProductProof};
use crate::msm_accumulator::MsmAccumulator;
use crate::transcript::ProofTranscript;
use crate::util::{permute_vector, sum_affine_points};
use ark_ec::CurveGroup;
use ark_ff::One;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::rand::RngCore;
use ark_std::vec::Vec;

const LOG_TARGET: &str = "curdleproofs::same_permutation_argument";

const LABEL_STEP1: &[u8] = b"same_perm_step1";
const LABEL_ALPHA: &[u8] = b"same_perm_alpha";
const LABEL_BETA: &[u8] = b"same_perm_beta";

#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct SamePermutationProof<C: CurveGroup> {
    pub b_comm: C,
    pub grand_product_proof: GrandProductProof<C>,
}

/// Proves `a_comm = <permute(vec_a), gs> + <r_as, hs>` and
/// `m_comm = <permutation, gs> + <r_ms, hs>` share one `permutation`.
#[tracing::instrument(target = LOG_TARGET, skip_all)]
#[allow(clippy::too_many_arguments)]
pub fn prove<C: CurveGroup, R: RngCore>(
    gs: &[C::Affine],
    hs: &[C::Affine],
    h: &C,
    a_comm: &C,
    m_comm: &C,
    vec_a: &[C::ScalarField],
    permutation: &[u32],
    r_as: &[C::ScalarField],
    r_ms: &[C::ScalarField],
    transcript: &mut ProofTranscript,
    rng: &mut R,
) -> Result<SamePermutationProof<C>, ProofError> {
    if r_as.len() != r_ms.len() {
        return Err(ProofError::LengthMismatch {
            expected: r_as.len(),
            actual: r_ms.len(),
        });
    }

    // Step 1
    transcript.append_points(LABEL_STEP1, &[*a_comm, *m_comm]);
    transcript.append_scalars(LABEL_STEP1, vec_a);
    let alpha: C::ScalarField = transcript.challenge_scalar(LABEL_ALPHA);
    let beta: C::ScalarField = transcript.challenge_scalar(LABEL_BETA);

    // Step 2: the compressed vector and its grand product.
    let permuted_a = permute_vector(vec_a, permutation);
    let mut bs: Vec<C::ScalarField> = Vec::with_capacity(vec_a.len());
    let mut product = C::ScalarField::one();
    for (a_pi, pi) in permuted_a.iter().zip(permutation) {
        let b_i = *a_pi + alpha * C::ScalarField::from(*pi as u64) + beta;
        product *= b_i;
        bs.push(b_i);
    }

    let b_comm = *a_comm + *m_comm * alpha + sum_affine_points::<C>(gs) * beta;
    let r_bs: Vec<C::ScalarField> = r_as
        .iter()
        .zip(r_ms)
        .map(|(r_a, r_m)| *r_a + alpha * r_m)
        .collect();

    let grand_product_proof = grand_product_argument::prove(
        gs, hs, h, &b_comm, &product, &bs, &r_bs, transcript, rng,
    )?;

    Ok(SamePermutationProof {
        b_comm,
        grand_product_proof,
    })
}

#[tracing::instrument(target = LOG_TARGET, skip_all)]
#[allow(clippy::too_many_arguments)]
pub fn verify<C: CurveGroup, R: RngCore>(
    proof: &SamePermutationProof<C>,
    gs: &[C::Affine],
    hs: &[C::Affine],
    h: &C,
    g_sum: &C::Affine,
    h_sum: &C::Affine,
    a_comm: &C,
    m_comm: &C,
    vec_a: &[C::ScalarField],
    n_blinders: usize,
    transcript: &mut ProofTranscript,
    msm_accumulator: &mut MsmAccumulator<C>,
    rng: &mut R,
) -> Result<bool, ProofError> {
    // Step 1
    transcript.append_points(LABEL_STEP1, &[*a_comm, *m_comm]);
    transcript.append_scalars(LABEL_STEP1, vec_a);
    let alpha: C::ScalarField = transcript.challenge_scalar(LABEL_ALPHA);
    let beta: C::ScalarField = transcript.challenge_scalar(LABEL_BETA);

    // The grand product is permutation-invariant, so it comes straight from
    // the public vector.
    let mut product = C::ScalarField::one();
    for (i, a_i) in vec_a.iter().enumerate() {
        product *= *a_i + alpha * C::ScalarField::from(i as u64) + beta;
    }

    // B - A - alpha M must open to beta over every gs base.
    let lhs = proof.b_comm - *a_comm - *m_comm * alpha;
    let betas = vec![beta; gs.len()];
    msm_accumulator.accumulate_check(&lhs, &betas, gs, rng)?;

    grand_product_argument::verify(
        &proof.grand_product_proof,
        gs,
        hs,
        h,
        g_sum,
        h_sum,
        &proof.b_comm,
        &product,
        n_blinders,
        transcript,
        msm_accumulator,
        rng,
    )
}
