//! Same-scalar sigma protocol: two group commitments `T` and `U` commit to
//! `k * R` and `k * S` with one secret `k`.
//!
//! Classic three-move commit/challenge/response, made non-interactive over
//! the shared transcript. The verification equations are constant-size, so
//! they are checked inline rather than deferred to the MSM accumulator.

use crate::group_commitment::GroupCommitment;
use crate::transcript::ProofTranscript;
use ark_ec::CurveGroup;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::rand::RngCore;
use ark_std::UniformRand;

const LOG_TARGET: &str = "curdleproofs::same_scalar_argument";

const LABEL_POINTS: &[u8] = b"sameexp_points";
const LABEL_ALPHA: &[u8] = b"sameexp_alpha";

#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct SameScalarProof<C: CurveGroup> {
    pub cm_a: GroupCommitment<C>,
    pub cm_b: GroupCommitment<C>,
    pub z_k: C::ScalarField,
    pub z_t: C::ScalarField,
    pub z_u: C::ScalarField,
}

/// Proves `cm_t = Commit(k * r_point; r_t)` and `cm_u = Commit(k * s_point; r_u)`.
#[tracing::instrument(target = LOG_TARGET, skip_all)]
#[allow(clippy::too_many_arguments)]
pub fn prove<C: CurveGroup, R: RngCore>(
    g_t: &C,
    g_u: &C,
    h: &C,
    r_point: &C,
    s_point: &C,
    cm_t: &GroupCommitment<C>,
    cm_u: &GroupCommitment<C>,
    k: &C::ScalarField,
    r_t: &C::ScalarField,
    r_u: &C::ScalarField,
    transcript: &mut ProofTranscript,
    rng: &mut R,
) -> SameScalarProof<C> {
    let r_a = C::ScalarField::rand(rng);
    let r_b = C::ScalarField::rand(rng);
    let r_k = C::ScalarField::rand(rng);

    let cm_a = GroupCommitment::new(g_t, h, &(*r_point * r_k), &r_a);
    let cm_b = GroupCommitment::new(g_u, h, &(*s_point * r_k), &r_b);

    transcript.append_points(
        LABEL_POINTS,
        &[
            *r_point, *s_point, cm_t.t_1, cm_t.t_2, cm_u.t_1, cm_u.t_2, cm_a.t_1, cm_a.t_2,
            cm_b.t_1, cm_b.t_2,
        ],
    );
    let alpha: C::ScalarField = transcript.challenge_scalar(LABEL_ALPHA);

    SameScalarProof {
        cm_a,
        cm_b,
        z_k: r_k + alpha * k,
        z_t: r_a + alpha * r_t,
        z_u: r_b + alpha * r_u,
    }
}

#[tracing::instrument(target = LOG_TARGET, skip_all)]
#[allow(clippy::too_many_arguments)]
pub fn verify<C: CurveGroup>(
    proof: &SameScalarProof<C>,
    g_t: &C,
    g_u: &C,
    h: &C,
    r_point: &C,
    s_point: &C,
    cm_t: &GroupCommitment<C>,
    cm_u: &GroupCommitment<C>,
    transcript: &mut ProofTranscript,
) -> bool {
    transcript.append_points(
        LABEL_POINTS,
        &[
            *r_point,
            *s_point,
            cm_t.t_1,
            cm_t.t_2,
            cm_u.t_1,
            cm_u.t_2,
            proof.cm_a.t_1,
            proof.cm_a.t_2,
            proof.cm_b.t_1,
            proof.cm_b.t_2,
        ],
    );
    let alpha: C::ScalarField = transcript.challenge_scalar(LABEL_ALPHA);

    let expected_t = GroupCommitment::new(g_t, h, &(*r_point * proof.z_k), &proof.z_t);
    let expected_u = GroupCommitment::new(g_u, h, &(*s_point * proof.z_k), &proof.z_u);

    proof.cm_a.add(&cm_t.mul(&alpha)) == expected_t
        && proof.cm_b.add(&cm_u.mul(&alpha)) == expected_u
}
