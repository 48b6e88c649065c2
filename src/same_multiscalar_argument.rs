//! Same-multiscalar argument: commitments `A`, `Z_t`, `Z_u` are the MSMs of
//! one secret scalar vector `x` over three parallel bases `G`, `T`, `U`.
//!
//! Structurally the same halving recursion as the inner-product argument,
//! but with three bases folded per round and a single witness vector. Note
//! the combiner runs in one direction only: bases fold as `G_L + gamma G_R`
//! while the witness folds as `x_L + gamma^{-1} x_R`.

use crate::errors::ProofError;
use crate::msm_accumulator::MsmAccumulator;
use crate::transcript::ProofTranscript;
use crate::util::{generate_blinders, msm, msm_points};
use ark_ec::CurveGroup;
use ark_ff::{batch_inversion, Field, One, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::rand::RngCore;
use ark_std::vec::Vec;

const LOG_TARGET: &str = "curdleproofs::same_multiscalar_argument";

const LABEL_STEP1: &[u8] = b"same_msm_step1";
const LABEL_ALPHA: &[u8] = b"same_msm_alpha";
const LABEL_LOOP: &[u8] = b"same_msm_loop";
const LABEL_GAMMA: &[u8] = b"same_msm_gamma";

#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct SameMultiscalarProof<C: CurveGroup> {
    pub b_a: C,
    pub b_t: C,
    pub b_u: C,
    pub l_as: Vec<C>,
    pub l_ts: Vec<C>,
    pub l_us: Vec<C>,
    pub r_as: Vec<C>,
    pub r_ts: Vec<C>,
    pub r_us: Vec<C>,
    pub x_final: C::ScalarField,
}

/// Proves `a_comm = <xs, gs>`, `z_t = <xs, ts>`, `z_u = <xs, us>`.
///
/// Takes the bases by value; they are folded in place round by round.
#[tracing::instrument(target = LOG_TARGET, skip_all)]
#[allow(clippy::too_many_arguments)]
pub fn prove<C: CurveGroup, R: RngCore>(
    mut gs: Vec<C>,
    a_comm: &C,
    z_t: &C,
    z_u: &C,
    mut ts: Vec<C>,
    mut us: Vec<C>,
    mut xs: Vec<C::ScalarField>,
    transcript: &mut ProofTranscript,
    rng: &mut R,
) -> Result<SameMultiscalarProof<C>, ProofError> {
    let n = xs.len();
    if gs.len() != n || ts.len() != n || us.len() != n {
        return Err(ProofError::LengthMismatch {
            expected: n,
            actual: gs.len(),
        });
    }
    if !n.is_power_of_two() {
        return Err(ProofError::NotPowerOfTwo(n));
    }

    let rs: Vec<C::ScalarField> = generate_blinders(rng, n);
    let b_a = msm_points(&gs, &rs)?;
    let b_t = msm_points(&ts, &rs)?;
    let b_u = msm_points(&us, &rs)?;

    transcript.append_points(LABEL_STEP1, &[*a_comm, *z_t, *z_u]);
    transcript.append_points(LABEL_STEP1, &ts);
    transcript.append_points(LABEL_STEP1, &us);
    transcript.append_points(LABEL_STEP1, &[b_a, b_t, b_u]);
    let alpha: C::ScalarField = transcript.challenge_scalar(LABEL_ALPHA);

    for (x_i, r_i) in xs.iter_mut().zip(&rs) {
        *x_i = *r_i + alpha * *x_i;
    }

    let rounds = n.trailing_zeros() as usize;
    let mut l_as = Vec::with_capacity(rounds);
    let mut l_ts = Vec::with_capacity(rounds);
    let mut l_us = Vec::with_capacity(rounds);
    let mut r_as = Vec::with_capacity(rounds);
    let mut r_ts = Vec::with_capacity(rounds);
    let mut r_us = Vec::with_capacity(rounds);

    while xs.len() > 1 {
        let half = xs.len() / 2;
        let gs_affine = C::normalize_batch(&gs);
        let ts_affine = C::normalize_batch(&ts);
        let us_affine = C::normalize_batch(&us);
        let (x_lo, x_hi) = xs.split_at(half);
        let (g_lo, g_hi) = gs_affine.split_at(half);
        let (t_lo, t_hi) = ts_affine.split_at(half);
        let (u_lo, u_hi) = us_affine.split_at(half);

        let l_a = msm(g_hi, x_lo)?;
        let l_t = msm(t_hi, x_lo)?;
        let l_u = msm(u_hi, x_lo)?;
        let r_a = msm(g_lo, x_hi)?;
        let r_t = msm(t_lo, x_hi)?;
        let r_u = msm(u_lo, x_hi)?;

        transcript.append_points(LABEL_LOOP, &[l_a, l_t, l_u, r_a, r_t, r_u]);
        let gamma: C::ScalarField = transcript.challenge_scalar(LABEL_GAMMA);
        let gamma_inv = gamma.inverse().ok_or(ProofError::ZeroChallenge)?;

        for i in 0..half {
            let x_hi_i = xs[half + i];
            xs[i] += gamma_inv * x_hi_i;
            let g_hi_i = gs[half + i];
            gs[i] += g_hi_i * gamma;
            let t_hi_i = ts[half + i];
            ts[i] += t_hi_i * gamma;
            let u_hi_i = us[half + i];
            us[i] += u_hi_i * gamma;
        }
        xs.truncate(half);
        gs.truncate(half);
        ts.truncate(half);
        us.truncate(half);

        l_as.push(l_a);
        l_ts.push(l_t);
        l_us.push(l_u);
        r_as.push(r_a);
        r_ts.push(r_t);
        r_us.push(r_u);
    }

    Ok(SameMultiscalarProof {
        b_a,
        b_t,
        b_u,
        l_as,
        l_ts,
        l_us,
        r_as,
        r_ts,
        r_us,
        x_final: xs[0],
    })
}

#[tracing::instrument(target = LOG_TARGET, skip_all)]
#[allow(clippy::too_many_arguments)]
pub fn verify<C: CurveGroup, R: RngCore>(
    proof: &SameMultiscalarProof<C>,
    gs: &[C::Affine],
    a_comm: &C,
    z_t: &C,
    z_u: &C,
    ts: &[C::Affine],
    us: &[C::Affine],
    transcript: &mut ProofTranscript,
    msm_accumulator: &mut MsmAccumulator<C>,
    rng: &mut R,
) -> Result<bool, ProofError> {
    let n = gs.len();
    if ts.len() != n || us.len() != n {
        return Err(ProofError::LengthMismatch {
            expected: n,
            actual: ts.len(),
        });
    }
    if !n.is_power_of_two() {
        return Err(ProofError::NotPowerOfTwo(n));
    }
    let rounds = n.trailing_zeros() as usize;
    if proof.l_as.len() != rounds
        || proof.l_ts.len() != rounds
        || proof.l_us.len() != rounds
        || proof.r_as.len() != rounds
        || proof.r_ts.len() != rounds
        || proof.r_us.len() != rounds
    {
        return Err(ProofError::LengthMismatch {
            expected: rounds,
            actual: proof.l_as.len(),
        });
    }

    transcript.append_points(LABEL_STEP1, &[*a_comm, *z_t, *z_u]);
    transcript.append_affines(LABEL_STEP1, ts);
    transcript.append_affines(LABEL_STEP1, us);
    transcript.append_points(LABEL_STEP1, &[proof.b_a, proof.b_t, proof.b_u]);
    let alpha: C::ScalarField = transcript.challenge_scalar(LABEL_ALPHA);

    let mut gammas: Vec<C::ScalarField> = Vec::with_capacity(rounds);
    for i in 0..rounds {
        transcript.append_points(
            LABEL_LOOP,
            &[
                proof.l_as[i],
                proof.l_ts[i],
                proof.l_us[i],
                proof.r_as[i],
                proof.r_ts[i],
                proof.r_us[i],
            ],
        );
        gammas.push(transcript.challenge_scalar(LABEL_GAMMA));
    }
    if gammas.iter().any(|gamma| gamma.is_zero()) {
        return Ok(false);
    }
    let mut gammas_inv = gammas.clone();
    batch_inversion(&mut gammas_inv);

    // Same-direction combiner: bit j of i selects gamma from round m-1-j.
    let mut s = vec![C::ScalarField::one(); n];
    for (i, s_i) in s.iter_mut().enumerate() {
        for j in 0..rounds {
            if i & (1 << j) != 0 {
                *s_i *= gammas[rounds - j - 1];
            }
        }
    }
    let x_times_s: Vec<C::ScalarField> = s.iter().map(|s_i| proof.x_final * s_i).collect();

    // One deferred equality per basis family.
    let ac_a = proof.b_a
        + *a_comm * alpha
        + msm_points(&proof.l_as, &gammas)?
        + msm_points(&proof.r_as, &gammas_inv)?;
    msm_accumulator.accumulate_check(&ac_a, &x_times_s, gs, rng)?;

    let ac_t = proof.b_t
        + *z_t * alpha
        + msm_points(&proof.l_ts, &gammas)?
        + msm_points(&proof.r_ts, &gammas_inv)?;
    msm_accumulator.accumulate_check(&ac_t, &x_times_s, ts, rng)?;

    let ac_u = proof.b_u
        + *z_u * alpha
        + msm_points(&proof.l_us, &gammas)?
        + msm_points(&proof.r_us, &gammas_inv)?;
    msm_accumulator.accumulate_check(&ac_u, &x_times_s, us, rng)?;

    Ok(true)
}
