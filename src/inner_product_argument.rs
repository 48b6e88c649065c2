//! Inner-product argument with logarithmic proof size.
//!
//! Proves that commitments `C = <c, Gs>` and `D = <d, Gs'>` open to vectors
//! with `<c, d> = z`. The prover first masks the witness with blinders chosen
//! so the fold by `alpha` leaves no cross terms, then halves the vectors over
//! `log2(n)` rounds, folding bases and witnesses in place. The verifier never
//! materializes `Gs'`: the caller supplies the weight vector `us` with
//! `Gs'_i = us_i * Gs_i`, and both final equalities are deferred to the MSM
//! accumulator.

use crate::errors::ProofError;
use crate::msm_accumulator::MsmAccumulator;
use crate::transcript::ProofTranscript;
use crate::util::{generate_blinders, inner_product, msm, msm_points};
use ark_ec::CurveGroup;
use ark_ff::{batch_inversion, Field, One, PrimeField, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::rand::RngCore;
use ark_std::vec::Vec;

const LOG_TARGET: &str = "curdleproofs::inner_product_argument";

const LABEL_STEP1: &[u8] = b"ipa_step1";
const LABEL_ALPHA: &[u8] = b"ipa_alpha";
const LABEL_BETA: &[u8] = b"ipa_beta";
const LABEL_LOOP: &[u8] = b"ipa_loop";
const LABEL_GAMMA: &[u8] = b"ipa_gamma";

/// Prover-side bases. The verifier works from `Gs` and `us` alone.
pub struct InnerProductCrs<C: CurveGroup> {
    pub gs: Vec<C>,
    pub gs_prime: Vec<C>,
    pub h: C,
}

#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct InnerProductProof<C: CurveGroup> {
    pub b_c: C,
    pub b_d: C,
    pub l_cs: Vec<C>,
    pub l_ds: Vec<C>,
    pub r_cs: Vec<C>,
    pub r_ds: Vec<C>,
    pub c_final: C::ScalarField,
    pub d_final: C::ScalarField,
}

#[tracing::instrument(target = LOG_TARGET, skip_all)]
#[allow(clippy::too_many_arguments)]
pub fn prove<C: CurveGroup, R: RngCore>(
    crs: InnerProductCrs<C>,
    c_comm: &C,
    d_comm: &C,
    z: &C::ScalarField,
    mut cs: Vec<C::ScalarField>,
    mut ds: Vec<C::ScalarField>,
    transcript: &mut ProofTranscript,
    rng: &mut R,
) -> Result<InnerProductProof<C>, ProofError> {
    if cs.len() != ds.len() {
        return Err(ProofError::LengthMismatch {
            expected: cs.len(),
            actual: ds.len(),
        });
    }
    let n = cs.len();
    if !n.is_power_of_two() {
        return Err(ProofError::NotPowerOfTwo(n));
    }
    if n < 2 {
        return Err(ProofError::LengthMismatch {
            expected: 2,
            actual: n,
        });
    }
    if crs.gs.len() != n || crs.gs_prime.len() != n {
        return Err(ProofError::LengthMismatch {
            expected: n,
            actual: crs.gs.len(),
        });
    }

    // Step 1: blind the witness and fold it by alpha.
    let (rs_c, rs_d) = generate_ipa_blinders(&cs, &ds, rng)?;
    let b_c = msm_points(&crs.gs, &rs_c)?;
    let b_d = msm_points(&crs.gs_prime, &rs_d)?;

    transcript.append_points(LABEL_STEP1, &[*c_comm, *d_comm]);
    transcript.append_scalar(LABEL_STEP1, z);
    transcript.append_points(LABEL_STEP1, &[b_c, b_d]);
    let alpha: C::ScalarField = transcript.challenge_scalar(LABEL_ALPHA);
    let beta: C::ScalarField = transcript.challenge_scalar(LABEL_BETA);

    for i in 0..n {
        cs[i] = rs_c[i] + alpha * cs[i];
        ds[i] = rs_d[i] + alpha * ds[i];
    }
    let h_prime = crs.h * beta;

    // Step 2: halving rounds, folding witnesses and bases in place.
    let rounds = n.trailing_zeros() as usize;
    let mut gs = crs.gs;
    let mut gs_prime = crs.gs_prime;
    let mut l_cs = Vec::with_capacity(rounds);
    let mut l_ds = Vec::with_capacity(rounds);
    let mut r_cs = Vec::with_capacity(rounds);
    let mut r_ds = Vec::with_capacity(rounds);

    while cs.len() > 1 {
        let half = cs.len() / 2;
        let gs_affine = C::normalize_batch(&gs);
        let gs_prime_affine = C::normalize_batch(&gs_prime);
        let (c_lo, c_hi) = cs.split_at(half);
        let (d_lo, d_hi) = ds.split_at(half);
        let (g_lo, g_hi) = gs_affine.split_at(half);
        let (gp_lo, gp_hi) = gs_prime_affine.split_at(half);

        let l_c = msm(g_hi, c_lo)? + h_prime * inner_product(c_lo, d_hi)?;
        let l_d = msm(gp_lo, d_hi)?;
        let r_c = msm(g_lo, c_hi)? + h_prime * inner_product(c_hi, d_lo)?;
        let r_d = msm(gp_hi, d_lo)?;

        transcript.append_points(LABEL_LOOP, &[l_c, l_d, r_c, r_d]);
        let gamma: C::ScalarField = transcript.challenge_scalar(LABEL_GAMMA);
        let gamma_inv = gamma.inverse().ok_or(ProofError::ZeroChallenge)?;

        for i in 0..half {
            let c_hi_i = cs[half + i];
            let d_hi_i = ds[half + i];
            cs[i] += gamma_inv * c_hi_i;
            ds[i] += gamma * d_hi_i;
            let g_hi_i = gs[half + i];
            gs[i] += g_hi_i * gamma;
            let gp_hi_i = gs_prime[half + i];
            gs_prime[i] += gp_hi_i * gamma_inv;
        }
        cs.truncate(half);
        ds.truncate(half);
        gs.truncate(half);
        gs_prime.truncate(half);

        l_cs.push(l_c);
        l_ds.push(l_d);
        r_cs.push(r_c);
        r_ds.push(r_d);
    }

    Ok(InnerProductProof {
        b_c,
        b_d,
        l_cs,
        l_ds,
        r_cs,
        r_ds,
        c_final: cs[0],
        d_final: ds[0],
    })
}

/// Verifies against bases `gs` and weights `us` such that `Gs'_i = us_i * gs_i`.
/// Both closing equalities are handed to the MSM accumulator; a `true` result
/// is conditional on the accumulator verifying later.
#[tracing::instrument(target = LOG_TARGET, skip_all)]
#[allow(clippy::too_many_arguments)]
pub fn verify<C: CurveGroup, R: RngCore>(
    proof: &InnerProductProof<C>,
    gs: &[C::Affine],
    h: &C,
    c_comm: &C,
    d_comm: &C,
    z: &C::ScalarField,
    us: &[C::ScalarField],
    transcript: &mut ProofTranscript,
    msm_accumulator: &mut MsmAccumulator<C>,
    rng: &mut R,
) -> Result<bool, ProofError> {
    let n = gs.len();
    if !n.is_power_of_two() {
        return Err(ProofError::NotPowerOfTwo(n));
    }
    if us.len() != n {
        return Err(ProofError::LengthMismatch {
            expected: n,
            actual: us.len(),
        });
    }
    let rounds = n.trailing_zeros() as usize;
    if proof.l_cs.len() != rounds
        || proof.l_ds.len() != rounds
        || proof.r_cs.len() != rounds
        || proof.r_ds.len() != rounds
    {
        return Err(ProofError::LengthMismatch {
            expected: rounds,
            actual: proof.l_cs.len(),
        });
    }

    // Step 1: replay the prover's absorbs to recover the challenges.
    transcript.append_points(LABEL_STEP1, &[*c_comm, *d_comm]);
    transcript.append_scalar(LABEL_STEP1, z);
    transcript.append_points(LABEL_STEP1, &[proof.b_c, proof.b_d]);
    let alpha: C::ScalarField = transcript.challenge_scalar(LABEL_ALPHA);
    let beta: C::ScalarField = transcript.challenge_scalar(LABEL_BETA);

    let mut gammas: Vec<C::ScalarField> = Vec::with_capacity(rounds);
    for i in 0..rounds {
        transcript.append_points(
            LABEL_LOOP,
            &[proof.l_cs[i], proof.l_ds[i], proof.r_cs[i], proof.r_ds[i]],
        );
        gammas.push(transcript.challenge_scalar(LABEL_GAMMA));
    }
    if gammas.iter().any(|gamma| gamma.is_zero()) {
        return Ok(false);
    }
    let mut gammas_inv = gammas.clone();
    batch_inversion(&mut gammas_inv);

    // Step 2: combiner vectors. Bit j of i selects round m-1-j.
    let mut s = vec![C::ScalarField::one(); n];
    let mut s_prime = vec![C::ScalarField::one(); n];
    for i in 0..n {
        for j in 0..rounds {
            if i & (1 << j) != 0 {
                s[i] *= gammas[rounds - j - 1];
                s_prime[i] *= gammas_inv[rounds - j - 1];
            }
        }
    }

    // First deferred check, closing the C side:
    //   sum_j gamma_j L_C_j + B_c + alpha C + alpha^2 z (beta H)
    //     + sum_j gamma_j^{-1} R_C_j
    //   == sum_i (c_final s_i) Gs_i + (beta d_final c_final) H
    let ac_1 = msm_points(&proof.l_cs, &gammas)?
        + proof.b_c
        + *c_comm * alpha
        + *h * (beta * alpha.square() * *z)
        + msm_points(&proof.r_cs, &gammas_inv)?;
    let mut bases: Vec<C::Affine> = gs.to_vec();
    bases.push(h.into_affine());
    let mut scalars: Vec<C::ScalarField> = s.iter().map(|s_i| *s_i * proof.c_final).collect();
    scalars.push(beta * proof.d_final * proof.c_final);
    msm_accumulator.accumulate_check(&ac_1, &scalars, &bases, rng)?;

    // Second deferred check, closing the D side against the implicit Gs':
    //   sum_j gamma_j L_D_j + B_d + alpha D + sum_j gamma_j^{-1} R_D_j
    //   == sum_i (d_final s'_i us_i) Gs_i
    let ac_2 = msm_points(&proof.l_ds, &gammas)?
        + proof.b_d
        + *d_comm * alpha
        + msm_points(&proof.r_ds, &gammas_inv)?;
    let scalars: Vec<C::ScalarField> = s_prime
        .iter()
        .zip(us)
        .map(|(sp, u)| *sp * u * proof.d_final)
        .collect();
    msm_accumulator.accumulate_check(&ac_2, &scalars, gs, rng)?;

    Ok(true)
}

/// Draws the blinder vectors `(r, z)` for the alpha-fold.
///
/// They must satisfy `<r, d> + <z, c> = 0` and `<r, z> = 0` so that
/// `<r + alpha c, z + alpha d> = alpha^2 <c, d>`. Everything is sampled
/// uniformly except the last two entries of `z`, which solve the 2x2 linear
/// system those constraints induce (`omega` and `delta` collect the fixed
/// terms):
///
/// ```text
/// omega + z_{n-2} c_{n-2} + z_{n-1} c_{n-1} = 0
/// delta + z_{n-2} r_{n-2} + z_{n-1} r_{n-1} = 0
/// ```
///
/// Solving the first equation for `z_{n-2}` and substituting:
///
/// ```text
/// z_{n-1} = (r_{n-2} c_{n-2}^{-1} omega - delta)
///         / (r_{n-1} - r_{n-2} c_{n-2}^{-1} c_{n-1})
/// z_{n-2} = -c_{n-2}^{-1} (z_{n-1} c_{n-1} + omega)
/// ```
fn generate_ipa_blinders<F: PrimeField, R: RngCore>(
    cs: &[F],
    ds: &[F],
    rng: &mut R,
) -> Result<(Vec<F>, Vec<F>), ProofError> {
    let n = cs.len();
    let rs: Vec<F> = generate_blinders(rng, n);
    let mut zs: Vec<F> = generate_blinders(rng, n - 2);

    let omega = inner_product(&rs, ds)? + inner_product(&zs, &cs[..n - 2])?;
    let delta = inner_product(&rs[..n - 2], &zs)?;

    let inv_c = cs[n - 2].inverse().ok_or(ProofError::ZeroInverse)?;
    let denominator = rs[n - 1] - rs[n - 2] * inv_c * cs[n - 1];
    let denominator_inv = denominator.inverse().ok_or(ProofError::DegenerateBlinder)?;
    let last_z = (rs[n - 2] * inv_c * omega - delta) * denominator_inv;
    let penultimate_z = -(inv_c * (last_z * cs[n - 1] + omega));
    zs.push(penultimate_z);
    zs.push(last_z);

    debug_assert!((inner_product(&rs, ds)? + inner_product(&zs, cs)?).is_zero());
    debug_assert!(inner_product(&rs, &zs)?.is_zero());

    Ok((rs, zs))
}
