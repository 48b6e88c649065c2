//! Grand-product argument: a committed vector `b` multiplies out to a public
//! `result`.
//!
//! The prover commits to the prefix products of `b` and reduces the product
//! claim to one inner-product instance over `beta`-weighted vectors. The
//! basis weighting telescopes on the verifier side: `D` collapses to
//! `B - beta^{-1} Gsum + alpha Hsum`, so the verifier only touches the
//! precomputed CRS sums and never scales a basis.

use crate::errors::ProofError;
use crate::inner_product_argument::{self, InnerProductCrs, InnerProductProof};
use crate::msm_accumulator::MsmAccumulator;
use crate::transcript::ProofTranscript;
use crate::util::{generate_blinders, inner_product, msm, sum_affine_points};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{Field, One, PrimeField, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::rand::RngCore;
use ark_std::vec::Vec;

const LOG_TARGET: &str = "curdleproofs::grand_product_argument";

const LABEL_STEP1: &[u8] = b"gprod_step1";
const LABEL_STEP2: &[u8] = b"gprod_step2";
const LABEL_ALPHA: &[u8] = b"gprod_alpha";
const LABEL_BETA: &[u8] = b"gprod_beta";

#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct GrandProductProof<C: CurveGroup> {
    pub c_comm: C,
    pub r_p: C::ScalarField,
    pub inner_product_proof: InnerProductProof<C>,
}

/// Proves `b_comm = <bs, gs> + <r_bs, hs>` with `prod_i bs[i] = result`.
#[tracing::instrument(target = LOG_TARGET, skip_all)]
#[allow(clippy::too_many_arguments)]
pub fn prove<C: CurveGroup, R: RngCore>(
    gs: &[C::Affine],
    hs: &[C::Affine],
    h: &C,
    b_comm: &C,
    result: &C::ScalarField,
    bs: &[C::ScalarField],
    r_bs: &[C::ScalarField],
    transcript: &mut ProofTranscript,
    rng: &mut R,
) -> Result<GrandProductProof<C>, ProofError> {
    let ell = gs.len();
    let n_blinders = hs.len();
    if bs.len() != ell {
        return Err(ProofError::LengthMismatch {
            expected: ell,
            actual: bs.len(),
        });
    }
    if r_bs.len() != n_blinders {
        return Err(ProofError::LengthMismatch {
            expected: n_blinders,
            actual: r_bs.len(),
        });
    }

    // Step 1
    transcript.append_points(LABEL_STEP1, &[*b_comm]);
    transcript.append_scalar(LABEL_STEP1, result);
    let alpha: C::ScalarField = transcript.challenge_scalar(LABEL_ALPHA);

    // Step 2: prefix products c_0 = 1, c_i = b_0 * .. * b_{i-1}, and a
    // blinded commitment to them.
    let mut cs: Vec<C::ScalarField> = Vec::with_capacity(ell);
    cs.push(C::ScalarField::one());
    for i in 1..ell {
        let prev = cs[i - 1] * bs[i - 1];
        cs.push(prev);
    }
    let r_cs: Vec<C::ScalarField> = generate_blinders(rng, n_blinders);
    let c_comm = msm(gs, &cs)? + msm(hs, &r_cs)?;

    let r_bs_shifted: Vec<C::ScalarField> = r_bs.iter().map(|r| *r + alpha).collect();
    let r_p = inner_product(&r_bs_shifted, &r_cs)?;

    transcript.append_points(LABEL_STEP2, &[c_comm]);
    transcript.append_scalar(LABEL_STEP2, &r_p);
    let beta: C::ScalarField = transcript.challenge_scalar(LABEL_BETA);
    if beta.is_zero() {
        return Err(ProofError::ZeroChallenge);
    }
    let beta_inv = beta.inverse().ok_or(ProofError::ZeroChallenge)?;

    // Step 3: the beta-weighted inner-product witness.
    //   d_i      = b_i beta^{i+1} - beta^i          for i < ell
    //   d_{ell+j} = beta^{ell+1} (r_bs[j] + alpha)  for the blinder slots
    let mut ds: Vec<C::ScalarField> = Vec::with_capacity(ell + n_blinders);
    let mut beta_pow = beta;
    let mut prev_pow = C::ScalarField::one();
    for b_i in bs {
        ds.push(*b_i * beta_pow - prev_pow);
        prev_pow = beta_pow;
        beta_pow *= beta;
    }
    let beta_ell = prev_pow;
    let beta_ell_plus_1 = beta_pow;
    for r in &r_bs_shifted {
        ds.push(beta_ell_plus_1 * *r);
    }

    // Primed bases gs'_i = beta^{-(i+1)} gs_i, hs'_j = beta^{-(ell+1)} hs_j.
    let mut gs_prime: Vec<C> = Vec::with_capacity(ell + n_blinders);
    let mut beta_inv_pow = beta_inv;
    for g in gs {
        gs_prime.push(g.mul_bigint(beta_inv_pow.into_bigint()));
        beta_inv_pow *= beta_inv;
    }
    let beta_inv_ell_plus_1 = beta_inv_pow;
    for h_base in hs {
        gs_prime.push(h_base.mul_bigint(beta_inv_ell_plus_1.into_bigint()));
    }

    let z = r_p * beta_ell_plus_1 + *result * beta_ell - C::ScalarField::one();

    let mut c_ext = cs;
    c_ext.extend_from_slice(&r_cs);

    // The weighting telescopes, leaving D in terms of the basis sums.
    let d_comm =
        *b_comm - sum_affine_points::<C>(gs) * beta_inv + sum_affine_points::<C>(hs) * alpha;

    debug_assert_eq!(inner_product(&c_ext, &ds)?, z);
    debug_assert_eq!(crate::util::msm_points(&gs_prime, &ds)?, d_comm);

    let ipa_crs = InnerProductCrs {
        gs: gs
            .iter()
            .chain(hs)
            .map(|p| p.into_group())
            .collect(),
        gs_prime,
        h: *h,
    };
    let inner_product_proof = inner_product_argument::prove(
        ipa_crs, &c_comm, &d_comm, &z, c_ext, ds, transcript, rng,
    )?;

    Ok(GrandProductProof {
        c_comm,
        r_p,
        inner_product_proof,
    })
}

#[tracing::instrument(target = LOG_TARGET, skip_all)]
#[allow(clippy::too_many_arguments)]
pub fn verify<C: CurveGroup, R: RngCore>(
    proof: &GrandProductProof<C>,
    gs: &[C::Affine],
    hs: &[C::Affine],
    h: &C,
    g_sum: &C::Affine,
    h_sum: &C::Affine,
    b_comm: &C,
    result: &C::ScalarField,
    n_blinders: usize,
    transcript: &mut ProofTranscript,
    msm_accumulator: &mut MsmAccumulator<C>,
    rng: &mut R,
) -> Result<bool, ProofError> {
    let ell = gs.len();
    if hs.len() != n_blinders {
        return Err(ProofError::LengthMismatch {
            expected: n_blinders,
            actual: hs.len(),
        });
    }

    // Steps 1-2: replay the absorbs.
    transcript.append_points(LABEL_STEP1, &[*b_comm]);
    transcript.append_scalar(LABEL_STEP1, result);
    let alpha: C::ScalarField = transcript.challenge_scalar(LABEL_ALPHA);
    transcript.append_points(LABEL_STEP2, &[proof.c_comm]);
    transcript.append_scalar(LABEL_STEP2, &proof.r_p);
    let beta: C::ScalarField = transcript.challenge_scalar(LABEL_BETA);
    if beta.is_zero() {
        return Ok(false);
    }
    let beta_inv = beta.inverse().ok_or(ProofError::ZeroChallenge)?;

    // Step 3: weights us_i = beta^{-(i+1)}, blinder slots beta^{-(ell+1)}.
    let mut us: Vec<C::ScalarField> = Vec::with_capacity(ell + n_blinders);
    let mut beta_inv_pow = beta_inv;
    for _ in 0..ell {
        us.push(beta_inv_pow);
        beta_inv_pow *= beta_inv;
    }
    for _ in 0..n_blinders {
        us.push(beta_inv_pow);
    }

    let beta_ell = beta.pow([ell as u64]);
    let beta_ell_plus_1 = beta_ell * beta;
    let z = proof.r_p * beta_ell_plus_1 + *result * beta_ell - C::ScalarField::one();
    let d_comm = *b_comm - g_sum.mul_bigint(beta_inv.into_bigint())
        + h_sum.mul_bigint(alpha.into_bigint());

    let ipa_gs: Vec<C::Affine> = gs.iter().chain(hs).copied().collect();
    inner_product_argument::verify(
        &proof.inner_product_proof,
        &ipa_gs,
        h,
        &proof.c_comm,
        &d_comm,
        &z,
        &us,
        transcript,
        msm_accumulator,
        rng,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curdleproof::N_BLINDERS;
    use ark_bls12_381::{Fr, G1Affine, G1Projective};
    use ark_std::{test_rng, UniformRand};

    struct TestInstance {
        gs: Vec<G1Affine>,
        hs: Vec<G1Affine>,
        h: G1Projective,
        b_comm: G1Projective,
        result: Fr,
        bs: Vec<Fr>,
        r_bs: Vec<Fr>,
    }

    fn setup(ell: usize, rng: &mut impl RngCore) -> TestInstance {
        let gs: Vec<G1Affine> = (0..ell)
            .map(|_| G1Projective::rand(rng).into_affine())
            .collect();
        let hs: Vec<G1Affine> = (0..N_BLINDERS)
            .map(|_| G1Projective::rand(rng).into_affine())
            .collect();
        let h = G1Projective::rand(rng);

        let bs: Vec<Fr> = (0..ell).map(|_| Fr::rand(rng)).collect();
        let r_bs: Vec<Fr> = (0..N_BLINDERS).map(|_| Fr::rand(rng)).collect();
        let result = bs.iter().fold(Fr::one(), |acc, b| acc * b);
        let b_comm = msm(&gs, &bs).unwrap() + msm(&hs, &r_bs).unwrap();

        TestInstance {
            gs,
            hs,
            h,
            b_comm,
            result,
            bs,
            r_bs,
        }
    }

    fn verify_instance(
        instance: &TestInstance,
        proof: &GrandProductProof<G1Projective>,
        result: &Fr,
        b_comm: &G1Projective,
        rng: &mut impl RngCore,
    ) -> bool {
        let g_sum = sum_affine_points::<G1Projective>(&instance.gs).into_affine();
        let h_sum = sum_affine_points::<G1Projective>(&instance.hs).into_affine();
        let mut transcript = ProofTranscript::new(b"gprod");
        let mut msm_accumulator = MsmAccumulator::new();
        let ok = verify(
            proof,
            &instance.gs,
            &instance.hs,
            &instance.h,
            &g_sum,
            &h_sum,
            b_comm,
            result,
            N_BLINDERS,
            &mut transcript,
            &mut msm_accumulator,
            rng,
        )
        .unwrap();
        ok && msm_accumulator.verify().unwrap()
    }

    #[test]
    fn test_completeness() {
        let mut rng = test_rng();
        for ell in [4usize, 12] {
            let instance = setup(ell, &mut rng);
            let mut transcript = ProofTranscript::new(b"gprod");
            let proof = prove(
                &instance.gs,
                &instance.hs,
                &instance.h,
                &instance.b_comm,
                &instance.result,
                &instance.bs,
                &instance.r_bs,
                &mut transcript,
                &mut rng,
            )
            .unwrap();

            assert!(verify_instance(
                &instance,
                &proof,
                &instance.result,
                &instance.b_comm,
                &mut rng
            ));
        }
    }

    #[test]
    fn test_wrong_product_rejected() {
        let mut rng = test_rng();
        let instance = setup(4, &mut rng);
        let mut transcript = ProofTranscript::new(b"gprod");
        let proof = prove(
            &instance.gs,
            &instance.hs,
            &instance.h,
            &instance.b_comm,
            &instance.result,
            &instance.bs,
            &instance.r_bs,
            &mut transcript,
            &mut rng,
        )
        .unwrap();

        let bad_result = instance.result + Fr::one();
        assert!(!verify_instance(
            &instance,
            &proof,
            &bad_result,
            &instance.b_comm,
            &mut rng
        ));
    }

    #[test]
    fn test_tampered_commitment_rejected() {
        let mut rng = test_rng();
        let instance = setup(4, &mut rng);
        let mut transcript = ProofTranscript::new(b"gprod");
        let proof = prove(
            &instance.gs,
            &instance.hs,
            &instance.h,
            &instance.b_comm,
            &instance.result,
            &instance.bs,
            &instance.r_bs,
            &mut transcript,
            &mut rng,
        )
        .unwrap();

        let bad_comm = instance.b_comm * Fr::rand(&mut rng);
        assert!(!verify_instance(
            &instance,
            &proof,
            &instance.result,
            &bad_comm,
            &mut rng
        ));
    }
}
