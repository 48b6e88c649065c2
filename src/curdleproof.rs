//! The outer shuffle argument.
//!
//! Relation: for secret `(permutation, k, r_m)`,
//!
//! ```text
//! ts[i] = k * rs[permutation[i]]
//! us[i] = k * ss[permutation[i]]
//! m     = <permutation, crs.gs> + <r_m, crs.hs>
//! ```
//!
//! The prover chains three sub-arguments over one transcript: a
//! same-permutation argument tying `m` to a freshly committed challenge
//! vector, a same-scalar sigma for `k`, and a same-multiscalar argument that
//! links everything to the shuffled outputs. The verifier replays the
//! transcript, lets the sub-verifiers feed one MSM accumulator, and settles
//! all deferred equalities in a single batched MSM.

use crate::crs::Crs;
use crate::errors::ProofError;
use crate::group_commitment::GroupCommitment;
use crate::msm_accumulator::MsmAccumulator;
use crate::same_multiscalar_argument::{self, SameMultiscalarProof};
use crate::same_permutation_argument::{self, SamePermutationProof};
use crate::same_scalar_argument::{self, SameScalarProof};
use crate::transcript::ProofTranscript;
use crate::util::{generate_blinders, msm, permute_vector};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::Zero;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::rand::RngCore;
use ark_std::vec::Vec;
use ark_std::UniformRand;

const LOG_TARGET: &str = "curdleproofs::curdleproof";

/// Number of blinder bases `hs` in the CRS. Two of them are reserved for the
/// merged same-multiscalar instance, so commitment `A` only blinds over the
/// first two.
pub const N_BLINDERS: usize = 4;

const LABEL_DOMAIN: &[u8] = b"curdleproofs";
const LABEL_STEP1: &[u8] = b"curdleproofs_step1";
const LABEL_VEC_A: &[u8] = b"curdleproofs_vec_a";

#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct CurdleproofsProof<C: CurveGroup> {
    pub a_comm: C,
    pub cm_t: GroupCommitment<C>,
    pub cm_u: GroupCommitment<C>,
    pub r_comm: C,
    pub s_comm: C,
    pub same_permutation_proof: SamePermutationProof<C>,
    pub same_scalar_proof: SameScalarProof<C>,
    pub same_multiscalar_proof: SameMultiscalarProof<C>,
}

fn check_shuffle_lengths<C: CurveGroup>(
    crs: &Crs<C>,
    vec_r: &[C::Affine],
    vec_s: &[C::Affine],
    vec_t: &[C::Affine],
    vec_u: &[C::Affine],
) -> Result<usize, ProofError> {
    let ell = vec_r.len();
    for len in [vec_s.len(), vec_t.len(), vec_u.len(), crs.gs.len()] {
        if len != ell {
            return Err(ProofError::LengthMismatch {
                expected: ell,
                actual: len,
            });
        }
    }
    if crs.hs.len() != N_BLINDERS {
        return Err(ProofError::LengthMismatch {
            expected: N_BLINDERS,
            actual: crs.hs.len(),
        });
    }
    if !(ell + N_BLINDERS).is_power_of_two() {
        return Err(ProofError::NotPowerOfTwo(ell + N_BLINDERS));
    }
    Ok(ell)
}

#[tracing::instrument(target = LOG_TARGET, skip_all)]
#[allow(clippy::too_many_arguments)]
pub fn prove<C: CurveGroup, R: RngCore>(
    crs: &Crs<C>,
    vec_r: &[C::Affine],
    vec_s: &[C::Affine],
    vec_t: &[C::Affine],
    vec_u: &[C::Affine],
    m_comm: &C,
    permutation: &[u32],
    k: &C::ScalarField,
    r_ms: &[C::ScalarField],
    rng: &mut R,
) -> Result<CurdleproofsProof<C>, ProofError> {
    let ell = check_shuffle_lengths(crs, vec_r, vec_s, vec_t, vec_u)?;
    if permutation.len() != ell {
        return Err(ProofError::LengthMismatch {
            expected: ell,
            actual: permutation.len(),
        });
    }
    if r_ms.len() != N_BLINDERS {
        return Err(ProofError::LengthMismatch {
            expected: N_BLINDERS,
            actual: r_ms.len(),
        });
    }

    let mut transcript = ProofTranscript::new(LABEL_DOMAIN);

    // Step 1: bind the whole instance, then squeeze the challenge vector.
    transcript.append_affines(LABEL_STEP1, vec_r);
    transcript.append_affines(LABEL_STEP1, vec_s);
    transcript.append_affines(LABEL_STEP1, vec_t);
    transcript.append_affines(LABEL_STEP1, vec_u);
    transcript.append_points(LABEL_STEP1, &[*m_comm]);
    let vec_a: Vec<C::ScalarField> = transcript.challenge_scalars(LABEL_VEC_A, ell);

    // Step 2: commit to the permuted challenge vector. The last two blinder
    // slots stay zero so `A` lines up with the merged instance of step 4.
    let r_as: Vec<C::ScalarField> = generate_blinders(rng, N_BLINDERS - 2);
    let mut r_as_padded = r_as.clone();
    r_as_padded.resize(N_BLINDERS, C::ScalarField::zero());

    let permuted_a = permute_vector(&vec_a, permutation);
    let a_comm = msm(&crs.gs, &permuted_a)? + msm(&crs.hs, &r_as_padded)?;

    let same_permutation_proof = same_permutation_argument::prove(
        &crs.gs,
        &crs.hs,
        &crs.h,
        &a_comm,
        m_comm,
        &vec_a,
        permutation,
        &r_as_padded,
        r_ms,
        &mut transcript,
        rng,
    )?;

    // Step 3: commit to `k` applied to the challenge-weighted inputs.
    let r_t = C::ScalarField::rand(rng);
    let r_u = C::ScalarField::rand(rng);
    let r_comm = msm(vec_r, &vec_a)?;
    let s_comm = msm(vec_s, &vec_a)?;
    let cm_t = GroupCommitment::new(&crs.g_t, &crs.h, &(r_comm * *k), &r_t);
    let cm_u = GroupCommitment::new(&crs.g_u, &crs.h, &(s_comm * *k), &r_u);

    let same_scalar_proof = same_scalar_argument::prove(
        &crs.g_t,
        &crs.g_u,
        &crs.h,
        &r_comm,
        &s_comm,
        &cm_t,
        &cm_u,
        k,
        &r_t,
        &r_u,
        &mut transcript,
        rng,
    );

    // Step 4: the merged multiscalar instance over
    //   gs || hs[..2] || g_t || g_u,
    // with `h` spliced into the output bases at the commitment slots.
    let a_prime = a_comm + cm_t.t_1 + cm_u.t_1;

    let mut gs_prime: Vec<C> = crs.gs.iter().map(|p| p.into_group()).collect();
    gs_prime.extend(crs.hs[..N_BLINDERS - 2].iter().map(|p| p.into_group()));
    gs_prime.push(crs.g_t);
    gs_prime.push(crs.g_u);

    let mut ts_prime: Vec<C> = vec_t.iter().map(|p| p.into_group()).collect();
    ts_prime.extend([C::zero(), C::zero(), crs.h, C::zero()]);

    let mut us_prime: Vec<C> = vec_u.iter().map(|p| p.into_group()).collect();
    us_prime.extend([C::zero(), C::zero(), C::zero(), crs.h]);

    let mut xs = permuted_a;
    xs.extend(r_as);
    xs.push(r_t);
    xs.push(r_u);

    let same_multiscalar_proof = same_multiscalar_argument::prove(
        gs_prime,
        &a_prime,
        &cm_t.t_2,
        &cm_u.t_2,
        ts_prime,
        us_prime,
        xs,
        &mut transcript,
        rng,
    )?;

    Ok(CurdleproofsProof {
        a_comm,
        cm_t,
        cm_u,
        r_comm,
        s_comm,
        same_permutation_proof,
        same_scalar_proof,
        same_multiscalar_proof,
    })
}

#[tracing::instrument(target = LOG_TARGET, skip_all)]
#[allow(clippy::too_many_arguments)]
pub fn verify<C: CurveGroup, R: RngCore>(
    proof: &CurdleproofsProof<C>,
    crs: &Crs<C>,
    vec_r: &[C::Affine],
    vec_s: &[C::Affine],
    vec_t: &[C::Affine],
    vec_u: &[C::Affine],
    m_comm: &C,
    rng: &mut R,
) -> Result<bool, ProofError> {
    let ell = check_shuffle_lengths(crs, vec_r, vec_s, vec_t, vec_u)?;

    // A zero randomizer `k` would wipe out every ciphertext.
    if vec_t[0].is_zero() {
        return Ok(false);
    }

    let mut transcript = ProofTranscript::new(LABEL_DOMAIN);
    let mut msm_accumulator = MsmAccumulator::new();

    // Step 1
    transcript.append_affines(LABEL_STEP1, vec_r);
    transcript.append_affines(LABEL_STEP1, vec_s);
    transcript.append_affines(LABEL_STEP1, vec_t);
    transcript.append_affines(LABEL_STEP1, vec_u);
    transcript.append_points(LABEL_STEP1, &[*m_comm]);
    let vec_a: Vec<C::ScalarField> = transcript.challenge_scalars(LABEL_VEC_A, ell);

    // Step 2
    if !same_permutation_argument::verify(
        &proof.same_permutation_proof,
        &crs.gs,
        &crs.hs,
        &crs.h,
        &crs.g_sum,
        &crs.h_sum,
        &proof.a_comm,
        m_comm,
        &vec_a,
        N_BLINDERS,
        &mut transcript,
        &mut msm_accumulator,
        rng,
    )? {
        return Ok(false);
    }

    // Step 3
    if !same_scalar_argument::verify(
        &proof.same_scalar_proof,
        &crs.g_t,
        &crs.g_u,
        &crs.h,
        &proof.r_comm,
        &proof.s_comm,
        &proof.cm_t,
        &proof.cm_u,
        &mut transcript,
    ) {
        return Ok(false);
    }

    // Step 4
    let a_prime = proof.a_comm + proof.cm_t.t_1 + proof.cm_u.t_1;
    let h_affine = crs.h.into_affine();

    let mut gs_prime: Vec<C::Affine> = crs.gs.clone();
    gs_prime.extend_from_slice(&crs.hs[..N_BLINDERS - 2]);
    gs_prime.extend(C::normalize_batch(&[crs.g_t, crs.g_u]));

    let mut ts_prime: Vec<C::Affine> = vec_t.to_vec();
    ts_prime.extend([
        C::Affine::zero(),
        C::Affine::zero(),
        h_affine,
        C::Affine::zero(),
    ]);

    let mut us_prime: Vec<C::Affine> = vec_u.to_vec();
    us_prime.extend([
        C::Affine::zero(),
        C::Affine::zero(),
        C::Affine::zero(),
        h_affine,
    ]);

    if !same_multiscalar_argument::verify(
        &proof.same_multiscalar_proof,
        &gs_prime,
        &a_prime,
        &proof.cm_t.t_2,
        &proof.cm_u.t_2,
        &ts_prime,
        &us_prime,
        &mut transcript,
        &mut msm_accumulator,
        rng,
    )? {
        return Ok(false);
    }

    // The claimed challenge-weighted inputs must match the instance.
    msm_accumulator.accumulate_check(&proof.r_comm, &vec_a, vec_r, rng)?;
    msm_accumulator.accumulate_check(&proof.s_comm, &vec_a, vec_s, rng)?;

    msm_accumulator.verify()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::{generate_permutation, shuffle_permute_commit};
    use ark_bls12_381::{Fr, G1Affine, G1Projective};
    use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
    use ark_std::UniformRand;
    use rand::{rngs::StdRng, SeedableRng};

    struct ShuffleInstance {
        crs: Crs<G1Projective>,
        vec_r: Vec<G1Affine>,
        vec_s: Vec<G1Affine>,
        vec_t: Vec<G1Affine>,
        vec_u: Vec<G1Affine>,
        m_comm: G1Projective,
        permutation: Vec<u32>,
        k: Fr,
        r_ms: Vec<Fr>,
    }

    fn setup(ell: usize, crs_seed: u64, perm_seed: u64) -> ShuffleInstance {
        let mut rng = StdRng::seed_from_u64(crs_seed);
        let crs = Crs::<G1Projective>::generate(ell, &mut rng);

        let mut perm_rng = StdRng::seed_from_u64(perm_seed);
        let permutation = generate_permutation(ell, &mut perm_rng);

        let k = Fr::rand(&mut rng);
        let vec_r: Vec<G1Affine> = (0..ell)
            .map(|_| G1Projective::rand(&mut rng).into_affine())
            .collect();
        let vec_s: Vec<G1Affine> = (0..ell)
            .map(|_| G1Projective::rand(&mut rng).into_affine())
            .collect();

        let (vec_t, vec_u, m_comm, r_ms) = shuffle_permute_commit::<G1Projective, _>(
            &crs.gs,
            &crs.hs,
            &vec_r,
            &vec_s,
            &permutation,
            &k,
            &mut rng,
        )
        .unwrap();

        ShuffleInstance {
            crs,
            vec_r,
            vec_s,
            vec_t,
            vec_u,
            m_comm,
            permutation,
            k,
            r_ms,
        }
    }

    fn prove_instance(instance: &ShuffleInstance, seed: u64) -> CurdleproofsProof<G1Projective> {
        let mut rng = StdRng::seed_from_u64(seed);
        prove(
            &instance.crs,
            &instance.vec_r,
            &instance.vec_s,
            &instance.vec_t,
            &instance.vec_u,
            &instance.m_comm,
            &instance.permutation,
            &instance.k,
            &instance.r_ms,
            &mut rng,
        )
        .unwrap()
    }

    #[test]
    fn test_completeness() {
        // ell = 60 gives the recursive arguments n = 64.
        let instance = setup(60, 0, 42);
        let proof = prove_instance(&instance, 0);

        let mut rng = StdRng::seed_from_u64(0);
        assert!(verify(
            &proof,
            &instance.crs,
            &instance.vec_r,
            &instance.vec_s,
            &instance.vec_t,
            &instance.vec_u,
            &instance.m_comm,
            &mut rng,
        )
        .unwrap());

        // The verifier's randomness only weights the accumulator; an honest
        // proof verifies under any seed.
        let mut rng = StdRng::seed_from_u64(43);
        assert!(verify(
            &proof,
            &instance.crs,
            &instance.vec_r,
            &instance.vec_s,
            &instance.vec_t,
            &instance.vec_u,
            &instance.m_comm,
            &mut rng,
        )
        .unwrap());
    }

    #[test]
    fn test_completeness_minimal_and_identity() {
        // Smallest useful instance: ell = 4, n = 8.
        let instance = setup(4, 1, 2);
        let proof = prove_instance(&instance, 3);
        let mut rng = StdRng::seed_from_u64(4);
        assert!(verify(
            &proof,
            &instance.crs,
            &instance.vec_r,
            &instance.vec_s,
            &instance.vec_t,
            &instance.vec_u,
            &instance.m_comm,
            &mut rng,
        )
        .unwrap());

        // Identity permutation is a valid shuffle.
        let mut instance = setup(12, 5, 6);
        instance.permutation = (0..12u32).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let (vec_t, vec_u, m_comm, r_ms) = shuffle_permute_commit::<G1Projective, _>(
            &instance.crs.gs,
            &instance.crs.hs,
            &instance.vec_r,
            &instance.vec_s,
            &instance.permutation,
            &instance.k,
            &mut rng,
        )
        .unwrap();
        instance.vec_t = vec_t;
        instance.vec_u = vec_u;
        instance.m_comm = m_comm;
        instance.r_ms = r_ms;

        let proof = prove_instance(&instance, 8);
        let mut rng = StdRng::seed_from_u64(9);
        assert!(verify(
            &proof,
            &instance.crs,
            &instance.vec_r,
            &instance.vec_s,
            &instance.vec_t,
            &instance.vec_u,
            &instance.m_comm,
            &mut rng,
        )
        .unwrap());
    }

    #[test]
    fn test_deterministic_prover() {
        let instance = setup(12, 10, 11);
        let proof_1 = prove_instance(&instance, 7);
        let proof_2 = prove_instance(&instance, 7);
        assert_eq!(proof_1, proof_2);
    }

    #[test]
    fn test_proof_serialization_round_trip() {
        let instance = setup(12, 12, 13);
        let proof = prove_instance(&instance, 14);

        let mut bytes = Vec::new();
        proof.serialize_compressed(&mut bytes).unwrap();
        let decoded =
            CurdleproofsProof::<G1Projective>::deserialize_compressed(&bytes[..]).unwrap();
        assert_eq!(proof, decoded);
    }

    #[test]
    fn test_soundness() {
        // ell = 124 gives n = 128, the production size.
        let instance = setup(124, 0, 42);
        let proof = prove_instance(&instance, 0);
        let mut rng = StdRng::seed_from_u64(0);

        // Flipped input vectors.
        assert!(!verify(
            &proof,
            &instance.crs,
            &instance.vec_s,
            &instance.vec_r,
            &instance.vec_t,
            &instance.vec_u,
            &instance.m_comm,
            &mut rng,
        )
        .unwrap());

        // Outputs permuted by a different permutation than the one proved.
        let mut perm_rng = StdRng::seed_from_u64(99);
        let another_permutation = generate_permutation(124, &mut perm_rng);
        assert!(!verify(
            &proof,
            &instance.crs,
            &instance.vec_r,
            &instance.vec_s,
            &permute_vector(&instance.vec_t, &another_permutation),
            &permute_vector(&instance.vec_u, &another_permutation),
            &instance.m_comm,
            &mut rng,
        )
        .unwrap());

        // Tampered permutation commitment.
        let touched_m = instance.m_comm * instance.k;
        assert!(!verify(
            &proof,
            &instance.crs,
            &instance.vec_r,
            &instance.vec_s,
            &instance.vec_t,
            &instance.vec_u,
            &touched_m,
            &mut rng,
        )
        .unwrap());

        // Outputs re-randomized with a second scalar.
        let another_k = Fr::rand(&mut rng);
        let rerandomize = |points: &[G1Affine]| {
            G1Projective::normalize_batch(
                &points
                    .iter()
                    .map(|p| p.into_group() * another_k)
                    .collect::<Vec<_>>(),
            )
        };
        assert!(!verify(
            &proof,
            &instance.crs,
            &instance.vec_r,
            &instance.vec_s,
            &rerandomize(&instance.vec_t),
            &rerandomize(&instance.vec_u),
            &instance.m_comm,
            &mut rng,
        )
        .unwrap());
    }

    #[test]
    fn test_zero_randomizer_rejected() {
        let instance = setup(12, 20, 21);
        let proof = prove_instance(&instance, 22);

        let mut vec_t = instance.vec_t.clone();
        vec_t[0] = G1Affine::zero();
        let mut rng = StdRng::seed_from_u64(23);
        assert!(!verify(
            &proof,
            &instance.crs,
            &instance.vec_r,
            &instance.vec_s,
            &vec_t,
            &instance.vec_u,
            &instance.m_comm,
            &mut rng,
        )
        .unwrap());
    }

    #[test]
    fn test_length_mismatch_is_an_error() {
        let instance = setup(12, 30, 31);
        let proof = prove_instance(&instance, 32);
        let mut rng = StdRng::seed_from_u64(33);
        let result = verify(
            &proof,
            &instance.crs,
            &instance.vec_r[..11],
            &instance.vec_s,
            &instance.vec_t,
            &instance.vec_u,
            &instance.m_comm,
            &mut rng,
        );
        assert!(result.is_err());
    }
}
