//! Fiat-Shamir transcript for the shuffle argument and its sub-arguments.
//!
//! A thin wrapper over a merlin strobe. Points are absorbed in their
//! compressed affine encoding, scalars in their canonical field encoding, so
//! prover and verifier agree on the exact byte stream. Challenges are squeezed
//! as field-sized byte strings and rejection-sampled until they decode to a
//! canonical scalar; every returned challenge is re-absorbed under its own
//! label before being handed back.

use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::PrimeField;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::vec::Vec;

pub struct ProofTranscript {
    inner: merlin::Transcript,
}

impl ProofTranscript {
    pub fn new(label: &'static [u8]) -> Self {
        Self {
            inner: merlin::Transcript::new(label),
        }
    }

    fn append_message(&mut self, label: &'static [u8], message: &[u8]) {
        self.inner.append_message(label, message);
    }

    pub fn append_affine<A: AffineRepr>(&mut self, label: &'static [u8], point: &A) {
        let mut bytes = Vec::new();
        point.serialize_compressed(&mut bytes).unwrap();
        self.append_message(label, &bytes);
    }

    pub fn append_affines<A: AffineRepr>(&mut self, label: &'static [u8], points: &[A]) {
        for point in points {
            self.append_affine(label, point);
        }
    }

    /// Absorbs projective points after batch-normalizing them, so the bytes
    /// match an absorb of the equivalent affine points.
    pub fn append_points<C: CurveGroup>(&mut self, label: &'static [u8], points: &[C]) {
        self.append_affines(label, &C::normalize_batch(points));
    }

    pub fn append_scalar<F: PrimeField>(&mut self, label: &'static [u8], scalar: &F) {
        let mut bytes = Vec::new();
        scalar.serialize_compressed(&mut bytes).unwrap();
        self.append_message(label, &bytes);
    }

    pub fn append_scalars<F: PrimeField>(&mut self, label: &'static [u8], scalars: &[F]) {
        for scalar in scalars {
            self.append_scalar(label, scalar);
        }
    }

    /// Squeezes a challenge scalar. Non-canonical byte strings are rejected
    /// and the strobe is squeezed again, so the result is uniform over the
    /// field. The accepted challenge is absorbed back before returning.
    pub fn challenge_scalar<F: PrimeField>(&mut self, label: &'static [u8]) -> F {
        let mut bytes = vec![0u8; F::zero().compressed_size()];
        loop {
            self.inner.challenge_bytes(label, &mut bytes);
            if let Ok(challenge) = F::deserialize_compressed(&bytes[..]) {
                self.append_scalar(label, &challenge);
                return challenge;
            }
        }
    }

    pub fn challenge_scalars<F: PrimeField>(&mut self, label: &'static [u8], n: usize) -> Vec<F> {
        (0..n).map(|_| self.challenge_scalar(label)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bls12_381::{Fr, G1Projective};
    use ark_std::{test_rng, UniformRand};

    #[test]
    fn test_identical_transcripts_agree() {
        let mut rng = test_rng();
        let point = G1Projective::rand(&mut rng);
        let scalar = Fr::rand(&mut rng);

        let mut t1 = ProofTranscript::new(b"test");
        let mut t2 = ProofTranscript::new(b"test");
        t1.append_points(b"p", &[point]);
        t2.append_points(b"p", &[point]);
        t1.append_scalar(b"s", &scalar);
        t2.append_scalar(b"s", &scalar);

        let c1: Fr = t1.challenge_scalar(b"c");
        let c2: Fr = t2.challenge_scalar(b"c");
        assert_eq!(c1, c2);

        // Having absorbed the first challenge, both strobes stay in sync.
        let d1: Fr = t1.challenge_scalar(b"d");
        let d2: Fr = t2.challenge_scalar(b"d");
        assert_eq!(d1, d2);
    }

    #[test]
    fn test_diverging_absorbs_diverge() {
        let mut rng = test_rng();

        let mut t1 = ProofTranscript::new(b"test");
        let mut t2 = ProofTranscript::new(b"test");
        t1.append_scalar(b"s", &Fr::rand(&mut rng));
        t2.append_scalar(b"s", &Fr::rand(&mut rng));

        let c1: Fr = t1.challenge_scalar(b"c");
        let c2: Fr = t2.challenge_scalar(b"c");
        assert_ne!(c1, c2);
    }

    #[test]
    fn test_challenge_vector_length() {
        let mut transcript = ProofTranscript::new(b"test");
        let challenges: Vec<Fr> = transcript.challenge_scalars(b"c", 17);
        assert_eq!(challenges.len(), 17);
        // Successive squeezes under one label must all differ.
        for i in 0..challenges.len() {
            for j in i + 1..challenges.len() {
                assert_ne!(challenges[i], challenges[j]);
            }
        }
    }
}
