use thiserror::Error;

/// Protocol-level failures shared by the prover and the verifier.
///
/// Verifiers only surface the malformed-input variants (`LengthMismatch`,
/// `NotPowerOfTwo`, `Serialization`); an invalid-but-well-formed proof is
/// reported as `Ok(false)`, never as an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    #[error("vector length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("recursive argument needs a power-of-two size, got {0}")]
    NotPowerOfTwo(usize),

    #[error("squeezed challenge is zero")]
    ZeroChallenge,

    #[error("scalar has no inverse")]
    ZeroInverse,

    #[error("blinder linear system is degenerate, retry with fresh randomness")]
    DegenerateBlinder,

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<ark_serialize::SerializationError> for ProofError {
    fn from(err: ark_serialize::SerializationError) -> Self {
        ProofError::Serialization(err.to_string())
    }
}
