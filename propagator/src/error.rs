use derive_more::Display;
use tleproto::ElementsError;

/// Why a propagated state was refused as physically invalid
#[derive(Copy, Clone, PartialEq, Debug, Display)]
pub enum DecayReason {
    #[display(fmt = "mean perigee height {:.1} km", "_0")]
    PerigeeBelowMinimum(f64),
    #[display(fmt = "drag drove mean eccentricity to {}", "_0")]
    EccentricityCollapse(f64),
    #[display(fmt = "mean motion is no longer positive")]
    MeanMotionCollapse,
    #[display(fmt = "semi-latus rectum is negative")]
    NegativeSemiLatusRectum,
    #[display(fmt = "position radius {:.1} km is below the surface", "_0")]
    Subsurface(f64),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropagationError {
    #[error("Kepler's equation did not converge after {iterations} iterations (last correction {correction:e} rad)")]
    Convergence { iterations: usize, correction: f64 },
    #[error("Object has decayed at {minutes_since_epoch:.3} min from epoch: {reason}")]
    Decay {
        reason: DecayReason,
        minutes_since_epoch: f64,
    },
    #[error("Propagated {element} out of range: {value}")]
    Range { element: &'static str, value: f64 },
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
pub enum OrbitErrorKind {
    Format,
    Checksum,
    Range,
    Convergence,
    Decay,
}

/// Everything that can go wrong between element text and a position fix
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrbitError {
    #[error("TLE line {line} is malformed: {reason}")]
    Format { line: u8, reason: String },
    #[error("TLE line {line} checksum mismatch (expected {expected}, computed {computed})")]
    Checksum { line: u8, expected: u8, computed: u8 },
    #[error("{field} out of range: {value}")]
    Range { field: &'static str, value: f64 },
    #[error("Kepler's equation did not converge after {iterations} iterations (last correction {correction:e} rad)")]
    Convergence { iterations: usize, correction: f64 },
    #[error("Object has decayed at {minutes_since_epoch:.3} min from epoch: {reason}")]
    Decay {
        reason: DecayReason,
        minutes_since_epoch: f64,
    },
}

impl OrbitError {
    pub fn kind(&self) -> OrbitErrorKind {
        match self {
            OrbitError::Format { .. } => OrbitErrorKind::Format,
            OrbitError::Checksum { .. } => OrbitErrorKind::Checksum,
            OrbitError::Range { .. } => OrbitErrorKind::Range,
            OrbitError::Convergence { .. } => OrbitErrorKind::Convergence,
            OrbitError::Decay { .. } => OrbitErrorKind::Decay,
        }
    }

    /// The element set can never produce a fix; stop using it
    pub fn is_permanent(&self) -> bool {
        !self.is_retryable()
    }

    /// Fresher elements (or a different target time) may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, OrbitError::Convergence { .. })
    }
}

impl From<ElementsError> for OrbitError {
    fn from(e: ElementsError) -> Self {
        match e {
            ElementsError::Format { line, reason } => OrbitError::Format { line, reason },
            ElementsError::Checksum {
                line,
                expected,
                computed,
            } => OrbitError::Checksum {
                line,
                expected,
                computed,
            },
            ElementsError::Range { field, value } => OrbitError::Range { field, value },
        }
    }
}

impl From<PropagationError> for OrbitError {
    fn from(e: PropagationError) -> Self {
        match e {
            PropagationError::Convergence {
                iterations,
                correction,
            } => OrbitError::Convergence {
                iterations,
                correction,
            },
            PropagationError::Decay {
                reason,
                minutes_since_epoch,
            } => OrbitError::Decay {
                reason,
                minutes_since_epoch,
            },
            PropagationError::Range { element, value } => OrbitError::Range {
                field: element,
                value,
            },
        }
    }
}
