//! Error taxonomy for the core (spec.md §7).
//!
//! Every variant here either bubbles out of [`crate::cpu::Cpu::step`] as a
//! fatal condition or wraps a failure reported by the bus collaborator.
//! There is no local recovery path: a fatal error means the driver violated
//! a contract (bad register index, illegal mode) or the decoder reached an
//! architectural corner this core does not implement.

use std::fmt;

/// Fatal or collaborator-reported failure surfaced by the core.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Register index out of range, illegal CPSR mode field, SPSR access
    /// in user/system mode, or an unknown firmware call number.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),

    /// Decode reached no matching instruction family.
    #[error("undefined instruction 0x{opcode:08X} at 0x{pc:08X}")]
    UndefinedInstruction { opcode: u32, pc: u32 },

    /// A recognized but unimplemented operation (coprocessor instructions,
    /// an unsupported firmware call number).
    #[error("unimplemented operation: {0}")]
    UnimplementedOperation(String),

    /// The memory bus collaborator reported a failure servicing an access.
    #[error("bus error: {0}")]
    Bus(#[from] BusError),
}

impl CoreError {
    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        CoreError::InternalInvariant(msg.into())
    }

    pub(crate) fn unimplemented(msg: impl Into<String>) -> Self {
        CoreError::UnimplementedOperation(msg.into())
    }
}

/// Failure reported by a [`crate::bus::Bus`] implementation.
///
/// The core does not interpret these beyond propagating them; the bus is
/// an external collaborator (spec.md §1 non-goals) and owns the meaning of
/// its own failures (out-of-range access, unmapped region, and so on).
#[derive(Debug)]
pub struct BusError {
    message: String,
}

impl BusError {
    pub fn new(message: impl Into<String>) -> Self {
        BusError {
            message: message.into(),
        }
    }
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for BusError {}
