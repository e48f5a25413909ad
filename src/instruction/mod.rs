//! Instruction building
//!
//! Turns a typed [`CallDescription`] into a serialized [`Instruction`]
//! ready to travel over a transport. Split into focused modules:
//! - **call**: the call description and its argument model
//! - **encoder**: pure build/decode functions and the method selector
//!
//! Building is a pure function of its input: validation failures surface
//! as `Encoding` errors before any I/O happens, and exactly one
//! `Instruction` is produced per `CallDescription`.

mod call;
mod encoder;

pub use call::{ArgKind, ArgValue, CallDescription};
pub use encoder::{build, decode, method_selector, DecodedCall};

use crate::types::ProgramId;

/// Serialized, ready-to-send representation of a single remote call
///
/// Immutable once built; owned solely by the submission coordinator for
/// the duration of one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    program_id: ProgramId,
    selector: [u8; 8],
    data: Vec<u8>,
}

impl Instruction {
    pub(crate) fn new(program_id: ProgramId, selector: [u8; 8], data: Vec<u8>) -> Self {
        Self {
            program_id,
            selector,
            data,
        }
    }

    /// Target program identifier
    pub fn program_id(&self) -> &ProgramId {
        &self.program_id
    }

    /// 8-byte method selector
    pub fn selector(&self) -> &[u8; 8] {
        &self.selector
    }

    /// Selector rendered as hex, for logs and wire metadata
    pub fn selector_hex(&self) -> String {
        hex::encode(self.selector)
    }

    /// Serialized argument payload
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
