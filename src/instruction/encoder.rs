//! Pure build/decode functions for instructions
//!
//! The method selector is the first 8 bytes of
//! `sha256("global:{method}")`, the discriminator convention of the
//! program framework this client targets. The argument payload is the
//! bincode encoding of the method name plus argument values, so a decoder
//! can recover the original call for verification.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::SubmitError;
use crate::instruction::call::{ArgValue, CallDescription};
use crate::instruction::Instruction;
use crate::types::ProgramId;

/// Namespace prefix hashed into every method selector
pub const SELECTOR_NAMESPACE: &str = "global";

/// Derive the 8-byte selector for a method name
pub fn method_selector(method: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("{}:{}", SELECTOR_NAMESPACE, method).as_bytes());
    let mut selector = [0u8; 8];
    selector.copy_from_slice(&digest[..8]);
    selector
}

/// Payload layout travelling inside `Instruction::data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct WirePayload {
    method: String,
    args: Vec<ArgValue>,
}

/// Build an instruction from a call description
///
/// Pure function, no side effects. Validates before encoding:
/// - method name is non-empty
/// - argument count equals the declared parameter count
/// - each argument's kind matches its declared kind
/// - the program id decodes to 32 bytes of base58
pub fn build(call: &CallDescription) -> Result<Instruction, SubmitError> {
    if call.method.is_empty() {
        return Err(SubmitError::encoding("method name must be non-empty"));
    }

    if call.args.len() != call.params.len() {
        return Err(SubmitError::encoding(format!(
            "method '{}' declares {} parameter(s) but {} argument(s) were given",
            call.method,
            call.params.len(),
            call.args.len()
        )));
    }

    for (index, (declared, value)) in call.params.iter().zip(call.args.iter()).enumerate() {
        let actual = value.kind();
        if actual != *declared {
            return Err(SubmitError::encoding(format!(
                "method '{}' argument {}: expected {:?}, got {:?}",
                call.method, index, declared, actual
            )));
        }
    }

    let program_id = ProgramId::parse(&call.program_id)?;

    let payload = WirePayload {
        method: call.method.clone(),
        args: call.args.clone(),
    };
    let data = bincode::serialize(&payload)
        .map_err(|e| SubmitError::encoding(format!("unencodable argument: {}", e)))?;

    Ok(Instruction::new(
        program_id,
        method_selector(&call.method),
        data,
    ))
}

/// Call content recovered from a built instruction
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedCall {
    pub method: String,
    pub args: Vec<ArgValue>,
}

/// Decode an instruction back into its method name and arguments
///
/// Also verifies that the instruction's selector matches the decoded
/// method name, catching payload/selector mismatches from a corrupted or
/// hand-assembled instruction.
pub fn decode(instruction: &Instruction) -> Result<DecodedCall, SubmitError> {
    let payload: WirePayload = bincode::deserialize(instruction.data())
        .map_err(|e| SubmitError::encoding(format!("undecodable payload: {}", e)))?;

    let expected = method_selector(&payload.method);
    if &expected != instruction.selector() {
        return Err(SubmitError::encoding(format!(
            "selector mismatch: payload says '{}' ({}), instruction carries {}",
            payload.method,
            hex::encode(expected),
            instruction.selector_hex()
        )));
    }

    Ok(DecodedCall {
        method: payload.method,
        args: payload.args,
    })
}
