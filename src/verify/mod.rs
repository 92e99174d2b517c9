//! Reconstruction of the compiler input a verifier needs.
//!
//! Two strategies, for different goals:
//! - [`build_info::get_verification_input`] returns the whole-project input
//!   of the compiler invocation that produced a contract.
//! - [`standard_json::generate_standard_json`] rebuilds a minimal input from
//!   only the sources a contract's metadata declares, which is what makes
//!   the metadata hash embedded in the bytecode reproducible.

pub mod build_info;
pub mod standard_json;

use serde::{Deserialize, Serialize};

pub use build_info::get_verification_input;
pub use standard_json::{generate_standard_json, reconstruct_input};

/// Standard JSON Input bytes plus the exact compiler to feed them to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationInput {
    pub standard_json: Vec<u8>,
    /// Long compiler version, e.g. `0.8.20+commit.a1b79de6`.
    pub compiler_version: String,
    /// Id of the build record this came from, if any.
    pub build_id: Option<String>,
}

impl VerificationInput {
    pub fn standard_json_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.standard_json)
    }
}
