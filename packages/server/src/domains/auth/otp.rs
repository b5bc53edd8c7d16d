//! Verification-code generation.

use rand::Rng;

use crate::kernel::BaseCodeGenerator;

/// Draws a fresh uniformly-random code per issuance from the full
/// `000000`-`999999` space, always zero-padded to six digits.
pub struct RandomCodeGenerator;

impl BaseCodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        let n: u32 = rand::thread_rng().gen_range(0..=999_999);
        format!("{:06}", n)
    }
}
