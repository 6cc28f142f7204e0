pub mod types;
pub mod validation;

use clap::Parser;
pub use types::Args;

#[must_use]
pub fn args_checks() -> Args {
    Args::parse()
}
