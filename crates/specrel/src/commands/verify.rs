//! `specrel verify` command implementation.

use super::ReleaseArgs;
use crate::error::CliError;
use crate::output::Output;

pub(crate) fn verify(args: &ReleaseArgs) -> Result<(), CliError> {
    let output = Output::new();
    let run = args.load(&output)?;

    run.release.verify_conditions(&run.config, &run.ctx)?;

    output.success("Release conditions verified");
    Ok(())
}
