//! `specrel check` command implementation.

use super::ReleaseArgs;
use crate::error::CliError;
use crate::output::Output;

pub(crate) fn check(args: &ReleaseArgs) -> Result<(), CliError> {
    let output = Output::new();
    let mut run = args.load(&output)?;

    run.release.verify_conditions(&run.config, &run.ctx)?;
    run.release.verify_release(&run.config, &run.ctx)?;

    output.success("Spec verified");
    Ok(())
}
