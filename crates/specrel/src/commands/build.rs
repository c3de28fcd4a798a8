//! `specrel build` command implementation.

use super::ReleaseArgs;
use crate::error::CliError;
use crate::output::Output;

pub(crate) fn build(args: &ReleaseArgs) -> Result<(), CliError> {
    let output = Output::new();
    let mut run = args.load(&output)?;

    run.release.verify_conditions(&run.config, &run.ctx)?;
    run.release.verify_release(&run.config, &run.ctx)?;
    run.release.prepare(&run.config, &run.ctx)?;
    let written = run.release.publish(&run.config, &run.ctx)?;

    output.success(&format!("Spec published to {}", written.display()));
    Ok(())
}
