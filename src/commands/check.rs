use super::session::{presenter_for, GlobalOptions, Session, SessionRequest};
use crate::cli::{DocumentArgs, OutputArgs};
use crate::dispatch::Command;
use anyhow::Result;

/// Run one check and return the process exit code.
pub fn handle_check(
    global: &GlobalOptions,
    document: DocumentArgs,
    output: OutputArgs,
    timeout: Option<u64>,
) -> Result<i32> {
    let session = Session::open(
        global,
        SessionRequest {
            document,
            timeout,
            ..SessionRequest::default()
        },
    );
    let mut presenter = presenter_for(&output);
    let result = session.run(Command::Execute.event_name(), &mut *presenter);
    Ok(result.exit_code())
}
