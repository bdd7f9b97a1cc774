use super::session::{presenter_for, GlobalOptions, Session, SessionRequest};
use crate::cli::{DocumentArgs, EditArgs, OutputArgs};
use crate::dispatch::DispatchOutcome;
use anyhow::Result;

/// Send `event` to the dispatcher the way an editor host would.
///
/// Unknown events are ignored, as a host would ignore them; the exit code
/// is 2 so scripts can tell.
pub fn handle_trigger(
    global: &GlobalOptions,
    event: &str,
    document: DocumentArgs,
    edits: EditArgs,
    output: OutputArgs,
) -> Result<i32> {
    let session = Session::open(
        global,
        SessionRequest {
            document,
            edits,
            timeout: None,
        },
    );
    let mut presenter = presenter_for(&output);
    let result = session.run(event, &mut *presenter);
    if result.outcome == DispatchOutcome::Ignored {
        eprintln!("Unknown event '{event}' (expected: execute, configure)");
        return Ok(2);
    }
    Ok(result.exit_code())
}
