use super::session::{presenter_for, GlobalOptions, Session, SessionRequest};
use crate::cli::{DocumentArgs, EditArgs, OutputArgs};
use crate::dispatch::Command;
use anyhow::Result;

/// Apply `edits` for `language` (or the configured default) and save them.
pub fn handle_configure(
    global: &GlobalOptions,
    language: Option<String>,
    edits: EditArgs,
    output: OutputArgs,
) -> Result<i32> {
    let session = Session::open(
        global,
        SessionRequest {
            document: DocumentArgs {
                language,
                ..DocumentArgs::default()
            },
            edits,
            timeout: None,
        },
    );
    let mut presenter = presenter_for(&output);
    let result = session.run(Command::Configure.event_name(), &mut *presenter);
    Ok(result.exit_code())
}
