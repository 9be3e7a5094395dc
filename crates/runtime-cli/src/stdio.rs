use std::io::{BufRead, Write};

use anyhow::Result;
use runtime_router::{CommandRouter, RouterCommand, RouterError};
use serde_json::{json, Value};

/// Answer each non-blank input line with exactly one output line.
pub fn serve(router: &dyn CommandRouter, input: impl BufRead, mut output: impl Write) -> Result<()> {
    let mut handled = 0usize;
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_line(router, &line);
        serde_json::to_writer(&mut output, &response)?;
        output.write_all(b"\n")?;
        output.flush()?;
        handled += 1;
    }
    tracing::info!(handled, "stdin closed; stopping");
    Ok(())
}

fn handle_line(router: &dyn CommandRouter, line: &str) -> Value {
    let result = serde_json::from_str::<RouterCommand>(line)
        .map_err(|err| RouterError::InvalidRequest {
            detail: format!("malformed command: {err}"),
        })
        .and_then(|command| router.dispatch(command));
    match result {
        Ok(response) => json!({
            "status_code": response.status_code,
            "payload": response.payload,
        }),
        Err(err) => {
            tracing::warn!(status = err.status_code(), %err, "command failed");
            json!({
                "status_code": err.status_code(),
                "error": err.to_string(),
            })
        }
    }
}
