//! Running OS commands as signal sources

use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use super::signals::{SignalError, SignalResult};

/// Upper bound on any single probe command
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

const PRIVILEGE_MARKERS: &[&str] = &[
    "permission denied",
    "operation not permitted",
    "must be run as root",
    "insufficient privileges",
    "not authorized",
];

/// Run `program` with `args` and return its stdout
///
/// The child is killed if the returned future is dropped, so a cancelled
/// request never leaves probes running.
pub async fn run_command(program: &str, args: &[&str]) -> SignalResult<String> {
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => SignalError::Unavailable(format!("{} is not installed", program)),
            ErrorKind::PermissionDenied => {
                SignalError::PermissionDenied(format!("cannot execute {}", program))
            }
            _ => SignalError::Failed(format!("failed to start {}: {}", program, e)),
        })?;

    let output = tokio::time::timeout(COMMAND_TIMEOUT, child.wait_with_output())
        .await
        .map_err(|_| SignalError::Failed(format!("{} timed out", program)))?
        .map_err(|e| SignalError::Failed(format!("{} failed: {}", program, e)))?;

    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    Err(classify_failure(program, &stderr))
}

/// Map a failed command's stderr to a signal error
pub fn classify_failure(program: &str, stderr: &str) -> SignalError {
    let lowered = stderr.to_lowercase();
    if PRIVILEGE_MARKERS.iter().any(|m| lowered.contains(m)) {
        SignalError::PermissionDenied(format!("{}: {}", program, stderr))
    } else if lowered.contains("not running") || lowered.contains("could not connect") {
        SignalError::Unavailable(format!("{}: {}", program, stderr))
    } else {
        SignalError::Failed(format!("{}: {}", program, stderr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_privilege_failure() {
        let err = classify_failure("wg", "Unable to access interface: Operation not permitted");
        assert!(matches!(err, SignalError::PermissionDenied(_)));
    }

    #[test]
    fn test_classify_daemon_not_running() {
        let err = classify_failure("nmcli", "Error: NetworkManager is not running.");
        assert!(matches!(err, SignalError::Unavailable(_)));
    }

    #[test]
    fn test_classify_other_failure() {
        let err = classify_failure("ip", "Object \"adr\" is unknown");
        assert!(matches!(err, SignalError::Failed(_)));
    }

    #[tokio::test]
    async fn test_missing_program_is_unavailable() {
        let err = run_command("breadcrumbs-definitely-not-a-command", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, SignalError::Unavailable(_)));
    }
}
