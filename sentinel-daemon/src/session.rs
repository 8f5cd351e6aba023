//! Liveness probe and process control through a terminal multiplexer.
//!
//! The server is only ever known by its session name: nothing here keeps a
//! PID. Each probe re-reads the multiplexer's session list.

use std::path::Path;
use std::process::Command;

use sentinel_core::Multiplexer;

use crate::error::{command_err, DaemonError};

/// The two capabilities the supervisor needs from a multiplexer.
pub trait SessionHost {
    /// Human-readable listing of active sessions.
    fn list_sessions(&self) -> Result<String, DaemonError>;

    /// Launch `program args…` in a new detached session called `name`.
    fn launch_session(
        &self,
        name: &str,
        program: &str,
        args: &[String],
        working_dir: Option<&Path>,
    ) -> Result<(), DaemonError>;
}

impl<T: SessionHost + ?Sized> SessionHost for Box<T> {
    fn list_sessions(&self) -> Result<String, DaemonError> {
        (**self).list_sessions()
    }

    fn launch_session(
        &self,
        name: &str,
        program: &str,
        args: &[String],
        working_dir: Option<&Path>,
    ) -> Result<(), DaemonError> {
        (**self).launch_session(name, program, args, working_dir)
    }
}

/// GNU screen: `screen -list` / `screen -dmS <name> …`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Screen;

/// tmux: `tmux list-sessions` / `tmux new-session -d -s <name> …`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tmux;

impl Screen {
    pub fn launch_command(
        &self,
        name: &str,
        program: &str,
        args: &[String],
        working_dir: Option<&Path>,
    ) -> Command {
        let mut cmd = Command::new("screen");
        cmd.args(["-dmS", name, program]).args(args);
        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl SessionHost for Screen {
    fn list_sessions(&self) -> Result<String, DaemonError> {
        listing(Command::new("screen").arg("-list"), "screen")
    }

    fn launch_session(
        &self,
        name: &str,
        program: &str,
        args: &[String],
        working_dir: Option<&Path>,
    ) -> Result<(), DaemonError> {
        launch(self.launch_command(name, program, args, working_dir), "screen")
    }
}

impl Tmux {
    pub fn launch_command(
        &self,
        name: &str,
        program: &str,
        args: &[String],
        working_dir: Option<&Path>,
    ) -> Command {
        let mut cmd = Command::new("tmux");
        cmd.args(["new-session", "-d", "-s", name]);
        if let Some(dir) = working_dir {
            cmd.arg("-c").arg(dir);
        }
        cmd.arg(program).args(args);
        cmd
    }
}

impl SessionHost for Tmux {
    fn list_sessions(&self) -> Result<String, DaemonError> {
        listing(Command::new("tmux").arg("list-sessions"), "tmux")
    }

    fn launch_session(
        &self,
        name: &str,
        program: &str,
        args: &[String],
        working_dir: Option<&Path>,
    ) -> Result<(), DaemonError> {
        launch(self.launch_command(name, program, args, working_dir), "tmux")
    }
}

/// Host for the configured multiplexer.
pub fn host_for(multiplexer: Multiplexer) -> Box<dyn SessionHost> {
    match multiplexer {
        Multiplexer::Screen => Box::new(Screen),
        Multiplexer::Tmux => Box::new(Tmux),
    }
}

/// Whether `session_name` appears anywhere in the session listing.
///
/// This is a substring match: a session called `solar` is also reported as
/// running when only `solar-test` exists.
pub fn is_running(host: &dyn SessionHost, session_name: &str) -> Result<bool, DaemonError> {
    Ok(contains_session(&host.list_sessions()?, session_name))
}

pub fn contains_session(listing: &str, session_name: &str) -> bool {
    listing.contains(session_name)
}

/// Ask the multiplexer to launch the server. Does not wait for the server to
/// come up; a working directory that does not exist is ignored.
pub fn start(
    host: &dyn SessionHost,
    session_name: &str,
    executable: &str,
    args: &[String],
    working_dir: Option<&Path>,
) -> Result<(), DaemonError> {
    let working_dir = working_dir.filter(|dir| dir.is_dir());
    tracing::info!(session = session_name, program = executable, "starting server session");
    host.launch_session(session_name, executable, args, working_dir)
}

// Both multiplexers exit non-zero when there are no sessions at all, so the
// exit status carries no signal here; only spawn failures are errors.
fn listing(cmd: &mut Command, program: &str) -> Result<String, DaemonError> {
    let output = cmd.output().map_err(|e| command_err(program, e))?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn launch(mut cmd: Command, program: &str) -> Result<(), DaemonError> {
    let output = cmd.output().map_err(|e| command_err(program, e))?;
    if output.status.success() {
        return Ok(());
    }
    Err(DaemonError::CommandFailed {
        program: program.to_string(),
        status: output.status,
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::ffi::OsStr;

    const SCREEN_LIST: &str = "There are screens on:\n\t12345.solar\t(Detached)\n\t999.lobby\t(Attached)\n2 Sockets in /run/screen/S-mc.\n";

    struct CannedHost {
        listing: Result<String, ()>,
        launches: RefCell<Vec<String>>,
    }

    impl SessionHost for CannedHost {
        fn list_sessions(&self) -> Result<String, DaemonError> {
            self.listing.clone().map_err(|()| DaemonError::Command {
                program: "screen".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not installed"),
            })
        }

        fn launch_session(
            &self,
            name: &str,
            _program: &str,
            _args: &[String],
            _working_dir: Option<&Path>,
        ) -> Result<(), DaemonError> {
            self.launches.borrow_mut().push(name.to_string());
            Ok(())
        }
    }

    fn canned(listing: &str) -> CannedHost {
        CannedHost {
            listing: Ok(listing.to_string()),
            launches: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn detached_session_is_running() {
        assert!(is_running(&canned("12345.solar (Detached)"), "solar").unwrap());
        assert!(is_running(&canned(SCREEN_LIST), "solar").unwrap());
    }

    #[test]
    fn unrelated_sessions_are_not_running() {
        let host = canned("There are screens on:\n\t999.lobby\t(Attached)\n\t1000.creative\t(Detached)\n");
        assert!(!is_running(&host, "solar").unwrap());
        assert!(!is_running(&canned("No Sockets found in /run/screen/S-mc.\n"), "solar").unwrap());
    }

    #[test]
    fn substring_of_another_session_name_matches() {
        assert!(is_running(&canned("4242.solar-test (Detached)"), "solar").unwrap());
    }

    #[test]
    fn listing_failure_propagates() {
        let host = CannedHost {
            listing: Err(()),
            launches: RefCell::new(Vec::new()),
        };
        assert!(matches!(
            is_running(&host, "solar"),
            Err(DaemonError::Command { .. })
        ));
    }

    #[test]
    fn start_drops_missing_working_dir() {
        let host = canned("");
        start(
            &host,
            "solar",
            "java",
            &[],
            Some(Path::new("/definitely/not/here")),
        )
        .unwrap();
        assert_eq!(host.launches.borrow().as_slice(), ["solar"]);
    }

    #[test]
    fn screen_launch_command_is_detached_and_named() {
        let args = vec!["-Xms1G".to_string(), "-jar".to_string(), "server.jar".to_string()];
        let cmd = Screen.launch_command("solar", "java", &args, Some(Path::new("/srv/solar")));

        assert_eq!(cmd.get_program(), OsStr::new("screen"));
        let rendered: Vec<&OsStr> = cmd.get_args().collect();
        assert_eq!(
            rendered,
            ["-dmS", "solar", "java", "-Xms1G", "-jar", "server.jar"]
                .map(OsStr::new)
                .to_vec()
        );
        assert_eq!(cmd.get_current_dir(), Some(Path::new("/srv/solar")));
    }

    #[test]
    fn tmux_launch_command_passes_working_dir_flag() {
        let args = vec!["-jar".to_string(), "server.jar".to_string()];
        let cmd = Tmux.launch_command("solar", "java", &args, Some(Path::new("/srv/solar")));

        assert_eq!(cmd.get_program(), OsStr::new("tmux"));
        let rendered: Vec<&OsStr> = cmd.get_args().collect();
        assert_eq!(
            rendered,
            [
                "new-session",
                "-d",
                "-s",
                "solar",
                "-c",
                "/srv/solar",
                "java",
                "-jar",
                "server.jar"
            ]
            .map(OsStr::new)
            .to_vec()
        );
    }
}
