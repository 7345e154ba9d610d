//! Icon compiler capability.
//!
//! Packing an iconset directory into a `.icns` file is delegated to the host's
//! icon compiler. Whether one exists is a runtime question answered by
//! [`IconSetCompiler::is_available`], so the pipeline can be exercised with a
//! fake compiler on any platform.

use crate::converter::error::{Error, Result};
use std::{
    fmt,
    io::Read,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    sync::LazyLock,
    thread,
    time::Duration,
};
use wait_timeout::ChildExt;

/// Turns an iconset directory into a single icon file.
pub trait IconSetCompiler: fmt::Debug + Send + Sync {
    /// Short tool name used in logs and errors.
    fn name(&self) -> &str;

    /// Whether the compiler can run on this machine right now.
    fn is_available(&self) -> bool;

    /// Compiles `iconset` into `output` and returns the written path.
    ///
    /// A tool that runs but exits unsuccessfully is an
    /// [`Error::ExternalTool`] carrying its standard error verbatim.
    fn compile_icon_set(&self, iconset: &Path, output: &Path) -> Result<PathBuf>;
}

/// Location of `iconutil` on `PATH`, looked up once per process.
static ICONUTIL: LazyLock<Option<PathBuf>> = LazyLock::new(|| match which::which("iconutil") {
    Ok(path) => {
        log::debug!("Found iconutil at: {}", path.display());
        Some(path)
    }
    Err(e) => {
        log::debug!(
            "iconutil not found in PATH: {}. ICNS targets will fall back to PNG sets.",
            e
        );
        None
    }
});

/// macOS `iconutil -c icns`.
#[derive(Debug, Clone)]
pub struct Iconutil {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl Iconutil {
    /// Returns the system `iconutil`, if it is on `PATH`.
    pub fn detect() -> Option<Self> {
        ICONUTIL.as_ref().map(|path| Self::with_program(path))
    }

    /// Uses a specific executable that accepts `iconutil`'s arguments.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    /// Kills the tool if it runs longer than `timeout`. `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn tool_error(&self, diagnostic: impl Into<String>) -> Error {
        Error::ExternalTool {
            tool: self.name().to_string(),
            diagnostic: diagnostic.into(),
        }
    }

    /// Runs the command, returning its exit status and captured stderr.
    fn run(&self, mut command: Command) -> Result<(std::process::ExitStatus, String)> {
        let Some(timeout) = self.timeout else {
            let output = command
                .output()
                .map_err(|e| self.tool_error(format!("failed to execute: {e}")))?;
            return Ok((
                output.status,
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ));
        };

        let mut child = command
            .spawn()
            .map_err(|e| self.tool_error(format!("failed to execute: {e}")))?;

        // Drain stderr on a separate thread so a chatty tool cannot block on a full pipe.
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = stderr.read_to_end(&mut buf);
                buf
            })
        });
        let collect_stderr = |reader: Option<thread::JoinHandle<Vec<u8>>>| {
            reader
                .and_then(|handle| handle.join().ok())
                .map(|buf| String::from_utf8_lossy(&buf).into_owned())
                .unwrap_or_default()
        };

        match child.wait_timeout(timeout) {
            Ok(Some(status)) => Ok((status, collect_stderr(stderr_reader))),
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                // Grandchildren may still hold the pipe open; leave the reader detached.
                drop(stderr_reader);
                Err(self.tool_error(format!(
                    "timed out after {} seconds",
                    timeout.as_secs_f64()
                )))
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                Err(self.tool_error(format!("failed waiting for process: {e}")))
            }
        }
    }
}

impl IconSetCompiler for Iconutil {
    fn name(&self) -> &str {
        "iconutil"
    }

    fn is_available(&self) -> bool {
        which::which(&self.program).is_ok()
    }

    fn compile_icon_set(&self, iconset: &Path, output: &Path) -> Result<PathBuf> {
        log::debug!(
            "Running {} -c icns {} -o {}",
            self.program.display(),
            iconset.display(),
            output.display()
        );

        let mut command = Command::new(&self.program);
        command
            .args(["-c", "icns"])
            .arg(iconset)
            .arg("-o")
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let (status, stderr) = self.run(command)?;

        if !status.success() {
            return Err(self.tool_error(stderr));
        }
        if !output.is_file() {
            return Err(self.tool_error(format!(
                "exited successfully but did not create {}",
                output.display()
            )));
        }

        Ok(output.to_path_buf())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::converter::error::ErrorKind;
    use std::{fs, os::unix::fs::PermissionsExt};

    fn script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake-iconutil");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
        path
    }

    #[test]
    fn passes_iconutil_arguments_and_returns_output() {
        let dir = tempfile::tempdir().expect("tempdir");
        // $1=-c $2=icns $3=<iconset> $4=-o $5=<output>
        let program = script(dir.path(), r#"[ "$1" = "-c" ] && [ "$2" = "icns" ] && [ -d "$3" ] && printf icns > "$5""#);
        let iconset = dir.path().join("icon.iconset");
        fs::create_dir(&iconset).expect("mkdir");
        let output = dir.path().join("out.icns");

        let compiler = Iconutil::with_program(&program);
        assert!(compiler.is_available());
        let written = compiler.compile_icon_set(&iconset, &output).expect("compile");

        assert_eq!(written, output);
        assert_eq!(fs::read(&output).expect("read"), b"icns");
    }

    #[test]
    fn nonzero_exit_carries_stderr_verbatim() {
        let dir = tempfile::tempdir().expect("tempdir");
        let program = script(dir.path(), "echo 'icon.iconset:Invalid Iconset.' >&2\nexit 1");

        let err = Iconutil::with_program(&program)
            .compile_icon_set(dir.path(), &dir.path().join("out.icns"))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ExternalTool);
        match err {
            Error::ExternalTool { diagnostic, .. } => {
                assert_eq!(diagnostic, "icon.iconset:Invalid Iconset.\n")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn timeout_kills_hung_tool() {
        let dir = tempfile::tempdir().expect("tempdir");
        let program = script(dir.path(), "exec sleep 5");

        let err = Iconutil::with_program(&program)
            .with_timeout(Some(Duration::from_millis(200)))
            .compile_icon_set(dir.path(), &dir.path().join("out.icns"))
            .unwrap_err();

        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn missing_program_is_unavailable() {
        let compiler = Iconutil::with_program("/nonexistent/iconutil");
        assert!(!compiler.is_available());
        assert_eq!(
            compiler
                .compile_icon_set(Path::new("x.iconset"), Path::new("x.icns"))
                .unwrap_err()
                .kind(),
            ErrorKind::ExternalTool
        );
    }
}
