//! [`DisplayAdapter`] backed by an external display configuration tool.

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::debug;

use crate::display::{DisplayAdapter, Transform};
use crate::orientation::Orientation;

const WAIT_STEP: Duration = Duration::from_millis(10);

/// External tool used to query and rotate the display
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Backend {
    /// X11 `xrandr`
    Xrandr,
    /// wlroots `wlr-randr`
    WlrRandr,
}

impl Backend {
    /// Executable name
    pub fn program(self) -> &'static str {
        match self {
            Backend::Xrandr => "xrandr",
            Backend::WlrRandr => "wlr-randr",
        }
    }
}

/// Display adapter errors
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The tool could not be started or waited on
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Executable name
        program: &'static str,
        /// Underlying I/O error
        source: io::Error,
    },
    /// The tool ran past the timeout and was killed
    #[error("{0} timed out")]
    Timeout(&'static str),
    /// The tool exited unsuccessfully
    #[error("{program} exited with {status}")]
    Status {
        /// Executable name
        program: &'static str,
        /// Exit status
        status: ExitStatus,
    },
    /// The query output has no active entry for the output
    #[error("output {0} not found or not active")]
    OutputNotFound(String),
    /// The query reported a transform outside the known set
    #[error("unrecognised transform {0:?}")]
    UnknownTransform(String),
}

/// Display adapter running `xrandr` or `wlr-randr`
#[derive(Clone, Debug)]
pub struct CommandDisplay {
    backend: Backend,
    output: String,
    x_display: Option<String>,
    timeout: Duration,
}

impl CommandDisplay {
    /// Adapter for `output` with a 500 ms timeout per invocation
    pub fn new(backend: Backend, output: impl Into<String>) -> Self {
        CommandDisplay {
            backend,
            output: output.into(),
            x_display: None,
            timeout: Duration::from_millis(500),
        }
    }

    /// Set `DISPLAY` for the spawned tool
    pub fn with_x_display(mut self, display: impl Into<String>) -> Self {
        self.x_display = Some(display.into());
        self
    }

    /// Bound each invocation
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Backend in use
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Output name
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Arguments that rotate the output to `transform`
    pub fn apply_args(&self, transform: Transform) -> Vec<String> {
        let (flag, name) = match self.backend {
            Backend::Xrandr => ("--rotate", transform.xrandr_name()),
            Backend::WlrRandr => ("--transform", transform.wlr_name()),
        };
        vec![
            "--output".to_string(),
            self.output.clone(),
            flag.to_string(),
            name.to_string(),
        ]
    }

    /// Arguments that list the outputs
    pub fn query_args(&self) -> Vec<String> {
        match self.backend {
            Backend::Xrandr => vec!["--query".to_string()],
            Backend::WlrRandr => Vec::new(),
        }
    }

    /// Parse the query output of the configured backend
    pub fn parse_query(&self, text: &str) -> Result<Transform, CommandError> {
        match self.backend {
            Backend::Xrandr => parse_xrandr(text, &self.output),
            Backend::WlrRandr => parse_wlr_randr(text, &self.output),
        }
    }

    fn run(&self, args: &[String]) -> Result<String, CommandError> {
        run_tool(
            self.backend.program(),
            args,
            self.x_display.as_deref(),
            self.timeout,
        )
    }
}

/// Run `program`, returning its stdout.
///
/// Stdout is drained on a separate thread so a chatty tool cannot block on
/// a full pipe while the timeout runs.
fn run_tool(
    program: &'static str,
    args: &[String],
    x_display: Option<&str>,
    timeout: Duration,
) -> Result<String, CommandError> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());
    if let Some(display) = x_display {
        cmd.env("DISPLAY", display);
    }
    debug!("running {} {}", program, args.join(" "));

    let spawn_err = |source| CommandError::Spawn { program, source };
    let mut child = cmd.spawn().map_err(spawn_err)?;
    let reader = child.stdout.take().map(|mut stdout| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf).map(|_| buf)
        })
    });

    let status = match wait_timeout(&mut child, timeout).map_err(spawn_err)? {
        Some(status) => status,
        None => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(CommandError::Timeout(program));
        }
    };
    let stdout = match reader {
        Some(reader) => reader
            .join()
            .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "stdout reader panicked")))
            .map_err(spawn_err)?,
        None => Vec::new(),
    };
    if !status.success() {
        return Err(CommandError::Status { program, status });
    }
    Ok(String::from_utf8_lossy(&stdout).into_owned())
}

fn wait_timeout(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(WAIT_STEP);
    }
}

impl DisplayAdapter for CommandDisplay {
    type Error = CommandError;

    fn current_transform(&mut self) -> Result<Orientation, CommandError> {
        let text = self.run(&self.query_args())?;
        self.parse_query(&text).map(Orientation::from)
    }

    fn apply_transform(&mut self, orientation: Orientation) -> Result<(), CommandError> {
        self.run(&self.apply_args(Transform::from(orientation)))?;
        Ok(())
    }
}

/// Transform of `output` from `xrandr --query` output.
///
/// An active output line reads
/// `HDMI-1 connected primary 1920x1080+0+0 left X axis (normal left inverted right x axis y axis) ...`
/// where the rotation token is omitted for `normal` and reflection tokens
/// (`X axis`, `Y axis`, `X and Y axis`) may follow it.
pub fn parse_xrandr(text: &str, output: &str) -> Result<Transform, CommandError> {
    for line in text.lines() {
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some(output) || tokens.next() != Some("connected") {
            continue;
        }
        let mut tokens = tokens.skip_while(|t| *t == "primary");
        match tokens.next() {
            Some(geometry) if geometry.contains('+') => {}
            _ => break,
        }
        return Ok(tokens
            .next()
            .and_then(Transform::from_xrandr_name)
            .unwrap_or(Transform::Normal));
    }
    Err(CommandError::OutputNotFound(output.to_string()))
}

/// Transform of `output` from `wlr-randr` output.
///
/// Each output starts with an unindented line led by its name, followed by
/// indented properties including `Transform: <name>`.
pub fn parse_wlr_randr(text: &str, output: &str) -> Result<Transform, CommandError> {
    let mut in_block = false;
    for line in text.lines() {
        if !line.starts_with(char::is_whitespace) {
            in_block = line.split_whitespace().next() == Some(output);
            continue;
        }
        if !in_block {
            continue;
        }
        if let Some(value) = line.trim().strip_prefix("Transform:") {
            let value = value.trim();
            return Transform::from_wlr_name(value)
                .ok_or_else(|| CommandError::UnknownTransform(value.to_string()));
        }
    }
    Err(CommandError::OutputNotFound(output.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const XRANDR: &str = "\
Screen 0: minimum 320 x 200, current 1080 x 1920, maximum 8192 x 8192
HDMI-1 connected primary 1080x1920+0+0 right (normal left inverted right x axis y axis) 527mm x 296mm
   1920x1080     60.00*+  50.00    59.94
HDMI-2 connected 1920x1080+1080+0 (normal left inverted right x axis y axis) 527mm x 296mm
   1920x1080     60.00*+
DP-1 disconnected (normal left inverted right x axis y axis)
DP-2 connected (normal left inverted right x axis y axis)
";

    const WLR_RANDR: &str = "\
HDMI-A-1 \"Dell Inc. DELL U2415 (HDMI-A-1)\"
  Enabled: yes
  Modes:
    1920x1200 px, 59.950001 Hz (preferred, current)
  Position: 0,0
  Transform: 90
  Scale: 1.000000
DP-1 \"Unknown (DP-1)\"
  Enabled: yes
  Transform: normal
";

    #[test]
    fn xrandr_rotated_primary() {
        assert_eq!(parse_xrandr(XRANDR, "HDMI-1").unwrap(), Transform::Rotate270);
    }

    #[test]
    fn xrandr_normal_omits_token() {
        assert_eq!(parse_xrandr(XRANDR, "HDMI-2").unwrap(), Transform::Normal);
    }

    #[test]
    fn xrandr_reflection_tokens() {
        let text = "\
HDMI-1 connected 1920x1080+0+0 X axis (normal left inverted right x axis y axis) 527mm x 296mm
HDMI-2 connected 1080x1920+1920+0 left X and Y axis (normal left inverted right x axis y axis) 0mm x 0mm
";
        assert_eq!(parse_xrandr(text, "HDMI-1").unwrap(), Transform::Normal);
        assert_eq!(parse_xrandr(text, "HDMI-2").unwrap(), Transform::Rotate90);
    }

    #[test]
    fn xrandr_inactive_or_missing() {
        assert!(matches!(
            parse_xrandr(XRANDR, "DP-1"),
            Err(CommandError::OutputNotFound(_))
        ));
        assert!(matches!(
            parse_xrandr(XRANDR, "DP-2"),
            Err(CommandError::OutputNotFound(_))
        ));
        assert!(matches!(
            parse_xrandr(XRANDR, "HDMI"),
            Err(CommandError::OutputNotFound(_))
        ));
    }

    #[test]
    fn wlr_randr_blocks() {
        assert_eq!(
            parse_wlr_randr(WLR_RANDR, "HDMI-A-1").unwrap(),
            Transform::Rotate90
        );
        assert_eq!(parse_wlr_randr(WLR_RANDR, "DP-1").unwrap(), Transform::Normal);
        assert!(matches!(
            parse_wlr_randr(WLR_RANDR, "DP-2"),
            Err(CommandError::OutputNotFound(_))
        ));
    }

    #[test]
    fn wlr_randr_unknown_transform() {
        let text = "DP-1 \"x\"\n  Transform: flipped-90\n";
        assert!(matches!(
            parse_wlr_randr(text, "DP-1"),
            Err(CommandError::UnknownTransform(t)) if t == "flipped-90"
        ));
    }

    #[test]
    fn apply_args_per_backend() {
        let x = CommandDisplay::new(Backend::Xrandr, "HDMI-1");
        assert_eq!(
            x.apply_args(Transform::from(Orientation::PortraitUp)),
            ["--output", "HDMI-1", "--rotate", "right"]
        );
        let w = CommandDisplay::new(Backend::WlrRandr, "HDMI-A-1");
        assert_eq!(
            w.apply_args(Transform::from(Orientation::LandscapeLeft)),
            ["--output", "HDMI-A-1", "--transform", "180"]
        );
        assert!(w.query_args().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn run_tool_drains_large_output() {
        // well past the default 64 KiB pipe buffer
        let args = ["-c".to_string(), "head -c 262144 /dev/zero".to_string()];
        let out = run_tool("sh", &args, None, Duration::from_secs(5)).unwrap();
        assert_eq!(out.len(), 262_144);
    }

    #[cfg(unix)]
    #[test]
    fn run_tool_times_out() {
        let args = ["-c".to_string(), "sleep 5".to_string()];
        assert!(matches!(
            run_tool("sh", &args, None, Duration::from_millis(50)),
            Err(CommandError::Timeout("sh"))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn run_tool_reports_exit_status() {
        let args = ["-c".to_string(), "exit 3".to_string()];
        assert!(matches!(
            run_tool("sh", &args, None, Duration::from_secs(5)),
            Err(CommandError::Status { program: "sh", .. })
        ));
    }

    #[test]
    fn query_round_trip() {
        for backend in [Backend::Xrandr, Backend::WlrRandr] {
            let dev = CommandDisplay::new(backend, "OUT-1");
            for o in Orientation::ALL {
                let t = Transform::from(o);
                let text = match backend {
                    Backend::Xrandr => format!(
                        "OUT-1 connected 800x600+0+0 {} (normal left inverted right x axis y axis)\n",
                        t.xrandr_name()
                    ),
                    Backend::WlrRandr => format!("OUT-1 \"m\"\n  Transform: {}\n", t.wlr_name()),
                };
                assert_eq!(Orientation::from(dev.parse_query(&text).unwrap()), o);
            }
        }
    }
}
