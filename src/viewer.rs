use std::{
    path::Path,
    process::{Child, Command, Stdio},
};

/// External image viewer launched on a series directory
///
/// The viewer is started with `<program> <args...> <series directory>` and is
/// not waited for.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewer {
    program: String,
    args: Vec<String>,
}
impl Viewer {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            args: vec![],
        }
    }
    /// Parses a command line like `ImageJ-linux64 -macro stack.ijm`
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut words = command.split_whitespace();
        let program = words.next()?;
        Some(Self::new(program).args(words))
    }
    pub fn args<I, S>(self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            ..self
        }
    }
    /// Opens the series directory if it still exists
    ///
    /// The caller owns the viewer process: if it exits first, it stays a
    /// zombie until it is waited for or the caller exits.
    pub fn open(&self, series: &Path) -> Option<Child> {
        if !series.is_dir() {
            log::info!("{:?} is gone, nothing to show", series);
            return None;
        }
        log::info!("Starting {} on {:?}", self.program, series);
        match Command::new(&self.program)
            .args(&self.args)
            .arg(series)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => Some(child),
            Err(e) => {
                log::warn!("failed to start {}: {e}", self.program);
                None
            }
        }
    }
}
