//! Where the vendored minifier bundle comes from.

use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::PathBuf;

/// The minifier bundle compiled into the crate.
pub const BUNDLED_SCRIPT: &str = include_str!("../../vendor/minify.lua");

/// Source of the script a session bootstraps from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScriptSource {
    /// The bundle shipped with the crate.
    #[default]
    Bundled,
    /// Script text supplied directly.
    Inline(String),
    /// A script file read at bootstrap time.
    File(PathBuf),
    /// The source could not be determined; carries the reason.
    Unavailable(String),
}

impl ScriptSource {
    /// Obtain the script text. Empty or whitespace-only text counts as missing.
    pub fn load(&self) -> io::Result<Cow<'_, str>> {
        let text = match self {
            Self::Bundled => Cow::Borrowed(BUNDLED_SCRIPT),
            Self::Inline(text) => Cow::Borrowed(text.as_str()),
            Self::File(path) => Cow::Owned(fs::read_to_string(path).map_err(|err| {
                io::Error::new(err.kind(), format!("{}: {}", path.display(), err))
            })?),
            Self::Unavailable(reason) => {
                return Err(io::Error::new(io::ErrorKind::NotFound, reason.clone()))
            }
        };

        if text.trim().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "script source is empty",
            ));
        }
        Ok(text)
    }
}
