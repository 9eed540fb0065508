//! Font loading for the PDF serializer.
//!
//! The bundled DejaVu LGC Sans family is searched for in the directories held
//! by [`FontSources`], in order.  When none of those hold the fonts, the system
//! DejaVu Sans family is loaded from the configured system directory instead.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{FontData, FontFamily};
use log::warn;

/// Directory holding the system DejaVu Sans fonts on Debian-like systems.
pub const DEFAULT_SYSTEM_FONTS_DIR: &str = "/usr/share/fonts/truetype/dejavu";

/// File names of the four faces making up a font family.
struct FontFiles {
    name: &'static str,
    regular: &'static str,
    bold: &'static str,
    italic: &'static str,
    bold_italic: &'static str,
}

impl FontFiles {
    fn all(&self) -> [&'static str; 4] {
        [self.regular, self.bold, self.italic, self.bold_italic]
    }
}

const BUNDLED_FONT_FILES: FontFiles = FontFiles {
    name: "DejaVu LGC Sans",
    regular: "DejaVuLGCSans.ttf",
    bold: "DejaVuLGCSans-Bold.ttf",
    italic: "DejaVuLGCSans-Oblique.ttf",
    bold_italic: "DejaVuLGCSans-BoldOblique.ttf",
};

const SYSTEM_FONT_FILES: FontFiles = FontFiles {
    name: "DejaVu Sans",
    regular: "DejaVuSans.ttf",
    bold: "DejaVuSans-Bold.ttf",
    italic: "DejaVuSans-Oblique.ttf",
    bold_italic: "DejaVuSans-BoldOblique.ttf",
};

/// Where fonts are looked for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontSources {
    bundled_dirs: Vec<PathBuf>,
    system_dir: PathBuf,
}

impl Default for FontSources {
    fn default() -> Self {
        Self::standard(None, PathBuf::from(DEFAULT_SYSTEM_FONTS_DIR))
    }
}

impl FontSources {
    /// Sources with no bundled directory, only the system fallback.
    pub fn new(system_dir: impl Into<PathBuf>) -> Self {
        Self {
            bundled_dirs: Vec::new(),
            system_dir: system_dir.into(),
        }
    }

    /// The usual search order: `fonts_dir` if given, `assets/fonts` next to
    /// the executable, then `assets/fonts` in the crate.
    pub fn standard(fonts_dir: Option<PathBuf>, system_dir: PathBuf) -> Self {
        let mut sources = Self::new(system_dir);
        if let Some(path) = fonts_dir {
            sources = sources.with_bundled_dir(path);
        }
        if let Ok(current_exe) = env::current_exe() {
            if let Some(bin_dir) = current_exe.parent() {
                sources = sources.with_bundled_dir(bin_dir.join("assets/fonts"));
            }
        }
        sources.with_bundled_dir(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts"))
    }

    /// Appends a directory to search for the bundled family.
    pub fn with_bundled_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if !self.bundled_dirs.contains(&dir) {
            self.bundled_dirs.push(dir);
        }
        self
    }

    pub fn bundled_dirs(&self) -> &[PathBuf] {
        &self.bundled_dirs
    }

    pub fn system_dir(&self) -> &Path {
        &self.system_dir
    }

    /// Loads the bundled family, falling back to the system DejaVu Sans
    /// family when the bundled fonts cannot be found.
    pub fn load_family(&self) -> Result<FontFamily<FontData>, Error> {
        let bundled = self
            .resolve_bundled_dir()
            .and_then(|directory| load_family(&directory, &BUNDLED_FONT_FILES));

        match bundled {
            Ok(family) => Ok(family),
            Err(err) if fonts_missing(&err) => {
                match load_family(&self.system_dir, &SYSTEM_FONT_FILES) {
                    Ok(fallback) => {
                        warn!(
                            "Bundled fonts unavailable ({}); falling back to '{}' from {}.",
                            err,
                            SYSTEM_FONT_FILES.name,
                            self.system_dir.display()
                        );
                        Ok(fallback)
                    }
                    Err(fallback_err) => {
                        warn!(
                            "Bundled fonts unavailable ({}); system fallback failed: {}",
                            err, fallback_err
                        );
                        Err(Error::new(
                            format!(
                                "Bundled fonts unavailable and system fallback failed: {}",
                                fallback_err
                            ),
                            io::Error::new(io::ErrorKind::NotFound, "no usable fonts found"),
                        ))
                    }
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Indicates whether a usable font family can be found without loading it.
    pub fn available(&self) -> bool {
        self.resolve_bundled_dir().is_ok()
            || missing_font_files(&self.system_dir, &SYSTEM_FONT_FILES).is_empty()
    }

    fn resolve_bundled_dir(&self) -> Result<PathBuf, Error> {
        let mut attempts = Vec::new();

        for candidate in &self.bundled_dirs {
            let exists = candidate.is_dir();
            let missing = missing_font_files(candidate, &BUNDLED_FONT_FILES);

            if exists && missing.is_empty() {
                return Ok(candidate.clone());
            }

            let reason = if !exists {
                "directory missing".to_owned()
            } else {
                format!("missing files [{}]", missing.join(", "))
            };
            attempts.push(format!("{} ({})", candidate.display(), reason));
        }

        Err(Error::new(
            format!(
                "Unable to locate the {} fonts. Checked: {}. See assets/fonts/README.md.",
                BUNDLED_FONT_FILES.name,
                attempts.join(", "),
            ),
            io::Error::new(io::ErrorKind::NotFound, "bundled fonts directory not found"),
        ))
    }
}

fn missing_font_files(path: &Path, files: &FontFiles) -> Vec<&'static str> {
    files
        .all()
        .into_iter()
        .filter(|name| !path.join(name).is_file())
        .collect()
}

fn load_font(directory: &Path, file: &str, style: &str) -> Result<FontData, Error> {
    let path = directory.join(file);
    FontData::load(&path, None).map_err(|err| {
        let io_kind = if path.is_file() {
            io::ErrorKind::Other
        } else {
            io::ErrorKind::NotFound
        };
        Error::new(
            format!("Failed to load {} font at {}: {}", style, path.display(), err),
            io::Error::new(io_kind, err.to_string()),
        )
    })
}

fn load_family(directory: &Path, files: &FontFiles) -> Result<FontFamily<FontData>, Error> {
    Ok(FontFamily {
        regular: load_font(directory, files.regular, "regular")?,
        bold: load_font(directory, files.bold, "bold")?,
        italic: load_font(directory, files.italic, "italic")?,
        bold_italic: load_font(directory, files.bold_italic, "bold italic")?,
    })
}

fn fonts_missing(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::IoError(io_err)
            if io_err.kind() == io::ErrorKind::NotFound
                || io_err.kind() == io::ErrorKind::PermissionDenied
    )
}
