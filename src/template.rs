//! Template processing and document assembly.
//!
//! Templates are plain LaTeX with named placeholder tokens (`@@name@@` for
//! literals, `%@@name@@` for whole-line mode switches). Substitution is
//! literal and order-independent; the mode-dependent values come from a
//! fixed decision table keyed on [`BuildMode`], never from sequential
//! mutation. Declared tokens that survive processing are a hard error, so a
//! template typo can never ship as a literal `@@token@@` in the PDF.

// Allow unwrap for compile-time constant regex patterns in lazy_static blocks
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Error, Result};

/// Body slot token: where the selected frames go.
pub const BODY_SLOT: &str = "@@BODY@@";

/// Closing marker every assembled document must end with.
pub const CLOSING_MARKER: &str = r"\end{document}";

/// Companion template files deployed next to the assembled document.
///
/// Absent files are skipped; the set matches what the templates historically
/// `\input` from their build directory.
pub const SUB_TEMPLATES: &[&str] = &[
    "preamble.tex",
    "macros.tex",
    "styles.tex",
    "emoji_macros.tex",
    "grid_debug.tex",
    "teacherframe.sty",
];

/// Every placeholder token the assembler may substitute.
///
/// This is the declared schema: a token from this list that is still present
/// after processing means a substitution was missed, and assembly fails
/// loudly instead of emitting the literal token.
pub const DECLARED_TOKENS: &[&str] = &[
    "@@sdir@@",
    "@@sourcedir@@",
    "@@tool_img@@",
    "@@emoji_img@@",
    "@@stitle@@",
    "@@leftfooter@@",
    "%@@pausemode@@",
    "%@@teachermode@@",
    "%@@notesdocumentmode@@",
    "%@@notesmode@@",
    "%@@notesmode_tech@@",
    "%@@setbeamcolor@@",
];

/// Note handling outside teacher mode: swallow `\noteT` so documents that
/// carry notes still compile.
const NOTES_CMD_OFF: &str = r"
\providecommand{\noteT}[2]{}
";

/// Note handling in teacher mode: enable `\noteT`, restyle the note page,
/// and force slides onto odd pages for duplex printing.
const NOTES_CMD_TEACHER: &str = r"
\makeatletter
\renewcommand{\noteT}[2]{%
 \gdef\notetitletext{#1}%
 \note{#2}%
}
\renewcommand{\notetitletext}{}%

\setbeamertemplate{note page}{%
 \begin{minipage}{\linewidth}
 \vspace{1.2ex}
 {\Large\bfseries
 \ifx\notetitletext\@empty
 \insertframetitle
 \else
 \notetitletext
 \fi
 }\par
 \vspace{-1.2ex}
 \rule{\linewidth}{0.8pt}\par
 \vspace{0.8ex}
 {\scriptsize \insertnote}
 \end{minipage}
}
\makeatother

\oddslideenforcetrue
";

/// Footer content when the left footer is visible.
const LEFT_FOOTER: &str = r"\scriptsize\color{gray!50} \myfootertext";

lazy_static! {
    static ref THEME_TOKEN_RE: Regex = Regex::new(r"@@@--\((.*?)\)--@@@").unwrap();
    static ref PLACEHOLDER_RE: Regex = Regex::new(r"%?@@[A-Za-z_]+@@").unwrap();
}

/// The closed set of Beamer themes the templates support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    /// Default theme.
    #[default]
    SimpleDarkBlue,
    /// The metropolis theme.
    Metropolis,
}

impl Theme {
    /// Comma-separated list of accepted theme names, for diagnostics.
    pub const EXPECTED: &'static str = "SimpleDarkBlue, metropolis";

    /// The theme's name as it appears in the first-line selector token.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SimpleDarkBlue => "SimpleDarkBlue",
            Self::Metropolis => "metropolis",
        }
    }

    /// The main template file for this theme.
    #[must_use]
    pub const fn template_file(self) -> &'static str {
        match self {
            Self::SimpleDarkBlue => "main_template.tex",
            Self::Metropolis => "metro_template.tex",
        }
    }

    /// Detect the theme from the document's first line.
    ///
    /// A first line carrying `@@@--(name)--@@@` selects that theme; no token
    /// falls back to [`Theme::SimpleDarkBlue`]. A token naming anything
    /// outside the closed set is fatal: silently falling back would produce
    /// a visually wrong artifact.
    pub fn detect(first_line: &str) -> Result<Self> {
        let Some(caps) = THEME_TOKEN_RE.captures(first_line) else {
            return Ok(Self::default());
        };
        match caps[1].trim() {
            "SimpleDarkBlue" => Ok(Self::SimpleDarkBlue),
            "metropolis" => Ok(Self::Metropolis),
            other => Err(Error::UnrecognizedTheme {
                found: other.to_string(),
                expected: Self::EXPECTED,
            }),
        }
    }
}

/// Output-variant switches for one build invocation.
///
/// Constructed fresh from the CLI per invocation, never persisted.
#[derive(Debug, Clone)]
pub struct BuildMode {
    /// Handout build: pauses disabled, no per-overlay pages.
    pub handout: bool,
    /// Teacher build: notes shown, note rendering injected, white canvas.
    pub teacher: bool,
    /// Whether the left footer is rendered.
    pub show_footer: bool,
    /// Slide title placed into the template.
    pub title: String,
    /// Selected Beamer theme.
    pub theme: Theme,
}

/// Path literals substituted into every template of the set.
#[derive(Debug, Clone)]
pub struct PathVars {
    /// Unit directory relative to the source root.
    pub unit_dir: String,
    /// Source root directory.
    pub source_root: String,
    /// Shared image directory shipped with the tool.
    pub tool_images: String,
    /// Rendered emoji directory shipped with the tool.
    pub emoji_images: String,
}

/// Normalize a path for use inside a TeX source: forward slashes only.
#[must_use]
pub fn tex_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// The fixed decision table: every declared token paired with its value for
/// this mode and path set.
fn substitutions<'a>(vars: &'a PathVars, mode: &'a BuildMode) -> Vec<(&'static str, &'a str)> {
    vec![
        ("@@sdir@@", vars.unit_dir.as_str()),
        ("@@sourcedir@@", vars.source_root.as_str()),
        ("@@tool_img@@", vars.tool_images.as_str()),
        ("@@emoji_img@@", vars.emoji_images.as_str()),
        ("@@stitle@@", mode.title.as_str()),
        ("@@leftfooter@@", if mode.show_footer { LEFT_FOOTER } else { "" }),
        (
            "%@@pausemode@@",
            if mode.handout { r"\mypausemodefalse" } else { r"\mypausemodetrue" },
        ),
        (
            "%@@teachermode@@",
            if mode.teacher { r"\teachermodetrue" } else { r"\teachermodefalse" },
        ),
        (
            "%@@notesdocumentmode@@",
            if mode.teacher {
                r"\documentclass[handout,aspectratio=169]{beamer}"
            } else {
                r"\documentclass[aspectratio=169]{beamer}"
            },
        ),
        (
            "%@@notesmode@@",
            if mode.teacher { r"\setbeameroption{show notes}" } else { "" },
        ),
        (
            "%@@notesmode_tech@@",
            if mode.teacher { NOTES_CMD_TEACHER } else { NOTES_CMD_OFF },
        ),
        (
            "%@@setbeamcolor@@",
            if mode.teacher { r"\setbeamercolor{background canvas}{bg=white}" } else { "" },
        ),
    ]
}

/// Apply the full substitution table to one template text.
#[must_use]
pub fn process(template: &str, vars: &PathVars, mode: &BuildMode) -> String {
    let mut out = template.to_string();
    for (token, value) in substitutions(vars, mode) {
        out = out.replace(token, value);
    }
    out
}

/// Verify that no declared token survived processing.
///
/// The body slot is exempt (it is consumed by [`assemble`]); tokens outside
/// the declared schema are left alone and only logged, since templates may
/// carry placeholder-shaped text of their own.
pub fn verify_resolved(processed: &str, template_name: &str) -> Result<()> {
    for m in PLACEHOLDER_RE.find_iter(processed) {
        let token = m.as_str();
        if token == BODY_SLOT {
            continue;
        }
        if DECLARED_TOKENS.contains(&token) {
            return Err(Error::UnresolvedPlaceholder {
                token: token.to_string(),
                template: template_name.to_string(),
            });
        }
        tracing::debug!("Leaving undeclared token {token} untouched in {template_name}");
    }
    Ok(())
}

/// Insert the body into the processed template's body slot.
///
/// The assembled document is guaranteed to end with `\end{document}`, even
/// when a partial range selection truncated the body before the author's own
/// closing marker.
pub fn assemble(head: &str, body: &str) -> Result<String> {
    if !head.contains(BODY_SLOT) {
        return Err(Error::UnresolvedPlaceholder {
            token: BODY_SLOT.to_string(),
            template: "processed template head".to_string(),
        });
    }

    let mut out = head.replace(BODY_SLOT, body.trim_end());
    if !out.trim_end().ends_with(CLOSING_MARKER) {
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(CLOSING_MARKER);
        out.push('\n');
    }
    Ok(out)
}

/// A template directory: one main template per theme plus companion files.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    dir: PathBuf,
}

impl TemplateSet {
    /// Create a template set rooted at `dir`.
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Load and process the main template for a theme.
    pub fn process_main(&self, vars: &PathVars, mode: &BuildMode) -> Result<String> {
        let path = self.dir.join(mode.theme.template_file());
        if !path.exists() {
            return Err(Error::MissingInput { path });
        }
        let raw = fs_err::read_to_string(&path)?;
        let processed = process(&raw, vars, mode);
        verify_resolved(&processed, mode.theme.template_file())?;
        Ok(processed)
    }

    /// Process every present companion file into the build directory.
    ///
    /// Returns how many files were deployed. Absent companions are skipped
    /// silently, matching how the templates treat optional `\input`s.
    pub fn deploy_companions(
        &self,
        build_dir: &Path,
        vars: &PathVars,
        mode: &BuildMode,
    ) -> Result<usize> {
        let mut deployed = 0;
        for name in SUB_TEMPLATES {
            let path = self.dir.join(name);
            if !path.exists() {
                continue;
            }
            let raw = fs_err::read_to_string(&path)?;
            let processed = process(&raw, vars, mode);
            verify_resolved(&processed, name)?;
            fs_err::write(build_dir.join(name), processed)?;
            deployed += 1;
        }
        Ok(deployed)
    }
}
