//! `slideflow` - Beamer slide-deck build tool.
//!
//! Command-line front end: resolves the unit through the catalog, refreshes
//! page bands, assembles the themed document, and drives `latexmk`.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{debug, error, info, warn};

use slideflow::bands::{self, BandStatus};
use slideflow::catalog::Catalog;
use slideflow::compiler;
use slideflow::config::Config;
use slideflow::error::{Error, Result};
use slideflow::frames;
use slideflow::range::{self, PageRange};
use slideflow::template::{self, tex_path, BuildMode, PathVars, TemplateSet, Theme};
use slideflow::titles;

/// Build flags shared by the default invocation and the `build` subcommand.
#[derive(Parser, Debug)]
struct BuildArgs {
    /// Subject code (as listed in dirinfo.yaml)
    #[arg(value_name = "SUBJECT")]
    subject: String,

    /// Unit directory name within the subject
    #[arg(value_name = "UNIT")]
    unit: String,

    /// Frame range to build (e.g. '5' or '3-7'); empty builds everything
    #[arg(short = 'p', long, default_value = "")]
    page: String,

    /// Handout build: pauses disabled
    #[arg(long)]
    handout: bool,

    /// Teacher build: notes shown and note rendering injected
    #[arg(long)]
    teacher: bool,

    /// Hide the left footer
    #[arg(long)]
    hide_footer: bool,

    /// Override the slide title from the ledger
    #[arg(long)]
    title: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a slide deck (default command)
    Build(BuildArgs),

    /// List the frame titles of a unit's source document
    Titles {
        /// Subject code (as listed in dirinfo.yaml)
        subject: String,
        /// Unit directory name within the subject
        unit: String,
    },
}

/// slideflow - Beamer slide-deck build tool
///
/// Builds presenter, handout, or teacher renderings of a lecture deck from
/// its content.tex, with optional partial-range builds for testing.
#[derive(Parser, Debug)]
#[command(name = "slideflow")]
#[command(version)]
#[command(about = "Beamer slide-deck build tool")]
#[command(long_about = "slideflow builds themed Beamer decks from content.tex sources.

EXAMPLES:
    slideflow 1010401 05                  # Presenter build of subject 1010401, unit 05
    slideflow 1010401 05 -p 3-7           # Partial build of frames 3 through 7
    slideflow 1010401 05 --handout        # Handout build (pauses disabled)
    slideflow 1010401 05 --teacher        # Teacher build with rendered notes
    slideflow titles 1010401 05           # List the unit's frame titles

CONFIGURATION:
    The catalog index is read from dirinfo/dirinfo.yaml under the tool home
    (current directory by default). SLIDEFLOW_HOME, SLIDEFLOW_DIRINFO,
    SLIDEFLOW_TEMPLATES and SLIDEFLOW_TIMEOUT override the defaults, either
    from the environment or a .env file.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Subject code (when no subcommand is given)
    #[arg(value_name = "SUBJECT")]
    subject: Option<String>,

    /// Unit directory name (when no subcommand is given)
    #[arg(value_name = "UNIT")]
    unit: Option<String>,

    /// Frame range to build (e.g. '5' or '3-7'); empty builds everything
    #[arg(short = 'p', long, default_value = "")]
    page: String,

    /// Handout build: pauses disabled
    #[arg(long)]
    handout: bool,

    /// Teacher build: notes shown and note rendering injected
    #[arg(long)]
    teacher: bool,

    /// Hide the left footer
    #[arg(long)]
    hide_footer: bool,

    /// Override the slide title from the ledger
    #[arg(long)]
    title: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = CommandLineOptions::parse();
    if let Err(e) = run(cli).await {
        error!("{e}");
        std::process::exit(1);
    }
}

/// Dispatch the parsed command line.
async fn run(cli: CommandLineOptions) -> Result<()> {
    match cli.command {
        Some(Commands::Titles { subject, unit }) => run_titles(&subject, &unit),
        Some(Commands::Build(args)) => run_build(args).await,
        None => {
            // Default behavior - top-level args are a build invocation
            let (Some(subject), Some(unit)) = (cli.subject, cli.unit) else {
                return Err(Error::Msg(
                    "SUBJECT and UNIT are required when no subcommand is given".to_string(),
                ));
            };
            run_build(BuildArgs {
                subject,
                unit,
                page: cli.page,
                handout: cli.handout,
                teacher: cli.teacher,
                hide_footer: cli.hide_footer,
                title: cli.title,
            })
            .await
        }
    }
}

/// Resolve a unit's source document through the catalog.
fn resolve_content(
    catalog: &Catalog,
    subject: &str,
    unit: &str,
) -> Result<(String, PathBuf, PathBuf)> {
    let unit_dir = catalog.unit_dir(subject, unit)?;
    let app_dir = catalog.source_root()?.join(&unit_dir);
    let content_path = app_dir.join("content.tex");
    if !content_path.exists() {
        return Err(Error::MissingInput { path: content_path });
    }
    Ok((unit_dir, app_dir, content_path))
}

/// Log the build settings before doing any work.
fn log_build_config(
    args: &BuildArgs,
    unit_dir: &str,
    mode: &BuildMode,
    title_from_ledger: bool,
    content_path: &Path,
) {
    let mode_name = if mode.teacher {
        "teacher"
    } else if mode.handout {
        "handout"
    } else {
        "presenter"
    };
    let page = if args.page.trim().is_empty() { "whole document" } else { args.page.trim() };

    info!("Build configuration");
    info!("  subject      : {}", args.subject);
    info!("  unit         : {}", args.unit);
    info!("  resolved dir : {unit_dir}");
    info!(
        "  title        : {} ({})",
        mode.title,
        if title_from_ledger { "from ledger" } else { "from --title" }
    );
    info!("  page range   : {page}");
    info!("  mode         : {mode_name}");
    info!("  theme        : {}", mode.theme.name());
    info!("  left footer  : {}", if mode.show_footer { "shown" } else { "hidden" });
    info!("  source file  : {}", content_path.display());
}

/// The output file suffix for this invocation's variant.
const fn output_suffix(ranged: bool, mode: &BuildMode) -> &'static str {
    if ranged {
        "_test"
    } else if mode.teacher {
        "_tech"
    } else if !mode.handout {
        "_pr"
    } else {
        ""
    }
}

/// Run one build invocation end to end.
async fn run_build(args: BuildArgs) -> Result<()> {
    let config = Config::load()?;
    let catalog = Catalog::load(&config.dirinfo_path)?;

    let (unit_dir, app_dir, content_path) =
        resolve_content(&catalog, &args.subject, &args.unit)?;

    // Normalize page bands before anything else reads the source
    match bands::refresh_file(&content_path)? {
        BandStatus::Rewritten { frames } => info!("Page bands refreshed ({frames} frames)"),
        BandStatus::AlreadyNormalized { frames } => {
            debug!("Page bands already current ({frames} frames)");
        }
    }

    let page_range = range::parse(&args.page)?;
    let text = fs_err::read_to_string(&content_path)?;
    let theme = Theme::detect(text.lines().next().unwrap_or_default())?;

    let (title, title_from_ledger) = match args.title.clone() {
        Some(title) => (title, false),
        None => (catalog.unit_title(&args.subject, &args.unit)?, true),
    };

    let mode = BuildMode {
        handout: args.handout,
        teacher: args.teacher,
        show_footer: !args.hide_footer,
        title,
        theme,
    };

    log_build_config(&args, &unit_dir, &mode, title_from_ledger, &content_path);

    // Body: the requested range, or the whole document. An empty selection
    // falls back to the whole document with a warning rather than failing;
    // the output keeps its _test suffix either way.
    let ranged = !page_range.is_all();
    let body = match page_range {
        PageRange::All => text.trim_end().to_string(),
        PageRange::Span { first, last } => {
            let part = frames::select(&text, first, last)?;
            if part.trim().is_empty() {
                warn!("No frames match range {first}-{last}; building the whole document");
                text.trim_end().to_string()
            } else {
                part
            }
        }
    };

    let build_dir = app_dir.join("build");
    fs_err::create_dir_all(&build_dir)?;

    let vars = PathVars {
        unit_dir: tex_path(Path::new(&unit_dir)),
        source_root: tex_path(&catalog.source_root()?),
        tool_images: tex_path(&config.tool_images()),
        emoji_images: tex_path(&config.emoji_images()),
    };

    let set = TemplateSet::new(config.templates_dir.clone());
    let head = set.process_main(&vars, &mode)?;
    let deployed = set.deploy_companions(&build_dir, &vars, &mode)?;
    debug!("Deployed {deployed} companion template(s)");

    let assembled = template::assemble(&head, &body)?;
    let main_tex = build_dir.join("main.tex");
    fs_err::write(&main_tex, assembled)?;
    info!("Assembled {}", main_tex.display());

    let outcome = compiler::compile(&build_dir, &main_tex, config.compile_timeout).await?;

    let suffix = output_suffix(ranged, &mode);
    let final_pdf = app_dir.join(format!("{}_{}{suffix}.pdf", args.unit, mode.title));
    fs_err::copy(&outcome.pdf, &final_pdf)?;
    info!("Output: {}", final_pdf.display());

    let count = catalog.record_build(&args.subject, &args.unit)?;
    info!("Ledger updated for {}/{} (build #{count})", args.subject, args.unit);

    Ok(())
}

/// Print the frame titles of one unit's source document.
fn run_titles(subject: &str, unit: &str) -> Result<()> {
    let config = Config::load()?;
    let catalog = Catalog::load(&config.dirinfo_path)?;
    let (_, _, content_path) = resolve_content(&catalog, subject, unit)?;

    let text = fs_err::read_to_string(&content_path)?;
    let titles = titles::list_titles(&text);
    if titles.is_empty() {
        warn!("No frame titles found in {}", content_path.display());
        return Ok(());
    }
    for entry in titles {
        println!("{:02}. {}", entry.ordinal, entry.title);
    }
    Ok(())
}
