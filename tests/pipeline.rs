//! End-to-end tests for the text pipeline: band refresh, range selection,
//! and template assembly. The external compiler is not involved.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::path::PathBuf;

use slideflow::bands::{self, BandStatus};
use slideflow::frames;
use slideflow::range::{self, PageRange};
use slideflow::template::{self, BuildMode, PathVars, TemplateSet, Theme};

const THREE_FRAMES: &str = "\
@@@--(SimpleDarkBlue)--@@@
% lecture source

\\begin{frame}{A}
alpha body
\\end{frame}

\\begin{frame}{B}
bravo body
\\end{frame}

\\begin{frame}{C}
charlie body
\\end{frame}
";

fn vars() -> PathVars {
    PathVars {
        unit_dir: "1010401.industry-general/05".to_string(),
        source_root: "/data/slides".to_string(),
        tool_images: "/opt/slideflow/images".to_string(),
        emoji_images: "/opt/slideflow/emoji".to_string(),
    }
}

fn handout_mode() -> BuildMode {
    BuildMode {
        handout: true,
        teacher: false,
        show_footer: true,
        title: "05 Pipelines".to_string(),
        theme: Theme::SimpleDarkBlue,
    }
}

fn template_set() -> TemplateSet {
    TemplateSet::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates"))
}

#[test]
fn ranged_handout_build_assembles_only_the_selected_frame() {
    // Annotate the way every build does before reading the source
    let (annotated, frame_count) = bands::annotate(THREE_FRAMES);
    assert_eq!(frame_count, 3);

    // Range "2" selects frame B only
    let PageRange::Span { first, last } = range::parse("2").unwrap() else {
        panic!("Expected a concrete span");
    };
    let body = frames::select(&annotated, first, last).unwrap();
    assert!(body.contains("bravo body"));
    assert!(!body.contains("alpha body"));
    assert!(!body.contains("charlie body"));

    // Assemble in handout mode
    let theme = Theme::detect(annotated.lines().next().unwrap()).unwrap();
    let mut mode = handout_mode();
    mode.theme = theme;

    let head = template_set().process_main(&vars(), &mode).unwrap();
    let assembled = template::assemble(&head, &body).unwrap();

    // Frame B sits between the processed head and the closing marker
    assert!(assembled.contains(r"\mypausemodefalse"));
    assert!(assembled.contains("bravo body"));
    assert!(!assembled.contains("alpha body"));
    assert!(assembled.trim_end().ends_with(r"\end{document}"));

    // The truncated body did not end with a closing marker; the assembled
    // document is still well-terminated, exactly once
    assert!(!body.trim_end().ends_with(r"\end{document}"));
    assert_eq!(assembled.matches(r"\end{document}").count(), 1);
}

#[test]
fn annotate_then_annotate_is_stable_across_the_whole_pipeline_input() {
    let (once, _) = bands::annotate(THREE_FRAMES);
    let (twice, _) = bands::annotate(&once);
    assert_eq!(once, twice);
    assert_eq!(bands::ordinals(&once), vec![1, 2, 3]);
}

#[test]
fn band_refresh_on_disk_then_selection() {
    let dir = tempfile::tempdir().unwrap();
    let content = dir.path().join("content.tex");
    fs_err::write(&content, THREE_FRAMES).unwrap();

    assert_eq!(bands::refresh_file(&content).unwrap(), BandStatus::Rewritten { frames: 3 });

    // The annotated source still selects cleanly: bands live outside frames
    let text = fs_err::read_to_string(&content).unwrap();
    let body = frames::select(&text, 2, 2).unwrap();
    assert!(body.contains("bravo body"));
    assert!(!body.contains("%@@PAGEBAND@@"));
}

#[test]
fn out_of_range_selection_is_empty_for_caller_fallback() {
    let body = frames::select(THREE_FRAMES, 9, 10).unwrap();
    assert!(body.is_empty());
}

#[test]
fn teacher_build_of_the_whole_document() {
    let mut mode = handout_mode();
    mode.handout = false;
    mode.teacher = true;

    let head = template_set().process_main(&vars(), &mode).unwrap();
    let assembled = template::assemble(&head, THREE_FRAMES.trim_end()).unwrap();

    assert!(assembled.contains(r"\documentclass[handout,aspectratio=169]{beamer}"));
    assert!(assembled.contains(r"\setbeameroption{show notes}"));
    assert!(assembled.contains("alpha body"));
    assert!(assembled.contains("charlie body"));
    // Closing marker appended exactly once
    assert_eq!(assembled.matches(r"\end{document}").count(), 1);
}

#[test]
fn metropolis_template_resolves_from_first_line_token() {
    let doc = "@@@--(metropolis)--@@@\n\\begin{frame}{A}\nx\n\\end{frame}\n";
    let theme = Theme::detect(doc.lines().next().unwrap()).unwrap();
    assert_eq!(theme, Theme::Metropolis);

    let mut mode = handout_mode();
    mode.theme = theme;
    let head = template_set().process_main(&vars(), &mode).unwrap();
    assert!(head.contains("metropolis"));
}
