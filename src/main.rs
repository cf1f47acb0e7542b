//! Headless driver for the item page.
//!
//! Usage: `imgnotate <folder> [item]`, then one command per line on stdin.
//! Type `help` for the command list.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use imgnotate::config::AppConfig;
use imgnotate::model::{
    Action, AnnotationError, AnnotationId, BoundingBox, CanvasTool, ElementKind, ElementRef, Line,
    Point, Polygon,
};
use imgnotate::state::{AnnotationProvider, ProjectState};
use imgnotate::{ItemPage, NavParams, PageEvent, Session};

const HELP: &str = "\
commands:
  items                         list images in the folder
  open <item>                   open another image
  src                           print the image source
  tool <line|rectangle|polygon> select a canvas tool
  key <key>                     simulate a key press
  line x,y x,y ...              draw a line
  box x,y x,y                   draw a box from two corners
  poly x,y x,y x,y ...          draw a polygon
  select <kind> <id>            select a line/box/polygon/action
  deselect                      clear the selection
  delete <id>                   delete from the active tool's collection
  action add                    add a placeholder action
  action update <id> <start> <end> <label>
  action delete <id>
  show                          print the page state as JSON
  quit";

#[derive(Debug, thiserror::Error)]
enum CommandError {
    #[error("Unknown command: {0} (try `help`)")]
    Unknown(String),

    #[error("Invalid argument: {0}")]
    BadArgument(String),

    #[error(transparent)]
    Annotation(#[from] AnnotationError),

    #[error("Failed to serialize page state: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// What the driver loop does after a command.
#[derive(Debug, PartialEq)]
enum Flow {
    Continue,
    Quit,
    /// Close the page and open this item.
    Open(String),
}

/// Serializable view of the page for `show`.
#[derive(Serialize)]
struct PageSnapshot<'a> {
    item: &'a str,
    src: String,
    tool: Option<CanvasTool>,
    dimensions: Option<(u32, u32)>,
    selected: Option<ElementRef>,
    lines: &'a [Line],
    boxes: &'a [BoundingBox],
    polygons: &'a [Polygon],
    actions: &'a [Action],
}

fn parse_id(arg: Option<&str>) -> Result<AnnotationId, CommandError> {
    let arg = arg.ok_or_else(|| CommandError::BadArgument("missing id".to_string()))?;
    arg.parse()
        .map_err(|_| CommandError::BadArgument(format!("not an id: {}", arg)))
}

fn parse_time(arg: Option<&str>) -> Result<f64, CommandError> {
    let arg = arg.ok_or_else(|| CommandError::BadArgument("missing time".to_string()))?;
    arg.parse()
        .map_err(|_| CommandError::BadArgument(format!("not a time: {}", arg)))
}

fn parse_point(arg: &str) -> Result<Point, CommandError> {
    let bad = || CommandError::BadArgument(format!("expected x,y but got {}", arg));
    let (x, y) = arg.split_once(',').ok_or_else(bad)?;
    let x = x.trim().parse().map_err(|_| bad())?;
    let y = y.trim().parse().map_err(|_| bad())?;
    Ok(Point::new(x, y))
}

fn parse_points<'a>(args: impl Iterator<Item = &'a str>) -> Result<Vec<Point>, CommandError> {
    args.map(parse_point).collect()
}

/// Resolve `folder` to an absolute path for storing in the config.
fn absolute_folder(folder: &Path) -> PathBuf {
    std::fs::canonicalize(folder)
        .or_else(|_| std::path::absolute(folder))
        .unwrap_or_else(|_| folder.to_path_buf())
}

/// Run one command against the page.
fn run_command(
    page: &mut ItemPage,
    line: &str,
    out: &mut impl Write,
) -> Result<Flow, CommandError> {
    let mut args = line.split_whitespace();
    let Some(command) = args.next() else {
        return Ok(Flow::Continue);
    };

    match command {
        "help" => {
            writeln!(out, "{}", HELP)?;
        }
        "quit" | "exit" => return Ok(Flow::Quit),
        "open" => {
            let item = args.collect::<Vec<_>>().join(" ");
            if item.is_empty() {
                return Err(CommandError::BadArgument("missing item".to_string()));
            }
            return Ok(Flow::Open(item));
        }
        "items" => {
            for item in page.session().project.items() {
                writeln!(out, "{}", item)?;
            }
        }
        "src" => {
            writeln!(out, "{}", page.image_src())?;
        }
        "tool" => {
            let name = args.next().unwrap_or_default();
            let tool = CanvasTool::from_name(name)
                .ok_or_else(|| CommandError::BadArgument(format!("unknown tool: {}", name)))?;
            page.select_canvas_tool(tool);
        }
        "key" => {
            let key = args.next().unwrap_or_default();
            match page.on_key_down(key) {
                Some(tool) => {
                    writeln!(out, "tool: {}", tool.name())?;
                }
                None => {
                    writeln!(out, "no binding for {:?}", key)?;
                }
            }
        }
        "line" | "box" | "poly" => {
            let points = parse_points(args)?;
            let annotations = &mut page.session_mut().annotations;
            let id = match command {
                "line" => annotations.add_line(points)?,
                "box" => match points.as_slice() {
                    [p1, p2] => annotations.add_box(*p1, *p2)?,
                    _ => {
                        return Err(CommandError::BadArgument(
                            "box needs exactly two corners".to_string(),
                        ));
                    }
                },
                _ => annotations.add_polygon(points)?,
            };
            page.refresh_annotations();
            page.render_canvas();
            writeln!(out, "added {}", id)?;
        }
        "select" => {
            let name = args.next().unwrap_or_default();
            let kind = ElementKind::from_name(name)
                .ok_or_else(|| CommandError::BadArgument(format!("unknown kind: {}", name)))?;
            page.item_select(ElementRef::new(kind, parse_id(args.next())?));
        }
        "deselect" => {
            page.clear_selection();
        }
        "delete" => {
            let id = parse_id(args.next())?;
            if !page.item_delete(id) {
                writeln!(out, "nothing deleted")?;
            }
        }
        "action" => match args.next() {
            Some("add") => {
                let id = page.action_add()?;
                writeln!(out, "added {}", id)?;
            }
            Some("delete") => {
                let id = parse_id(args.next())?;
                if !page.action_delete(id) {
                    writeln!(out, "nothing deleted")?;
                }
            }
            Some("update") => {
                let id = parse_id(args.next())?;
                let start = parse_time(args.next())?;
                let end = parse_time(args.next())?;
                let label = args.collect::<Vec<_>>().join(" ");
                page.action_update(id, label, start, end)?;
            }
            other => {
                return Err(CommandError::BadArgument(format!(
                    "unknown action command: {}",
                    other.unwrap_or_default()
                )));
            }
        },
        "show" => {
            let snapshot = PageSnapshot {
                item: page.item(),
                src: page.image_src(),
                tool: page.selected_canvas_tool(),
                dimensions: page.current_image().and_then(|image| image.dimensions),
                selected: page.session().annotations.selected(),
                lines: page.lines(),
                boxes: page.boxes(),
                polygons: page.polygons(),
                actions: page.actions(),
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&snapshot)?)?;
        }
        other => return Err(CommandError::Unknown(other.to_string())),
    }

    Ok(Flow::Continue)
}

fn main() {
    let loaded = AppConfig::load_from_default_path();
    let config = match &loaded {
        Ok(Some(config)) => config.clone(),
        _ => AppConfig::default(),
    };

    env_logger::Builder::new()
        .filter_level(config.preferences.log_level.to_level_filter())
        .parse_default_env()
        .init();

    if let Err(e) = &loaded {
        log::warn!("Failed to load configuration, using defaults: {}", e);
    }

    let mut args = std::env::args().skip(1);
    let Some(folder) = args
        .next()
        .map(PathBuf::from)
        .or_else(|| config.preferences.last_folder.clone())
    else {
        eprintln!("usage: imgnotate <folder> [item]");
        std::process::exit(2);
    };

    let project = match ProjectState::from_folder(&folder) {
        Ok(project) => project,
        Err(e) => {
            log::warn!("{}", e);
            ProjectState::new(&folder)
        }
    };

    let Some(item) = args.next().or_else(|| project.items().first().cloned()) else {
        eprintln!("No images in {:?}; pass an item name", folder);
        std::process::exit(2);
    };

    let mut session = Session::from_config(project, &config);
    session.events.subscribe(|event: &PageEvent| {
        log::info!("event: {}", event.name());
    });

    // A file that failed to load stays as it is on disk.
    if loaded.is_ok() {
        let last_folder = absolute_folder(&folder);
        if let Err(e) = AppConfig::update_default_path(|config| {
            config.preferences.last_folder = Some(last_folder);
        }) {
            log::warn!("Failed to save configuration: {}", e);
        }
    }

    let mut page = ItemPage::open(NavParams::new(item), session);

    let stdin = io::stdin();
    let mut out = io::stdout();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                eprintln!("Failed to read input: {}", e);
                break;
            }
        };

        match run_command(&mut page, &line, &mut out) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Ok(Flow::Open(item)) => {
                let session = page.close();
                page = ItemPage::open(NavParams::new(item), session);
            }
            Err(CommandError::Io(e)) => {
                log::error!("Stopping: {}", e);
                break;
            }
            Err(e) => eprintln!("{}", e),
        }
        if let Err(e) = out.flush() {
            log::error!("Stopping: {}", e);
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Writer whose reader has gone away.
    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn page() -> ItemPage {
        ItemPage::open(NavParams::new("a.png"), Session::new(ProjectState::new("frames")))
    }

    #[test]
    fn test_open_needs_an_item() {
        let mut page = page();
        let mut out = Vec::new();
        assert!(matches!(
            run_command(&mut page, "open", &mut out),
            Err(CommandError::BadArgument(_))
        ));
        assert_eq!(
            run_command(&mut page, "open  b.png ", &mut out).unwrap(),
            Flow::Open("b.png".to_string())
        );
    }

    #[test]
    fn test_quit_and_blank_lines() {
        let mut page = page();
        let mut out = Vec::new();
        assert_eq!(run_command(&mut page, "", &mut out).unwrap(), Flow::Continue);
        assert_eq!(run_command(&mut page, "quit", &mut out).unwrap(), Flow::Quit);
        assert!(matches!(
            run_command(&mut page, "jump", &mut out),
            Err(CommandError::Unknown(_))
        ));
    }

    #[test]
    fn test_commands_write_output() {
        let mut page = page();
        let mut out = Vec::new();
        run_command(&mut page, "action add", &mut out).unwrap();
        run_command(&mut page, "src", &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("added "));
        assert!(text.contains("a.png"));
    }

    #[test]
    fn test_write_failure_is_reported() {
        let mut page = page();
        assert!(matches!(
            run_command(&mut page, "help", &mut ClosedPipe),
            Err(CommandError::Io(_))
        ));
    }

    #[test]
    fn test_absolute_folder() {
        assert!(absolute_folder(Path::new(".")).is_absolute());
        assert!(absolute_folder(Path::new("no/such/folder")).is_absolute());
    }
}
