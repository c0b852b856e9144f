use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use hexlens_core::spatial::SpatialIndex;
use hexlens_core::{generate_named, LayoutDocument, Plane, Point};
use hexlens_io::{DxfWriter, LensProject};
use hexlens_renderer::{render_preview, RenderFrame};

#[derive(Parser)]
#[command(name = "hexlens")]
#[command(about = "Hex tile electrode and conductor layout for segmented display lenses")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Write a project file holding the default lens configuration
    Init {
        path: PathBuf,
        #[arg(long)]
        name: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Generate both conductor planes as DXF plus JSON and PNG previews
    Generate {
        /// Project file; the built-in defaults are used when omitted
        #[arg(long)]
        project: Option<PathBuf>,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// Preview canvas size in pixels
        #[arg(long, default_value_t = 1600.0)]
        width: f64,
        #[arg(long, default_value_t = 1200.0)]
        height: f64,
    },
    /// List the shapes whose bounds contain a lens point (mm)
    Inspect {
        #[arg(long)]
        project: Option<PathBuf>,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Init { path, name, force } => init(&path, name, force),
        Action::Generate {
            project,
            out_dir,
            width,
            height,
        } => run_generate(project.as_deref(), &out_dir, width, height),
        Action::Inspect { project, x, y } => inspect(project.as_deref(), Point::new(x, y)),
    }
}

fn init(path: &Path, name: Option<String>, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let mut project = LensProject::default();
    if let Some(name) = name {
        project.name = name;
    }
    project
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("{}", path.display());
    Ok(())
}

/// Output files for one lens, bottom plane first.
struct Outputs {
    bottom: PathBuf,
    top: PathBuf,
    preview: PathBuf,
    png: PathBuf,
}

impl Outputs {
    fn new(out_dir: &Path, name: &str) -> Self {
        Self {
            bottom: out_dir.join(format!("{name}_bottom_rows.dxf")),
            top: out_dir.join(format!("{name}_top_columns.dxf")),
            preview: out_dir.join(format!("{name}_preview.json")),
            png: out_dir.join(format!("{name}_preview.png")),
        }
    }
}

fn load_project(project: Option<&Path>) -> Result<LensProject> {
    match project {
        Some(path) => {
            LensProject::load(path).with_context(|| format!("loading {}", path.display()))
        }
        None => {
            log::info!("No project given, using the default lens");
            Ok(LensProject::default())
        }
    }
}

fn build(project: Option<&Path>) -> Result<(LensProject, LayoutDocument)> {
    let project = load_project(project)?;
    let doc = generate_named(&project.name, &project.config)
        .with_context(|| format!("generating '{}'", project.name))?;
    Ok((project, doc))
}

fn run_generate(project: Option<&Path>, out_dir: &Path, width: f64, height: f64) -> Result<()> {
    let (project, doc) = build(project)?;

    fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    let outputs = Outputs::new(out_dir, &project.name);
    write_dxf(&doc, Plane::Bottom, &outputs.bottom)?;
    write_dxf(&doc, Plane::Top, &outputs.top)?;

    let frame = RenderFrame::fit(&doc, width, height);
    fs::write(&outputs.preview, frame.to_json()?)
        .with_context(|| format!("writing {}", outputs.preview.display()))?;
    render_preview(&doc, width as u32, height as u32)
        .save(&outputs.png)
        .with_context(|| format!("writing {}", outputs.png.display()))?;

    for warning in doc.warnings() {
        eprintln!("warning: {warning}");
    }
    for path in [&outputs.bottom, &outputs.top, &outputs.preview, &outputs.png] {
        println!("{}", path.display());
    }
    Ok(())
}

fn inspect(project: Option<&Path>, at: Point) -> Result<()> {
    let (_, doc) = build(project)?;
    let index = SpatialIndex::from_document(&doc);
    let mut hits = index.query_point(&at);
    hits.sort_by_key(|e| (e.layer_id, e.shape_index));
    if hits.is_empty() {
        println!("nothing at ({}, {})", at.x, at.y);
    }
    for entry in hits {
        let name = doc.layer(entry.layer_id).map_or("?", |l| l.name.as_str());
        match doc.line_of(entry.layer_id, entry.shape_index) {
            Some(line) => println!("{name} #{} line {line}", entry.shape_index),
            None => println!("{name} #{}", entry.shape_index),
        }
    }
    Ok(())
}

fn write_dxf(doc: &LayoutDocument, plane: Plane, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    DxfWriter::new(BufWriter::new(file))
        .plane(plane)
        .write(doc)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
