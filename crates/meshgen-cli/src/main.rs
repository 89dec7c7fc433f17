use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use meshgen_algo::background::BackgroundMode;
use meshgen_algo::classifier::MatchMode;
use meshgen_algo::pipeline::{Conversion, Pipeline, PipelineConfig};
use meshgen_core::export::{export_via_tempfile, StlExporter};
use meshgen_core::report::InputKind;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "meshgen")]
#[command(about = "Turn an image silhouette or a short prompt into a printable STL mesh.")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extrude the outline found in a raster image.
    Image {
        input: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
        #[arg(long)]
        edges: Option<PathBuf>,
        #[arg(long, value_enum)]
        background: Option<BackgroundArg>,
    },
    /// Assemble primitives for the object a prompt names.
    Text {
        prompt: String,
        #[command(flatten)]
        output: OutputArgs,
        #[arg(long, value_enum)]
        match_mode: Option<MatchModeArg>,
    },
}

#[derive(Debug, clap::Args)]
struct OutputArgs {
    #[arg(long, default_value = "model.stl")]
    out: PathBuf,
    #[arg(long)]
    preview: Option<PathBuf>,
    #[arg(long)]
    report: Option<PathBuf>,
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum BackgroundArg {
    None,
    Border,
}

impl From<BackgroundArg> for BackgroundMode {
    fn from(arg: BackgroundArg) -> Self {
        match arg {
            BackgroundArg::None => BackgroundMode::None,
            BackgroundArg::Border => BackgroundMode::Border,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum MatchModeArg {
    Substring,
    WholeWord,
}

impl From<MatchModeArg> for MatchMode {
    fn from(arg: MatchModeArg) -> Self {
        match arg {
            MatchModeArg::Substring => MatchMode::Substring,
            MatchModeArg::WholeWord => MatchMode::WholeWord,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Image {
            input,
            output,
            edges,
            background,
        } => image(&input, &output, edges.as_deref(), background),
        Command::Text {
            prompt,
            output,
            match_mode,
        } => text(&prompt, &output, match_mode),
    }
}

fn image(
    input: &Path,
    out: &OutputArgs,
    edges: Option<&Path>,
    background: Option<BackgroundArg>,
) -> Result<()> {
    ensure_input_file(input)?;

    let mut cfg = load_config(out.config.as_deref())?;
    if let Some(mode) = background {
        cfg.background = mode.into();
    }

    let pipeline = Pipeline::new(cfg);
    let conversion = pipeline
        .image_file_to_mesh(input)
        .with_context(|| format!("convert image: {input:?}"))?;

    if let (Some(path), Some(map)) = (edges, conversion.edges.as_ref()) {
        ensure_parent(path);
        map.as_image()
            .save(path)
            .with_context(|| format!("write edges: {path:?}"))?;
    }

    let name = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    let label = input.display().to_string();
    write_outputs(&pipeline, &conversion, name, InputKind::Image, &label, out)
}

fn text(prompt: &str, out: &OutputArgs, match_mode: Option<MatchModeArg>) -> Result<()> {
    let mut cfg = load_config(out.config.as_deref())?;
    if let Some(mode) = match_mode {
        cfg.classifier.match_mode = mode.into();
    }

    let pipeline = Pipeline::new(cfg);
    let conversion = pipeline.text_to_mesh(prompt).context("convert prompt")?;
    let name = conversion
        .category
        .map(|c| c.as_str())
        .unwrap_or("model");
    write_outputs(&pipeline, &conversion, name, InputKind::Text, prompt, out)
}

fn write_outputs(
    pipeline: &Pipeline,
    conversion: &Conversion,
    name: &str,
    kind: InputKind,
    input: &str,
    out: &OutputArgs,
) -> Result<()> {
    let cfg = pipeline.config();

    let exporter = StlExporter::new(cfg.stl_format, name);
    let stl = export_via_tempfile(&exporter, &conversion.mesh).context("export mesh")?;
    ensure_parent(&out.out);
    std::fs::write(&out.out, &stl).with_context(|| format!("write stl: {:?}", out.out))?;
    info!(path = ?out.out, bytes = stl.len(), "mesh written");

    if let Some(path) = out.preview.as_deref() {
        match cfg.preview.previewer().render(&conversion.mesh) {
            Some(img) => {
                ensure_parent(path);
                img.save(path)
                    .with_context(|| format!("write preview: {path:?}"))?;
            }
            None => info!("preview backend disabled, skipping {path:?}"),
        }
    }

    let report = conversion.report(kind, input);
    let json = serde_json::to_string_pretty(&report).context("serialize report")?;
    if let Some(path) = out.report.as_deref() {
        ensure_parent(path);
        std::fs::write(path, &json).with_context(|| format!("write report: {path:?}"))?;
    } else {
        println!("{json}");
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    ensure_input_file(path)?;
    let raw = std::fs::read_to_string(path).with_context(|| format!("read config: {path:?}"))?;
    serde_json::from_str(&raw).with_context(|| format!("parse config: {path:?}"))
}

fn ensure_parent(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
}

fn ensure_input_file(input: &Path) -> Result<()> {
    match std::fs::metadata(input) {
        Ok(meta) => {
            if meta.is_file() {
                Ok(())
            } else {
                bail!("input is not a file: {input:?}");
            }
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            if let Some(root) = find_workspace_root(&cwd) {
                bail!(
                    "input not found: {input:?} (cwd: {cwd:?}).\nHint: run from the workspace root {root:?} or pass an absolute path."
                );
            }
            bail!("input not found: {input:?} (cwd: {cwd:?}).");
        }
        Err(err) => Err(err).with_context(|| format!("stat input: {input:?}")),
    }
}

fn find_workspace_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join("Cargo.lock").is_file())
        .map(|dir| dir.to_path_buf())
}
