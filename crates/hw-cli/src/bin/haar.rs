use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use haar_wavelet::{
    Band, DecomposeConfig, Decomposer, Decomposition, Error, Execution, Image, ImageSource,
    Narrowing, TransformConfig,
};
use image::{GrayImage, Rgb, RgbImage};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "haar")]
#[command(about = "Multi-level Haar wavelet decomposition of grayscale images")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decompose an image and write the nested subband montage
    #[command(name = "decompose")]
    Decompose(DecomposeArgs),
    /// Decompose, then invert every level back to full resolution
    #[command(name = "reconstruct")]
    Reconstruct(ReconstructArgs),
}

#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// Source image. `.txt` files use the text format (`height<TAB>width`
    /// header followed by samples); anything else is decoded and converted
    /// to 8-bit grayscale.
    #[arg(long, required = true)]
    input: PathBuf,
    /// Number of decomposition levels
    #[arg(long, default_value_t = 3)]
    levels: usize,
    /// Worker threads for the per-block loop (0 = one per logical CPU)
    #[arg(long, default_value_t = 0)]
    workers: usize,
    /// Run the per-block loop on the calling thread only
    #[arg(long, conflicts_with = "workers")]
    sequential: bool,
    /// Saturate butterfly results instead of wrapping modulo 256
    #[arg(long)]
    clamp: bool,
    #[arg(long, default_value = "out")]
    out: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct DecomposeArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Also write every band of every level as its own PNG
    #[arg(long)]
    bands: bool,
}

#[derive(Args, Debug, Clone)]
struct ReconstructArgs {
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Debug, Clone, Serialize)]
struct MetaDecompose {
    input: String,
    width: usize,
    height: usize,
    levels: usize,
    execution: String,
    narrowing: &'static str,
    level_sizes: Vec<[usize; 2]>,
    decompose_ms: f64,
    merge_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
struct MetaReconstruct {
    input: String,
    width: usize,
    height: usize,
    levels: usize,
    narrowing: &'static str,
    differing_samples: usize,
    max_abs_diff: u8,
    elapsed_ms: f64,
}

/// Image file on disk, dispatched on extension.
#[derive(Debug, Clone)]
enum FileSource {
    Text(PathBuf),
    Encoded(PathBuf),
}

impl FileSource {
    fn from_path(path: &Path) -> Self {
        let is_text = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
        if is_text {
            Self::Text(path.to_path_buf())
        } else {
            Self::Encoded(path.to_path_buf())
        }
    }
}

impl ImageSource for FileSource {
    fn read_u8(&mut self) -> Result<Image<u8>, Error> {
        match &*self {
            Self::Text(path) => {
                let text = fs::read_to_string(path).map_err(|e| unavailable(path, e))?;
                parse_text_image(&text).map_err(|reason| unavailable(path, reason))
            }
            Self::Encoded(path) => {
                let rgb = image::open(path)
                    .map_err(|e| unavailable(path, e))?
                    .to_rgb8();
                let (w, h) = rgb.dimensions();
                Image::from_vec(w as usize, h as usize, gray_levels(&rgb))
                    .map_err(|e| unavailable(path, e))
            }
        }
    }
}

/// Equal-weight `(r + g + b) / 3`, truncated. Alpha is dropped.
fn gray_levels(rgb: &RgbImage) -> Vec<u8> {
    rgb.pixels()
        .map(|&Rgb([r, g, b])| ((u16::from(r) + u16::from(g) + u16::from(b)) / 3) as u8)
        .collect()
}

fn unavailable(path: &Path, reason: impl std::fmt::Display) -> Error {
    Error::SourceUnavailable(format!("{}: {reason}", path.display()))
}

/// Parses `height width` followed by `height * width` samples, all
/// whitespace separated.
fn parse_text_image(text: &str) -> Result<Image<u8>, String> {
    let mut tokens = text.split_whitespace();
    let mut header = |what: &str| -> Result<usize, String> {
        let tok = tokens.next().ok_or_else(|| format!("missing {what} in header"))?;
        tok.parse()
            .map_err(|_| format!("{what} '{tok}' is not a non-negative integer"))
    };
    let height = header("height")?;
    let width = header("width")?;

    let len = width
        .checked_mul(height)
        .ok_or_else(|| format!("{width}x{height} overflows"))?;
    let mut data = Vec::with_capacity(len);
    for i in 0..len {
        let tok = tokens
            .next()
            .ok_or_else(|| format!("expected {len} samples, found {i}"))?;
        let v = tok
            .parse::<u8>()
            .map_err(|_| format!("sample {i} '{tok}' is not in 0..=255"))?;
        data.push(v);
    }

    Image::from_vec(width, height, data).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Command::Decompose(args) => run_decompose(args),
        Command::Reconstruct(args) => run_reconstruct(args),
    }
}

fn run_decompose(args: DecomposeArgs) -> Result<()> {
    let common = &args.common;
    ensure_file_exists(&common.input, "input")?;
    let decomposer = build_decomposer(common)?;

    let t0 = Instant::now();
    let decomp = decomposer
        .decompose_source(FileSource::from_path(&common.input))
        .with_context(|| format!("decomposing {}", common.input.display()))?;
    let decompose_ms = t0.elapsed().as_secs_f64() * 1e3;

    let t1 = Instant::now();
    let montage = decomp.merge();
    let merge_ms = t1.elapsed().as_secs_f64() * 1e3;

    println!(
        "decomposed {}: {}x{} into {} levels",
        common.input.display(),
        decomp.source_width(),
        decomp.source_height(),
        decomp.num_levels()
    );
    println!("Exec time: \t{decompose_ms:.3} ms");

    fs::create_dir_all(&common.out)
        .with_context(|| format!("creating output directory {}", common.out.display()))?;
    save_u8_image(common.out.join("montage.png"), &montage)?;
    if args.bands {
        save_bands(&common.out, &decomp)?;
    }

    write_json(
        common.out.join("meta.json"),
        &MetaDecompose {
            input: common.input.display().to_string(),
            width: decomp.source_width(),
            height: decomp.source_height(),
            levels: decomp.num_levels(),
            execution: execution_label(decomposer.config().transform.execution),
            narrowing: narrowing_label(decomposer.config().transform.narrowing),
            level_sizes: decomp
                .levels()
                .iter()
                .map(|set| [set.width(), set.height()])
                .collect(),
            decompose_ms,
            merge_ms,
        },
    )?;

    println!("results written to {}", common.out.display());
    Ok(())
}

fn run_reconstruct(args: ReconstructArgs) -> Result<()> {
    let common = &args.common;
    ensure_file_exists(&common.input, "input")?;
    let decomposer = build_decomposer(common)?;
    let narrowing = decomposer.config().transform.narrowing;

    let t0 = Instant::now();
    let src = FileSource::from_path(&common.input)
        .read_u8()
        .with_context(|| format!("loading {}", common.input.display()))?;
    let decomp = decomposer
        .decompose(&src.as_view())
        .with_context(|| format!("decomposing {}", common.input.display()))?;
    let rebuilt = decomp.reconstruct(narrowing);
    let elapsed_ms = t0.elapsed().as_secs_f64() * 1e3;

    let (differing_samples, max_abs_diff) = compare(&src, &rebuilt);
    println!(
        "reconstructed {}x{} from {} levels: {differing_samples} samples differ (max |diff| {max_abs_diff})",
        rebuilt.width(),
        rebuilt.height(),
        decomp.num_levels()
    );
    println!("Exec time: \t{elapsed_ms:.3} ms");

    fs::create_dir_all(&common.out)
        .with_context(|| format!("creating output directory {}", common.out.display()))?;
    save_u8_image(common.out.join("reconstructed.png"), &rebuilt)?;
    write_json(
        common.out.join("meta.json"),
        &MetaReconstruct {
            input: common.input.display().to_string(),
            width: rebuilt.width(),
            height: rebuilt.height(),
            levels: decomp.num_levels(),
            narrowing: narrowing_label(narrowing),
            differing_samples,
            max_abs_diff,
            elapsed_ms,
        },
    )?;

    Ok(())
}

fn build_decomposer(common: &CommonArgs) -> Result<Decomposer> {
    let execution = if common.sequential {
        Execution::Sequential
    } else {
        Execution::Parallel {
            workers: common.workers,
        }
    };
    let narrowing = if common.clamp {
        Narrowing::Clamp
    } else {
        Narrowing::Wrap
    };

    Decomposer::new(DecomposeConfig {
        levels: common.levels,
        transform: TransformConfig {
            execution,
            narrowing,
        },
    })
    .context("configuring decomposer")
}

fn compare(a: &Image<u8>, b: &Image<u8>) -> (usize, u8) {
    a.data()
        .iter()
        .zip(b.data())
        .map(|(&x, &y)| x.abs_diff(y))
        .filter(|&d| d > 0)
        .fold((0, 0), |(count, max), d| (count + 1, max.max(d)))
}

fn save_bands(dir: &Path, decomp: &Decomposition) -> Result<()> {
    for (k, set) in decomp.levels().iter().enumerate() {
        for band in Band::ALL {
            save_u8_image(
                dir.join(format!("level_{k}_{}.png", band.name())),
                set.band(band),
            )?;
        }
    }
    Ok(())
}

fn execution_label(execution: Execution) -> String {
    match execution {
        Execution::Sequential => "sequential".to_string(),
        Execution::Parallel { workers: 0 } => "parallel (rayon default)".to_string(),
        Execution::Parallel { workers } => format!("parallel ({workers} workers)"),
    }
}

fn narrowing_label(narrowing: Narrowing) -> &'static str {
    match narrowing {
        Narrowing::Wrap => "wrap",
        Narrowing::Clamp => "clamp",
    }
}

fn save_u8_image(path: PathBuf, img: &Image<u8>) -> Result<()> {
    let gray = GrayImage::from_raw(img.width() as u32, img.height() as u32, img.data().to_vec())
        .context("constructing GrayImage from raw bytes")?;
    gray.save(&path)
        .with_context(|| format!("saving image {}", path.display()))
}

fn write_json(path: PathBuf, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(&path, bytes).with_context(|| format!("writing json {}", path.display()))
}

fn ensure_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{} file does not exist: {}", what, path.display());
    }
    if !path.is_file() {
        bail!("{} path is not a file: {}", what, path.display());
    }
    Ok(())
}
