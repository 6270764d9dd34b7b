use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use reelforge::{ImageRequest, Pipeline, RenderConfig, VideoRequest};
use tracing_subscriber::EnvFilter;

mod request;

use request::{
    MAX_AUTHOR, MAX_BODY, MAX_HEADER, MAX_SUBTITLE, check_audio_ext, check_optional_text,
    check_text, image_output_name, video_output_name,
};

#[derive(Parser, Debug)]
#[command(name = "reelforge", version)]
struct Cli {
    /// JSON render configuration; defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a vertical MP4 (requires `ffmpeg` and `ffprobe`).
    Video(VideoArgs),
    /// Render a vertical PNG still.
    Image(ImageArgs),
    /// Mix voice and music into an audio file.
    Mix(MixArgs),
    /// Apply the retention policy to the output directory.
    Sweep,
}

#[derive(Parser, Debug)]
struct VideoArgs {
    /// Voice track (.mp3/.wav).
    #[arg(long)]
    affirmation: PathBuf,

    /// Optional music bed (.mp3/.wav).
    #[arg(long)]
    music: Option<PathBuf>,

    /// Directory holding the background clip, logo and font.
    #[arg(long, default_value = "static")]
    input_dir: PathBuf,

    #[arg(long, default_value = "background.mp4")]
    background: String,

    #[arg(long, default_value = "logo.png")]
    logo: String,

    #[arg(long, default_value = "BebasNeue-Regular.ttf")]
    font: String,

    #[arg(long)]
    header: String,

    #[arg(long)]
    body: String,

    #[arg(long)]
    author: String,

    #[arg(long)]
    subtitle: Option<String>,

    /// Output file name inside the output directory.
    #[arg(long)]
    output_name: Option<String>,
}

#[derive(Parser, Debug)]
struct ImageArgs {
    /// Background image.
    #[arg(long)]
    background: PathBuf,

    #[arg(long, default_value = "static")]
    input_dir: PathBuf,

    #[arg(long, default_value = "logo.png")]
    logo: String,

    #[arg(long, default_value = "BebasNeue-Regular.ttf")]
    font: String,

    #[arg(long)]
    header: String,

    #[arg(long)]
    body: String,

    #[arg(long)]
    subtitle: Option<String>,

    #[arg(long)]
    output_name: Option<String>,
}

#[derive(Parser, Debug)]
struct MixArgs {
    #[arg(long)]
    affirmation: PathBuf,

    #[arg(long)]
    music: Option<PathBuf>,

    /// Destination audio file (.mp3/.wav).
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => RenderConfig::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => RenderConfig::default(),
    };
    let pipeline = Pipeline::new(config).context("invalid render configuration")?;

    match cli.cmd {
        Command::Video(args) => cmd_video(&pipeline, args),
        Command::Image(args) => cmd_image(&pipeline, args),
        Command::Mix(args) => cmd_mix(&pipeline, args),
        Command::Sweep => cmd_sweep(&pipeline),
    }
}

fn cmd_video(pipeline: &Pipeline, args: VideoArgs) -> anyhow::Result<()> {
    check_text("header", &args.header, MAX_HEADER)?;
    check_text("body", &args.body, MAX_BODY)?;
    check_text("author", &args.author, MAX_AUTHOR)?;
    check_optional_text("subtitle", args.subtitle.as_deref(), MAX_SUBTITLE)?;
    check_audio_ext("affirmation", &args.affirmation)?;
    if let Some(music) = &args.music {
        check_audio_ext("music", music)?;
    }

    let output_name = args
        .output_name
        .unwrap_or_else(|| video_output_name(unix_now(), &args.affirmation));
    let req = VideoRequest {
        affirmation: args.affirmation,
        music: args.music,
        background: args.input_dir.join(&args.background),
        logo: args.input_dir.join(&args.logo),
        font: args.input_dir.join(&args.font),
        header: args.header,
        body: args.body,
        author: args.author,
        subtitle: args.subtitle,
        output_name,
    };

    let outcome = pipeline.render_video(&req).context("render video")?;
    tracing::info!(
        secs = outcome.duration_sec,
        frames = outcome.frames,
        bytes = outcome.artifact.size_bytes,
        "video ready"
    );
    println!("{}", outcome.artifact.path.display());
    Ok(())
}

fn cmd_image(pipeline: &Pipeline, args: ImageArgs) -> anyhow::Result<()> {
    check_text("header", &args.header, MAX_HEADER)?;
    check_text("body", &args.body, MAX_BODY)?;
    check_optional_text("subtitle", args.subtitle.as_deref(), MAX_SUBTITLE)?;

    let req = ImageRequest {
        background: args.background,
        logo: args.input_dir.join(&args.logo),
        font: args.input_dir.join(&args.font),
        header: args.header,
        body: args.body,
        subtitle: args.subtitle,
        output_name: args
            .output_name
            .unwrap_or_else(|| image_output_name(unix_now())),
    };

    let outcome = pipeline.render_image(&req).context("render image")?;
    println!("{}", outcome.artifact.path.display());
    Ok(())
}

fn cmd_mix(pipeline: &Pipeline, args: MixArgs) -> anyhow::Result<()> {
    check_audio_ext("affirmation", &args.affirmation)?;
    if let Some(music) = &args.music {
        check_audio_ext("music", music)?;
    }
    check_audio_ext("out", &args.out)?;

    let track = pipeline
        .mix_audio(&args.affirmation, args.music.as_deref())
        .context("mix audio")?;
    let artifact = reelforge::export_audio(&pipeline.config().tools, &track.pcm, &args.out)
        .with_context(|| format!("export '{}'", args.out.display()))?;
    tracing::info!(secs = track.duration_sec(), "mix ready");
    println!("{}", artifact.path.display());
    Ok(())
}

fn cmd_sweep(pipeline: &Pipeline) -> anyhow::Result<()> {
    let report = pipeline.sweep().context("retention sweep")?;
    for failure in &report.failures {
        eprintln!("warning: {failure}");
    }
    println!(
        "kept {} deleted {} in {}",
        report.kept.len(),
        report.deleted.len(),
        pipeline.config().output_dir.display()
    );
    Ok(())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
