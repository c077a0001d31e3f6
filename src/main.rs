use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use postgen::app::Session;
use postgen::models::{AspectRatio, Config, ImageCount, Tone};
use postgen::templates;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "postgen")]
#[command(about = "Generate Facebook posts and matching images with Gemini")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the built-in post templates.
    Templates,
    /// Generate post text and images.
    Generate(GenerateArgs),
    /// Suggest image descriptions for a post.
    Suggest(InputArgs),
}

#[derive(Debug, Args)]
struct InputArgs {
    /// Start from a built-in template (see `postgen templates`).
    #[arg(long)]
    template: Option<String>,

    /// Post topic or text. Overrides the template's post pattern.
    #[arg(long)]
    post: Option<String>,

    /// Image description. Overrides the template's image pattern.
    #[arg(long)]
    image: Option<String>,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    #[command(flatten)]
    input: InputArgs,

    #[arg(long, default_value_t = Tone::default(), value_parser = parse_tone)]
    tone: Tone,

    /// square, portrait, landscape (or 1:1, 9:16, 16:9).
    #[arg(long, default_value_t = AspectRatio::default(), value_parser = parse_aspect_ratio)]
    aspect_ratio: AspectRatio,

    /// Number of images, 1 to 4.
    #[arg(long, default_value_t = ImageCount::default().get(), value_parser = parse_count)]
    count: u8,

    /// Directory for generated-image-<n>.png files.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

fn parse_tone(input: &str) -> std::result::Result<Tone, String> {
    input.parse().map_err(|e: postgen::Error| e.to_string())
}

fn parse_aspect_ratio(input: &str) -> std::result::Result<AspectRatio, String> {
    input.parse().map_err(|e: postgen::Error| e.to_string())
}

fn parse_count(input: &str) -> std::result::Result<u8, String> {
    let count: u8 = input
        .parse()
        .map_err(|_| format!("Invalid image count '{}'", input))?;
    ImageCount::new(count)
        .map(ImageCount::get)
        .map_err(|e| e.to_string())
}

fn apply_inputs(session: &Session, input: &InputArgs) -> Result<()> {
    if let Some(key) = &input.template {
        if !session.select_template(key) {
            bail!("Unknown template '{}'. Run `postgen templates` to list them.", key);
        }
    }
    if let Some(post) = &input.post {
        session.set_post_prompt(post.as_str());
    }
    if let Some(image) = &input.image {
        session.set_image_prompt(image.as_str());
    }
    Ok(())
}

fn print_templates() {
    for template in templates::all() {
        println!("{} ({})", template.key, template.label);
        println!("  post:  {}", template.post.lines().next().unwrap_or_default());
        println!("  image: {}", template.image);
    }
}

async fn generate(session: &Session, args: &GenerateArgs) -> Result<()> {
    apply_inputs(session, &args.input)?;
    session.set_tone(args.tone);
    session.set_aspect_ratio(args.aspect_ratio);
    session.set_number_of_images(args.count)?;

    let result = session.generate().await?;

    println!("{}", result.post_text);
    std::fs::create_dir_all(&args.out_dir)?;
    for index in 0..result.images.len() {
        // Downloads are best effort: one bad image does not sink the others.
        match session.download_image(index, &args.out_dir) {
            Ok(path) => println!("{}", path.display()),
            Err(e) => warn!("Could not save image {}: {}", index + 1, e),
        }
    }
    Ok(())
}

async fn suggest(session: &Session, input: &InputArgs) -> Result<()> {
    apply_inputs(session, input)?;
    for (index, suggestion) in session.suggest().await?.iter().enumerate() {
        println!("{}. {}", index + 1, suggestion);
    }
    Ok(())
}

fn connect<F>(load_config: F) -> Result<Session>
where
    F: FnOnce() -> postgen::Result<Config>,
{
    let config =
        load_config().map_err(|e| anyhow::anyhow!("Failed to initialize application: {}", e))?;
    Ok(Session::from_config(&config))
}

/// Configuration is loaded only for commands that call the API.
async fn run<F>(command: &Command, load_config: F) -> Result<()>
where
    F: FnOnce() -> postgen::Result<Config>,
{
    match command {
        Command::Templates => {
            print_templates();
            Ok(())
        }
        Command::Generate(generate_args) => generate(&connect(load_config)?, generate_args).await,
        Command::Suggest(input) => suggest(&connect(load_config)?, input).await,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "postgen=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting postgen");

    let args = CliArgs::parse();

    if let Err(e) = run(&args.command, Config::from_env).await {
        error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}
