use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use panelcast::{
    CompiledScene, DescriptorCompiler, EngineEvent, FsSceneStore, PanelConfig,
    RecognitionRuntime, RecordingAudioOutput, RecordingVideoControl, SceneGraph, SceneManifest,
    SceneStore, ScriptedEngine,
};
use sha2::Digest as _;

#[derive(Parser, Debug)]
#[command(name = "panelcast", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a scene manifest into a stored scene.
    Compile(CompileArgs),
    /// List stored scenes.
    List(StoreArgs),
    /// Show one stored scene.
    Show(ShowArgs),
    /// Delete a stored scene.
    Delete(SceneArgs),
    /// Drive a stored scene through the runtime with a scripted event list.
    Replay(ReplayArgs),
}

#[derive(Parser, Debug)]
struct StoreArgs {
    /// Scene store directory.
    #[arg(long)]
    store: PathBuf,
}

#[derive(Parser, Debug)]
struct SceneArgs {
    #[arg(long)]
    store: PathBuf,

    /// Scene id.
    #[arg(long)]
    id: String,
}

#[derive(Parser, Debug)]
struct CompileArgs {
    /// Scene manifest JSON. Relative image paths resolve against its directory.
    #[arg(long)]
    manifest: PathBuf,

    #[arg(long)]
    store: PathBuf,

    /// Optional config JSON (compile and session options).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ShowArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Print the declarative scene graph markup instead of the page list.
    #[arg(long)]
    markup: bool,
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// JSON array of replay steps, e.g. `["Loaded", {"Found": 0}, "ToggleNarration"]`.
    #[arg(long)]
    events: PathBuf,

    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Debug, serde::Deserialize)]
enum ReplayStep {
    Loaded,
    Found(usize),
    Lost(usize),
    ArError(String),
    ToggleNarration,
    /// Every live narration playback reaches its natural end.
    NarrationEnded,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Compile(args) => cmd_compile(args),
        Command::List(args) => cmd_list(args),
        Command::Show(args) => cmd_show(args),
        Command::Delete(args) => cmd_delete(args),
        Command::Replay(args) => cmd_replay(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<PanelConfig> {
    match path {
        Some(p) => Ok(PanelConfig::from_json_file(p)?),
        None => Ok(PanelConfig::default()),
    }
}

fn load_scene(args: &SceneArgs) -> anyhow::Result<CompiledScene> {
    let store = FsSceneStore::open(&args.store)?;
    store
        .get(&args.id)?
        .with_context(|| format!("no scene '{}' in '{}'", args.id, args.store.display()))
}

fn cmd_compile(args: CompileArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let manifest = SceneManifest::from_json_file(&args.manifest)?;
    let (name, drafts) = manifest.into_drafts()?;
    let root = args.manifest.parent().unwrap_or_else(|| Path::new("."));

    let mut compiler = DescriptorCompiler::new(cfg.compile);
    let mut on_progress = |p: u8| tracing::debug!(percent = p, "compiling targets");
    let scene = panelcast::compile_scene(name, &drafts, root, &mut compiler, &mut on_progress)?;

    let mut store = FsSceneStore::open(&args.store)?;
    store.save(&scene)?;

    let artifact = scene.decode_artifact()?;
    println!("{}", scene.id);
    eprintln!(
        "compiled '{}': {} pages, artifact {} bytes, sha256 {}",
        scene.name,
        scene.pages.len(),
        artifact.len(),
        sha256_hex(&artifact)
    );
    Ok(())
}

fn cmd_list(args: StoreArgs) -> anyhow::Result<()> {
    let store = FsSceneStore::open(&args.store)?;
    for s in store.list()? {
        println!("{}\t{}\t{} pages\t{}", s.id, s.name, s.page_count, s.description);
    }
    Ok(())
}

fn cmd_show(args: ShowArgs) -> anyhow::Result<()> {
    let scene = load_scene(&args.scene)?;
    if args.markup {
        print!("{}", SceneGraph::build(&scene).to_markup("<artifact>"));
        return Ok(());
    }

    let artifact = scene.decode_artifact()?;
    println!("{} ({})", scene.name, scene.id);
    println!("{}", scene.description);
    println!("artifact: {} bytes, sha256 {}", artifact.len(), sha256_hex(&artifact));
    for (idx, page) in scene.pages.iter().enumerate() {
        let content = page
            .content
            .as_ref()
            .map(|c| format!("{:?}", c.kind))
            .unwrap_or_else(|| "-".to_string());
        let narration = if page.has_narration() { "narrated" } else { "silent" };
        println!(
            "  target {idx}: page {} \"{}\" content={content} {narration}",
            page.page_number,
            page.display_title()
        );
    }
    Ok(())
}

fn cmd_delete(args: SceneArgs) -> anyhow::Result<()> {
    let mut store = FsSceneStore::open(&args.store)?;
    if !store.delete(&args.id)? {
        anyhow::bail!("no scene '{}' in '{}'", args.id, args.store.display());
    }
    eprintln!("deleted {}", args.id);
    Ok(())
}

fn cmd_replay(args: ReplayArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let scene = load_scene(&args.scene)?;
    let text = std::fs::read_to_string(&args.events)
        .with_context(|| format!("read replay events '{}'", args.events.display()))?;
    let steps: Vec<ReplayStep> =
        serde_json::from_str(&text).with_context(|| "parse replay events JSON")?;

    let engine = ScriptedEngine::new().checking_targets();
    let probe = engine.probe();
    let audio = RecordingAudioOutput::new();
    let audio_log = audio.log();
    let mut rt = RecognitionRuntime::new(
        scene,
        Box::new(engine),
        Box::new(audio),
        Box::new(RecordingVideoControl::new()),
        cfg.session,
    );
    rt.mount()?;

    for step in steps {
        match step {
            ReplayStep::Loaded => probe.push(EngineEvent::Loaded),
            ReplayStep::Found(i) => probe.push(EngineEvent::TargetFound(i)),
            ReplayStep::Lost(i) => probe.push(EngineEvent::TargetLost(i)),
            ReplayStep::ArError(detail) => probe.push(EngineEvent::ArError(detail)),
            ReplayStep::ToggleNarration => {
                rt.toggle_narration();
            }
            ReplayStep::NarrationEnded => {
                for id in audio_log.live_playbacks() {
                    audio_log.finish(id);
                }
            }
        }
        rt.pump();

        let active = rt
            .active_page()
            .map(|p| p.display_title())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:?}\tactive={active}\tnarration={}\t{}",
            rt.state(),
            rt.is_narration_playing(),
            rt.status_message()
        );
    }

    rt.teardown();
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
