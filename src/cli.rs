use std::path::{Path, PathBuf};

use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::catalog::{DEFAULT_SEARCH_LIMIT, SoundCloudClient};
use crate::config;
use crate::energy::analyze_energy;
use crate::features::{RandomPlaceholder, extract_features};
use crate::report::{self, PlaylistReport, TrackAnalysisReport};
use crate::sequencer::{LastTrackVector, SequencerOptions, build_playlist_with};
use crate::types::{Track, TransitionStyle};

const SAMPLE_GENRES: &[&str] = &[
    "House",
    "Techno",
    "Deep House",
    "Progressive",
    "Ambient",
    "Downtempo",
    "Drum & Bass",
    "Minimal",
    "Tech House",
    "Electronica",
];

const SAMPLE_KEYS: &[&str] = &[
    "C", "G", "D", "A", "E", "B", "F#", "C#", "G#", "D#", "A#", "F", "Am", "Em", "Bm", "F#m",
    "C#m", "G#m", "D#m", "A#m", "Fm", "Cm", "Gm", "Dm",
];

const SAMPLE_MOODS: &[&str] = &[
    "Deep", "Smooth", "Dark", "Light", "Groovy", "Melodic", "Hypnotic", "Dreamy",
];

/// Downtempo, house, techno and drum & bass tempo bands.
const SAMPLE_BPM_RANGES: &[(u32, u32)] = &[(80, 100), (118, 130), (125, 135), (170, 180)];

#[derive(Parser)]
#[command(name = "seedmix", about = "Build DJ playlists from seed tracks")]
enum Cli {
    /// Resolve one track and show its extracted features
    Analyze(AnalyzeArgs),
    /// Build a playlist from seed tracks
    Build(BuildArgs),
    /// Search the catalog for tracks
    Search(SearchArgs),
    /// Write a synthetic, diverse set of seed tracks as JSON
    Sample(SampleArgs),
}

#[derive(clap::Args)]
struct AnalyzeArgs {
    /// Public track page URL
    url: String,
    /// Seed for placeholder features
    #[arg(long)]
    seed: Option<u64>,
    /// Directory for the analysis JSON (defaults to SEEDMIX_OUTPUT_DIR or .)
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(clap::Args)]
struct BuildArgs {
    /// Track URL to use as a seed (repeatable)
    #[arg(long = "url")]
    urls: Vec<String>,
    /// JSON file containing an array of tracks
    #[arg(long)]
    tracks_file: Option<PathBuf>,
    /// Target playlist length in minutes
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(10..=180))]
    minutes: u32,
    /// Transition style: smooth, energetic or minimal
    #[arg(long, default_value_t = TransitionStyle::Smooth)]
    style: TransitionStyle,
    /// Seed for placeholder features
    #[arg(long)]
    seed: Option<u64>,
    /// Re-extract the last track's features before every pick
    #[arg(long)]
    refresh_last: bool,
    /// Directory for the playlist JSON (defaults to SEEDMIX_OUTPUT_DIR or .)
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(clap::Args)]
struct SearchArgs {
    query: String,
    /// Max results
    #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
    limit: u32,
}

#[derive(clap::Args)]
struct SampleArgs {
    /// Number of tracks to generate
    #[arg(long, default_value_t = 20)]
    count: usize,
    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
    /// Output file (stdout when omitted)
    #[arg(long)]
    out: Option<PathBuf>,
}

pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli {
        Cli::Analyze(args) => analyze(args).await,
        Cli::Build(args) => build(args).await,
        Cli::Search(args) => search(args).await,
        Cli::Sample(args) => sample(args),
    }
}

async fn analyze(args: AnalyzeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let client = SoundCloudClient::from_env()?;
    let track = client.resolve(&args.url).await?;

    let mut source = RandomPlaceholder::new(args.seed);
    let features = extract_features(&track, &mut source);
    println!("{}", report::render_track_analysis(&track, &features));

    let analysis = TrackAnalysisReport {
        track_info: track,
        analysis: features,
    };
    let out_dir = args.out_dir.unwrap_or_else(config::output_dir);
    let path = report::save_json(&out_dir, &analysis.file_name(), &analysis)?;
    println!("\nAnalysis saved to {}", path.display());
    Ok(())
}

async fn build(args: BuildArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut seeds = match &args.tracks_file {
        Some(path) => load_tracks_file(path)?,
        None => Vec::new(),
    };
    if !args.urls.is_empty() {
        let client = SoundCloudClient::from_env()?;
        seeds.extend(client.resolve_all(&args.urls).await);
    }
    if seeds.is_empty() {
        return Err("No seed tracks. Pass --url and/or --tracks-file.".into());
    }
    tracing::info!(
        seeds = seeds.len(),
        minutes = args.minutes,
        style = %args.style,
        "building playlist"
    );

    let options = SequencerOptions {
        target_minutes: args.minutes,
        style: args.style,
        last_track_vector: if args.refresh_last {
            LastTrackVector::Refresh
        } else {
            LastTrackVector::Cached
        },
    };
    let mut source = RandomPlaceholder::new(args.seed);
    let playlist = build_playlist_with(&seeds, &options, &mut source)?;
    let energy = analyze_energy(&playlist, &mut source);

    println!("{}", report::render_playlist_summary(&playlist, &energy));

    let playlist_report = PlaylistReport::new(playlist, energy);
    let out_dir = args.out_dir.unwrap_or_else(config::output_dir);
    let path = report::save_json(&out_dir, &playlist_report.file_name(), &playlist_report)?;
    println!("\nPlaylist saved to {}", path.display());
    Ok(())
}

async fn search(args: SearchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let client = SoundCloudClient::from_env()?;
    let tracks = client.search(&args.query, args.limit).await?;
    if tracks.is_empty() {
        println!("No tracks found for \"{}\".", args.query);
        return Ok(());
    }
    for (i, track) in tracks.iter().enumerate() {
        println!("{}. {}", i + 1, report::render_track_info(track));
        if let Some(url) = &track.permalink_url {
            println!("  URL: {url}");
        }
    }
    Ok(())
}

fn sample(args: SampleArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let tracks = sample_tracks(args.count, &mut rng);
    let json = serde_json::to_string_pretty(&tracks)?;
    match &args.out {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!(count = tracks.len(), path = %path.display(), "wrote sample tracks");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn load_tracks_file(path: &Path) -> Result<Vec<Track>, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let tracks: Vec<Track> = serde_json::from_str(&contents)
        .map_err(|e| format!("invalid tracks file {}: {e}", path.display()))?;
    tracing::debug!(count = tracks.len(), path = %path.display(), "loaded tracks file");
    Ok(tracks)
}

fn pick<'a>(rng: &mut impl Rng, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

/// Synthetic tracks spread across genres, keys and tempo bands, 3 to 9 minutes long.
fn sample_tracks(count: usize, rng: &mut impl Rng) -> Vec<Track> {
    (1..=count)
        .map(|n| {
            let (bpm_min, bpm_max) = SAMPLE_BPM_RANGES
                .choose(rng)
                .copied()
                .unwrap_or((118, 130));
            let bpm = rng.random_range(bpm_min..=bpm_max);
            let duration_seconds: u64 = rng.random_range(180..=540);
            let title = format!(
                "{} {} {n}",
                pick(rng, SAMPLE_MOODS),
                pick(rng, SAMPLE_GENRES)
            );
            Track {
                id: format!("track_{n}"),
                title,
                artist: format!("Producer_{n}"),
                duration_ms: duration_seconds * 1000,
                genre: Some(pick(rng, SAMPLE_GENRES).to_string()),
                bpm: Some(f64::from(bpm)),
                key: Some(pick(rng, SAMPLE_KEYS).to_string()),
                playback_count: 0,
                likes_count: 0,
                permalink_url: Some(format!("https://soundcloud.com/example/track_{n}")),
            }
        })
        .collect()
}
