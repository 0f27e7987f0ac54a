mod scan;

use std::path::PathBuf;

use clap::Parser;
use photo_groups_core::{cluster_points, GeoPoint, GroupMode, Locale, Timeline, TimelineOptions, Zone};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "photo-groups", version, about = "Group photos by capture date using EXIF fields and Takeout sidecars")]
struct Cli {
    /// Directory to scan, or a JSON record manifest with --records
    path: PathBuf,

    /// Treat PATH as a JSON array of photo records
    #[arg(long)]
    records: bool,

    /// Grouping: day, week, month or year
    #[arg(short, long, default_value = "day")]
    mode: GroupMode,

    /// Label language: en, de, fr or es
    #[arg(long, default_value = "en")]
    locale: Locale,

    /// Bucket in UTC instead of the system zone
    #[arg(long)]
    utc: bool,

    /// Bucket in this zone: an IANA name like Europe/Berlin, an offset like +02:00, or local
    #[arg(long, value_name = "ZONE", conflicts_with = "utc")]
    tz: Option<Zone>,

    /// Print the timeline as JSON
    #[arg(long)]
    json: bool,

    /// Also cluster geotagged photos within this many meters
    #[arg(long)]
    cluster_radius: Option<f64>,

    /// Verbose logging (debug level)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Cluster<'a> {
    center: GeoPoint,
    photos: Vec<&'a str>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn clusters(timeline: &Timeline, radius_m: f64) -> Vec<Cluster<'_>> {
    let (photos, points): (Vec<_>, Vec<_>) = timeline.geotagged().unzip();
    cluster_points(&points, radius_m)
        .into_iter()
        .map(|c| Cluster {
            center: c.center,
            photos: c.members.iter().map(|&i| photos[i].record.name.as_str()).collect(),
        })
        .collect()
}

fn print_text(timeline: &Timeline) {
    for group in &timeline.groups {
        println!("{} ({}) - {} photos", group.label, group.key, group.photos.len());
        for photo in &group.photos {
            println!(
                "  {}  {}  [{}]",
                photo.captured.instant.format("%Y-%m-%d %H:%M:%S"),
                photo.record.name,
                photo.captured.source
            );
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let t_total = std::time::Instant::now();

    let options = TimelineOptions {
        mode: cli.mode,
        locale: cli.locale,
        utc: cli.utc,
        timezone: cli.tz,
    };
    let ctx = options.time_context();
    tracing::debug!("Bucketing in {}", ctx.zone);

    let input = if cli.records {
        scan::read_manifest(&cli.path)?
    } else {
        scan::scan_dir(&cli.path)?
    };

    let timeline = photo_groups_core::build_timeline(&input.records, &input.sidecars, &options, &ctx);
    let clustered = cli.cluster_radius.map(|radius| clusters(&timeline, radius));

    if cli.json {
        let out = serde_json::json!({ "timeline": timeline, "clusters": clustered });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_text(&timeline);
        if let Some(clustered) = &clustered {
            println!();
            for cluster in clustered {
                println!(
                    "{:.5},{:.5} - {}",
                    cluster.center.latitude,
                    cluster.center.longitude,
                    cluster.photos.join(", ")
                );
            }
        }
    }

    eprintln!(
        "Done! {} files, {} photos, {} sidecars, {} {} groups ({:.2}s)",
        timeline.total_records,
        timeline.photo_count,
        timeline.sidecar_count,
        timeline.groups.len(),
        timeline.mode,
        t_total.elapsed().as_secs_f64()
    );

    Ok(())
}
