use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use formats::DEFAULT_BORDER_OBJECT;
use foundation::math::sphere::{GLOBE_RADIUS, project, unproject};
use layers::PopulationScale;
use scene::{CameraSettings, NearestOptions, OrbitCamera, SphereIndex, pick_globe};
use serde::Serialize;
use tools::{BordersSummary, CitiesSummary, CityHit, EncodeReport, Loader, PickReport, Source};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect and query the globe datasets")]
struct Args {
    /// Border dataset: TopoJSON or GeoJSON, file path or URL
    #[arg(long, env = "GLOBE_BORDERS", global = true)]
    borders: Option<String>,

    /// City dataset: JSON array, file path or URL
    #[arg(long, env = "GLOBE_CITIES", global = true)]
    cities: Option<String>,

    /// Topology object holding the borders
    #[arg(long, default_value = DEFAULT_BORDER_OBJECT, global = true)]
    border_object: String,

    /// HTTP timeout in seconds (0 disables it)
    #[arg(long, default_value_t = 15, global = true)]
    timeout_secs: u64,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarise whichever datasets are given
    Inspect,

    /// Nearest city to a geographic point
    Nearest {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Exclusive search radius in kilometres
        #[arg(long, default_value_t = 50.0)]
        radius_km: f64,
    },

    /// Pick the globe at a pixel of the default camera view
    Pick {
        #[arg(long)]
        x: f64,
        #[arg(long)]
        y: f64,
        #[arg(long, default_value_t = 1280.0)]
        width: f64,
        #[arg(long, default_value_t = 720.0)]
        height: f64,
        /// Camera distance from the globe centre
        #[arg(long)]
        distance: Option<f64>,
    },

    /// Marker size and colour for a population (omit for a missing value)
    Encode {
        population: Option<u64>,
        /// Clamp into the reference population range
        #[arg(long)]
        clamp: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let timeout = (args.timeout_secs > 0).then(|| Duration::from_secs(args.timeout_secs));
    let loader = Loader::new(timeout).context("building HTTP client")?;

    match &args.command {
        Command::Inspect => inspect(&args, &loader).await,
        Command::Nearest {
            lat,
            lon,
            radius_km,
        } => {
            let cities = load_cities(&args, &loader).await?;
            let opts = NearestOptions {
                search_radius_km: *radius_km,
                ..NearestOptions::default()
            };
            let pick = project(*lon, *lat, opts.sphere_radius);
            let index = SphereIndex::build(&cities.cities);
            let hit = index
                .nearest(pick, &cities.cities, &opts)
                .map(|h| CityHit::from_nearest(&h));
            match (&hit, args.json) {
                (_, true) => print_json(&hit),
                (Some(hit), false) => {
                    print_hit(hit);
                    Ok(())
                }
                (None, false) => {
                    println!("no city within {radius_km} km");
                    Ok(())
                }
            }
        }
        Command::Pick {
            x,
            y,
            width,
            height,
            distance,
        } => {
            let cities = load_cities(&args, &loader).await?;
            let mut settings = CameraSettings::default();
            if let Some(d) = distance {
                settings.distance = *d;
            }
            let mut camera = OrbitCamera::new(settings);
            camera.set_viewport(*width, *height);

            let report = match pick_globe(&camera, *x, *y, GLOBE_RADIUS) {
                Some(point) => {
                    let hit = SphereIndex::build(&cities.cities)
                        .nearest(point, &cities.cities, &NearestOptions::default())
                        .map(|h| CityHit::from_nearest(&h));
                    PickReport::new(Some(unproject(point)), hit)
                }
                None => PickReport::new(None, None),
            };
            if args.json {
                return print_json(&report);
            }
            match (report.location, &report.city) {
                (None, _) => println!("pixel ({x}, {y}) misses the globe"),
                (Some([lon, lat]), city) => {
                    println!("globe hit at lon {lon:.4}, lat {lat:.4}");
                    match city {
                        Some(hit) => print_hit(hit),
                        None => println!("no city within 50 km"),
                    }
                }
            }
            Ok(())
        }
        Command::Encode { population, clamp } => {
            let scale = if *clamp {
                PopulationScale::clamped()
            } else {
                PopulationScale::default()
            };
            let report = EncodeReport::new(*population, &scale);
            if args.json {
                return print_json(&report);
            }
            println!("normalized  {:.6}", report.normalized);
            println!("height      {:.6}", report.height);
            println!("radius      {:.6}", report.radius);
            println!("color       {}", report.color);
            println!(
                "cursor      height {:.6}, radius {:.6}",
                report.cursor_height, report.cursor_radius
            );
            Ok(())
        }
    }
}

async fn inspect(args: &Args, loader: &Loader) -> anyhow::Result<()> {
    if args.borders.is_none() && args.cities.is_none() {
        bail!("nothing to inspect: pass --borders and/or --cities");
    }

    #[derive(Serialize)]
    struct Inspect {
        borders: Option<BordersSummary>,
        cities: Option<CitiesSummary>,
    }

    let mut out = Inspect {
        borders: None,
        cities: None,
    };
    if let Some(src) = &args.borders {
        let source = Source::parse(src);
        let features = loader.borders(&source, &args.border_object).await?;
        out.borders = Some(BordersSummary::of(&features));
    }
    if args.cities.is_some() {
        let cities = load_cities(args, loader).await?;
        out.cities = Some(CitiesSummary::of(&cities, &PopulationScale::default()));
    }

    if args.json {
        return print_json(&out);
    }
    if let Some(b) = &out.borders {
        println!(
            "borders: {} features ({} without geometry), {} rings, {} vertices",
            b.features, b.without_geometry, b.rings, b.vertices
        );
    }
    if let Some(c) = &out.cities {
        println!(
            "cities: {} loaded, {} skipped, {} without population",
            c.cities, c.skipped, c.without_population
        );
        for (color, count) in &c.buckets {
            println!("  {color}  {count}");
        }
    }
    Ok(())
}

async fn load_cities(args: &Args, loader: &Loader) -> anyhow::Result<formats::CityDataset> {
    let Some(src) = &args.cities else {
        bail!("no city dataset: pass --cities or set GLOBE_CITIES");
    };
    Ok(loader.cities(&Source::parse(src)).await?)
}

fn print_hit(hit: &CityHit) {
    let population = hit
        .population
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{} ({}), population {}, {:.2} km away",
        hit.name, hit.country, population, hit.distance_km
    );
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
