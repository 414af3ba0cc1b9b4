use std::fmt::Display;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Args, Parser, Subcommand, ValueEnum};
use ephq_config::EphqConfig;
use ephq_rs::{
    Atmosphere, BodyId, EngineDateString, GeoLocation, GlobalEclipse, LocalLunarEclipse,
    LocalOccultation, LocalSolarEclipse, LocalView, PositionResult, SearchDirection, SeriesEntry,
    UtcTime,
};

/// Samples along the central line for `solar-map`.
const DEFAULT_TRACK_SAMPLES: usize = 80;

#[derive(Parser)]
#[command(name = "ephq", about = "Positions, rise/set times, eclipses and occultations")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Ephemeris data directory (overrides EPHQ_EPHE_PATH and the config file)
    #[arg(long, global = true)]
    ephe_path: Option<PathBuf>,
    #[command(flatten)]
    observer: ObserverArgs,
    /// Minutes east of UTC for displayed times, e.g. -300 for UTC-5
    #[arg(long, global = true, default_value = "0", allow_hyphen_values = true)]
    utc_offset: i32,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ObserverArgs {
    /// Observer longitude in degrees, east positive
    #[arg(long, global = true, allow_hyphen_values = true)]
    lon: Option<f64>,
    /// Observer latitude in degrees, north positive
    #[arg(long, global = true, allow_hyphen_values = true)]
    lat: Option<f64>,
    /// Observer altitude in metres
    #[arg(long, global = true)]
    alt: Option<f64>,
    /// Atmospheric pressure in hPa (0 disables refraction)
    #[arg(long, global = true)]
    pressure: Option<f64>,
    /// Temperature in °C
    #[arg(long, global = true, allow_hyphen_values = true)]
    temperature: Option<f64>,
}

#[derive(Args)]
struct SearchArgs {
    /// UTC start (YYYY-MM-DDThh:mm:ssZ or "now")
    #[arg(long, default_value = "now")]
    date: String,
    /// Search backward in time
    #[arg(long)]
    backward: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum SeriesKind {
    Solar,
    Lunar,
    Occult,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a UTC time to UT1 and TT Julian Dates
    Utc2jd {
        /// UTC datetime (YYYY-MM-DDThh:mm:ssZ)
        date: String,
    },
    /// Render a UT1 Julian Date as calendar text
    Jd2utc {
        /// UT1 Julian Date
        jd: f64,
    },
    /// Topocentric position of a body
    Position {
        /// Body name or engine number
        body: String,
        /// UTC datetime (YYYY-MM-DDThh:mm:ssZ or "now")
        #[arg(long, default_value = "now")]
        date: String,
    },
    /// Position from a UT1 Julian Date (terrestrial time from ΔT)
    Live {
        body: String,
        /// UT1 Julian Date (default: now)
        #[arg(long)]
        jd: Option<f64>,
    },
    /// Next rise of a body
    Rise {
        body: String,
        #[arg(long, default_value = "now")]
        date: String,
    },
    /// Next set of a body
    Set {
        body: String,
        #[arg(long, default_value = "now")]
        date: String,
    },
    /// Next upper meridian transit of a body
    Transit {
        body: String,
        #[arg(long, default_value = "now")]
        date: String,
    },
    /// Every body's position and next set
    WhatsUp {
        #[arg(long, default_value = "now")]
        date: String,
    },
    /// Next solar eclipse anywhere on Earth
    SolarGlobal {
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Next solar eclipse seen from the observer
    SolarLocal {
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Central line of the next solar eclipse
    SolarMap {
        #[command(flatten)]
        search: SearchArgs,
        /// Number of steps between begin and end
        #[arg(long, default_value_t = DEFAULT_TRACK_SAMPLES)]
        samples: usize,
    },
    /// Next lunar eclipse anywhere on Earth
    LunarGlobal {
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Next lunar eclipse seen from the observer
    LunarLocal {
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Next lunar occultation of a body anywhere on Earth
    OccultGlobal {
        body: String,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Next lunar occultation of a body seen from the observer
    OccultLocal {
        #[arg(required_unless_present = "all_planets")]
        body: Option<String>,
        /// Scan Mercury through Pluto instead of a single body
        #[arg(long, conflicts_with = "body")]
        all_planets: bool,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Consecutive events with local visibility
    Series {
        #[arg(value_enum)]
        kind: SeriesKind,
        /// Occulted body (occult series only)
        #[arg(long, default_value = "venus")]
        body: String,
        /// Number of events
        #[arg(long, default_value = "5")]
        count: usize,
        #[command(flatten)]
        search: SearchArgs,
    },
}

fn main() {
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();
    let config = or_exit(load_config(&cli), "Failed to load configuration");
    log::debug!("effective configuration: {config:?}");
    or_exit(ephq_rs::init(&config), "Failed to initialize ephemeris");
    let ctx = Context {
        config,
        observer: cli.observer,
        utc_offset: cli.utc_offset,
    };

    match cli.command {
        Commands::Utc2jd { date } => {
            let utc = or_exit(parse_utc(&date), "Invalid date");
            let pair = or_exit(ephq_rs::utc_to_jd(&utc), "Conversion failed");
            println!("UT1: {:.8}", pair.ut1);
            println!("TT:  {:.8}", pair.tt);
            println!("ΔT:  {:.3} s", pair.delta_t_seconds());
        }

        Commands::Jd2utc { jd } => {
            let text = or_exit(ephq_rs::jd_to_utc(jd), "Conversion failed");
            println!("{text}");
        }

        Commands::Position { body, date } => {
            let body = require_body(&body);
            let utc = or_exit(parse_utc(&date), "Invalid date");
            let pos = or_exit(
                ephq_rs::position(body, &utc, &ctx.require_observer(), &ctx.atmosphere()),
                "Position failed",
            );
            print_position(body, &pos);
        }

        Commands::Live { body, jd } => {
            let body = require_body(&body);
            let jd = jd.unwrap_or_else(|| ctx.ut1("now"));
            let pos = or_exit(
                ephq_rs::live_position(body, jd, &ctx.require_observer(), &ctx.atmosphere()),
                "Position failed",
            );
            print_position(body, &pos);
        }

        Commands::Rise { body, date } => {
            let body = require_body(&body);
            let jd = or_exit(
                ephq_rs::next_rise(
                    body,
                    ctx.ut1(&date),
                    &ctx.require_observer(),
                    &ctx.atmosphere(),
                ),
                "Rise search failed",
            );
            println!("{body} rises {}", ctx.show(jd));
        }

        Commands::Set { body, date } => {
            let body = require_body(&body);
            let jd = or_exit(
                ephq_rs::next_set(
                    body,
                    ctx.ut1(&date),
                    &ctx.require_observer(),
                    &ctx.atmosphere(),
                ),
                "Set search failed",
            );
            println!("{body} sets {}", ctx.show(jd));
        }

        Commands::Transit { body, date } => {
            let body = require_body(&body);
            let jd = or_exit(
                ephq_rs::next_transit(body, ctx.ut1(&date), &ctx.require_observer()),
                "Transit search failed",
            );
            println!("{body} transits {}", ctx.show(jd));
        }

        Commands::WhatsUp { date } => {
            let utc = or_exit(parse_utc(&date), "Invalid date");
            let pair = or_exit(ephq_rs::utc_to_jd(&utc), "Conversion failed");
            let sky = or_exit(
                ephq_rs::whats_up(&pair, &ctx.require_observer(), &ctx.atmosphere()),
                "Sky query failed",
            );
            println!(
                "{:<8} {:>9} {:>9} {:>7}  next set",
                "body", "azimuth", "altitude", "mag"
            );
            for entry in sky {
                let set = entry
                    .next_set
                    .map_or_else(|| "never".to_string(), |jd| ctx.show(jd));
                println!(
                    "{:<8} {:>9.3} {:>9.3} {:>7.2}  {set}",
                    entry.body.to_string(),
                    entry.position.azimuth_deg,
                    entry.position.altitude_deg,
                    entry.position.magnitude,
                );
            }
        }

        Commands::SolarGlobal { search } => {
            let ev = or_exit(
                ephq_rs::solar_eclipse_global(ctx.ut1(&search.date), direction(&search)),
                "Solar eclipse search failed",
            );
            print_global(&ctx, "Solar eclipse", ev.class.solar_label(), &ev);
        }

        Commands::SolarLocal { search } => {
            let ev = or_exit(
                ephq_rs::solar_eclipse_local(
                    ctx.ut1(&search.date),
                    &ctx.require_observer(),
                    direction(&search),
                ),
                "Solar eclipse search failed",
            );
            print_local_solar(&ctx, &ev);
        }

        Commands::SolarMap { search, samples } => {
            let ev = or_exit(
                ephq_rs::solar_eclipse_global(ctx.ut1(&search.date), direction(&search)),
                "Solar eclipse search failed",
            );
            let (begin, end) = ev.solar_span();
            let track = or_exit(
                ephq_rs::solar_eclipse_ground_track(begin, end, samples),
                "Ground track failed",
            );
            println!("{} solar eclipse, maximum {}", ev.class.solar_label(), ctx.show(ev.maximum()));
            for p in track {
                println!("{:>10.4} {:>9.4}", p.longitude_deg, p.latitude_deg);
            }
        }

        Commands::LunarGlobal { search } => {
            let ev = or_exit(
                ephq_rs::lunar_eclipse_global(ctx.ut1(&search.date), direction(&search)),
                "Lunar eclipse search failed",
            );
            print_global(&ctx, "Lunar eclipse", ev.class.lunar_label(), &ev);
        }

        Commands::LunarLocal { search } => {
            let ev = or_exit(
                ephq_rs::lunar_eclipse_local(
                    ctx.ut1(&search.date),
                    &ctx.require_observer(),
                    direction(&search),
                ),
                "Lunar eclipse search failed",
            );
            print_local_lunar(&ctx, &ev);
        }

        Commands::OccultGlobal { body, search } => {
            let body = require_body(&body);
            let ev = or_exit(
                ephq_rs::occultation_global(ctx.ut1(&search.date), body, direction(&search)),
                "Occultation search failed",
            );
            print_global(&ctx, &format!("Occultation of {body}"), ev.class.solar_label(), &ev);
        }

        Commands::OccultLocal {
            all_planets: true,
            search,
            ..
        } => {
            let scan = or_exit(
                ephq_rs::next_occultations_all_planets(
                    ctx.ut1(&search.date),
                    &ctx.require_observer(),
                    direction(&search),
                ),
                "Occultation scan failed",
            );
            for occ in scan {
                match occ.local {
                    Some(ev) => print_local_occultation(&ctx, occ.body, &ev),
                    None => println!(
                        "Occultation of {} (type {}) maximum {}, not visible from the observer",
                        occ.body,
                        occ.global.class.bits(),
                        ctx.show(occ.global.maximum())
                    ),
                }
            }
        }

        Commands::OccultLocal { body, search, .. } => {
            let body = require_body(body.as_deref().unwrap_or_default());
            let ev = or_exit(
                ephq_rs::occultation_local(
                    ctx.ut1(&search.date),
                    &ctx.require_observer(),
                    body,
                    direction(&search),
                ),
                "Occultation search failed",
            );
            print_local_occultation(&ctx, body, &ev);
        }

        Commands::Series {
            kind,
            body,
            count,
            search,
        } => {
            let start = ctx.ut1(&search.date);
            let here = ctx.require_observer();
            let dir = direction(&search);
            match kind {
                SeriesKind::Solar => {
                    let run = or_exit(
                        ephq_rs::solar_eclipse_series(start, &here, dir, count),
                        "Solar eclipse series failed",
                    );
                    print_series(&ctx, &run, |g| g.class.solar_label(), |v| {
                        print_local_solar(&ctx, &v.event);
                        print_rise_set(&ctx, "Sun", v);
                    });
                }
                SeriesKind::Lunar => {
                    let run = or_exit(
                        ephq_rs::lunar_eclipse_series(start, &here, dir, count),
                        "Lunar eclipse series failed",
                    );
                    print_series(&ctx, &run, |g| g.class.lunar_label(), |v| {
                        print_local_lunar(&ctx, &v.event);
                        print_rise_set(&ctx, "Moon", v);
                    });
                }
                SeriesKind::Occult => {
                    let body = require_body(&body);
                    let run = or_exit(
                        ephq_rs::occultation_series(start, &here, body, dir, count),
                        "Occultation series failed",
                    );
                    print_series(&ctx, &run, |g| g.class.solar_label(), |v| {
                        print_local_occultation(&ctx, body, &v.event);
                        print_rise_set(&ctx, "Moon", v);
                    });
                }
            }
        }
    }
}

/// Resolved command-line state shared by every subcommand.
struct Context {
    config: EphqConfig,
    observer: ObserverArgs,
    utc_offset: i32,
}

impl Context {
    /// Observer from flags, falling back to the config file per field.
    fn observer(&self) -> Option<GeoLocation> {
        let file = self.config.observer();
        let lon = self.observer.lon.or(file.map(|o| o.longitude_deg))?;
        let lat = self.observer.lat.or(file.map(|o| o.latitude_deg))?;
        let alt = self
            .observer
            .alt
            .or(file.map(|o| o.altitude_m))
            .unwrap_or(0.0);
        Some(GeoLocation::new(lon, lat, alt))
    }

    fn require_observer(&self) -> GeoLocation {
        let Some(loc) = self.observer() else {
            eprintln!("Observer location required: pass --lon and --lat or set [observer] in the config");
            std::process::exit(1);
        };
        if !(-90.0..=90.0).contains(&loc.latitude_deg)
            || !(-180.0..=180.0).contains(&loc.longitude_deg)
        {
            eprintln!(
                "Observer out of range: lon {} lat {}",
                loc.longitude_deg, loc.latitude_deg
            );
            std::process::exit(1);
        }
        loc
    }

    fn atmosphere(&self) -> Atmosphere {
        let file = self.config.atmosphere();
        Atmosphere::new(
            self.observer.pressure.unwrap_or(file.pressure_hpa),
            self.observer.temperature.unwrap_or(file.temperature_c),
        )
    }

    /// UT1 Julian Date for a date argument.
    fn ut1(&self, date: &str) -> f64 {
        let utc = or_exit(parse_utc(date), "Invalid date");
        or_exit(ephq_rs::utc_to_jd(&utc), "Conversion failed").ut1
    }

    /// A UT1 Julian Date as wall-clock time at the configured offset.
    fn show(&self, jd_ut1: f64) -> String {
        if jd_ut1 == 0.0 {
            return "-".to_string();
        }
        match ephq_rs::jd_to_utc(jd_ut1) {
            Ok(text) => format_engine_date(&text, self.utc_offset),
            Err(e) => format!("JD {jd_ut1:.6} ({e})"),
        }
    }
}

fn load_config(cli: &Cli) -> Result<EphqConfig, ephq_config::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => EphqConfig::load(path)?,
        None => EphqConfig::default(),
    };
    config.apply_env();
    if let Some(path) = &cli.ephe_path {
        config.ephe_path = Some(path.clone());
    }
    config.validate()?;
    Ok(config)
}

fn or_exit<T, E: Display>(result: Result<T, E>, what: &str) -> T {
    result.unwrap_or_else(|e| {
        eprintln!("{what}: {e}");
        std::process::exit(1);
    })
}

fn parse_utc(s: &str) -> Result<UtcTime, String> {
    if s.eq_ignore_ascii_case("now") {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| e.to_string())?
            .as_millis();
        let millis = i64::try_from(millis).map_err(|e| e.to_string())?;
        return Ok(UtcTime::from_unix_millis(millis));
    }
    // Parse "YYYY-MM-DDThh:mm:ssZ" or "YYYY-MM-DDThh:mm:ss"
    let s = s.trim_end_matches('Z');
    let Some((date, time)) = s.split_once('T') else {
        return Err(format!("expected YYYY-MM-DDThh:mm:ssZ, got {s}"));
    };
    // A leading '-' belongs to the year.
    let (sign, date) = match date.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, date),
    };
    let date_parts: Vec<&str> = date.split('-').collect();
    let time_parts: Vec<&str> = time.split(':').collect();
    if date_parts.len() != 3 || time_parts.len() != 3 {
        return Err(format!("invalid date/time format: {s}"));
    }
    let year: i32 = date_parts[0].parse().map_err(|e| format!("{e}"))?;
    let month: u32 = date_parts[1].parse().map_err(|e| format!("{e}"))?;
    let day: u32 = date_parts[2].parse().map_err(|e| format!("{e}"))?;
    let hour: u32 = time_parts[0].parse().map_err(|e| format!("{e}"))?;
    let minute: u32 = time_parts[1].parse().map_err(|e| format!("{e}"))?;
    let second: f64 = time_parts[2].parse().map_err(|e| format!("{e}"))?;
    Ok(UtcTime::new(sign * year, month, day, hour, minute, second))
}

fn parse_body(s: &str) -> Option<BodyId> {
    if let Ok(code) = s.parse::<i32>() {
        return Some(BodyId(code));
    }
    BodyId::PLANETS
        .into_iter()
        .find(|b| b.name().is_some_and(|n| n.eq_ignore_ascii_case(s)))
}

fn require_body(s: &str) -> BodyId {
    parse_body(s).unwrap_or_else(|| {
        eprintln!("Unknown body: {s} (use a name such as 'moon' or an engine number)");
        std::process::exit(1);
    })
}

fn direction(search: &SearchArgs) -> SearchDirection {
    if search.backward {
        SearchDirection::Backward
    } else {
        SearchDirection::Forward
    }
}

/// Engine date text shifted to `offset_minutes`; the raw text when it does
/// not parse.
fn format_engine_date(text: &EngineDateString, offset_minutes: i32) -> String {
    match text.parse() {
        Ok(utc) if offset_minutes == 0 => utc.to_string(),
        Ok(utc) => {
            let local = utc.with_offset_minutes(offset_minutes).to_string();
            let sign = if offset_minutes < 0 { '-' } else { '+' };
            let abs = offset_minutes.unsigned_abs();
            format!(
                "{}{sign}{:02}:{:02}",
                local.trim_end_matches('Z'),
                abs / 60,
                abs % 60
            )
        }
        Err(_) => text.to_string(),
    }
}

fn print_position(body: BodyId, pos: &PositionResult) {
    println!("{body}");
    println!("  Right ascension: {:.6} deg", pos.right_ascension_deg);
    println!("  Declination:     {:.6} deg", pos.declination_deg);
    println!("  Distance:        {:.9} au", pos.distance_au);
    println!("  Azimuth:         {:.4} deg", pos.azimuth_deg);
    println!("  Altitude:        {:.4} deg", pos.altitude_deg);
    println!("  Magnitude:       {:.2}", pos.magnitude);
}

fn print_global(ctx: &Context, what: &str, label: &str, ev: &GlobalEclipse) {
    println!("{what} ({label}, type {})", ev.class.bits());
    println!("  Maximum: {}", ctx.show(ev.maximum()));
    let names = [
        "Maximum",
        "Slot 1",
        "Begin",
        "End",
        "Totality begin",
        "Totality end",
        "Slot 6",
        "Slot 7",
    ];
    for (name, &jd) in names.iter().zip(ev.instants.iter()).skip(2) {
        if jd != 0.0 {
            println!("  {name}: {}", ctx.show(jd));
        }
    }
}

fn print_local_solar(ctx: &Context, ev: &LocalSolarEclipse) {
    println!(
        "Local solar eclipse ({}, type {})",
        ev.class.solar_label(),
        ev.class.bits()
    );
    println!("  First contact:  {}", ctx.show(ev.first_contact()));
    println!("  Maximum:        {}", ctx.show(ev.maximum()));
    println!("  Fourth contact: {}", ctx.show(ev.instants[4]));
    println!("  Sun azimuth:    {:.3} deg", ev.sun_azimuth_deg());
    println!(
        "  Moon at max:    az {:.3} alt {:.3} deg",
        ev.moon.azimuth_deg, ev.moon.altitude_deg
    );
}

fn print_local_lunar(ctx: &Context, ev: &LocalLunarEclipse) {
    println!(
        "Local lunar eclipse ({}, type {})",
        ev.class.lunar_label(),
        ev.class.bits()
    );
    println!("  Maximum:      {}", ctx.show(ev.maximum()));
    println!("  Moon azimuth: {:.3} deg", ev.moon_azimuth_deg());
}

fn print_local_occultation(ctx: &Context, body: BodyId, ev: &LocalOccultation) {
    println!("Local occultation of {body} (type {})", ev.class.bits());
    println!(
        "  Start:   {}  Moon az {:.3} alt {:.3}",
        ctx.show(ev.start()),
        ev.moon_start.azimuth_deg,
        ev.moon_start.altitude_deg
    );
    println!("  Maximum: {}", ctx.show(ev.maximum()));
    println!(
        "  End:     {}  Moon az {:.3} alt {:.3}",
        ctx.show(ev.end()),
        ev.moon_end.azimuth_deg,
        ev.moon_end.altitude_deg
    );
}

fn print_rise_set<L>(ctx: &Context, name: &str, view: &LocalView<L>) {
    let show = |jd: Option<f64>| jd.map_or_else(|| "none".to_string(), |jd| ctx.show(jd));
    println!("  {name} rise: {}  set: {}", show(view.rise), show(view.set));
}

fn print_series<L>(
    ctx: &Context,
    run: &[SeriesEntry<L>],
    label: impl Fn(&GlobalEclipse) -> &'static str,
    local: impl Fn(&LocalView<L>),
) {
    for (i, entry) in run.iter().enumerate() {
        println!(
            "#{} {} maximum {}",
            i + 1,
            label(&entry.global),
            ctx.show(entry.global.maximum())
        );
        match &entry.local {
            Some(view) => local(view),
            None => println!("  not visible from the observer"),
        }
    }
}
