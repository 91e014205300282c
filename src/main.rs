//! Purpose: `gmaps-geocode` CLI entry point.
//! Role: Binary crate root; parses args, builds a `Context`, runs one geocoding call.
//! Invariants: Results go to stdout as JSON (or one line per result with `--format text`).
//! Invariants: Non-interactive errors are emitted as JSON on stderr; logs also go to stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
#![allow(clippy::result_large_err)]
use std::io::{self, IsTerminal};
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum, error::ErrorKind as ClapErrorKind};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

mod command_dispatch;
mod render;

use gmaps_geocode::api::{
    Bounds, ComponentFilter, Context, DEFAULT_ENDPOINT, Error, ErrorKind, GeocodeRequest,
    LatLng, MultiValue, ReverseGeocodeOptions, UreqTransport, to_exit_code,
};
use render::{AnsiColor, colorize_label};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                let _ = err.print();
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome { exit_code });
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::InvalidArgument)
                        .with_message(clap_error_summary(&err))
                        .with_hint("Run `gmaps-geocode --help` for usage."),
                    ColorMode::Auto,
                ));
            }
        },
    };

    init_tracing();

    let color_mode = cli.color;
    let settings = Settings {
        key: cli.key,
        endpoint: cli.endpoint,
        timeout: cli.timeout_ms.map(Duration::from_millis),
        color_mode,
        format: cli.format,
    };
    command_dispatch::dispatch_command(cli.command, &settings).map_err(|err| (err, color_mode))
}

#[derive(Parser)]
#[command(
    name = "gmaps-geocode",
    version,
    about = "Forward and reverse geocoding against the Google Maps Geocoding API",
    long_about = None,
    after_help = r#"EXAMPLES
  $ export GOOGLE_MAPS_API_KEY=...
  $ gmaps-geocode geocode "1600 Amphitheatre Parkway, Mountain View, CA"
  $ gmaps-geocode geocode Torun --component administrative_area=TX --component country=US
  $ gmaps-geocode geocode --component postal_code=96766
  $ gmaps-geocode reverse 40.714224 -73.961452 --location-type ROOFTOP
  $ gmaps-geocode url geocode Sydney     # print the request url, no network

ENVIRONMENT
  GOOGLE_MAPS_API_KEY     API key (same as --key)
  GMAPS_GEOCODE_ENDPOINT  endpoint override (same as --endpoint)
  RUST_LOG                log filter for stderr diagnostics (default: warn)"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "GOOGLE_MAPS_API_KEY",
        hide_env_values = true,
        help = "Geocoding API key"
    )]
    key: Option<String>,
    #[arg(
        long,
        global = true,
        env = "GMAPS_GEOCODE_ENDPOINT",
        default_value = DEFAULT_ENDPOINT,
        help = "Geocoding endpoint url"
    )]
    endpoint: String,
    #[arg(
        long,
        global = true,
        value_name = "MS",
        help = "Per-request timeout in milliseconds (default: none)"
    )]
    timeout_ms: Option<u64>,
    #[arg(
        long,
        global = true,
        default_value = "auto",
        value_enum,
        help = "Colorize output: auto, always, never"
    )]
    color: ColorMode,
    #[arg(
        long,
        global = true,
        default_value = "json",
        value_enum,
        help = "Result format: json or text"
    )]
    format: OutputFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

struct Settings {
    key: Option<String>,
    endpoint: String,
    timeout: Option<Duration>,
    color_mode: ColorMode,
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Forward geocode an address and/or component filter")]
    Geocode(GeocodeArgs),
    #[command(about = "Reverse geocode a latitude/longitude pair")]
    Reverse(ReverseArgs),
    #[command(
        about = "Print the request url without sending it (key redacted)",
        arg_required_else_help = true
    )]
    Url {
        #[command(subcommand)]
        target: UrlTarget,
    },
    #[command(about = "Generate shell completion scripts")]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum UrlTarget {
    Geocode(GeocodeArgs),
    Reverse(ReverseArgs),
}

#[derive(Args)]
struct GeocodeArgs {
    #[arg(help = "Address or place text")]
    address: Option<String>,
    #[arg(
        long = "component",
        value_name = "NAME=VALUE",
        help = "Component filter, repeatable, kept in the given order"
    )]
    components: Vec<String>,
    #[arg(
        long,
        value_name = "SW_LAT,SW_LNG,NE_LAT,NE_LNG",
        allow_hyphen_values = true,
        help = "Viewport to bias results toward"
    )]
    bounds: Option<String>,
    #[arg(long, help = "Region code to bias results toward (e.g. es)")]
    region: Option<String>,
    #[arg(long, help = "Result language (e.g. en, fr)")]
    language: Option<String>,
}

#[derive(Args)]
struct ReverseArgs {
    #[arg(allow_negative_numbers = true, help = "Latitude in decimal degrees")]
    lat: f64,
    #[arg(allow_negative_numbers = true, help = "Longitude in decimal degrees")]
    lng: f64,
    #[arg(
        long = "result-type",
        value_delimiter = ',',
        help = "Keep only these result types, in order (repeatable or comma-separated)"
    )]
    result_types: Vec<String>,
    #[arg(
        long = "location-type",
        value_delimiter = ',',
        help = "Keep only these location types, in order (repeatable or comma-separated)"
    )]
    location_types: Vec<String>,
    #[arg(long, help = "Result language (e.g. en, fr)")]
    language: Option<String>,
}

impl GeocodeArgs {
    fn to_request(&self) -> Result<GeocodeRequest, Error> {
        let mut request = GeocodeRequest {
            address: self.address.clone(),
            region: self.region.clone(),
            language: self.language.clone(),
            ..GeocodeRequest::default()
        };
        if !self.components.is_empty() {
            request.components = Some(parse_components(&self.components)?);
        }
        if let Some(raw) = &self.bounds {
            request.bounds = Some(parse_bounds(raw)?);
        }
        Ok(request)
    }
}

impl ReverseArgs {
    fn latlng(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    fn to_options(&self) -> ReverseGeocodeOptions {
        ReverseGeocodeOptions {
            result_type: multi_value(&self.result_types),
            location_type: multi_value(&self.location_types),
            language: self.language.clone(),
        }
    }
}

fn multi_value(values: &[String]) -> Option<MultiValue> {
    match values {
        [] => None,
        [single] => Some(MultiValue::One(single.clone())),
        many => Some(MultiValue::Many(many.to_vec())),
    }
}

fn parse_components(raw: &[String]) -> Result<ComponentFilter, Error> {
    let mut filter = ComponentFilter::new();
    for entry in raw {
        let Some((name, value)) = entry.split_once('=') else {
            return Err(Error::new(ErrorKind::InvalidArgument)
                .with_message(format!("invalid component {entry:?}"))
                .with_hint("Use NAME=VALUE, e.g. --component country=US."));
        };
        filter.insert(name.trim(), value.trim());
    }
    Ok(filter)
}

fn parse_bounds(raw: &str) -> Result<Bounds, Error> {
    let invalid = || {
        Error::new(ErrorKind::InvalidArgument)
            .with_message(format!("invalid bounds {raw:?}"))
            .with_hint("Use SW_LAT,SW_LNG,NE_LAT,NE_LNG, e.g. 34.17,-118.60,34.23,-118.50.")
    };
    let values = raw
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| invalid().with_source(err))?;
    match values.as_slice() {
        [sw_lat, sw_lng, ne_lat, ne_lng] => {
            Ok(Bounds::new((*sw_lat, *sw_lng), (*ne_lat, *ne_lng)))
        }
        _ => Err(invalid()),
    }
}

fn build_context(settings: &Settings) -> Result<Context, Error> {
    let key = settings.key.clone().ok_or_else(|| {
        Error::new(ErrorKind::InvalidArgument)
            .with_message("missing api key")
            .with_hint("Pass --key or set GOOGLE_MAPS_API_KEY.")
    })?;
    let mut ctx = Context::new(key)?.with_endpoint(&settings.endpoint)?;
    if let Some(timeout) = settings.timeout {
        ctx = ctx.with_transport(UreqTransport::with_timeout(timeout));
    }
    Ok(ctx)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr)
        .try_init();
}

fn clap_error_summary(err: &clap::Error) -> String {
    let rendered = err.to_string();
    rendered
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.trim_start_matches("error:").trim().to_string())
        .unwrap_or_else(|| "invalid arguments".to_string())
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Decode\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::InvalidArgument => "invalid argument".to_string(),
        ErrorKind::Transport => "request failed".to_string(),
        ErrorKind::Decode => "invalid response".to_string(),
        ErrorKind::Api => "geocoding service error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(status) = err.api_status() {
        inner.insert("status".to_string(), json!(status));
    }
    if let Some(status) = err.http_status() {
        inner.insert("http_status".to_string(), json!(status));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = vec![format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    )];
    if let Some(status) = err.api_status() {
        lines.push(format!(
            "{} {status}",
            colorize_label("status:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(status) = err.http_status() {
        lines.push(format!(
            "{} {status}",
            colorize_label("http:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    for cause in error_causes(err) {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }
    lines.join("\n")
}
