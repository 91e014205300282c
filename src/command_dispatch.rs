//! Purpose: Hold top-level CLI command dispatch for `gmaps-geocode`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Input validation errors surface before a context or request is built.
//! Invariants: Each geocode/reverse command issues exactly one request.

use super::*;
use clap::CommandFactory;
use gmaps_geocode::api::{geocode, geocode_url, redact_key, reverse_geocode, reverse_geocode_url};
use super::render::{emit_json, emit_results};

pub(super) fn dispatch_command(command: Command, settings: &Settings) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "gmaps-geocode", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Geocode(args) => {
            let request = args.to_request()?;
            let ctx = build_context(settings)?;
            let results = geocode(&ctx, &request)?;
            emit_results(&results, settings.format, settings.color_mode);
            Ok(RunOutcome::ok())
        }
        Command::Reverse(args) => {
            let options = args.to_options();
            let ctx = build_context(settings)?;
            let results = reverse_geocode(&ctx, args.latlng(), &options)?;
            emit_results(&results, settings.format, settings.color_mode);
            Ok(RunOutcome::ok())
        }
        Command::Url { target } => {
            let ctx = build_context(settings)?;
            let url = match target {
                UrlTarget::Geocode(args) => geocode_url(&ctx, &args.to_request()?)?,
                UrlTarget::Reverse(args) => {
                    reverse_geocode_url(&ctx, args.latlng(), &args.to_options())?
                }
            };
            let redacted = redact_key(&url);
            match settings.format {
                OutputFormat::Json => emit_json(json!({ "url": redacted }), settings.color_mode),
                OutputFormat::Text => println!("{redacted}"),
            }
            Ok(RunOutcome::ok())
        }
    }
}
