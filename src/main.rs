use std::env;
use std::fs;
use std::io::Read;
use std::process::ExitCode;

use kundli_core::ephemeris::PositionSource;
use kundli_core::narration::NarrationClient;
use kundli_core::{compute_kundli, dataset, service, KundliRequest};

fn usage(program: &str) {
    eprintln!("Usage: {program} [request.json|-] [--ask \"question\"]");
    eprintln!("  Reads a kundli request as JSON from the given file (or stdin for '-')");
    eprintln!("  and prints the chart response. With --ask, also narrates the chart.");
    eprintln!(
        "Example request: {{\"date\":\"1998-05-06\",\"time\":\"09:20\",\"lat\":30.7167,\"lon\":76.8833,\"tz\":5.5,\"chart_type\":\"regular\"}}"
    );
}

#[cfg(feature = "swisseph")]
fn position_source() -> Box<dyn PositionSource> {
    Box::new(kundli_core::ephemeris::SwissEphemerisSource::new())
}

#[cfg(not(feature = "swisseph"))]
fn position_source() -> Box<dyn PositionSource> {
    log::warn!("built without the swisseph feature; using bundled fixture positions");
    Box::new(kundli_core::ephemeris::FixedPositions::example())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut input: Option<String> = None;
    let mut question: Option<String> = None;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--ask" => {
                if i + 1 >= args.len() {
                    usage(&args[0]);
                    return ExitCode::from(2);
                }
                question = Some(args[i + 1].clone());
                i += 2;
            }
            "--help" | "-h" => {
                usage(&args[0]);
                return ExitCode::SUCCESS;
            }
            other => {
                input = Some(other.to_string());
                i += 1;
            }
        }
    }

    let raw = match input.as_deref() {
        Some("-") | None => {
            let mut buffer = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut buffer) {
                eprintln!("Error reading stdin: {e}");
                return ExitCode::from(2);
            }
            buffer
        }
        Some(path) => match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                eprintln!("Error reading {path}: {e}");
                return ExitCode::from(2);
            }
        },
    };

    let request: KundliRequest = match serde_json::from_str(&raw) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("Invalid request: {e}");
            usage(&args[0]);
            return ExitCode::from(2);
        }
    };

    let source = position_source();
    let blob = dataset::load_from_env();

    let response = match compute_kundli(&request, source.as_ref(), blob) {
        Ok(response) => response,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&response) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error serializing response: {e}");
            return ExitCode::FAILURE;
        }
    }

    if let Some(question) = question {
        // The chart itself is already computed; narration is a separate
        // network call and its failures never fail the run.
        match service::compute_chart(&request, source.as_ref()) {
            Ok(chart) => {
                let client = NarrationClient::from_env();
                let narration = client.narrate(&chart, &question, None).await;
                match serde_json::to_string_pretty(&narration) {
                    Ok(json) => println!("{json}"),
                    Err(e) => eprintln!("Error serializing narration: {e}"),
                }
            }
            Err(e) => eprintln!("Error: {e}"),
        }
    }

    ExitCode::SUCCESS
}
