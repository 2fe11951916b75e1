use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use proj4_shim::config::{self, DEFAULT_SETTINGS_FILE};
use proj4_shim::coords::{AngularUnit, parse_point, transform_point};
use proj4_shim::ffi::context::Context;
use proj4_shim::ffi::proj4::{Projection, release};
use tracing_subscriber::EnvFilter;

fn print_usage() {
    eprintln!("Usage: proj4_shim [--settings <file>] <src-definition> <dst-definition>");
    eprintln!("  Read `x y [z]` lines from stdin and write them reprojected to stdout.");
    eprintln!("  Geographic coordinates are in degrees.");
    eprintln!("  Example: proj4_shim '+proj=longlat +datum=WGS84' '+proj=utm +zone=31 +datum=WGS84'");
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return if args.is_empty() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        };
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        let proj = release().unwrap_or_else(|_| "unknown PROJ release".to_string());
        eprintln!("proj4_shim {} ({proj})", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let settings_path = match args.iter().position(|a| a == "--settings") {
        Some(pos) if pos + 1 < args.len() => {
            let path = args.remove(pos + 1);
            args.remove(pos);
            PathBuf::from(path)
        }
        Some(_) => {
            eprintln!("ERROR: --settings needs a file argument");
            return ExitCode::FAILURE;
        }
        None => PathBuf::from(DEFAULT_SETTINGS_FILE),
    };

    if args.len() != 2 {
        print_usage();
        return ExitCode::FAILURE;
    }

    let settings = match config::load_settings(&settings_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!(
                "ERROR: Failed to load settings {}: {e}",
                settings_path.display()
            );
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = settings.apply_global() {
        eprintln!("ERROR: {e}");
        return ExitCode::FAILURE;
    }

    let ctx = match Context::new() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: {e}");
            return ExitCode::FAILURE;
        }
    };
    settings.configure(&ctx);

    let src = match Projection::with_context(&ctx, &args[0]) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("ERROR: Invalid source definition {:?}: {e}", args[0]);
            return ExitCode::FAILURE;
        }
    };
    let dst = match Projection::with_context(&ctx, &args[1]) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("ERROR: Invalid destination definition {:?}: {e}", args[1]);
            return ExitCode::FAILURE;
        }
    };

    match run(&src, &dst) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(src: &Projection<'_>, dst: &Projection<'_>) -> proj4_shim::Result<()> {
    let precision = if dst.is_latlong() { 8 } else { 3 };
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in io::stdin().lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (x, y, z) = parse_point(line)?;
        let (x, y, z) = transform_point(src, dst, x, y, z, AngularUnit::Degrees)?;
        writeln!(out, "{x:.precision$} {y:.precision$} {z:.3}")?;
    }
    out.flush()?;
    Ok(())
}
