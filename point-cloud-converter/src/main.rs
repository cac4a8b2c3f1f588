/// Point cloud format conversion and georeferencing entry point
mod bounds;
mod config;
mod converter;
mod error;
mod georeference;
mod laz;
mod manifest;
mod obj;
mod pcd;
mod ply;
mod point_cloud;
mod progress;

use config::ConverterConfig;
use converter::{GeoreferenceRequest, PointCloudConverter, Reference};
use ply::PlyFormat;
use std::env;
use std::path::PathBuf;

const USAGE: &str = "\
Usage: point-cloud-converter [--config <file.json>] <command> ...
  las2ply <input.las|laz> [output.ply] [--ascii]
  import  <input.las|laz> [output.ply|obj]
  pcd2obj <input.pcd> [output.obj]
  georef  <input.obj> (--reference <ref.las> | --origin <origin.json>)
          [--forward AXIS] [--up AXIS] [--mode centroid|offset] [--output <path>]
  info    <input.las|laz>";

#[derive(Debug)]
enum Command {
    LasToPly {
        input: PathBuf,
        output: Option<PathBuf>,
        ascii: bool,
    },
    Import {
        input: PathBuf,
        output: Option<PathBuf>,
    },
    PcdToObj {
        input: PathBuf,
        output: Option<PathBuf>,
    },
    Georeference(GeoreferenceRequest),
    Info {
        input: PathBuf,
    },
}

#[derive(Debug)]
struct Invocation {
    config: Option<PathBuf>,
    command: Command,
}

/// Split flags (with their values) from positional arguments.
fn split_args(args: &[String]) -> Result<(Vec<(String, String)>, Vec<String>, bool), String> {
    let mut flags = Vec::new();
    let mut positional = Vec::new();
    let mut ascii = false;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if arg == "--ascii" {
            ascii = true;
        } else if let Some(name) = arg.strip_prefix("--") {
            let value = iter
                .next()
                .ok_or_else(|| format!("missing value for --{}", name))?;
            flags.push((name.to_string(), value.clone()));
        } else {
            positional.push(arg.clone());
        }
    }

    Ok((flags, positional, ascii))
}

fn parse_args(args: &[String]) -> Result<Invocation, String> {
    let (flags, positional, ascii) = split_args(args)?;
    let flag = |name: &str| {
        flags
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    };

    let (name, rest) = positional
        .split_first()
        .ok_or_else(|| "missing command".to_string())?;

    // Options each command accepts besides the global --config.
    let accepted: &[&str] = match name.as_str() {
        "georef" => &["reference", "origin", "forward", "up", "mode", "output"],
        _ => &[],
    };
    if let Some((option, _)) = flags
        .iter()
        .find(|(n, _)| n != "config" && !accepted.contains(&n.as_str()))
    {
        return Err(format!("option --{} is not valid for '{}'", option, name));
    }
    if ascii && name != "las2ply" {
        return Err(format!("option --ascii is not valid for '{}'", name));
    }

    let input = rest
        .first()
        .map(PathBuf::from)
        .ok_or_else(|| "File path is not set.".to_string())?;
    let max_positional = if name == "info" { 1 } else { 2 };
    if let Some(extra) = rest.get(max_positional) {
        return Err(format!("unexpected argument '{}'", extra));
    }
    let output = rest.get(1).map(PathBuf::from);

    let command = match name.as_str() {
        "las2ply" => Command::LasToPly {
            input,
            output,
            ascii,
        },
        "import" => Command::Import { input, output },
        "pcd2obj" => Command::PcdToObj { input, output },
        "info" => Command::Info { input },
        "georef" => {
            let reference = match (flag("reference"), flag("origin")) {
                (Some(las), None) => Reference::Las(PathBuf::from(las)),
                (None, Some(origin)) => Reference::Origin(PathBuf::from(origin)),
                (Some(_), Some(_)) => {
                    return Err("--reference and --origin are mutually exclusive".into());
                }
                (None, None) => return Err("Reference LAS file is not set.".into()),
            };

            let mut request = GeoreferenceRequest::new(input, reference);
            if let Some(forward) = flag("forward") {
                request.forward = forward.parse().map_err(|e| format!("{}", e))?;
            }
            if let Some(up) = flag("up") {
                request.up = up.parse().map_err(|e| format!("{}", e))?;
            }
            if let Some(mode) = flag("mode") {
                request.mode = mode.parse()?;
            }
            request.output = flag("output").map(PathBuf::from).or(output);
            Command::Georeference(request)
        }
        other => return Err(format!("unknown command '{}'", other)),
    };

    Ok(Invocation {
        config: flag("config").map(PathBuf::from),
        command,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let invocation = match parse_args(&args) {
        Ok(invocation) => invocation,
        Err(message) => {
            eprintln!("{}\n\n{}", message, USAGE);
            std::process::exit(1);
        }
    };

    let mut config = match &invocation.config {
        Some(path) => ConverterConfig::load(path)?,
        None => ConverterConfig::default(),
    };

    if let Command::LasToPly { ascii: true, .. } = invocation.command {
        config.ply_format = PlyFormat::Ascii;
    }

    let converter = PointCloudConverter::new(config);
    match invocation.command {
        Command::LasToPly { input, output, .. } => {
            converter.las_to_ply(&input, output.as_deref())?;
        }
        Command::Import { input, output } => {
            converter.import_las(&input, output.as_deref())?;
        }
        Command::PcdToObj { input, output } => {
            converter.pcd_to_obj(&input, output.as_deref())?;
        }
        Command::Georeference(request) => {
            converter.georeference_obj(&request)?;
        }
        Command::Info { input } => {
            converter.info(&input)?;
        }
    }

    Ok(())
}
