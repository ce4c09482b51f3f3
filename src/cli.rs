use std::path::PathBuf;

use anyhow::{Result, anyhow, bail};

const USAGE: &str = "Usage: tilewarm render <plan.json> [--threads <N>] [--map <name>] [--renderer <path>]\n       tilewarm coverage <plan.json>";

pub enum Command {
    Render(RenderConfig),
    Coverage(CoverageConfig),
}

pub struct RenderConfig {
    pub plan: PathBuf,
    pub threads: Option<u32>,
    pub map: Option<String>,
    pub renderer: Option<String>,
}

pub struct CoverageConfig {
    pub plan: PathBuf,
}

pub fn parse_args(args: &[String]) -> Result<Command> {
    if args.is_empty() {
        bail!("No arguments supplied.\n{USAGE}");
    }

    match args[0].as_str() {
        "render" => parse_render(&args[1..]).map(Command::Render),
        "coverage" => parse_coverage(&args[1..]).map(Command::Coverage),
        "--help" | "-h" => {
            println!("{USAGE}");
            std::process::exit(0);
        }
        other => bail!("Unknown command '{other}'.\n{USAGE}"),
    }
}

fn parse_render(args: &[String]) -> Result<RenderConfig> {
    let mut plan = None;
    let mut threads = None;
    let mut map = None;
    let mut renderer = None;

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        if arg == "--help" || arg == "-h" {
            println!("{USAGE}");
            std::process::exit(0);
        } else if arg == "--threads" {
            i += 1;
            if i >= args.len() {
                bail!("Missing value for --threads\n{USAGE}");
            }
            threads = Some(parse_threads(&args[i])?);
        } else if let Some(value) = arg.strip_prefix("--threads=") {
            threads = Some(parse_threads(value)?);
        } else if arg == "--map" {
            i += 1;
            if i >= args.len() {
                bail!("Missing value for --map\n{USAGE}");
            }
            map = Some(parse_name(&args[i], "--map")?);
        } else if let Some(value) = arg.strip_prefix("--map=") {
            map = Some(parse_name(value, "--map")?);
        } else if arg == "--renderer" {
            i += 1;
            if i >= args.len() {
                bail!("Missing value for --renderer\n{USAGE}");
            }
            renderer = Some(parse_name(&args[i], "--renderer")?);
        } else if let Some(value) = arg.strip_prefix("--renderer=") {
            renderer = Some(parse_name(value, "--renderer")?);
        } else if plan.is_none() {
            plan = Some(PathBuf::from(arg));
        } else {
            bail!("Unexpected argument: {arg}\n{USAGE}");
        }
        i += 1;
    }

    let plan = plan.ok_or_else(|| anyhow!("Missing render plan argument.\n{USAGE}"))?;

    Ok(RenderConfig {
        plan,
        threads,
        map,
        renderer,
    })
}

fn parse_coverage(args: &[String]) -> Result<CoverageConfig> {
    if args.is_empty() || args[0] == "--help" || args[0] == "-h" {
        println!("{USAGE}");
        std::process::exit(0);
    }
    if args.len() > 1 {
        bail!("Unexpected argument: {}\n{USAGE}", args[1]);
    }

    Ok(CoverageConfig {
        plan: PathBuf::from(&args[0]),
    })
}

fn parse_threads(value: &str) -> Result<u32> {
    let threads: u32 = value
        .parse()
        .map_err(|_| anyhow!("Invalid thread count '{value}'"))?;
    if threads == 0 {
        bail!("Thread count must be > 0");
    }
    Ok(threads)
}

fn parse_name(value: &str, flag: &str) -> Result<String> {
    if value.trim().is_empty() {
        bail!("Value for {flag} must not be empty");
    }
    Ok(value.to_string())
}
