mod cli;
mod constants;
mod coverage;
mod plan;
mod progress;
mod render;
mod slippy;

use anyhow::Result;
use cli::{Command, parse_args};
use coverage::run_coverage;
use render::run_render;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match parse_args(&args)? {
        Command::Render(config) => run_render(&config),
        Command::Coverage(config) => run_coverage(&config),
    }
}
