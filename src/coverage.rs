use anyhow::Result;
use owo_colors::OwoColorize;

use crate::cli::CoverageConfig;
use crate::plan::RenderPlan;
use crate::render::jobs_for_region;

/// Dry run: prints the tile rectangles a plan would render, without
/// spawning anything.
pub fn run_coverage(config: &CoverageConfig) -> Result<()> {
    let plan = RenderPlan::load_from_path(&config.plan)?;

    println!(
        "{} Plan {}: {} region(s), default map '{}', renderer '{}'",
        "ℹ".blue().bold(),
        config.plan.display(),
        plan.regions().len(),
        plan.map(),
        plan.renderer()
    );

    let mut total_tiles: u64 = 0;
    let mut total_jobs: usize = 0;
    for region in plan.regions() {
        let jobs = jobs_for_region(region, plan.map(), plan.threads());
        let region_tiles: u64 = jobs.iter().map(|job| job.rect().tile_count()).sum();

        println!();
        println!(
            "{} {} (map '{}', zoom {}..{})",
            "◎".blue(),
            region.name().bold(),
            jobs[0].map(),
            region.min_zoom(),
            region.max_zoom()
        );
        for job in &jobs {
            let rect = job.rect();
            println!(
                "  {} z{:>2}: x [{}..{}], y [{}..{}], {} tile(s)",
                "⬚".blue(),
                rect.zoom,
                rect.min_x,
                rect.max_x,
                rect.min_y,
                rect.max_y,
                rect.tile_count()
            );
        }
        println!(
            "  {} {} tile(s) over {} job(s)",
            "↕".blue(),
            region_tiles,
            jobs.len()
        );

        total_tiles += region_tiles;
        total_jobs += jobs.len();
    }

    println!();
    println!(
        "{} Total: {} tile(s) across {} job(s)",
        "✔".green().bold(),
        total_tiles,
        total_jobs
    );

    Ok(())
}
