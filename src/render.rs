use std::fmt;
use std::process::{Command, ExitStatus};

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use crate::cli::RenderConfig;
use crate::plan::{RegionJob, RenderPlan};
use crate::progress::job_bar;
use crate::slippy::TileRect;

/// One render_list invocation: a single zoom level over one tile rectangle.
#[derive(Debug, Clone)]
pub struct RenderJob {
    map: String,
    rect: TileRect,
    threads: u32,
}

impl RenderJob {
    pub fn new(map: String, rect: TileRect, threads: u32) -> Self {
        Self { map, rect, threads }
    }

    pub fn map(&self) -> &str {
        &self.map
    }

    pub fn rect(&self) -> &TileRect {
        &self.rect
    }

    pub fn zoom(&self) -> u8 {
        self.rect.zoom
    }

    /// Argument vector for render_list. `-z` and `-Z` are both set to the
    /// job's zoom, so each invocation covers exactly one level.
    pub fn args(&self) -> Vec<String> {
        vec![
            "-a".to_string(),
            "-m".to_string(),
            self.map.clone(),
            "-x".to_string(),
            self.rect.min_x.to_string(),
            "-y".to_string(),
            self.rect.min_y.to_string(),
            "-X".to_string(),
            self.rect.max_x.to_string(),
            "-Y".to_string(),
            self.rect.max_y.to_string(),
            "-z".to_string(),
            self.rect.zoom.to_string(),
            "-Z".to_string(),
            self.rect.zoom.to_string(),
            "-n".to_string(),
            self.threads.to_string(),
        ]
    }
}

/// Expands a region into one job per zoom level, ascending. The region's
/// map override falls back to the plan-wide default.
pub fn jobs_for_region(region: &RegionJob, default_map: &str, threads: u32) -> Vec<RenderJob> {
    (region.min_zoom()..=region.max_zoom())
        .map(|zoom| {
            let rect = TileRect::covering(region.bbox(), zoom);
            let map = region.map().unwrap_or(default_map).to_string();
            RenderJob::new(map, rect, threads)
        })
        .collect()
}

/// The renderer exited non-zero. Carries the exit status and whatever the
/// process wrote before dying.
#[derive(Debug)]
pub struct RenderProcessError {
    status: ExitStatus,
    stdout: String,
    stderr: String,
}

impl RenderProcessError {
    pub fn exit_code(&self) -> Option<i32> {
        self.status.code()
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}

impl fmt::Display for RenderProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status.code() {
            Some(code) => write!(f, "renderer exited with status {code}")?,
            None => write!(f, "renderer was terminated by a signal")?,
        }
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            write!(f, ": {stderr}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RenderProcessError {}

/// Runs one render job to completion and returns the renderer's stdout.
pub fn run_job(renderer: &str, job: &RenderJob) -> Result<String> {
    let output = Command::new(renderer)
        .args(job.args())
        .output()
        .with_context(|| format!("Failed to spawn renderer '{renderer}'"))?;
    if !output.status.success() {
        return Err(RenderProcessError {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
        .into());
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

pub fn run_render(config: &RenderConfig) -> Result<()> {
    let mut plan = RenderPlan::load_from_path(&config.plan)?;
    plan.apply_overrides(
        config.threads,
        config.map.as_deref(),
        config.renderer.as_deref(),
    );

    let total_jobs: u64 = plan
        .regions()
        .iter()
        .map(|region| u64::from(region.max_zoom() - region.min_zoom()) + 1)
        .sum();
    println!(
        "{} Rendering {} region(s), {} job(s) via '{}' ({} thread(s))",
        "ℹ".blue().bold(),
        plan.regions().len(),
        total_jobs,
        plan.renderer(),
        plan.threads()
    );

    let pb = job_bar(total_jobs);
    let mut tiles_requested: u64 = 0;
    for region in plan.regions() {
        pb.set_message(region.name().to_string());
        for job in jobs_for_region(region, plan.map(), plan.threads()) {
            tiles_requested += job.rect().tile_count();
            let output = run_job(plan.renderer(), &job).with_context(|| {
                format!("Rendering '{}' at zoom {} failed", region.name(), job.zoom())
            })?;
            let trimmed = output.trim();
            if !trimmed.is_empty() {
                pb.println(format!("{}", trimmed.bright_black()));
            }
            pb.inc(1);
        }
        pb.println(format!(
            "{} {} rendered (zoom {}..{})",
            "✔".green().bold(),
            region.name(),
            region.min_zoom(),
            region.max_zoom()
        ));
    }
    pb.finish_and_clear();

    println!();
    println!(
        "{} {}",
        "✔".green().bold(),
        "Tile pre-render complete".green().bold()
    );
    println!(
        "  {} {:>8}    {} {:>10}",
        "Regions".cyan().bold(),
        plan.regions().len(),
        "Jobs".cyan().bold(),
        total_jobs
    );
    println!(
        "  {} {:>8}",
        "Tiles".purple().bold(),
        tiles_requested
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tampere_plan() -> RenderPlan {
        RenderPlan::from_json(
            r#"{
                "map": "pkk",
                "threads": 1,
                "regions": [
                    { "name": "Tampere", "bbox": [23.0, 61.0, 24.44, 61.59293],
                      "min_zoom": 13, "max_zoom": 16 },
                    { "name": "Tampere @2x", "bbox": [23.0, 61.0, 24.44, 61.59293],
                      "min_zoom": 13, "max_zoom": 13, "map": "pkk_retina" }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn one_job_per_zoom_level_ascending() {
        let plan = tampere_plan();
        let jobs = jobs_for_region(&plan.regions()[0], plan.map(), plan.threads());
        assert_eq!(jobs.len(), 4);
        let zooms: Vec<u8> = jobs.iter().map(|job| job.zoom()).collect();
        assert_eq!(zooms, [13, 14, 15, 16]);
    }

    #[test]
    fn single_zoom_region_yields_one_job() {
        let plan = tampere_plan();
        let jobs = jobs_for_region(&plan.regions()[1], plan.map(), plan.threads());
        assert_eq!(jobs.len(), 1);
        let args = jobs[0].args();
        assert_eq!(args[11..15], ["-z", "13", "-Z", "13"]);
    }

    #[test]
    fn region_map_overrides_plan_default() {
        let plan = tampere_plan();
        let jobs = jobs_for_region(&plan.regions()[1], plan.map(), plan.threads());
        assert_eq!(jobs[0].map(), "pkk_retina");
        let jobs = jobs_for_region(&plan.regions()[0], plan.map(), plan.threads());
        assert_eq!(jobs[0].map(), "pkk");
    }

    #[test]
    fn args_follow_the_render_list_contract() {
        let plan = tampere_plan();
        let jobs = jobs_for_region(&plan.regions()[0], plan.map(), plan.threads());
        assert_eq!(
            jobs[0].args(),
            [
                "-a", "-m", "pkk", "-x", "4619", "-y", "2304", "-X", "4652", "-Y", "2332", "-z",
                "13", "-Z", "13", "-n", "1",
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn captures_renderer_stdout() {
        let plan = tampere_plan();
        let jobs = jobs_for_region(&plan.regions()[0], plan.map(), plan.threads());
        let output = run_job("/bin/echo", &jobs[0]).unwrap();
        assert!(output.contains("-z 13 -Z 13"));
        assert!(output.contains("-m pkk"));
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_surfaces_the_status() {
        let plan = tampere_plan();
        let jobs = jobs_for_region(&plan.regions()[0], plan.map(), plan.threads());
        let err = run_job("/bin/false", &jobs[0]).unwrap_err();
        let process_err = err
            .downcast_ref::<RenderProcessError>()
            .expect("error should carry the process exit status");
        assert_eq!(process_err.exit_code(), Some(1));
    }

    #[test]
    fn missing_renderer_fails_to_spawn() {
        let plan = tampere_plan();
        let jobs = jobs_for_region(&plan.regions()[0], plan.map(), plan.threads());
        let err = run_job("tilewarm-no-such-renderer", &jobs[0]).unwrap_err();
        assert!(err.to_string().contains("Failed to spawn"));
    }
}
