use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_MAP_NAME, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, DEFAULT_NUM_THREADS, DEFAULT_RENDERER,
    MAX_RENDER_ZOOM,
};
use crate::slippy::BoundingBox;

/// Validated render plan: the list of region jobs plus the defaults shared
/// by all of them.
#[derive(Debug, Clone)]
pub struct RenderPlan {
    map: String,
    threads: u32,
    renderer: String,
    regions: Vec<RegionJob>,
}

impl RenderPlan {
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read render plan {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("Invalid render plan {}", path.display()))
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let file: PlanFile =
            serde_json::from_str(contents).context("Failed to parse render plan JSON")?;
        Self::from_file(file)
    }

    pub fn map(&self) -> &str {
        &self.map
    }

    pub fn threads(&self) -> u32 {
        self.threads
    }

    pub fn renderer(&self) -> &str {
        &self.renderer
    }

    pub fn regions(&self) -> &[RegionJob] {
        &self.regions
    }

    /// Command-line overrides take precedence over the plan file values.
    pub fn apply_overrides(
        &mut self,
        threads: Option<u32>,
        map: Option<&str>,
        renderer: Option<&str>,
    ) {
        if let Some(threads) = threads {
            self.threads = threads;
        }
        if let Some(map) = map {
            self.map = map.to_string();
        }
        if let Some(renderer) = renderer {
            self.renderer = renderer.to_string();
        }
    }

    fn from_file(file: PlanFile) -> Result<Self> {
        if file.regions.is_empty() {
            bail!("Render plan must list at least one region");
        }
        if file.threads == 0 {
            bail!("threads must be greater than 0");
        }
        if file.map.trim().is_empty() {
            bail!("map must not be empty");
        }
        if file.renderer.trim().is_empty() {
            bail!("renderer must not be empty");
        }
        let regions = file
            .regions
            .into_iter()
            .map(parse_region)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            map: file.map,
            threads: file.threads,
            renderer: file.renderer,
            regions,
        })
    }
}

/// One configured region: a bounding box, its zoom range, and an optional
/// map override.
#[derive(Debug, Clone)]
pub struct RegionJob {
    name: String,
    bbox: BoundingBox,
    min_zoom: u8,
    max_zoom: u8,
    map: Option<String>,
}

impl RegionJob {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn min_zoom(&self) -> u8 {
        self.min_zoom
    }

    pub fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    pub fn map(&self) -> Option<&str> {
        self.map.as_deref()
    }
}

#[derive(Debug, Deserialize)]
struct PlanFile {
    #[serde(default = "default_map")]
    map: String,
    #[serde(default = "default_threads")]
    threads: u32,
    #[serde(default = "default_renderer")]
    renderer: String,
    #[serde(default)]
    regions: Vec<RegionFile>,
}

fn default_map() -> String {
    DEFAULT_MAP_NAME.to_string()
}

fn default_threads() -> u32 {
    DEFAULT_NUM_THREADS
}

fn default_renderer() -> String {
    DEFAULT_RENDERER.to_string()
}

fn default_min_zoom() -> u8 {
    DEFAULT_MIN_ZOOM
}

fn default_max_zoom() -> u8 {
    DEFAULT_MAX_ZOOM
}

#[derive(Debug, Deserialize)]
struct RegionFile {
    name: String,
    bbox: [f64; 4],
    #[serde(default = "default_min_zoom")]
    min_zoom: u8,
    #[serde(default = "default_max_zoom")]
    max_zoom: u8,
    #[serde(default)]
    map: Option<String>,
}

fn parse_region(file: RegionFile) -> Result<RegionJob> {
    if file.name.trim().is_empty() {
        bail!("Region name must not be empty");
    }
    if file.min_zoom > file.max_zoom {
        bail!(
            "Region '{}': min_zoom {} exceeds max_zoom {}",
            file.name,
            file.min_zoom,
            file.max_zoom
        );
    }
    if file.max_zoom > MAX_RENDER_ZOOM {
        bail!(
            "Region '{}': max_zoom {} exceeds the render_list limit of {}",
            file.name,
            file.max_zoom,
            MAX_RENDER_ZOOM
        );
    }
    if let Some(map) = &file.map {
        if map.trim().is_empty() {
            bail!("Region '{}': map must not be empty when provided", file.name);
        }
    }
    // Bounding-box ordering is deliberately unchecked; an inverted box
    // yields an empty tile range.
    let [west, south, east, north] = file.bbox;
    Ok(RegionJob {
        name: file.name,
        bbox: BoundingBox::new(west, south, east, north),
        min_zoom: file.min_zoom,
        max_zoom: file.max_zoom,
        map: file.map,
    })
}
