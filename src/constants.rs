pub const DEFAULT_MAP_NAME: &str = "pkk";
pub const DEFAULT_NUM_THREADS: u32 = 1;
pub const DEFAULT_RENDERER: &str = "render_list";
pub const DEFAULT_MIN_ZOOM: u8 = 1;
pub const DEFAULT_MAX_ZOOM: u8 = 18;
pub const MAX_RENDER_ZOOM: u8 = 20; // render_list rejects deeper zooms
