use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Compiled-in defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_DATA_PATH: &str = "lidanargogn_sudurnes_gervi.csv";
pub const DEFAULT_LOGO_PATH: &str = "OIP.jpg";
pub const WINDOW_TITLE: &str = "Mælaborð Suðurnesja";

/// Number of metrics listed as strengths and as challenges per school.
pub const RANKING_SIZE: usize = 3;

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub logo_path: PathBuf,
    pub window_title: String,
    pub ranking_size: usize,
    pub inner_size: [f32; 2],
    pub min_inner_size: [f32; 2],
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            logo_path: PathBuf::from(DEFAULT_LOGO_PATH),
            window_title: WINDOW_TITLE.to_string(),
            ranking_size: RANKING_SIZE,
            inner_size: [1280.0, 900.0],
            min_inner_size: [800.0, 500.0],
        }
    }
}
