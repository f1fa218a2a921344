use std::path::PathBuf;

/// Workbook the dashboard reads when nothing else is given.
pub const DEFAULT_WORKBOOK_PATH: &str = "FSAFAWAIExcel_Final.xlsx";

/// Address the web server listens on by default.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Runtime settings for the binaries.
#[derive(Clone, Debug)]
pub struct DashboardConfig {
    /// Path of the workbook to load
    pub workbook_path: PathBuf,

    /// `host:port` the web server binds to
    pub bind_addr: String,

    /// Width of every chart in pixels
    pub chart_width: u32,

    /// Height of every chart in pixels
    pub chart_height: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            workbook_path: PathBuf::from(DEFAULT_WORKBOOK_PATH),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            chart_width: 640,
            chart_height: 400,
        }
    }
}

impl DashboardConfig {
    /// Builds the configuration from positional command line arguments
    ///
    /// `args[0]` is the program name, `args[1]` the workbook path and
    /// `args[2]` the bind address. Missing arguments keep their defaults.
    ///
    /// # Examples
    /// ```
    /// use fsa_dashboard::config::DashboardConfig;
    ///
    /// let args = vec!["fsa-dashboard".to_string(), "data.xlsx".to_string()];
    /// let config = DashboardConfig::from_args(&args);
    /// assert_eq!(config.workbook_path.to_str(), Some("data.xlsx"));
    /// assert_eq!(config.bind_addr, "127.0.0.1:3000");
    /// ```
    pub fn from_args(args: &[String]) -> Self {
        let mut config = Self::default();

        if let Some(path) = args.get(1) {
            config.workbook_path = PathBuf::from(path);
        }
        if let Some(addr) = args.get(2) {
            config.bind_addr = addr.clone();
        }

        config
    }
}
