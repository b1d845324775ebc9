use clap::Args;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Base name of the assessment template inside the data directory
pub const TEMPLATE_STEM: &str = "FAIR_assessment_template";

/// Where the dashboard finds its data and how it is served
///
/// Every option can be given on the command line or through the
/// environment.
#[derive(Args, Clone, Debug)]
pub struct Settings {
    /// Directory holding the assessment template and the assessments folder
    #[arg(long, env = "FAIRVIS_DATA_DIR", default_value = "data", global = true)]
    pub data_dir: PathBuf,

    /// Assessment template (default: <data-dir>/FAIR_assessment_template.xlsx, or .csv)
    #[arg(long, env = "FAIRVIS_TEMPLATE", global = true)]
    pub template: Option<PathBuf>,

    /// Directory of model assessments (default: <data-dir>/assessments)
    #[arg(long, env = "FAIRVIS_ASSESSMENTS", global = true)]
    pub assessments: Option<PathBuf>,

    /// Address the web server listens on
    #[arg(long, env = "FAIRVIS_BIND", default_value = "127.0.0.1:3000", global = true)]
    pub bind: SocketAddr,

    /// Directory served under /static
    #[arg(long, env = "FAIRVIS_STATIC_DIR", default_value = "static", global = true)]
    pub static_dir: PathBuf,

    /// Model shown on the About tab
    #[arg(long, env = "FAIRVIS_EXAMPLE_MODEL", default_value = "BioModels_C19_curated", global = true)]
    pub example_model: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self::with_data_dir("data")
    }
}

impl Settings {
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Settings {
            data_dir: data_dir.into(),
            template: None,
            assessments: None,
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            static_dir: PathBuf::from("static"),
            example_model: "BioModels_C19_curated".to_string(),
        }
    }

    /// Explicit template, else the xlsx template if present, else the csv one
    pub fn template_path(&self) -> PathBuf {
        if let Some(path) = &self.template {
            return path.clone();
        }
        let xlsx = self.data_dir.join(format!("{}.xlsx", TEMPLATE_STEM));
        if xlsx.exists() {
            xlsx
        } else {
            self.data_dir.join(format!("{}.csv", TEMPLATE_STEM))
        }
    }

    pub fn assessments_dir(&self) -> PathBuf {
        self.assessments
            .clone()
            .unwrap_or_else(|| self.data_dir.join("assessments"))
    }
}
