use std::path::PathBuf;

use clap::Parser;

use sales_dashboard::config::DEFAULT_CONFIG_FILE;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Sales file to open at startup (overrides `data_path` from the config file)
    pub data: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Do not download the decorative banner
    #[arg(long)]
    pub no_banner: bool,
}
