use crate::config::Config;
use crate::constants::API_KEY_ENV;
use crate::metadata::{ImageMetaReader, MetaReader, NoopMetaReader};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "asset-squeeze",
    about = "Classify, fingerprint and shrink image assets in a directory tree",
    long_about = "asset-squeeze walks a directory tree, picks out JPEG and PNG files, reports their \
                  size and MD5 digest, and can shrink them through a remote compression service. \
                  Compressed files are written to ./compressed and skipped on later runs.",
    version,
    after_help = "EXAMPLES:\n  \
    asset-squeeze scan ./assets\n  \
    asset-squeeze scan \"./assets/**/*.png\" --meta --meta-reader image\n  \
    TINIFY_API_KEY=... asset-squeeze compress ./assets -k png"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short = 'c',
        long,
        global = true,
        help = "Path to a TOML config file"
    )]
    pub config: Option<PathBuf>,

    #[arg(short = 'q', long, global = true, help = "Only print errors")]
    pub quiet: bool,

    #[arg(
        short = 'v',
        long,
        global = true,
        conflicts_with = "quiet",
        help = "Print debug diagnostics"
    )]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "List matching files with their metadata",
        long_about = "Discover files under the input, keep the selected kinds and print one table per kind."
    )]
    Scan {
        #[command(flatten)]
        selection: SelectionArgs,
    },

    #[command(
        about = "Shrink matching files through the remote service",
        long_about = "Scan like `scan`, then upload every matching file to the shrink service and save \
                      the result under the output directory. The first failure stops the run; files \
                      already compressed are kept."
    )]
    Compress {
        #[command(flatten)]
        selection: SelectionArgs,

        #[arg(
            long,
            env = API_KEY_ENV,
            hide_env_values = true,
            help = "API key for the shrink service"
        )]
        api_key: Option<String>,

        #[arg(long, help = "Shrink endpoint URL")]
        endpoint: Option<String>,

        #[arg(short = 'o', long, help = "Directory for compressed output (default: compressed)")]
        output_dir: Option<PathBuf>,

        #[arg(
            long,
            help = "Compression quality (1-100, default: 80)",
            long_help = "Compression quality from 1 (lowest) to 100 (highest). \
                         Validated and recorded in the run configuration."
        )]
        quality: Option<u8>,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct SelectionArgs {
    #[arg(
        default_value = ".",
        help = "Directory, file, or glob pattern to scan",
        long_help = "Input can be a directory (walked recursively), a single file, or a glob \
                     expression such as './assets/**/*.png'"
    )]
    pub input: String,

    #[arg(
        short = 'k',
        long = "kind",
        help = "File kind to process (jpeg, png); repeatable, default: all"
    )]
    pub kinds: Vec<String>,

    #[arg(long, help = "Include files whose name starts with '.'")]
    pub include_hidden: bool,

    #[arg(long, help = "Hide the size column")]
    pub no_size: bool,

    #[arg(long, help = "Skip MD5 computation")]
    pub no_hash: bool,

    #[arg(long, help = "Read embedded image metadata")]
    pub meta: bool,

    #[arg(
        long,
        value_enum,
        default_value_t = MetaReaderArg::None,
        help = "Metadata reader used with --meta"
    )]
    pub meta_reader: MetaReaderArg,
}

impl SelectionArgs {
    /// Applies the selection flags on top of file configuration.
    pub fn apply(&self, config: &mut Config) {
        if !self.kinds.is_empty() {
            config.kinds = self.kinds.clone();
        }
        if self.include_hidden {
            config.filter.exclude_hidden = false;
        }
        if self.no_size {
            config.filter.compute_size = false;
        }
        if self.no_hash {
            config.filter.compute_hash = false;
        }
        if self.meta {
            config.filter.compute_meta = true;
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaReaderArg {
    /// Always empty
    None,
    /// Image dimensions and format from the file header
    Image,
}

impl MetaReaderArg {
    pub fn into_reader(self) -> Box<dyn MetaReader> {
        match self {
            MetaReaderArg::None => Box::new(NoopMetaReader),
            MetaReaderArg::Image => Box::new(ImageMetaReader),
        }
    }
}
