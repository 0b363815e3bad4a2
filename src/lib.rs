pub mod batch;
pub mod cli;
pub mod config;
pub mod constants;
pub mod discovery;
pub mod error;
pub mod filter;
pub mod kinds;
pub mod logger;
pub mod metadata;
pub mod pipeline;
pub mod remote;
pub mod report;

pub use batch::{compress_batch, BatchFailure, BatchOutcome, Compressor, Stage};
pub use config::{CompressionConfig, Config, RemoteStoreConfig, ServiceConfig};
pub use discovery::{collect_files, discover_files, walk};
pub use error::{Result, SqueezeError};
pub use filter::{filter_files, FilterConfig};
pub use kinds::{ExtensionKind, FileKind, Jpeg, KindRegistry, Png};
pub use metadata::{
    content_hash, extract_file_record, FileRecord, ImageMetaReader, MetaReader, MetadataExtractor,
    NoopMetaReader,
};
pub use pipeline::{CompressionSummary, KindGroup, Pipeline};
pub use remote::{ApiKey, HttpTransport, RemoteCompressor, ShrinkResponse, Transport};
pub use report::{human_size, print_records, render_table};
