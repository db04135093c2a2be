pub mod normalizer;
pub mod pipeline;

pub use normalizer::{
    DroppedRecord, NormalizeReport, NormalizeResult, NormalizeStats, RecordNormalizer,
};
pub use pipeline::{preprocess_visits, PreprocessPipeline, PreprocessResult};
