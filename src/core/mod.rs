pub mod analyzer;
pub mod classifier;
pub mod extractor;
pub mod prompts;
pub mod speech;

pub use analyzer::{LabelAnalyzer, ScanResult};
pub use classifier::{KeywordTable, SafetyClassifier, VerdictTitles};
pub use extractor::{Extractor, JsonFormat, LineTaggedFormat, ResponseFormat};
