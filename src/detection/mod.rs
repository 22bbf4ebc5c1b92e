//! 检测层：版式特征、版式分类、申论题检测

pub mod classifier;
pub mod essay_detector;
pub mod features;

pub use classifier::FormatClassifier;
pub use essay_detector::{EssayDetectionResult, EssayDetector, EssayFeatures};
