pub mod evidence_guard;
pub mod inference_session;
pub mod prompt_builder;
pub mod reply_normalizer;
pub mod result_exporter;
pub mod text_extractor;

pub use evidence_guard::enforce_evidence;
pub use inference_session::{InferenceSessionManager, SessionPhase, SessionTurn};
pub use prompt_builder::build_prompt;
pub use reply_normalizer::{normalize, ReplyNormalizer};
pub use result_exporter::ResultExporter;
pub use text_extractor::{DocumentFormat, TextExtractor};
