pub mod domain;
pub mod fallback;
pub mod ports;

pub use domain::{Comment, Document, DocumentDetail, Feedback, Refinement, Section, SectionDetail};
pub use fallback::{fallback_page, fallback_refine, split_sentences};
pub use ports::{DocumentStore, PortError, PortResult, TextGenerationService};
