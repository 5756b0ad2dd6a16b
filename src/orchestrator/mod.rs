//! 编排层：目录扫描、配对与批量并发评估

pub mod batch_processor;
pub mod pair_scanner;

pub use batch_processor::App;
pub use pair_scanner::{is_answer_sheet_name, scan_document_pairs, DocumentPair};
