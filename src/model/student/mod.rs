mod import;
mod student_core;

pub use import::{parse_delete, parse_import, DeleteRow, DeleteSummary, ImportRow, ImportSummary};
pub use student_core::{NewStudent, Student, StudentCore};
