pub mod note_table;
pub mod tune_parser;
