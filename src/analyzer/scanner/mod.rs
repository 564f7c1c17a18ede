mod file_scanner;

pub use file_scanner::{FileScanner, is_java_file};
