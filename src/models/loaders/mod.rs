pub mod text_loader;
pub mod toml_loader;

pub use text_loader::{load_all_papers, load_paper, ANSWER_FILE_SUFFIX};
pub use toml_loader::load_parsing_policy;
