pub mod category;
pub mod format_type;
pub mod loaders;
pub mod paper;
pub mod question;

pub use category::Category;
pub use format_type::FormatType;
pub use loaders::{load_all_papers, load_paper, load_parsing_policy};
pub use paper::PaperInput;
pub use question::{group_id, AnswerMap, Difficulty, Question, QuestionType, OPTION_LETTERS};
