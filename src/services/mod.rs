//! 业务能力层
//!
//! 目前只有写 warn 文件的能力

pub mod warn_writer;

pub use warn_writer::WarnWriter;
