//! 测试用例过滤器编译器
//!
//! 将 `status = "ACTUAL" AND NOT "Test type" = EMPTY` 这样的过滤器
//! 编译为 case 接口接受的 JSON 表达式树。

pub mod ast;
pub mod compiler;
pub mod config;
pub mod emitter;
pub mod error;
pub mod lexer;
pub mod postfix;
pub mod resolver;
pub mod simple_filter;
pub mod token;

pub use ast::{Expression, Literal};
pub use compiler::{compile_filter, convert_filter, FilterCompiler, Syntax};
pub use config::{ConfigError, Definition, ProjectDefinitions};
pub use error::FilterError;
pub use resolver::AttributeResolver;
pub use simple_filter::parse_simple_filter;
