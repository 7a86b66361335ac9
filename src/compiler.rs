//! 过滤器编译器入口：文本过滤器 -> 后端 JSON 表达式
//!
//! ```text
//! tokenize() → to_postfix() → TreeEmitter::emit() → serde_json
//! ```

use tracing::{debug, trace};

use crate::ast::Expression;
use crate::emitter::TreeEmitter;
use crate::error::FilterError;
use crate::lexer::tokenize;
use crate::postfix::to_postfix;
use crate::resolver::AttributeResolver;
use crate::simple_filter::parse_simple_filter;

/// 将过滤器编译为表达式树
pub fn compile_filter<R: AttributeResolver + ?Sized>(
    resolver: &R,
    filter_text: &str,
) -> Result<Expression, FilterError> {
    let tokens = tokenize(filter_text);
    trace!(count = tokens.len(), "tokenized filter");

    let postfix = to_postfix(tokens)?;
    trace!(count = postfix.len(), "converted filter to postfix form");

    TreeEmitter::new(resolver).emit(postfix)
}

/// 将过滤器编译为 case 接口 `expression` 参数所需的紧凑 JSON
///
/// URL 编码由调用者负责。
pub fn convert_filter<R: AttributeResolver + ?Sized>(
    resolver: &R,
    filter_text: &str,
) -> Result<String, FilterError> {
    let expression = compile_filter(resolver, filter_text)?;
    let json = serde_json::to_string(&expression)?;
    debug!(filter = filter_text, expression = %json, "compiled filter");
    Ok(json)
}

/// 过滤器的书写语法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Syntax {
    /// `status = "ACTUAL" AND NOT Priority = EMPTY`
    #[default]
    Expression,
    /// `title=value&title=v1,v2`
    Simple,
}

/// 绑定到一个项目属性解析器的编译器，可以重复编译多个过滤器
pub struct FilterCompiler<R> {
    resolver: R,
}

impl<R: AttributeResolver> FilterCompiler<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn compile(&self, filter_text: &str) -> Result<Expression, FilterError> {
        compile_filter(&self.resolver, filter_text)
    }

    pub fn convert(&self, filter_text: &str) -> Result<String, FilterError> {
        convert_filter(&self.resolver, filter_text)
    }

    /// 按指定语法编译并输出 JSON，`pretty` 为 true 时输出带缩进的格式
    ///
    /// 简单语法的空过滤器没有表达式，返回空字符串。
    pub fn render(
        &self,
        filter_text: &str,
        syntax: Syntax,
        pretty: bool,
    ) -> Result<String, FilterError> {
        let expression = match syntax {
            Syntax::Expression => self.compile(filter_text)?,
            Syntax::Simple => match parse_simple_filter(&self.resolver, filter_text)? {
                Some(expression) => expression,
                None => return Ok(String::new()),
            },
        };

        let json = if pretty {
            serde_json::to_string_pretty(&expression)?
        } else {
            serde_json::to_string(&expression)?
        };
        Ok(json)
    }
}
