//! 属性名称 -> 后端字段键

use std::collections::HashMap;

use crate::error::FilterError;

/// 后端直接按名称访问的字段，不经过解析器
pub const LITERAL_FIELDS: [&str; 2] = ["status", "isAutotest"];

pub fn is_literal_field(name: &str) -> bool {
    LITERAL_FIELDS.contains(&name)
}

/// 将属性标题解析为过滤接口使用的键，例如 `Priority` -> `attributes.5a1b...`
pub trait AttributeResolver {
    fn resolve_attribute_key(&self, name: &str) -> Result<String, FilterError>;
}

/// 标题 -> 属性定义 id
impl AttributeResolver for HashMap<String, String> {
    fn resolve_attribute_key(&self, name: &str) -> Result<String, FilterError> {
        self.get(name)
            .map(|id| attribute_path(id))
            .ok_or_else(|| FilterError::UnknownAttribute { name: name.to_string() })
    }
}

impl<R: AttributeResolver + ?Sized> AttributeResolver for &R {
    fn resolve_attribute_key(&self, name: &str) -> Result<String, FilterError> {
        (**self).resolve_attribute_key(name)
    }
}

/// 项目属性在用例文档中的键
pub fn attribute_path(definition_id: &str) -> String {
    format!("attributes.{}", definition_id)
}

/// 解析比较的键：字面字段原样保留，其余交给项目解析器
pub(crate) fn resolve_key<R: AttributeResolver + ?Sized>(
    resolver: &R,
    name: &str,
) -> Result<String, FilterError> {
    if is_literal_field(name) {
        Ok(name.to_string())
    } else {
        resolver.resolve_attribute_key(name)
    }
}
