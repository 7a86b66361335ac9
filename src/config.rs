//! 配置模块，负责加载项目属性定义的JSON文件

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::FilterError;
use crate::resolver::{attribute_path, AttributeResolver};

/// 属性定义配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("配置文件不存在: {}", .0.display())]
    NotFound(PathBuf),

    #[error("无法读取配置文件 {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("无法解析JSON配置文件 {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 项目中的一个属性定义，与后端 definitions 接口返回的结构一致
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// 项目的属性定义集合，按标题建立索引
#[derive(Debug, Clone, Default)]
pub struct ProjectDefinitions {
    project: String,
    definitions: Vec<Definition>,
    /// 标题 -> definitions 中的下标
    by_title: HashMap<String, usize>,
}

impl ProjectDefinitions {
    pub fn new(project: impl Into<String>, definitions: Vec<Definition>) -> Self {
        let project = project.into();
        let mut by_title = HashMap::with_capacity(definitions.len());
        for (index, definition) in definitions.iter().enumerate() {
            if by_title.contains_key(&definition.title) {
                // 重复标题时保留第一个
                warn!(project = %project, title = %definition.title, "duplicate attribute definition ignored");
                continue;
            }
            by_title.insert(definition.title.clone(), index);
        }
        Self { project, definitions, by_title }
    }

    /// 没有任何属性定义的项目，只能使用 status / isAutotest
    pub fn empty(project: impl Into<String>) -> Self {
        Self::new(project, Vec::new())
    }

    /// 从JSON文件加载属性定义
    pub fn from_json_file<P: AsRef<Path>>(project: &str, path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();

        // 检查文件是否存在
        if !path_ref.exists() {
            return Err(ConfigError::NotFound(path_ref.to_path_buf()));
        }

        // 读取文件内容
        let content = fs::read_to_string(path_ref).map_err(|source| ConfigError::Io {
            path: path_ref.to_path_buf(),
            source,
        })?;

        let definitions = parse_definitions(&content, &path_ref.display().to_string())?;
        debug!(
            project,
            path = %path_ref.display(),
            count = definitions.len(),
            "loaded attribute definitions"
        );
        Ok(Self::new(project, definitions))
    }

    /// 从JSON字符串加载属性定义
    pub fn from_json_str(project: &str, content: &str) -> Result<Self, ConfigError> {
        let definitions = parse_definitions(content, "<string>")?;
        Ok(Self::new(project, definitions))
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// 按标题查找属性定义
    pub fn definition(&self, title: &str) -> Option<&Definition> {
        self.by_title.get(title).map(|&index| &self.definitions[index])
    }

    /// 获取所有属性定义
    pub fn definitions(&self) -> &[Definition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn parse_definitions(content: &str, origin: &str) -> Result<Vec<Definition>, ConfigError> {
    serde_json::from_str(content).map_err(|source| ConfigError::Json {
        origin: origin.to_string(),
        source,
    })
}

impl AttributeResolver for ProjectDefinitions {
    fn resolve_attribute_key(&self, name: &str) -> Result<String, FilterError> {
        self.definition(name)
            .map(|definition| attribute_path(&definition.id))
            .ok_or_else(|| FilterError::UnknownAttribute { name: name.to_string() })
    }
}
