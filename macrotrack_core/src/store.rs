//! 文档存储
//!
//! 以 `(collection, key) -> JSON` 的形式保存用户资料和每日记录，
//! 托管数据库在这里被当作不透明的键值存储。

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

/// 用户资料集合
pub const USERS: &str = "users";
/// 每日记录集合
pub const DAILY_LOGS: &str = "dailyLogs";

/// 文档存储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 读取文档，不存在时返回 None
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>>;

    /// 整体写入文档（覆盖）
    async fn put(&self, collection: &str, key: &str, doc: Value) -> Result<()>;

    /// 删除文档，不存在时忽略
    async fn delete(&self, collection: &str, key: &str) -> Result<()>;
}

/// 内存存储
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<HashMap<(String, String), Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 文档数量
    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>> {
        let docs = self.docs.read().await;
        Ok(docs.get(&(collection.to_string(), key.to_string())).cloned())
    }

    async fn put(&self, collection: &str, key: &str, doc: Value) -> Result<()> {
        self.docs
            .write()
            .await
            .insert((collection.to_string(), key.to_string()), doc);
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<()> {
        self.docs
            .write()
            .await
            .remove(&(collection.to_string(), key.to_string()));
        Ok(())
    }
}

/// 文件存储：每个文档一个 JSON 文件，位于 `{root}/{collection}/{key}.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn doc_path(&self, collection: &str, key: &str) -> Result<PathBuf> {
        check_segment("collection", collection)?;
        check_segment("key", key)?;
        Ok(self.root.join(collection).join(format!("{}.json", key)))
    }
}

/// 路径片段不能为空，也不能跳出根目录
fn check_segment(what: &str, segment: &str) -> Result<()> {
    if segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains(['/', '\\'])
    {
        return Err(Error::InvalidParam(format!("Invalid {}: {:?}", what, segment)));
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>> {
        let path = self.doc_path(collection, key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                let doc = serde_json::from_str(&content).map_err(|e| {
                    Error::Storage(format!("Corrupt document {}: {}", path.display(), e))
                })?;
                Ok(Some(doc))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, collection: &str, key: &str, doc: Value) -> Result<()> {
        let path = self.doc_path(collection, key)?;
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        // 先写临时文件再重命名，避免中断时留下半个文档
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(&doc)?).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!("Wrote document {}", path.display());
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<()> {
        let path = self.doc_path(collection, key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
