use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::AvatarUpload;
use crate::domain::ports::AvatarStore;

/// Writes avatars into a local directory under generated 32-hex-digit names.
#[derive(Debug, Clone)]
pub struct LocalAvatarStore {
    dir: PathBuf,
}

impl LocalAvatarStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl AvatarStore for LocalAvatarStore {
    async fn store(&self, upload: &AvatarUpload) -> anyhow::Result<String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("create uploads dir {}", self.dir.display()))?;

        let name = Uuid::new_v4().simple().to_string();
        let path = self.dir.join(&name);
        tokio::fs::write(&path, &upload.bytes)
            .await
            .with_context(|| format!("write avatar {}", path.display()))?;

        tracing::debug!(
            file = %name,
            original = upload.file_name.as_deref().unwrap_or(""),
            size = upload.bytes.len(),
            "avatar written"
        );
        Ok(name)
    }

    async fn remove(&self, name: &str) -> anyhow::Result<()> {
        let path = self.dir.join(name);
        tokio::fs::remove_file(&path)
            .await
            .with_context(|| format!("remove avatar {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_under_generated_name() {
        let tmp = tempfile::tempdir().unwrap();
        let store = LocalAvatarStore::new(tmp.path().join("uploads"));
        let upload = AvatarUpload {
            file_name: Some("../../etc/passwd".into()),
            content_type: Some("image/png".into()),
            bytes: b"png-bytes".to_vec(),
        };

        let a = store.store(&upload).await.unwrap();
        let b = store.store(&upload).await.unwrap();

        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        let written = tokio::fs::read(tmp.path().join("uploads").join(&a))
            .await
            .unwrap();
        assert_eq!(written, b"png-bytes");
    }

    #[tokio::test]
    async fn remove_deletes_stored_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("uploads");
        let store = LocalAvatarStore::new(&dir);
        let upload = AvatarUpload {
            file_name: None,
            content_type: None,
            bytes: b"x".to_vec(),
        };

        let name = store.store(&upload).await.unwrap();
        store.remove(&name).await.unwrap();
        assert!(!dir.join(&name).exists());
        assert!(store.remove(&name).await.is_err());
    }
}
