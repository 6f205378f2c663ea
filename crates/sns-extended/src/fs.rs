use crate::store::{BlobStore, BlobStoreError, BlobStoreResult};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Blob store laid out as `<root>/<bucket>/<key>`.
#[derive(Clone, Debug)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new<P: AsRef<Path>>(root: P) -> BlobStoreResult<Self> {
        std::fs::create_dir_all(root.as_ref()).map_err(|err| {
            BlobStoreError::Backend(format!("create fs store root failed: {err}"))
        })?;
        Ok(Self {
            root: root.as_ref().to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn object_path(&self, bucket: &str, key: &str) -> BlobStoreResult<PathBuf> {
        validate_component("bucket", bucket)?;
        validate_component("key", key)?;
        Ok(self.root.join(bucket).join(key))
    }
}

#[async_trait::async_trait]
impl BlobStore for FsBlobStore {
    async fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> BlobStoreResult<()> {
        let path = self.object_path(bucket, key)?;
        let bucket_dir = self.root.join(bucket);
        tokio::fs::create_dir_all(&bucket_dir).await.map_err(|err| {
            BlobStoreError::Backend(format!("create bucket dir failed: {err}"))
        })?;

        let tmp = bucket_dir.join(format!(".{key}.tmp"));
        let written = async {
            write_synced(&tmp, body).await?;
            tokio::fs::rename(&tmp, &path)
                .await
                .map_err(|err| BlobStoreError::Backend(format!("rename object failed: {err}")))
        }
        .await;
        if written.is_err() {
            let _ = tokio::fs::remove_file(&tmp).await;
        }
        written
    }
}

async fn write_synced(path: &Path, body: &[u8]) -> BlobStoreResult<()> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|err| BlobStoreError::Backend(format!("create object failed: {err}")))?;
    file.write_all(body)
        .await
        .map_err(|err| BlobStoreError::Backend(format!("write object failed: {err}")))?;
    file.sync_all()
        .await
        .map_err(|err| BlobStoreError::Backend(format!("sync object failed: {err}")))
}

fn validate_component(field: &str, value: &str) -> BlobStoreResult<()> {
    let invalid = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\', '\0']);
    if invalid {
        return Err(BlobStoreError::InvalidInput(format!(
            "{field} must be a single path component: {value:?}"
        )));
    }
    Ok(())
}
