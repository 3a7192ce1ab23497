use std::path::{Path, PathBuf};

use anyhow::Context;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use vxmod_installer_protocol::{async_trait, InstallError, ModuleIdentifier, ModuleInstaller};

use super::{ensure_not_installed, install_from_source, maven_archive_path, ModuleSource};

/// Installs module archives from a Maven-layout HTTP repository.
///
/// Downloads are cached under the download cache directory, keyed by the
/// module and a hash of the archive URL, so reinstalling a module after
/// `mods clear` does not hit the network again.
pub struct RemoteRepositoryInstaller {
    base_url: String,
    cache_dir: PathBuf,
    client: reqwest::Client,
}

impl RemoteRepositoryInstaller {
    pub fn new(base_url: impl Into<String>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache_dir: cache_dir.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Use a preconfigured HTTP client, e.g. one with proxy or TLS settings
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn archive_url(&self, module: &ModuleIdentifier) -> String {
        format!("{}/{}", self.base_url, maven_archive_path(module))
    }

    pub fn cache_path(&self, module: &ModuleIdentifier) -> PathBuf {
        let url_hash = format!("{:x}", Sha256::digest(self.archive_url(module).as_bytes()));
        self.cache_dir.join(format!(
            "{}-{}_{}.zip",
            module.name(),
            module.version(),
            &url_hash[..8]
        ))
    }

    /// Download the module archive unless it is already cached
    async fn fetch_archive(&self, module: &ModuleIdentifier) -> Result<PathBuf, InstallError> {
        let cache_path = self.cache_path(module);
        if cache_path.is_file() {
            debug!("Using cached archive for {}: {}", module, cache_path.display());
            return Ok(cache_path);
        }

        let url = self.archive_url(module);
        info!("Downloading module {} from {}", module, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| InstallError::Failed(format!("Failed to download {}: {}", url, e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(InstallError::NotFound {
                repository: self.base_url.clone(),
            });
        }
        if !status.is_success() {
            return Err(InstallError::Failed(format!(
                "Failed to download {}: HTTP {}",
                url, status
            )));
        }

        let bytes = response.bytes().await.map_err(|e| {
            InstallError::Failed(format!("Failed to read archive data from {}: {}", url, e))
        })?;
        if bytes.is_empty() {
            return Err(InstallError::Failed(format!(
                "Downloaded archive from {} is empty",
                url
            )));
        }

        write_cache_file(&cache_path, &bytes)
            .await
            .map_err(|e| InstallError::Failed(format!("{:#}", e)))?;

        Ok(cache_path)
    }
}

/// Write through a temporary file so a cut-off download is never mistaken for
/// a cached archive
async fn write_cache_file(cache_path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = cache_path.parent() {
        tokio::fs::create_dir_all(parent).await.with_context(|| {
            format!("Failed to create download cache directory: {}", parent.display())
        })?;
    }

    let partial = cache_path.with_extension("zip.part");
    let mut file = tokio::fs::File::create(&partial)
        .await
        .with_context(|| format!("Failed to create cache file: {}", partial.display()))?;
    file.write_all(bytes)
        .await
        .with_context(|| format!("Failed to write cache file: {}", partial.display()))?;
    file.flush()
        .await
        .with_context(|| format!("Failed to flush cache file: {}", partial.display()))?;
    drop(file);

    tokio::fs::rename(&partial, cache_path)
        .await
        .with_context(|| format!("Failed to move {} into the cache", partial.display()))?;
    Ok(())
}

#[async_trait]
impl ModuleInstaller for RemoteRepositoryInstaller {
    fn name(&self) -> &str {
        &self.base_url
    }

    async fn install_module(
        &self,
        module: &ModuleIdentifier,
        mods_dir: &Path,
    ) -> Result<(), InstallError> {
        ensure_not_installed(mods_dir, module)?;

        let archive = self.fetch_archive(module).await?;
        install_from_source(ModuleSource::Archive(archive), module, mods_dir).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::zip_directory;
    use crate::installer::{LocalRepositoryInstaller, RepositoryChain};
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    fn id(raw: &str) -> ModuleIdentifier {
        ModuleIdentifier::new(raw).unwrap()
    }

    #[test]
    fn test_archive_url() {
        let installer =
            RemoteRepositoryInstaller::new("https://repo.example.com/maven2/", "/tmp/cache");
        assert_eq!(
            installer.archive_url(&id("io.vertx~mod-auth-mgr~2.0.0")),
            "https://repo.example.com/maven2/io/vertx/mod-auth-mgr/2.0.0/mod-auth-mgr-2.0.0-mod.zip"
        );
        assert_eq!(installer.name(), "https://repo.example.com/maven2");
    }

    #[test]
    fn test_cache_path_depends_on_repository() {
        let module = id("io.vertx~mod-auth-mgr~2.0.0");
        let a = RemoteRepositoryInstaller::new("https://a.example.com", "/cache");
        let b = RemoteRepositoryInstaller::new("https://b.example.com", "/cache");

        let path_a = a.cache_path(&module);
        let file_name = path_a.file_name().unwrap().to_str().unwrap();
        assert!(file_name.starts_with("mod-auth-mgr-2.0.0_"));
        assert!(file_name.ends_with(".zip"));
        assert_ne!(path_a, b.cache_path(&module));
    }

    #[tokio::test]
    async fn test_installs_from_cached_archive_without_network() {
        let temp = TempDir::new().unwrap();
        let module = id("io.example~cached~1.0");
        // Unroutable base URL: the install must be served from the cache
        let installer =
            RemoteRepositoryInstaller::new("http://127.0.0.1:9/repo", temp.path().join("cache"));

        let staging = temp.path().join("staging");
        fs::create_dir_all(staging.join("lib")).unwrap();
        fs::write(staging.join("mod.json"), "{}").unwrap();
        fs::write(staging.join("lib").join("x.jar"), "jar").unwrap();
        zip_directory(&staging, &installer.cache_path(&module)).unwrap();

        let mods_dir = temp.path().join("mods");
        installer.install_module(&module, &mods_dir).await.unwrap();

        assert!(mods_dir.join("io.example~cached~1.0").join("lib").join("x.jar").is_file());
    }

    #[tokio::test]
    async fn test_existing_module_short_circuits() {
        let temp = TempDir::new().unwrap();
        let module = id("io.example~present~1.0");
        let mods_dir = temp.path().join("mods");
        fs::create_dir_all(mods_dir.join(module.as_str())).unwrap();

        let installer =
            RemoteRepositoryInstaller::new("http://127.0.0.1:9/repo", temp.path().join("cache"));
        let result = installer.install_module(&module, &mods_dir).await;

        assert_eq!(result, Err(InstallError::AlreadyInstalled));
    }

    #[tokio::test]
    async fn test_write_cache_file_leaves_no_partial() {
        let temp = TempDir::new().unwrap();
        let cache_path = temp.path().join("nested").join("m-1_abcdef12.zip");

        write_cache_file(&cache_path, b"data").await.unwrap();

        assert_eq!(fs::read(&cache_path).unwrap(), b"data");
        assert!(!cache_path.with_extension("zip.part").exists());
    }

    /// Serve `status` and `body` to every request; returns the base URL
    async fn serve(status: &'static str, body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let body = body.clone();
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&buf[..n]),
                        }
                    }
                    let head = format!(
                        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        status,
                        body.len()
                    );
                    let _ = socket.write_all(head.as_bytes()).await;
                    let _ = socket.write_all(&body).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{}/repo", addr)
    }

    fn installer(base_url: &str, cache_dir: &Path) -> RemoteRepositoryInstaller {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        RemoteRepositoryInstaller::new(base_url, cache_dir).with_client(client)
    }

    fn module_zip(temp: &TempDir) -> Vec<u8> {
        let staging = temp.path().join("module-src");
        fs::create_dir_all(staging.join("lib")).unwrap();
        fs::write(staging.join("mod.json"), "{}").unwrap();
        fs::write(staging.join("lib").join("remote.jar"), "jar").unwrap();
        let archive = temp.path().join("module.zip");
        zip_directory(&staging, &archive).unwrap();
        fs::read(archive).unwrap()
    }

    #[tokio::test]
    async fn test_missing_archive_is_not_found() {
        let temp = TempDir::new().unwrap();
        let base_url = serve("404 Not Found", Vec::new()).await;
        let installer = installer(&base_url, &temp.path().join("cache"));
        let module = id("io.example~absent~1.0");

        let result = installer
            .install_module(&module, &temp.path().join("mods"))
            .await;

        assert_eq!(
            result,
            Err(InstallError::NotFound {
                repository: base_url
            })
        );
        assert!(!installer.cache_path(&module).exists());
    }

    #[tokio::test]
    async fn test_server_error_is_failure() {
        let temp = TempDir::new().unwrap();
        let base_url = serve("500 Internal Server Error", b"boom".to_vec()).await;
        let installer = installer(&base_url, &temp.path().join("cache"));
        let module = id("io.example~broken~1.0");

        let result = installer
            .install_module(&module, &temp.path().join("mods"))
            .await;

        match result {
            Err(InstallError::Failed(msg)) => assert!(msg.contains("500"), "{}", msg),
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(!installer.cache_path(&module).exists());
        assert!(!temp.path().join("mods").join(module.as_str()).exists());
    }

    #[tokio::test]
    async fn test_download_is_cached_then_installed() {
        let temp = TempDir::new().unwrap();
        let base_url = serve("200 OK", module_zip(&temp)).await;
        let installer = installer(&base_url, &temp.path().join("cache"));
        let module = id("io.example~fetched~1.0");
        let mods_dir = temp.path().join("mods");

        installer.install_module(&module, &mods_dir).await.unwrap();

        assert!(installer.cache_path(&module).is_file());
        assert!(mods_dir
            .join("io.example~fetched~1.0")
            .join("lib")
            .join("remote.jar")
            .is_file());
    }

    #[tokio::test]
    async fn test_chain_falls_through_missing_remote_to_local() {
        let temp = TempDir::new().unwrap();
        let base_url = serve("404 Not Found", Vec::new()).await;
        let module = id("io.example~local~1.0");

        let repo = temp.path().join("repo");
        fs::create_dir_all(repo.join(module.as_str())).unwrap();
        fs::write(repo.join(module.as_str()).join("mod.json"), "{}").unwrap();

        let chain = RepositoryChain::new(vec![
            Arc::new(installer(&base_url, &temp.path().join("cache"))) as Arc<dyn ModuleInstaller>,
            Arc::new(LocalRepositoryInstaller::new(&repo)) as Arc<dyn ModuleInstaller>,
        ]);
        let mods_dir = temp.path().join("mods");

        chain.install_module(&module, &mods_dir).await.unwrap();

        assert!(mods_dir.join(module.as_str()).join("mod.json").is_file());
    }
}
