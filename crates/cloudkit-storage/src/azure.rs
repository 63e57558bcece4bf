//! Azure Blob Storage

use crate::error::{StorageError, StorageResult};
use crate::object_store_backend::{ObjectStoreStorage, VendorStore};
use cloudkit_core::{AzureBlobConfig, AzureConnectionString, Vendor};
use object_store::azure::{AzureConfigKey, MicrosoftAzure, MicrosoftAzureBuilder};

impl VendorStore for MicrosoftAzure {
    const VENDOR: Vendor = Vendor::AzureBlob;
}

pub type AzureBlobStorage = ObjectStoreStorage<MicrosoftAzure>;

impl ObjectStoreStorage<MicrosoftAzure> {
    /// Build a container client from the connection string. No request is sent.
    pub fn new(config: &AzureBlobConfig) -> StorageResult<Self> {
        config.validate()?;
        let conn = config.parsed_connection_string()?;

        let store = builder(&conn, &config.container_name)
            .build()
            .map_err(|e| {
                StorageError::provider_init(e).with_detail("failed to create Azure store")
            })?;

        tracing::info!(
            container = %config.container_name,
            endpoint = conn.blob_endpoint().as_deref().unwrap_or("emulator"),
            emulator = conn.use_development_storage,
            "Azure Blob storage initialized"
        );

        Ok(Self::from_store(store, config.container_name.clone()))
    }
}

fn builder(conn: &AzureConnectionString, container: &str) -> MicrosoftAzureBuilder {
    let mut builder = MicrosoftAzureBuilder::new().with_container_name(container);

    if conn.use_development_storage {
        builder = builder.with_use_emulator(true);
    }
    if let Some(account) = account_name(conn) {
        builder = builder.with_account(account);
    }
    if let Some(key) = &conn.account_key {
        builder = builder.with_access_key(key);
    }
    if let Some(sas) = &conn.sas_token {
        builder = builder.with_config(AzureConfigKey::SasKey, sas.trim_start_matches('?'));
    }
    if let Some(endpoint) = &conn.blob_endpoint {
        builder = builder
            .with_endpoint(endpoint.clone())
            .with_allow_http(endpoint.starts_with("http://"));
    }
    builder
}

/// `AccountName`, or the first label of `https://{account}.blob.core.windows.net`.
fn account_name(conn: &AzureConnectionString) -> Option<String> {
    if let Some(account) = &conn.account_name {
        return Some(account.clone());
    }
    let endpoint = conn.blob_endpoint.as_deref()?;
    let host = crate::endpoint::host_of(endpoint);
    let (account, rest) = host.split_once('.')?;
    rest.starts_with("blob.").then(|| account.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "Zm9vYmFyYmF6cXV4Zm9vYmFyYmF6cXV4Zm9vYmFyYmF6cXV4Zm9vYmFyYmF6cXV4";

    fn config(conn: String) -> AzureBlobConfig {
        AzureBlobConfig {
            connection_string: conn,
            container_name: "media".to_string(),
        }
    }

    #[test]
    fn test_account_from_blob_endpoint() {
        let conn: AzureConnectionString =
            "BlobEndpoint=https://acct.blob.core.windows.net;SharedAccessSignature=sv=2022&sig=abc"
                .parse()
                .unwrap();
        assert_eq!(account_name(&conn).as_deref(), Some("acct"));

        let conn: AzureConnectionString =
            "BlobEndpoint=http://127.0.0.1:10000/devstore;SharedAccessSignature=sig=abc"
                .parse()
                .unwrap();
        assert_eq!(account_name(&conn), None);
    }

    #[test]
    fn test_new_with_account_key() {
        let cfg = config(format!(
            "DefaultEndpointsProtocol=https;AccountName=acct;AccountKey={};EndpointSuffix=core.windows.net",
            KEY
        ));
        let storage = AzureBlobStorage::new(&cfg).unwrap();
        assert_eq!(crate::Storage::vendor(&storage), Vendor::AzureBlob);
    }

    #[test]
    fn test_new_with_emulator() {
        let cfg = config("UseDevelopmentStorage=true".to_string());
        assert!(AzureBlobStorage::new(&cfg).is_ok());
    }

    #[test]
    fn test_malformed_connection_string_is_argument_invalid() {
        let cfg = config("AccountName=acct".to_string());
        let err = AzureBlobStorage::new(&cfg).err().unwrap();
        assert!(err.is_argument_invalid());
    }

    #[test]
    fn test_missing_container_is_argument_invalid() {
        let cfg = AzureBlobConfig {
            container_name: String::new(),
            ..config("UseDevelopmentStorage=true".to_string())
        };
        let err = AzureBlobStorage::new(&cfg).err().unwrap();
        assert!(err.is_argument_invalid());
        assert!(err.to_string().contains("container_name"));
    }

    mod against_mock_server {
        use super::*;
        use crate::{Storage, StorageError};
        use mockito::{Matcher, Server, ServerGuard};

        const BOUNDARY: &str = "batchresponse_1";

        fn storage(server: &ServerGuard) -> AzureBlobStorage {
            let cfg = config(format!(
                "AccountName=acct;AccountKey={};BlobEndpoint={}",
                KEY,
                server.url()
            ));
            AzureBlobStorage::new(&cfg).unwrap()
        }

        fn blob(name: &str) -> String {
            format!(
                "<Blob><Name>{}</Name><Properties>\
                 <Last-Modified>Thu, 01 Jul 2021 10:44:59 GMT</Last-Modified>\
                 <Etag>0x8D93C7D4629C227</Etag><Content-Length>1</Content-Length>\
                 <Content-Type>application/octet-stream</Content-Type>\
                 </Properties></Blob>",
                name
            )
        }

        fn enumeration(names: &[&str], next_marker: Option<&str>) -> String {
            let blobs: String = names.iter().map(|n| blob(n)).collect();
            let marker = next_marker
                .map(|m| format!("<NextMarker>{}</NextMarker>", m))
                .unwrap_or_default();
            format!(
                "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
                 <EnumerationResults ContainerName=\"media\">\
                 <Blobs>{}</Blobs>{}</EnumerationResults>",
                blobs, marker
            )
        }

        /// Batch response whose single sub-response is a 404 for the blob.
        fn batch_blob_not_found() -> String {
            format!(
                "--{b}\r\n\
                 Content-Type: application/http\r\n\
                 Content-ID: 0\r\n\
                 \r\n\
                 HTTP/1.1 404 The specified blob does not exist.\r\n\
                 x-ms-error-code: BlobNotFound\r\n\
                 \r\n\
                 --{b}--\r\n",
                b = BOUNDARY
            )
        }

        async fn mock_batch_not_found(server: &mut ServerGuard) {
            server
                .mock("POST", "/media")
                .match_query(Matcher::UrlEncoded("comp".into(), "batch".into()))
                .with_status(202)
                .with_header(
                    "content-type",
                    &format!("multipart/mixed; boundary={}", BOUNDARY),
                )
                .with_body(batch_blob_not_found())
                .create_async()
                .await;
        }

        #[tokio::test]
        async fn test_exists_maps_status_codes() {
            let mut server = Server::new_async().await;
            server
                .mock("HEAD", "/media/p/absent")
                .with_status(404)
                .create_async()
                .await;
            server
                .mock("HEAD", "/media/p/forbidden")
                .with_status(403)
                .create_async()
                .await;
            let storage = storage(&server);

            assert!(!storage.exists("p/absent").await.unwrap());
            let err = storage.exists("p/forbidden").await.err().unwrap();
            assert!(matches!(err, StorageError::Backend(_)));
        }

        #[tokio::test]
        async fn test_delete_missing_blob_in_existing_container_succeeds() {
            let mut server = Server::new_async().await;
            mock_batch_not_found(&mut server).await;
            let listing = server
                .mock("GET", "/media")
                .match_query(Matcher::UrlEncoded("comp".into(), "list".into()))
                .with_status(200)
                .with_header("content-type", "application/xml")
                .with_body(enumeration(&[], None))
                .expect(1)
                .create_async()
                .await;
            let storage = storage(&server);

            storage.delete("p/never-saved").await.unwrap();
            listing.assert_async().await;
        }

        #[tokio::test]
        async fn test_delete_in_missing_container_fails() {
            let mut server = Server::new_async().await;
            mock_batch_not_found(&mut server).await;
            server
                .mock("GET", "/media")
                .match_query(Matcher::UrlEncoded("comp".into(), "list".into()))
                .with_status(404)
                .with_header("x-ms-error-code", "ContainerNotFound")
                .create_async()
                .await;
            let storage = storage(&server);

            let err = storage.delete("p/k").await.err().unwrap();
            assert!(matches!(err, StorageError::Backend(_)));
        }

        #[tokio::test]
        async fn test_list_follows_next_marker() {
            let mut server = Server::new_async().await;
            let first = server
                .mock("GET", "/media")
                .match_query(Matcher::UrlEncoded("comp".into(), "list".into()))
                .with_status(200)
                .with_header("content-type", "application/xml")
                .with_body(enumeration(&["p/a", "p/b"], Some("m1")))
                .expect(1)
                .create_async()
                .await;
            let second = server
                .mock("GET", "/media")
                .match_query(Matcher::UrlEncoded("marker".into(), "m1".into()))
                .with_status(200)
                .with_header("content-type", "application/xml")
                .with_body(enumeration(&["p/c/d"], None))
                .expect(1)
                .create_async()
                .await;
            let storage = storage(&server);

            let paths: Vec<String> = storage
                .list("p")
                .await
                .unwrap()
                .into_iter()
                .map(|entry| entry.path)
                .collect();

            assert_eq!(paths, vec!["a", "b", "c/d"]);
            first.assert_async().await;
            second.assert_async().await;
        }

        #[tokio::test]
        async fn test_rewritten_keys_rejected_before_any_request() {
            let server = Server::new_async().await;
            let storage = storage(&server);

            for key in ["p/a#b", "p/100%", "p/./a", "p/[x]", "p//a", "p/a/"] {
                let err = storage.save(key, b"x".to_vec()).await.err().unwrap();
                assert!(matches!(err, StorageError::InvalidKey(_)), "{}", key);
            }
            let err = storage.list("p/a#b").await.err().unwrap();
            assert!(matches!(err, StorageError::InvalidKey(_)));
        }
    }
}

