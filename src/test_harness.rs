//! Integration test harness for mock image-host servers
//!
//! This module provides utilities for running upload tests against mockito
//! servers standing in for the ImgBB and Cloudinary APIs.

use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::json;

pub const TEST_CLOUD: &str = "demo";

/// A test harness that sets up a mock API server for integration testing
pub struct TestHarness {
    pub server: ServerGuard,
}

impl TestHarness {
    /// Create a new test harness with a mock server
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        Self { server }
    }

    /// Get the mock server URL
    pub fn url(&self) -> String {
        self.server.url()
    }

    fn cloudinary_path() -> String {
        format!("/v1_1/{}/image/upload", TEST_CLOUD)
    }

    /// Mock a successful ImgBB upload for `api_key`
    pub fn mock_imgbb_success(&mut self, api_key: &str, image_url: &str) -> Mock {
        self.server.mock("POST", "/1/upload")
            .match_query(Matcher::UrlEncoded("key".to_string(), api_key.to_string()))
            .match_body(Matcher::Regex(r#"name="image""#.to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({
                "success": true,
                "status": 200,
                "data": {
                    "id": "abc123",
                    "url": image_url,
                    "display_url": image_url,
                    "delete_url": "https://ibb.co/abc123/delete"
                }
            }).to_string())
            .create()
    }

    /// Mock a failed ImgBB upload
    pub fn mock_imgbb_failure(&mut self, status: usize, error_message: &str) -> Mock {
        self.server.mock("POST", "/1/upload")
            .match_query(Matcher::Any)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(json!({
                "status_code": status,
                "success": false,
                "error": { "message": error_message, "code": 100 }
            }).to_string())
            .create()
    }

    /// Mock a successful Cloudinary upload of the file named `filename`
    pub fn mock_cloudinary_success(&mut self, filename: &str, secure_url: &str) -> Mock {
        self.server.mock("POST", Self::cloudinary_path().as_str())
            .match_body(Matcher::Regex(format!(r#"name="file"; filename="{}""#, regex::escape(filename))))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({
                "public_id": "sample",
                "format": "png",
                "bytes": 1024,
                "url": secure_url.replacen("https://", "http://", 1),
                "secure_url": secure_url
            }).to_string())
            .create()
    }

    /// Mock a Cloudinary upload that only succeeds when signed fields are present
    pub fn mock_cloudinary_signed(&mut self, api_key: &str, secure_url: &str) -> Mock {
        self.server.mock("POST", Self::cloudinary_path().as_str())
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(format!(r#"name="api_key"\r\n\r\n{}\r\n"#, regex::escape(api_key))),
                Matcher::Regex(r#"name="timestamp"\r\n\r\n\d{10}\r\n"#.to_string()),
                Matcher::Regex(r#"name="signature"\r\n\r\n[0-9a-f]{40}\r\n"#.to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "secure_url": secure_url }).to_string())
            .create()
    }

    /// Mock a Cloudinary upload that requires the given upload preset
    pub fn mock_cloudinary_preset(&mut self, upload_preset: &str, secure_url: &str) -> Mock {
        self.server.mock("POST", Self::cloudinary_path().as_str())
            .match_body(Matcher::Regex(format!(
                r#"name="upload_preset"\r\n\r\n{}\r\n"#,
                regex::escape(upload_preset)
            )))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "secure_url": secure_url }).to_string())
            .create()
    }

    /// Mock a failed Cloudinary upload of the file named `filename`
    pub fn mock_cloudinary_failure(&mut self, filename: &str, status: usize, error_message: &str) -> Mock {
        self.server.mock("POST", Self::cloudinary_path().as_str())
            .match_body(Matcher::Regex(format!(r#"name="file"; filename="{}""#, regex::escape(filename))))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(json!({
                "error": { "message": error_message }
            }).to_string())
            .create()
    }

    /// Mock any POST to `path` and expect it to never arrive
    pub fn mock_no_requests(&mut self, path: &str) -> Mock {
        self.server.mock("POST", Matcher::Regex(format!("^{}", regex::escape(path))))
            .expect(0)
            .create()
    }

    /// Mock any POST to `path` answering with a raw, non-JSON body
    pub fn mock_raw_response(&mut self, path: &str, status: usize, body: &str) -> Mock {
        self.server.mock("POST", Matcher::Regex(format!("^{}", regex::escape(path))))
            .with_status(status)
            .with_header("content-type", "text/html")
            .with_body(body)
            .create()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{CloudinaryCredentials, ImgbbCredentials};
    use crate::error::UploadError;
    use crate::host::ImageHost;
    use crate::services::BatchUploader;
    use crate::types::ImageFile;
    use std::sync::Arc;

    fn png(name: &str) -> ImageFile {
        ImageFile::new(name, "image/png", b"fake png content".to_vec()).unwrap()
    }

    #[cfg(feature = "imgbb")]
    mod imgbb {
        use super::*;
        use crate::imgbb_uploader::ImgbbUploader;

        #[tokio::test]
        async fn test_upload_returns_data_url() {
            let mut harness = TestHarness::new().await;
            let mock = harness.mock_imgbb_success("test-key", "https://i.ibb.co/abc123/cat.png");

            let uploader = ImgbbUploader::with_base_url(harness.url(), ImgbbCredentials::new("test-key"));
            let url = uploader.upload(&png("cat.png")).await.unwrap();

            assert_eq!(url, "https://i.ibb.co/abc123/cat.png");
            mock.assert_async().await;
        }

        #[tokio::test]
        async fn test_upload_sends_expiration() {
            let mut harness = TestHarness::new().await;
            let mock = harness.server.mock("POST", "/1/upload")
                .match_query(Matcher::AllOf(vec![
                    Matcher::UrlEncoded("key".to_string(), "test-key".to_string()),
                    Matcher::UrlEncoded("expiration".to_string(), "600".to_string()),
                ]))
                .with_status(200)
                .with_body(json!({"success": true, "data": {"url": "https://i.ibb.co/x.png"}}).to_string())
                .create();

            let uploader = ImgbbUploader::with_base_url(
                harness.url(),
                ImgbbCredentials {
                    api_key: "test-key".to_string(),
                    expiration_secs: Some(600),
                },
            );

            assert_eq!(uploader.upload(&png("x.png")).await.unwrap(), "https://i.ibb.co/x.png");
            mock.assert_async().await;
        }

        #[tokio::test]
        async fn test_blank_key_makes_no_request() {
            let mut harness = TestHarness::new().await;
            let mock = harness.mock_no_requests("/1/upload");

            for key in ["", "   ", "\t"] {
                let uploader = ImgbbUploader::with_base_url(harness.url(), ImgbbCredentials::new(key));
                let err = uploader.upload(&png("cat.png")).await.unwrap_err();
                assert_eq!(err, UploadError::configuration("ImgBB API key is not set"));
            }

            mock.assert_async().await;
        }

        #[tokio::test]
        async fn test_provider_error_message_is_surfaced() {
            let mut harness = TestHarness::new().await;
            let _mock = harness.mock_imgbb_failure(400, "Invalid API v1 key.");

            let uploader = ImgbbUploader::with_base_url(harness.url(), ImgbbCredentials::new("bad-key"));
            let err = uploader.upload(&png("cat.png")).await.unwrap_err();

            assert!(err.is_provider());
            assert_eq!(err.to_string(), "Upload failed: Invalid API v1 key.");
        }

        #[tokio::test]
        async fn test_error_without_message_uses_fallback() {
            let mut harness = TestHarness::new().await;
            let _mock = harness.server.mock("POST", "/1/upload")
                .match_query(Matcher::Any)
                .with_status(500)
                .with_header("content-type", "application/json")
                .with_body("{}")
                .create();

            let uploader = ImgbbUploader::with_base_url(harness.url(), ImgbbCredentials::new("key"));
            let err = uploader.upload(&png("cat.png")).await.unwrap_err();

            assert_eq!(err, UploadError::provider(crate::error::UNKNOWN_PROVIDER_ERROR));
        }

        #[tokio::test]
        async fn test_success_flag_false_with_ok_status_fails() {
            let mut harness = TestHarness::new().await;
            let _mock = harness.server.mock("POST", "/1/upload")
                .match_query(Matcher::Any)
                .with_status(200)
                .with_body(json!({"success": false, "error": {"message": "Rate limit reached"}}).to_string())
                .create();

            let uploader = ImgbbUploader::with_base_url(harness.url(), ImgbbCredentials::new("key"));
            let err = uploader.upload(&png("cat.png")).await.unwrap_err();

            assert_eq!(err, UploadError::provider("Rate limit reached"));
        }

        #[tokio::test]
        async fn test_string_error_body_uses_fallback() {
            let mut harness = TestHarness::new().await;
            let _mock = harness.server.mock("POST", "/1/upload")
                .match_query(Matcher::Any)
                .with_status(400)
                .with_header("content-type", "application/json")
                .with_body(json!({"success": false, "error": "Rate limited"}).to_string())
                .create();

            let uploader = ImgbbUploader::with_base_url(harness.url(), ImgbbCredentials::new("key"));
            let err = uploader.upload(&png("cat.png")).await.unwrap_err();

            assert_eq!(err, UploadError::provider(crate::error::UNKNOWN_PROVIDER_ERROR));
        }

        #[tokio::test]
        async fn test_success_body_with_error_status_fails() {
            let mut harness = TestHarness::new().await;
            let _mock = harness.server.mock("POST", "/1/upload")
                .match_query(Matcher::Any)
                .with_status(500)
                .with_header("content-type", "application/json")
                .with_body(json!({"success": true, "data": {"url": "https://i.ibb.co/x.png"}}).to_string())
                .create();

            let uploader = ImgbbUploader::with_base_url(harness.url(), ImgbbCredentials::new("key"));
            let err = uploader.upload(&png("cat.png")).await.unwrap_err();

            assert_eq!(err, UploadError::provider(crate::error::UNKNOWN_PROVIDER_ERROR));
        }

        #[tokio::test]
        async fn test_non_json_body_is_transport_error() {
            let mut harness = TestHarness::new().await;
            let _mock = harness.mock_raw_response("/1/upload", 502, "<html>Bad Gateway</html>");

            let uploader = ImgbbUploader::with_base_url(harness.url(), ImgbbCredentials::new("key"));
            let err = uploader.upload(&png("cat.png")).await.unwrap_err();

            assert!(err.is_transport());
            assert!(err.to_string().starts_with("Upload failed: Failed to parse response"));
        }

        #[tokio::test]
        async fn test_unreachable_host_is_transport_error() {
            // Nothing listens on port 9 locally
            let uploader = ImgbbUploader::with_base_url(
                "http://127.0.0.1:9".to_string(),
                ImgbbCredentials::new("key"),
            );
            let err = uploader.upload(&png("cat.png")).await.unwrap_err();

            assert!(err.is_transport());
            assert!(err.to_string().contains("Network error"));
        }
    }

    #[cfg(feature = "cloudinary")]
    mod cloudinary {
        use super::*;
        use crate::cloudinary_uploader::CloudinaryUploader;

        fn signed_uploader(harness: &TestHarness) -> CloudinaryUploader {
            CloudinaryUploader::with_base_url(
                harness.url(),
                CloudinaryCredentials::signed(TEST_CLOUD, "123456789", "shh"),
            )
        }

        #[tokio::test]
        async fn test_signed_upload_returns_secure_url() {
            let mut harness = TestHarness::new().await;
            let mock = harness.mock_cloudinary_signed(
                "123456789",
                "https://res.cloudinary.com/demo/image/upload/v1/cat.png",
            );

            let url = signed_uploader(&harness).upload(&png("cat.png")).await.unwrap();

            assert_eq!(url, "https://res.cloudinary.com/demo/image/upload/v1/cat.png");
            mock.assert_async().await;
        }

        #[tokio::test]
        async fn test_preset_upload() {
            let mut harness = TestHarness::new().await;
            let mock = harness.mock_cloudinary_preset(
                "unsigned_uploads",
                "https://res.cloudinary.com/demo/image/upload/v1/dog.png",
            );

            let uploader = CloudinaryUploader::with_base_url(
                harness.url(),
                CloudinaryCredentials::preset(TEST_CLOUD, "unsigned_uploads"),
            );
            let url = uploader.upload(&png("dog.png")).await.unwrap();

            assert_eq!(url, "https://res.cloudinary.com/demo/image/upload/v1/dog.png");
            mock.assert_async().await;
        }

        #[tokio::test]
        async fn test_blank_secret_makes_no_request() {
            let mut harness = TestHarness::new().await;
            let mock = harness.mock_no_requests("/v1_1/");

            let uploader = CloudinaryUploader::with_base_url(
                harness.url(),
                CloudinaryCredentials::signed(TEST_CLOUD, "123456789", "  "),
            );
            let err = uploader.upload(&png("cat.png")).await.unwrap_err();

            assert_eq!(err, UploadError::configuration("Cloudinary API secret is not set"));
            mock.assert_async().await;
        }

        #[tokio::test]
        async fn test_provider_error_message_is_surfaced() {
            let mut harness = TestHarness::new().await;
            let _mock = harness.mock_cloudinary_failure("cat.png", 401, "Invalid Signature");

            let err = signed_uploader(&harness).upload(&png("cat.png")).await.unwrap_err();

            assert_eq!(err, UploadError::provider("Invalid Signature"));
        }

        #[tokio::test]
        async fn test_success_body_with_error_status_fails() {
            let mut harness = TestHarness::new().await;
            let _mock = harness.server.mock("POST", TestHarness::cloudinary_path().as_str())
                .with_status(500)
                .with_header("content-type", "application/json")
                .with_body(json!({"secure_url": "https://res.cloudinary.com/demo/x.png"}).to_string())
                .create();

            let err = signed_uploader(&harness).upload(&png("x.png")).await.unwrap_err();

            assert_eq!(err, UploadError::provider(crate::error::UNKNOWN_PROVIDER_ERROR));
        }

        #[tokio::test]
        async fn test_metacharacters_in_key_and_preset_are_matched_literally() {
            let mut harness = TestHarness::new().await;
            let signed = harness.mock_cloudinary_signed("k+1", "https://res.cloudinary.com/demo/a.png");

            let uploader = CloudinaryUploader::with_base_url(
                harness.url(),
                CloudinaryCredentials::signed(TEST_CLOUD, "k+1", "shh"),
            );
            assert_eq!(
                uploader.upload(&png("a.png")).await.unwrap(),
                "https://res.cloudinary.com/demo/a.png"
            );
            signed.assert_async().await;

            let preset = harness.mock_cloudinary_preset("p.(1)", "https://res.cloudinary.com/demo/b.png");
            let uploader = CloudinaryUploader::with_base_url(
                harness.url(),
                CloudinaryCredentials::preset(TEST_CLOUD, "p.(1)"),
            );
            assert_eq!(
                uploader.upload(&png("b.png")).await.unwrap(),
                "https://res.cloudinary.com/demo/b.png"
            );
            preset.assert_async().await;
        }

        #[tokio::test]
        async fn test_batch_returns_urls_in_input_order() {
            let mut harness = TestHarness::new().await;
            let names = ["a.png", "b.png", "c.png"];
            let mocks: Vec<Mock> = names
                .iter()
                .map(|name| {
                    harness.mock_cloudinary_success(name, &format!("https://res.cloudinary.com/demo/{}", name))
                })
                .collect();

            let batch = BatchUploader::new(Arc::new(signed_uploader(&harness)));
            let files: Vec<ImageFile> = names.iter().map(|n| png(n)).collect();
            let urls = batch.execute(&files).await.unwrap();

            assert_eq!(
                urls,
                vec![
                    "https://res.cloudinary.com/demo/a.png".to_string(),
                    "https://res.cloudinary.com/demo/b.png".to_string(),
                    "https://res.cloudinary.com/demo/c.png".to_string(),
                ]
            );
            for mock in mocks {
                mock.assert_async().await;
            }
        }

        #[tokio::test]
        async fn test_batch_fails_when_one_upload_is_rejected() {
            let mut harness = TestHarness::new().await;
            let _ok = harness.mock_cloudinary_success("a.png", "https://res.cloudinary.com/demo/a.png");
            let _bad = harness.mock_cloudinary_failure("b.png", 400, "File size too large");

            let batch = BatchUploader::new(Arc::new(signed_uploader(&harness)));
            let err = batch.execute(&[png("a.png"), png("b.png")]).await.unwrap_err();

            assert!(err.is_batch());
            assert_eq!(
                err.to_string(),
                "Batch upload failed: Upload failed: File size too large"
            );
        }

        #[tokio::test]
        async fn test_batch_of_eleven_makes_no_request() {
            let mut harness = TestHarness::new().await;
            let mock = harness.mock_no_requests("/v1_1/");

            let batch = BatchUploader::new(Arc::new(signed_uploader(&harness)));
            let files: Vec<ImageFile> = (0..11).map(|i| png(&format!("{}.png", i))).collect();
            let err = batch.execute(&files).await.unwrap_err();

            assert!(err.is_configuration());
            mock.assert_async().await;
        }
    }

    #[cfg(feature = "imgbb")]
    #[tokio::test]
    async fn test_built_uploader_from_config_uses_base_url() {
        use crate::credentials::{ProviderConfig, UploaderConfig};

        let mut harness = TestHarness::new().await;
        let mock = harness.mock_imgbb_success("cfg-key", "https://i.ibb.co/cfg.png");

        let mut config = UploaderConfig::new(ProviderConfig::Imgbb(ImgbbCredentials::new("cfg-key")));
        config.base_url = Some(harness.url());
        config.request_timeout_secs = Some(30);

        let uploader = crate::host::build_uploader(&config).unwrap();
        let urls = BatchUploader::new(uploader).execute(&[png("cfg.png")]).await.unwrap();

        assert_eq!(urls, vec!["https://i.ibb.co/cfg.png".to_string()]);
        mock.assert_async().await;
    }
}
