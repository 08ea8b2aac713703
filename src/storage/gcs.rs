use async_stream::try_stream;
use async_trait::async_trait;
use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion, SdkConfig};
use aws_sdk_s3::{
    config::{Credentials, Region, RequestChecksumCalculation, ResponseChecksumValidation},
    error::{ProvideErrorMetadata, SdkError},
    operation::{get_object::GetObjectError, head_object::HeadObjectError},
    Client,
};
use log::{debug, trace};
use tokio_stream::Stream;

use crate::{
    config::Config,
    content_type::ContentType,
    error::{Error, Result},
};

use super::{ByteSource, KeyStream, ObjectReader, ObjectStore, StoreStats};

const CREDENTIALS_PROVIDER: &str = "gcs-hmac";
const GCS_REGION: &str = "auto";
const NO_SUCH_KEY: &str = "NoSuchKey";

/// Google Cloud Storage, reached through its S3-interoperable XML API.
#[derive(Debug)]
pub struct GcsStore {
    client: Client,
    stats: StoreStats,
}

impl GcsStore {
    pub async fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let credentials = config.credentials().await?;
        debug!(
            "connecting to {} as {}",
            config.gcs.endpoint, credentials.email
        );

        let provider = Credentials::new(
            credentials.access_id,
            credentials.secret,
            None,
            None,
            CREDENTIALS_PROVIDER,
        );

        let mut timeout_config = TimeoutConfig::builder();
        if let Some(timeout) = config.gcs.timeout {
            timeout_config = timeout_config.operation_timeout(timeout);
        }

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(GCS_REGION))
            .endpoint_url(&config.gcs.endpoint)
            .credentials_provider(provider)
            .retry_config(RetryConfig::standard().with_max_attempts(config.gcs.max_attempts))
            .timeout_config(timeout_config.build())
            .load()
            .await;

        Ok(GcsStore::from_sdk_config(&sdk_config))
    }

    fn from_sdk_config(sdk_config: &SdkConfig) -> Self {
        // GCS rejects the SDK's default flexible checksums; Content-MD5 is sent instead.
        let s3_config = aws_sdk_s3::config::Builder::from(sdk_config)
            .force_path_style(true)
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .response_checksum_validation(ResponseChecksumValidation::WhenRequired)
            .build();

        GcsStore {
            client: Client::from_conf(s3_config),
            stats: StoreStats::new(),
        }
    }

    fn keys<'a>(
        &'a self,
        bucket: &'a str,
        prefix: Option<&'a str>,
    ) -> impl Stream<Item = Result<String>> + Send + 'a {
        try_stream! {
            let prefix_owned = prefix.map(ToOwned::to_owned);
            let mut pages = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .set_prefix(prefix_owned)
                .into_paginator()
                .send();

            while let Some(page) = pages.try_next().await? {
                self.stats.add_list();
                for object in page.contents() {
                    let key = object
                        .key()
                        .ok_or_else(|| Error::InvalidPath(format!("gs://{bucket}/")))?;
                    yield key.to_owned();
                }
            }
        }
    }
}

#[async_trait]
impl ObjectStore for GcsStore {
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool> {
        trace!("looking for gs://{bucket}/{key}");
        let response_result = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(SdkError::into_service_error);

        self.stats.add_exists();
        match response_result {
            Ok(_) => Ok(true),
            Err(HeadObjectError::NotFound(_)) => Ok(false),
            Err(err) => Err(Error::transport(err)),
        }
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<ObjectReader> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| match err.into_service_error() {
                GetObjectError::NoSuchKey(_) => Error::not_found(bucket, key),
                err => Error::transport(err),
            })?;

        let size = response
            .content_length()
            .and_then(|size| u64::try_from(size).ok())
            .unwrap_or(0);
        self.stats.add_get(size);
        Ok(Box::pin(response.body.into_async_read()))
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        source: ByteSource,
        content_type: ContentType,
    ) -> Result<()> {
        let size = source.len().await?;
        let encoded_digest = source.md5_base64().await?;
        let body = source.into_byte_stream().await?;

        debug!("uploading {size} bytes to gs://{bucket}/{key} as {content_type}");
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .content_type(content_type.mime())
            .content_md5(encoded_digest)
            .send()
            .await?;

        self.stats.add_put(size);
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        let result = self
            .client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(SdkError::into_service_error);

        self.stats.add_delete();
        match result {
            Ok(_) => Ok(()),
            Err(err) if err.code() == Some(NO_SUCH_KEY) => {
                debug!("gs://{bucket}/{key} was already absent");
                Ok(())
            }
            Err(err) => Err(Error::transport(err)),
        }
    }

    fn list_keys<'a>(&'a self, bucket: &'a str, prefix: Option<&'a str>) -> KeyStream<'a> {
        Box::pin(self.keys(bucket, prefix))
    }

    fn stats(&self) -> &StoreStats {
        &self.stats
    }
}
