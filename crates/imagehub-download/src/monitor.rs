//! Entry point for transferring templates and volumes into stores.

use std::sync::Arc;

use imagehub_core::config::TransferConfig;
use imagehub_core::error::{AppError, ErrorKind};
use imagehub_core::result::AppResult;
use imagehub_core::traits::ConfigProvider;
use imagehub_core::types::{ResourceId, StoreId};
use imagehub_entity::{
    AgentCommand, DownloadCommand, DownloadStatus, ImageFormat, JobIdentity, JobRecord,
    ProgressCommand, RequestType, ResourceDescriptor, ResourceKind, TemplateResource,
    VolumeResource,
};

use crate::listener::{ListenerHandle, ListenerParams};
use crate::outcome::CompletionCallback;
use crate::registry::JobRegistry;
use crate::settings::{self, CopySettings, DEFAULT_HTTP_AUTH_USER, keys};
use crate::traits::{EndpointSelector, RecordStore};

/// Decides whether a transfer is needed, builds or resumes the agent
/// command, and hands the job to a listener.
#[derive(Debug)]
pub struct DownloadMonitor {
    store: Arc<dyn RecordStore>,
    selector: Arc<dyn EndpointSelector>,
    settings: Arc<dyn ConfigProvider>,
    registry: Arc<JobRegistry>,
    timing: TransferConfig,
    copy: CopySettings,
}

impl DownloadMonitor {
    /// Build a monitor. Copy settings are read from `settings` once, here.
    pub fn new(
        store: Arc<dyn RecordStore>,
        selector: Arc<dyn EndpointSelector>,
        settings: Arc<dyn ConfigProvider>,
        timing: TransferConfig,
    ) -> Self {
        let copy = CopySettings::from_provider(settings.as_ref());
        tracing::debug!(?copy, "Download monitor configured");
        Self {
            store,
            selector,
            settings,
            registry: Arc::new(JobRegistry::new()),
            timing,
            copy,
        }
    }

    /// Live listeners, one per in-flight job.
    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    pub fn copy_settings(&self) -> &CopySettings {
        &self.copy
    }

    /// Template size ceiling in bytes; `None` means unlimited.
    pub fn max_template_size_bytes(&self) -> Option<u64> {
        settings::size_ceiling_bytes(self.settings.as_ref(), keys::MAX_TEMPLATE_SIZE)
    }

    /// Volume size ceiling in bytes; `None` means unlimited.
    pub fn max_volume_size_bytes(&self) -> Option<u64> {
        settings::size_ceiling_bytes(self.settings.as_ref(), keys::MAX_VOLUME_SIZE)
    }

    /// Whether no record for the resource in the store is downloading or
    /// already downloaded.
    pub async fn is_updateable(
        &self,
        kind: ResourceKind,
        resource_id: ResourceId,
        store_id: StoreId,
    ) -> AppResult<bool> {
        let records = self
            .store
            .find_by_resource_store(kind, resource_id, store_id)
            .await?;
        Ok(!records.iter().any(JobRecord::blocks_resubmission))
    }

    pub async fn is_template_updateable(
        &self,
        template_id: ResourceId,
        store_id: StoreId,
    ) -> AppResult<bool> {
        self.is_updateable(ResourceKind::Template, template_id, store_id)
            .await
    }

    /// Start or resume the transfer of a template into its store.
    ///
    /// Does nothing when the template is already downloading or downloaded
    /// in that store, or when it has no source URL. `on_complete` runs once
    /// the job ends, unless a later submission displaces it first.
    pub async fn download_template(
        &self,
        template: &TemplateResource,
        on_complete: Option<CompletionCallback>,
    ) -> AppResult<()> {
        let identity = template.identity();
        if !self
            .is_updateable(ResourceKind::Template, template.id, template.store.id)
            .await?
        {
            tracing::debug!(%identity, "Template already downloading or downloaded");
            return Ok(());
        }
        let Some(url) = template.url.as_deref().filter(|url| !url.is_empty()) else {
            tracing::debug!(%identity, "Template has no source URL");
            return Ok(());
        };

        let record = self
            .find_or_create(identity, |record| record.set_url(Some(url.to_string())))
            .await?;

        let mut command = DownloadCommand::new(identity, &template.name, url)
            .with_max_size(self.max_template_size_bytes())
            .with_checksum(template.checksum.clone())
            .with_format(template.format)
            .with_proxy(self.copy.proxy.clone())
            .with_secure_copy(self.copy.secure_copy);
        if record.is_copy() {
            match &self.copy.copy_password {
                Some(password) => {
                    command.set_credentials(DEFAULT_HTTP_AUTH_USER, password.clone())
                }
                None => tracing::warn!(%identity, "Copy job without a configured copy password"),
            }
        }

        self.launch(template.descriptor(), command, &record, on_complete)
            .await
    }

    /// Start or resume the registration of a volume from a URL.
    ///
    /// Fails with a validation error, before anything is stored, when the
    /// payload names an unknown image format.
    pub async fn download_volume(
        &self,
        volume: &VolumeResource,
        on_complete: Option<CompletionCallback>,
    ) -> AppResult<()> {
        let identity = volume.identity();
        let payload = &volume.payload;
        let format: ImageFormat = payload.format.parse().map_err(|err| {
            AppError::validation(format!("Invalid volume format for {identity}: {err}"))
        })?;

        if !self
            .is_updateable(ResourceKind::Volume, volume.id, volume.store.id)
            .await?
        {
            tracing::debug!(%identity, "Volume already downloading or downloaded");
            return Ok(());
        }
        if payload.url.is_empty() {
            tracing::debug!(%identity, "Volume has no source URL");
            return Ok(());
        }

        let record = self
            .find_or_create(identity, |record| {
                record.set_url(Some(payload.url.clone()));
                record.set_checksum(payload.checksum.clone());
                record.set_format(Some(format));
            })
            .await?;

        let command = DownloadCommand::new(identity, &volume.name, &payload.url)
            .with_max_size(self.max_volume_size_bytes())
            .with_checksum(payload.checksum.clone())
            .with_format(Some(format))
            .with_proxy(self.copy.proxy.clone())
            .with_secure_copy(self.copy.secure_copy);

        self.launch(volume.descriptor(), command, &record, on_complete)
            .await
    }

    /// Move every listener whose command went through `endpoint_id` to the
    /// disconnected state. Returns how many were notified.
    pub async fn handle_endpoint_disconnect(&self, endpoint_id: &str) -> usize {
        let listeners = self.registry.listeners_on_endpoint(endpoint_id).await;
        let notified = listeners
            .iter()
            .filter(|listener| {
                listener.mark_disconnected(format!("endpoint {endpoint_id} disconnected"))
            })
            .count();
        if notified > 0 {
            tracing::info!(
                endpoint = endpoint_id,
                listeners = notified,
                "Transfer agent disconnected"
            );
        }
        notified
    }

    /// Abandon every live listener.
    pub async fn shutdown(&self) {
        let abandoned = self.registry.abandon_all().await;
        tracing::info!(listeners = abandoned, "Download monitor stopped");
    }

    /// Load the record for `identity`, creating it as not-downloaded when
    /// missing. `init` fills a new record before it is stored.
    async fn find_or_create(
        &self,
        identity: JobIdentity,
        init: impl FnOnce(&mut JobRecord),
    ) -> AppResult<JobRecord> {
        if let Some(record) = self.store.find(&identity).await? {
            return Ok(record);
        }

        let mut record = JobRecord::new(identity);
        record.apply_status(DownloadStatus::NotDownloaded);
        init(&mut record);

        match self.store.persist(record).await {
            Ok(record) => Ok(record),
            // Someone else created it first.
            Err(err) if err.kind == ErrorKind::Conflict => self
                .store
                .find(&identity)
                .await?
                .ok_or_else(|| AppError::internal(format!("Job record for {identity} vanished"))),
            Err(err) => Err(err),
        }
    }

    async fn launch(
        &self,
        resource: ResourceDescriptor,
        command: DownloadCommand,
        record: &JobRecord,
        on_complete: Option<CompletionCallback>,
    ) -> AppResult<()> {
        let identity = resource.identity();
        let resume_job_id = if record.has_resumable_job() {
            record.job_id().map(str::to_string)
        } else {
            None
        };

        let command: AgentCommand = match &resume_job_id {
            Some(job_id) => {
                ProgressCommand::new(command, job_id.clone(), RequestType::GetOrRestart).into()
            }
            None => command.into(),
        };

        let Some(endpoint) = self.selector.select(&resource).await else {
            tracing::warn!(
                %identity,
                store = %resource.store.name,
                "No transfer agent available for store"
            );
            return Ok(());
        };

        let prior_status = resume_job_id.as_ref().and(record.download_status());
        let listener = ListenerHandle::spawn(ListenerParams {
            identity,
            endpoint: endpoint.clone(),
            command: command.clone(),
            store: self.store.clone(),
            registry: self.registry.clone(),
            timing: self.timing.clone(),
            prior_status,
            job_id: resume_job_id.clone(),
            callback: on_complete,
        });
        self.registry.submit(listener.clone()).await;

        tracing::info!(
            %identity,
            endpoint = endpoint.id(),
            job_id = resume_job_id.as_deref().unwrap_or(""),
            resuming = resume_job_id.is_some(),
            "Dispatching transfer"
        );

        if let Err(err) = endpoint.send_async(command, listener.sink()).await {
            tracing::warn!(
                %identity,
                endpoint = endpoint.id(),
                "Unable to start or resume transfer: {}",
                err
            );
            listener.mark_disconnected(err.to_string());
        }
        Ok(())
    }
}
