//! Integration tests for resuming jobs, displacement and agent loss.

mod helpers;

use std::time::Duration;

use imagehub::imagehub_download::{ListenerState, RecordStore};
use imagehub::imagehub_entity::{
    AgentCommand, DownloadAnswer, DownloadStatus, JobRecord, ObjectState, RequestType,
};

use helpers::{CallbackProbe, POLL, RETRY, TestHub, settle, template, volume};

#[tokio::test(start_paused = true)]
async fn test_restart_resumes_remote_job() {
    let hub = TestHub::new();
    let probe = CallbackProbe::default();
    let tpl = template(20);

    // Left behind by a previous run that lost track of the job.
    let stale = JobRecord::from_snapshot(
        tpl.identity(),
        DownloadStatus::UploadInProgress,
        70,
        Some("job-2020".to_string()),
        None,
        tpl.url.clone(),
    );
    assert_eq!(stale.state(), ObjectState::Creating);
    hub.store.persist(stale).await.unwrap();

    hub.monitor
        .download_template(&tpl, Some(probe.callback()))
        .await
        .unwrap();

    let resume = hub.agent.last_command();
    assert_eq!(resume.request_type(), Some(RequestType::GetOrRestart));
    assert_eq!(resume.job_id(), Some("job-2020"));

    let listener = hub.monitor.registry().get(&tpl.identity()).await.unwrap();
    assert_eq!(listener.last_status(), Some(DownloadStatus::UploadInProgress));

    hub.agent.last_sink().deliver(
        DownloadAnswer::new(DownloadStatus::Downloaded)
            .with_job_id("job-2020")
            .with_install_path("/mnt/templates/20")
            .with_size(4096, 2048),
    );
    assert_eq!(listener.wait_for_terminal().await, ListenerState::Completed);
    assert_eq!(probe.count(), 1);

    let record = hub.store.find(&tpl.identity()).await.unwrap().unwrap();
    assert_eq!(record.physical_size(), 2048);
}

#[tokio::test(start_paused = true)]
async fn test_resubmission_abandons_previous_listener() {
    let hub = TestHub::new();
    let first = CallbackProbe::default();
    let second = CallbackProbe::default();
    let tpl = template(21);

    hub.monitor
        .download_template(&tpl, Some(first.callback()))
        .await
        .unwrap();
    let old_sink = hub.agent.last_sink();
    let old = hub.monitor.registry().get(&tpl.identity()).await.unwrap();

    hub.monitor
        .download_template(&tpl, Some(second.callback()))
        .await
        .unwrap();
    let new = hub.monitor.registry().get(&tpl.identity()).await.unwrap();

    assert_eq!(old.state(), ListenerState::Abandoned);
    assert_eq!(hub.monitor.registry().len().await, 1);

    // The old job's late answer is dropped.
    assert!(!old_sink.deliver(DownloadAnswer::new(DownloadStatus::Downloaded)));
    let record = hub.store.find(&tpl.identity()).await.unwrap().unwrap();
    assert_eq!(record.download_status(), Some(DownloadStatus::NotDownloaded));

    hub.agent
        .last_sink()
        .deliver(DownloadAnswer::new(DownloadStatus::Downloaded));
    new.wait_for_terminal().await;

    assert_eq!(first.count(), 0);
    assert_eq!(second.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dispatch_failure_retries_with_get_or_restart() {
    let hub = TestHub::new();
    let tpl = template(22);
    hub.agent.set_down(true);

    hub.monitor.download_template(&tpl, None).await.unwrap();
    settle().await;

    let listener = hub.monitor.registry().get(&tpl.identity()).await.unwrap();
    assert_eq!(listener.state(), ListenerState::Disconnected);
    assert!(hub.agent.commands().is_empty());

    hub.agent.set_down(false);
    tokio::time::sleep(RETRY).await;

    // No job id yet, so the original download goes out again.
    assert_eq!(hub.agent.commands().len(), 1);
    assert!(matches!(hub.agent.last_command(), AgentCommand::Download(_)));

    hub.agent.last_sink().deliver(
        DownloadAnswer::new(DownloadStatus::DownloadInProgress).with_job_id("job-2222"),
    );
    settle().await;
    assert_eq!(listener.state(), ListenerState::Pending);
}

#[tokio::test(start_paused = true)]
async fn test_agent_disconnect_moves_jobs_to_status_checks() {
    let hub = TestHub::new();
    let tpl = template(23);
    let vol = volume(24, "raw");

    hub.monitor.download_template(&tpl, None).await.unwrap();
    hub.agent.last_sink().deliver(
        DownloadAnswer::new(DownloadStatus::DownloadInProgress).with_job_id("job-2323"),
    );
    hub.monitor.download_volume(&vol, None).await.unwrap();
    settle().await;

    assert_eq!(hub.monitor.handle_endpoint_disconnect("ssvm-1").await, 2);
    settle().await;

    let listener = hub.monitor.registry().get(&tpl.identity()).await.unwrap();
    assert_eq!(listener.state(), ListenerState::Disconnected);

    tokio::time::sleep(RETRY).await;
    let resumed = hub
        .agent
        .commands()
        .into_iter()
        .filter(|command| command.identity() == tpl.identity())
        .last()
        .unwrap();
    assert_eq!(resumed.request_type(), Some(RequestType::GetOrRestart));
    assert_eq!(resumed.job_id(), Some("job-2323"));
}

#[tokio::test(start_paused = true)]
async fn test_silent_agent_is_followed_up_once_job_is_known() {
    let hub = TestHub::new();
    let tpl = template(25);

    hub.monitor.download_template(&tpl, None).await.unwrap();
    tokio::time::sleep(POLL * 3 + Duration::from_millis(1)).await;

    // A slow first answer must not start a second remote transfer.
    assert_eq!(hub.agent.commands().len(), 1);

    hub.agent.last_sink().deliver(
        DownloadAnswer::new(DownloadStatus::DownloadInProgress).with_job_id("job-2525"),
    );
    settle().await;
    tokio::time::sleep(POLL).await;
    assert_eq!(
        hub.agent.last_command().request_type(),
        Some(RequestType::StatusOnly)
    );

    tokio::time::sleep(POLL).await;
    let commands = hub.agent.commands();
    assert_eq!(commands.len(), 3);
    assert_eq!(commands[2].request_type(), Some(RequestType::GetOrRestart));
    assert_eq!(commands[2].job_id(), Some("job-2525"));
    let downloads = commands
        .iter()
        .filter(|command| matches!(command, AgentCommand::Download(_)))
        .count();
    assert_eq!(downloads, 1);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_abandons_live_jobs() {
    let hub = TestHub::new();
    let probe = CallbackProbe::default();
    let tpl = template(26);

    hub.monitor
        .download_template(&tpl, Some(probe.callback()))
        .await
        .unwrap();
    let sink = hub.agent.last_sink();

    hub.monitor.shutdown().await;

    assert!(hub.monitor.registry().is_empty().await);
    assert!(!sink.deliver(DownloadAnswer::new(DownloadStatus::Downloaded)));
    assert_eq!(probe.count(), 0);
}
