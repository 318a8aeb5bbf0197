//! End-to-end export: planner page to upload server to email
//!
//! The real upload server runs on a local port backed by a temporary
//! directory; emails are captured by a recording sender.

use async_trait::async_trait;
use daily_planner::config::PlannerConfig;
use daily_planner::export::UPLOAD_FAILED_MESSAGE;
use daily_planner::feedback::FeedbackEvent;
use daily_planner::notify::TemplateEmail;
use daily_planner::prelude::*;
use daily_planner::server::serve_with_shutdown;
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

#[derive(Default)]
struct RecordingSender {
    sent: Mutex<Vec<TemplateEmail>>,
}

#[async_trait]
impl EmailSender for RecordingSender {
    async fn send(&self, email: TemplateEmail) -> Result<(), NotifyError> {
        self.sent.lock().push(email);
        Ok(())
    }
}

struct RunningServer {
    addr: SocketAddr,
    stop: oneshot::Sender<()>,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

impl RunningServer {
    async fn start(dir: &TempDir) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mut config = PlannerConfig::default();
        config.upload.dir = dir.path().to_path_buf();
        config.server.public_url = Some(format!("http://{addr}"));
        let state = AppState::from_config(config).unwrap();

        let (stop, stopped) = oneshot::channel::<()>();
        let handle = tokio::spawn(serve_with_shutdown(listener, state, async move {
            let _ = stopped.await;
        }));
        Self { addr, stop, handle }
    }

    fn upload_endpoint(&self) -> String {
        format!("http://{}/upload", self.addr)
    }

    async fn shutdown(self) {
        self.stop.send(()).unwrap();
        self.handle.await.unwrap().unwrap();
    }
}

fn planner_page() -> (Document, PlannerFields) {
    let fields = FieldStore::new(Arc::new(MemoryStore::new()));
    let mut page = Document::daily_planner();
    fields.restore(&mut page);
    fields.record_input(&mut page, FieldName::Email, "ada@example.com");
    fields.record_input(&mut page, FieldName::Name, "Ada");
    fields.record_input(&mut page, FieldName::Date, "2026-10-16");
    fields.record_input(&mut page, FieldName::Notes, "Ship the planner export");
    let snapshot = fields.snapshot();
    (page, snapshot)
}

fn pipeline(
    endpoint: String,
    sender: Arc<RecordingSender>,
    feedback: Arc<MemoryFeedback>,
) -> ExportPipeline {
    ExportPipeline::new(
        Arc::new(BlockRasterizer::default()),
        Arc::new(HttpUploader::new(reqwest::Client::new(), endpoint)),
        NotificationDispatcher::new(sender, "service_1", "template_1", "support@dailyplanner.com"),
        feedback,
    )
}

#[tokio::test]
async fn test_export_uploads_and_emails_link() {
    let dir = TempDir::new().unwrap();
    let server = RunningServer::start(&dir).await;

    let sender = Arc::new(RecordingSender::default());
    let feedback = Arc::new(MemoryFeedback::default());
    let pipeline = pipeline(server.upload_endpoint(), sender.clone(), feedback.clone());

    let (mut page, fields) = planner_page();
    let live_before = page.body.clone();

    let report = pipeline
        .export_and_send(&mut page, &fields, &CancellationToken::new())
        .await
        .unwrap();

    let url = report.upload.hosted_url().unwrap().to_string();
    assert!(url.starts_with(&format!("http://{}/uploads/", server.addr)));

    // the hosted link serves the exported PNG
    let image = reqwest::get(&url).await.unwrap();
    assert_eq!(image.status(), reqwest::StatusCode::OK);
    let bytes = image.bytes().await.unwrap();
    assert!(bytes.starts_with(b"\x89PNG"));

    let sent = sender.sent.lock().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].service_id, "service_1");
    assert_eq!(sent[0].params.to_email, "ada@example.com");
    assert_eq!(sent[0].params.user_name, "Ada");
    assert_eq!(sent[0].params.planner_date, "2026-10-16");
    assert_eq!(sent[0].params.image_url.as_deref(), Some(url.as_str()));

    assert_eq!(page.body, live_before);
    assert_eq!(page.mounted_count(), 0);
    assert_eq!(pipeline.state(), ExportState::Done);
    assert!(feedback.alerts().is_empty());
    assert_eq!(feedback.toasts().len(), 1);

    server.shutdown().await;
}

#[tokio::test]
async fn test_unreachable_upload_server_still_sends_email() {
    // nothing listens on the released port
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let sender = Arc::new(RecordingSender::default());
    let feedback = Arc::new(MemoryFeedback::default());
    let pipeline = pipeline(format!("http://{addr}/upload"), sender.clone(), feedback.clone());

    let (mut page, fields) = planner_page();
    let report = pipeline
        .export_and_send(&mut page, &fields, &CancellationToken::new())
        .await
        .unwrap();

    match &report.upload {
        UploadResult::Fallback { data_url, .. } => {
            assert!(data_url.starts_with("data:image/png;base64,"));
        }
        UploadResult::Hosted(url) => panic!("unexpected hosted url {url}"),
    }

    let sent = sender.sent.lock().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].params.image_url, None);

    assert_eq!(feedback.alerts(), vec![UPLOAD_FAILED_MESSAGE.to_string()]);
    assert!(feedback
        .events()
        .iter()
        .any(|e| matches!(e, FeedbackEvent::LoadingHidden)));
}

#[tokio::test]
async fn test_missing_email_stops_before_upload() {
    let dir = TempDir::new().unwrap();
    let server = RunningServer::start(&dir).await;

    let sender = Arc::new(RecordingSender::default());
    let feedback = Arc::new(MemoryFeedback::default());
    let pipeline = pipeline(server.upload_endpoint(), sender.clone(), feedback.clone());

    let mut page = Document::daily_planner();
    let fields = PlannerFields::new().with(FieldName::Name, "Ada");

    let result = pipeline
        .export_and_send(&mut page, &fields, &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(ExportError::Notify(NotifyError::MissingRecipient))));
    assert!(sender.sent.lock().is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).map_or(0, Iterator::count), 0);

    server.shutdown().await;
}
