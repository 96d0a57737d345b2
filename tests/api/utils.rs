use derive_getters::Getters;
use once_cell::sync::Lazy;
use portfolio_contact::{
    configuration::{get_configuration, EmailTransport, Settings},
    telemetry::{get_subscriber, init_subscriber},
    App,
};
use serde_json::Value;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const OWNER_EMAIL: &str = "owner@example.com";

static TRACING: Lazy<()> = Lazy::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber("test".into(), std::io::stdout);
        init_subscriber(subscriber).expect("Failed to init tracing");
    } else {
        let subscriber = get_subscriber("test".into(), std::io::sink);
        init_subscriber(subscriber).expect("Failed to init tracing");
    };
});

#[derive(Getters)]
pub struct TestApp {
    address: String,
    email_server: MockServer,
    api_client: reqwest::Client,
}

impl TestApp {
    pub async fn health_check(&self) -> reqwest::Response {
        self.get("/api/health").await
    }

    pub async fn get(&self, route: &str) -> reqwest::Response {
        self.api_client
            .get(format!("{}{route}", self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_contact(&self, body: &Value) -> reqwest::Response {
        self.api_client
            .post(format!("{}/api/contact", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_contact_raw(&self, content_type: &str, body: String) -> reqwest::Response {
        self.api_client
            .post(format!("{}/api/contact", self.address))
            .header("Content-Type", content_type)
            .body(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Let the email API accept every email, expecting exactly `times` of them.
    pub async fn mock_send_email_endpoint_to_ok(&self, times: u64) {
        Mock::given(path("/email"))
            .and(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(times)
            .mount(&self.email_server)
            .await;
    }

    /// The JSON bodies of every request the email API received, in order.
    pub async fn sent_emails(&self) -> Vec<Value> {
        self.email_server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request| request.body_json().expect("Email request is not JSON"))
            .collect()
    }
}

/// A submission that passes validation.
pub fn valid_submission() -> Value {
    serde_json::json!({
        "name": "Ursula Le Guin",
        "email": "Ursula@Example.com",
        "message": "I loved the projects section of your portfolio!",
    })
}

/// Spawn an instance of the app on a random port.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Spawn an instance of the app, adjusting the configuration first.
pub async fn spawn_app_with(customise: impl FnOnce(&mut Settings)) -> TestApp {
    Lazy::force(&TRACING);

    let email_server = MockServer::start().await;
    let config = {
        let mut c = get_configuration().expect("Failed to read configuration");

        // Make OS choose random port
        c.application.host = "127.0.0.1".into();
        c.application.port = 0;
        // Mock the email relay
        c.email.transport = EmailTransport::Http;
        c.email.base_url = Some(email_server.uri());
        c.email.username = OWNER_EMAIL.into();
        c.email.sender_address = None;
        c.email.owner_address = None;
        c.email.timeout_milliseconds = 2_000;
        c.rate_limit.max_requests = 5;
        c.rate_limit.window_seconds = 15 * 60;

        customise(&mut c);
        c
    };

    let app = App::build(config).expect("Failed to build application");
    let address = format!("http://127.0.0.1:{}", app.port());
    let _ = tokio::spawn(app.run_until_stopped());

    TestApp {
        address,
        email_server,
        api_client: reqwest::Client::new(),
    }
}
