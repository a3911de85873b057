use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::Authenticator;
use auth::HashCost;
use auth::JwtHandler;
use chrono::Duration;
use identity_service::domain::access::policy::AccessPolicy;
use identity_service::domain::account::errors::MailerError;
use identity_service::domain::account::models::EmailAddress;
use identity_service::domain::account::ports::Mailer;
use identity_service::domain::account::service::AccountService;
use identity_service::domain::account::service::AccountServiceSettings;
use identity_service::inbound::http::rate_limit::RateLimit;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::repositories::InMemoryAccountRepository;
use serde_json::json;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const LINK_BASE_URL: &str = "http://app.test";
pub const RESET_REDEEM_LIMIT: u32 = 3;

/// Mailer that records every reset link instead of sending it
#[derive(Default)]
pub struct CapturingMailer {
    sent: Mutex<Vec<(String, String)>>,
}

impl CapturingMailer {
    /// Raw reset secrets mailed to `email`, oldest first
    pub fn secrets_for(&self, email: &str) -> Vec<String> {
        let prefix = format!("{}/reset-password?token=", LINK_BASE_URL);
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(to, _)| to == email)
            .filter_map(|(_, link)| link.strip_prefix(&prefix).map(str::to_string))
            .collect()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for CapturingMailer {
    async fn send_password_reset_link(
        &self,
        email: &EmailAddress,
        link: &str,
    ) -> Result<(), MailerError> {
        self.sent
            .lock()
            .unwrap()
            .push((email.as_str().to_string(), link.to_string()));
        Ok(())
    }
}

/// Test application that spawns a real server backed by in-memory storage
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub mailer: Arc<CapturingMailer>,
    pub jwt_handler: JwtHandler,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let repository = Arc::new(InMemoryAccountRepository::new());
        let mailer = Arc::new(CapturingMailer::default());

        // Cheap work factors keep the suite fast; reset cost stays higher
        let authenticator = Arc::new(
            Authenticator::new(JWT_SECRET, HashCost::new(1, 1024), HashCost::new(2, 1024))
                .expect("Invalid hash cost"),
        );
        let policy = Arc::new(AccessPolicy::new().expect("Invalid access policy"));

        let account_service = Arc::new(AccountService::new(
            repository,
            Arc::clone(&mailer),
            authenticator,
            policy,
            AccountServiceSettings {
                session_ttl: Duration::hours(24),
                reset_ttl: Duration::minutes(15),
                reset_link_base_url: LINK_BASE_URL.to_string(),
            },
        ));

        let router = create_router(
            account_service,
            RateLimit {
                max_requests: RESET_REDEEM_LIMIT,
                window: std::time::Duration::from_secs(60),
            },
        );

        tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            mailer,
            jwt_handler: JwtHandler::new(JWT_SECRET),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Helper to make PATCH request with Bearer token
    pub fn patch_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .patch(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Register an account and return the response
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        national_id: &str,
        role: &str,
    ) -> reqwest::Response {
        self.post("/api/auth/register")
            .json(&json!({
                "name": name,
                "email": email,
                "password": "Secret123",
                "national_id": national_id,
                "role": role
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Submit a login request
    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/login")
            .json(&json!({
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register, log in and return `(account id, access token)`
    pub async fn register_and_login(
        &self,
        email: &str,
        national_id: &str,
        role: &str,
    ) -> (String, String) {
        let response = self.register("Test User", email, national_id, role).await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let response = self.login(email, "Secret123").await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        let token = body["data"]["access_token"].as_str().unwrap().to_string();

        (id, token)
    }
}
