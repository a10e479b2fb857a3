use std::sync::LazyLock;

use anyhow::Result;
use referral::Application;
use referral::configuration::{self, DatabaseSettings};
use referral::telemetry::{Formatter, get_subscriber, init_subscriber};
use serde_json::Value;
use sqlx::{Connection, Executor, PgConnection, PgPool};
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

static TRACING: LazyLock<()> = LazyLock::new(|| {
    let default_log_level = "info".to_owned();
    let subscriber_name = "test".to_owned();
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(
            subscriber_name,
            default_log_level,
            Formatter::Pretty,
            std::io::stdout,
        );
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(
            subscriber_name,
            default_log_level,
            Formatter::Pretty,
            std::io::sink,
        );
        init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
    pub token_server: MockServer,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub async fn get_root(&self) -> Result<reqwest::Response> {
        Ok(self
            .api_client
            .get(format!("{}/", &self.address))
            .send()
            .await?)
    }

    pub async fn post_submit_referral(&self, body: &Value) -> Result<reqwest::Response> {
        Ok(self
            .api_client
            .post(format!("{}/submit-referral", &self.address))
            .json(body)
            .send()
            .await?)
    }

    /// Answers token exchanges with `status`, expecting exactly `times` of them.
    pub async fn mock_token_endpoint(&self, status: u16, times: u64) {
        let response = if status == 200 {
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.test-token",
                "expires_in": 3599,
                "token_type": "Bearer",
            }))
        } else {
            ResponseTemplate::new(status)
        };

        Mock::given(path("/token"))
            .and(method("POST"))
            .respond_with(response)
            .expect(times)
            .mount(&self.token_server)
            .await;
    }

    pub async fn saved_referral_count(&self) -> Result<i64> {
        Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM referrals")
            .fetch_one(&self.db_pool)
            .await?)
    }
}

fn unused_port() -> Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

pub async fn spawn_app() -> Result<TestApp> {
    LazyLock::force(&TRACING);
    let token_server = MockServer::start().await;

    let configuration = {
        let mut c = configuration::get()?;
        c.database.name = Uuid::new_v4().to_string();
        c.application.host = "127.0.0.1".into();
        c.application.port = 0;
        c.email_client.token_url = format!("{}/token", token_server.uri());
        // Nothing listens here, so every send fails after the token exchange.
        c.email_client.smtp_host = "127.0.0.1".into();
        c.email_client.smtp_port = unused_port()?;
        c.email_client.timeout_milliseconds = 500;
        c
    };

    let db_pool = configure_database(&configuration.database).await?;

    let application = Application::build(configuration)?;
    let address = format!("http://127.0.0.1:{}", application.port());
    tokio::spawn(application.run_until_stopped());

    Ok(TestApp {
        address,
        db_pool,
        token_server,
        api_client: reqwest::Client::new(),
    })
}

async fn configure_database(config: &DatabaseSettings) -> Result<PgPool> {
    let mut connection = PgConnection::connect_with(&config.without_db()).await?;
    connection
        .execute(format!(r#"CREATE DATABASE "{}";"#, config.name).as_str())
        .await?;
    let connection_pool = PgPool::connect_with(config.with_db()).await?;
    sqlx::migrate!("./migrations").run(&connection_pool).await?;

    Ok(connection_pool)
}
