use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::configuration::{DatabaseSettings, Settings};
use crate::email_client::EmailClient;
use crate::routes::{get_root, post_submit_referral};
use crate::security::security_layer;
use crate::telemetry::tracing_layer;

/// Process-wide clients, built once and shared read-only by every request.
pub struct AppState {
    pub db_pool: PgPool,
    pub email_client: EmailClient,
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    pub fn build(configuration: Settings) -> Result<Self, std::io::Error> {
        let db_pool = get_connection_pool(&configuration.database);
        let email_client = configuration.email_client.client();

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();
        let router = router(AppState {
            db_pool,
            email_client,
        });

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub const fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.listener.set_nonblocking(true)?;
        let listener = tokio::net::TcpListener::from_std(self.listener)?;
        tracing::info!("server is running on http://{}", listener.local_addr()?);
        axum::serve(
            listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
    }
}

pub fn get_connection_pool(configuration: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new().connect_lazy_with(configuration.with_db())
}

pub fn router(state: AppState) -> Router {
    let router = Router::new()
        .route("/", get(get_root))
        .route("/submit-referral", post(post_submit_referral))
        .with_state(Arc::new(state));

    security_layer(tracing_layer(router))
}
