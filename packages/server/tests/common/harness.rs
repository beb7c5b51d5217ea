//! Container-backed context for the integration suites.
//!
//! One Postgres and one Redis container serve the whole test binary; they
//! start lazily on the first test and the migrations run against them once.
//! Every test still gets its own connection pool, so a test cannot observe
//! another test's open transactions.

use anyhow::{Context, Result};
use sqlx::PgPool;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use testcontainers_modules::redis::Redis;
use tokio::sync::OnceCell;

static BACKENDS: OnceCell<Backends> = OnceCell::const_new();

/// The live containers plus their connection strings. Held in the static
/// above so the containers are not dropped (and torn down) between tests.
struct Backends {
    db_url: String,
    redis_url: String,
    _postgres: ContainerAsync<Postgres>,
    _redis: ContainerAsync<Redis>,
}

async fn boot_backends() -> Result<Backends> {
    // RUST_LOG controls test logging; try_init because any test may be first.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    // Every test opens a fresh pool against the one server, so raise the
    // connection ceiling well above the suite's worst case.
    let postgres = Postgres::default()
        .with_tag("16")
        .with_cmd(["-c", "max_connections=200"])
        .start()
        .await
        .context("starting Postgres container")?;
    let db_url = format!(
        "postgresql://postgres:postgres@{}:{}/postgres",
        postgres.get_host().await?,
        postgres.get_host_port_ipv4(5432).await?
    );

    let redis = Redis::default()
        .start()
        .await
        .context("starting Redis container")?;
    let redis_url = format!(
        "redis://{}:{}",
        redis.get_host().await?,
        redis.get_host_port_ipv4(6379).await?
    );

    let pool = PgPool::connect(&db_url)
        .await
        .context("connecting for migrations")?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("running migrations")?;

    Ok(Backends {
        db_url,
        redis_url,
        _postgres: postgres,
        _redis: redis,
    })
}

/// Per-test context handed in by `#[test_context(TestHarness)]`.
///
/// ```ignore
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn test_something(ctx: &TestHarness) {
///     let app = TestApp::new(ctx.db_pool.clone());
/// }
/// ```
pub struct TestHarness {
    /// Fresh pool into the shared database; use it for fixtures too.
    pub db_pool: PgPool,
    /// Redis URL for tests that exercise the cache layer.
    pub redis_url: String,
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        let backends = BACKENDS
            .get_or_init(|| async {
                boot_backends()
                    .await
                    .expect("test containers failed to start")
            })
            .await;

        let db_pool = PgPool::connect(&backends.db_url)
            .await
            .context("connecting to the test database")?;

        Ok(Self {
            db_pool,
            redis_url: backends.redis_url.clone(),
        })
    }
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        TestHarness::new().await.expect("test harness setup failed")
    }

    async fn teardown(self) {}
}
