use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

pub const SUPERUSER: (&str, &str) = ("root", "rootpassword");
pub const STAFF: (&str, &str) = ("staff", "staffpassword");
pub const NORMAL: (&str, &str) = ("customer", "customerpassword");

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Each test binary gets its own server process and database file
        let db_path = std::env::temp_dir().join(format!("pizzeria-test-{}.db", port));
        let _ = std::fs::remove_file(&db_path);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_pizzeria-api"));
        cmd.env("PIZZERIA_API_PORT", port.to_string())
            .env("PIZZERIA_DATABASE_URL", format!("sqlite:{}", db_path.display()))
            .env("PIZZERIA_JWT_SECRET", "integration-test-secret")
            .env("PIZZERIA_SUPERUSER_USERNAME", SUPERUSER.0)
            .env("PIZZERIA_SUPERUSER_PASSWORD", SUPERUSER.1)
            .env("PIZZERIA_STAFF_USERNAME", STAFF.0)
            .env("PIZZERIA_STAFF_PASSWORD", STAFF.1)
            .env("PIZZERIA_NORMAL_USERNAME", NORMAL.0)
            .env("PIZZERIA_NORMAL_PASSWORD", NORMAL.1)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(30)).await?;
    Ok(server)
}

/// Obtain an access token for a seeded account.
pub async fn login(base_url: &str, account: (&str, &str)) -> Result<String> {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/auth/token/", base_url))
        .json(&json!({ "username": account.0, "password": account.1 }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::OK,
        "login failed for {}: {}",
        account.0,
        res.status()
    );
    let body = res.json::<Value>().await?;
    body["access"]
        .as_str()
        .map(|s| s.to_string())
        .context("missing access token in login response")
}

/// Create an ingredient through the API, returning its id.
pub async fn create_ingredient(base_url: &str, token: &str, name: &str) -> Result<i64> {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/ingredients/", base_url))
        .bearer_auth(token)
        .json(&json!({ "name": name }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::CREATED,
        "ingredient create failed: {}",
        res.status()
    );
    let body = res.json::<Value>().await?;
    body["id"].as_i64().context("missing ingredient id")
}

/// Create a pizza through the API, returning the detail response body.
pub async fn create_pizza(
    base_url: &str,
    token: &str,
    name: &str,
    price: &str,
    ingredient_ids: &[i64],
) -> Result<Value> {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/pizzas/create/", base_url))
        .bearer_auth(token)
        .json(&json!({ "name": name, "price": price, "ingredients": ingredient_ids }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::CREATED,
        "pizza create failed: {}",
        res.status()
    );
    Ok(res.json::<Value>().await?)
}
