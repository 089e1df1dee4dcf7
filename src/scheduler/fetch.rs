//! Fetching one category's payload.

use async_trait::async_trait;

use quotawatch_adapters::ConsoleClient;

use crate::data::metrics::{
    accounts_from, filesystem_from, gauge_from_system, quota_rows, services_from,
    top_consumers_from,
};
use crate::data::{MetricPayload, Policy, PolicyBook};
use crate::error::FetchError;
use crate::store::MetricCategory;

/// Produces a normalized payload for a category.
///
/// Each call is independent; the scheduler issues one per category per round
/// and does not order their completions.
#[async_trait]
pub trait MetricFetcher: Send + Sync {
    async fn fetch(&self, category: MetricCategory) -> Result<MetricPayload, FetchError>;
}

/// Fetches from the console backend.
#[derive(Debug, Clone)]
pub struct ConsoleFetcher {
    client: ConsoleClient,
    top_consumers: usize,
}

impl ConsoleFetcher {
    pub fn new(client: ConsoleClient, top_consumers: usize) -> Self {
        Self {
            client,
            top_consumers,
        }
    }

    async fn policy_book(&self) -> Result<PolicyBook, FetchError> {
        let response = self.client.policies().await?;
        Ok(PolicyBook::from_policies(
            response.policies.into_iter().map(Policy::from).collect(),
        )?)
    }
}

#[async_trait]
impl MetricFetcher for ConsoleFetcher {
    async fn fetch(&self, category: MetricCategory) -> Result<MetricPayload, FetchError> {
        let payload = match category {
            MetricCategory::Cpu | MetricCategory::Memory | MetricCategory::Disk => {
                let response = self.client.system().await?;
                MetricPayload::Gauge(gauge_from_system(&response, category)?)
            }
            MetricCategory::Services => {
                MetricPayload::Services(services_from(self.client.services().await?))
            }
            MetricCategory::Storage => {
                let response = self.client.storage().await?;
                MetricPayload::Storage(filesystem_from(&response)?)
            }
            MetricCategory::TopConsumers => {
                let response = self.client.storage().await?;
                MetricPayload::TopConsumers(top_consumers_from(&response, self.top_consumers)?)
            }
            MetricCategory::Quotas => {
                let (quotas, book) = tokio::try_join!(
                    async { self.client.quotas().await.map_err(FetchError::from) },
                    self.policy_book(),
                )?;
                MetricPayload::Quotas(quota_rows(quotas, &book)?)
            }
            MetricCategory::Policies => {
                MetricPayload::Policies(self.policy_book().await?.list_policies().to_vec())
            }
            MetricCategory::Accounts => {
                MetricPayload::Accounts(accounts_from(self.client.accounts().await?))
            }
        };
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Severity;
    use crate::error::PolicyError;
    use quotawatch_adapters::AdapterError;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve canned JSON bodies by request path until the test ends.
    async fn serve(routes: &'static [(&'static str, &'static str)]) -> ConsoleClient {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 4096];
                    let mut read = 0;
                    loop {
                        let n = socket.read(&mut buf[read..]).await.unwrap_or(0);
                        read += n;
                        if n == 0 || buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }
                    let head = String::from_utf8_lossy(&buf[..read]);
                    let path = head.split_whitespace().nth(1).unwrap_or("").to_string();

                    let (status, body) = routes
                        .iter()
                        .find(|(route, _)| path.ends_with(route))
                        .map(|(_, body)| ("200 OK", *body))
                        .unwrap_or(("404 Not Found", r#"{"success": false, "message": "not found"}"#));

                    let response = format!(
                        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        ConsoleClient::builder()
            .endpoint(format!("http://{}/api", addr))
            .build()
            .unwrap()
    }

    const POLICIES: &str = r#"{"success": true, "policies": [
        {"id": 1, "policy_name": "standard", "soft_limit": 500, "hard_limit": 1000, "is_default": 1}
    ]}"#;

    #[tokio::test]
    async fn test_quotas_use_default_policy() {
        let client = serve(&[
            ("/quotas", r#"{"success": true, "quotas": [{"identity": "alice", "usedMB": 850}]}"#),
            ("/quota-policies", POLICIES),
        ])
        .await;

        let payload = ConsoleFetcher::new(client, 10)
            .fetch(MetricCategory::Quotas)
            .await
            .unwrap();

        let MetricPayload::Quotas(rows) = payload else {
            panic!("expected quotas");
        };
        assert_eq!(rows[0].report.status.percentage, 85.0);
        assert_eq!(rows[0].report.status.severity, Severity::Critical);
    }

    #[tokio::test]
    async fn test_inverted_backend_limits_fail_quotas() {
        let client = serve(&[
            (
                "/quotas",
                r#"{"success": true, "quotas": [
                    {"identity": "alice", "usedMB": 900, "softLimitMB": 2000, "hardLimitMB": 1000}
                ]}"#,
            ),
            ("/quota-policies", POLICIES),
        ])
        .await;

        let err = ConsoleFetcher::new(client, 10)
            .fetch(MetricCategory::Quotas)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::Policy(PolicyError::ValidationRejected { soft, hard })
                if soft == 2000 << 20 && hard == 1000 << 20
        ));
    }

    #[tokio::test]
    async fn test_gauge_categories_share_endpoint() {
        let client = serve(&[(
            "/monitoring/system",
            r#"{"success": true, "metrics": {"cpu": {"percent": 10}, "memory": {"percent": 70}, "disk": {"percent": 90}}}"#,
        )])
        .await;
        let fetcher = ConsoleFetcher::new(client, 10);

        let MetricPayload::Gauge(memory) = fetcher.fetch(MetricCategory::Memory).await.unwrap()
        else {
            panic!("expected gauge");
        };
        assert_eq!(memory.severity, Severity::Warning);

        let MetricPayload::Gauge(disk) = fetcher.fetch(MetricCategory::Disk).await.unwrap() else {
            panic!("expected gauge");
        };
        assert_eq!(disk.severity, Severity::Critical);
    }

    #[tokio::test]
    async fn test_missing_endpoint_is_a_fetch_failure() {
        let client = serve(&[("/quota-policies", POLICIES)]).await;
        let err = ConsoleFetcher::new(client, 10)
            .fetch(MetricCategory::Services)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            FetchError::Transport(AdapterError::Backend(ref m)) if m == "not found"
        ));
    }

    #[tokio::test]
    async fn test_policies_listed_by_name() {
        let client = serve(&[(
            "/quota-policies",
            r#"{"success": true, "policies": [
                {"id": 2, "policyName": "zeta", "softLimit": 1, "hardLimit": 2, "isDefault": false},
                {"id": 1, "policyName": "alpha", "softLimit": 1, "hardLimit": 2, "isDefault": true}
            ]}"#,
        )])
        .await;

        let MetricPayload::Policies(policies) = ConsoleFetcher::new(client, 10)
            .fetch(MetricCategory::Policies)
            .await
            .unwrap()
        else {
            panic!("expected policies");
        };
        assert_eq!(policies[0].name, "alpha");
        assert_eq!(policies[1].name, "zeta");
    }
}
