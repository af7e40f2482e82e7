#[cfg(test)]
mod test {

    use std::time::Duration;

    use tokio::time::sleep;

    use crate::config::settings::{MetricsConfig, ServerConfig, SettingsConfig};
    use crate::observability::metrics::{get_metrics, mark_up};
    use crate::server;
    use crate::tests::common::{build_reqwest_client, closed_port_url};

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn metrics_are_served_when_enabled() {
        let url = closed_port_url("/metrics");
        let port = url
            .trim_start_matches("http://127.0.0.1:")
            .trim_end_matches("/metrics")
            .to_owned();
        let settings = SettingsConfig {
            metrics: MetricsConfig { path: "/metrics".to_owned(), is_enabled: true },
            server: ServerConfig { host: "127.0.0.1".to_owned(), port },
            ..Default::default()
        };

        let handle = tokio::spawn(async move { server::server::start(&settings).await });
        sleep(Duration::from_millis(300)).await;

        let response = build_reqwest_client().get(&url).send().await.unwrap();
        assert!(response.status().is_success());
        let body = response.text().await.unwrap();
        assert!(body.contains("feedbackdigest_up 1"));

        handle.abort();
    }

    #[tokio::test]
    async fn disabled_metrics_do_not_bind() {
        let settings = SettingsConfig::default();
        server::server::start(&settings).await.unwrap();
    }

    #[tokio::test]
    async fn single_run_marks_service_up_without_server() {
        mark_up().await;
        assert_eq!(get_metrics().await.up.get(), 1);
    }
}
