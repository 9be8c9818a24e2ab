//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use std::time::{Duration, Instant};

    use sitesaver::readiness::{poll_until, PollConfig, PollOutcome};

    #[tokio::test]
    async fn true_condition_resolves_within_one_interval() {
        let start = Instant::now();

        let outcome = poll_until(|| true, Duration::from_millis(500), Duration::from_millis(100)).await;

        assert_eq!(outcome, PollOutcome::Satisfied);
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn condition_that_becomes_true() {
        let ready_at = Instant::now() + Duration::from_millis(150);

        let outcome = PollConfig::new(Duration::from_secs(2), Duration::from_millis(20))
            .unwrap()
            .poll_until(|| Instant::now() >= ready_at)
            .await;

        assert!(outcome.is_satisfied());
    }
}

//  ███████╗ █████╗ ██╗██╗     ██╗███╗   ██╗ ██████╗
//  ██╔════╝██╔══██╗██║██║     ██║████╗  ██║██╔════╝
//  █████╗  ███████║██║██║     ██║██╔██╗ ██║██║  ███╗
//  ██╔══╝  ██╔══██║██║██║     ██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║██║███████╗██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚═╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod failing {
    use std::time::{Duration, Instant};

    use sitesaver::network::{Session, SessionOptions};
    use sitesaver::readiness::{poll_async, poll_until, PollOutcome};
    use sitesaver::utils::Url;

    use crate::common::http_server::{self, Route};

    #[tokio::test]
    async fn false_condition_times_out_on_schedule() {
        let start = Instant::now();

        let outcome = poll_until(|| false, Duration::from_millis(500), Duration::from_millis(100)).await;
        let elapsed = start.elapsed();

        assert_eq!(outcome, PollOutcome::TimedOut);
        assert!(elapsed >= Duration::from_millis(500), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(700), "{:?}", elapsed);
    }

    #[tokio::test]
    async fn failing_requests_never_escalate() {
        let server = http_server::start(vec![("/status", Route::status(503))]);
        let session = Session::new(SessionOptions::default()).unwrap();
        let url = Url::parse(&server.url("status")).unwrap();
        let session = &session;
        let url = &url;

        let outcome = poll_async(
            move || async move { session.retrieve_asset(url).await.map(|_| true) },
            Duration::from_millis(300),
            Duration::from_millis(50),
        )
        .await;

        assert_eq!(outcome, PollOutcome::TimedOut);
        assert!(server.hits() >= 2);
    }
}
