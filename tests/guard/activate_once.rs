//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use sitesaver::guard::{ActivationGuard, DOWNLOAD_ALL};
    use sitesaver::pipeline::{AutoConfirm, MemorySink, Pipeline, RunOptions};

    use crate::common::fakes::{FakeFetcher, FakeResponse};

    #[tokio::test]
    async fn pipeline_runs_once_per_guard() {
        let guard = ActivationGuard::new();
        let pipeline = Pipeline::new(
            FakeFetcher::new().with("https://x/site.css", FakeResponse::Body("a{}")),
            MemorySink::new(),
            AutoConfirm,
        );
        let options = RunOptions {
            urls: Some(vec!["https://x/site.css".to_string()]),
            ..RunOptions::default()
        };

        let first = guard
            .activate_once(DOWNLOAD_ALL, || pipeline.run(&options, None))
            .await;
        let second = guard
            .activate_once(DOWNLOAD_ALL, || pipeline.run(&options, None))
            .await;

        assert_eq!(first.map(|result| result.summary.total), Some(1));
        assert!(second.is_none());
        assert_eq!(pipeline.fetcher().calls().len(), 1);
        assert_eq!(pipeline.sink().files().len(), 1);
    }

    #[tokio::test]
    async fn separate_guards_do_not_share_state() {
        let first = ActivationGuard::new();
        let second = ActivationGuard::new();

        assert_eq!(first.activate_once(DOWNLOAD_ALL, || async { 1 }).await, Some(1));
        assert_eq!(second.activate_once(DOWNLOAD_ALL, || async { 2 }).await, Some(2));
        assert!(first.is_active(DOWNLOAD_ALL));
    }
}
