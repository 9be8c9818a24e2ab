//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use sitesaver::core::Document;
    use sitesaver::network::{Session, SessionOptions};
    use sitesaver::pipeline::{AutoConfirm, FsSink, Pipeline, RunOptions};

    use crate::common::http_server::{self, Route};

    #[tokio::test]
    async fn saves_located_resources_from_a_live_page() {
        let server = http_server::start(vec![
            (
                "/page.html",
                Route::ok(
                    "text/html; charset=utf-8",
                    r#"<html><head><title>Shop</title><link rel="stylesheet" href="static/site.css"></head>
                    <body><a href="/feeds/products.xml">products</a><a href="/feeds/gone.xml">old</a></body></html>"#,
                ),
            ),
            ("/static/site.css", Route::ok("text/css", "body{margin:0}")),
            ("/feeds/products.xml", Route::ok("application/xml", "<products/>")),
        ]);
        let dir = tempfile::tempdir().unwrap();

        let session = Session::new(SessionOptions::default()).unwrap();
        let document = Document::load(&session, &server.url("page.html")).await.unwrap();
        assert_eq!(document.title().as_deref(), Some("Shop"));

        let pipeline = Pipeline::new(session, FsSink::new(dir.path()), AutoConfirm);
        let result = pipeline.run(&RunOptions::default(), Some(&document)).await;

        assert_eq!(result.summary.total, 3);
        assert_eq!(result.summary.succeeded, 2);
        assert_eq!(result.outcomes[0].http_status, Some(200));
        assert_eq!(result.outcomes[2].http_status, Some(404));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("site.css")).unwrap(),
            "body{margin:0}"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("products.xml")).unwrap(),
            "<products/>"
        );
        assert!(!dir.path().join("gone.xml").exists());
    }

    #[tokio::test]
    async fn repeated_runs_do_not_overwrite() {
        let server = http_server::start(vec![("/a.css", Route::ok("text/css", "a{}"))]);
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(
            Session::new(SessionOptions::default()).unwrap(),
            FsSink::new(dir.path()),
            AutoConfirm,
        );
        let options = RunOptions {
            urls: Some(vec![server.url("a.css")]),
            ..RunOptions::default()
        };

        let first = pipeline.run(&options, None).await;
        let second = pipeline.run(&options, None).await;

        assert_eq!(first.outcomes[0].filename.as_deref(), Some("a.css"));
        assert_eq!(second.outcomes[0].filename.as_deref(), Some("a (1).css"));
        assert_eq!(server.hits(), 2);
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
    use std::time::Duration;

    use sitesaver::network::{Session, SessionOptions};
    use sitesaver::pipeline::{AutoConfirm, MemorySink, Pipeline, RunOptions};

    use crate::common::http_server::{self, Route};

    #[tokio::test]
    async fn slow_server_hits_the_per_item_timeout() {
        let server = http_server::start(vec![
            (
                "/slow.xml",
                Route::ok("application/xml", "<slow/>").delayed(Duration::from_secs(2)),
            ),
            ("/fast.css", Route::ok("text/css", "a{}")),
        ]);
        let pipeline = Pipeline::new(
            Session::new(SessionOptions::default()).unwrap(),
            MemorySink::new(),
            AutoConfirm,
        );
        let options = RunOptions {
            urls: Some(vec![server.url("slow.xml"), server.url("fast.css")]),
            timeout: Duration::from_millis(200),
            ..RunOptions::default()
        };

        let result = pipeline.run(&options, None).await;

        assert_eq!(
            result.outcomes[0].error.as_deref(),
            Some("timed out after 200 ms")
        );
        assert!(result.outcomes[1].ok);
    }

    #[tokio::test]
    async fn server_errors_keep_their_status() {
        let server = http_server::start(vec![("/broken.xml", Route::status(503))]);
        let pipeline = Pipeline::new(
            Session::new(SessionOptions::default()).unwrap(),
            MemorySink::new(),
            AutoConfirm,
        );
        let options = RunOptions {
            urls: Some(vec![server.url("broken.xml")]),
            ..RunOptions::default()
        };

        let result = pipeline.run(&options, None).await;

        assert_eq!(result.outcomes[0].http_status, Some(503));
        assert_eq!(result.outcomes[0].error.as_deref(), Some("HTTP status 503"));
        assert!(pipeline.sink().files().is_empty());
    }

    #[tokio::test]
    async fn refused_connections_are_network_errors() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let pipeline = Pipeline::new(
            Session::new(SessionOptions::default()).unwrap(),
            MemorySink::new(),
            AutoConfirm,
        );
        let options = RunOptions {
            urls: Some(vec![format!("http://127.0.0.1:{}/a.css", port)]),
            ..RunOptions::default()
        };

        let result = pipeline.run(&options, None).await;

        assert!(!result.outcomes[0].ok);
        assert_eq!(result.outcomes[0].http_status, None);
        assert!(result.outcomes[0]
            .error
            .as_deref()
            .unwrap()
            .starts_with("network error"));
    }
}
