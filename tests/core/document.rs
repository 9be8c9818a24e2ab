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

    use crate::common::http_server::{self, Route};

    fn session() -> Session {
        Session::new(SessionOptions::default()).unwrap()
    }

    #[tokio::test]
    async fn from_data_url() {
        let document = Document::load(
            &session(),
            "data:text/html;base64,PHRpdGxlPkhlbGxvPC90aXRsZT48bWFpbj48L21haW4+",
        )
        .await
        .unwrap();

        assert_eq!(document.url().scheme(), "data");
        assert_eq!(document.title().as_deref(), Some("Hello"));
        assert!(document.contains_element("main"));
    }

    #[tokio::test]
    async fn from_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        std::fs::write(&path, r#"<title>Local</title><link rel="stylesheet" href="a.css">"#).unwrap();

        let document = Document::load(&session(), path.to_str().unwrap())
            .await
            .unwrap();

        assert_eq!(document.url().scheme(), "file");
        assert!(document.url().path().ends_with("/index.html"));
        assert_eq!(document.base_url(), document.url());
        assert_eq!(document.title().as_deref(), Some("Local"));
    }

    #[tokio::test]
    async fn from_http_with_declared_charset() {
        let server = http_server::start(vec![(
            "/legacy.html",
            Route {
                status: 200,
                content_type: "text/html",
                body: b"<meta charset=\"windows-1252\"><title>Caf\xe9</title>".to_vec(),
                delay: None,
            },
        )]);

        let document = Document::load(&session(), &server.url("legacy.html"))
            .await
            .unwrap();

        assert_eq!(document.title().as_deref(), Some("Café"));
        assert_eq!(document.url().as_str(), server.url("legacy.html"));
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
    use sitesaver::core::{Document, SiteSaverError};
    use sitesaver::network::{FetchError, Session, SessionOptions};

    use crate::common::http_server::{self, Route};

    fn session() -> Session {
        Session::new(SessionOptions::default()).unwrap()
    }

    #[tokio::test]
    async fn non_html_data_url() {
        let result = Document::load(&session(), "data:text/plain,hello").await;

        assert!(matches!(result, Err(SiteSaverError::NonHtmlDataUrl)));
    }

    #[tokio::test]
    async fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.html");

        let result = Document::load(&session(), path.to_str().unwrap()).await;

        assert!(matches!(result, Err(SiteSaverError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn http_error_status() {
        let server = http_server::start(vec![]);

        let result = Document::load(&session(), &server.url("missing.html")).await;

        match result {
            Err(SiteSaverError::Fetch { source, .. }) => {
                assert!(matches!(source, FetchError::Status(404)))
            }
            _ => panic!("expected a fetch error"),
        }
    }

    #[tokio::test]
    async fn binary_pages_are_rejected() {
        let server = http_server::start(vec![(
            "/logo.png",
            Route::ok("image/png", "\u{89}PNG"),
        )]);

        let result = Document::load(&session(), &server.url("logo.png")).await;

        assert!(matches!(
            result,
            Err(SiteSaverError::UnsupportedMediaType(media_type)) if media_type == "image/png"
        ));
    }

    #[test]
    fn invalid_base_url() {
        let document = crate::common::document_at("data:text/html,<p>x</p>", "<p>x</p>");

        assert!(matches!(
            document.with_base_url("relative/path/"),
            Err(SiteSaverError::InvalidUrl { .. })
        ));
    }
}
