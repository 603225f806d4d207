use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::Client;
use scraper::Html;

use super::plate_format::PlateString;
use super::ClassificationResult;
use crate::config::Config;
use crate::error::LookupError;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36";

/// Fetches the body behind an address.
pub trait LookupService {
    fn fetch(&self, url: &str) -> Result<String, LookupError>;
}

/// Blocking HTTP lookup. Anything outside 2xx is an error, so is a body that
/// is not UTF-8.
pub struct HttpLookup {
    client: Client,
}

impl HttpLookup {
    pub fn new(timeout: Duration) -> Result<Self, LookupError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl LookupService for HttpLookup {
    fn fetch(&self, url: &str) -> Result<String, LookupError> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }
        let body = response.bytes()?;
        Ok(String::from_utf8(body.to_vec())?)
    }
}

pub struct PlateClassifier {
    lookup: Box<dyn LookupService>,
    base_address: String,
    flagged_marker: String,
    clear_marker: String,
}

impl PlateClassifier {
    pub fn new(
        lookup: Box<dyn LookupService>,
        base_address: impl Into<String>,
        flagged_marker: impl Into<String>,
        clear_marker: impl Into<String>,
    ) -> Self {
        Self {
            lookup,
            base_address: base_address.into(),
            flagged_marker: flagged_marker.into(),
            clear_marker: clear_marker.into(),
        }
    }

    pub fn from_config(lookup: Box<dyn LookupService>, config: &Config) -> Self {
        Self::new(
            lookup,
            config.base_address.as_str(),
            config.flagged_marker.as_str(),
            config.clear_marker.as_str(),
        )
    }

    /// Plates are restricted to `[A-Z0-9]`, so plain concatenation is safe.
    pub fn lookup_address(&self, plate: &PlateString) -> String {
        format!("{}{}", self.base_address, plate)
    }

    /// Never fails: every lookup problem is `Unknown`.
    pub fn classify(&self, plate: &PlateString) -> ClassificationResult {
        let url = self.lookup_address(plate);
        match self.lookup.fetch(&url) {
            Ok(body) => {
                let result = self.classify_body(&body);
                debug!("Lookup {url}: {}", result.label());
                result
            }
            Err(err) => {
                warn!("Lookup {url} failed: {err}");
                ClassificationResult::Unknown
            }
        }
    }

    /// Marker search over the text content of an HTML (or plain text) body.
    /// The flagged marker takes precedence.
    pub fn classify_body(&self, body: &str) -> ClassificationResult {
        let text = body_text(body);
        if text.contains(&self.flagged_marker) {
            ClassificationResult::Flagged
        } else if text.contains(&self.clear_marker) {
            ClassificationResult::Clear
        } else {
            ClassificationResult::Unknown
        }
    }
}

fn body_text(body: &str) -> String {
    Html::parse_document(body).root_element().text().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::Mutex;
    use std::thread;
    use std::time::Instant;

    struct StubLookup {
        responses: HashMap<String, Result<String, u16>>,
        requests: Mutex<Vec<String>>,
    }

    impl StubLookup {
        fn new(url: &str, response: Result<&str, u16>) -> Self {
            let mut responses = HashMap::new();
            responses.insert(url.to_string(), response.map(str::to_string));
            Self {
                responses,
                requests: Mutex::default(),
            }
        }
    }

    impl LookupService for StubLookup {
        fn fetch(&self, url: &str) -> Result<String, LookupError> {
            self.requests.lock().unwrap().push(url.to_string());
            match self.responses.get(url) {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err(status)) => Err(LookupError::Status(*status)),
                None => Err(LookupError::Status(404)),
            }
        }
    }

    fn classifier(response: Result<&str, u16>) -> PlateClassifier {
        let lookup = StubLookup::new("https://plates.test/fordon/LKM250", response);
        PlateClassifier::new(
            Box::new(lookup),
            "https://plates.test/fordon/",
            "Nojjigt",
            "Nepp",
        )
    }

    fn plate() -> PlateString {
        PlateString::parse("LKM250").unwrap()
    }

    #[test]
    fn flagged_marker_wins() {
        let classifier = classifier(Ok("<html><body><p>Nojjigt!</p></body></html>"));
        assert_eq!(classifier.classify(&plate()), ClassificationResult::Flagged);
    }

    #[test]
    fn clear_marker_without_flagged_marker() {
        let classifier = classifier(Ok("<html><body><h1>Nepp</h1></body></html>"));
        assert_eq!(classifier.classify(&plate()), ClassificationResult::Clear);
    }

    #[test]
    fn both_markers_is_flagged() {
        let classifier = classifier(Ok("<p>Nepp</p><p>Nojjigt</p>"));
        assert_eq!(classifier.classify(&plate()), ClassificationResult::Flagged);
    }

    #[test]
    fn no_marker_is_unknown() {
        let classifier = classifier(Ok("<html><body>Kanske</body></html>"));
        assert_eq!(classifier.classify(&plate()), ClassificationResult::Unknown);
    }

    #[test]
    fn server_error_is_unknown() {
        let classifier = classifier(Err(500));
        assert_eq!(classifier.classify(&plate()), ClassificationResult::Unknown);
    }

    #[test]
    fn markers_inside_markup_do_not_count() {
        let classifier = classifier(Ok(r#"<div class="Nojjigt">Nepp</div>"#));
        assert_eq!(classifier.classify(&plate()), ClassificationResult::Clear);
    }

    #[test]
    fn plain_text_bodies_are_searched() {
        let classifier = classifier(Ok("...Nojjigt..."));
        assert_eq!(classifier.classify(&plate()), ClassificationResult::Flagged);
    }

    #[test]
    fn classify_is_idempotent() {
        let classifier = classifier(Ok("<p>Nepp</p>"));
        let first = classifier.classify(&plate());
        let second = classifier.classify(&plate());
        assert_eq!(first, second);
    }

    #[test]
    fn address_is_base_plus_plate() {
        let lookup = StubLookup::new("unused", Ok(""));
        let classifier = PlateClassifier::new(Box::new(lookup), "http://x/", "a", "b");
        assert_eq!(classifier.lookup_address(&plate()), "http://x/LKM250");
    }

    #[test]
    fn from_config_uses_configured_markers() {
        let config = Config {
            flagged_marker: "STOP".to_string(),
            clear_marker: "GO".to_string(),
            ..Config::default()
        };
        let lookup = StubLookup::new("unused", Ok(""));
        let classifier = PlateClassifier::from_config(Box::new(lookup), &config);
        assert_eq!(classifier.classify_body("GO"), ClassificationResult::Clear);
        assert_eq!(classifier.classify_body("STOP"), ClassificationResult::Flagged);
        assert_eq!(classifier.classify_body("Nojjigt"), ClassificationResult::Unknown);
    }

    /// Serves one canned HTTP response and hands back the request line.
    fn serve_once(response: Vec<u8>) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = format!("http://{}/fordon/", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).unwrap();
                if header == "\r\n" || header.is_empty() {
                    break;
                }
            }
            let mut stream = stream;
            stream.write_all(&response).unwrap();
            stream.flush().unwrap();
            request_line
        });
        (address, handle)
    }

    fn http_lookup() -> HttpLookup {
        let client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        HttpLookup::with_client(client)
    }

    fn http_response(status: &str, body: &str) -> Vec<u8> {
        http_response_bytes(status, body.as_bytes())
    }

    fn http_response_bytes(status: &str, body: &[u8]) -> Vec<u8> {
        let mut response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .into_bytes();
        response.extend_from_slice(body);
        response
    }

    #[test]
    fn http_lookup_classifies_live_body() {
        let (address, server) =
            serve_once(http_response("200 OK", "<html><body>Nojjigt</body></html>"));
        let classifier = PlateClassifier::new(Box::new(http_lookup()), address, "Nojjigt", "Nepp");

        assert_eq!(classifier.classify(&plate()), ClassificationResult::Flagged);
        let request_line = server.join().unwrap();
        assert!(request_line.starts_with("GET /fordon/LKM250 "), "{request_line}");
    }

    #[test]
    fn http_lookup_reports_status() {
        let (address, server) = serve_once(http_response("500 Internal Server Error", "Nepp"));
        let lookup = http_lookup();

        let err = lookup.fetch(&format!("{address}LKM250")).unwrap_err();
        assert!(matches!(err, LookupError::Status(500)), "{err}");
        server.join().unwrap();
    }

    #[test]
    fn http_lookup_connection_refused_is_unknown() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = format!("http://{}/fordon/", listener.local_addr().unwrap());
        drop(listener);

        let classifier = PlateClassifier::new(Box::new(http_lookup()), address, "Nojjigt", "Nepp");
        assert_eq!(classifier.classify(&plate()), ClassificationResult::Unknown);
    }

    #[test]
    fn http_lookup_rejects_invalid_utf8_body() {
        let mut body = b"<html><body>Nojjigt ".to_vec();
        body.extend_from_slice(&[0xff, 0xfe]);
        body.extend_from_slice(b"</body></html>");
        let (address, server) = serve_once(http_response_bytes("200 OK", &body));
        let lookup = http_lookup();

        let err = lookup.fetch(&format!("{address}LKM250")).unwrap_err();
        assert!(matches!(err, LookupError::Body(_)), "{err}");
        server.join().unwrap();
    }

    #[test]
    fn http_lookup_invalid_utf8_body_is_unknown() {
        let mut body = b"Nojjigt".to_vec();
        body.push(0xc3);
        let (address, server) = serve_once(http_response_bytes("200 OK", &body));
        let classifier = PlateClassifier::new(Box::new(http_lookup()), address, "Nojjigt", "Nepp");

        assert_eq!(classifier.classify(&plate()), ClassificationResult::Unknown);
        server.join().unwrap();
    }

    #[test]
    fn http_lookup_timeout_is_unknown() {
        // accepted by the kernel backlog, never answered
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = format!("http://{}/fordon/", listener.local_addr().unwrap());
        let lookup = HttpLookup::new(Duration::from_millis(300)).unwrap();
        let classifier = PlateClassifier::new(Box::new(lookup), address, "Nojjigt", "Nepp");

        let started = Instant::now();
        assert_eq!(classifier.classify(&plate()), ClassificationResult::Unknown);
        assert!(started.elapsed() < Duration::from_secs(4), "{:?}", started.elapsed());
        drop(listener);
    }
}
