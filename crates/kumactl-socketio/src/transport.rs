//! Engine.IO HTTP long-polling transport.

use url::Url;

use crate::error::{Result, TransportError};
use crate::packet::{decode_payload, encode_payload, EnginePacket, Handshake};

/// One Engine.IO session over HTTP polling.
///
/// Requests are issued one at a time; the caller must not poll and send
/// concurrently.
#[derive(Debug)]
pub struct PollingTransport {
    http: reqwest::Client,
    endpoint: Url,
    sid: String,
}

/// `{base}/socket.io/?EIO=4&transport=polling`, keeping any base path.
pub fn endpoint_url(base: &str) -> Result<Url> {
    let invalid = |message: String| TransportError::InvalidUrl {
        url: base.to_string(),
        message,
    };
    let mut url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    let mut url = url.join("socket.io/").map_err(|e| invalid(e.to_string()))?;
    url.set_query(None);
    url.query_pairs_mut()
        .append_pair("EIO", "4")
        .append_pair("transport", "polling");
    Ok(url)
}

impl PollingTransport {
    /// Performs the handshake and returns the opened session.
    pub async fn open(http: reqwest::Client, endpoint: Url) -> Result<(Self, Handshake)> {
        tracing::debug!(endpoint = %endpoint, "opening engine.io session");
        let body = read_body(http.get(endpoint.clone()).send().await?).await?;
        let mut packets = decode_payload(&body)?.into_iter();
        let handshake = match packets.next() {
            Some(EnginePacket::Open(handshake)) => handshake,
            _ => return Err(TransportError::packet(body, "expected an open packet")),
        };
        tracing::debug!(sid = %handshake.sid, ping_interval = handshake.ping_interval, "engine.io session open");

        let transport = Self {
            http,
            endpoint,
            sid: handshake.sid.clone(),
        };
        Ok((transport, handshake))
    }

    pub fn sid(&self) -> &str {
        &self.sid
    }

    fn session_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("sid", &self.sid);
        url
    }

    pub async fn send(&self, packets: &[EnginePacket]) -> Result<()> {
        let payload = encode_payload(packets);
        tracing::trace!(payload = %payload, "send");
        let response = self
            .http
            .post(self.session_url())
            .header("Content-Type", "text/plain;charset=UTF-8")
            .body(payload)
            .send()
            .await?;
        read_body(response).await?;
        Ok(())
    }

    /// Waits for the next payload from the server.
    pub async fn poll(&self) -> Result<Vec<EnginePacket>> {
        let body = read_body(self.http.get(self.session_url()).send().await?).await?;
        tracing::trace!(payload = %body, "poll");
        decode_payload(&body)
    }
}

async fn read_body(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(TransportError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url() {
        assert_eq!(
            endpoint_url("http://127.0.0.1:3001").unwrap().as_str(),
            "http://127.0.0.1:3001/socket.io/?EIO=4&transport=polling"
        );
        assert_eq!(
            endpoint_url("https://status.example.org/kuma?x=1").unwrap().as_str(),
            "https://status.example.org/kuma/socket.io/?EIO=4&transport=polling"
        );
    }

    #[test]
    fn test_endpoint_url_rejects() {
        assert!(matches!(
            endpoint_url("not a url"),
            Err(TransportError::InvalidUrl { .. })
        ));
        assert!(matches!(
            endpoint_url("ftp://example.org"),
            Err(TransportError::InvalidUrl { .. })
        ));
    }
}
