//! SOAP client for the administremos basic-table service.
//!
//! The service speaks SOAP 1.1 but answers with a JSON document embedded
//! in the result element, so the client builds envelopes with
//! `quick-xml`'s writer API and hand-parses the response just far enough
//! to reach that payload.

use std::{io::Cursor, time::Duration};

use anyhow::{Context, Result, anyhow};
use quick_xml::{
  Writer,
  events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use reqwest::Client;
use serde_json::{Map, Value};

// ─── Namespaces ──────────────────────────────────────────────────────────────

const NS_SOAP: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const NS_SERVICE: &str = "http://cmd-it.dk/";
const OPERATION: &str = "getInfoTablasBasicasPaginadas";

// ─── Client ──────────────────────────────────────────────────────────────────

/// Connection settings for the SOAP endpoint.
#[derive(Debug, Clone)]
pub struct SoapConfig {
  pub url:      String,
  pub username: String,
  pub password: String,
  pub key:      String,
  pub token:    String,
}

/// Identifies which basic table to page through.
#[derive(Debug, Clone)]
pub struct TableQuery {
  pub company_id:   i64,
  pub pesv_version: i64,
  pub table:        String,
}

/// Async SOAP client for `getInfoTablasBasicasPaginadas`.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct SoapClient {
  client: Client,
  config: SoapConfig,
}

impl SoapClient {
  pub fn new(config: SoapConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  /// Fetch one page of `query.table` rows. An empty vec means the server
  /// has no more rows.
  pub async fn fetch_page(
    &self,
    query: &TableQuery,
    page: u32,
  ) -> Result<Vec<Map<String, Value>>> {
    let envelope = self.build_envelope(query, page);

    let resp = self
      .client
      .post(&self.config.url)
      .header("Content-Type", "text/xml; charset=utf-8")
      .header("SOAPAction", format!("\"{NS_SERVICE}{OPERATION}\""))
      .body(envelope)
      .send()
      .await
      .with_context(|| format!("SOAP call for page {page} failed"))?;

    if !resp.status().is_success() {
      return Err(anyhow!("page {page} → {}", resp.status()));
    }

    let xml = resp.text().await.context("reading SOAP response body")?;
    let payload = extract_result_text(xml.as_bytes())?.ok_or_else(|| {
      anyhow!("page {page}: SOAP response carries no result element")
    })?;

    parse_rows(&payload, page)
  }

  /// Serialize one request envelope. Credentials travel in a header
  /// element, the operation call in the body.
  fn build_envelope(&self, query: &TableQuery, page: u32) -> Vec<u8> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer
      .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
      .unwrap();

    let mut env = BytesStart::new("soap:Envelope");
    env.push_attribute(("xmlns:soap", NS_SOAP));
    env.push_attribute(("xmlns:ws", NS_SERVICE));
    writer.write_event(Event::Start(env)).unwrap();

    write_start(&mut writer, "soap:Header");
    write_start(&mut writer, "ws:Auth");
    write_text_elem(&mut writer, "ws:UserName", &self.config.username);
    write_text_elem(&mut writer, "ws:Password", &self.config.password);
    write_text_elem(&mut writer, "ws:key", &self.config.key);
    write_text_elem(&mut writer, "ws:token", &self.config.token);
    write_end(&mut writer, "ws:Auth");
    write_end(&mut writer, "soap:Header");

    write_start(&mut writer, "soap:Body");
    write_start(&mut writer, &format!("ws:{OPERATION}"));
    write_text_elem(&mut writer, "ws:idEmpresa", &query.company_id.to_string());
    write_text_elem(
      &mut writer,
      "ws:idVersionPesv",
      &query.pesv_version.to_string(),
    );
    write_text_elem(&mut writer, "ws:tabla", &query.table);
    write_start(&mut writer, "ws:paginacion");
    write_text_elem(&mut writer, "ws:paginaActual", &page.to_string());
    write_end(&mut writer, "ws:paginacion");
    write_end(&mut writer, &format!("ws:{OPERATION}"));
    write_end(&mut writer, "soap:Body");

    writer
      .write_event(Event::End(BytesEnd::new("soap:Envelope")))
      .unwrap();

    writer.into_inner().into_inner()
  }
}

// ─── Response parsing ────────────────────────────────────────────────────────

/// Pull the text content of the first `*Result` (or `return`) element out
/// of a response envelope. The service embeds its JSON payload there.
fn extract_result_text(xml: &[u8]) -> Result<Option<String>> {
  let mut reader = quick_xml::Reader::from_reader(xml);
  reader.config_mut().trim_text(true);

  let mut in_result = false;
  let mut found = false;
  let mut text = String::new();
  let mut buf = Vec::new();

  loop {
    match reader.read_event_into(&mut buf) {
      Ok(Event::Start(ref e)) => {
        let name_buf = e.name();
        if is_result_name(local_name(name_buf.as_ref())) {
          in_result = true;
          found = true;
        }
      }
      Ok(Event::Text(ref e)) if in_result => {
        let unescaped = e.unescape().context("unescaping SOAP result text")?;
        text.push_str(&unescaped);
      }
      Ok(Event::CData(ref e)) if in_result => {
        text.push_str(&String::from_utf8_lossy(e));
      }
      Ok(Event::End(ref e)) => {
        let name_buf = e.name();
        if is_result_name(local_name(name_buf.as_ref())) {
          in_result = false;
        }
      }
      Ok(Event::Eof) => break,
      Err(e) => return Err(anyhow!("malformed SOAP response: {e}")),
      _ => {}
    }
    buf.clear();
  }

  Ok(found.then_some(text))
}

/// The result wrapper differs by toolkit (`<op>Result` for .NET stacks,
/// `return` for most Java ones); accept both.
fn is_result_name(local: &[u8]) -> bool {
  local == b"return" || local.ends_with(b"Result")
}

fn local_name(name: &[u8]) -> &[u8] {
  // strip "prefix:" if present
  if let Some(pos) = name.iter().rposition(|&b| b == b':') {
    &name[pos + 1..]
  } else {
    name
  }
}

/// Decode one page payload. The service answers with
/// `{"response": [ ...row objects... ]}`; a missing or empty `response`
/// array marks the end of pagination.
fn parse_rows(payload: &str, page: u32) -> Result<Vec<Map<String, Value>>> {
  let doc: Value = serde_json::from_str(payload)
    .with_context(|| format!("page {page}: result payload is not valid JSON"))?;

  let Some(rows) = doc.get("response") else {
    return Ok(Vec::new());
  };
  let rows = rows
    .as_array()
    .ok_or_else(|| anyhow!("page {page}: \"response\" is not an array"))?;

  rows
    .iter()
    .map(|row| match row {
      Value::Object(map) => Ok(map.clone()),
      other => Err(anyhow!("page {page}: row is not an object: {other}")),
    })
    .collect()
}

// ─── XML writer helpers ──────────────────────────────────────────────────────

fn write_start(w: &mut Writer<Cursor<Vec<u8>>>, tag: &str) {
  w.write_event(Event::Start(BytesStart::new(tag))).unwrap();
}

fn write_end(w: &mut Writer<Cursor<Vec<u8>>>, tag: &str) {
  w.write_event(Event::End(BytesEnd::new(tag))).unwrap();
}

fn write_text_elem(w: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) {
  write_start(w, tag);
  w.write_event(Event::Text(BytesText::new(text))).unwrap();
  write_end(w, tag);
}

// ─── Tests ────────────────────────────────────────────────────────────────────
