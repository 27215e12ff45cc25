// Minimal XML-RPC client
// Enough of the protocol to talk to flrig and the WinKeyer bridge: string
// parameters out, first scalar return value back. The element reader here is
// also used for the callsign lookup replies.

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use reqwest::Client;
use std::time::Duration;

use crate::error::{Error, Result};

/// One element of a parsed document, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Element {
    pub name: String,
    pub parent: Option<usize>,
    /// Direct text content with entity and character references resolved
    pub text: String,
}

/// Flatten `doc` into its elements. Namespace prefixes are dropped.
pub(crate) fn parse_elements(doc: &str) -> std::result::Result<Vec<Element>, quick_xml::Error> {
    let mut reader = Reader::from_reader(doc.as_bytes());
    let mut buf = Vec::new();
    let mut elements: Vec<Element> = Vec::new();
    let mut open: Vec<usize> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let name = reader.decoder().decode(e.local_name().as_ref())?.into_owned();
                elements.push(Element {
                    name,
                    parent: open.last().copied(),
                    text: String::new(),
                });
                open.push(elements.len() - 1);
            }
            Event::Empty(ref e) => {
                let name = reader.decoder().decode(e.local_name().as_ref())?.into_owned();
                elements.push(Element {
                    name,
                    parent: open.last().copied(),
                    text: String::new(),
                });
            }
            Event::End(_) => {
                open.pop();
            }
            Event::Text(ref e) => {
                if let Some(&idx) = open.last() {
                    let text = reader.decoder().decode(e.as_ref())?;
                    elements[idx].text.push_str(&text);
                }
            }
            Event::CData(ref e) => {
                if let Some(&idx) = open.last() {
                    let text = reader.decoder().decode(e.as_ref())?;
                    elements[idx].text.push_str(&text);
                }
            }
            Event::GeneralRef(ref e) => {
                if let Some(&idx) = open.last() {
                    let resolved = match e.resolve_char_ref()? {
                        Some(ch) => ch.to_string(),
                        None => {
                            let entity = reader.decoder().decode(e.as_ref())?;
                            match resolve_predefined_entity(&entity) {
                                Some(text) => text.to_string(),
                                // Unknown entities are kept as written
                                None => format!("&{};", entity),
                            }
                        }
                    };
                    elements[idx].text.push_str(&resolved);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(elements)
}

/// Whether element `idx` sits somewhere below element `ancestor`
pub(crate) fn is_within(elements: &[Element], idx: usize, ancestor: usize) -> bool {
    let mut current = elements[idx].parent;
    while let Some(parent) = current {
        if parent == ancestor {
            return true;
        }
        current = elements[parent].parent;
    }
    false
}

/// Index of the first `name` element below `ancestor`
fn first_within(elements: &[Element], name: &str, ancestor: usize) -> Option<usize> {
    (ancestor + 1..elements.len()).find(|&i| elements[i].name == name && is_within(elements, i, ancestor))
}

fn write_text_element<W: std::io::Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

pub fn encode_call(method: &str, params: &[&str]) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
    writer.write_event(Event::Start(BytesStart::new("methodCall")))?;
    write_text_element(&mut writer, "methodName", method)?;

    writer.write_event(Event::Start(BytesStart::new("params")))?;
    for param in params {
        writer.write_event(Event::Start(BytesStart::new("param")))?;
        writer.write_event(Event::Start(BytesStart::new("value")))?;
        write_text_element(&mut writer, "string", param)?;
        writer.write_event(Event::End(BytesEnd::new("value")))?;
        writer.write_event(Event::End(BytesEnd::new("param")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("params")))?;
    writer.write_event(Event::End(BytesEnd::new("methodCall")))?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| Error::Network(format!("XML-RPC request is not UTF-8: {}", e)))
}

/// First returned value as text. Faults become [`Error::Network`].
pub fn decode_response(doc: &str) -> Result<String> {
    let elements = parse_elements(doc)
        .map_err(|e| Error::Network(format!("malformed XML-RPC response: {}", e)))?;

    if let Some(fault) = elements.iter().position(|e| e.name == "fault") {
        let message = first_within(&elements, "string", fault)
            .map(|i| elements[i].text.trim().to_string())
            .unwrap_or_else(|| "unknown fault".to_string());
        return Err(Error::Network(format!("XML-RPC fault: {}", message)));
    }

    let params = elements
        .iter()
        .position(|e| e.name == "params")
        .ok_or_else(|| Error::Network("XML-RPC response has no params".to_string()))?;
    let value = first_within(&elements, "value", params)
        .ok_or_else(|| Error::Network("XML-RPC response has no value".to_string()))?;

    // Untyped values are strings; typed ones wrap the text in one more element
    match elements.iter().position(|e| e.parent == Some(value)) {
        Some(typed) => Ok(elements[typed].text.clone()),
        None => Ok(elements[value].text.trim().to_string()),
    }
}

/// POST a method call to `url` and decode the reply
pub async fn call(
    client: &Client,
    url: &str,
    method: &str,
    params: &[&str],
    timeout: Duration,
) -> Result<String> {
    let response = client
        .post(url)
        .header("Content-Type", "text/xml")
        .timeout(timeout)
        .body(encode_call(method, params)?)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(Error::Network(format!(
            "{} returned HTTP {}",
            method,
            response.status()
        )));
    }

    let text = response.text().await?;
    decode_response(&text)
}
