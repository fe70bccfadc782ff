//! XML-RPC encoding for the legacy interface.
//!
//! Requests are written by hand with escaped text; responses are read with
//! `quick-xml` into a small element tree and then interpreted. Values bridge
//! to `serde_json::Value` so the session can decode responses straight into
//! the shared models.

use std::fmt::Write as _;

use quick_xml::Reader;
use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesStart, Event};

use crate::error::{Result, SessionError};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Nil,
  Bool(bool),
  Int(i64),
  Double(f64),
  String(String),
  Array(Vec<Value>),
  /// Members in wire order
  Struct(Vec<(String, Value)>),
}

impl From<&str> for Value {
  fn from(value: &str) -> Self {
    Value::String(value.to_string())
  }
}

impl From<String> for Value {
  fn from(value: String) -> Self {
    Value::String(value)
  }
}

impl From<i32> for Value {
  fn from(value: i32) -> Self {
    Value::Int(i64::from(value))
  }
}

impl From<bool> for Value {
  fn from(value: bool) -> Self {
    Value::Bool(value)
  }
}

impl Value {
  /// Convert a JSON value; `null` object members are left out
  pub fn from_json(value: &serde_json::Value) -> Self {
    match value {
      serde_json::Value::Null => Value::Nil,
      serde_json::Value::Bool(b) => Value::Bool(*b),
      serde_json::Value::Number(n) => match n.as_i64() {
        Some(i) => Value::Int(i),
        None => Value::Double(n.as_f64().unwrap_or_default()),
      },
      serde_json::Value::String(s) => Value::String(s.clone()),
      serde_json::Value::Array(items) => Value::Array(items.iter().map(Value::from_json).collect()),
      serde_json::Value::Object(members) => Value::Struct(
        members
          .iter()
          .filter(|(_, v)| !v.is_null())
          .map(|(k, v)| (k.clone(), Value::from_json(v)))
          .collect(),
      ),
    }
  }
}

impl From<Value> for serde_json::Value {
  /// `nil` struct members are dropped so they read as missing fields
  fn from(value: Value) -> Self {
    match value {
      Value::Nil => serde_json::Value::Null,
      Value::Bool(b) => serde_json::Value::Bool(b),
      Value::Int(i) => serde_json::Value::from(i),
      Value::Double(d) => serde_json::Number::from_f64(d).map_or(serde_json::Value::Null, serde_json::Value::Number),
      Value::String(s) => serde_json::Value::String(s),
      Value::Array(items) => serde_json::Value::Array(items.into_iter().map(Into::into).collect()),
      Value::Struct(members) => serde_json::Value::Object(
        members
          .into_iter()
          .filter(|(_, v)| *v != Value::Nil)
          .map(|(k, v)| (k, v.into()))
          .collect(),
      ),
    }
  }
}

/// Render a `methodCall` document
pub fn encode_call(method: &str, params: &[Value]) -> String {
  let mut out = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><methodCall><methodName>"#);
  out.push_str(&escape(method));
  out.push_str("</methodName><params>");
  for param in params {
    out.push_str("<param>");
    write_value(&mut out, param);
    out.push_str("</param>");
  }
  out.push_str("</params></methodCall>");
  out
}

fn write_value(out: &mut String, value: &Value) {
  out.push_str("<value>");
  match value {
    Value::Nil => out.push_str("<nil/>"),
    Value::Bool(b) => {
      let _ = write!(out, "<boolean>{}</boolean>", u8::from(*b));
    }
    Value::Int(i) if i32::try_from(*i).is_ok() => {
      let _ = write!(out, "<int>{i}</int>");
    }
    Value::Int(i) => {
      let _ = write!(out, "<i8>{i}</i8>");
    }
    Value::Double(d) => {
      let _ = write!(out, "<double>{d}</double>");
    }
    Value::String(s) => {
      out.push_str("<string>");
      out.push_str(&escape(s.as_str()));
      out.push_str("</string>");
    }
    Value::Array(items) => {
      out.push_str("<array><data>");
      for item in items {
        write_value(out, item);
      }
      out.push_str("</data></array>");
    }
    Value::Struct(members) => {
      out.push_str("<struct>");
      for (name, member) in members {
        out.push_str("<member><name>");
        out.push_str(&escape(name.as_str()));
        out.push_str("</name>");
        write_value(out, member);
        out.push_str("</member>");
      }
      out.push_str("</struct>");
    }
  }
  out.push_str("</value>");
}

/// A decoded `methodResponse`
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
  Success(Value),
  Fault { code: i64, message: String },
}

/// Parse a `methodResponse` document
pub fn decode_response(xml: &str) -> Result<Response> {
  let document = parse_tree(xml)?;
  let root = document
    .child("methodResponse")
    .ok_or_else(|| SessionError::protocol("missing methodResponse element"))?;

  if let Some(fault) = root.child("fault") {
    let value = fault
      .child("value")
      .ok_or_else(|| SessionError::protocol("fault without value"))?;
    return decode_fault(&parse_value(value)?);
  }

  let params = root
    .child("params")
    .ok_or_else(|| SessionError::protocol("response has neither params nor fault"))?;

  // void methods may answer with an empty params list
  match params.child("param").and_then(|param| param.child("value")) {
    Some(value) => Ok(Response::Success(parse_value(value)?)),
    None => Ok(Response::Success(Value::Nil)),
  }
}

fn decode_fault(value: &Value) -> Result<Response> {
  let Value::Struct(members) = value else {
    return Err(SessionError::protocol("fault value is not a struct"));
  };

  let mut code = 0;
  let mut message = String::new();
  for (name, member) in members {
    match (name.as_str(), member) {
      ("faultCode", Value::Int(c)) => code = *c,
      ("faultString", Value::String(s)) => message.clone_from(s),
      _ => {}
    }
  }
  Ok(Response::Fault { code, message })
}

#[derive(Debug, Default)]
struct Node {
  name: String,
  text: String,
  children: Vec<Node>,
}

impl Node {
  fn named(start: &BytesStart<'_>) -> Self {
    Self {
      name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
      ..Self::default()
    }
  }

  fn child(&self, name: &str) -> Option<&Node> {
    self.children.iter().find(|child| child.name == name)
  }

  fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
    self.children.iter().filter(move |child| child.name == name)
  }
}

fn top(stack: &mut [Node]) -> Result<&mut Node> {
  stack
    .last_mut()
    .ok_or_else(|| SessionError::protocol("unbalanced XML document"))
}

fn parse_tree(xml: &str) -> Result<Node> {
  let mut reader = Reader::from_str(xml);
  let mut stack = vec![Node::default()];

  loop {
    match reader.read_event().map_err(SessionError::protocol)? {
      Event::Start(start) => stack.push(Node::named(&start)),
      Event::Empty(start) => top(&mut stack)?.children.push(Node::named(&start)),
      Event::End(_) => {
        if stack.len() < 2 {
          return Err(SessionError::protocol("unexpected closing tag"));
        }
        let node = top(&mut stack).map(std::mem::take)?;
        stack.pop();
        top(&mut stack)?.children.push(node);
      }
      Event::Text(text) => {
        let raw = std::str::from_utf8(&text).map_err(SessionError::protocol)?;
        let unescaped = unescape(raw).map_err(SessionError::protocol)?;
        top(&mut stack)?.text.push_str(&unescaped);
      }
      Event::CData(data) => {
        let raw = std::str::from_utf8(&data).map_err(SessionError::protocol)?;
        top(&mut stack)?.text.push_str(raw);
      }
      Event::GeneralRef(reference) => {
        let name = reference.decode().map_err(SessionError::protocol)?;
        let resolved = resolve_reference(&name)?;
        top(&mut stack)?.text.push_str(&resolved);
      }
      Event::Eof => break,
      _ => {}
    }
  }

  if stack.len() != 1 {
    return Err(SessionError::protocol("truncated XML document"));
  }
  top(&mut stack).map(std::mem::take)
}

fn resolve_reference(name: &str) -> Result<String> {
  let resolved = match name {
    "lt" => Some('<'),
    "gt" => Some('>'),
    "amp" => Some('&'),
    "apos" => Some('\''),
    "quot" => Some('"'),
    _ => name
      .strip_prefix("#x")
      .map(|hex| u32::from_str_radix(hex, 16))
      .or_else(|| name.strip_prefix('#').map(str::parse::<u32>))
      .and_then(|code| code.ok())
      .and_then(char::from_u32),
  };
  resolved
    .map(String::from)
    .ok_or_else(|| SessionError::protocol(format!("unknown entity &{name};")))
}

fn parse_value(node: &Node) -> Result<Value> {
  let Some(typed) = node.children.first() else {
    // untyped values are strings, whitespace included
    return Ok(Value::String(node.text.clone()));
  };

  let text = typed.text.trim();
  match typed.name.as_str() {
    "string" => Ok(Value::String(typed.text.clone())),
    "int" | "i4" | "i8" => text
      .parse()
      .map(Value::Int)
      .map_err(|e| SessionError::protocol(format!("bad integer '{text}': {e}"))),
    "boolean" => match text {
      "1" | "true" => Ok(Value::Bool(true)),
      "0" | "false" => Ok(Value::Bool(false)),
      other => Err(SessionError::protocol(format!("bad boolean '{other}'"))),
    },
    "double" => text
      .parse()
      .map(Value::Double)
      .map_err(|e| SessionError::protocol(format!("bad double '{text}': {e}"))),
    "nil" => Ok(Value::Nil),
    "dateTime.iso8601" | "base64" => Ok(Value::String(text.to_string())),
    "array" => {
      let data = typed
        .child("data")
        .ok_or_else(|| SessionError::protocol("array without data"))?;
      data.children_named("value").map(parse_value).collect::<Result<_>>().map(Value::Array)
    }
    "struct" => typed
      .children_named("member")
      .map(|member| {
        let name = member
          .child("name")
          .ok_or_else(|| SessionError::protocol("struct member without name"))?;
        let value = member
          .child("value")
          .ok_or_else(|| SessionError::protocol("struct member without value"))?;
        Ok((name.text.trim().to_string(), parse_value(value)?))
      })
      .collect::<Result<_>>()
      .map(Value::Struct),
    other => Err(SessionError::protocol(format!("unsupported value type '{other}'"))),
  }
}

#[cfg(test)]
mod tests {
  use insta::assert_snapshot;
  use serde_json::json;

  use super::*;

  #[test]
  fn test_encode_call() {
    let xml = encode_call(
      "jira1.addComment",
      &[
        Value::from("token-1"),
        Value::from("MNG-1"),
        Value::Struct(vec![("body".to_string(), Value::from("a < b & c"))]),
      ],
    );

    assert_snapshot!(xml, @r#"<?xml version="1.0" encoding="UTF-8"?><methodCall><methodName>jira1.addComment</methodName><params><param><value><string>token-1</string></value></param><param><value><string>MNG-1</string></value></param><param><value><struct><member><name>body</name><value><string>a &lt; b &amp; c</string></value></member></struct></value></param></params></methodCall>"#);
  }

  #[test]
  fn test_encode_scalars() {
    let xml = encode_call(
      "m",
      &[Value::Int(50), Value::Int(i64::from(i32::MAX) + 1), Value::Bool(true), Value::Nil],
    );
    assert!(xml.contains("<int>50</int>"));
    assert!(xml.contains("<i8>2147483648</i8>"));
    assert!(xml.contains("<boolean>1</boolean>"));
    assert!(xml.contains("<nil/>"));
  }

  #[test]
  fn test_decode_pretty_printed_struct() {
    let xml = r#"<?xml version="1.0"?>
<methodResponse>
  <params>
    <param>
      <value>
        <struct>
          <member><name>key</name><value><string>MNG-1235</string></value></member>
          <member><name>summary</name><value>Fish &amp; chips</value></member>
          <member><name>votes</name><value><i4>3</i4></value></member>
          <member><name>assignee</name><value><nil/></value></member>
          <member>
            <name>fixVersions</name>
            <value><array><data>
              <value><struct><member><name>id</name><value>100</value></member></struct></value>
            </data></array></value>
          </member>
        </struct>
      </value>
    </param>
  </params>
</methodResponse>"#;

    let Response::Success(value) = decode_response(xml).unwrap() else {
      panic!("expected success");
    };
    let json: serde_json::Value = value.into();

    assert_eq!(
      json,
      json!({
          "key": "MNG-1235",
          "summary": "Fish & chips",
          "votes": 3,
          "fixVersions": [{ "id": "100" }]
      })
    );
  }

  #[test]
  fn test_decode_fault() {
    let xml = r#"<methodResponse><fault><value><struct>
      <member><name>faultCode</name><value><int>0</int></value></member>
      <member><name>faultString</name><value><string>com.atlassian.jira.rpc.exception.RemoteAuthenticationException: Invalid username or password.</string></value></member>
    </struct></value></fault></methodResponse>"#;

    match decode_response(xml).unwrap() {
      Response::Fault { code, message } => {
        assert_eq!(code, 0);
        assert!(message.contains("RemoteAuthenticationException"));
      }
      other => panic!("expected fault, got {other:?}"),
    }
  }

  #[test]
  fn test_decode_empty_params_is_nil() {
    let response = decode_response("<methodResponse><params/></methodResponse>").unwrap();
    assert_eq!(response, Response::Success(Value::Nil));
  }

  #[test]
  fn test_decode_rejects_garbage() {
    assert!(decode_response("<html><body>Login</body></html>").is_err());
    assert!(decode_response("<methodResponse><params>").is_err());
    assert!(
      decode_response("<methodResponse><params><param><value><int>x</int></value></param></params></methodResponse>")
        .is_err()
    );
  }

  #[test]
  fn test_json_bridge_drops_null_members() {
    let value = Value::from_json(&json!({ "body": "hi", "groupLevel": null, "n": 2 }));
    assert_eq!(
      value,
      Value::Struct(vec![
        ("body".to_string(), Value::from("hi")),
        ("n".to_string(), Value::Int(2)),
      ])
    );
  }
}
