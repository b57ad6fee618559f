// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use crate::param::*;

use bytes::Bytes;
use chrono::prelude::*;
use log::warn;

/// 处理函数写入的 HTTP 响应。
///
/// 处理函数通过 [`set_status_code`](Response::set_status_code) 设置状态码，
/// 再调用 [`end`](Response::end) 写入正文并结束响应。
#[derive(Debug, Clone)]
pub struct Response {
    version: HttpVersion,
    status_code: u16,
    information: String,
    content_type: Option<String>,
    date: DateTime<Utc>,
    server_name: String,
    content: Option<Bytes>,
    ended: bool,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    pub fn new() -> Self {
        Self {
            version: HttpVersion::V1_1,
            status_code: 200,
            information: "OK".to_string(),
            content_type: None,
            date: Utc::now(),
            server_name: SERVER_NAME.to_string(),
            content: None,
            ended: false,
        }
    }

    pub fn set_status_code(&mut self, code: u16) -> &mut Self {
        self.status_code = code;
        self.information = match STATUS_CODES.get(&code) {
            Some(&info) => info.to_string(),
            None => {
                warn!("未知的状态码：{}", code);
                "Unknown".to_string()
            }
        };
        self
    }

    pub fn set_content_type(&mut self, content_type: &str) -> &mut Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    /// 写入正文并结束响应。
    ///
    /// 重复调用时只保留第一次写入的正文。
    pub fn end(&mut self, body: impl Into<Bytes>) {
        if self.ended {
            warn!("响应已经结束，忽略再次写入的正文");
            return;
        }
        self.date = Utc::now();
        self.content = Some(body.into());
        self.ended = true;
    }

    /// 序列化为 HTTP/1.1 响应报文。
    pub fn as_bytes(&self) -> Vec<u8> {
        let version: &str = match self.version {
            HttpVersion::V1_1 => "HTTP/1.1",
        };
        let status_code: &str = &self.status_code.to_string();
        let content_length: &str = &self.body().len().to_string();
        let date: &str = &format_date(&self.date);
        let information: &str = &self.information;
        let server: &str = &self.server_name;

        let header = [
            version,
            " ",
            status_code,
            " ",
            information,
            CRLF,
            match &self.content_type {
                Some(t) => ["Content-Type: ", t.as_str(), CRLF].concat(),
                None => "".to_string(),
            }
            .as_str(),
            "Content-Length: ",
            content_length,
            CRLF,
            "Date: ",
            date,
            CRLF,
            "Server: ",
            server,
            CRLF,
            CRLF,
        ]
        .concat();
        [header.as_bytes(), self.body()].concat()
    }
}

impl Response {
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn information(&self) -> &str {
        &self.information
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// 响应是否已经通过 `end` 结束
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn body(&self) -> &[u8] {
        match &self.content {
            Some(c) => &c[..],
            None => &[],
        }
    }

    /// 以 UTF-8 文本读取正文，非法字节被替换
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(self.body()).into_owned()
    }
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc2822()
}
