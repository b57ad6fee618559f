// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 请求模块
//!
//! 路由器只关心请求的三样东西：方法、URL（路径，可能带查询字符串）以及分发时写入的路径参数。
//! 该模块既支持直接构造 `Request`，也支持从 TCP 流读到的原始字节中解析请求行与少量标头。

use crate::{exception::Exception, param::*, pattern::Params};
use log::error;

/// 一个待分发的 HTTP 请求。
///
/// 不包含请求体；`params` 由 [`Router::dispatch`](crate::Router::dispatch) 在命中路由后写入。
#[derive(Debug, Clone)]
pub struct Request {
    /// 全局请求 ID，用于日志追踪
    id: u128,
    /// 原样保留的 HTTP 方法名
    method: String,
    /// 请求的资源路径（包含查询字符串）
    url: String,
    /// HTTP 协议版本
    version: HttpVersion,
    /// 客户端标识字符串
    user_agent: String,
    /// 命中路由后提取出的路径参数
    params: Params,
}

impl Request {
    /// 由方法名和 URL 直接构造请求。
    pub fn new(method: &str, url: &str) -> Self {
        Self {
            id: 0,
            method: method.to_string(),
            url: url.to_string(),
            version: HttpVersion::V1_1,
            user_agent: String::new(),
            params: Params::new(),
        }
    }

    /// 从原始字节缓冲区尝试构建 `Request` 实例。
    ///
    /// # 逻辑步骤
    /// 1. 验证编码：确保请求数据是合法的 UTF-8 字符串。
    /// 2. 解析请求行：提取方法、路径和协议版本。方法名不做限制，未知方法交给路由器的 404 兜底。
    /// 3. 迭代解析标头：目前只识别 `User-Agent`。
    ///
    /// # 参数
    /// * `buffer` - 从网络 Socket 读取的原始数据。
    /// * `id` - 全局请求 ID，用于在多线程环境下追踪日志。
    pub fn try_from(buffer: &[u8], id: u128) -> Result<Self, Exception> {
        // 1. 将字节流转换为字符串，读缓冲区末尾的 0 填充一并去掉
        let request_string = match std::str::from_utf8(buffer) {
            Ok(string) => string.trim_end_matches('\0'),
            Err(_) => {
                error!("[ID{}]无法解析HTTP请求", id);
                return Err(Exception::RequestIsNotUtf8);
            }
        };

        let request_lines: Vec<&str> = request_string.split(CRLF).collect();

        // 2. 解析请求行 (e.g., "GET /users/42 HTTP/1.1")
        let first_line_parts: Vec<&str> = request_lines[0].split(' ').collect();

        if first_line_parts.len() < 3 || first_line_parts[0].is_empty() {
            error!("[ID{}]HTTP请求行格式不正确：{}", id, request_lines[0]);
            return Err(Exception::MalformedRequestLine);
        }

        let method = first_line_parts[0].to_uppercase();

        // 解析协议版本
        let version_str = first_line_parts[first_line_parts.len() - 1].to_uppercase();
        let version = match version_str.as_str() {
            "HTTP/1.1" => HttpVersion::V1_1,
            _ => {
                error!("[ID{}]不支持的HTTP协议版本：{}", id, &version_str);
                return Err(Exception::UnsupportedHttpVersion);
            }
        };

        // 路径中可能包含空格（虽然不规范），通过 join 尝试恢复
        let url = if first_line_parts.len() == 3 {
            first_line_parts[1].to_string()
        } else {
            first_line_parts[1..first_line_parts.len() - 1].join(" ")
        };

        // 3. 迭代各行解析 Headers
        let mut user_agent = String::new();
        for line in request_lines.iter().skip(1) {
            if line.is_empty() {
                break;
            }
            if line.to_lowercase().starts_with("user-agent") {
                if let Some(val) = line.split(": ").nth(1) {
                    user_agent = val.to_string();
                }
            }
        }

        Ok(Self {
            id,
            method,
            url,
            version,
            user_agent,
            params: Params::new(),
        })
    }
}

// --- Getter 访问器实现 ---

impl Request {
    /// 为直接构造的请求指定日志用的请求 ID
    pub fn with_id(mut self, id: u128) -> Self {
        self.id = id;
        self
    }

    /// 获取请求 ID
    pub fn id(&self) -> u128 {
        self.id
    }

    /// 获取 HTTP 协议版本
    pub fn version(&self) -> &HttpVersion {
        &self.version
    }

    /// 获取请求方法（原样）
    pub fn method(&self) -> &str {
        &self.method
    }

    /// 获取请求路径（含查询参数）
    pub fn url(&self) -> &str {
        &self.url
    }

    /// 获取用户代理字符串
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// 获取路径参数
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// 按名字读取单个路径参数
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// 覆盖路径参数，由分发器调用
    pub fn set_params(&mut self, params: Params) {
        self.params = params;
    }
}
