// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 该模块定义了路由器在注册路由以及解析原始请求时可能产生的各类异常。
//!
//! ## 设计意图
//! - **同步抛出**：所有注册期异常都在调用 `get`/`post` 等注册入口时立即返回，分发阶段从不产生异常。
//! - **错误分类**：通过 [`ExceptionKind`] 将异常归为类型错误、参数个数错误与校验错误三类。
//! - **用户友好**：实现 `std::fmt::Display`，错误信息可以直接写入日志。

use std::fmt;

/// 路由注册或请求解析过程中发生的异常类型。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exception {
    /// 注册时给出的 HTTP 方法不是字符串（或为空字符串）。
    MethodNotString,
    /// 注册时给出的 HTTP 方法不属于 DELETE/GET/PATCH/POST/PUT 之一。
    UnsupportedMethod(String),
    /// 注册时给出的 URL 不是字符串。
    UrlNotString,
    /// 注册时给出的回调无法被调用，携带对该值的描述。
    CallbackNotCallable(String),
    /// 回调函数声明的参数少于两个（request, response），携带实际的参数个数。
    CallbackArity(usize),
    /// 规范化后的 URL 不像一个合法的路径。
    InvalidUrl(String),
    /// URL 模式无法编译为正则表达式（通常是自定义分组写错了）。
    InvalidPattern(String),
    /// 客户端发送的请求字节流无法解析为合法的 UTF-8 字符串。
    RequestIsNotUtf8,
    /// 请求行缺少方法、路径或版本。
    MalformedRequestLine,
    /// 客户端使用了服务器不支持的 HTTP 协议版本。
    UnsupportedHttpVersion,
}

/// 异常的粗粒度分类。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionKind {
    /// 参数类型不对：方法、URL 不是字符串，或回调不可调用。
    Type,
    /// 回调参数个数不足。
    Arity,
    /// 输入的形状不合法：URL 或模式校验失败，或请求报文格式错误。
    Validation,
}

use Exception::*;

impl Exception {
    /// 返回该异常所属的分类。
    pub fn kind(&self) -> ExceptionKind {
        match self {
            MethodNotString | UnsupportedMethod(_) | UrlNotString | CallbackNotCallable(_) => {
                ExceptionKind::Type
            }
            CallbackArity(_) => ExceptionKind::Arity,
            InvalidUrl(_)
            | InvalidPattern(_)
            | RequestIsNotUtf8
            | MalformedRequestLine
            | UnsupportedHttpVersion => ExceptionKind::Validation,
        }
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodNotString => write!(f, "method expected a non-empty string"),
            UnsupportedMethod(m) => write!(f, "method {} has no route table", m),
            UrlNotString => write!(f, "URL expected a string"),
            CallbackNotCallable(c) => write!(f, "callback expected a function but got {}", c),
            CallbackArity(n) => write!(
                f,
                "callback function needs to have 2 arguments but has {}",
                n
            ),
            InvalidUrl(url) => write!(f, "the url is not valid: {:?}", url),
            InvalidPattern(e) => write!(f, "the url pattern can't be compiled: {}", e),
            RequestIsNotUtf8 => write!(f, "Request bytes can't be parsed in UTF-8"),
            MalformedRequestLine => write!(f, "Malformed request line"),
            UnsupportedHttpVersion => write!(f, "Unsupported HTTP version"),
        }
    }
}

impl std::error::Error for Exception {}
