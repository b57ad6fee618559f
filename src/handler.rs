// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 处理函数模块
//!
//! 路由最终调用的是形如 `Fn(&mut Request, &mut Response)` 的处理函数。
//! 注册入口接受任意个数参数（0 到 2 个）的闭包，并记录它声明的参数个数，
//! 由路由表在注册时拒绝参数不足两个的回调。

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::warn;

use crate::{request::Request, response::Response};

/// 处理函数的统一形态。
pub type HandlerFn = dyn Fn(&mut Request, &mut Response) + Send + Sync;

/// 可以在线程间共享的处理函数。
#[derive(Clone)]
pub struct Handler(Arc<HandlerFn>);

impl Handler {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Request, &mut Response) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// 兜底处理函数：状态码 404，正文为给定的消息。
    pub fn not_found(message: &str) -> Self {
        let message = message.to_string();
        Self::new(move |request, response| {
            warn!("{} {} 没有匹配的路由，返回404", request.method(), request.url());
            response.set_status_code(404);
            response.end(message.clone());
        })
    }

    #[inline]
    pub fn call(&self, request: &mut Request, response: &mut Response) {
        (self.0)(request, response)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler")
    }
}

/// 注册前的回调：处理函数加上它声明的参数个数。
#[derive(Clone, Debug)]
pub struct Callback {
    arity: usize,
    handler: Handler,
}

impl Callback {
    /// 声明的参数个数
    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }
}

/// 可以转换为 [`Callback`] 的值。
///
/// 类型参数 `Args` 只用于区分不同参数个数的闭包，与 `Fn` 的参数列表一一对应。
/// 闭包的参数需要写明类型，例如 `|req: &mut Request, res: &mut Response| { .. }`。
pub trait IntoCallback<Args> {
    fn into_callback(self) -> Callback;
}

impl<F> IntoCallback<()> for F
where
    F: Fn() + Send + Sync + 'static,
{
    fn into_callback(self) -> Callback {
        Callback { arity: 0, handler: Handler::new(move |_, _| self()) }
    }
}

impl<F> IntoCallback<(Request,)> for F
where
    F: Fn(&mut Request) + Send + Sync + 'static,
{
    fn into_callback(self) -> Callback {
        Callback { arity: 1, handler: Handler::new(move |request, _| self(request)) }
    }
}

impl<F> IntoCallback<(Request, Response)> for F
where
    F: Fn(&mut Request, &mut Response) + Send + Sync + 'static,
{
    fn into_callback(self) -> Callback {
        Callback { arity: 2, handler: Handler::new(self) }
    }
}

impl IntoCallback<Handler> for Handler {
    fn into_callback(self) -> Callback {
        Callback { arity: 2, handler: self }
    }
}

impl IntoCallback<Callback> for Callback {
    fn into_callback(self) -> Callback {
        self
    }
}

/// 按名字登记的回调，供配置文件中声明的路由引用。
#[derive(Default, Debug, Clone)]
pub struct HandlerRegistry {
    callbacks: HashMap<String, Callback>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记回调，同名时覆盖。
    pub fn insert<Args>(&mut self, name: &str, callback: impl IntoCallback<Args>) -> &mut Self {
        self.callbacks.insert(name.to_string(), callback.into_callback());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Callback> {
        self.callbacks.get(name)
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}
